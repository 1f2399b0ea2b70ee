use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const DEFAULT_FALLBACK_COLOR: &str = "gray";

/// Display color per caster tag.
///
/// Tags without an entry are drawn in the fallback color. Deserialized colors are laid over
/// the built-in ones, so a config only needs to name the casters it adds or recolors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "PaletteOverrides")]
pub struct CasterPalette {
    pub colors: BTreeMap<String, String>,
    pub fallback: String,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct PaletteOverrides {
    colors: BTreeMap<String, String>,
    fallback: Option<String>,
}

impl From<PaletteOverrides> for CasterPalette {
    fn from(overrides: PaletteOverrides) -> Self {
        let mut palette = CasterPalette::default();
        palette.colors.extend(overrides.colors);
        if let Some(fallback) = overrides.fallback {
            palette.fallback = fallback;
        }
        palette
    }
}

impl Default for CasterPalette {
    fn default() -> Self {
        let colors = [("RTK2GO", "blue"), ("CENTIPEDE", "purple"), ("EMLID", "red")]
            .into_iter()
            .map(|(caster, color)| (caster.to_owned(), color.to_owned()))
            .collect();
        Self {
            colors,
            fallback: DEFAULT_FALLBACK_COLOR.to_owned(),
        }
    }
}

impl CasterPalette {
    pub fn color_for(&self, caster: &str) -> &str {
        self.colors
            .get(caster)
            .map(String::as_str)
            .unwrap_or(self.fallback.as_str())
    }

    pub fn is_known(&self, caster: &str) -> bool {
        self.colors.contains_key(caster)
    }
}
