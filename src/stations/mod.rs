use std::{fs, path::Path};

use anyhow::Context;
use serde::{Deserialize, Serialize};

pub mod sort;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub id: String,
    pub lat: f64,
    pub lon: f64,
    /// Tag of the caster the station was listed by, e.g. `RTK2GO`.
    pub caster: String,
}

/// The station list document served to the map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StationList {
    pub stations: Vec<Station>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl StationList {
    pub fn from_json(contents: &str) -> serde_json::Result<Self> {
        serde_json::from_str(contents)
    }

    pub fn read_from_file(path: &Path) -> anyhow::Result<Self> {
        let contents =
            fs::read_to_string(path).with_context(|| format!("Reading station list {:?}", path))?;
        Self::from_json(&contents).with_context(|| format!("Parsing station list {:?}", path))
    }

    pub fn write_to_file(&self, path: &Path) -> anyhow::Result<()> {
        let contents = serde_json::to_string(self)?;
        fs::write(path, contents).with_context(|| format!("Writing station list {:?}", path))
    }

    /// Stamp the list with the current local time in ISO 8601.
    pub fn touch(&mut self) {
        self.timestamp = Some(chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string());
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }
}
