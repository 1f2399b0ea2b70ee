use std::{
    collections::BTreeMap,
    fs::read_to_string,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context};
use serde::Deserialize;

use crate::map::{
    overlay::MapStyles,
    palette::CasterPalette,
    view::{MapOptions, TileLayer},
    viewport::{LatLon, ViewportSize},
};

/// Connection details of an NTRIP caster.
#[derive(Deserialize, Debug, Clone)]
pub struct CasterConfig {
    pub host: String,
    #[serde(default = "default_caster_port")]
    pub port: u16,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// Where the downloaded source table is kept between runs.
    pub cachefile: PathBuf,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_caster_port() -> u16 {
    2101
}

fn default_timeout_secs() -> u64 {
    30
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct MapConfig {
    pub center: LatLon,
    pub zoom: f64,
    pub padding: f64,
    pub viewport: ViewportSize,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub tiles: TileLayer,
    pub styles: MapStyles,
    pub palette: CasterPalette,
}

impl Default for MapConfig {
    fn default() -> Self {
        let options = MapOptions::new(None, String::new());
        Self {
            center: options.center,
            zoom: options.zoom,
            padding: options.padding,
            viewport: options.viewport_size,
            min_zoom: options.min_zoom,
            max_zoom: options.max_zoom,
            tiles: options.tiles,
            styles: options.styles,
            palette: options.palette,
        }
    }
}

impl MapConfig {
    pub fn to_options(&self, region_source: Option<String>, station_source: String) -> MapOptions {
        MapOptions {
            region_source,
            station_source,
            center: self.center,
            zoom: self.zoom,
            padding: self.padding,
            viewport_size: self.viewport,
            min_zoom: self.min_zoom,
            max_zoom: self.max_zoom,
            tiles: self.tiles.clone(),
            styles: self.styles.clone(),
            palette: self.palette.clone(),
        }
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct Config {
    pub casters: BTreeMap<String, CasterConfig>,
    pub map: MapConfig,
}

impl Config {
    /// Read the YAML config at `path`, or the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let path = match path {
            Some(path) => path,
            None => return Ok(Self::default()),
        };
        if !path.exists() {
            return Err(anyhow!("Config file {:?} not found", path));
        }
        log::info!("Reading config from {:?}", path);
        let config_contents = read_to_string(path)?;
        serde_yaml::from_str(&config_contents).with_context(|| format!("Parsing config {:?}", path))
    }

    pub fn caster(&self, name: &str) -> anyhow::Result<&CasterConfig> {
        self.casters.get(name).ok_or_else(|| {
            let known: Vec<&str> = self.casters.keys().map(String::as_str).collect();
            anyhow!(
                "Caster {} is not configured, known casters: [{}]",
                name,
                known.join(", ")
            )
        })
    }
}
