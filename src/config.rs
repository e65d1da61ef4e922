use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub input: InputConfig,
    pub simulation: SimulationConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InputConfig {
    pub points_file: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SimulationConfig {
    /// How far (km) a new park plausibly affects air quality.
    #[serde(default = "default_impact_radius_km")]
    pub impact_radius_km: f64,
    /// Fractional AQI reduction at distance zero for a point with no green cover.
    #[serde(default = "default_max_reduction")]
    pub max_reduction: f64,
}

fn default_impact_radius_km() -> f64 {
    5.0
}

fn default_max_reduction() -> f64 {
    0.4
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

impl AppConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: AppConfig = toml::from_str(&content)
            .with_context(|| "Failed to parse TOML configuration")?;
        Ok(config)
    }
}
