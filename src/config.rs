use defense_planner::model::{DefenseSettings, ScoringSettings};
use eyre::{Result, WrapErr};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub database: Database,
    #[serde(default)]
    pub defense: DefenseSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
}

#[derive(Debug, Deserialize)]
pub struct Database {
    pub url: String,
}

impl Config {
    pub fn load(file_name: &Path) -> Result<Config> {
        let content = std::fs::read_to_string(file_name)
            .wrap_err_with(|| format!("cannot read configuration file {}", file_name.display()))?;
        toml::from_str(&content).wrap_err("cannot parse configuration file")
    }
}
