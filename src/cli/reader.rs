use anyhow::Result;
use serde::Deserialize;

use super::common::{SourceSettings, TargetSettings};

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Config {
    pub version: String,
    pub source: SourceSettings,
    pub target: TargetSettings,
}

pub fn read_config(config: &str) -> Result<Config> {
    let config = serde_yaml::from_str(config)?;

    Ok(config)
}
