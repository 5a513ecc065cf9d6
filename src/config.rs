use std::path::PathBuf;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub db_path: PathBuf,
    pub batch_chunk: usize,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            db_path: PathBuf::from("data/reports.sqlite"),
            batch_chunk: 500,
            log_filter: "info".to_string(),
        }
    }
}

impl Settings {
    /// `research_report.toml` (optional), then `RESEARCH_*` environment variables.
    pub fn load() -> Result<Self> {
        let config = Config::builder()
            .add_source(File::with_name("research_report").required(false))
            .add_source(Environment::with_prefix("RESEARCH").try_parsing(true))
            .build()?;
        Self::from_config(config)
    }

    pub fn from_config(config: Config) -> Result<Self> {
        let settings: Settings = config.try_deserialize()?;
        Ok(Settings {
            batch_chunk: settings.batch_chunk.max(1),
            ..settings
        })
    }
}
