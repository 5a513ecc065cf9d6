use thiserror::Error;

/// Failures of the layers around the report core: files, archive, settings.
#[derive(Debug, Error)]
pub enum Error {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("report archive: {0}")]
    Db(#[from] rusqlite::Error),
    #[error("configuration: {0}")]
    Config(#[from] config::ConfigError),
}

pub type Result<T> = std::result::Result<T, Error>;
