use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Aci(#[from] aci_lang::Error),
    #[error("Error rendering JSON output {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Error rendering YAML output {0}")]
    YamlError(#[from] serde_yaml::Error),
    #[error("I/O error when reading {0}")]
    IoError(#[from] std::io::Error),
    #[error("Configuration error {0}")]
    ConfigError(#[from] config::ConfigError),
    #[error("{0}")]
    IllegalArguments(String),
}

pub type Result<R> = std::result::Result<R, Error>;
