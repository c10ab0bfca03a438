use thiserror::Error;

use super::config::ConfigError;
use crate::core::io::document::DocumentError;
use crate::core::io::mol::MolError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Configuration error: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Document error: {source}")]
    Document {
        #[from]
        source: DocumentError,
    },

    #[error("MOL error: {source}")]
    Mol {
        #[from]
        source: MolError,
    },
}
