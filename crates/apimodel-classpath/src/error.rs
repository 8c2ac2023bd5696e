use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = DescriptorError> = std::result::Result<T, E>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DescriptorError {
    #[error("invalid descriptor: {0}")]
    InvalidDescriptor(String),
    #[error("invalid signature: {0}")]
    InvalidSignature(String),
}

#[derive(Debug, Error)]
pub enum ClasspathError {
    #[error("failed to read `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid classpath index: {0}")]
    Json(#[from] serde_json::Error),
    #[error("class `{class}`: {source}")]
    Descriptor {
        class: String,
        #[source]
        source: DescriptorError,
    },
}
