use apimodel_types::TypeParseError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("invalid source tree: {0}")]
    Json(#[from] serde_json::Error),
    #[error("cannot read type `{text}`: {source}")]
    Type {
        text: String,
        #[source]
        source: TypeParseError,
    },
    #[error("{0}")]
    Declaration(String),
}
