use thiserror::Error;

/// Message carried by [`TransitError::ExtensionArity`].
pub const DECODER_ARITY_MESSAGE: &str = "Decoder functions require arity 1\n- the string to decode\n";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransitError {
    /// A payload could not be parsed as the scalar kind its tag declares.
    #[error("invalid {kind} payload: {payload:?}")]
    Format { kind: &'static str, payload: String },

    /// A cache token arrived before any string was registered under it.
    #[error("cache token {0:?} has no registered entry")]
    CacheMiss(String),

    /// Raised by `Decoder::register`, never during decode.
    #[error("{0}")]
    ExtensionArity(String),

    #[error("nesting depth exceeds limit of {0}")]
    DepthLimitExceeded(usize),

    #[error("invalid JSON: {0}")]
    Json(String),

    #[error("cannot encode: {0}")]
    Unencodable(String),
}

impl TransitError {
    pub(crate) fn format(kind: &'static str, payload: impl Into<String>) -> Self {
        TransitError::Format {
            kind,
            payload: payload.into(),
        }
    }
}

impl From<serde_json::Error> for TransitError {
    fn from(e: serde_json::Error) -> Self {
        TransitError::Json(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TransitError>;
