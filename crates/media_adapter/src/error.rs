use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdapterError {
    /// Transport failure: connect, timeout, truncated body.
    #[error("http: {0}")]
    Http(String),

    /// The remote answered with a non-success status.
    #[error("remote {status}: {message}")]
    Remote { status: u16, message: String },

    #[error("not configured: {0}")]
    NotConfigured(String),

    #[error("invalid transformation: {0}")]
    InvalidTransformation(String),

    #[error("serde: {0}")]
    Serde(#[from] serde_json::Error),
}

impl AdapterError {
    /// HTTP status reported by the remote, if the failure came from it.
    pub fn remote_status(&self) -> Option<u16> {
        match self {
            Self::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, AdapterError>;
