use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing Cloudinary credentials: {}", missing.join(", "))]
    MissingCredentials { missing: Vec<&'static str> },

    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },

    #[error("invalid CLOUDINARY_URL: {0}")]
    CloudinaryUrl(String),

    #[error("secrets file {path}: {detail}")]
    Secrets { path: String, detail: String },
}

pub type Result<T> = std::result::Result<T, ConfigError>;
