use thiserror::Error;

pub type Result<T> = std::result::Result<T, TemplateError>;

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Unsupported template schema_version {found} (expected {expected})")]
    SchemaVersion { found: u32, expected: u32 },

    #[error("Invalid template '{slug}': {reason}")]
    InvalidTemplate { slug: String, reason: String },

    #[error("Template seed parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
