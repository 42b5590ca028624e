use thiserror::Error;

#[derive(Error, Debug)]
pub enum CongressError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Template rendering failed: {0}")]
    Template(#[from] askama::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Storage error: {0}")]
    Storage(String),

    /// A row lacks a structurally required field or carries one of the wrong type.
    #[error("Malformed record at row {index}: {reason}")]
    MalformedRecord { index: usize, reason: String },

    /// A term length was needed for a chamber we don't know.
    #[error("Unrecognized chamber '{chamber}' for member {bioguide_id}")]
    UnrecognizedChamber { bioguide_id: String, chamber: String },

    #[error("Invariant violated for member {bioguide_id}: {message}")]
    InvariantViolation { bioguide_id: String, message: String },
}

pub type Result<T> = std::result::Result<T, CongressError>;
