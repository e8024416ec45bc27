use thiserror::Error;

/// All errors that can occur in opsdesk-core.
#[derive(Debug, Error)]
pub enum OpsdeskError {
    #[error("Customer not found: {0}")]
    CustomerNotFound(String),

    #[error("Company not found: {0}")]
    CompanyNotFound(String),

    #[error("Master record not found in group: {0}")]
    MasterNotFound(String),

    #[error("Unknown entity type: {0}")]
    UnknownEntityType(String),

    #[error("Only {found} of {requested} requested records exist")]
    TooFewRecords { requested: usize, found: usize },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Merge lock unavailable for: {0}")]
    LockUnavailable(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl OpsdeskError {
    /// Whether the error is a caller mistake (rejected before any write)
    /// rather than an engine or store failure.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            OpsdeskError::Validation(_)
                | OpsdeskError::MasterNotFound(_)
                | OpsdeskError::UnknownEntityType(_)
                | OpsdeskError::TooFewRecords { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, OpsdeskError>;
