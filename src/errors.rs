use thiserror::Error;
use uuid::Uuid;

pub type EngineResult<T> = Result<T, EngineError>;

/// Error type that captures engine and store failures.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: Uuid },
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Persistence failure: {0}")]
    Persistence(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl EngineError {
    pub fn category_not_found(id: Uuid) -> Self {
        Self::NotFound {
            entity: "category",
            id,
        }
    }

    pub fn budget_not_found(id: Uuid) -> Self {
        Self::NotFound {
            entity: "budget",
            id,
        }
    }

    pub fn transaction_not_found(id: Uuid) -> Self {
        Self::NotFound {
            entity: "transaction",
            id,
        }
    }

    /// True for failures raised by the underlying store (read, write or decode).
    pub fn is_persistence(&self) -> bool {
        matches!(self, Self::Persistence(_) | Self::Io(_) | Self::Serde(_))
    }
}
