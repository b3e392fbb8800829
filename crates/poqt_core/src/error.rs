use thiserror::Error;

/// Which kind of entity a lookup failed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Task,
    List,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Task => write!(f, "task"),
            EntityKind::List => write!(f, "list"),
        }
    }
}

#[derive(Error, Debug)]
pub enum PoqtError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: i64 },

    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    #[error("persistence error: {0}")]
    Persistence(#[from] rusqlite::Error),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("scheduling error: {0}")]
    Scheduling(String),

    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PoqtError {
    pub fn task_not_found(id: i64) -> Self {
        Self::NotFound {
            kind: EntityKind::Task,
            id,
        }
    }

    pub fn list_not_found(id: i64) -> Self {
        Self::NotFound {
            kind: EntityKind::List,
            id,
        }
    }

    /// True for failures of the store itself, as opposed to rejected requests.
    pub fn is_persistence(&self) -> bool {
        matches!(self, Self::Persistence(_) | Self::Storage(_) | Self::Io(_))
    }
}

pub type Result<T> = std::result::Result<T, PoqtError>;
