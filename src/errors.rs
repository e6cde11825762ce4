use thiserror::Error;

/// Unified error type for the model, importer, format, and storage layers.
#[derive(Debug, Error)]
pub enum BudgetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{kind} pool exhausted (capacity {capacity})")]
    PoolExhausted {
        kind: &'static str,
        capacity: usize,
    },
    #[error("Invalid reference: {0}")]
    InvalidRef(String),
    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("Format error: {0}")]
    Format(String),
    #[error("Import error: {0}")]
    Import(String),
    #[error("Storage error: {0}")]
    Storage(String),
}

impl BudgetError {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        BudgetError::Parse {
            line,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BudgetError>;
