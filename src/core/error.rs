use thiserror::Error as ThisError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Document or schema does not satisfy the ingestion contract
    Validation,
    /// Unsupported configuration or removed query-construction form
    Configuration,
    /// Persistence collaborator failure
    Storage,
    Serialization,
}

#[derive(Debug, ThisError)]
#[error("{kind:?}: {context}")]
pub struct Error {
    pub kind: ErrorKind,
    pub context: String,
}

impl Error {
    pub fn new(kind: ErrorKind, context: impl Into<String>) -> Self {
        Error { kind, context: context.into() }
    }

    pub fn validation(context: impl Into<String>) -> Self {
        Error::new(ErrorKind::Validation, context)
    }

    pub fn configuration(context: impl Into<String>) -> Self {
        Error::new(ErrorKind::Configuration, context)
    }

    pub fn storage(context: impl Into<String>) -> Self {
        Error::new(ErrorKind::Storage, context)
    }

    pub fn is_validation(&self) -> bool {
        self.kind == ErrorKind::Validation
    }

    pub fn is_configuration(&self) -> bool {
        self.kind == ErrorKind::Configuration
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error {
            kind: ErrorKind::Storage,
            context: err.to_string(),
        }
    }
}

impl From<bincode::Error> for Error {
    fn from(err: bincode::Error) -> Self {
        Error {
            kind: ErrorKind::Serialization,
            context: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error {
            kind: ErrorKind::Serialization,
            context: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
