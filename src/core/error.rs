use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum BenchError {
    #[error("Cannot parse config: {0}")]
    ConfigParsingError(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Data loading failed: {0}")]
    AcquisitionFailure(String),
    #[error("{endpoint} connection failed: {reason}")]
    ConnectionFailure { endpoint: String, reason: String },
    #[error("{endpoint} write failed: {reason}")]
    WriteFailure { endpoint: String, reason: String },
    #[error("{endpoint} duplicate key: {reason}")]
    DuplicateKeyFailure { endpoint: String, reason: String },
    #[error("Insertion rate undefined: {0}")]
    UndefinedRate(String),
}

impl BenchError {
    /// Whether the error ends the whole run rather than one endpoint's trials.
    pub fn is_fatal(&self) -> bool {
        match self {
            BenchError::ConfigParsingError(_)
            | BenchError::InvalidConfiguration(_)
            | BenchError::AcquisitionFailure(_)
            | BenchError::ConnectionFailure { .. } => true,
            BenchError::WriteFailure { .. }
            | BenchError::DuplicateKeyFailure { .. }
            | BenchError::UndefinedRate(_) => false,
        }
    }
}

impl From<std::io::Error> for BenchError {
    fn from(err: std::io::Error) -> Self {
        BenchError::AcquisitionFailure(err.to_string())
    }
}

impl From<arrow::error::ArrowError> for BenchError {
    fn from(err: arrow::error::ArrowError) -> Self {
        BenchError::AcquisitionFailure(err.to_string())
    }
}

impl From<object_store::Error> for BenchError {
    fn from(err: object_store::Error) -> Self {
        BenchError::AcquisitionFailure(err.to_string())
    }
}

impl From<zip::result::ZipError> for BenchError {
    fn from(err: zip::result::ZipError) -> Self {
        BenchError::AcquisitionFailure(err.to_string())
    }
}
