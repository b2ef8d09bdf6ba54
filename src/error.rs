use thiserror::Error;

pub type PortationResult<T> = Result<T, PortationError>;

/// Broad classification of a [`PortationError`], for callers that branch on
/// the failure category rather than on the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    OutOfBounds,
    NotFound,
    Unsupported,
    Io,
    Format,
}

#[derive(Error, Debug)]
pub enum PortationError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Out of bounds: {0}")]
    OutOfBounds(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unsupported: {0}")]
    Unsupported(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),
}

impl PortationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PortationError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            PortationError::OutOfBounds(_) => ErrorKind::OutOfBounds,
            PortationError::NotFound(_) => ErrorKind::NotFound,
            PortationError::Unsupported(_) => ErrorKind::Unsupported,
            PortationError::Io(_) => ErrorKind::Io,
            PortationError::Csv(e) if e.is_io_error() => ErrorKind::Io,
            PortationError::Csv(_)
            | PortationError::Yaml(_)
            | PortationError::Json(_)
            | PortationError::Spreadsheet(_) => ErrorKind::Format,
        }
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        PortationError::InvalidArgument(message.into())
    }

    pub(crate) fn out_of_bounds(message: impl Into<String>) -> Self {
        PortationError::OutOfBounds(message.into())
    }
}

impl From<rust_xlsxwriter::XlsxError> for PortationError {
    fn from(e: rust_xlsxwriter::XlsxError) -> Self {
        PortationError::Spreadsheet(e.to_string())
    }
}

impl From<calamine::Error> for PortationError {
    fn from(e: calamine::Error) -> Self {
        match e {
            calamine::Error::Io(e) => PortationError::Io(e),
            other => PortationError::Spreadsheet(other.to_string()),
        }
    }
}
