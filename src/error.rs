use thiserror::Error;

/// Classifies finder errors for programmatic matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed textual address or CIDR
    Format,
    /// Prefix length outside `[0, BITS]`
    InvalidPrefixLength,
    /// No stored network equal to the requested one
    NotFound,
    /// Metadata read of an unset key
    MissingAttribute,
    /// Metadata key shadowing a fixed network field
    ReservedField,
    /// Network list could not be parsed or read
    Parse,
    /// I/O failure while reading a network list
    Io,
}

/// Network finder error types
#[derive(Error, Debug)]
pub enum FinderError {
    #[error("Invalid address format: {0}")]
    Format(String),

    #[error("Invalid prefix length {length}: must be between 0 and {bits}")]
    InvalidPrefixLength { length: u32, bits: u8 },

    #[error("Network not found: {0}")]
    NotFound(String),

    #[error("Missing attribute: {0}")]
    MissingAttribute(String),

    #[error("Reserved field name used as attribute: {0}")]
    ReservedField(String),

    #[error("Parse error at line {line}: {message}")]
    ParseErrorAtLine { line: usize, message: String },

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl FinderError {
    /// Returns the error category.
    pub fn kind(&self) -> ErrorKind {
        match self {
            FinderError::Format(_) => ErrorKind::Format,
            FinderError::InvalidPrefixLength { .. } => ErrorKind::InvalidPrefixLength,
            FinderError::NotFound(_) => ErrorKind::NotFound,
            FinderError::MissingAttribute(_) => ErrorKind::MissingAttribute,
            FinderError::ReservedField(_) => ErrorKind::ReservedField,
            FinderError::ParseErrorAtLine { .. } | FinderError::ParseError(_) => ErrorKind::Parse,
            FinderError::IoError(_) => ErrorKind::Io,
        }
    }
}

pub type Result<T> = std::result::Result<T, FinderError>;
