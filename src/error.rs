//! Common errors for the writer.

/// The kinds of error the writer can produce, collapsed into the two
/// buckets parquet2 uses: a general failure of a precondition, and a
/// violation of the Parquet format itself.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ParquetError {
    /// A general error: bad input, conflicting options, unsupported
    /// combination of type and encoding, etc.
    General(String),
    /// The writer was asked to produce something that is not
    /// representable in the Parquet format (e.g. more than `i32::MAX`
    /// bytes in a single page).
    OutOfSpec(String),
}

impl std::fmt::Display for ParquetError {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ParquetError::General(message) => write!(fmt, "{}", message),
            ParquetError::OutOfSpec(message) => write!(fmt, "{}", message),
        }
    }
}

impl std::error::Error for ParquetError {}

impl From<std::io::Error> for ParquetError {
    fn from(e: std::io::Error) -> ParquetError {
        ParquetError::General(format!("underlying IO error: {}", e))
    }
}

/// A specialized `Result` for this crate's errors.
pub type Result<T> = std::result::Result<T, ParquetError>;

macro_rules! general_err {
    ($fmt:expr) => (crate::error::ParquetError::General($fmt.to_owned()));
    ($fmt:expr, $($args:expr),*) => (crate::error::ParquetError::General(format!($fmt, $($args),*)));
}

macro_rules! out_of_spec_err {
    ($fmt:expr) => (crate::error::ParquetError::OutOfSpec($fmt.to_owned()));
    ($fmt:expr, $($args:expr),*) => (crate::error::ParquetError::OutOfSpec(format!($fmt, $($args),*)));
}
