use std::fmt;
use std::num::ParseFloatError;

// type alias for Result for use across the library
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by elbowdx.
///
/// Routing and editing never fail; errors only arise when decoding
/// persisted data (fixed segments, JSON requests) and in the CLI front-end.
#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    Parse(String),
    /// Structurally invalid persisted data, e.g. a fixed segment missing `index`
    Format(String),
    Json(serde_json::Error),
    Cli(String),
    Other(Box<dyn std::error::Error>),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(source) => write!(f, "IO error: {source}"),
            Error::Parse(reason) => write!(f, "Parse error: {reason}"),
            Error::Format(reason) => write!(f, "Format error: {reason}"),
            Error::Json(source) => write!(f, "JSON error: {source}"),
            Error::Cli(reason) => write!(f, "{reason}"),
            Error::Other(source) => write!(f, "{source}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(source) => Some(source),
            Error::Json(source) => Some(source),
            Error::Other(e) => Some(&**e),
            Error::Parse(_) | Error::Format(_) | Error::Cli(_) => None,
        }
    }
}

impl Error {
    pub fn from_err<T>(err: T) -> Error
    where
        T: std::error::Error + 'static,
    {
        Error::Other(Box::new(err))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Error {
        Error::Json(err)
    }
}

impl From<ParseFloatError> for Error {
    fn from(err: ParseFloatError) -> Error {
        Error::Parse(format!("float: {err}"))
    }
}
