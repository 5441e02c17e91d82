use std::{fmt, io};

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub enum CliError {
    InvalidArgument(String),
    Qelim(qelim::Error),
    Io(io::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CliError::InvalidArgument(message) => write!(f, "invalid argument: {}", message),
            CliError::Qelim(e) => write!(f, "{}", e),
            CliError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<qelim::Error> for CliError {
    fn from(e: qelim::Error) -> Self {
        match e {
            qelim::Error::Io(e) => Self::Io(e),
            other => Self::Qelim(other),
        }
    }
}
