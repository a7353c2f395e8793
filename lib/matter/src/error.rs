use std::fmt;

#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    Timeout(tokio::time::error::Elapsed),
    MalformedFrame(&'static str),
    DeviceStatus(u8),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<tokio::time::error::Elapsed> for Error {
    fn from(err: tokio::time::error::Elapsed) -> Self {
        Self::Timeout(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io error: {err}"),
            Self::Timeout(err) => write!(f, "timeout error: {err}"),
            Self::MalformedFrame(reason) => write!(f, "malformed frame: {reason}"),
            Self::DeviceStatus(status) => write!(f, "status received was {status} instead of 0"),
        }
    }
}

impl std::error::Error for Error {}
