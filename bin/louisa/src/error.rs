use std::fmt;

#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    Matter(matter::Error),
    Http(chipp_http::Error),
    UrlParse(chipp_http::UrlParseError),
    AddrParse(std::net::AddrParseError),
    QueueClosed,
    UnknownDevice(String),
    MissingEnv(&'static str),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<matter::Error> for Error {
    fn from(err: matter::Error) -> Self {
        Self::Matter(err)
    }
}

impl From<chipp_http::Error> for Error {
    fn from(err: chipp_http::Error) -> Self {
        Self::Http(err)
    }
}

impl From<chipp_http::UrlParseError> for Error {
    fn from(err: chipp_http::UrlParseError) -> Self {
        Self::UrlParse(err)
    }
}

impl From<std::net::AddrParseError> for Error {
    fn from(err: std::net::AddrParseError) -> Self {
        Self::AddrParse(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io error: {err}"),
            Self::Matter(err) => write!(f, "matter error: {err}"),
            Self::Http(err) => write!(f, "http error: {err}"),
            Self::UrlParse(err) => write!(f, "url parse error: {err}"),
            Self::AddrParse(err) => write!(f, "address parse error: {err}"),
            Self::QueueClosed => write!(f, "command queue closed"),
            Self::UnknownDevice(name) => write!(f, "unknown device: {name}"),
            Self::MissingEnv(name) => write!(f, "{name} not found"),
        }
    }
}

impl std::error::Error for Error {}
