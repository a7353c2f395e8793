mod channel;
mod message;

mod error;
pub use error::Error;

pub use channel::{SecureChannel, DEFAULT_PORT};
pub use message::{Frame, OnOffCommand, Payload, DEFAULT_ENDPOINT, ON_OFF_CLUSTER};

pub type Result<T> = std::result::Result<T, Error>;
