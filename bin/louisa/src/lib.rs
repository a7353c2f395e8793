mod controller;
mod device;
mod error;
mod node_red;
mod pushover;
mod web_service;

pub use controller::{Action, Controller, LightSession, MatterProvider, SessionProvider, SessionStore};
pub use device::{known_devices, Device, Registry, DOORBELL_CHIME, SITTING_ROOM_LIGHT};
pub use error::Error;
pub use node_red::NodeRedClient;
pub use pushover::PushoverClient;
pub use web_service::{router, AppState};

pub type MatterController = Controller<MatterProvider>;

pub type Result<T> = std::result::Result<T, Error>;
