use async_trait::async_trait;
use matter::{OnOffCommand, SecureChannel};

use crate::device::Device;
use crate::Result;

use super::Action;

impl From<Action> for OnOffCommand {
    fn from(action: Action) -> Self {
        match action {
            Action::On => OnOffCommand::On,
            Action::Off => OnOffCommand::Off,
        }
    }
}

/// An established session to one device.
#[async_trait]
pub trait LightSession: Clone + Send + Sync + 'static {
    async fn switch(&self, action: Action) -> Result<()>;
    async fn close(&self);
}

/// Opens sessions to devices; swapped out for a scripted one in tests.
#[async_trait]
pub trait SessionProvider: Send + Sync + 'static {
    type Session: LightSession;

    async fn open(&self, device: &Device) -> Result<Self::Session>;
}

pub struct MatterProvider;

#[async_trait]
impl SessionProvider for MatterProvider {
    type Session = SecureChannel;

    async fn open(&self, device: &Device) -> Result<SecureChannel> {
        let port = if device.port == 0 {
            matter::DEFAULT_PORT
        } else {
            device.port
        };

        Ok(SecureChannel::open(device.addr, port, device.device_id).await?)
    }
}

#[async_trait]
impl LightSession for SecureChannel {
    async fn switch(&self, action: Action) -> Result<()> {
        Ok(SecureChannel::switch(self, action.into()).await?)
    }

    async fn close(&self) {
        SecureChannel::close(self).await;
    }
}
