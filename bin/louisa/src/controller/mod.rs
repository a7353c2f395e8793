mod provider;
mod sessions;

pub use provider::{LightSession, MatterProvider, SessionProvider};
pub use sessions::SessionStore;

use std::sync::Arc;

use log::{debug, error, info, warn};
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::{self, JoinHandle};
use tokio_util::sync::CancellationToken;

use crate::device::Device;
use crate::{Error, Result};

const QUEUE_CAPACITY: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    On,
    Off,
}

#[derive(Debug)]
struct Command {
    device: Device,
    action: Action,
}

/// Accepts switch requests and drives them to devices from a single
/// background worker, one command at a time.
pub struct Controller<P: SessionProvider> {
    queue: mpsc::Sender<Command>,
    sessions: Arc<SessionStore<P>>,
    cancel: CancellationToken,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl<P: SessionProvider> Controller<P> {
    pub fn new(provider: P, devices: Vec<Device>) -> Controller<P> {
        let sessions = Arc::new(SessionStore::new(provider));
        let (queue, commands) = mpsc::channel(QUEUE_CAPACITY);
        let (ready_tx, ready_rx) = watch::channel(false);
        let cancel = CancellationToken::new();

        let warm_up = task::spawn(set_up_devices(
            sessions.clone(),
            devices,
            ready_tx,
            cancel.clone(),
        ));
        let worker = task::spawn(process_queue(
            sessions.clone(),
            commands,
            ready_rx,
            cancel.clone(),
        ));

        Controller {
            queue,
            sessions,
            cancel,
            tasks: Mutex::new(vec![warm_up, worker]),
        }
    }

    pub async fn turn_on(&self, device: Device) -> Result<()> {
        self.enqueue(device, Action::On).await
    }

    pub async fn turn_off(&self, device: Device) -> Result<()> {
        self.enqueue(device, Action::Off).await
    }

    /// Waits for queue space when the queue is full; fails only once the
    /// worker is gone.
    async fn enqueue(&self, device: Device, action: Action) -> Result<()> {
        self.queue
            .send(Command { device, action })
            .await
            .map_err(|_| Error::QueueClosed)
    }

    pub async fn close(&self) {
        self.cancel.cancel();

        for task in self.tasks.lock().await.drain(..) {
            if let Err(err) = task.await {
                error!("controller task failed: {err}");
            }
        }

        self.sessions.close_all().await;
        info!("controller closed");
    }
}

async fn set_up_devices<P: SessionProvider>(
    sessions: Arc<SessionStore<P>>,
    devices: Vec<Device>,
    ready: watch::Sender<bool>,
    cancel: CancellationToken,
) {
    for device in &devices {
        if cancel.is_cancelled() {
            return;
        }

        if let Err(err) = sessions.ensure(device).await {
            error!("unable to set up device {}: {}", device.name, err);
        }
    }

    let _ = ready.send(true);
    info!("all devices are now ready");
}

async fn process_queue<P: SessionProvider>(
    sessions: Arc<SessionStore<P>>,
    mut commands: mpsc::Receiver<Command>,
    mut ready: watch::Receiver<bool>,
    cancel: CancellationToken,
) {
    // commands stay queued until warm-up has had its chance
    tokio::select! {
        _ = cancel.cancelled() => {
            debug!("worker terminating before devices were ready");
            return;
        }
        result = ready.wait_for(|ready| *ready) => {
            if result.is_err() {
                warn!("warm-up aborted, executing commands anyway");
            }
        }
    }

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!("worker terminating");
                return;
            }
            command = commands.recv() => match command {
                Some(command) => {
                    if let Err(err) = execute(&sessions, &command).await {
                        error!(
                            "unable to switch device {}: {}",
                            command.device.name, err
                        );
                    }
                }
                None => {
                    debug!("command queue closed, worker terminating");
                    return;
                }
            }
        }
    }
}

/// One reconnect retry per command; a second failure is final and the next
/// command starts over.
async fn execute<P: SessionProvider>(
    sessions: &SessionStore<P>,
    command: &Command,
) -> Result<()> {
    let session = sessions.ensure(&command.device).await?;

    match session.switch(command.action).await {
        Ok(()) => return Ok(()),
        Err(err) => warn!(
            "error switching device {} - will attempt again: {}",
            command.device.name, err
        ),
    }

    sessions.invalidate(&command.device).await;

    let session = sessions.ensure(&command.device).await?;
    session.switch(command.action).await
}
