use std::collections::HashMap;
use std::sync::Arc;

use log::info;
use tokio::sync::{Mutex, RwLock};

use crate::device::Device;
use crate::Result;

use super::provider::{LightSession, SessionProvider};

type Slot<S> = Arc<Mutex<Option<S>>>;

/// At most one session per device name. The membership map hands out
/// per-device slots; the handshake itself runs under the slot lock, so
/// concurrent callers for one device share a single handshake while other
/// devices are not held up.
pub struct SessionStore<P: SessionProvider> {
    provider: P,
    slots: RwLock<HashMap<String, Slot<P::Session>>>,
}

impl<P: SessionProvider> SessionStore<P> {
    pub fn new(provider: P) -> SessionStore<P> {
        SessionStore {
            provider,
            slots: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the session for `device`, performing the handshake first if
    /// none is established yet.
    pub async fn ensure(&self, device: &Device) -> Result<P::Session> {
        let slot = self.slot(&device.name).await;
        let mut slot = slot.lock().await;

        if let Some(session) = slot.as_ref() {
            return Ok(session.clone());
        }

        let session = self.provider.open(device).await?;
        info!("device {} is set up", device.name);

        *slot = Some(session.clone());
        Ok(session)
    }

    async fn slot(&self, name: &str) -> Slot<P::Session> {
        if let Some(slot) = self.slots.read().await.get(name) {
            return slot.clone();
        }

        let mut slots = self.slots.write().await;

        // lost the race for the write lock, somebody else inserted it
        if let Some(slot) = slots.get(name) {
            return slot.clone();
        }

        let slot = Arc::new(Mutex::new(None));
        slots.insert(name.to_string(), slot.clone());

        slot
    }

    /// Closes and removes the session for `device`. Safe to call when none
    /// exists.
    pub async fn invalidate(&self, device: &Device) {
        let slot = self.slots.read().await.get(&device.name).cloned();

        let Some(slot) = slot else {
            info!(
                "device {} asked to be removed, but it doesn't exist",
                device.name
            );
            return;
        };

        let taken = slot.lock().await.take();
        match taken {
            Some(session) => {
                session.close().await;
                info!("device {} is removed", device.name);
            }
            None => info!(
                "device {} asked to be removed, but it doesn't exist",
                device.name
            ),
        }
    }

    pub async fn close_all(&self) {
        let slots: Vec<_> = self.slots.write().await.drain().collect();

        for (_, slot) in slots {
            if let Some(session) = slot.lock().await.take() {
                session.close().await;
            }
        }

        info!("closed all device sessions");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::net::Ipv4Addr;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::time;

    use crate::controller::Action;

    fn device(name: &str) -> Device {
        Device {
            name: name.to_string(),
            device_id: 0x1,
            addr: Ipv4Addr::LOCALHOST,
            port: 0,
        }
    }

    #[derive(Clone)]
    struct StubSession {
        id: usize,
        closed: Arc<AtomicBool>,
    }

    #[async_trait]
    impl LightSession for StubSession {
        async fn switch(&self, _action: Action) -> Result<()> {
            Ok(())
        }

        async fn close(&self) {
            self.closed.store(true, Ordering::SeqCst);
        }
    }

    #[derive(Default)]
    struct StubProvider {
        handshakes: AtomicUsize,
    }

    #[async_trait]
    impl SessionProvider for StubProvider {
        type Session = StubSession;

        async fn open(&self, _device: &Device) -> Result<StubSession> {
            let id = self.handshakes.fetch_add(1, Ordering::SeqCst);

            // widen the race window for concurrent callers
            time::sleep(Duration::from_millis(10)).await;

            Ok(StubSession {
                id,
                closed: Arc::new(AtomicBool::new(false)),
            })
        }
    }

    #[tokio::test]
    async fn test_concurrent_ensure_performs_one_handshake() {
        let store = Arc::new(SessionStore::new(StubProvider::default()));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.ensure(&device("bedroom-light")).await.unwrap() })
            })
            .collect();

        let mut ids = vec![];
        for task in tasks {
            ids.push(task.await.unwrap().id);
        }

        assert_eq!(store.provider.handshakes.load(Ordering::SeqCst), 1);
        assert!(ids.iter().all(|id| *id == ids[0]));
    }

    #[tokio::test]
    async fn test_ensure_for_different_devices() {
        let store = SessionStore::new(StubProvider::default());

        let first = store.ensure(&device("bedroom-light")).await.unwrap();
        let second = store.ensure(&device("hallway-light")).await.unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(store.provider.handshakes.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalidate_closes_and_forces_new_handshake() {
        let store = SessionStore::new(StubProvider::default());
        let target = device("bedroom-light");

        let session = store.ensure(&target).await.unwrap();
        store.invalidate(&target).await;

        assert!(session.closed.load(Ordering::SeqCst));

        let fresh = store.ensure(&target).await.unwrap();
        assert_ne!(fresh.id, session.id);
        assert_eq!(store.provider.handshakes.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalidate_without_session_is_noop() {
        let store = SessionStore::new(StubProvider::default());

        store.invalidate(&device("bedroom-light")).await;

        assert_eq!(store.provider.handshakes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_close_all() {
        let store = SessionStore::new(StubProvider::default());

        let first = store.ensure(&device("bedroom-light")).await.unwrap();
        let second = store.ensure(&device("hallway-light")).await.unwrap();

        store.close_all().await;

        assert!(first.closed.load(Ordering::SeqCst));
        assert!(second.closed.load(Ordering::SeqCst));
    }
}
