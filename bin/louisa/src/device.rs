use std::collections::HashMap;
use std::net::Ipv4Addr;

use crate::Result;

pub const SITTING_ROOM_LIGHT: &str = "sitting-room-light-01";
pub const DOORBELL_CHIME: &str = "doorbell-chime";

/// A configured lighting endpoint. `port` 0 means the protocol default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    pub name: String,
    pub device_id: u64,
    pub addr: Ipv4Addr,
    pub port: u16,
}

pub struct Registry {
    devices: HashMap<String, Device>,
}

impl Registry {
    pub fn new(devices: Vec<Device>) -> Registry {
        Registry {
            devices: devices
                .into_iter()
                .map(|device| (device.name.clone(), device))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Device> {
        self.devices.get(name)
    }
}

pub fn known_devices() -> Result<Vec<Device>> {
    Ok(vec![
        Device {
            name: SITTING_ROOM_LIGHT.to_string(),
            device_id: 0x101,
            addr: addr_from_env("SITTING_ROOM_LIGHT_IP", "10.0.1.21")?,
            port: 0,
        },
        Device {
            name: DOORBELL_CHIME.to_string(),
            device_id: 0x102,
            addr: addr_from_env("DOORBELL_CHIME_IP", "10.0.1.22")?,
            port: 0,
        },
    ])
}

fn addr_from_env(name: &str, default: &str) -> Result<Ipv4Addr> {
    Ok(std::env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .parse()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_lookup() {
        let device = Device {
            name: "hallway-light".to_string(),
            device_id: 0x1,
            addr: Ipv4Addr::new(10, 0, 1, 40),
            port: 0,
        };

        let registry = Registry::new(vec![device.clone()]);

        assert_eq!(registry.get("hallway-light"), Some(&device));
        assert_eq!(registry.get("attic-light"), None);
    }
}
