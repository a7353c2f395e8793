use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use log::{debug, trace};
use tokio::net::UdpSocket;
use tokio::time::timeout;

use crate::message::{Frame, OnOffCommand, Payload, DEFAULT_ENDPOINT, ON_OFF_CLUSTER};
use crate::{Error, Result};

/// UDP port devices listen on unless configured otherwise.
pub const DEFAULT_PORT: u16 = 5540;

const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);
const READ_TIMEOUT: Duration = Duration::from_secs(10);

/// An established, ordered channel to one device. Cloning shares the
/// underlying socket and message counter.
#[derive(Debug, Clone)]
pub struct SecureChannel {
    socket: Arc<UdpSocket>,
    session_id: u16,
    counter: Arc<AtomicU32>,
}

impl SecureChannel {
    pub async fn open(addr: Ipv4Addr, port: u16, device_id: u64) -> Result<SecureChannel> {
        let socket = UdpSocket::bind("0.0.0.0:0").await?;
        socket.connect((addr, port)).await?;

        let counter = u32::from(rand::random::<u16>());
        let request = Frame {
            session_id: 0,
            counter,
            payload: Payload::SessionRequest { device_id },
        };

        socket.send(&request.to_bytes()).await?;
        trace!("sent session request to {}:{}", addr, port);

        let mut buffer = [0; 1024];

        loop {
            let size = timeout(HANDSHAKE_TIMEOUT, socket.recv(&mut buffer)).await??;
            let frame = Frame::read_from(&buffer[..size])?;

            match frame.payload {
                Payload::SessionAck if frame.counter == counter => {
                    debug!(
                        "session {} established with device {:x}",
                        frame.session_id, device_id
                    );

                    return Ok(SecureChannel {
                        socket: Arc::new(socket),
                        session_id: frame.session_id,
                        counter: Arc::new(AtomicU32::new(counter.wrapping_add(1))),
                    });
                }
                payload => trace!("skipping {:?} while waiting for session ack", payload),
            }
        }
    }

    pub fn session_id(&self) -> u16 {
        self.session_id
    }

    pub async fn switch(&self, command: OnOffCommand) -> Result<()> {
        debug!(
            "switching session {} to {:?}",
            self.session_id, command
        );

        self.invoke(DEFAULT_ENDPOINT, ON_OFF_CLUSTER, command.command_id())
            .await
    }

    pub async fn invoke(&self, endpoint: u8, cluster: u32, command: u32) -> Result<()> {
        let counter = self.counter.fetch_add(1, Ordering::Relaxed);
        let request = Frame {
            session_id: self.session_id,
            counter,
            payload: Payload::InvokeRequest {
                endpoint,
                cluster,
                command,
            },
        };

        self.send(request).await?;

        loop {
            let response = self.receive().await?;

            match response.payload {
                Payload::InvokeResponse { status } if response.counter == counter => {
                    if status != 0 {
                        return Err(Error::DeviceStatus(status));
                    }

                    return Ok(());
                }
                payload => trace!("skipping {:?} while waiting for invoke response", payload),
            }
        }
    }

    pub async fn send(&self, frame: Frame) -> Result<()> {
        self.socket.send(&frame.to_bytes()).await?;
        Ok(())
    }

    pub async fn receive(&self) -> Result<Frame> {
        let mut buffer = [0; 1024];

        let size = timeout(READ_TIMEOUT, self.socket.recv(&mut buffer)).await??;
        Frame::read_from(&buffer[..size])
    }

    pub async fn close(&self) {
        let frame = Frame {
            session_id: self.session_id,
            counter: self.counter.fetch_add(1, Ordering::Relaxed),
            payload: Payload::Close,
        };

        if let Err(err) = self.send(frame).await {
            debug!("error sending close frame: {err}");
        }
    }
}
