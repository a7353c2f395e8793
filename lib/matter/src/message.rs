use crate::{Error, Result};

/// On/Off cluster of the interaction model.
pub const ON_OFF_CLUSTER: u32 = 0x0006;

/// Lights expose their On/Off cluster on endpoint 1.
pub const DEFAULT_ENDPOINT: u8 = 1;

const MAGIC: [u8; 2] = [0x4d, 0x54];
const HEADER_LEN: usize = 16;

const KIND_SESSION_REQUEST: u8 = 0x01;
const KIND_SESSION_ACK: u8 = 0x02;
const KIND_INVOKE_REQUEST: u8 = 0x03;
const KIND_INVOKE_RESPONSE: u8 = 0x04;
const KIND_CLOSE: u8 = 0x05;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnOffCommand {
    Off,
    On,
}

impl OnOffCommand {
    pub fn command_id(self) -> u32 {
        match self {
            Self::Off => 0x00,
            Self::On => 0x01,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub session_id: u16,
    pub counter: u32,
    pub payload: Payload,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    SessionRequest { device_id: u64 },
    SessionAck,
    InvokeRequest { endpoint: u8, cluster: u32, command: u32 },
    InvokeResponse { status: u8 },
    Close,
}

impl Payload {
    fn kind(&self) -> u8 {
        match self {
            Self::SessionRequest { .. } => KIND_SESSION_REQUEST,
            Self::SessionAck => KIND_SESSION_ACK,
            Self::InvokeRequest { .. } => KIND_INVOKE_REQUEST,
            Self::InvokeResponse { .. } => KIND_INVOKE_RESPONSE,
            Self::Close => KIND_CLOSE,
        }
    }

    fn len(&self) -> usize {
        match self {
            Self::SessionRequest { .. } => 8,
            Self::SessionAck => 0,
            Self::InvokeRequest { .. } => 9,
            Self::InvokeResponse { .. } => 1,
            Self::Close => 0,
        }
    }
}

impl Frame {
    pub fn len(&self) -> usize {
        HEADER_LEN + self.payload.len()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = vec![0; self.len()];

        bytes[0..2].copy_from_slice(&MAGIC);
        bytes[2..4].copy_from_slice(&(self.len() as u16).to_be_bytes());
        bytes[4] = self.payload.kind();
        bytes[6..8].copy_from_slice(&self.session_id.to_be_bytes());
        bytes[8..12].copy_from_slice(&self.counter.to_be_bytes());

        match &self.payload {
            Payload::SessionRequest { device_id } => {
                bytes[16..24].copy_from_slice(&device_id.to_be_bytes());
            }
            Payload::InvokeRequest {
                endpoint,
                cluster,
                command,
            } => {
                bytes[16] = *endpoint;
                bytes[17..21].copy_from_slice(&cluster.to_be_bytes());
                bytes[21..25].copy_from_slice(&command.to_be_bytes());
            }
            Payload::InvokeResponse { status } => bytes[16] = *status,
            Payload::SessionAck | Payload::Close => (),
        }

        bytes
    }

    pub fn read_from(bytes: &[u8]) -> Result<Frame> {
        if bytes.len() < HEADER_LEN {
            return Err(Error::MalformedFrame("truncated header"));
        }

        if bytes[0..2] != MAGIC {
            return Err(Error::MalformedFrame("invalid magic"));
        }

        let length = {
            let mut buffer = [0u8; 2];
            buffer.copy_from_slice(&bytes[2..4]);
            u16::from_be_bytes(buffer) as usize
        };

        if length != bytes.len() {
            return Err(Error::MalformedFrame("length mismatch"));
        }

        let session_id = {
            let mut buffer = [0u8; 2];
            buffer.copy_from_slice(&bytes[6..8]);
            u16::from_be_bytes(buffer)
        };

        let counter = {
            let mut buffer = [0u8; 4];
            buffer.copy_from_slice(&bytes[8..12]);
            u32::from_be_bytes(buffer)
        };

        let body = &bytes[HEADER_LEN..];
        let payload = match bytes[4] {
            KIND_SESSION_REQUEST => {
                if body.len() != 8 {
                    return Err(Error::MalformedFrame("truncated session request"));
                }

                let mut buffer = [0u8; 8];
                buffer.copy_from_slice(body);
                Payload::SessionRequest {
                    device_id: u64::from_be_bytes(buffer),
                }
            }
            KIND_SESSION_ACK => Payload::SessionAck,
            KIND_INVOKE_REQUEST => {
                if body.len() != 9 {
                    return Err(Error::MalformedFrame("truncated invoke request"));
                }

                let mut cluster = [0u8; 4];
                cluster.copy_from_slice(&body[1..5]);

                let mut command = [0u8; 4];
                command.copy_from_slice(&body[5..9]);

                Payload::InvokeRequest {
                    endpoint: body[0],
                    cluster: u32::from_be_bytes(cluster),
                    command: u32::from_be_bytes(command),
                }
            }
            KIND_INVOKE_RESPONSE => {
                if body.len() != 1 {
                    return Err(Error::MalformedFrame("truncated invoke response"));
                }

                Payload::InvokeResponse { status: body[0] }
            }
            KIND_CLOSE => Payload::Close,
            _ => return Err(Error::MalformedFrame("unknown frame kind")),
        };

        Ok(Frame {
            session_id,
            counter,
            payload,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    const SESSION_REQUEST: [u8; 24] =
        hex!("4d54 0018 0100 0000 0000 0001 0000 0000 0000 0000 0000 0101");

    const SESSION_ACK: [u8; 16] = hex!("4d54 0010 0200 002a 0000 0001 0000 0000");

    const INVOKE_REQUEST: [u8; 25] =
        hex!("4d54 0019 0300 002a 0000 0007 0000 0000 0100 0000 0600 0000 01");

    const INVOKE_RESPONSE: [u8; 17] = hex!("4d54 0011 0400 002a 0000 0007 0000 0000 03");

    #[test]
    fn test_session_request_write() {
        let frame = Frame {
            session_id: 0,
            counter: 1,
            payload: Payload::SessionRequest { device_id: 0x101 },
        };

        assert_eq!(frame.to_bytes(), SESSION_REQUEST);
    }

    #[test]
    fn test_session_ack_read() {
        let frame = Frame::read_from(&SESSION_ACK).unwrap();

        assert_eq!(frame.session_id, 0x2a);
        assert_eq!(frame.counter, 1);
        assert_eq!(frame.payload, Payload::SessionAck);
    }

    #[test]
    fn test_invoke_request_write() {
        let frame = Frame {
            session_id: 0x2a,
            counter: 7,
            payload: Payload::InvokeRequest {
                endpoint: DEFAULT_ENDPOINT,
                cluster: ON_OFF_CLUSTER,
                command: OnOffCommand::On.command_id(),
            },
        };

        assert_eq!(frame.to_bytes(), INVOKE_REQUEST);
    }

    #[test]
    fn test_invoke_response_read() {
        let frame = Frame::read_from(&INVOKE_RESPONSE).unwrap();

        assert_eq!(frame.session_id, 0x2a);
        assert_eq!(frame.counter, 7);
        assert_eq!(frame.payload, Payload::InvokeResponse { status: 3 });
    }

    #[test]
    fn test_read_invalid_magic() {
        let mut bytes = SESSION_ACK;
        bytes[0] = 0x21;

        let error = Frame::read_from(&bytes).unwrap_err();
        assert!(matches!(error, Error::MalformedFrame("invalid magic")));
    }

    #[test]
    fn test_read_length_mismatch() {
        let error = Frame::read_from(&INVOKE_REQUEST[..20]).unwrap_err();
        assert!(matches!(error, Error::MalformedFrame("length mismatch")));
    }

    #[test]
    fn test_read_unknown_kind() {
        let mut bytes = SESSION_ACK;
        bytes[4] = 0x09;

        let error = Frame::read_from(&bytes).unwrap_err();
        assert!(matches!(error, Error::MalformedFrame("unknown frame kind")));
    }
}
