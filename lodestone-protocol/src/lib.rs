use std::io::Write;

use bytes::Bytes;
use codec::{
    var_int::{VarInt, VarIntType},
    Codec,
};
use ser::{packet::ServerPacket, NetworkReadExt, NetworkWriteExt, ReadingError, WritingError};
use thiserror::Error;

pub mod bytebuf;
pub mod codec;
pub mod ser;

pub use bytebuf::PacketBuf;
pub use lodestone_config::CodecConfig;

/// A bit set of statically known length, sent as `ceil(bits / 8)` raw bytes.
pub type FixedBitSet = Box<[u8]>;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ConnectionState {
    HandShake,
    Status,
    Login,
    Transfer,
    Config,
    Play,
}

#[derive(Debug, Error)]
#[error("{0} is not a valid handshake intent")]
pub struct InvalidConnectionState(pub VarIntType);

/// Maps the intent field of a handshake to the state it switches to.
impl TryFrom<VarInt> for ConnectionState {
    type Error = InvalidConnectionState;

    fn try_from(value: VarInt) -> Result<Self, Self::Error> {
        match value.0 {
            1 => Ok(Self::Status),
            2 => Ok(Self::Login),
            3 => Ok(Self::Transfer),
            other => Err(InvalidConnectionState(other)),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum PacketDirection {
    Serverbound,
    Clientbound,
}

/// A packet id with its still encoded fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPacket {
    pub id: i32,
    pub payload: Bytes,
}

impl RawPacket {
    /// Reads the id and takes everything after it as the payload.
    pub fn read(read: &mut impl NetworkReadExt) -> Result<Self, ReadingError> {
        let id = read.get_var_int()?;
        let id = i32::try_from(id)
            .map_err(|_| ReadingError::TooLarge(format!("packet id {id} is out of range")))?;
        let payload = read.get_rest_buffer()?;
        Ok(Self {
            id,
            payload: Bytes::from(payload),
        })
    }

    pub fn write(&self, write: &mut impl NetworkWriteExt) -> Result<(), WritingError> {
        write.write_var_int(&VarInt::from(self.id))?;
        write.write_rest_buffer(&self.payload)
    }

    pub fn write_to(&self, mut writer: impl Write) -> Result<(), WritingError> {
        let mut buf = PacketBuf::with_capacity(VarInt::MAX_SIZE.get() + self.payload.len());
        self.write(&mut buf)?;
        writer.write_all(buf.as_slice())?;
        Ok(())
    }

    /// Decodes the payload as `P`, which must use this packet's id.
    pub fn decode<P: ServerPacket>(&self, config: &CodecConfig) -> Result<P, ReadingError> {
        if self.id != P::PACKET_ID {
            return Err(ReadingError::UnknownDiscriminant {
                switch: "RawPacket",
                discriminant: self.id.to_string(),
            });
        }
        let mut buf = PacketBuf::from(self.payload.clone()).with_config(config.clone());
        P::read(&mut buf)
    }
}
