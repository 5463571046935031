use crate::codec::{
    switch::{unknown_read_discriminant, Switch},
    var_int::{VarInt, VarIntType},
};

use super::{NetworkReadExt, NetworkWriteExt, ReadingError, WritingError};

pub trait Packet {
    const PACKET_ID: i32;
}

/// A packet this side sends.
pub trait ClientPacket: Packet {
    /// Writes the fields of the packet, without its id.
    fn write_packet_data(&self, write: &mut impl NetworkWriteExt) -> Result<(), WritingError>;

    fn write(&self, write: &mut impl NetworkWriteExt) -> Result<(), WritingError> {
        write.write_var_int(&VarInt::from(Self::PACKET_ID))?;
        self.write_packet_data(write)
    }
}

/// A packet this side receives. The id has already been consumed.
pub trait ServerPacket: Packet + Sized {
    fn read(read: &mut impl NetworkReadExt) -> Result<Self, ReadingError>;
}

/// Reads a packet id and decodes the matching packet, like a switch keyed
/// on the id.
pub trait PacketFactory {
    type Payload: Switch<Discriminant = VarInt>;

    fn packet_id(payload: &Self::Payload) -> VarInt;

    fn read_packet(read: &mut impl NetworkReadExt) -> Result<Self::Payload, ReadingError> {
        let id = read.get_var_int()?;
        read.get_switch(&id)
    }

    fn write_packet(
        write: &mut impl NetworkWriteExt,
        payload: &Self::Payload,
    ) -> Result<(), WritingError> {
        let id = Self::packet_id(payload);
        write.write_var_int(&id)?;
        write.write_switch(payload, &id)
    }
}

/// Decodes `P` if `id` is its packet id.
pub fn read_if<P: ServerPacket>(
    read: &mut impl NetworkReadExt,
    id: &VarInt,
) -> Option<Result<P, ReadingError>> {
    (id.0 == VarIntType::from(P::PACKET_ID)).then(|| P::read(read))
}

/// The error a packet factory returns for an id none of its packets use.
pub fn unknown_packet<S: Switch<Discriminant = VarInt>>(id: &VarInt) -> ReadingError {
    unknown_read_discriminant::<S>(id)
}
