use std::num::NonZeroUsize;

use crate::ser::{NetworkReadExt, NetworkWriteExt, ReadingError, WritingError};

use super::{
    non_zero,
    switch::{unknown_read_discriminant, unknown_write_discriminant, Switch},
    var_int::VarInt,
    Codec,
};

/// Either a registry id or an inline value.
///
/// On the wire a VarInt `0` is followed by the inline value, any other `n`
/// stands for registry id `n - 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdOr<T> {
    Id(u32),
    Value(T),
}

impl<T> IdOr<T> {
    /// The discriminant this value is written with.
    pub fn discriminant(&self) -> VarInt {
        match self {
            IdOr::Id(id) => VarInt(i64::from(*id) + 1),
            IdOr::Value(_) => VarInt(0),
        }
    }
}

impl<T: Codec<T>> Switch for IdOr<T> {
    type Discriminant = VarInt;
    const NAME: &'static str = "IdOr";

    fn decode(read: &mut impl NetworkReadExt, id: &VarInt) -> Result<Self, ReadingError> {
        match id.0 {
            0 => Ok(IdOr::Value(T::decode(read)?)),
            id => id
                .checked_sub(1)
                .and_then(|id| u32::try_from(id).ok())
                .map(IdOr::Id)
                .ok_or_else(|| unknown_read_discriminant::<Self>(&VarInt(id))),
        }
    }

    fn encode(&self, write: &mut impl NetworkWriteExt, id: &VarInt) -> Result<(), WritingError> {
        if *id != self.discriminant() {
            return Err(unknown_write_discriminant::<Self>(id));
        }
        match self {
            IdOr::Id(_) => Ok(()),
            IdOr::Value(value) => value.encode(write),
        }
    }
}

impl<T: Codec<T>> Codec<Self> for IdOr<T> {
    const MAX_SIZE: NonZeroUsize = non_zero(VarInt::MAX_SIZE.get() + T::MAX_SIZE.get());

    fn written_size(&self) -> usize {
        let id_size = self.discriminant().written_size();
        match self {
            IdOr::Id(_) => id_size,
            IdOr::Value(value) => id_size + value.written_size(),
        }
    }

    fn encode(&self, write: &mut impl NetworkWriteExt) -> Result<(), WritingError> {
        let id = self.discriminant();
        write.write_var_int(&id)?;
        write.write_switch(self, &id)
    }

    fn decode(read: &mut impl NetworkReadExt) -> Result<Self, ReadingError> {
        let id = read.get_var_int()?;
        read.get_switch(&id)
    }
}
