use std::{
    fmt::{self, Display},
    num::{NonZeroUsize, TryFromIntError},
};

use crate::ser::{NetworkReadExt, NetworkWriteExt, ReadingError, WritingError};

use super::{non_zero, Codec};

pub type VarIntType = i64;

/// A variable length integer: 7 bits per byte, least significant group
/// first, high bit set while more bytes follow.
///
/// The value is encoded as its unsigned two's complement bit pattern, so
/// every negative number takes the full 10 bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VarInt(pub VarIntType);

impl VarInt {
    const SEGMENT_BITS: u8 = 0x7F;
    const CONTINUE_BIT: u8 = 0x80;
}

impl Codec<Self> for VarInt {
    /// The maximum number of bytes a `VarInt` can occupy.
    const MAX_SIZE: NonZeroUsize = non_zero(10);

    /// Returns the exact number of bytes this VarInt will write when
    /// [`Codec::encode`] is called, assuming no error occurs.
    fn written_size(&self) -> usize {
        match self.0 as u64 {
            0 => 1,
            n => (u64::BITS - n.leading_zeros()).div_ceil(7) as usize,
        }
    }

    fn encode(&self, write: &mut impl NetworkWriteExt) -> Result<(), WritingError> {
        let mut val = self.0 as u64;
        loop {
            let byte = (val & Self::SEGMENT_BITS as u64) as u8;
            val >>= 7;
            if val == 0 {
                return write.write_u8_be(byte);
            }
            write.write_u8_be(byte | Self::CONTINUE_BIT)?;
        }
    }

    fn decode(read: &mut impl NetworkReadExt) -> Result<Self, ReadingError> {
        let mut val = 0u64;
        for i in 0..Self::MAX_SIZE.get() {
            let byte = read.get_u8_be()?;
            // The tenth group only has room for one bit, the rest shifts out
            val |= u64::from(byte & Self::SEGMENT_BITS) << (i * 7);
            if byte & Self::CONTINUE_BIT == 0 {
                return Ok(VarInt(val as VarIntType));
            }
        }
        Err(ReadingError::VarIntTooLong)
    }
}

impl Display for VarInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<i64> for VarInt {
    fn from(value: i64) -> Self {
        VarInt(value)
    }
}

impl From<i32> for VarInt {
    fn from(value: i32) -> Self {
        VarInt(value.into())
    }
}

impl From<u32> for VarInt {
    fn from(value: u32) -> Self {
        VarInt(value.into())
    }
}

impl From<u16> for VarInt {
    fn from(value: u16) -> Self {
        VarInt(value.into())
    }
}

impl From<u8> for VarInt {
    fn from(value: u8) -> Self {
        VarInt(value.into())
    }
}

impl TryFrom<usize> for VarInt {
    type Error = TryFromIntError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Ok(VarInt(value.try_into()?))
    }
}

impl From<VarInt> for i64 {
    fn from(value: VarInt) -> Self {
        value.0
    }
}

impl TryFrom<VarInt> for i32 {
    type Error = TryFromIntError;

    fn try_from(value: VarInt) -> Result<Self, Self::Error> {
        value.0.try_into()
    }
}

impl TryFrom<VarInt> for usize {
    type Error = TryFromIntError;

    fn try_from(value: VarInt) -> Result<Self, Self::Error> {
        value.0.try_into()
    }
}
