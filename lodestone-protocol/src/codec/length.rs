use crate::ser::{NetworkReadExt, NetworkWriteExt, ReadingError, WritingError};

use super::var_int::VarInt;

/// How the element or byte count in front of an array, string or buffer is
/// framed on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LengthPrefix {
    #[default]
    VarInt,
    U8,
    U16,
    U32,
    I32,
}

impl LengthPrefix {
    pub fn read(self, read: &mut impl NetworkReadExt) -> Result<usize, ReadingError> {
        let len = match self {
            Self::VarInt => read.get_var_int()?.0,
            Self::U8 => read.get_u8_be()?.into(),
            Self::U16 => read.get_u16_be()?.into(),
            Self::U32 => read.get_u32_be()?.into(),
            Self::I32 => read.get_i32_be()?.into(),
        };
        if len < 0 {
            return Err(ReadingError::NegativeLength(len));
        }
        usize::try_from(len)
            .map_err(|_| ReadingError::TooLarge(format!("length {len} does not fit in memory")))
    }

    pub fn write(self, write: &mut impl NetworkWriteExt, len: usize) -> Result<(), WritingError> {
        let too_large = || WritingError::TooLarge(format!("{len} does not fit a {self:?} prefix"));
        match self {
            Self::VarInt => write.write_var_int(&VarInt::try_from(len).map_err(|_| too_large())?),
            Self::U8 => write.write_u8_be(len.try_into().map_err(|_| too_large())?),
            Self::U16 => write.write_u16_be(len.try_into().map_err(|_| too_large())?),
            Self::U32 => write.write_u32_be(len.try_into().map_err(|_| too_large())?),
            Self::I32 => write.write_i32_be(len.try_into().map_err(|_| too_large())?),
        }
    }
}

#[cfg(test)]
mod test {
    use crate::bytebuf::PacketBuf;
    use crate::codec::length::LengthPrefix;
    use crate::ser::{NetworkReadExt, NetworkWriteExt, ReadingError, WritingError};

    #[test]
    fn test_prefix_widths() {
        let mut buf = PacketBuf::new();
        buf.write_length(LengthPrefix::VarInt, 300).unwrap();
        buf.write_length(LengthPrefix::U8, 3).unwrap();
        buf.write_length(LengthPrefix::U16, 3).unwrap();
        buf.write_length(LengthPrefix::I32, 3).unwrap();
        assert_eq!(
            buf.as_slice(),
            &[0xAC, 0x02, 0x03, 0x00, 0x03, 0x00, 0x00, 0x00, 0x03]
        );

        let mut buf = PacketBuf::from(buf.to_bytes());
        assert_eq!(LengthPrefix::VarInt.read(&mut buf).unwrap(), 300);
        assert_eq!(LengthPrefix::U8.read(&mut buf).unwrap(), 3);
        assert_eq!(LengthPrefix::U16.read(&mut buf).unwrap(), 3);
        assert_eq!(LengthPrefix::I32.read(&mut buf).unwrap(), 3);
    }

    #[test]
    fn test_negative_length() {
        let mut buf = PacketBuf::from(vec![0xFF, 0xFF, 0xFF, 0xFE]);
        assert!(matches!(
            LengthPrefix::I32.read(&mut buf),
            Err(ReadingError::NegativeLength(-2))
        ));
    }

    #[test]
    fn test_length_over_bound() {
        let mut buf = PacketBuf::from(vec![0x0A]);
        assert!(matches!(
            buf.get_length(LengthPrefix::VarInt, 9),
            Err(ReadingError::TooLarge(_))
        ));
    }

    #[test]
    fn test_prefix_overflow() {
        let mut buf = PacketBuf::new();
        assert!(matches!(
            buf.write_length(LengthPrefix::U8, 256),
            Err(WritingError::TooLarge(_))
        ));
        assert!(buf.is_empty());
    }
}
