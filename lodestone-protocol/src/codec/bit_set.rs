use std::num::NonZeroUsize;

use crate::ser::{NetworkReadExt, NetworkWriteExt, ReadingError, WritingError};

use super::{length::LengthPrefix, non_zero, var_int::VarInt, Codec};

/// A growable bit set sent as a VarInt word count followed by that many
/// big-endian i64 words.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitSet(pub Box<[i64]>);

impl BitSet {
    /// Whether bit `index` is set; bits past the last word read as clear.
    pub fn get(&self, index: usize) -> bool {
        self.0
            .get(index / 64)
            .is_some_and(|word| word & (1 << (index % 64)) != 0)
    }
}

impl Codec<Self> for BitSet {
    const MAX_SIZE: NonZeroUsize = non_zero(10 + 8 * i16::MAX as usize);

    fn written_size(&self) -> usize {
        VarInt::try_from(self.0.len()).map_or(0, |len| len.written_size()) + 8 * self.0.len()
    }

    fn encode(&self, write: &mut impl NetworkWriteExt) -> Result<(), WritingError> {
        write.write_array(&self.0[..], LengthPrefix::VarInt, |write, word| {
            write.write_i64_be(*word)
        })
    }

    fn decode(read: &mut impl NetworkReadExt) -> Result<Self, ReadingError> {
        let words = read.get_list(|read| read.get_i64_be())?;
        Ok(BitSet(words.into_boxed_slice()))
    }
}

#[cfg(test)]
mod test {
    use crate::bytebuf::PacketBuf;
    use crate::codec::{bit_set::BitSet, Codec};
    use crate::ser::{NetworkReadExt, NetworkWriteExt, ReadingError};

    #[test]
    fn test_bitset_layout() {
        let bits = BitSet(vec![0b101, -1].into_boxed_slice());
        let mut buf = PacketBuf::new();
        buf.write_bitset(&bits).unwrap();
        assert_eq!(buf.size(), bits.written_size());
        assert_eq!(buf.as_slice()[0], 2);
        assert_eq!(&buf.as_slice()[1..9], &[0, 0, 0, 0, 0, 0, 0, 0b101]);

        let mut buf = PacketBuf::from(buf.to_bytes());
        let read = buf.get_bitset().unwrap();
        assert!(read.get(0));
        assert!(!read.get(1));
        assert!(read.get(2));
        assert!(read.get(127));
        assert!(!read.get(128));
        assert_eq!(read, bits);
    }

    #[test]
    fn test_bitset_short_words() {
        let mut buf = PacketBuf::from(vec![0x01, 0x00, 0x00]);
        assert!(matches!(
            buf.get_bitset(),
            Err(ReadingError::Underrun { .. })
        ));
    }

    #[test]
    fn test_fixed_bitset() {
        let mut buf = PacketBuf::new();
        let bits: crate::FixedBitSet = vec![0xFF, 0x01].into_boxed_slice();
        buf.write_fixed_bitset(&bits, 9).unwrap();
        assert!(buf.write_fixed_bitset(&bits, 20).is_err());

        let mut buf = PacketBuf::from(buf.to_bytes());
        assert_eq!(buf.get_fixed_bitset(9).unwrap(), bits);
        assert_eq!(buf.readable_bytes(), 0);
    }
}
