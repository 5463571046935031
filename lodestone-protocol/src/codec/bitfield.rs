use std::fmt::Debug;

use crate::ser::{NetworkReadExt, NetworkWriteExt, ReadingError, WritingError};

/// A run of `width` bits starting `offset` bits above the least significant bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitRange {
    pub offset: u32,
    pub width: u32,
}

impl BitRange {
    pub const fn new(offset: u32, width: u32) -> Self {
        Self { offset, width }
    }

    pub const fn mask(self) -> u64 {
        if self.width >= u64::BITS {
            u64::MAX
        } else {
            (1 << self.width) - 1
        }
    }
}

/// An unsigned integer a [`Bitfield`] can be packed into.
pub trait BitfieldContainer: Copy + Default + Debug + Eq {
    const BITS: u32;

    fn to_u64(self) -> u64;

    /// Truncates to the container width.
    fn from_u64(value: u64) -> Self;

    fn read(read: &mut impl NetworkReadExt) -> Result<Self, ReadingError>;

    fn write(self, write: &mut impl NetworkWriteExt) -> Result<(), WritingError>;
}

macro_rules! impl_container {
    ($($ty:ty => $get:ident, $put:ident);* $(;)?) => {
        $(
            impl BitfieldContainer for $ty {
                const BITS: u32 = <$ty>::BITS;

                fn to_u64(self) -> u64 {
                    self.into()
                }

                fn from_u64(value: u64) -> Self {
                    value as $ty
                }

                fn read(read: &mut impl NetworkReadExt) -> Result<Self, ReadingError> {
                    read.$get()
                }

                fn write(self, write: &mut impl NetworkWriteExt) -> Result<(), WritingError> {
                    write.$put(self)
                }
            }
        )*
    };
}

impl_container! {
    u8 => get_u8_be, write_u8_be;
    u16 => get_u16_be, write_u16_be;
    u32 => get_u32_be, write_u32_be;
    u64 => get_u64_be, write_u64_be;
}

/// One integer read as several independently addressable bit ranges.
///
/// Values are masked to the range width on [`Bitfield::set`], nothing
/// outside the range is ever touched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Bitfield<T>(T);

impl<T: BitfieldContainer> Bitfield<T> {
    pub const fn from_raw(raw: T) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> T {
        self.0
    }

    pub fn get(self, range: BitRange) -> u64 {
        debug_assert!(range.offset + range.width <= T::BITS);
        self.0.to_u64().checked_shr(range.offset).unwrap_or(0) & range.mask()
    }

    /// Reads the range as a two's complement number of `range.width` bits.
    pub fn get_signed(self, range: BitRange) -> i64 {
        if range.width == 0 {
            return 0;
        }
        let shift = u64::BITS - range.width.min(u64::BITS);
        ((self.get(range) << shift) as i64) >> shift
    }

    pub fn set(&mut self, range: BitRange, value: u64) {
        debug_assert!(range.offset + range.width <= T::BITS);
        let mask = range.mask().checked_shl(range.offset).unwrap_or(0);
        let value = (value & range.mask()).checked_shl(range.offset).unwrap_or(0);
        self.0 = T::from_u64((self.0.to_u64() & !mask) | value);
    }

    pub fn with(mut self, range: BitRange, value: u64) -> Self {
        self.set(range, value);
        self
    }
}

/// Declares a named bitfield shape with one getter and setter per range.
///
/// ```
/// lodestone_protocol::bitfield! {
///     pub struct Nibbles(u8) {
///         high, set_high: unsigned u8 = 4, 4;
///         low, set_low: unsigned u8 = 0, 4;
///     }
/// }
///
/// let mut nibbles = Nibbles::default();
/// nibbles.set_high(0xA);
/// nibbles.set_low(0x5);
/// assert_eq!(nibbles.0.raw(), 0xA5);
/// ```
///
/// `signed` ranges are sign extended from their width on read.
#[macro_export]
macro_rules! bitfield {
    (@get unsigned $field:expr, $range:expr) => {
        $field.get($range)
    };
    (@get signed $field:expr, $range:expr) => {
        $field.get_signed($range)
    };
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident($container:ty) {
            $(
                $(#[$field_meta:meta])*
                $field:ident, $setter:ident: $kind:ident $ty:ty = $offset:expr, $width:expr;
            )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
        $vis struct $name(pub $crate::codec::bitfield::Bitfield<$container>);

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        impl $name {
            $(
                $(#[$field_meta])*
                pub fn $field(&self) -> $ty {
                    let range = $crate::codec::bitfield::BitRange::new($offset, $width);
                    $crate::bitfield!(@get $kind self.0, range) as $ty
                }

                pub fn $setter(&mut self, value: $ty) {
                    let range = $crate::codec::bitfield::BitRange::new($offset, $width);
                    self.0.set(range, value as u64);
                }
            )*
        }

        impl From<$crate::codec::bitfield::Bitfield<$container>> for $name {
            fn from(value: $crate::codec::bitfield::Bitfield<$container>) -> Self {
                Self(value)
            }
        }

        impl $crate::codec::Codec<Self> for $name {
            const MAX_SIZE: ::std::num::NonZeroUsize = $crate::codec::non_zero(
                <$container as $crate::codec::bitfield::BitfieldContainer>::BITS as usize / 8,
            );

            fn written_size(&self) -> usize {
                <Self as $crate::codec::Codec<Self>>::MAX_SIZE.get()
            }

            fn encode(
                &self,
                write: &mut impl $crate::ser::NetworkWriteExt,
            ) -> Result<(), $crate::ser::WritingError> {
                write.write_bitfield(self.0)
            }

            fn decode(
                read: &mut impl $crate::ser::NetworkReadExt,
            ) -> Result<Self, $crate::ser::ReadingError> {
                Ok(Self(read.get_bitfield()?))
            }
        }
    };
}

#[cfg(test)]
mod test {
    use crate::bytebuf::PacketBuf;
    use crate::codec::bitfield::{BitRange, Bitfield};
    use crate::codec::Codec;
    use crate::ser::{NetworkReadExt, NetworkWriteExt};

    const A: BitRange = BitRange::new(4, 4);
    const B: BitRange = BitRange::new(0, 4);

    crate::bitfield! {
        struct Nibbles(u8) {
            a, set_a: unsigned u8 = 4, 4;
            b, set_b: unsigned u8 = 0, 4;
        }
    }

    crate::bitfield! {
        struct Packed(u16) {
            flag, set_flag: unsigned u8 = 15, 1;
            delta, set_delta: signed i8 = 0, 5;
        }
    }

    #[test]
    fn test_nibbles_to_byte() {
        let field = Bitfield::<u8>::default().with(A, 0xA).with(B, 0x5);
        assert_eq!(field.raw(), 0xA5);

        let mut buf = PacketBuf::new();
        buf.write_bitfield(field).unwrap();
        assert_eq!(buf.as_slice(), &[0xA5]);

        let mut buf = PacketBuf::from(buf.to_bytes());
        let field = buf.get_bitfield::<u8>().unwrap();
        assert_eq!(field.get(A), 0xA);
        assert_eq!(field.get(B), 0x5);
    }

    #[test]
    fn test_set_does_not_perturb_neighbours() {
        let mut field = Bitfield::from_raw(0xA5u8);
        field.set(A, 0x3);
        assert_eq!(field.raw(), 0x35);
        field.set(B, 0xFF);
        assert_eq!(field.raw(), 0x3F);
    }

    #[test]
    fn test_signed_range() {
        let field = Bitfield::<u16>::default().with(BitRange::new(3, 5), (-3i64) as u64);
        assert_eq!(field.get_signed(BitRange::new(3, 5)), -3);
        assert_eq!(field.get(BitRange::new(0, 3)), 0);
        assert_eq!(field.get(BitRange::new(8, 8)), 0);
    }

    #[test]
    fn test_declared_shape() {
        let mut nibbles = Nibbles::default();
        nibbles.set_a(0xA);
        nibbles.set_b(0x5);
        assert_eq!(nibbles.0.raw(), 0xA5);

        let mut buf = PacketBuf::new();
        nibbles.encode(&mut buf).unwrap();
        let mut buf = PacketBuf::from(buf.to_bytes());
        let read = Nibbles::decode(&mut buf).unwrap();
        assert_eq!((read.a(), read.b()), (0xA, 0x5));
    }

    #[test]
    fn test_declared_signed_shape() {
        let mut packed = Packed::default();
        packed.set_flag(1);
        packed.set_delta(-16);
        assert_eq!(packed.0.raw(), 0x8010);
        assert_eq!(packed.delta(), -16);
        assert_eq!(packed.flag(), 1);
        assert_eq!(packed.written_size(), 2);
    }
}
