use std::num::NonZeroUsize;

use crate::ser::{NetworkReadExt, NetworkWriteExt, ReadingError, WritingError};

pub mod bit_set;
pub mod bitfield;
pub mod block_pos;
pub mod id_or;
pub mod identifier;
pub mod length;
pub mod switch;
pub mod terminated;
pub mod var_int;

pub trait Codec<T> {
    /// The largest number of bytes an encoded value can take.
    const MAX_SIZE: NonZeroUsize;

    fn written_size(&self) -> usize;

    fn encode(&self, write: &mut impl NetworkWriteExt) -> Result<(), WritingError>;

    fn decode(read: &mut impl NetworkReadExt) -> Result<T, ReadingError>;
}

#[doc(hidden)]
pub const fn non_zero(size: usize) -> NonZeroUsize {
    match NonZeroUsize::new(size) {
        Some(size) => size,
        None => panic!("codec size must not be zero"),
    }
}
