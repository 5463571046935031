use log::{trace, warn};
use lodestone_config::TreeTagPolicy;
use lodestone_nbt::{compound::NbtCompound, COMPOUND_ID, END_ID};
use thiserror::Error;

use crate::{
    bytebuf::{ReadCursor, WriteCursor},
    codec::{
        bit_set::BitSet,
        bitfield::{Bitfield, BitfieldContainer},
        block_pos::BlockPos,
        identifier::Identifier,
        length::LengthPrefix,
        switch::Switch,
        terminated::{CONTINUATION_BIT, END_OF_SEQUENCE},
        var_int::VarInt,
        Codec,
    },
    FixedBitSet,
};

pub mod packet;

#[derive(Debug, Error)]
pub enum ReadingError {
    #[error("Tried to read {requested} bytes but only {remaining} are left")]
    Underrun { requested: usize, remaining: usize },
    #[error("VarInt is longer than 10 bytes")]
    VarIntTooLong,
    #[error("{switch} has no arm for discriminant {discriminant}")]
    UnknownDiscriminant {
        switch: &'static str,
        discriminant: String,
    },
    #[error("too large: {0}")]
    TooLarge(String),
    #[error("negative length: {0}")]
    NegativeLength(i64),
    #[error("invalid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
    #[error("expected an End or Compound tag, found tag id {0}")]
    UnexpectedTreeTag(u8),
    #[error("NBT: {0}")]
    Nbt(#[from] lodestone_nbt::Error),
    #[error("invalid cursor operation: {0}")]
    InvalidCursor(String),
    #[error("{0}")]
    Message(String),
}

#[derive(Debug, Error)]
pub enum WritingError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("{switch} has no arm for discriminant {discriminant}")]
    UnknownDiscriminant {
        switch: &'static str,
        discriminant: String,
    },
    #[error("{value:?} has no numeric mapping")]
    UnsupportedMapping { value: String },
    #[error("too large: {0}")]
    TooLarge(String),
    #[error("NBT: {0}")]
    Nbt(#[from] lodestone_nbt::Error),
    #[error("invalid cursor operation: {0}")]
    InvalidCursor(String),
    #[error("Failed to serialize packet: {0}")]
    Message(String),
}

macro_rules! get_be {
    ($($name:ident => $ty:ty),* $(,)?) => {
        $(
            fn $name(&mut self) -> Result<$ty, ReadingError> {
                Ok(<$ty>::from_be_bytes(self.read_array()?))
            }
        )*
    };
}

macro_rules! write_be {
    ($($name:ident => $ty:ty),* $(,)?) => {
        $(
            fn $name(&mut self, data: $ty) -> Result<(), WritingError> {
                self.write_raw(&data.to_be_bytes());
                Ok(())
            }
        )*
    };
}

pub trait NetworkReadExt: ReadCursor + Sized {
    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], ReadingError> {
        let mut buf = [0u8; N];
        buf.copy_from_slice(self.read_raw(N)?);
        Ok(buf)
    }

    get_be! {
        get_u8_be => u8,
        get_i8_be => i8,
        get_u16_be => u16,
        get_i16_be => i16,
        get_u32_be => u32,
        get_i32_be => i32,
        get_u64_be => u64,
        get_i64_be => i64,
        get_f32_be => f32,
        get_f64_be => f64,
    }

    fn get_bool(&mut self) -> Result<bool, ReadingError> {
        Ok(self.get_u8_be()? != 0)
    }

    fn get_var_int(&mut self) -> Result<VarInt, ReadingError> {
        VarInt::decode(self)
    }

    /// Reads a count framed by `prefix`, rejecting negative values and
    /// anything above `bound`.
    fn get_length(&mut self, prefix: LengthPrefix, bound: usize) -> Result<usize, ReadingError> {
        let len = prefix.read(self)?;
        if len > bound {
            return Err(ReadingError::TooLarge(format!(
                "length {len} exceeds the limit of {bound}"
            )));
        }
        Ok(len)
    }

    fn read_boxed_slice(&mut self, count: usize) -> Result<Box<[u8]>, ReadingError> {
        Ok(self.read_raw(count)?.into())
    }

    fn get_buffer(&mut self, count: usize) -> Result<Box<[u8]>, ReadingError> {
        self.read_boxed_slice(count)
    }

    fn get_prefixed_buffer(&mut self, prefix: LengthPrefix) -> Result<Box<[u8]>, ReadingError> {
        let bound = self.config().limits.max_buffer_length;
        let len = self.get_length(prefix, bound)?;
        self.read_boxed_slice(len)
    }

    /// Everything up to the end of the record. Nothing can be decoded after this.
    fn get_rest_buffer(&mut self) -> Result<Box<[u8]>, ReadingError> {
        let remaining = self.readable_bytes();
        self.read_boxed_slice(remaining)
    }

    fn get_pstring(&mut self, prefix: LengthPrefix, bound: usize) -> Result<String, ReadingError> {
        let len = self.get_length(prefix, bound)?;
        let data = self.read_boxed_slice(len)?;
        Ok(String::from_utf8(data.into())?)
    }

    fn get_string_bounded(&mut self, bound: usize) -> Result<String, ReadingError> {
        self.get_pstring(LengthPrefix::VarInt, bound)
    }

    fn get_string(&mut self) -> Result<String, ReadingError> {
        let bound = self.config().limits.max_string_length;
        self.get_string_bounded(bound)
    }

    fn get_identifier(&mut self) -> Result<Identifier, ReadingError> {
        Identifier::decode(self)
    }

    fn get_uuid(&mut self) -> Result<uuid::Uuid, ReadingError> {
        Ok(uuid::Uuid::from_bytes(self.read_array()?))
    }

    fn get_bitset(&mut self) -> Result<BitSet, ReadingError> {
        BitSet::decode(self)
    }

    fn get_fixed_bitset(&mut self, bits: usize) -> Result<FixedBitSet, ReadingError> {
        self.read_boxed_slice(bits.div_ceil(8))
    }

    fn get_block_pos(&mut self) -> Result<BlockPos, ReadingError> {
        BlockPos::decode(self)
    }

    fn get_bitfield<T: BitfieldContainer>(&mut self) -> Result<Bitfield<T>, ReadingError> {
        Ok(Bitfield::from_raw(T::read(self)?))
    }

    fn get_option<G>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<G, ReadingError>,
    ) -> Result<Option<G>, ReadingError> {
        if self.get_bool()? {
            Ok(Some(parse(self)?))
        } else {
            Ok(None)
        }
    }

    /// Reads exactly `count` elements; the count itself was read by the caller.
    fn get_array<G>(
        &mut self,
        count: usize,
        mut parse: impl FnMut(&mut Self) -> Result<G, ReadingError>,
    ) -> Result<Vec<G>, ReadingError> {
        // `count` is untrusted, let the vec grow as elements actually decode
        let mut list = Vec::with_capacity(count.min(self.readable_bytes()));
        for _ in 0..count {
            list.push(parse(self)?);
        }
        Ok(list)
    }

    fn get_prefixed_array<G>(
        &mut self,
        prefix: LengthPrefix,
        parse: impl FnMut(&mut Self) -> Result<G, ReadingError>,
    ) -> Result<Vec<G>, ReadingError> {
        let bound = self.config().limits.max_array_length;
        let len = self.get_length(prefix, bound)?;
        self.get_array(len, parse)
    }

    fn get_list<G>(
        &mut self,
        parse: impl FnMut(&mut Self) -> Result<G, ReadingError>,
    ) -> Result<Vec<G>, ReadingError> {
        self.get_prefixed_array(LengthPrefix::VarInt, parse)
    }

    /// Decodes the arm of `S` selected by `discriminant`. The discriminant is
    /// never read here, the enclosing record has already decoded it.
    fn get_switch<S: Switch>(&mut self, discriminant: &S::Discriminant) -> Result<S, ReadingError> {
        S::decode(self, discriminant)
    }

    /// Reads a VarInt and maps it back to its symbolic name through `table`.
    fn get_mapped_str<'a>(&mut self, table: &[(&'a str, i64)]) -> Result<&'a str, ReadingError> {
        let id = self.get_var_int()?;
        table
            .iter()
            .find(|(_, value)| *value == id.0)
            .map(|(name, _)| *name)
            .ok_or_else(|| ReadingError::UnknownDiscriminant {
                switch: "string mapping",
                discriminant: id.0.to_string(),
            })
    }

    /// Reads slots until the `sentinel` byte is found in the position of a key.
    ///
    /// `parse` decodes a whole element, including its leading key byte.
    fn get_sentinel_terminated<G>(
        &mut self,
        sentinel: u8,
        mut parse: impl FnMut(&mut Self) -> Result<G, ReadingError>,
    ) -> Result<Vec<G>, ReadingError> {
        let bound = self.config().limits.max_array_length;
        let mut list = Vec::new();
        loop {
            if self.get_u8_be()? == sentinel {
                trace!("sentinel terminated sequence ended after {} elements", list.len());
                return Ok(list);
            }
            if list.len() == bound {
                return Err(ReadingError::TooLarge(format!(
                    "sentinel terminated sequence is longer than {bound} elements"
                )));
            }
            // The byte was the key of the next element
            self.unread_byte()?;
            list.push(parse(self)?);
        }
    }

    fn get_end_of_sequence_terminated<G>(
        &mut self,
        parse: impl FnMut(&mut Self) -> Result<G, ReadingError>,
    ) -> Result<Vec<G>, ReadingError> {
        self.get_sentinel_terminated(END_OF_SEQUENCE, parse)
    }

    /// Reads elements each preceded by an index byte, continuing while the
    /// index has its high bit set. `parse` receives the index without that bit.
    fn get_continuation_terminated<G>(
        &mut self,
        mut parse: impl FnMut(&mut Self, u8) -> Result<G, ReadingError>,
    ) -> Result<Vec<G>, ReadingError> {
        let bound = self.config().limits.max_array_length;
        let mut list = Vec::new();
        loop {
            let index = self.get_u8_be()?;
            list.push(parse(self, index & !CONTINUATION_BIT)?);
            if index & CONTINUATION_BIT == 0 {
                trace!("continuation terminated sequence ended after {} elements", list.len());
                return Ok(list);
            }
            if list.len() == bound {
                return Err(ReadingError::TooLarge(format!(
                    "continuation terminated sequence is longer than {bound} elements"
                )));
            }
        }
    }

    /// Reads an NBT compound that may be replaced by a lone `End` tag.
    fn get_optional_nbt(&mut self) -> Result<Option<NbtCompound>, ReadingError> {
        match self.peek_byte()? {
            END_ID => {
                self.get_u8_be()?;
                Ok(None)
            }
            // The tag byte is left in place, it belongs to the compound
            COMPOUND_ID => {
                let max_depth = self.config().nbt.max_depth;
                let compound =
                    lodestone_nbt::read_network_compound_bounded(&mut *self, max_depth)?;
                Ok(Some(compound))
            }
            tag => match self.config().nbt.tag_policy {
                TreeTagPolicy::Strict => Err(ReadingError::UnexpectedTreeTag(tag)),
                TreeTagPolicy::Lenient => {
                    warn!("Treating NBT value with leading tag {tag} as absent");
                    Ok(None)
                }
            },
        }
    }
}

impl<R: ReadCursor> NetworkReadExt for R {}

pub trait NetworkWriteExt: WriteCursor + Sized {
    write_be! {
        write_u8_be => u8,
        write_i8_be => i8,
        write_u16_be => u16,
        write_i16_be => i16,
        write_u32_be => u32,
        write_i32_be => i32,
        write_u64_be => u64,
        write_i64_be => i64,
        write_f32_be => f32,
        write_f64_be => f64,
    }

    fn write_slice(&mut self, data: &[u8]) -> Result<(), WritingError> {
        self.write_raw(data);
        Ok(())
    }

    fn write_bool(&mut self, data: bool) -> Result<(), WritingError> {
        self.write_u8_be(data as u8)
    }

    fn write_var_int(&mut self, data: &VarInt) -> Result<(), WritingError> {
        data.encode(self)
    }

    fn write_length(&mut self, prefix: LengthPrefix, len: usize) -> Result<(), WritingError> {
        prefix.write(self, len)
    }

    fn write_buffer(&mut self, data: &[u8], prefix: LengthPrefix) -> Result<(), WritingError> {
        self.write_length(prefix, data.len())?;
        self.write_slice(data)
    }

    /// Writes `data` with no length prefix. Must be the last field of a record.
    fn write_rest_buffer(&mut self, data: &[u8]) -> Result<(), WritingError> {
        self.write_slice(data)
    }

    fn write_pstring(
        &mut self,
        data: &str,
        prefix: LengthPrefix,
        bound: usize,
    ) -> Result<(), WritingError> {
        if data.len() > bound {
            return Err(WritingError::TooLarge(format!(
                "string of {} bytes exceeds the limit of {bound}",
                data.len()
            )));
        }
        self.write_buffer(data.as_bytes(), prefix)
    }

    fn write_string_bounded(&mut self, data: &str, bound: usize) -> Result<(), WritingError> {
        self.write_pstring(data, LengthPrefix::VarInt, bound)
    }

    fn write_string(&mut self, data: &str) -> Result<(), WritingError> {
        self.write_string_bounded(data, i16::MAX as usize)
    }

    fn write_identifier(&mut self, data: &Identifier) -> Result<(), WritingError> {
        data.encode(self)
    }

    fn write_uuid(&mut self, data: &uuid::Uuid) -> Result<(), WritingError> {
        let (first, second) = data.as_u64_pair();
        self.write_u64_be(first)?;
        self.write_u64_be(second)
    }

    fn write_bitset(&mut self, data: &BitSet) -> Result<(), WritingError> {
        data.encode(self)
    }

    fn write_fixed_bitset(&mut self, data: &FixedBitSet, bits: usize) -> Result<(), WritingError> {
        if data.len() != bits.div_ceil(8) {
            return Err(WritingError::Message(format!(
                "fixed bitset of {bits} bits must be {} bytes, got {}",
                bits.div_ceil(8),
                data.len()
            )));
        }
        self.write_slice(data)
    }

    fn write_block_pos(&mut self, data: &BlockPos) -> Result<(), WritingError> {
        data.encode(self)
    }

    fn write_bitfield<T: BitfieldContainer>(&mut self, data: Bitfield<T>) -> Result<(), WritingError> {
        data.raw().write(self)
    }

    fn write_option<G>(
        &mut self,
        data: &Option<G>,
        writer: impl FnOnce(&mut Self, &G) -> Result<(), WritingError>,
    ) -> Result<(), WritingError> {
        if let Some(data) = data {
            self.write_bool(true)?;
            writer(self, data)
        } else {
            self.write_bool(false)
        }
    }

    /// Writes the count framed by `prefix`, then every element in order.
    fn write_array<G>(
        &mut self,
        list: &[G],
        prefix: LengthPrefix,
        mut writer: impl FnMut(&mut Self, &G) -> Result<(), WritingError>,
    ) -> Result<(), WritingError> {
        self.write_length(prefix, list.len())?;
        for data in list {
            writer(self, data)?;
        }
        Ok(())
    }

    fn write_list<G>(
        &mut self,
        list: &[G],
        writer: impl FnMut(&mut Self, &G) -> Result<(), WritingError>,
    ) -> Result<(), WritingError> {
        self.write_array(list, LengthPrefix::VarInt, writer)
    }

    /// Encodes `data` as the arm selected by `discriminant`. The discriminant
    /// itself is written by the enclosing record, not here.
    fn write_switch<S: Switch>(
        &mut self,
        data: &S,
        discriminant: &S::Discriminant,
    ) -> Result<(), WritingError> {
        data.encode(self, discriminant)
    }

    fn write_mapped_str(&mut self, data: &str, table: &[(&str, i64)]) -> Result<(), WritingError> {
        let (_, id) = table
            .iter()
            .find(|(name, _)| *name == data)
            .ok_or_else(|| WritingError::UnsupportedMapping {
                value: data.to_string(),
            })?;
        self.write_var_int(&VarInt(*id))
    }

    /// Writes each element as its key byte followed by `writer`'s output and
    /// closes the sequence with `sentinel`.
    fn write_sentinel_terminated<G>(
        &mut self,
        list: &[G],
        sentinel: u8,
        key: impl Fn(usize, &G) -> u8,
        mut writer: impl FnMut(&mut Self, &G) -> Result<(), WritingError>,
    ) -> Result<(), WritingError> {
        for (ordinal, data) in list.iter().enumerate() {
            let key = key(ordinal, data);
            if key == sentinel {
                return Err(WritingError::Message(format!(
                    "element {ordinal} uses the sentinel {sentinel:#04x} as its key"
                )));
            }
            self.write_u8_be(key)?;
            writer(self, data)?;
        }
        self.write_u8_be(sentinel)
    }

    fn write_end_of_sequence_terminated<G>(
        &mut self,
        list: &[G],
        key: impl Fn(usize, &G) -> u8,
        writer: impl FnMut(&mut Self, &G) -> Result<(), WritingError>,
    ) -> Result<(), WritingError> {
        self.write_sentinel_terminated(list, END_OF_SEQUENCE, key, writer)
    }

    /// Writes each element behind an index byte. Whether another element
    /// follows is only known once it is written, so the previous index byte
    /// gets its high bit patched in at that point.
    fn write_continuation_terminated<G>(
        &mut self,
        list: &[G],
        key: impl Fn(usize, &G) -> u8,
        mut writer: impl FnMut(&mut Self, &G) -> Result<(), WritingError>,
    ) -> Result<(), WritingError> {
        if list.is_empty() {
            return Err(WritingError::Message(
                "a continuation terminated sequence needs at least one element".to_string(),
            ));
        }

        let mut previous_index = None;
        for (ordinal, data) in list.iter().enumerate() {
            let index = key(ordinal, data);
            if index & CONTINUATION_BIT != 0 {
                return Err(WritingError::TooLarge(format!(
                    "index {index:#04x} of element {ordinal} collides with the continuation bit"
                )));
            }
            if let Some(position) = previous_index {
                self.patch_byte(position, |byte| byte | CONTINUATION_BIT)?;
            }
            previous_index = Some(self.position());
            self.write_u8_be(index)?;
            writer(self, data)?;
        }
        Ok(())
    }

    /// Writes `data` through the NBT codec, or a lone `End` tag when absent.
    fn write_optional_nbt(&mut self, data: Option<&NbtCompound>) -> Result<(), WritingError> {
        match data {
            Some(compound) => Ok(lodestone_nbt::write_network_compound(compound, &mut *self)?),
            None => self.write_u8_be(END_ID),
        }
    }
}

impl<W: WriteCursor> NetworkWriteExt for W {}
