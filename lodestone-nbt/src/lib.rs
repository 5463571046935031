use std::{
    io::{self, Read, Write},
    ops::Deref,
};

use adaptor::{ReadAdaptor, WriteAdaptor};
use bytes::Bytes;
use compound::NbtCompound;
use thiserror::Error;

pub mod adaptor;
pub mod compound;
pub mod nbt_compress;
pub mod tag;

pub use tag::NbtTag;

pub const END_ID: u8 = 0x00;
pub const BYTE_ID: u8 = 0x01;
pub const SHORT_ID: u8 = 0x02;
pub const INT_ID: u8 = 0x03;
pub const LONG_ID: u8 = 0x04;
pub const FLOAT_ID: u8 = 0x05;
pub const DOUBLE_ID: u8 = 0x06;
pub const BYTE_ARRAY_ID: u8 = 0x07;
pub const STRING_ID: u8 = 0x08;
pub const LIST_ID: u8 = 0x09;
pub const COMPOUND_ID: u8 = 0x0A;
pub const INT_ARRAY_ID: u8 = 0x0B;
pub const LONG_ARRAY_ID: u8 = 0x0C;

/// How many compounds and lists may be nested inside each other, the same
/// bound a vanilla server applies.
pub const MAX_DEPTH: usize = 512;

#[derive(Error, Debug)]
pub enum Error {
    #[error("The root tag of the NBT data is not a compound tag. Received tag id: {0}")]
    NoRootCompound(u8),
    #[error("Encountered an unknown NBT tag id {0}.")]
    UnknownTagId(u8),
    #[error("Failed to Cesu 8 Decode")]
    Cesu8DecodingError,
    #[error("NBT reading was cut short {0}")]
    Incomplete(io::Error),
    #[error("Negative list length {0}")]
    NegativeLength(i32),
    #[error("Length too large {0}")]
    LargeLength(usize),
    #[error("List of tag id {0} contains an element with tag id {1}")]
    MixedList(u8, u8),
    #[error("NBT is nested deeper than {0} levels")]
    TooDeep(usize),
}

/// A root compound together with its (possibly empty) name.
///
/// Files carry the root name, network payloads since 1.20.2 do not; see
/// [`Nbt::read_unnamed`] and [`Nbt::write_unnamed`].
#[derive(Clone, Debug, Default, PartialEq, PartialOrd)]
pub struct Nbt {
    pub name: String,
    pub root_tag: NbtCompound,
}

impl Nbt {
    pub fn new(name: String, tag: NbtCompound) -> Self {
        Nbt {
            name,
            root_tag: tag,
        }
    }

    pub fn read<R: Read>(reader: &mut ReadAdaptor<R>) -> Result<Nbt, Error> {
        let tag_type_id = reader.get_u8_be()?;
        if tag_type_id != COMPOUND_ID {
            return Err(Error::NoRootCompound(tag_type_id));
        }

        Ok(Nbt {
            name: get_nbt_string(reader)?,
            root_tag: NbtCompound::deserialize_content(reader)?,
        })
    }

    /// Reads NBT tag, that doesn't contain the name of root compound.
    pub fn read_unnamed<R: Read>(reader: &mut ReadAdaptor<R>) -> Result<Nbt, Error> {
        let tag_type_id = reader.get_u8_be()?;
        if tag_type_id != COMPOUND_ID {
            return Err(Error::NoRootCompound(tag_type_id));
        }

        Ok(Nbt {
            name: String::new(),
            root_tag: NbtCompound::deserialize_content(reader)?,
        })
    }

    pub fn write_to_writer<W: Write>(&self, writer: W) -> Result<(), Error> {
        let mut writer = WriteAdaptor::new(writer);
        writer.write_u8_be(COMPOUND_ID)?;
        put_nbt_string(&mut writer, &self.name)?;
        self.root_tag.serialize_content(&mut writer)
    }

    /// Writes NBT tag, without name of root compound.
    pub fn write_unnamed_to_writer<W: Write>(&self, writer: W) -> Result<(), Error> {
        let mut writer = WriteAdaptor::new(writer);
        writer.write_u8_be(COMPOUND_ID)?;
        self.root_tag.serialize_content(&mut writer)
    }

    pub fn write(&self) -> Result<Bytes, Error> {
        let mut bytes = Vec::new();
        self.write_to_writer(&mut bytes)?;
        Ok(bytes.into())
    }

    pub fn write_unnamed(&self) -> Result<Bytes, Error> {
        let mut bytes = Vec::new();
        self.write_unnamed_to_writer(&mut bytes)?;
        Ok(bytes.into())
    }
}

impl Deref for Nbt {
    type Target = NbtCompound;

    fn deref(&self) -> &Self::Target {
        &self.root_tag
    }
}

impl From<NbtCompound> for Nbt {
    fn from(value: NbtCompound) -> Self {
        Nbt::new(String::new(), value)
    }
}

impl From<Nbt> for NbtCompound {
    fn from(value: Nbt) -> Self {
        value.root_tag
    }
}

/// Reads one unnamed root compound, the form used inside network packets.
///
/// Consumes exactly the bytes of the compound and nothing after it.
pub fn read_network_compound(reader: impl Read) -> Result<NbtCompound, Error> {
    read_network_compound_bounded(reader, MAX_DEPTH)
}

/// Like [`read_network_compound`], with a custom nesting bound. The root
/// compound counts as the first level.
pub fn read_network_compound_bounded(
    reader: impl Read,
    max_depth: usize,
) -> Result<NbtCompound, Error> {
    let mut reader = ReadAdaptor::new(reader).with_max_depth(max_depth);
    Nbt::read_unnamed(&mut reader).map(|nbt| nbt.root_tag)
}

pub fn write_network_compound(compound: &NbtCompound, writer: impl Write) -> Result<(), Error> {
    let mut writer = WriteAdaptor::new(writer);
    writer.write_u8_be(COMPOUND_ID)?;
    compound.serialize_content(&mut writer)
}

pub fn get_nbt_string<R: Read>(bytes: &mut ReadAdaptor<R>) -> Result<String, Error> {
    let len = bytes.get_u16_be()? as usize;
    let string_bytes = bytes.read_boxed_slice(len)?;
    let string = cesu8::from_java_cesu8(&string_bytes).map_err(|_| Error::Cesu8DecodingError)?;
    Ok(string.to_string())
}

pub fn put_nbt_string<W: Write>(w: &mut WriteAdaptor<W>, string: &str) -> Result<(), Error> {
    let java_string = cesu8::to_java_cesu8(string);
    let len = u16::try_from(java_string.len()).map_err(|_| Error::LargeLength(java_string.len()))?;
    w.write_u16_be(len)?;
    w.write_slice(&java_string)
}

#[cfg(test)]
mod test {
    use crate::compound::NbtCompound;
    use crate::tag::NbtTag;
    use crate::{
        read_network_compound, read_network_compound_bounded, write_network_compound, Error,
        Nbt, MAX_DEPTH,
    };

    fn sample() -> NbtCompound {
        let mut inner = NbtCompound::new();
        inner.put_string("food", "Over easy");

        let mut compound = NbtCompound::new();
        compound.put_byte("byte", 123);
        compound.put_short("short", 1342);
        compound.put_int("int", 4313);
        compound.put_long("long", -132334);
        compound.put_bool("flag", true);
        compound.put_string("string", "Hello test");
        compound.put_compound("breakfast", inner);
        compound.put(
            "list",
            NbtTag::List(vec![NbtTag::Int(1), NbtTag::Int(2)].into_boxed_slice()),
        );
        compound.put("longs", NbtTag::LongArray(vec![1, 0, 200301].into_boxed_slice()));
        compound
    }

    #[test]
    fn test_network_round_trip() {
        let compound = sample();
        let mut bytes = Vec::new();
        write_network_compound(&compound, &mut bytes).unwrap();

        let read = read_network_compound(&bytes[..]).unwrap();
        assert_eq!(read, compound);
        assert_eq!(read.get_string("string"), Some("Hello test"));
        assert_eq!(
            read.get_compound("breakfast").and_then(|c| c.get_string("food")),
            Some("Over easy")
        );
    }

    #[test]
    fn test_network_compound_stops_at_end_tag() {
        let mut bytes = Vec::new();
        write_network_compound(&sample(), &mut bytes).unwrap();
        let compound_len = bytes.len();
        bytes.extend_from_slice(&[0xDE, 0xAD]);

        let mut reader = &bytes[..];
        read_network_compound(&mut reader).unwrap();
        assert_eq!(reader.len(), bytes.len() - compound_len);
    }

    #[test]
    fn test_empty_network_compound_bytes() {
        let mut bytes = Vec::new();
        write_network_compound(&NbtCompound::new(), &mut bytes).unwrap();
        assert_eq!(bytes, [0x0A, 0x00]);
    }

    #[test]
    fn test_named_round_trip() {
        let nbt = Nbt::new("Test".to_string(), sample());
        let bytes = nbt.write().unwrap();
        assert_eq!(&bytes[..7], &[0x0A, 0x00, 0x04, b'T', b'e', b's', b't']);

        let read =
            Nbt::read(&mut crate::adaptor::ReadAdaptor::new(&bytes[..])).unwrap();
        assert_eq!(read, nbt);
    }

    #[test]
    fn test_no_root_compound() {
        let err = read_network_compound(&[0x08u8, 0x00, 0x00][..]);
        assert!(matches!(err, Err(Error::NoRootCompound(0x08))));
    }

    #[test]
    fn test_truncated_compound() {
        let mut bytes = Vec::new();
        write_network_compound(&sample(), &mut bytes).unwrap();
        bytes.pop();

        assert!(matches!(
            read_network_compound(&bytes[..]),
            Err(Error::Incomplete(_))
        ));
    }

    #[test]
    fn test_depth_bound_on_compounds() {
        let mut bytes = vec![0x0A];
        for _ in 0..MAX_DEPTH {
            bytes.extend_from_slice(&[0x0A, 0x00, 0x00]);
        }

        // Reaching the bound takes MAX_DEPTH frames, more than a debug
        // build fits in the default test thread stack
        let result = std::thread::Builder::new()
            .stack_size(64 * 1024 * 1024)
            .spawn(move || read_network_compound(&bytes[..]).map(drop))
            .unwrap()
            .join()
            .unwrap();
        assert!(matches!(result, Err(Error::TooDeep(MAX_DEPTH))));
    }

    #[test]
    fn test_depth_bound_on_lists() {
        // A root compound holding a list of lists of lists of empty compounds
        let mut bytes = vec![0x0A, 0x09, 0x00, 0x01, b'l'];
        bytes.extend_from_slice(&[0x09, 0x00, 0x00, 0x00, 0x01]);
        bytes.extend_from_slice(&[0x09, 0x00, 0x00, 0x00, 0x01]);
        bytes.extend_from_slice(&[0x0A, 0x00, 0x00, 0x00, 0x01]);
        bytes.extend_from_slice(&[0x00, 0x00]);

        assert!(read_network_compound_bounded(&bytes[..], 5).is_ok());
        assert!(matches!(
            read_network_compound_bounded(&bytes[..], 4),
            Err(Error::TooDeep(4))
        ));
    }

    #[test]
    fn test_oversized_byte_array_length() {
        // A byte array claiming i32::MAX bytes, followed by only three
        let bytes = [
            0x0A, 0x07, 0x00, 0x01, b'b', 0x7F, 0xFF, 0xFF, 0xFF, 0x01, 0x02, 0x03,
        ];
        assert!(matches!(
            read_network_compound(&bytes[..]),
            Err(Error::Incomplete(_))
        ));
    }

    #[test]
    fn test_mixed_list_rejected() {
        let mut compound = NbtCompound::new();
        compound.put(
            "bad",
            NbtTag::List(vec![NbtTag::Int(1), NbtTag::Byte(2)].into_boxed_slice()),
        );
        let mut bytes = Vec::new();
        assert!(matches!(
            write_network_compound(&compound, &mut bytes),
            Err(Error::MixedList(0x03, 0x01))
        ));
    }
}
