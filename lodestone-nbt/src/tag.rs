use std::io::{Read, Write};

use crate::adaptor::{ReadAdaptor, Result, WriteAdaptor};
use crate::compound::NbtCompound;
use crate::*;

#[derive(Clone, Debug, PartialEq, PartialOrd)]
pub enum NbtTag {
    End,
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    ByteArray(Box<[u8]>),
    String(String),
    List(Box<[NbtTag]>),
    Compound(NbtCompound),
    IntArray(Box<[i32]>),
    LongArray(Box<[i64]>),
}

fn checked_len(len: usize) -> Result<i32> {
    i32::try_from(len).map_err(|_| Error::LargeLength(len))
}

fn read_len<R: Read>(reader: &mut ReadAdaptor<R>) -> Result<usize> {
    let len = reader.get_i32_be()?;
    usize::try_from(len).map_err(|_| Error::NegativeLength(len))
}

impl NbtTag {
    /// Returns the numeric id associated with the data type.
    pub const fn get_type_id(&self) -> u8 {
        match self {
            NbtTag::End => END_ID,
            NbtTag::Byte(_) => BYTE_ID,
            NbtTag::Short(_) => SHORT_ID,
            NbtTag::Int(_) => INT_ID,
            NbtTag::Long(_) => LONG_ID,
            NbtTag::Float(_) => FLOAT_ID,
            NbtTag::Double(_) => DOUBLE_ID,
            NbtTag::ByteArray(_) => BYTE_ARRAY_ID,
            NbtTag::String(_) => STRING_ID,
            NbtTag::List(_) => LIST_ID,
            NbtTag::Compound(_) => COMPOUND_ID,
            NbtTag::IntArray(_) => INT_ARRAY_ID,
            NbtTag::LongArray(_) => LONG_ARRAY_ID,
        }
    }

    pub fn serialize<W: Write>(&self, w: &mut WriteAdaptor<W>) -> Result<()> {
        w.write_u8_be(self.get_type_id())?;
        self.serialize_data(w)
    }

    pub fn serialize_data<W: Write>(&self, w: &mut WriteAdaptor<W>) -> Result<()> {
        match self {
            NbtTag::End => {}
            NbtTag::Byte(byte) => w.write_i8_be(*byte)?,
            NbtTag::Short(short) => w.write_i16_be(*short)?,
            NbtTag::Int(int) => w.write_i32_be(*int)?,
            NbtTag::Long(long) => w.write_i64_be(*long)?,
            NbtTag::Float(float) => w.write_f32_be(*float)?,
            NbtTag::Double(double) => w.write_f64_be(*double)?,
            NbtTag::ByteArray(byte_array) => {
                w.write_i32_be(checked_len(byte_array.len())?)?;
                w.write_slice(byte_array)?;
            }
            NbtTag::String(string) => put_nbt_string(w, string)?,
            NbtTag::List(list) => {
                let len = checked_len(list.len())?;
                let element_id = list.first().map_or(END_ID, NbtTag::get_type_id);
                if let Some(stray) = list.iter().find(|tag| tag.get_type_id() != element_id) {
                    return Err(Error::MixedList(element_id, stray.get_type_id()));
                }

                w.write_u8_be(element_id)?;
                w.write_i32_be(len)?;
                for nbt_tag in list {
                    nbt_tag.serialize_data(w)?;
                }
            }
            NbtTag::Compound(compound) => compound.serialize_content(w)?,
            NbtTag::IntArray(int_array) => {
                w.write_i32_be(checked_len(int_array.len())?)?;
                for int in int_array {
                    w.write_i32_be(*int)?;
                }
            }
            NbtTag::LongArray(long_array) => {
                w.write_i32_be(checked_len(long_array.len())?)?;
                for long in long_array {
                    w.write_i64_be(*long)?;
                }
            }
        };
        Ok(())
    }

    pub fn deserialize<R: Read>(reader: &mut ReadAdaptor<R>) -> Result<NbtTag> {
        let tag_id = reader.get_u8_be()?;
        Self::deserialize_data(reader, tag_id)
    }

    pub fn deserialize_data<R: Read>(reader: &mut ReadAdaptor<R>, tag_id: u8) -> Result<NbtTag> {
        let tag = match tag_id {
            END_ID => NbtTag::End,
            BYTE_ID => NbtTag::Byte(reader.get_i8_be()?),
            SHORT_ID => NbtTag::Short(reader.get_i16_be()?),
            INT_ID => NbtTag::Int(reader.get_i32_be()?),
            LONG_ID => NbtTag::Long(reader.get_i64_be()?),
            FLOAT_ID => NbtTag::Float(reader.get_f32_be()?),
            DOUBLE_ID => NbtTag::Double(reader.get_f64_be()?),
            BYTE_ARRAY_ID => {
                let len = read_len(reader)?;
                NbtTag::ByteArray(reader.read_boxed_slice(len)?)
            }
            STRING_ID => NbtTag::String(get_nbt_string(reader)?),
            LIST_ID => {
                let tag_type_id = reader.get_u8_be()?;
                let len = read_len(reader)?;
                // The length is untrusted, let the vec grow as elements actually arrive
                let mut list = Vec::with_capacity(len.min(1024));
                reader.enter_nested()?;
                for _ in 0..len {
                    list.push(NbtTag::deserialize_data(reader, tag_type_id)?);
                }
                reader.leave_nested();
                NbtTag::List(list.into_boxed_slice())
            }
            COMPOUND_ID => NbtTag::Compound(NbtCompound::deserialize_content(reader)?),
            INT_ARRAY_ID => {
                let len = read_len(reader)?;
                let mut int_array = Vec::with_capacity(len.min(1024));
                for _ in 0..len {
                    int_array.push(reader.get_i32_be()?);
                }
                NbtTag::IntArray(int_array.into_boxed_slice())
            }
            LONG_ARRAY_ID => {
                let len = read_len(reader)?;
                let mut long_array = Vec::with_capacity(len.min(1024));
                for _ in 0..len {
                    long_array.push(reader.get_i64_be()?);
                }
                NbtTag::LongArray(long_array.into_boxed_slice())
            }
            _ => return Err(Error::UnknownTagId(tag_id)),
        };
        Ok(tag)
    }

    pub fn extract_byte(&self) -> Option<i8> {
        match self {
            NbtTag::Byte(byte) => Some(*byte),
            _ => None,
        }
    }

    pub fn extract_short(&self) -> Option<i16> {
        match self {
            NbtTag::Short(short) => Some(*short),
            _ => None,
        }
    }

    pub fn extract_int(&self) -> Option<i32> {
        match self {
            NbtTag::Int(int) => Some(*int),
            _ => None,
        }
    }

    pub fn extract_long(&self) -> Option<i64> {
        match self {
            NbtTag::Long(long) => Some(*long),
            _ => None,
        }
    }

    pub fn extract_double(&self) -> Option<f64> {
        match self {
            NbtTag::Double(double) => Some(*double),
            _ => None,
        }
    }

    pub fn extract_bool(&self) -> Option<bool> {
        self.extract_byte().map(|byte| byte != 0)
    }

    pub fn extract_string(&self) -> Option<&str> {
        match self {
            NbtTag::String(string) => Some(string),
            _ => None,
        }
    }

    pub fn extract_list(&self) -> Option<&[NbtTag]> {
        match self {
            NbtTag::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn extract_compound(&self) -> Option<&NbtCompound> {
        match self {
            NbtTag::Compound(compound) => Some(compound),
            _ => None,
        }
    }
}

impl From<&str> for NbtTag {
    fn from(value: &str) -> Self {
        NbtTag::String(value.to_string())
    }
}

impl From<&[u8]> for NbtTag {
    fn from(value: &[u8]) -> Self {
        NbtTag::ByteArray(value.into())
    }
}

impl From<i32> for NbtTag {
    fn from(value: i32) -> Self {
        NbtTag::Int(value)
    }
}

impl From<i64> for NbtTag {
    fn from(value: i64) -> Self {
        NbtTag::Long(value)
    }
}

impl From<f64> for NbtTag {
    fn from(value: f64) -> Self {
        NbtTag::Double(value)
    }
}

impl From<bool> for NbtTag {
    fn from(value: bool) -> Self {
        NbtTag::Byte(value as i8)
    }
}

impl From<NbtCompound> for NbtTag {
    fn from(value: NbtCompound) -> Self {
        NbtTag::Compound(value)
    }
}
