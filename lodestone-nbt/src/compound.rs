use std::io::{Read, Write};
use std::vec::IntoIter;

use crate::adaptor::{ReadAdaptor, Result, WriteAdaptor};
use crate::tag::NbtTag;
use crate::{get_nbt_string, put_nbt_string, END_ID};

#[derive(Clone, Debug, Default, PartialEq, PartialOrd)]
pub struct NbtCompound {
    pub child_tags: Vec<(String, NbtTag)>,
}

impl NbtCompound {
    pub fn new() -> NbtCompound {
        NbtCompound {
            child_tags: Vec::new(),
        }
    }

    /// Reads named children up to and including the terminating `End` tag.
    ///
    /// A compound is self delimiting; running out of input before the `End`
    /// tag is an error, not an implicit end.
    pub fn deserialize_content<R: Read>(reader: &mut ReadAdaptor<R>) -> Result<NbtCompound> {
        reader.enter_nested()?;
        let mut compound = NbtCompound::new();

        loop {
            let tag_id = reader.get_u8_be()?;
            if tag_id == END_ID {
                reader.leave_nested();
                return Ok(compound);
            }

            let name = get_nbt_string(reader)?;
            let tag = NbtTag::deserialize_data(reader, tag_id)?;
            compound.put(&name, tag);
        }
    }

    pub fn serialize_content<W: Write>(&self, w: &mut WriteAdaptor<W>) -> Result<()> {
        for (name, tag) in &self.child_tags {
            w.write_u8_be(tag.get_type_id())?;
            put_nbt_string(w, name)?;
            tag.serialize_data(w)?;
        }
        w.write_u8_be(END_ID)
    }

    /// Inserts `value` unless a child with the same name already exists.
    pub fn put(&mut self, name: &str, value: impl Into<NbtTag>) {
        if !self.child_tags.iter().any(|(key, _)| key == name) {
            self.child_tags.push((name.to_string(), value.into()));
        }
    }

    pub fn put_byte(&mut self, name: &str, value: i8) {
        self.put(name, NbtTag::Byte(value));
    }

    pub fn put_bool(&mut self, name: &str, value: bool) {
        self.put(name, value);
    }

    pub fn put_short(&mut self, name: &str, value: i16) {
        self.put(name, NbtTag::Short(value));
    }

    pub fn put_int(&mut self, name: &str, value: i32) {
        self.put(name, NbtTag::Int(value));
    }

    pub fn put_long(&mut self, name: &str, value: i64) {
        self.put(name, NbtTag::Long(value));
    }

    pub fn put_string(&mut self, name: &str, value: &str) {
        self.put(name, value);
    }

    pub fn put_compound(&mut self, name: &str, value: NbtCompound) {
        self.put(name, NbtTag::Compound(value));
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&NbtTag> {
        self.child_tags
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn get_byte(&self, name: &str) -> Option<i8> {
        self.get(name).and_then(NbtTag::extract_byte)
    }

    pub fn get_short(&self, name: &str) -> Option<i16> {
        self.get(name).and_then(NbtTag::extract_short)
    }

    pub fn get_int(&self, name: &str) -> Option<i32> {
        self.get(name).and_then(NbtTag::extract_int)
    }

    pub fn get_long(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(NbtTag::extract_long)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(NbtTag::extract_bool)
    }

    pub fn get_string(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(NbtTag::extract_string)
    }

    pub fn get_list(&self, name: &str) -> Option<&[NbtTag]> {
        self.get(name).and_then(NbtTag::extract_list)
    }

    pub fn get_compound(&self, name: &str) -> Option<&NbtCompound> {
        self.get(name).and_then(NbtTag::extract_compound)
    }

    pub fn len(&self) -> usize {
        self.child_tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.child_tags.is_empty()
    }
}

impl FromIterator<(String, NbtTag)> for NbtCompound {
    fn from_iter<T: IntoIterator<Item = (String, NbtTag)>>(iter: T) -> Self {
        let mut compound = NbtCompound::new();
        for (key, value) in iter {
            compound.put(&key, value);
        }
        compound
    }
}

impl IntoIterator for NbtCompound {
    type Item = (String, NbtTag);
    type IntoIter = IntoIter<(String, NbtTag)>;

    fn into_iter(self) -> Self::IntoIter {
        self.child_tags.into_iter()
    }
}
