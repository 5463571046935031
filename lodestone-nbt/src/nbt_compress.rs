use std::io::{Read, Write};

use flate2::{read::GzDecoder, write::GzEncoder, Compression};

use crate::adaptor::ReadAdaptor;
use crate::{compound::NbtCompound, Error, Nbt};

/// Reads a GZipped, named NBT compound tag from any reader.
pub fn read_gzip_compound_tag(input: impl Read) -> Result<NbtCompound, Error> {
    let mut reader = ReadAdaptor::new(GzDecoder::new(input));
    let nbt = Nbt::read(&mut reader)?;
    Ok(nbt.root_tag)
}

/// Writes an NBT compound tag with GZip compression.
pub fn write_gzip_compound_tag(compound: &NbtCompound, output: impl Write) -> Result<(), Error> {
    let mut encoder = GzEncoder::new(output, Compression::default());

    let nbt = Nbt::new(String::new(), compound.clone());
    nbt.write_to_writer(&mut encoder)?;

    encoder.finish().map_err(Error::Incomplete)?;
    Ok(())
}

/// Convenience function that returns compressed bytes
pub fn write_gzip_compound_tag_to_bytes(compound: &NbtCompound) -> Result<Vec<u8>, Error> {
    let mut buffer = Vec::new();
    write_gzip_compound_tag(compound, &mut buffer)?;
    Ok(buffer)
}
