use std::io::{self, Read, Write};

use bytes::{Bytes, BytesMut};
use lodestone_config::CodecConfig;

use crate::ser::{ReadingError, WritingError};

/// The read half of a cursor buffer. Everything in [`crate::ser::NetworkReadExt`]
/// is expressed through these few operations.
///
/// The [`Read`] impl must consume exactly the bytes it returns, so that
/// `std::io` based decoders stop where their value ends.
pub trait ReadCursor: Read {
    /// Returns the next `count` bytes and moves the cursor past them.
    fn read_raw(&mut self, count: usize) -> Result<&[u8], ReadingError>;

    /// Returns the next byte without moving the cursor.
    fn peek_byte(&self) -> Result<u8, ReadingError>;

    /// Moves the cursor back by exactly one byte.
    fn unread_byte(&mut self) -> Result<(), ReadingError>;

    fn readable_bytes(&self) -> usize;

    fn config(&self) -> &CodecConfig;
}

/// The write half of a cursor buffer.
pub trait WriteCursor: Write {
    fn write_raw(&mut self, data: &[u8]);

    /// The position the next [`WriteCursor::write_raw`] will write at.
    fn position(&self) -> usize;

    /// Rewrites the already written byte at `position` in place.
    fn patch_byte(
        &mut self,
        position: usize,
        patch: impl FnOnce(u8) -> u8,
    ) -> Result<(), WritingError>;
}

/// An in-memory byte sequence with a single read/write cursor.
///
/// One `PacketBuf` models exactly one record. It is either built empty and
/// written to, or built from received bytes and read from.
#[derive(Debug, Clone, Default)]
pub struct PacketBuf {
    data: BytesMut,
    position: usize,
    config: CodecConfig,
}

impl PacketBuf {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: BytesMut::with_capacity(capacity),
            ..Default::default()
        }
    }

    pub fn with_config(mut self, config: CodecConfig) -> Self {
        self.config = config;
        self
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn readable_bytes(&self) -> usize {
        self.data.len() - self.position
    }

    pub fn set_position(&mut self, position: usize) -> Result<(), ReadingError> {
        if position > self.data.len() {
            return Err(ReadingError::InvalidCursor(format!(
                "position {position} is past the end of a {} byte buffer",
                self.data.len()
            )));
        }
        self.position = position;
        Ok(())
    }

    /// Everything written so far, independent of the cursor.
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// The bytes between the cursor and the end of the buffer.
    pub fn remaining_slice(&self) -> &[u8] {
        &self.data[self.position..]
    }

    pub fn to_bytes(self) -> Bytes {
        self.data.freeze()
    }
}

impl ReadCursor for PacketBuf {
    fn read_raw(&mut self, count: usize) -> Result<&[u8], ReadingError> {
        let remaining = self.readable_bytes();
        if count > remaining {
            return Err(ReadingError::Underrun {
                requested: count,
                remaining,
            });
        }

        let start = self.position;
        self.position += count;
        Ok(&self.data[start..self.position])
    }

    fn peek_byte(&self) -> Result<u8, ReadingError> {
        self.data
            .get(self.position)
            .copied()
            .ok_or(ReadingError::Underrun {
                requested: 1,
                remaining: 0,
            })
    }

    fn unread_byte(&mut self) -> Result<(), ReadingError> {
        self.position = self.position.checked_sub(1).ok_or_else(|| {
            ReadingError::InvalidCursor("cannot unread at the start of the buffer".to_string())
        })?;
        Ok(())
    }

    fn readable_bytes(&self) -> usize {
        PacketBuf::readable_bytes(self)
    }

    fn config(&self) -> &CodecConfig {
        &self.config
    }
}

impl WriteCursor for PacketBuf {
    fn write_raw(&mut self, data: &[u8]) {
        let end = self.position + data.len();
        if self.position == self.data.len() {
            self.data.extend_from_slice(data);
        } else {
            if end > self.data.len() {
                self.data.resize(end, 0);
            }
            self.data[self.position..end].copy_from_slice(data);
        }
        self.position = end;
    }

    fn position(&self) -> usize {
        self.position
    }

    fn patch_byte(
        &mut self,
        position: usize,
        patch: impl FnOnce(u8) -> u8,
    ) -> Result<(), WritingError> {
        let size = self.data.len();
        let byte = self.data.get_mut(position).ok_or_else(|| {
            WritingError::InvalidCursor(format!(
                "cannot patch byte {position} of a {size} byte buffer"
            ))
        })?;
        *byte = patch(*byte);
        Ok(())
    }
}

impl Read for PacketBuf {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let count = buf.len().min(self.readable_bytes());
        buf[..count].copy_from_slice(&self.data[self.position..self.position + count]);
        self.position += count;
        Ok(count)
    }
}

impl Write for PacketBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_raw(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl From<Bytes> for PacketBuf {
    fn from(value: Bytes) -> Self {
        Self {
            data: BytesMut::from(value),
            ..Default::default()
        }
    }
}

impl From<Vec<u8>> for PacketBuf {
    fn from(value: Vec<u8>) -> Self {
        Self::from(Bytes::from(value))
    }
}

impl From<&[u8]> for PacketBuf {
    fn from(value: &[u8]) -> Self {
        Self {
            data: BytesMut::from(value),
            ..Default::default()
        }
    }
}
