use std::io::{self, Read, Write};

use crate::{Error, MAX_DEPTH};

pub type Result<T> = std::result::Result<T, Error>;

/// Big endian primitive reads over any `Read`.
///
/// Also counts how deeply compounds and lists are nested, up to `max_depth`.
#[derive(Debug)]
pub struct ReadAdaptor<R: Read> {
    reader: R,
    depth: usize,
    max_depth: usize,
}

macro_rules! read_be {
    ($($name:ident => $ty:ty),* $(,)?) => {
        $(
            pub fn $name(&mut self) -> Result<$ty> {
                let mut buf = [0u8; std::mem::size_of::<$ty>()];
                self.reader
                    .read_exact(&mut buf)
                    .map_err(Error::Incomplete)?;

                Ok(<$ty>::from_be_bytes(buf))
            }
        )*
    };
}

impl<R: Read> ReadAdaptor<R> {
    pub fn new(r: R) -> Self {
        Self {
            reader: r,
            depth: 0,
            max_depth: MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Called before reading the children of a compound or list.
    pub fn enter_nested(&mut self) -> Result<()> {
        if self.depth >= self.max_depth {
            return Err(Error::TooDeep(self.max_depth));
        }
        self.depth += 1;
        Ok(())
    }

    pub fn leave_nested(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    read_be! {
        get_u8_be => u8,
        get_i8_be => i8,
        get_u16_be => u16,
        get_i16_be => i16,
        get_i32_be => i32,
        get_i64_be => i64,
        get_f32_be => f32,
        get_f64_be => f64,
    }

    /// Reads exactly `count` bytes, growing the buffer as they arrive.
    pub fn read_boxed_slice(&mut self, count: usize) -> Result<Box<[u8]>> {
        let mut buf = Vec::with_capacity(count.min(1024));
        (&mut self.reader)
            .take(count as u64)
            .read_to_end(&mut buf)
            .map_err(Error::Incomplete)?;
        if buf.len() != count {
            return Err(Error::Incomplete(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("expected {count} bytes, got {}", buf.len()),
            )));
        }

        Ok(buf.into())
    }
}

/// Big endian primitive writes over any `Write`.
#[derive(Debug)]
pub struct WriteAdaptor<W: Write> {
    writer: W,
}

macro_rules! write_be {
    ($($name:ident => $ty:ty),* $(,)?) => {
        $(
            pub fn $name(&mut self, value: $ty) -> Result<()> {
                self.writer
                    .write_all(&value.to_be_bytes())
                    .map_err(Error::Incomplete)
            }
        )*
    };
}

impl<W: Write> WriteAdaptor<W> {
    pub fn new(w: W) -> Self {
        Self { writer: w }
    }

    write_be! {
        write_u8_be => u8,
        write_i8_be => i8,
        write_u16_be => u16,
        write_i16_be => i16,
        write_i32_be => i32,
        write_i64_be => i64,
        write_f32_be => f32,
        write_f64_be => f64,
    }

    pub fn write_slice(&mut self, value: &[u8]) -> Result<()> {
        self.writer.write_all(value).map_err(Error::Incomplete)
    }
}
