use std::{fmt, num::NonZeroUsize};

use crate::ser::{NetworkReadExt, NetworkWriteExt, ReadingError, WritingError};

use super::{non_zero, var_int::VarInt, Codec};

/// A namespaced resource location, written as `namespace:path`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier {
    pub namespace: String,
    pub path: String,
}

impl Identifier {
    pub const DEFAULT_NAMESPACE: &'static str = "minecraft";

    pub fn new(namespace: &str, path: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            path: path.to_string(),
        }
    }

    pub fn vanilla(path: &str) -> Self {
        Self::new(Self::DEFAULT_NAMESPACE, path)
    }

    /// Splits at the first colon. Without one the whole input is the path.
    pub fn parse(identifier: &str) -> Self {
        match identifier.split_once(':') {
            Some((namespace, path)) => Self::new(namespace, path),
            None => Self::vanilla(identifier),
        }
    }
}

impl Codec<Self> for Identifier {
    /// Same bound as a plain string.
    const MAX_SIZE: NonZeroUsize = non_zero(i16::MAX as usize);

    fn written_size(&self) -> usize {
        let len = self.namespace.len() + 1 + self.path.len();
        VarInt::try_from(len).map_or(0, |len| len.written_size()) + len
    }

    fn encode(&self, write: &mut impl NetworkWriteExt) -> Result<(), WritingError> {
        write.write_string_bounded(&self.to_string(), Self::MAX_SIZE.get())
    }

    fn decode(read: &mut impl NetworkReadExt) -> Result<Self, ReadingError> {
        let identifier = read.get_string_bounded(Self::MAX_SIZE.get())?;
        Ok(Self::parse(&identifier))
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.path)
    }
}
