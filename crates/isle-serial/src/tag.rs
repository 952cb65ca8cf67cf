//! Tagged value kinds

use crate::SerialError;
use std::fmt;
use std::str::FromStr;

/// Reserved discriminant field of tagged values
pub const TAG_FIELD: &str = "_f";

/// Kind of a tagged value on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    /// Big integer, `d` holds the decimal digits
    BigInt,
    /// Byte buffer, `d` holds standard base64
    Bytes,
    /// Reactive cell, `v` holds the current value
    Signal,
    /// User object that owned the tag field: `k` is that field's value, `v` the rest
    Literal,
}

impl Tag {
    /// Wire name of the tag
    pub const fn as_str(self) -> &'static str {
        match self {
            Tag::BigInt => "b",
            Tag::Bytes => "u8a",
            Tag::Signal => "s",
            Tag::Literal => "l",
        }
    }
}

impl FromStr for Tag {
    type Err = SerialError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "b" => Ok(Tag::BigInt),
            "u8a" => Ok(Tag::Bytes),
            "s" => Ok(Tag::Signal),
            "l" => Ok(Tag::Literal),
            other => Err(SerialError::UnknownTag(other.to_string())),
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
