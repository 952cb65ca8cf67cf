//! Partial merge modes

use crate::MarkerError;
use std::fmt;
use std::str::FromStr;

/// How new partial content combines with the live children
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MergeMode {
    /// New content replaces the children
    #[default]
    Replace,
    /// New content goes after the existing children
    Append,
    /// New content goes before the existing children
    Prepend,
}

impl MergeMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            MergeMode::Replace => "replace",
            MergeMode::Append => "append",
            MergeMode::Prepend => "prepend",
        }
    }
}

impl FromStr for MergeMode {
    type Err = MarkerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "replace" => Ok(MergeMode::Replace),
            "append" => Ok(MergeMode::Append),
            "prepend" => Ok(MergeMode::Prepend),
            other => Err(MarkerError::UnknownMergeMode(other.to_string())),
        }
    }
}

impl fmt::Display for MergeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
