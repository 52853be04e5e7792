//! Numeric identifiers assigned by the LysKOM server

use serde::{Deserialize, Serialize};
use std::fmt;

/// Global text number, unique across the whole server
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TextNo(pub u32);

impl TextNo {
    pub fn new(no: u32) -> Self {
        Self(no)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl From<u32> for TextNo {
    fn from(no: u32) -> Self {
        Self(no)
    }
}

impl fmt::Display for TextNo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Conference number
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfNo(pub u32);

impl ConfNo {
    pub fn new(no: u32) -> Self {
        Self(no)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl From<u32> for ConfNo {
    fn from(no: u32) -> Self {
        Self(no)
    }
}

impl fmt::Display for ConfNo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Position of a text within one conference
///
/// The same text has a different local number in every conference it was
/// sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalTextNo(pub u32);

impl From<u32> for LocalTextNo {
    fn from(no: u32) -> Self {
        Self(no)
    }
}

impl fmt::Display for LocalTextNo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Person number
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersNo(pub u32);

impl From<u32> for PersNo {
    fn from(no: u32) -> Self {
        Self(no)
    }
}

impl fmt::Display for PersNo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
