use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two response lanes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => write!(f, "left"),
            Side::Right => write!(f, "right"),
        }
    }
}

/// Physical input identifier as delivered by the host, e.g. `"KeyE"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InputCode(String);

impl InputCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for InputCode {
    fn from(code: &str) -> Self {
        Self(code.to_owned())
    }
}

impl From<String> for InputCode {
    fn from(code: String) -> Self {
        Self(code)
    }
}

impl AsRef<str> for InputCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InputCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
