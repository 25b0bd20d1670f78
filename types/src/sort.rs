use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The active ordering rule for a capsule collection.
///
/// Pure selector; the currently chosen value lives with the caller, not
/// here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortPolicy {
    /// Ascending great-circle distance from the reference coordinate.
    #[default]
    Nearest,
    /// Descending great-circle distance from the reference coordinate.
    Furthest,
    /// Most recent commemorated date first.
    Latest,
    /// Oldest commemorated date first.
    Oldest,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid sort policy '{raw}'; expected one of: nearest, furthest, latest, oldest")]
pub struct SortPolicyParseError {
    raw: String,
}

impl SortPolicy {
    pub const ALL: [Self; 4] = [Self::Nearest, Self::Furthest, Self::Latest, Self::Oldest];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Nearest => "nearest",
            Self::Furthest => "furthest",
            Self::Latest => "latest",
            Self::Oldest => "oldest",
        }
    }
}

impl fmt::Display for SortPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortPolicy {
    type Err = SortPolicyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nearest" => Ok(Self::Nearest),
            "furthest" => Ok(Self::Furthest),
            "latest" => Ok(Self::Latest),
            "oldest" => Ok(Self::Oldest),
            _ => Err(SortPolicyParseError { raw: s.to_string() }),
        }
    }
}
