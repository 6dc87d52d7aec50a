//! Task priority.
//!
//! Priorities are an open string at every boundary: board tasks carry the
//! lowercase form and model output usually carries the capitalized form, but
//! nothing stops a model from answering "Urgent". Known values are matched
//! case-insensitively and canonicalized; anything else is kept verbatim and
//! ranked after `Low`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Priority {
    High,
    Medium,
    Low,
    /// Any value outside the known three, preserved as received.
    Other(String),
}

impl Priority {
    /// The three known priorities, highest first.
    pub const KNOWN: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "high" => Priority::High,
            "medium" => Priority::Medium,
            "low" => Priority::Low,
            _ => Priority::Other(raw.to_string()),
        }
    }

    /// Sort rank: High=1, Medium=2, Low=3, anything else=4.
    pub fn rank(&self) -> u8 {
        match self {
            Priority::High => 1,
            Priority::Medium => 2,
            Priority::Low => 3,
            Priority::Other(_) => 4,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
            Priority::Other(raw) => raw,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Priority::Other(_))
    }

    /// Compare by rank only; two unknown values tie.
    pub fn cmp_rank(&self, other: &Priority) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Priority {
    fn from(raw: &str) -> Self {
        Priority::parse(raw)
    }
}

impl std::str::FromStr for Priority {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Priority::parse(s))
    }
}

impl Serialize for Priority {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Priority::parse(&raw))
    }
}
