//! Health condition domain model.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Kind of health condition a user tracks.
///
/// New conditions are restricted to [`ConditionKind::KNOWN`]; `Other` holds
/// any label already present in storage and round-trips it verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConditionKind {
    Disease,
    Injury,
    Other(String),
}

impl ConditionKind {
    /// Kinds accepted from callers.
    pub const KNOWN: [Self; 2] = [Self::Disease, Self::Injury];

    pub fn as_str(&self) -> &str {
        match self {
            Self::Disease => "disease",
            Self::Injury => "injury",
            Self::Other(label) => label,
        }
    }

    /// Strict parse: `Some` only for a known kind.
    pub fn parse_known(s: &str) -> Option<Self> {
        match Self::from(s) {
            Self::Other(_) => None,
            kind => Some(kind),
        }
    }

    pub const fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl From<&str> for ConditionKind {
    fn from(s: &str) -> Self {
        match s {
            "disease" => Self::Disease,
            "injury" => Self::Injury,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for ConditionKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "disease" => Self::Disease,
            "injury" => Self::Injury,
            _ => Self::Other(s),
        }
    }
}

impl fmt::Display for ConditionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ConditionKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ConditionKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::from)
    }
}

/// A tracked health condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ConditionKind,
}

impl Condition {
    pub const ENTITY: &'static str = "condition";
}

/// Fields supplied when creating or replacing a condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCondition {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ConditionKind,
}
