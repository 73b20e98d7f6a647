//! Change-detection policy selection.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a source file is judged to have changed since the last run.
///
/// `Size` compares byte lengths only, so a same-size edit goes unnoticed.
/// `Hash` additionally compares XXH3-128 content hashes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionPolicy {
    /// Byte-length comparison.
    #[default]
    Size,
    /// Byte-length plus content-hash comparison.
    Hash,
}

impl DetectionPolicy {
    /// Returns `true` if sources must be hashed under this policy.
    pub fn uses_hash(self) -> bool {
        self == DetectionPolicy::Hash
    }
}

impl fmt::Display for DetectionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetectionPolicy::Size => write!(f, "size"),
            DetectionPolicy::Hash => write!(f, "hash"),
        }
    }
}

impl FromStr for DetectionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "size" => Ok(DetectionPolicy::Size),
            "hash" => Ok(DetectionPolicy::Hash),
            other => Err(format!(
                "unknown detection policy '{other}' (valid: size, hash)"
            )),
        }
    }
}
