//! Object file modification markers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// Modification marker of an object file, in nanoseconds since the Unix epoch.
///
/// The value `0` ([`ObjectMarker::NONE`]) means no object has been recorded.
/// Markers are only compared for equality; their magnitude carries no meaning.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectMarker(u64);

impl ObjectMarker {
    /// Marker for "no object recorded".
    pub const NONE: ObjectMarker = ObjectMarker(0);

    /// Creates a marker from a raw nanosecond count.
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw nanosecond count.
    pub fn raw(self) -> u64 {
        self.0
    }

    /// Returns `true` if this is [`ObjectMarker::NONE`].
    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    /// Converts a modification time into a marker.
    ///
    /// Times before the epoch collapse to [`ObjectMarker::NONE`].
    pub fn from_system_time(time: SystemTime) -> Self {
        let nanos = time
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        Self(u64::try_from(nanos).unwrap_or(u64::MAX))
    }

    /// Reads the modification marker of the file at `path`.
    ///
    /// Returns `Ok(None)` if the file does not exist.
    pub fn of_file(path: &Path) -> std::io::Result<Option<Self>> {
        match std::fs::metadata(path) {
            Ok(meta) => Ok(Some(Self::from_system_time(meta.modified()?))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }
}

impl fmt::Display for ObjectMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for ObjectMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectMarker({})", self.0)
    }
}
