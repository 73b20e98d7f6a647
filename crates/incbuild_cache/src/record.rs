//! A single compilation record and its line encoding.
//!
//! Each record occupies one line of the record file:
//!
//! ```text
//! <source-path> <source-size> <object-marker> [xxh3:<hash>]
//! ```
//!
//! Fields are split off from the right, so a source path may itself contain
//! spaces. The trailing hash token is only written under the hash policy.

use incbuild_common::{ContentHash, ObjectMarker};

/// Prefix of the optional content-hash token.
const HASH_PREFIX: &str = "xxh3:";

/// Recorded state of one source file at the last successful run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompilationRecord {
    /// Byte length of the source file.
    pub source_size: u64,
    /// Modification marker of the object file, or [`ObjectMarker::NONE`].
    pub object_marker: ObjectMarker,
    /// Content hash of the source, present under the hash policy.
    pub content_hash: Option<ContentHash>,
}

impl CompilationRecord {
    /// Creates a record without a content hash.
    pub fn new(source_size: u64, object_marker: ObjectMarker) -> Self {
        Self {
            source_size,
            object_marker,
            content_hash: None,
        }
    }

    /// Attaches a content hash.
    pub fn with_hash(mut self, hash: Option<ContentHash>) -> Self {
        self.content_hash = hash;
        self
    }
}

/// Returns `true` if `key` can be written on a single line and parsed back.
pub fn is_persistable_key(key: &str) -> bool {
    !key.is_empty()
        && !key.contains(&['\n', '\r'][..])
        && !key.ends_with(char::is_whitespace)
}

/// Encodes a record as one line, without the trailing newline.
///
/// Returns `None` for keys rejected by [`is_persistable_key`].
pub fn encode_line(key: &str, record: &CompilationRecord) -> Option<String> {
    if !is_persistable_key(key) {
        return None;
    }
    let mut line = format!("{key} {} {}", record.source_size, record.object_marker);
    if let Some(hash) = record.content_hash {
        line.push(' ');
        line.push_str(HASH_PREFIX);
        line.push_str(&hash.to_string());
    }
    Some(line)
}

/// Decodes one line into a key and record.
///
/// On failure returns a human-readable reason; the caller attaches the line
/// number.
pub fn decode_line(line: &str) -> Result<(String, CompilationRecord), String> {
    let line = line.trim_end();

    let (mut rest, mut last) = split_last(line).ok_or("expected at least three fields")?;

    let mut content_hash = None;
    if let Some(hex) = last.strip_prefix(HASH_PREFIX) {
        content_hash = Some(hex.parse::<ContentHash>().map_err(|e| e.to_string())?);
        (rest, last) = split_last(rest).ok_or("missing object marker")?;
    }

    let marker: u64 = last
        .parse()
        .map_err(|_| format!("invalid object marker '{last}'"))?;

    let (path, size) = split_last(rest).ok_or("missing source size")?;
    let source_size: u64 = size
        .parse()
        .map_err(|_| format!("invalid source size '{size}'"))?;

    if path.is_empty() {
        return Err("missing source path".to_string());
    }

    let record = CompilationRecord::new(source_size, ObjectMarker::from_raw(marker))
        .with_hash(content_hash);
    Ok((path.to_string(), record))
}

/// Splits off the last whitespace-separated field.
///
/// Returns `(head, last)` with trailing whitespace removed from `head`, or
/// `None` if there is no separator.
fn split_last(s: &str) -> Option<(&str, &str)> {
    let (head, last) = s.rsplit_once(char::is_whitespace)?;
    if last.is_empty() {
        return None;
    }
    Some((head.trim_end(), last))
}
