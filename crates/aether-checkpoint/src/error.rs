//! Error types for checkpoint encoding, decoding and validation.

use std::fmt;
use std::io;

use crate::types::Key;

/// Errors that can occur while writing, reading or validating a checkpoint.
#[derive(Debug)]
pub enum CheckpointError {
    /// An I/O error occurred during read or write.
    Io(io::Error),
    /// The file does not start with the expected `b"AETH"` magic bytes.
    InvalidMagic,
    /// The format version is not supported by this build.
    UnsupportedVersion {
        /// The version found in the file.
        found: u8,
    },
    /// The bundle could not be decoded (truncated or corrupt data).
    MalformedFrame {
        /// Human-readable description of what went wrong.
        detail: String,
    },
    /// The trailing hash does not match the bundle contents.
    ChecksumMismatch {
        /// Hash stored in the file.
        recorded: u64,
        /// Hash computed over the bytes read.
        computed: u64,
    },
    /// A required key is absent.
    MissingEntry {
        /// The missing key.
        key: Key,
    },
    /// An entry holds a different type of data than the key requires.
    WrongEntryType {
        /// The key whose entry was mistyped.
        key: Key,
        /// The entry type the key requires.
        expected: &'static str,
    },
    /// A tag code is not part of the enumeration stored under its key.
    UnknownTag {
        /// The key holding the tag.
        key: Key,
        /// The unrecognised code.
        code: u8,
    },
    /// The checkpoint describes a different configuration than the
    /// restoring engine expects.
    Incompatible {
        /// The key whose value differs.
        key: Key,
        /// What the restoring engine expects.
        expected: String,
        /// What the checkpoint contains.
        found: String,
    },
}

impl fmt::Display for CheckpointError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::InvalidMagic => write!(f, "invalid magic bytes (expected b\"AETH\")"),
            Self::UnsupportedVersion { found } => {
                write!(f, "unsupported format version {found}")
            }
            Self::MalformedFrame { detail } => write!(f, "malformed checkpoint: {detail}"),
            Self::ChecksumMismatch { recorded, computed } => {
                write!(
                    f,
                    "checksum mismatch: recorded={recorded:#018x}, computed={computed:#018x}"
                )
            }
            Self::MissingEntry { key } => write!(f, "checkpoint has no {key} entry"),
            Self::WrongEntryType { key, expected } => {
                write!(f, "{key} entry is not {expected}")
            }
            Self::UnknownTag { key, code } => write!(f, "unknown {key} tag {code}"),
            Self::Incompatible {
                key,
                expected,
                found,
            } => {
                write!(
                    f,
                    "incompatible checkpoint: {key} is {found}, expected {expected}"
                )
            }
        }
    }
}

impl std::error::Error for CheckpointError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for CheckpointError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}
