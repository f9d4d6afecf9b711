//! Error types for value encoding and decoding.

use std::error::Error;
use std::fmt;

/// Errors from decoding a [`Value`](crate::Value) out of its byte encoding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValueError {
    /// The buffer ended before the value was complete.
    Truncated {
        /// Bytes the decoder needed.
        needed: usize,
        /// Bytes that were available.
        available: usize,
    },
    /// The bytes do not describe a valid value.
    Invalid {
        /// Human-readable description of what went wrong.
        detail: String,
    },
}

impl fmt::Display for ValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Truncated { needed, available } => {
                write!(f, "truncated value: needed {needed} bytes, {available} available")
            }
            Self::Invalid { detail } => write!(f, "invalid value: {detail}"),
        }
    }
}

impl Error for ValueError {}
