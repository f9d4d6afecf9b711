//! Checkpoint bundles for the Aether automaton.
//!
//! A checkpoint is an ordered set of `(key, entry)` pairs. Keys and the
//! tags stored under them are closed enumerations, so a restoring engine
//! can check model identity, value representation, grid layout and
//! bounds before touching any grid data.
//!
//! # Architecture
//!
//! - [`Checkpoint`] is the in-memory bundle with typed accessors and
//!   compatibility checks ([`Checkpoint::expect_tag`])
//! - [`write_file`] / [`read_file`] move bundles to and from disk
//! - All I/O uses a custom binary codec (no serde dependency)
//!
//! # Format
//!
//! ```text
//! [MAGIC "AETH"] [VERSION u8] [ENTRY COUNT u32]
//! [KEY u8] [ENTRY] ... [KEY u8] [ENTRY]
//! [FNV-1a HASH u64 over everything above]
//! ```
//!
//! Each entry starts with a one-byte type marker: a tag code, a flag,
//! an unsigned integer, or a `u64`-length-prefixed byte payload.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod bundle;
pub mod codec;
pub mod error;
pub mod hash;
pub mod reader;
pub mod types;
pub mod writer;

pub use bundle::Checkpoint;
pub use error::CheckpointError;
pub use hash::checksum;
pub use reader::{from_bytes, read_file};
pub use types::{
    CheckpointTag, CoordinateBounds, Entry, GridImplementation, GridType, InitialConfiguration,
    Key, Model,
};
pub use writer::{to_bytes, write_file};

/// Magic bytes at the start of every checkpoint file.
pub const MAGIC: [u8; 4] = *b"AETH";

/// Current binary format version.
pub const FORMAT_VERSION: u8 = 1;
