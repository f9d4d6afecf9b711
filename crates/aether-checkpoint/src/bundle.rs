//! The in-memory checkpoint bundle.

use indexmap::IndexMap;

use crate::error::CheckpointError;
use crate::types::{CheckpointTag, Entry, Key};

/// An ordered set of `(key, entry)` pairs describing a simulation state.
///
/// Insertion order is preserved and is the order entries are written.
/// Typed accessors fail with a descriptive [`CheckpointError`] when an
/// entry is missing or holds the wrong type of data.
///
/// # Examples
///
/// ```
/// use aether_checkpoint::{Checkpoint, Entry, Key, Model};
///
/// let mut cp = Checkpoint::new();
/// cp.put_tag(Key::Model, Model::Aether);
/// cp.put(Key::Step, Entry::Unsigned(7));
///
/// assert!(cp.expect_tag(Key::Model, Model::Aether).is_ok());
/// assert_eq!(cp.unsigned(Key::Step).unwrap(), 7);
/// assert!(cp.bytes(Key::Grid).is_err());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Checkpoint {
    entries: IndexMap<Key, Entry>,
}

impl Checkpoint {
    /// Create an empty bundle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an entry, returning the previous one.
    pub fn put(&mut self, key: Key, entry: Entry) -> Option<Entry> {
        self.entries.insert(key, entry)
    }

    /// Insert a tag entry.
    pub fn put_tag<T: CheckpointTag>(&mut self, key: Key, tag: T) {
        self.entries.insert(key, Entry::Tag(tag.code()));
    }

    /// The entry stored under `key`, if any.
    pub fn get(&self, key: Key) -> Option<&Entry> {
        self.entries.get(&key)
    }

    /// Whether the bundle holds an entry for `key`.
    pub fn contains(&self, key: Key) -> bool {
        self.entries.contains_key(&key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the bundle has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Key, &Entry)> {
        self.entries.iter()
    }

    fn require(&self, key: Key) -> Result<&Entry, CheckpointError> {
        self.get(key).ok_or(CheckpointError::MissingEntry { key })
    }

    /// Decode the tag stored under `key`.
    pub fn tag<T: CheckpointTag>(&self, key: Key) -> Result<T, CheckpointError> {
        match self.require(key)? {
            Entry::Tag(code) => {
                T::from_code(*code).ok_or(CheckpointError::UnknownTag { key, code: *code })
            }
            _ => Err(CheckpointError::WrongEntryType {
                key,
                expected: "a tag",
            }),
        }
    }

    /// Fail with [`CheckpointError::Incompatible`] unless `key` holds `expected`.
    pub fn expect_tag<T: CheckpointTag>(&self, key: Key, expected: T) -> Result<(), CheckpointError> {
        let found: T = self.tag(key)?;
        if found != expected {
            return Err(CheckpointError::Incompatible {
                key,
                expected: expected.to_string(),
                found: found.to_string(),
            });
        }
        Ok(())
    }

    /// The unsigned integer stored under `key`.
    pub fn unsigned(&self, key: Key) -> Result<u64, CheckpointError> {
        match self.require(key)? {
            Entry::Unsigned(v) => Ok(*v),
            _ => Err(CheckpointError::WrongEntryType {
                key,
                expected: "an unsigned integer",
            }),
        }
    }

    /// Fail with [`CheckpointError::Incompatible`] unless `key` holds `expected`.
    pub fn expect_unsigned(&self, key: Key, expected: u64) -> Result<(), CheckpointError> {
        let found = self.unsigned(key)?;
        if found != expected {
            return Err(CheckpointError::Incompatible {
                key,
                expected: expected.to_string(),
                found: found.to_string(),
            });
        }
        Ok(())
    }

    /// The flag stored under `key`, or `None` when the key is absent.
    pub fn flag(&self, key: Key) -> Result<Option<bool>, CheckpointError> {
        match self.get(key) {
            None => Ok(None),
            Some(Entry::Flag(v)) => Ok(Some(*v)),
            Some(_) => Err(CheckpointError::WrongEntryType {
                key,
                expected: "a flag",
            }),
        }
    }

    /// The byte payload stored under `key`.
    pub fn bytes(&self, key: Key) -> Result<&[u8], CheckpointError> {
        match self.require(key)? {
            Entry::Bytes(b) => Ok(b),
            _ => Err(CheckpointError::WrongEntryType {
                key,
                expected: "a byte payload",
            }),
        }
    }
}
