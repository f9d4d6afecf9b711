//! Binary encode/decode for the checkpoint format.
//!
//! All integers are little-endian. Byte payloads are length-prefixed
//! with a `u64` length so grid payloads are not limited to 4 GiB. The
//! format is deliberately simple: no compression, no alignment padding.

use std::io::{Read, Write};

use crate::bundle::Checkpoint;
use crate::error::CheckpointError;
use crate::types::{Entry, Key};
use crate::{FORMAT_VERSION, MAGIC};

// ── Primitive writers ───────────────────────────────────────────

/// Write a single byte.
pub fn write_u8(w: &mut dyn Write, v: u8) -> Result<(), CheckpointError> {
    w.write_all(&[v])?;
    Ok(())
}

/// Write a little-endian u32.
pub fn write_u32_le(w: &mut dyn Write, v: u32) -> Result<(), CheckpointError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

/// Write a little-endian u64.
pub fn write_u64_le(w: &mut dyn Write, v: u64) -> Result<(), CheckpointError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

/// Write a length-prefixed byte array (u64 length + bytes).
pub fn write_length_prefixed_bytes(w: &mut dyn Write, b: &[u8]) -> Result<(), CheckpointError> {
    write_u64_le(w, b.len() as u64)?;
    w.write_all(b)?;
    Ok(())
}

// ── Primitive readers ───────────────────────────────────────────

/// Read a single byte.
pub fn read_u8(r: &mut dyn Read) -> Result<u8, CheckpointError> {
    let mut buf = [0u8; 1];
    r.read_exact(&mut buf)?;
    Ok(buf[0])
}

/// Read a little-endian u32.
pub fn read_u32_le(r: &mut dyn Read) -> Result<u32, CheckpointError> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

/// Read a little-endian u64.
pub fn read_u64_le(r: &mut dyn Read) -> Result<u64, CheckpointError> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

/// Read a length-prefixed byte array.
///
/// Reads incrementally so a corrupt length cannot trigger a huge
/// up-front allocation.
pub fn read_length_prefixed_bytes(r: &mut dyn Read) -> Result<Vec<u8>, CheckpointError> {
    let len = read_u64_le(r)?;
    let mut buf = Vec::new();
    r.take(len).read_to_end(&mut buf)?;
    if buf.len() as u64 != len {
        return Err(CheckpointError::MalformedFrame {
            detail: format!("byte payload truncated: expected {len} bytes, got {}", buf.len()),
        });
    }
    Ok(buf)
}

// ── Entry encode/decode ─────────────────────────────────────────

/// Encode one entry: type marker followed by its payload.
pub fn encode_entry(w: &mut dyn Write, entry: &Entry) -> Result<(), CheckpointError> {
    write_u8(w, entry.marker())?;
    match entry {
        Entry::Tag(code) => write_u8(w, *code),
        Entry::Flag(flag) => write_u8(w, u8::from(*flag)),
        Entry::Unsigned(v) => write_u64_le(w, *v),
        Entry::Bytes(b) => write_length_prefixed_bytes(w, b),
    }
}

/// Decode one entry.
pub fn decode_entry(r: &mut dyn Read) -> Result<Entry, CheckpointError> {
    let marker = read_u8(r)?;
    match marker {
        0 => Ok(Entry::Tag(read_u8(r)?)),
        1 => match read_u8(r)? {
            0 => Ok(Entry::Flag(false)),
            1 => Ok(Entry::Flag(true)),
            other => Err(CheckpointError::MalformedFrame {
                detail: format!("invalid flag byte {other}"),
            }),
        },
        2 => Ok(Entry::Unsigned(read_u64_le(r)?)),
        3 => Ok(Entry::Bytes(read_length_prefixed_bytes(r)?)),
        other => Err(CheckpointError::MalformedFrame {
            detail: format!("unknown entry marker {other}"),
        }),
    }
}

// ── Bundle encode/decode ────────────────────────────────────────

/// Encode a checkpoint: magic, version, entry count, then entries in order.
pub fn encode_checkpoint(w: &mut dyn Write, checkpoint: &Checkpoint) -> Result<(), CheckpointError> {
    w.write_all(&MAGIC)?;
    write_u8(w, FORMAT_VERSION)?;
    write_u32_le(w, checkpoint.len() as u32)?;
    for (key, entry) in checkpoint.iter() {
        write_u8(w, key.code())?;
        encode_entry(w, entry)?;
    }
    Ok(())
}

/// Decode a checkpoint written by [`encode_checkpoint`].
///
/// Validates the magic bytes and format version, and rejects unknown
/// or duplicated keys.
pub fn decode_checkpoint(r: &mut dyn Read) -> Result<Checkpoint, CheckpointError> {
    let mut magic = [0u8; 4];
    r.read_exact(&mut magic)?;
    if magic != MAGIC {
        return Err(CheckpointError::InvalidMagic);
    }
    let version = read_u8(r)?;
    if version != FORMAT_VERSION {
        return Err(CheckpointError::UnsupportedVersion { found: version });
    }

    let count = read_u32_le(r)?;
    let mut checkpoint = Checkpoint::new();
    for _ in 0..count {
        let code = read_u8(r)?;
        let key = Key::from_code(code).ok_or_else(|| CheckpointError::MalformedFrame {
            detail: format!("unknown key code {code}"),
        })?;
        let entry = decode_entry(r)?;
        if checkpoint.put(key, entry).is_some() {
            return Err(CheckpointError::MalformedFrame {
                detail: format!("duplicate {key} entry"),
            });
        }
    }
    Ok(checkpoint)
}
