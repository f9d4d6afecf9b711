//! Checkpoint reading.

use std::fs;
use std::path::Path;

use crate::bundle::Checkpoint;
use crate::codec::decode_checkpoint;
use crate::error::CheckpointError;
use crate::hash::checksum;

/// Verify the checksum trailer of `bytes` and decode the bundle before it.
pub fn from_bytes(bytes: &[u8]) -> Result<Checkpoint, CheckpointError> {
    if bytes.len() < 8 {
        return Err(CheckpointError::MalformedFrame {
            detail: format!("{} bytes is too short for a checkpoint", bytes.len()),
        });
    }
    let (body, trailer) = bytes.split_at(bytes.len() - 8);
    let mut recorded = [0u8; 8];
    recorded.copy_from_slice(trailer);
    let recorded = u64::from_le_bytes(recorded);
    let computed = checksum(body);
    if recorded != computed {
        return Err(CheckpointError::ChecksumMismatch { recorded, computed });
    }

    let mut cursor = body;
    let checkpoint = decode_checkpoint(&mut cursor)?;
    if !cursor.is_empty() {
        return Err(CheckpointError::MalformedFrame {
            detail: format!("{} trailing bytes after last entry", cursor.len()),
        });
    }
    Ok(checkpoint)
}

/// Read and verify the checkpoint stored at `path`.
pub fn read_file(path: &Path) -> Result<Checkpoint, CheckpointError> {
    let bytes = fs::read(path)?;
    let checkpoint = from_bytes(&bytes)?;
    log::info!(
        "read checkpoint {} ({} entries)",
        path.display(),
        checkpoint.len()
    );
    Ok(checkpoint)
}
