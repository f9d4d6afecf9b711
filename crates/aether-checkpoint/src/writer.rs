//! Checkpoint writing.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::bundle::Checkpoint;
use crate::codec::encode_checkpoint;
use crate::error::CheckpointError;
use crate::hash::checksum;

/// Encode `checkpoint` followed by its FNV-1a checksum trailer.
pub fn to_bytes(checkpoint: &Checkpoint) -> Result<Vec<u8>, CheckpointError> {
    let mut buf = Vec::new();
    encode_checkpoint(&mut buf, checkpoint)?;
    let hash = checksum(&buf);
    buf.extend_from_slice(&hash.to_le_bytes());
    Ok(buf)
}

/// Write `checkpoint` to `path`, replacing any existing file, and sync
/// it to disk before returning.
pub fn write_file(path: &Path, checkpoint: &Checkpoint) -> Result<(), CheckpointError> {
    let bytes = to_bytes(checkpoint)?;
    let mut out = BufWriter::new(File::create(path)?);
    out.write_all(&bytes)?;
    let file = out.into_inner().map_err(|e| CheckpointError::Io(e.into_error()))?;
    file.sync_all()?;
    log::info!(
        "wrote checkpoint {} ({} entries, {} bytes)",
        path.display(),
        checkpoint.len(),
        bytes.len()
    );
    Ok(())
}
