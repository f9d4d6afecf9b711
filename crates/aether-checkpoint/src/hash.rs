//! Integrity hashing for checkpoint files.
//!
//! Uses FNV-1a for a fast, deterministic checksum over the encoded
//! bundle. The hash is not cryptographically secure; it only catches
//! truncation and accidental corruption.

/// FNV-1a offset basis for 64-bit.
const FNV_OFFSET: u64 = 0xcbf29ce484222325;
/// FNV-1a prime for 64-bit.
const FNV_PRIME: u64 = 0x00000100000001B3;

/// Feed a single byte into an FNV-1a hash state.
#[inline]
fn fnv1a_byte(hash: u64, byte: u8) -> u64 {
    (hash ^ byte as u64).wrapping_mul(FNV_PRIME)
}

/// FNV-1a hash of `bytes`.
///
/// Returns `FNV_OFFSET` for an empty slice.
pub fn checksum(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET, |hash, &b| fnv1a_byte(hash, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_offset_basis() {
        assert_eq!(checksum(&[]), FNV_OFFSET);
    }

    #[test]
    fn known_vector() {
        // Reference value for FNV-1a 64 of "a".
        assert_eq!(checksum(b"a"), 0xaf63dc4c8601ec8c);
    }

    #[test]
    fn order_matters() {
        assert_ne!(checksum(&[1, 2]), checksum(&[2, 1]));
    }
}
