//! CRC-32/IEEE payload integrity checks.
//!
//! This is the standard reflected CRC-32 (polynomial `0xEDB88320`, initial
//! value `0xFFFFFFFF`, final XOR `0xFFFFFFFF`), the same variant produced by
//! zlib, PNG, and Ethernet. The replay container stores this checksum over
//! its payload so that a flipped bit anywhere in the input data is caught at
//! read time instead of silently corrupting a re-simulation.
//!
//! The implementation is a compile-time-generated 256-entry table; no
//! dependency, no allocation, and the polynomial can never drift out from
//! under the pinned file format.
//!
//! # Usage
//!
//! ```
//! use rampart_rollback::crc32;
//!
//! // One-shot
//! assert_eq!(crc32::checksum(b"123456789"), 0xCBF43926);
//!
//! // Incremental
//! let mut digest = crc32::Crc32::new();
//! digest.update(b"1234");
//! digest.update(b"56789");
//! assert_eq!(digest.finalize(), 0xCBF43926);
//! ```

/// The reflected CRC-32/IEEE polynomial.
pub const POLYNOMIAL: u32 = 0xEDB8_8320;

const fn build_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = i as u32;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 1 != 0 {
                (crc >> 1) ^ POLYNOMIAL
            } else {
                crc >> 1
            };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

static TABLE: [u32; 256] = build_table();

/// An incremental CRC-32/IEEE digest.
///
/// Useful when the payload is produced in pieces (e.g. streaming a replay's
/// frames). For a single contiguous buffer, [`checksum`] is shorter.
#[derive(Debug, Clone, Copy)]
pub struct Crc32 {
    state: u32,
}

impl Crc32 {
    /// Creates a digest in its initial state.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self { state: 0xFFFF_FFFF }
    }

    /// Feeds bytes into the digest.
    #[inline]
    pub fn update(&mut self, bytes: &[u8]) {
        let mut crc = self.state;
        for &byte in bytes {
            let index = ((crc ^ u32::from(byte)) & 0xFF) as usize;
            crc = (crc >> 8) ^ TABLE[index];
        }
        self.state = crc;
    }

    /// Returns the final checksum. The digest itself is unchanged and may
    /// keep accepting bytes.
    #[inline]
    #[must_use]
    pub const fn finalize(&self) -> u32 {
        self.state ^ 0xFFFF_FFFF
    }
}

impl Default for Crc32 {
    fn default() -> Self {
        Self::new()
    }
}

/// Computes the CRC-32/IEEE checksum of a byte slice in one call.
#[must_use]
pub fn checksum(bytes: &[u8]) -> u32 {
    let mut digest = Crc32::new();
    digest.update(bytes);
    digest.finalize()
}

#[cfg(test)]
#[allow(clippy::panic, clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    // The standard check value for CRC-32/IEEE.
    #[test]
    fn check_value() {
        assert_eq!(checksum(b"123456789"), 0xCBF43926);
    }

    #[test]
    fn empty_input_is_zero() {
        assert_eq!(checksum(b""), 0);
    }

    #[test]
    fn incremental_matches_one_shot() {
        let data = b"the quick brown fox jumps over the lazy dog";
        let mut digest = Crc32::new();
        for chunk in data.chunks(7) {
            digest.update(chunk);
        }
        assert_eq!(digest.finalize(), checksum(data));
    }

    #[test]
    fn finalize_does_not_consume() {
        let mut digest = Crc32::new();
        digest.update(b"abc");
        let first = digest.finalize();
        assert_eq!(first, digest.finalize());
        digest.update(b"def");
        assert_eq!(digest.finalize(), checksum(b"abcdef"));
    }

    #[test]
    fn single_bit_flip_changes_checksum() {
        let data = [0x00u8, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07];
        let reference = checksum(&data);
        for byte in 0..data.len() {
            for bit in 0..8 {
                let mut flipped = data;
                flipped[byte] ^= 1 << bit;
                assert_ne!(
                    checksum(&flipped),
                    reference,
                    "flip of byte {byte} bit {bit} went undetected"
                );
            }
        }
    }

    #[test]
    fn known_vectors() {
        assert_eq!(checksum(b"a"), 0xE8B7BE43);
        assert_eq!(checksum(b"abc"), 0x352441C2);
        assert_eq!(checksum(&[0u8; 4]), 0x2144DF1C);
    }
}
