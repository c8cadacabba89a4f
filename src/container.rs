//! The RPLK v1 binary replay container.
//!
//! A replay on disk is a fixed 32-byte little-endian header followed by four
//! bytes per frame (`p1.buttons: u16`, `p2.buttons: u16`). No compression.
//!
//! ```text
//! offset  size  field
//!      0     4  magic        ASCII "RPLK"
//!      4     1  version      1
//!      5     1  flags        0 (reserved)
//!      6     2  header size  32
//!      8     4  seed
//!     12     4  start frame
//!     16     4  frame count
//!     20     4  payload CRC-32/IEEE
//!     24     8  reserved     zeros
//! ```
//!
//! The CRC (see [`crate::crc32`]) covers the payload only, so a flipped bit
//! anywhere in the input data fails the read instead of silently corrupting a
//! re-simulation. Reads validate in a fixed order (magic, version, header
//! size, payload presence, CRC) and fail with a typed error naming the first
//! violated check; an early end of stream is its own `Truncated` error.
//!
//! The module is a pure transformation over caller-provided streams: writing
//! targets any [`io::Write`], reading any [`io::Read`]. Opening files is the
//! caller's business.

use std::io;

use crate::crc32;
use crate::error::{CorruptKind, UnsupportedKind};
use crate::replay::{InputPair, Replay};
use crate::{Frame, Input, RampartError};

/// The four magic bytes opening every replay container.
pub const RPLK_MAGIC: [u8; 4] = *b"RPLK";

/// The container format version this crate reads and writes.
pub const CONTAINER_VERSION: u8 = 1;

/// Fixed header size in bytes.
pub const HEADER_SIZE: u16 = 32;

/// Bytes of payload per recorded frame.
const BYTES_PER_FRAME: usize = 4;

/// Serializes a replay into `writer` as an RPLK v1 container.
///
/// # Errors
/// Returns [`RampartError::Unsupported`] for a replay with a non-zero start
/// frame, and [`RampartError::Io`] if the writer fails.
pub fn write_replay<W: io::Write>(
    replay: &Replay,
    writer: &mut W,
) -> Result<(), RampartError> {
    if replay.start_frame() != Frame::ZERO {
        return Err(UnsupportedKind::NonZeroStartFrame {
            start_frame: replay.start_frame(),
        }
        .into());
    }

    let mut payload = Vec::with_capacity(replay.len() * BYTES_PER_FRAME);
    for pair in replay.inputs() {
        payload.extend_from_slice(&pair.p1.bits().to_le_bytes());
        payload.extend_from_slice(&pair.p2.bits().to_le_bytes());
    }

    let mut header = [0u8; HEADER_SIZE as usize];
    header[0..4].copy_from_slice(&RPLK_MAGIC);
    header[4] = CONTAINER_VERSION;
    header[5] = 0; // flags, reserved
    header[6..8].copy_from_slice(&HEADER_SIZE.to_le_bytes());
    header[8..12].copy_from_slice(&replay.seed().to_le_bytes());
    header[12..16].copy_from_slice(&replay.start_frame().as_u32().to_le_bytes());
    header[16..20].copy_from_slice(&(replay.len() as u32).to_le_bytes());
    header[20..24].copy_from_slice(&crc32::checksum(&payload).to_le_bytes());
    // bytes 24..32 stay zero (reserved)

    writer.write_all(&header).map_err(io_error)?;
    writer.write_all(&payload).map_err(io_error)?;
    Ok(())
}

/// Reads and validates an RPLK v1 container, returning the replay.
///
/// # Errors
/// - [`RampartError::Truncated`] if the stream ends before the header or the
///   declared payload is complete.
/// - [`RampartError::Corrupt`] naming the first failed validation step (bad
///   magic, wrong header size, CRC mismatch).
/// - [`RampartError::Unsupported`] for an unknown container version.
/// - [`RampartError::Io`] for non-EOF reader failures.
pub fn read_replay<R: io::Read>(reader: &mut R) -> Result<Replay, RampartError> {
    let mut header = [0u8; HEADER_SIZE as usize];
    fill(reader, &mut header)?;

    let magic: [u8; 4] = [header[0], header[1], header[2], header[3]];
    if magic != RPLK_MAGIC {
        return Err(CorruptKind::BadMagic { found: magic }.into());
    }

    let version = header[4];
    if version != CONTAINER_VERSION {
        return Err(UnsupportedKind::ContainerVersion { version }.into());
    }

    let header_size = u16::from_le_bytes([header[6], header[7]]);
    if header_size != HEADER_SIZE {
        return Err(CorruptKind::WrongHeaderSize { found: header_size }.into());
    }

    let seed = u32::from_le_bytes([header[8], header[9], header[10], header[11]]);
    let start_frame =
        u32::from_le_bytes([header[12], header[13], header[14], header[15]]);
    let frame_count =
        u32::from_le_bytes([header[16], header[17], header[18], header[19]]);
    let stored_crc =
        u32::from_le_bytes([header[20], header[21], header[22], header[23]]);

    let payload = read_payload(reader, frame_count as usize * BYTES_PER_FRAME)?;

    let computed_crc = crc32::checksum(&payload);
    if computed_crc != stored_crc {
        return Err(CorruptKind::ChecksumMismatch {
            stored: stored_crc,
            computed: computed_crc,
        }
        .into());
    }

    let mut inputs = Vec::with_capacity(frame_count as usize);
    for chunk in payload.chunks_exact(BYTES_PER_FRAME) {
        inputs.push(InputPair::new(
            Input::from_bits(u16::from_le_bytes([chunk[0], chunk[1]])),
            Input::from_bits(u16::from_le_bytes([chunk[2], chunk[3]])),
        ));
    }

    Replay::new(seed, Frame::new(start_frame), inputs)
}

/// Reads exactly `expected` payload bytes in bounded chunks.
///
/// Growing the buffer as data actually arrives means a corrupt header
/// declaring an absurd frame count fails with `Truncated` when the stream
/// runs dry instead of pre-allocating gigabytes.
fn read_payload<R: io::Read>(
    reader: &mut R,
    expected: usize,
) -> Result<Vec<u8>, RampartError> {
    const CHUNK: usize = 64 * 1024;

    let mut payload = Vec::with_capacity(expected.min(CHUNK));
    let mut chunk = [0u8; CHUNK];
    while payload.len() < expected {
        let want = (expected - payload.len()).min(CHUNK);
        match reader.read(&mut chunk[..want]) {
            Ok(0) => {
                return Err(RampartError::Truncated {
                    expected,
                    actual: payload.len(),
                })
            },
            Ok(n) => payload.extend_from_slice(&chunk[..n]),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {},
            Err(e) => return Err(io_error(e)),
        }
    }
    Ok(payload)
}

/// Fills `buf` completely or reports how far the stream got.
fn fill<R: io::Read>(reader: &mut R, buf: &mut [u8]) -> Result<(), RampartError> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => {
                return Err(RampartError::Truncated {
                    expected: buf.len(),
                    actual: filled,
                })
            },
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {},
            Err(e) => return Err(io_error(e)),
        }
    }
    Ok(())
}

fn io_error(e: io::Error) -> RampartError {
    RampartError::Io { kind: e.kind() }
}
