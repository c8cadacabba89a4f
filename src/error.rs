//! Error types for Rampart Rollback.
//!
//! The error types are designed to be:
//!
//! - **Zero-allocation on hot paths**: errors store numeric data directly and
//!   format lazily in their `Display` implementations.
//! - **Programmatically inspectable**: structured enums and fields instead of
//!   string messages, so callers can match on specific failure cases.
//!
//! The crate distinguishes two failure contracts:
//!
//! - Typed errors ([`RampartError`]) for everything a user can observe and
//!   act on: bad arguments, unsupported or corrupt replay files, and the
//!   engine's fatal history conditions.
//! - Boolean-style failure (`Option`) for wire-packet decoding in
//!   [`crate::network::packet`]: a malformed datagram is dropped, never an
//!   error path, so stray traffic cannot destabilise a session.

use std::error::Error;
use std::fmt;
use std::fmt::Display;

use crate::Frame;

/// Represents why an argument was rejected.
///
/// Using an enum instead of `String` allows for zero-allocation error
/// construction while still producing detailed messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum InvalidArgumentKind {
    /// A PRNG or replay seed was zero. Zero is the absorbing state of
    /// XorShift32 and can never be used.
    ZeroSeed,
    /// A ring-buffer or engine history capacity was below the minimum of 2.
    CapacityTooSmall {
        /// The capacity that was requested.
        capacity: usize,
    },
    /// A raw player-side byte did not name a valid side.
    InvalidPlayerSide {
        /// The byte that was rejected.
        value: u8,
    },
    /// A bounded random draw was requested with an upper bound of zero.
    ZeroUpperBound,
    /// A ranged random draw was requested with `max <= min`.
    EmptyIntRange {
        /// The lower bound (inclusive).
        min: i32,
        /// The upper bound (exclusive).
        max: i32,
    },
    /// A packet carried an input count outside `[1, 32]`.
    InputCountOutOfRange {
        /// The count that was rejected.
        count: usize,
    },
    /// The destination buffer was too small for the encoded packet.
    DestinationTooSmall {
        /// The number of bytes required.
        required: usize,
        /// The number of bytes provided.
        provided: usize,
    },
}

impl Display for InvalidArgumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroSeed => write!(f, "seed must be non-zero"),
            Self::CapacityTooSmall { capacity } => {
                write!(f, "capacity {} is too small (minimum is 2)", capacity)
            },
            Self::InvalidPlayerSide { value } => {
                write!(f, "byte {} does not name a player side (0 or 1)", value)
            },
            Self::ZeroUpperBound => {
                write!(f, "bounded random draw requires a non-zero upper bound")
            },
            Self::EmptyIntRange { min, max } => {
                write!(f, "integer range [{}, {}) is empty", min, max)
            },
            Self::InputCountOutOfRange { count } => {
                write!(f, "packet input count {} is outside [1, 32]", count)
            },
            Self::DestinationTooSmall { required, provided } => {
                write!(
                    f,
                    "destination too small: needed {} bytes, but only {} provided",
                    required, provided
                )
            },
        }
    }
}

/// Represents why an operation or format revision is unsupported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum UnsupportedKind {
    /// Replays must start at frame 0; mid-session replays are not supported.
    NonZeroStartFrame {
        /// The start frame that was requested.
        start_frame: Frame,
    },
    /// The container declared a version this implementation does not read.
    ContainerVersion {
        /// The version byte found in the header.
        version: u8,
    },
}

impl Display for UnsupportedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonZeroStartFrame { start_frame } => {
                write!(
                    f,
                    "replay start frame {} is unsupported (must be 0)",
                    start_frame
                )
            },
            Self::ContainerVersion { version } => {
                write!(f, "unsupported replay container version {}", version)
            },
        }
    }
}

/// Represents the first validation step that failed while reading a replay
/// container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum CorruptKind {
    /// The magic bytes did not spell `RPLK`.
    BadMagic {
        /// The four bytes actually found.
        found: [u8; 4],
    },
    /// The declared header size was not 32.
    WrongHeaderSize {
        /// The header size actually found.
        found: u16,
    },
    /// The recomputed payload CRC did not match the stored one.
    ChecksumMismatch {
        /// The CRC stored in the header.
        stored: u32,
        /// The CRC recomputed over the payload.
        computed: u32,
    },
}

impl Display for CorruptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadMagic { found } => {
                write!(f, "bad magic bytes {:02X?} (expected \"RPLK\")", found)
            },
            Self::WrongHeaderSize { found } => {
                write!(f, "wrong header size {} (expected 32)", found)
            },
            Self::ChecksumMismatch { stored, computed } => {
                write!(
                    f,
                    "payload CRC mismatch: stored {:#010X}, computed {:#010X}",
                    stored, computed
                )
            },
        }
    }
}

/// This enum contains all error conditions this library can return. Most
/// fallible API functions return a `Result<_, RampartError>`.
///
/// # Forward Compatibility
///
/// This enum is marked `#[non_exhaustive]` because new error variants may be
/// added in future versions. Always include a wildcard arm when matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum RampartError {
    /// An argument was outside its valid range.
    InvalidArgument {
        /// The structured reason the argument was rejected.
        kind: InvalidArgumentKind,
    },
    /// The request named a feature or format revision this crate does not
    /// implement.
    Unsupported {
        /// The structured reason the request is unsupported.
        kind: UnsupportedKind,
    },
    /// A replay container failed validation.
    Corrupt {
        /// The first validation step that failed.
        kind: CorruptKind,
    },
    /// A rollback targeted a frame whose snapshot has been evicted from the
    /// history ring. Raise the engine's history capacity to cover the worst
    /// observed input delay.
    InsufficientHistory {
        /// The frame the rollback tried to restore.
        frame: Frame,
        /// The engine's configured history capacity.
        capacity: usize,
    },
    /// Re-simulation found no recorded local input for a past frame. Local
    /// inputs are recorded by every tick, so this is a programming error in
    /// the caller or the engine, not a user condition.
    MissingLocalInput {
        /// The frame whose local input was absent.
        frame: Frame,
    },
    /// A stream ended before the declared number of bytes could be read.
    Truncated {
        /// The number of bytes the format declared.
        expected: usize,
        /// The number of bytes actually available.
        actual: usize,
    },
    /// A non-EOF I/O failure surfaced by the container's stream adapters.
    Io {
        /// The kind of the underlying `std::io::Error`.
        kind: std::io::ErrorKind,
    },
}

impl Display for RampartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument { kind } => write!(f, "invalid argument: {}", kind),
            Self::Unsupported { kind } => write!(f, "unsupported: {}", kind),
            Self::Corrupt { kind } => write!(f, "corrupt replay data: {}", kind),
            Self::InsufficientHistory { frame, capacity } => {
                write!(
                    f,
                    "cannot roll back to frame {}: snapshot evicted from history \
                     (capacity {}); increase the engine's history capacity",
                    frame, capacity
                )
            },
            Self::MissingLocalInput { frame } => {
                write!(
                    f,
                    "no recorded local input for frame {} during re-simulation \
                     (please report as bug)",
                    frame
                )
            },
            Self::Truncated { expected, actual } => {
                write!(
                    f,
                    "stream ended early: expected {} bytes, got {}",
                    expected, actual
                )
            },
            Self::Io { kind } => write!(f, "i/o failure: {}", kind),
        }
    }
}

impl Error for RampartError {}

impl From<InvalidArgumentKind> for RampartError {
    fn from(kind: InvalidArgumentKind) -> Self {
        Self::InvalidArgument { kind }
    }
}

impl From<UnsupportedKind> for RampartError {
    fn from(kind: UnsupportedKind) -> Self {
        Self::Unsupported { kind }
    }
}

impl From<CorruptKind> for RampartError {
    fn from(kind: CorruptKind) -> Self {
        Self::Corrupt { kind }
    }
}
