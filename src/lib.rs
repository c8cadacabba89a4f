//! # Rampart Rollback
//!
//! Rampart Rollback is the core of a rollback-netcode engine for a
//! deterministic two-player real-time simulation, written in 100% safe Rust.
//! Both peers run an identical fixed-point simulation at 60 ticks per second;
//! each peer sees its own input immediately, predicts the opponent's, and
//! corrects the timeline (rewind + re-simulate) when confirmed remote input
//! contradicts a prediction.
//!
//! The crate deliberately stops at the core:
//!
//! - [`sim`]: the pure, fixed-point, bit-reproducible step function.
//! - [`RollbackEngine`]: input/snapshot history, prediction, rollback.
//! - [`replay`] and [`container`]: inputs-only replays and the RPLK v1
//!   CRC-checked on-disk format.
//! - [`network::packet`]: the RBN1 v1 wire packet with redundant input
//!   delivery and an optional state-hash attachment.
//!
//! Sockets, rendering, input polling, and session handshakes belong to the
//! caller. The core never reads a clock, never touches the filesystem on its
//! own, and never spawns a thread.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub use engine::{RollbackEngine, RollbackStats};
pub use error::{CorruptKind, InvalidArgumentKind, RampartError, UnsupportedKind};
pub use input::Input;
pub use replay::{Replay, ReplayRecorder};
pub use rng::XorShift32;
pub use sim::{ActionState, PlayerState, SimState};

pub mod checksum;
pub mod container;
/// CRC-32/IEEE implementation used by the replay container.
///
/// Hand-rolled (table-driven) rather than pulled in as a dependency; the
/// polynomial is pinned by the file format and must never drift.
pub mod crc32;
pub mod engine;
pub mod error;
pub mod input;
pub mod input_ring;
pub mod replay;
/// Internal random number generator module based on XorShift32.
///
/// The generator state is part of the simulation state and is hashed into the
/// state fingerprint, so the recurrence is pinned. See the module
/// documentation for details.
pub mod rng;
pub mod sim;
pub mod snapshot_ring;
/// Wire-facing modules.
pub mod network {
    pub mod packet;
}

// #############
// # CONSTANTS #
// #############

/// Internally, `u32::MAX` marks "no frame": a ring-buffer slot that has never
/// been written, or an empty buffer's latest-frame tracker.
///
/// At 60 Hz the counter would need roughly 828 days of continuous play to
/// reach this value, so it is reserved as a sentinel rather than handled as a
/// reachable frame.
pub const NULL_FRAME: u32 = u32::MAX;

/// A frame is a single step of game execution.
///
/// Frames are the fundamental unit of time in rollback networking. Each frame
/// represents one discrete step of the simulation; frame numbers start at 0
/// and increment sequentially. The special value [`Frame::NULL`]
/// ([`NULL_FRAME`]) represents "no frame" and doubles as the never-written
/// sentinel in the ring buffers.
///
/// # Examples
///
/// ```
/// use rampart_rollback::Frame;
///
/// let frame = Frame::new(0);
/// assert!(frame.is_valid());
/// assert!(Frame::NULL.is_null());
///
/// let next = frame + 1;
/// assert_eq!(next.as_u32(), 1);
/// assert!(next > frame);
/// ```
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    serde::Serialize,
    serde::Deserialize,
)]
pub struct Frame(u32);

impl Frame {
    /// The null frame constant, equivalent to [`NULL_FRAME`].
    pub const NULL: Frame = Frame(NULL_FRAME);

    /// Frame zero, the start of every session and replay.
    pub const ZERO: Frame = Frame(0);

    /// Creates a new `Frame` from a `u32` value.
    #[inline]
    #[must_use]
    pub const fn new(frame: u32) -> Self {
        Frame(frame)
    }

    /// Returns the underlying `u32` value.
    #[inline]
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    /// Returns `true` if this frame is the null/sentinel frame.
    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == NULL_FRAME
    }

    /// Returns `true` if this frame is a real (non-sentinel) frame number.
    #[inline]
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != NULL_FRAME
    }

    /// Returns the ring-buffer slot for this frame given a buffer capacity.
    #[inline]
    #[must_use]
    pub const fn slot(self, capacity: usize) -> usize {
        self.0 as usize % capacity
    }

    /// Subtracts `rhs` frames, saturating at frame 0.
    #[inline]
    #[must_use]
    pub const fn saturating_sub(self, rhs: u32) -> Frame {
        Frame(self.0.saturating_sub(rhs))
    }
}

impl std::fmt::Display for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_null() {
            write!(f, "NULL_FRAME")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl std::ops::Add<u32> for Frame {
    type Output = Frame;

    #[inline]
    fn add(self, rhs: u32) -> Self::Output {
        Frame(self.0 + rhs)
    }
}

impl std::ops::AddAssign<u32> for Frame {
    #[inline]
    fn add_assign(&mut self, rhs: u32) {
        self.0 += rhs;
    }
}

impl std::ops::Sub<Frame> for Frame {
    type Output = u32;

    /// Distance in frames. The left-hand side must not precede the right-hand
    /// side; the engine only ever measures `end - start` of a rollback span.
    #[inline]
    fn sub(self, rhs: Frame) -> Self::Output {
        self.0 - rhs.0
    }
}

impl From<u32> for Frame {
    #[inline]
    fn from(value: u32) -> Self {
        Frame(value)
    }
}

impl From<Frame> for u32 {
    #[inline]
    fn from(frame: Frame) -> Self {
        frame.0
    }
}

impl PartialEq<u32> for Frame {
    #[inline]
    fn eq(&self, other: &u32) -> bool {
        self.0 == *other
    }
}

impl PartialOrd<u32> for Frame {
    #[inline]
    fn partial_cmp(&self, other: &u32) -> Option<std::cmp::Ordering> {
        self.0.partial_cmp(other)
    }
}

// #############
// #   ENUMS   #
// #############

/// Which of the two players this peer controls locally.
///
/// The engine stores the local side at construction and uses it to map
/// `(local, remote)` inputs onto `(p1, p2)` before stepping. Because the type
/// is an enum, an out-of-range role is unrepresentable in safe code; callers
/// holding a raw role byte (e.g. from a handshake message) can use the
/// fallible [`TryFrom<u8>`] conversion instead.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum PlayerSide {
    /// This peer controls player 1.
    P1,
    /// This peer controls player 2.
    P2,
}

impl PlayerSide {
    /// The opposing side.
    #[inline]
    #[must_use]
    pub const fn opponent(self) -> PlayerSide {
        match self {
            PlayerSide::P1 => PlayerSide::P2,
            PlayerSide::P2 => PlayerSide::P1,
        }
    }
}

impl std::fmt::Display for PlayerSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlayerSide::P1 => write!(f, "P1"),
            PlayerSide::P2 => write!(f, "P2"),
        }
    }
}

impl TryFrom<u8> for PlayerSide {
    type Error = RampartError;

    /// Converts a raw role byte (0 = P1, 1 = P2) into a [`PlayerSide`].
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(PlayerSide::P1),
            1 => Ok(PlayerSide::P2),
            other => Err(RampartError::InvalidArgument {
                kind: InvalidArgumentKind::InvalidPlayerSide { value: other },
            }),
        }
    }
}

// #########
// # TESTS #
// #########
