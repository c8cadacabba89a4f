//! Internal random number generator implementation based on XorShift32.
//!
//! The generator is part of the simulation state: it is copied with every
//! snapshot, restored on rollback, and mixed into the state fingerprint. That
//! rules out any external RNG crate whose algorithm could change under us;
//! the recurrence here is pinned forever.
//!
//! # XorShift32 Algorithm
//!
//! Marsaglia's 32-bit xorshift generator:
//!
//! ```text
//! x ^= x << 13;
//! x ^= x >> 17;
//! x ^= x << 5;
//! ```
//!
//! - 32 bits of state, 32-bit output
//! - Period 2³² − 1 over the non-zero states
//! - Zero is the absorbing state and is rejected at construction
//!
//! Bounded draws use Lemire's multiply-high reduction, which is branch-free
//! and avoids the modulo bias of naive `% bound`.
//!
//! # Usage
//!
//! ```
//! use rampart_rollback::rng::XorShift32;
//!
//! let mut rng = XorShift32::new(1).expect("non-zero seed");
//! let word = rng.next_u32();
//! let roll = rng.next_bounded(6).expect("non-zero bound");
//! assert!(roll < 6);
//! ```

use crate::error::InvalidArgumentKind;
use crate::RampartError;

/// XorShift32 random number generator with a single non-zero word of state.
///
/// Deterministic and `Copy`: snapshotting a [`crate::SimState`] snapshots the
/// generator with it. NOT cryptographically secure, which is fine for
/// simulation randomness.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct XorShift32 {
    state: u32,
}

impl XorShift32 {
    /// Creates a new generator from a non-zero seed.
    ///
    /// # Errors
    /// Returns [`RampartError::InvalidArgument`] if `seed` is zero, the
    /// absorbing state of the recurrence.
    pub fn new(seed: u32) -> Result<Self, RampartError> {
        if seed == 0 {
            return Err(InvalidArgumentKind::ZeroSeed.into());
        }
        Ok(Self { state: seed })
    }

    /// Returns the current raw state word. Never zero.
    #[inline]
    #[must_use]
    pub const fn state(&self) -> u32 {
        self.state
    }

    /// Advances the generator and returns the next 32-bit value.
    #[inline]
    pub fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// Returns a uniform value in `[0, bound)` using Lemire's multiply-high
    /// reduction.
    ///
    /// # Errors
    /// Returns [`RampartError::InvalidArgument`] if `bound` is zero.
    #[inline]
    pub fn next_bounded(&mut self, bound: u32) -> Result<u32, RampartError> {
        if bound == 0 {
            return Err(InvalidArgumentKind::ZeroUpperBound.into());
        }
        let word = u64::from(self.next_u32());
        Ok(((word * u64::from(bound)) >> 32) as u32)
    }

    /// Returns a uniform value in `[min, max)` via offset + bounded draw.
    ///
    /// # Errors
    /// Returns [`RampartError::InvalidArgument`] if `max <= min`.
    #[inline]
    pub fn next_int(&mut self, min: i32, max: i32) -> Result<i32, RampartError> {
        if max <= min {
            return Err(InvalidArgumentKind::EmptyIntRange { min, max }.into());
        }
        let span = (i64::from(max) - i64::from(min)) as u32;
        let offset = self.next_bounded(span)?;
        Ok((i64::from(min) + i64::from(offset)) as i32)
    }
}


// =============================================================================
// Property-Based Tests
// =============================================================================
