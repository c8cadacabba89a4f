//! Deterministic state fingerprints.
//!
//! Peers exchange state checksums to detect desynchronisation, golden tests
//! pin them across releases, and replays can be verified against them. All of
//! that requires a hash that is identical across processes, platforms, and
//! compilers. That is why the hash walks the state **field by field** in a
//! documented order instead of hashing the in-memory representation. Padding
//! bytes, alignment and field reordering are implementation details; hashing
//! them would silently break every pinned checksum.
//!
//! # Algorithm
//!
//! FNV-1a, 32-bit: offset basis `2166136261`, prime `16777619`. Each logical
//! field is widened to one `u32` word and mixed as a unit:
//!
//! ```text
//! hash = (hash ^ word) * FNV_PRIME     (wrapping)
//! ```
//!
//! Signed fields are reinterpreted bitwise (`i32 as u32`); the action state
//! and the has-hit flag are single bytes zero-extended to 32 bits. Changing
//! any width changes every fingerprint, so the widths are part of the
//! contract.
//!
//! # Field order
//!
//! 1. frame counter
//! 2. player 1: `x`, `y`, `vx`, `vy`, `facing`, `action`, `hitstun_frames`,
//!    `hp`, `attack_cooldown_frames`, `attack_active_frames`,
//!    `attack_has_hit`
//! 3. player 2: same fields, same order
//! 4. PRNG state
//!
//! FNV-1a is not cryptographically secure; for desync detection between
//! cooperating peers that is fine.

use crate::sim::{PlayerState, SimState};

/// FNV-1a 32-bit offset basis.
pub const FNV_OFFSET_BASIS: u32 = 2_166_136_261;

/// FNV-1a 32-bit prime.
pub const FNV_PRIME: u32 = 16_777_619;

/// Mixes one 32-bit word into the running hash.
#[inline]
const fn mix(hash: u32, word: u32) -> u32 {
    (hash ^ word).wrapping_mul(FNV_PRIME)
}

/// Mixes one player's fields in declaration order.
const fn mix_player(mut hash: u32, player: &PlayerState) -> u32 {
    hash = mix(hash, player.x as u32);
    hash = mix(hash, player.y as u32);
    hash = mix(hash, player.vx as u32);
    hash = mix(hash, player.vy as u32);
    hash = mix(hash, player.facing as u32);
    hash = mix(hash, player.action.as_u8() as u32);
    hash = mix(hash, player.hitstun_frames as u32);
    hash = mix(hash, player.hp as u32);
    hash = mix(hash, player.attack_cooldown_frames as u32);
    hash = mix(hash, player.attack_active_frames as u32);
    hash = mix(hash, player.attack_has_hit as u32);
    hash
}

/// Computes the 32-bit fingerprint of a simulation state.
///
/// Two states compare equal if and only if they were produced by identical
/// histories, so matching fingerprints across peers is the determinism check.
/// The value is carried opaquely by the wire codec's checksum attachment.
///
/// # Examples
///
/// ```
/// use rampart_rollback::{checksum::state_hash, SimState};
///
/// let state = SimState::new(1).expect("non-zero seed");
/// assert_eq!(state_hash(&state), state_hash(&state.clone()));
/// ```
#[must_use]
pub fn state_hash(state: &SimState) -> u32 {
    let mut hash = FNV_OFFSET_BASIS;
    hash = mix(hash, state.frame.as_u32());
    hash = mix_player(hash, &state.p1);
    hash = mix_player(hash, &state.p2);
    hash = mix(hash, state.rng.state());
    hash
}
