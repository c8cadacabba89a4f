//! Common test infrastructure shared across integration tests.
//!
//! Provides the scripted two-player input sequence used by the determinism
//! and convergence suites, plus a ground-truth runner that folds the step
//! function over fully confirmed inputs.

// Each integration test binary compiles this module separately and not all
// of them use every helper.
#![allow(dead_code)]

use rampart_rollback::sim::step;
use rampart_rollback::{Input, SimState};

/// Player 1's scripted input for `frame`.
///
/// Walk right, hop once at frame 50, keep walking, throw periodic attacks
/// through the 150s, then retreat left forever.
#[must_use]
pub fn scripted_p1(frame: u32) -> Input {
    match frame {
        0..=49 => Input::RIGHT,
        50 => Input::JUMP,
        51..=149 => Input::RIGHT,
        150..=199 => {
            if frame % 20 == 0 {
                Input::ATTACK
            } else {
                Input::NEUTRAL
            }
        },
        _ => Input::LEFT,
    }
}

/// Player 2's scripted input for `frame`.
///
/// Advance left for 100 frames, jump for 20, then go idle.
#[must_use]
pub fn scripted_p2(frame: u32) -> Input {
    match frame {
        0..=99 => Input::LEFT,
        100..=119 => Input::JUMP,
        _ => Input::NEUTRAL,
    }
}

/// Runs the scripted match from `seed` for `frames` frames with fully
/// confirmed inputs: the reference every netcode path must converge to.
#[must_use]
pub fn scripted_ground_truth(seed: u32, frames: u32) -> SimState {
    let mut state = SimState::new(seed).expect("non-zero seed");
    for f in 0..frames {
        state = step(&state, scripted_p1(f), scripted_p2(f));
    }
    state
}
