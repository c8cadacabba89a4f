//! Inputs-only session recording and deterministic playback.
//!
//! A replay is nothing but a seed, a start frame, and the sequence of input
//! pairs; the simulation's determinism reconstructs everything else. Two
//! playbacks of the same replay produce bit-identical final states on any
//! machine, which is what makes replays usable as cross-platform regression
//! fixtures and desync post-mortems.
//!
//! [`ReplayRecorder`] accumulates pairs during a session; [`Replay`] is the
//! immutable result; [`play`] folds the step function over the inputs. The
//! on-disk form lives in [`crate::container`].

use crate::checksum::state_hash;
use crate::error::{InvalidArgumentKind, UnsupportedKind};
use crate::sim::{step, SimState};
use crate::{Frame, Input, RampartError};

/// One frame's pair of inputs, player 1 first.
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Default,
    serde::Serialize,
    serde::Deserialize,
)]
pub struct InputPair {
    /// Player 1's input.
    pub p1: Input,
    /// Player 2's input.
    pub p2: Input,
}

impl InputPair {
    /// Creates a pair from both players' inputs.
    #[inline]
    #[must_use]
    pub const fn new(p1: Input, p2: Input) -> Self {
        Self { p1, p2 }
    }
}

/// An immutable, playable recording of a session.
///
/// Constructed by [`ReplayRecorder::build`] or read back from an RPLK
/// container by [`crate::container::read_replay`].
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Replay {
    seed: u32,
    start_frame: Frame,
    inputs: Vec<InputPair>,
}

impl Replay {
    /// Creates a replay value from its parts.
    ///
    /// # Errors
    /// Returns [`RampartError::InvalidArgument`] if `seed` is zero.
    pub fn new(
        seed: u32,
        start_frame: Frame,
        inputs: Vec<InputPair>,
    ) -> Result<Self, RampartError> {
        if seed == 0 {
            return Err(InvalidArgumentKind::ZeroSeed.into());
        }
        Ok(Self {
            seed,
            start_frame,
            inputs,
        })
    }

    /// The PRNG seed the session started from. Never zero.
    #[inline]
    #[must_use]
    pub const fn seed(&self) -> u32 {
        self.seed
    }

    /// The frame the recording starts at. Always 0 for replays produced by
    /// [`ReplayRecorder`].
    #[inline]
    #[must_use]
    pub const fn start_frame(&self) -> Frame {
        self.start_frame
    }

    /// The recorded input pairs, one per frame.
    #[inline]
    #[must_use]
    pub fn inputs(&self) -> &[InputPair] {
        &self.inputs
    }

    /// Number of recorded frames.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    /// Whether the replay holds no frames at all.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }
}

/// Stateful builder that records a session's inputs frame by frame.
///
/// The recorder stays usable after [`build`](Self::build); a long session can
/// be snapshotted into replays periodically while recording continues.
///
/// # Examples
///
/// ```
/// use rampart_rollback::{Input, ReplayRecorder};
/// use rampart_rollback::replay::play;
///
/// let mut recorder = ReplayRecorder::new(7)?;
/// recorder.append(Input::RIGHT, Input::LEFT);
/// recorder.append(Input::JUMP, Input::NEUTRAL);
///
/// let replay = recorder.build();
/// assert_eq!(replay.len(), 2);
/// let final_state = play(&replay)?;
/// assert_eq!(final_state.frame.as_u32(), 2);
/// # Ok::<(), rampart_rollback::RampartError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ReplayRecorder {
    seed: u32,
    inputs: Vec<InputPair>,
}

impl ReplayRecorder {
    /// Creates a recorder for a session seeded with `seed`, starting at
    /// frame 0.
    ///
    /// # Errors
    /// Returns [`RampartError::InvalidArgument`] if `seed` is zero.
    pub fn new(seed: u32) -> Result<Self, RampartError> {
        if seed == 0 {
            return Err(InvalidArgumentKind::ZeroSeed.into());
        }
        Ok(Self {
            seed,
            inputs: Vec::new(),
        })
    }

    /// Appends one frame's confirmed input pair.
    pub fn append(&mut self, p1: Input, p2: Input) {
        self.inputs.push(InputPair::new(p1, p2));
    }

    /// Number of frames recorded so far.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    /// Whether nothing has been recorded yet.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    /// Produces an immutable replay of everything recorded so far. The
    /// recorder keeps its contents and remains usable.
    #[must_use]
    pub fn build(&self) -> Replay {
        Replay {
            seed: self.seed,
            start_frame: Frame::ZERO,
            inputs: self.inputs.clone(),
        }
    }
}

/// Plays a replay to completion and returns the final simulation state.
///
/// Stateless: creates the initial state from the replay's seed and folds
/// [`step`] over the recorded inputs in order.
///
/// # Errors
/// Returns [`RampartError::Unsupported`] for a non-zero start frame
/// (mid-session replays would need a state snapshot to resume from).
pub fn play(replay: &Replay) -> Result<SimState, RampartError> {
    if replay.start_frame() != Frame::ZERO {
        return Err(UnsupportedKind::NonZeroStartFrame {
            start_frame: replay.start_frame(),
        }
        .into());
    }
    let mut state = SimState::new(replay.seed())?;
    for pair in replay.inputs() {
        state = step(&state, pair.p1, pair.p2);
    }
    Ok(state)
}

/// Plays a replay and returns the fingerprint of its final state.
///
/// Convenience for regression fixtures that pin a checksum instead of a full
/// state dump.
///
/// # Errors
/// Same conditions as [`play`].
pub fn play_and_checksum(replay: &Replay) -> Result<u32, RampartError> {
    Ok(state_hash(&play(replay)?))
}
