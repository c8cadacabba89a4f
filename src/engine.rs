//! The rollback engine: history, prediction, mismatch detection, rewind.
//!
//! One engine instance drives one peer's timeline. Every call to
//! [`RollbackEngine::tick`] advances exactly one frame, recording the local
//! input, resolving (or predicting) the remote input, archiving a snapshot,
//! and stepping the simulation. Confirmed remote inputs arrive asynchronously
//! through [`RollbackEngine::set_remote_input`] (possibly late, reordered,
//! or duplicated) and trigger at most one rollback per observed mismatch:
//! the engine restores the snapshot of the mispredicted frame, substitutes
//! the confirmed input, and re-simulates forward to where it was.
//!
//! After any sequence of ticks and remote-input deliveries, the engine's
//! state is identical to a straight-line run over the fully confirmed
//! inputs; that convergence is what the integration tests pin down.
//!
//! The engine is single-threaded and allocation-free after construction. It
//! emits `tracing` diagnostics on rollbacks; they are informational only and
//! never influence control flow.

use tracing::{debug, trace, warn};

use crate::input_ring::InputRing;
use crate::sim::{step, SimState};
use crate::snapshot_ring::SnapshotRing;
use crate::{Frame, Input, PlayerSide, RampartError};

/// Informational rollback counters.
///
/// Never consulted by the engine itself; exposed for HUDs, telemetry and
/// tests.
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Default,
    serde::Serialize,
    serde::Deserialize,
)]
pub struct RollbackStats {
    /// Number of rollbacks performed.
    pub rollback_count: u64,
    /// Total frames re-simulated across all rollbacks.
    pub rollback_frames_total: u64,
    /// Deepest single rollback observed, in frames.
    pub max_rollback_depth: u32,
}

/// Drives one peer's simulation timeline with prediction and rollback.
///
/// # Examples
///
/// ```
/// use rampart_rollback::{Frame, Input, PlayerSide, RollbackEngine, SimState};
///
/// let initial = SimState::new(1)?;
/// let mut engine = RollbackEngine::new(initial, 64, PlayerSide::P1)?;
///
/// // Advance a few frames on local input alone (remote is predicted)...
/// for _ in 0..3 {
///     engine.tick(Input::RIGHT);
/// }
///
/// // ...then a confirmed remote input arrives for frame 0. If it differs
/// // from the prediction, the engine rewinds and re-simulates internally.
/// engine.set_remote_input(Frame::new(0), Input::LEFT)?;
/// assert_eq!(engine.current_frame(), Frame::new(3));
/// # Ok::<(), rampart_rollback::RampartError>(())
/// ```
#[derive(Debug)]
pub struct RollbackEngine {
    state: SimState,
    local_inputs: InputRing,
    remote_inputs: InputRing,
    snapshots: SnapshotRing,
    local_side: PlayerSide,
    stats: RollbackStats,
}

impl RollbackEngine {
    /// Creates an engine over `initial` state with `history_capacity` frames
    /// of input and snapshot history, controlling `local_side` locally.
    ///
    /// The history capacity bounds how late a remote input may arrive and
    /// still be correctable; beyond it, rollback fails with
    /// [`RampartError::InsufficientHistory`].
    ///
    /// # Errors
    /// Returns [`RampartError::InvalidArgument`] if `history_capacity < 2`.
    pub fn new(
        initial: SimState,
        history_capacity: usize,
        local_side: PlayerSide,
    ) -> Result<Self, RampartError> {
        Ok(Self {
            state: initial,
            local_inputs: InputRing::new(history_capacity)?,
            remote_inputs: InputRing::new(history_capacity)?,
            snapshots: SnapshotRing::new(history_capacity)?,
            local_side,
            stats: RollbackStats::default(),
        })
    }

    /// The frame the engine is about to simulate.
    #[inline]
    #[must_use]
    pub fn current_frame(&self) -> Frame {
        self.state.frame
    }

    /// The current simulation state.
    #[inline]
    #[must_use]
    pub fn current_state(&self) -> &SimState {
        &self.state
    }

    /// The side this peer controls.
    #[inline]
    #[must_use]
    pub fn local_side(&self) -> PlayerSide {
        self.local_side
    }

    /// The configured history capacity in frames.
    #[inline]
    #[must_use]
    pub fn history_capacity(&self) -> usize {
        self.snapshots.capacity()
    }

    /// Rollback counters accumulated so far.
    #[inline]
    #[must_use]
    pub fn stats(&self) -> RollbackStats {
        self.stats
    }

    /// Advances the simulation by one frame using this frame's confirmed
    /// local input and the best available remote input.
    ///
    /// If the remote input for the current frame has not arrived, a
    /// prediction (repeat of the last known remote input) is used **and
    /// written back** into the remote ring. The write-back is load-bearing:
    /// it is the value a later confirmed input gets compared against, and
    /// without it mispredictions could never be detected.
    pub fn tick(&mut self, local_input: Input) {
        let frame = self.state.frame;

        self.local_inputs.set(frame, local_input);

        let remote_input = match self.remote_inputs.try_get(frame) {
            Some(confirmed) => confirmed,
            None => {
                let predicted = self.remote_inputs.get_or_predict(frame);
                self.remote_inputs.set(frame, predicted);
                predicted
            },
        };

        self.snapshots.save(frame, &self.state);

        let (p1_input, p2_input) = self.map_inputs(local_input, remote_input);
        self.state = step(&self.state, p1_input, p2_input);

        trace!(
            frame = frame.as_u32(),
            %local_input,
            %remote_input,
            "ticked"
        );
    }

    /// Records a confirmed remote input for `frame`, rolling back if it
    /// contradicts a stored (usually predicted) value for a past frame.
    ///
    /// Arrival order does not matter; duplicates (bit-identical re-delivery)
    /// are no-ops. A confirmed input for a frame whose slot was never written
    /// or already evicted is stored without a rollback: with the old value
    /// gone there is no mismatch to detect.
    ///
    /// # Errors
    /// Propagates [`RampartError::InsufficientHistory`] or
    /// [`RampartError::MissingLocalInput`] from a triggered rollback.
    pub fn set_remote_input(
        &mut self,
        frame: Frame,
        input: Input,
    ) -> Result<(), RampartError> {
        if frame.is_null() {
            return Ok(());
        }
        match self.remote_inputs.try_get(frame) {
            Some(existing) if existing == input => Ok(()),
            Some(existing) => {
                self.remote_inputs.set(frame, input);
                if frame < self.state.frame {
                    debug!(
                        frame = frame.as_u32(),
                        predicted = %existing,
                        confirmed = %input,
                        "misprediction detected"
                    );
                    self.rollback_to(frame)?;
                }
                Ok(())
            },
            None => {
                let age = self.state.frame.as_u32().saturating_sub(frame.as_u32());
                if age > self.history_capacity() as u32 {
                    // Older than anything the history can still correct.
                    // Stored for the record, but the session has already
                    // diverged if the prediction was wrong.
                    warn!(
                        frame = frame.as_u32(),
                        current = self.state.frame.as_u32(),
                        capacity = self.history_capacity(),
                        "remote input arrived beyond the history window"
                    );
                }
                self.remote_inputs.set(frame, input);
                Ok(())
            },
        }
    }

    /// Rewinds to `frame` and re-simulates forward to the previous head.
    ///
    /// Corrected snapshots overwrite the originals along the way, making the
    /// corrected timeline canonical for any further rollbacks.
    fn rollback_to(&mut self, frame: Frame) -> Result<(), RampartError> {
        let end = self.state.frame;

        let Some(snapshot) = self.snapshots.try_load(frame) else {
            return Err(RampartError::InsufficientHistory {
                frame,
                capacity: self.history_capacity(),
            });
        };

        let depth = end - frame;
        self.stats.rollback_count += 1;
        self.stats.rollback_frames_total += u64::from(depth);
        self.stats.max_rollback_depth = self.stats.max_rollback_depth.max(depth);

        debug!(
            from = end.as_u32(),
            to = frame.as_u32(),
            depth,
            "rolling back"
        );

        self.state = snapshot;

        for f in frame.as_u32()..end.as_u32() {
            let f = Frame::new(f);

            // The local input was recorded by the original tick; its absence
            // means the engine itself is broken, not the network.
            let Some(local_input) = self.local_inputs.try_get(f) else {
                return Err(RampartError::MissingLocalInput { frame: f });
            };

            let remote_input = match self.remote_inputs.try_get(f) {
                Some(confirmed) => confirmed,
                None => {
                    let predicted = self.remote_inputs.get_or_predict(f);
                    self.remote_inputs.set(f, predicted);
                    predicted
                },
            };

            self.snapshots.save(f, &self.state);

            let (p1_input, p2_input) = self.map_inputs(local_input, remote_input);
            self.state = step(&self.state, p1_input, p2_input);
        }

        Ok(())
    }

    /// Maps `(local, remote)` inputs to `(p1, p2)` according to the local
    /// side.
    #[inline]
    fn map_inputs(&self, local: Input, remote: Input) -> (Input, Input) {
        match self.local_side {
            PlayerSide::P1 => (local, remote),
            PlayerSide::P2 => (remote, local),
        }
    }
}
