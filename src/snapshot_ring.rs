//! Fixed-capacity per-frame snapshot storage.
//!
//! The same ring shape as [`crate::input_ring`], holding full
//! [`SimState`] values instead of inputs. Because `SimState` is a plain
//! `Copy` value, save and load are O(1) value copies with no aliasing: the
//! stored snapshot can never be corrupted by later mutation of the live
//! state, and a loaded snapshot is a fully independent starting point for
//! re-simulation.

use crate::error::InvalidArgumentKind;
use crate::sim::SimState;
use crate::{Frame, RampartError};

/// Circular per-frame store of simulation snapshots.
#[derive(Debug, Clone)]
pub struct SnapshotRing {
    /// Stored snapshots, indexed by `frame % capacity`. A slot's content is
    /// meaningful only while its tag matches.
    states: Vec<SimState>,
    /// Frame tag per slot; [`Frame::NULL`] marks a never-written slot.
    frames: Vec<Frame>,
    /// Highest frame saved since the last clear.
    latest: Option<Frame>,
}

impl SnapshotRing {
    /// Creates a ring holding `capacity` frames of state history.
    ///
    /// # Errors
    /// Returns [`RampartError::InvalidArgument`] if `capacity < 2`.
    pub fn new(capacity: usize) -> Result<Self, RampartError> {
        if capacity < 2 {
            return Err(InvalidArgumentKind::CapacityTooSmall { capacity }.into());
        }
        // The placeholder state in unwritten slots is never observable; any
        // valid value works.
        let placeholder = SimState::new(1)?;
        Ok(Self {
            states: vec![placeholder; capacity],
            frames: vec![Frame::NULL; capacity],
            latest: None,
        })
    }

    /// The ring capacity in frames.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.states.len()
    }

    /// The highest frame saved since the last clear, if any.
    #[inline]
    #[must_use]
    pub fn latest_frame(&self) -> Option<Frame> {
        self.latest
    }

    /// Archives a copy of `state` for `frame`, evicting whatever occupied
    /// the slot.
    pub fn save(&mut self, frame: Frame, state: &SimState) {
        if frame.is_null() {
            return;
        }
        let slot = frame.slot(self.capacity());
        self.states[slot] = *state;
        self.frames[slot] = frame;
        match self.latest {
            Some(latest) if frame < latest => {},
            _ => self.latest = Some(frame),
        }
    }

    /// Returns an independent copy of the snapshot for `frame`, if that
    /// exact frame still occupies its slot.
    #[inline]
    #[must_use]
    pub fn try_load(&self, frame: Frame) -> Option<SimState> {
        if frame.is_null() {
            return None;
        }
        let slot = frame.slot(self.capacity());
        if self.frames[slot] == frame {
            Some(self.states[slot])
        } else {
            None
        }
    }

    /// Resets every slot to never-written. Keeps the allocation.
    pub fn clear(&mut self) {
        self.frames.fill(Frame::NULL);
        self.latest = None;
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::sim::step;
    use crate::Input;

    fn state_at_frame(frame: u32) -> SimState {
        let mut state = SimState::new(1).unwrap();
        for _ in 0..frame {
            state = step(&state, Input::RIGHT, Input::LEFT);
        }
        state
    }

    #[test]
    fn capacity_below_two_is_rejected() {
        assert!(SnapshotRing::new(1).is_err());
        assert!(SnapshotRing::new(2).is_ok());
    }

    #[test]
    fn save_then_load_round_trips() {
        let mut ring = SnapshotRing::new(8).unwrap();
        let state = state_at_frame(3);
        ring.save(Frame::new(3), &state);
        assert_eq!(ring.try_load(Frame::new(3)), Some(state));
    }

    #[test]
    fn load_of_unwritten_frame_is_none() {
        let ring = SnapshotRing::new(8).unwrap();
        assert_eq!(ring.try_load(Frame::new(0)), None);
    }

    #[test]
    fn loaded_snapshot_is_independent_of_live_state() {
        let mut ring = SnapshotRing::new(8).unwrap();
        let mut live = state_at_frame(2);
        ring.save(Frame::new(2), &live);

        // Mutating the live state afterwards must not leak into the archive.
        live = step(&live, Input::ATTACK, Input::ATTACK);
        let archived = ring.try_load(Frame::new(2)).unwrap();
        assert_eq!(archived.frame, Frame::new(2));
        assert_ne!(archived, live);
    }

    #[test]
    fn slot_reuse_evicts_old_snapshot() {
        let mut ring = SnapshotRing::new(4).unwrap();
        ring.save(Frame::new(1), &state_at_frame(1));
        ring.save(Frame::new(5), &state_at_frame(5));
        assert_eq!(ring.try_load(Frame::new(1)), None);
        assert_eq!(
            ring.try_load(Frame::new(5)).unwrap().frame,
            Frame::new(5)
        );
    }

    #[test]
    fn latest_frame_tracks_highest_save() {
        let mut ring = SnapshotRing::new(8).unwrap();
        assert_eq!(ring.latest_frame(), None);
        ring.save(Frame::new(4), &state_at_frame(4));
        ring.save(Frame::new(2), &state_at_frame(2));
        assert_eq!(ring.latest_frame(), Some(Frame::new(4)));
        ring.save(Frame::new(7), &state_at_frame(7));
        assert_eq!(ring.latest_frame(), Some(Frame::new(7)));
    }

    #[test]
    fn resave_overwrites_in_place() {
        let mut ring = SnapshotRing::new(4).unwrap();
        ring.save(Frame::new(3), &state_at_frame(1));
        let corrected = state_at_frame(3);
        ring.save(Frame::new(3), &corrected);
        assert_eq!(ring.try_load(Frame::new(3)), Some(corrected));
    }

    #[test]
    fn clear_forgets_everything() {
        let mut ring = SnapshotRing::new(4).unwrap();
        ring.save(Frame::new(0), &state_at_frame(0));
        ring.clear();
        assert_eq!(ring.try_load(Frame::new(0)), None);
        assert_eq!(ring.latest_frame(), None);
    }
}
