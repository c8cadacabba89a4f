//! Fixed-capacity per-frame input storage with prediction.
//!
//! `InputRing` keeps the last `capacity` frames of one player's inputs in a
//! circular buffer. Instead of a parallel `bool[]` occupancy array, each slot
//! carries the frame number it holds, with [`crate::Frame::NULL`] marking
//! "never written": half the auxiliary memory and one branch fewer per
//! lookup. A slot is overwritten in place whenever its index recurs modulo
//! the capacity; the overwritten frame is thereby evicted.
//!
//! When a remote input has not arrived, [`InputRing::get_or_predict`]
//! repeats the most recent known input (neutral if nothing is known). The
//! rollback engine writes that prediction back into the ring so a later
//! confirmed input has something to compare against; without the write-back,
//! mispredictions would be undetectable.

use crate::error::InvalidArgumentKind;
use crate::{Frame, Input, RampartError};

/// Circular per-frame input store for a single player.
///
/// All operations are allocation-free after construction; the worst case of a
/// prediction lookup is one backwards scan bounded by the capacity.
#[derive(Debug, Clone)]
pub struct InputRing {
    /// Stored inputs, indexed by `frame % capacity`.
    inputs: Vec<Input>,
    /// Frame tag per slot; [`Frame::NULL`] marks a never-written slot.
    frames: Vec<Frame>,
    /// Highest frame ever stored, together with its input. Never displaced
    /// by sets of older frames.
    latest: Option<(Frame, Input)>,
}

impl InputRing {
    /// Creates a ring holding `capacity` frames of input history.
    ///
    /// # Errors
    /// Returns [`RampartError::InvalidArgument`] if `capacity < 2`.
    pub fn new(capacity: usize) -> Result<Self, RampartError> {
        if capacity < 2 {
            return Err(InvalidArgumentKind::CapacityTooSmall { capacity }.into());
        }
        Ok(Self {
            inputs: vec![Input::NEUTRAL; capacity],
            frames: vec![Frame::NULL; capacity],
            latest: None,
        })
    }

    /// The ring capacity in frames.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.inputs.len()
    }

    /// The highest frame ever stored since the last clear, if any.
    #[inline]
    #[must_use]
    pub fn latest_frame(&self) -> Option<Frame> {
        self.latest.map(|(frame, _)| frame)
    }

    /// Stores `input` for `frame`, overwriting whatever occupied the slot.
    ///
    /// Advances the latest-known tracker only for frames at or beyond it;
    /// storing an older frame (late or re-ordered arrival) never moves the
    /// tracker backwards.
    pub fn set(&mut self, frame: Frame, input: Input) {
        if frame.is_null() {
            return;
        }
        let slot = frame.slot(self.capacity());
        self.inputs[slot] = input;
        self.frames[slot] = frame;
        match self.latest {
            Some((latest, _)) if frame < latest => {},
            _ => self.latest = Some((frame, input)),
        }
    }

    /// Returns the stored input for `frame` iff that exact frame still
    /// occupies its slot.
    #[inline]
    #[must_use]
    pub fn try_get(&self, frame: Frame) -> Option<Input> {
        if frame.is_null() {
            return None;
        }
        let slot = frame.slot(self.capacity());
        if self.frames[slot] == frame {
            Some(self.inputs[slot])
        } else {
            None
        }
    }

    /// Returns the input for `frame`, predicting when it is unknown.
    ///
    /// Resolution order:
    ///
    /// 1. exact hit: the stored value;
    /// 2. empty ring: neutral;
    /// 3. `frame` beyond the latest-known frame: the latest-known input,
    ///    unchanged (repeat-last prediction);
    /// 4. otherwise: the nearest stored input searching backwards from
    ///    `frame - 1` within the history window;
    /// 5. nothing found: neutral.
    ///
    /// Zero allocations; worst case one scan over the capacity.
    #[must_use]
    pub fn get_or_predict(&self, frame: Frame) -> Input {
        if let Some(input) = self.try_get(frame) {
            return input;
        }
        let Some((latest_frame, latest_input)) = self.latest else {
            return Input::NEUTRAL;
        };
        if frame > latest_frame {
            return latest_input;
        }
        // Backwards scan from frame - 1 to the oldest frame the window can
        // still hold. saturating_sub keeps frame 0 from underflowing.
        let low = frame.saturating_sub(self.capacity() as u32 - 1);
        let mut candidate = frame;
        while candidate > low {
            candidate = candidate.saturating_sub(1);
            if let Some(input) = self.try_get(candidate) {
                return input;
            }
        }
        Input::NEUTRAL
    }

    /// Resets every slot to never-written. Keeps the allocation.
    pub fn clear(&mut self) {
        self.frames.fill(Frame::NULL);
        self.latest = None;
    }
}


// =============================================================================
// Property-Based Tests
// =============================================================================
