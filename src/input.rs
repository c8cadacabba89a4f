//! Per-frame player input: a 16-bit button mask.
//!
//! This is the only game-related data that crosses the network. Four bits are
//! defined; the remaining twelve are reserved zero, and the step function
//! never inspects them, so stray bits in a received mask have no effect on
//! the simulation.

use std::fmt;

/// A 16-bit button mask carrying one player's input for one frame.
///
/// Defined bits: [`Input::LEFT`], [`Input::RIGHT`], [`Input::JUMP`],
/// [`Input::ATTACK`]. Remaining bits are reserved zero.
///
/// # Examples
///
/// ```
/// use rampart_rollback::Input;
///
/// let input = Input::RIGHT | Input::JUMP;
/// assert!(input.right());
/// assert!(input.jump());
/// assert!(!input.attack());
/// assert_eq!(Input::NEUTRAL.bits(), 0);
/// ```
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
pub struct Input(u16);

impl Input {
    /// No buttons pressed. This is also the prediction fallback when a peer
    /// has never sent any input.
    pub const NEUTRAL: Input = Input(0);
    /// Move left.
    pub const LEFT: Input = Input(0x1);
    /// Move right.
    pub const RIGHT: Input = Input(0x2);
    /// Jump.
    pub const JUMP: Input = Input(0x4);
    /// Attack.
    pub const ATTACK: Input = Input(0x8);

    /// Mask of all defined button bits.
    pub const BUTTON_MASK: u16 = 0x000F;

    /// Creates an input from a raw 16-bit mask. Undefined bits are kept as-is
    /// (they round-trip through the codecs) but never affect the simulation.
    #[inline]
    #[must_use]
    pub const fn from_bits(bits: u16) -> Self {
        Input(bits)
    }

    /// Returns the raw 16-bit mask.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// Whether the left button is held.
    #[inline]
    #[must_use]
    pub const fn left(self) -> bool {
        self.0 & Self::LEFT.0 != 0
    }

    /// Whether the right button is held.
    #[inline]
    #[must_use]
    pub const fn right(self) -> bool {
        self.0 & Self::RIGHT.0 != 0
    }

    /// Whether the jump button is held.
    #[inline]
    #[must_use]
    pub const fn jump(self) -> bool {
        self.0 & Self::JUMP.0 != 0
    }

    /// Whether the attack button is held.
    #[inline]
    #[must_use]
    pub const fn attack(self) -> bool {
        self.0 & Self::ATTACK.0 != 0
    }
}

impl std::ops::BitOr for Input {
    type Output = Input;

    #[inline]
    fn bitor(self, rhs: Input) -> Input {
        Input(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for Input {
    #[inline]
    fn bitor_assign(&mut self, rhs: Input) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 0 {
            return write!(f, "neutral");
        }
        let mut sep = "";
        for (bit, name) in [
            (Self::LEFT, "left"),
            (Self::RIGHT, "right"),
            (Self::JUMP, "jump"),
            (Self::ATTACK, "attack"),
        ] {
            if self.0 & bit.0 != 0 {
                write!(f, "{sep}{name}")?;
                sep = "+";
            }
        }
        if self.0 & !Self::BUTTON_MASK != 0 {
            write!(f, "{sep}reserved({:#06x})", self.0 & !Self::BUTTON_MASK)?;
        }
        Ok(())
    }
}
