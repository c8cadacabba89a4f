//! The deterministic fixed-point simulation.
//!
//! Everything in this module is integer arithmetic on a plain value type.
//! There is no floating point, no clock, no allocator and no environment
//! access anywhere below this line: the same state and inputs produce the
//! same successor state on every machine, compiler, and optimisation level.
//! That property is what makes rollback, replays, and cross-peer desync
//! detection possible at all.
//!
//! Positions, velocities and distances are integers scaled by [`FS`]: one
//! world unit equals `FS` fixed units. The per-tick transition is
//! [`step`], a pure function `(state, p1_input, p2_input) -> state`.

use crate::rng::XorShift32;
use crate::{Frame, Input, RampartError};

// #############
// # CONSTANTS #
// #############

/// Fixed-point scale: one world unit in fixed units.
pub const FS: i32 = 1000;

/// Simulation rate in ticks per second.
pub const TICKS_PER_SECOND: u32 = 60;

/// Left arena bound in fixed units.
pub const MIN_X: i32 = 0;
/// Right arena bound in fixed units.
pub const MAX_X: i32 = 20_000;
/// Floor height in fixed units.
pub const GROUND_Y: i32 = 0;

/// Player AABB width in fixed units.
pub const PLAYER_WIDTH: i32 = 600;
/// Player AABB height in fixed units.
pub const PLAYER_HEIGHT: i32 = 900;

/// Player 1 spawn X in fixed units.
pub const P1_START_X: i32 = 4_000;
/// Player 2 spawn X in fixed units.
pub const P2_START_X: i32 = 16_000;
/// Spawn Y in fixed units.
pub const START_Y: i32 = 0;

/// Horizontal distance covered per tick of held movement.
pub const MOVE_SPEED_PER_TICK: i32 = 300;
/// Per-tick change to vertical velocity.
pub const GRAVITY_PER_TICK: i32 = -40;
/// Initial upward velocity of a jump.
pub const JUMP_VELOCITY_PER_TICK: i32 = 500;

/// Attack hitbox width in fixed units.
pub const ATTACK_HITBOX_WIDTH: i32 = 700;
/// Attack hitbox height in fixed units.
pub const ATTACK_HITBOX_HEIGHT: i32 = 700;
/// Number of frames the attack hitbox stays open.
pub const ATTACK_ACTIVE_FRAMES: i32 = 5;
/// Minimum number of frames between attack starts. The active window always
/// closes before the cooldown does.
pub const ATTACK_COOLDOWN_FRAMES: i32 = 30;
/// HP removed by a landed attack.
pub const ATTACK_DAMAGE: i32 = 25;
/// Number of frames a hit defender is locked out.
pub const HITSTUN_FRAMES: i32 = 20;
/// Starting HP.
pub const DEFAULT_HP: i32 = 100;

// #########
// # TYPES #
// #########

/// What a player is currently doing.
///
/// Stored as a single byte; the discriminants are pinned because the value is
/// zero-extended into the state fingerprint.
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
#[repr(u8)]
pub enum ActionState {
    /// Standing still.
    #[default]
    Idle = 0,
    /// Moving horizontally on the ground.
    Run = 1,
    /// Airborne from a jump.
    Jump = 2,
    /// Attack window open or recovering.
    Attack = 3,
    /// Locked out after being hit.
    Hitstun = 4,
}

impl ActionState {
    /// The pinned byte value of this action, as mixed into the state hash.
    #[inline]
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

/// The full state of one player.
///
/// A plain `Copy` value. Fields are public for rendering and HUD consumers;
/// states produced by [`SimState::new`] and [`step`] always satisfy the
/// simulation invariants (position inside the arena, `hp` in
/// `[0, DEFAULT_HP]`, non-negative counters).
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct PlayerState {
    /// Horizontal position of the left edge, fixed units.
    pub x: i32,
    /// Vertical position of the bottom edge, fixed units. `GROUND_Y` when
    /// grounded.
    pub y: i32,
    /// Horizontal velocity, fixed units per tick.
    pub vx: i32,
    /// Vertical velocity, fixed units per tick.
    pub vy: i32,
    /// Facing direction: `+1` (right) or `-1` (left).
    pub facing: i32,
    /// Current action.
    pub action: ActionState,
    /// Remaining hitstun lockout frames.
    pub hitstun_frames: i32,
    /// Hit points, `0..=DEFAULT_HP`.
    pub hp: i32,
    /// Frames until another attack may start.
    pub attack_cooldown_frames: i32,
    /// Frames the current attack hitbox remains open.
    pub attack_active_frames: i32,
    /// 1 once the current attack has landed; suppresses further hits until a
    /// new attack starts.
    pub attack_has_hit: u8,
}

impl PlayerState {
    /// A freshly spawned player at `x`, grounded, facing `facing`.
    #[must_use]
    pub const fn spawn(x: i32, facing: i32) -> Self {
        Self {
            x,
            y: START_Y,
            vx: 0,
            vy: 0,
            facing,
            action: ActionState::Idle,
            hitstun_frames: 0,
            hp: DEFAULT_HP,
            attack_cooldown_frames: 0,
            attack_active_frames: 0,
            attack_has_hit: 0,
        }
    }
}

/// One complete simulation snapshot: frame counter, both players, and the
/// PRNG.
///
/// This is a pure value: assigning or copying it produces a fully independent
/// snapshot with no aliasing, which is exactly what the rollback engine's
/// snapshot ring relies on.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct SimState {
    /// The frame this state belongs to. The `k`-th pair of inputs drives the
    /// transition from frame `k` to `k + 1`.
    pub frame: Frame,
    /// Player 1.
    pub p1: PlayerState,
    /// Player 2.
    pub p2: PlayerState,
    /// Simulation PRNG; advances only through the step function.
    pub rng: XorShift32,
}

impl SimState {
    /// Creates the initial state for a session or replay: both players at
    /// their spawn points facing each other, frame 0, PRNG seeded.
    ///
    /// # Errors
    /// Returns [`RampartError::InvalidArgument`] if `seed` is zero.
    pub fn new(seed: u32) -> Result<Self, RampartError> {
        Ok(Self {
            frame: Frame::ZERO,
            p1: PlayerState::spawn(P1_START_X, 1),
            p2: PlayerState::spawn(P2_START_X, -1),
            rng: XorShift32::new(seed)?,
        })
    }
}

// #################
// # STEP FUNCTION #
// #################

/// Advances the simulation by exactly one tick.
///
/// Pure: reads nothing but its arguments, writes nothing but its return
/// value. The phases run in a fixed order, each applied to P1 and then P2:
///
/// 1. frame increment
/// 2. counter tick (cooldown, hitstun)
/// 3. attack start
/// 4. movement and jump
/// 5. gravity and integration
/// 6. attack-window countdown
/// 7. simultaneous hit resolution
///
/// Undefined bits in either input mask are ignored. Both hit tests in the
/// final phase read the same pre-application state before either result is
/// applied, so neither player gets an ordering advantage on trades.
#[must_use]
pub fn step(prev: &SimState, p1_input: Input, p2_input: Input) -> SimState {
    let mut next = *prev;

    // A: frame
    next.frame += 1;

    // B: counter tick
    tick_counters(&mut next.p1);
    tick_counters(&mut next.p2);

    // C: attack start
    try_start_attack(&mut next.p1, p1_input);
    try_start_attack(&mut next.p2, p2_input);

    // D: movement / jump
    apply_movement(&mut next.p1, p1_input);
    apply_movement(&mut next.p2, p2_input);

    // E: gravity + integrate
    integrate(&mut next.p1);
    integrate(&mut next.p2);

    // F: attack-window countdown
    tick_attack_window(&mut next.p1);
    tick_attack_window(&mut next.p2);

    // G: simultaneous hit resolution. Both tests read the post-F state
    // before either hit is applied.
    let p1_hits_p2 = hit_lands(&next.p1, &next.p2);
    let p2_hits_p1 = hit_lands(&next.p2, &next.p1);
    if p1_hits_p2 {
        apply_hit(&mut next.p1, &mut next.p2);
    }
    if p2_hits_p1 {
        apply_hit(&mut next.p2, &mut next.p1);
    }

    next
}

fn tick_counters(player: &mut PlayerState) {
    player.attack_cooldown_frames = (player.attack_cooldown_frames - 1).max(0);
    if player.hitstun_frames > 0 {
        player.hitstun_frames -= 1;
        if player.hitstun_frames == 0 {
            player.action = ActionState::Idle;
        }
    }
}

fn try_start_attack(player: &mut PlayerState, input: Input) {
    if player.action != ActionState::Hitstun
        && input.attack()
        && player.attack_cooldown_frames == 0
    {
        player.action = ActionState::Attack;
        player.attack_active_frames = ATTACK_ACTIVE_FRAMES;
        player.attack_cooldown_frames = ATTACK_COOLDOWN_FRAMES;
        player.attack_has_hit = 0;
    }
}

fn apply_movement(player: &mut PlayerState, input: Input) {
    // Hitstun suppresses all movement, including jumps.
    if player.action == ActionState::Hitstun {
        return;
    }

    if input.right() {
        player.x += MOVE_SPEED_PER_TICK;
        player.facing = 1;
        if player.action != ActionState::Jump && player.action != ActionState::Attack {
            player.action = ActionState::Run;
        }
    } else if input.left() {
        player.x -= MOVE_SPEED_PER_TICK;
        player.facing = -1;
        if player.action != ActionState::Jump && player.action != ActionState::Attack {
            player.action = ActionState::Run;
        }
    } else if player.action == ActionState::Run {
        player.action = ActionState::Idle;
    }

    if input.jump() && player.y == GROUND_Y && player.action != ActionState::Jump {
        player.vy = JUMP_VELOCITY_PER_TICK;
        player.action = ActionState::Jump;
    }

    player.x = player.x.clamp(MIN_X, MAX_X - PLAYER_WIDTH);
}

fn integrate(player: &mut PlayerState) {
    player.vy += GRAVITY_PER_TICK;
    player.y += player.vy;
    if player.y <= GROUND_Y {
        player.y = GROUND_Y;
        player.vy = 0;
        if player.action == ActionState::Jump {
            player.action = ActionState::Idle;
        }
    }
}

fn tick_attack_window(player: &mut PlayerState) {
    if player.attack_active_frames > 0 {
        player.attack_active_frames -= 1;
        if player.attack_active_frames == 0 && player.action == ActionState::Attack {
            player.action = ActionState::Idle;
        }
    }
}

/// Whether `attacker`'s open hitbox strictly overlaps `defender`'s hurtbox.
///
/// The hitbox sits adjacent to the attacker's body on the facing side.
/// Overlap uses strict less-than on both axes: touching edges do not hit.
fn hit_lands(attacker: &PlayerState, defender: &PlayerState) -> bool {
    if attacker.attack_active_frames <= 0 || attacker.attack_has_hit != 0 {
        return false;
    }

    let (hit_left, hit_right) = if attacker.facing > 0 {
        let left = attacker.x + PLAYER_WIDTH;
        (left, left + ATTACK_HITBOX_WIDTH)
    } else {
        let right = attacker.x;
        (right - ATTACK_HITBOX_WIDTH, right)
    };
    let hit_bottom = attacker.y;
    let hit_top = attacker.y + ATTACK_HITBOX_HEIGHT;

    let hurt_left = defender.x;
    let hurt_right = defender.x + PLAYER_WIDTH;
    let hurt_bottom = defender.y;
    let hurt_top = defender.y + PLAYER_HEIGHT;

    hit_left < hurt_right
        && hurt_left < hit_right
        && hit_bottom < hurt_top
        && hurt_bottom < hit_top
}

fn apply_hit(attacker: &mut PlayerState, defender: &mut PlayerState) {
    attacker.attack_has_hit = 1;
    defender.hp = (defender.hp - ATTACK_DAMAGE).max(0);
    defender.hitstun_frames = HITSTUN_FRAMES;
    defender.action = ActionState::Hitstun;
}

// #########
// # TESTS #
// #########
