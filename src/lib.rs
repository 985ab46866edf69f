//! Tamaro Jump - a 2D side-scrolling platformer
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics world, player, enemies, hazards)
//! - `levels`: Data-driven level definitions and world construction
//! - `game`: Controller owning level flow, saved stats, pause, and timers
//! - `audio`: Sound service with preloaded round-robin clip pools
//! - `platform`: Wall-clock abstraction

pub mod audio;
pub mod game;
pub mod levels;
pub mod platform;
pub mod sim;

pub use game::{Game, Input};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// World gravity magnitude (points down; world y axis points up)
    pub const GRAVITY: f32 = 10.0;

    /// Player defaults
    pub const PLAYER_SPEED: f32 = 6.0;
    pub const JUMP_SPEED: f32 = 14.0;
    pub const TRAMPOLINE_JUMP_SPEED: f32 = 30.0;
    pub const PLAYER_GRAVITY_SCALE: f32 = 3.0;
    /// Health is tracked in half-hearts; 6 half-hearts = 3 full hearts
    pub const MAX_HEALTH: u32 = 6;
    /// Player post-step logic runs every Nth tick
    pub const STEP_INTERVAL: u32 = 2;
    /// Upward velocity cap while riding a trampoline
    pub const MAX_TRAMPOLINE_HEIGHT: f32 = 20.0;
    /// Number of walk animation frames in the player sprite sheet
    pub const PLAYER_WALK_FRAMES: u8 = 11;

    /// Enemy defaults
    pub const SNAIL_SPEED: f32 = 2.0;
    pub const SNAIL_DETECTION_RANGE: f32 = 5.0;
    pub const SNAIL_PATROL_RANGE: f32 = 2.0;
    pub const FLY_SPEED: f32 = 5.0;
    pub const FLY_DETECTION_RANGE: f32 = 8.0;
    /// Impulse magnitude applied to the player when an enemy connects
    pub const ENEMY_PUSH_IMPULSE: f32 = 5.0;
    pub const ENEMY_WALK_FRAMES: u8 = 2;

    /// Hazard defaults
    pub const SPIKE_GRAVITY_SCALE: f32 = 5.0;
    pub const SPIKE_DAMAGE: u32 = 2;
    pub const MOVING_SPIKE_DAMAGE: u32 = 1;
    pub const TRAMPOLINE_RESTITUTION: f32 = 1.2;

    /// Each coin is worth 10 points
    pub const COIN_SCORE: u32 = 10;

    /// Invincibility window after a health pickup (wall-clock)
    pub const INVINCIBILITY_MS: u64 = 10_000;
    /// "Press P to pause, R to reset" banner duration (wall-clock)
    pub const BANNER_MS: u64 = 10_000;

    /// Preloaded clips per sound effect, cycled round-robin for overlap
    pub const CLIP_POOL_SIZE: usize = 5;
}
