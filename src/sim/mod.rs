//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Stable iteration order (bodies by slot, behaviors by registration)
//! - No rendering, audio, or platform dependencies; the core only emits
//!   [`GameEvent`]s and sprite selectors

pub mod body;
pub mod collectible;
pub mod contact;
pub mod enemy;
pub mod gameworld;
pub mod hazard;
pub mod player;
pub mod shape;
pub mod world;

pub use body::{Body, BodyHandle, BodyKind, BodyTag, Facing, Fixture, Sprite};
pub use collectible::{Coin, Door, HealthCollectible};
pub use enemy::{Enemy, EnemyKind};
pub use gameworld::{Behavior, Ctx, GameEvent, GameWorld, RenderItem};
pub use hazard::{Elevator, FallingSpike, MoveFallingSpike, Trampoline};
pub use player::{MotionState, Player};
pub use shape::Shape;
pub use world::{ContactEvent, ContactKind, ContactSide, World};
