//! Bodies, fixtures, and arena handles
//!
//! Bodies live in a generational arena owned by the world; gameplay behaviors
//! hold [`BodyHandle`]s, never references. Destroying a body bumps the slot
//! generation, so stale handles from queued events resolve to `None` and the
//! dispatcher drops them.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::shape::Shape;

/// Stable reference to a body slot (index + generation)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyHandle {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

/// Static bodies never move and have infinite mass; dynamic bodies integrate
/// gravity and respond to impulses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyKind {
    Static,
    Dynamic,
}

/// Gameplay role of a body, used for contact routing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyTag {
    Player,
    Terrain,
    Trampoline,
    Elevator,
    Spike,
    MovingSpike,
    Enemy,
    Coin,
    Health,
    Door,
}

/// Facing direction for sprite selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Facing {
    Left,
    Right,
}

/// Current sprite selector exposed to the renderer; the core picks frames,
/// the host draws them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sprite {
    PlayerIdle,
    PlayerWalk { frame: u8, facing: Facing },
    PlayerJump { facing: Facing },
    SnailIdle,
    SnailWalk { frame: u8, facing: Facing },
    FlyWalk { frame: u8, facing: Facing },
    Ground,
    Trampoline,
    Elevator,
    Spike,
    MovingSpike,
    Coin,
    HealthGem,
    Door,
}

/// Shape plus material attached to a body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fixture {
    pub shape: Shape,
    /// Bounce factor applied during contact resolution
    pub restitution: f32,
    /// Coulomb friction coefficient for tangential damping
    pub friction: f32,
    /// Sensors report overlap but are never resolved
    pub sensor: bool,
}

impl Fixture {
    pub fn solid(shape: Shape) -> Self {
        Self {
            shape,
            restitution: 0.0,
            friction: 0.0,
            sensor: false,
        }
    }

    pub fn sensor(shape: Shape) -> Self {
        Self {
            shape,
            restitution: 0.0,
            friction: 0.0,
            sensor: true,
        }
    }

    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution;
        self
    }

    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }
}

/// A physically simulated object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    pub kind: BodyKind,
    pub tag: BodyTag,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Bodies never rotate in this game; exposed for the render interface
    pub rotation: f32,
    /// Multiplier on world gravity (0 disables gravity for this body)
    pub gravity_scale: f32,
    /// Mass per unit area for solid fixtures
    pub density: f32,
    pub fixtures: Vec<Fixture>,
    /// Current sprite selector, updated by gameplay behaviors
    pub sprite: Sprite,
    /// Monotonic: once set the body is removed at the next sweep and
    /// generates no further events
    pub(crate) destroyed: bool,
    /// Cached 1/mass; zero for static bodies
    pub(crate) inv_mass: f32,
}

impl Body {
    pub fn new_static(tag: BodyTag, pos: Vec2, sprite: Sprite) -> Self {
        Self {
            kind: BodyKind::Static,
            tag,
            pos,
            vel: Vec2::ZERO,
            rotation: 0.0,
            gravity_scale: 0.0,
            density: 1.0,
            fixtures: Vec::new(),
            sprite,
            destroyed: false,
            inv_mass: 0.0,
        }
    }

    pub fn new_dynamic(tag: BodyTag, pos: Vec2, sprite: Sprite) -> Self {
        Self {
            kind: BodyKind::Dynamic,
            tag,
            pos,
            vel: Vec2::ZERO,
            rotation: 0.0,
            gravity_scale: 1.0,
            density: 1.0,
            fixtures: Vec::new(),
            sprite,
            destroyed: false,
            inv_mass: 0.0,
        }
    }

    pub fn with_fixture(mut self, fixture: Fixture) -> Self {
        self.fixtures.push(fixture);
        self.recompute_mass();
        self
    }

    pub fn with_gravity_scale(mut self, scale: f32) -> Self {
        self.gravity_scale = scale;
        self
    }

    /// Mass from density x total solid-fixture area; sensors carry no mass
    fn recompute_mass(&mut self) {
        if self.kind == BodyKind::Static {
            self.inv_mass = 0.0;
            return;
        }
        let area: f32 = self
            .fixtures
            .iter()
            .filter(|f| !f.sensor)
            .map(|f| f.shape.area())
            .sum();
        let mass = self.density * area;
        self.inv_mass = if mass > 0.0 { 1.0 / mass } else { 0.0 };
    }

    pub fn mass(&self) -> f32 {
        if self.inv_mass > 0.0 { 1.0 / self.inv_mass } else { f32::INFINITY }
    }

    /// Walker convenience: drive horizontal velocity, keep vertical
    pub fn start_walking(&mut self, speed: f32) {
        self.vel.x = speed;
    }

    /// Instantaneous velocity change scaled by mass
    pub fn apply_impulse(&mut self, impulse: Vec2) {
        self.vel += impulse * self.inv_mass;
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}
