//! Level hazards: elevators, falling spikes, oscillating spikes, trampolines

use glam::Vec2;

use crate::audio::SoundEffect;
use crate::consts::*;

use super::body::{Body, BodyHandle, BodyTag, Fixture, Sprite};
use super::gameworld::{Behavior, Ctx, GameEvent};
use super::shape::Shape;
use super::world::{ContactSide, World};

/// Vertical ping-pong motion clamped to `[low, high]`
#[derive(Debug, Clone, Copy)]
struct Oscillator {
    low: f32,
    high: f32,
    speed: f32,
    moving_up: bool,
}

impl Oscillator {
    fn new(a: f32, b: f32, speed: f32) -> Self {
        Self {
            low: a.min(b),
            high: a.max(b),
            speed,
            moving_up: true,
        }
    }

    /// Next y position; never leaves the band
    fn advance(&mut self, y: f32, dt: f32) -> f32 {
        let dir = if self.moving_up { 1.0 } else { -1.0 };
        let mut next = y + dir * self.speed * dt;
        if next >= self.high {
            next = self.high;
            self.moving_up = false;
        } else if next <= self.low {
            next = self.low;
            self.moving_up = true;
        }
        next
    }
}

/// Moving platform the player can ride
pub struct Elevator {
    handle: BodyHandle,
    oscillator: Oscillator,
}

impl Elevator {
    pub fn new(world: &mut World, x: f32, start_y: f32, end_y: f32, speed: f32) -> Self {
        let body = Body::new_static(BodyTag::Elevator, Vec2::new(x, start_y), Sprite::Elevator)
            .with_fixture(Fixture::solid(Shape::rect(1.5, 0.25)));
        let handle = world.add_body(body);
        Self {
            handle,
            oscillator: Oscillator::new(start_y, end_y, speed),
        }
    }
}

impl Behavior for Elevator {
    fn handle(&self) -> BodyHandle {
        self.handle
    }

    /// Static platform moved by teleport, before integration
    fn pre_step(&mut self, ctx: &mut Ctx) {
        let dt = ctx.dt;
        if let Some(body) = ctx.world.body_mut(self.handle) {
            body.pos.y = self.oscillator.advance(body.pos.y, dt);
        }
    }
}

/// Upward-pointing spike riding an elevator track; deals contact damage
/// through a sensor and never destroys itself
pub struct MoveFallingSpike {
    handle: BodyHandle,
    oscillator: Oscillator,
}

/// Sensor fixture index on the oscillating spike
const MOVING_SPIKE_SENSOR: usize = 1;

impl MoveFallingSpike {
    pub fn new(world: &mut World, x: f32, start_y: f32, end_y: f32, speed: f32) -> Self {
        let tip = Shape::polygon(vec![
            Vec2::new(0.0, 0.5),
            Vec2::new(-0.5, -0.5),
            Vec2::new(0.5, -0.5),
        ]);
        let body = Body::new_static(
            BodyTag::MovingSpike,
            Vec2::new(x, start_y),
            Sprite::MovingSpike,
        )
        .with_fixture(Fixture::solid(tip.clone()))
        .with_fixture(Fixture::sensor(tip));
        let handle = world.add_body(body);
        Self {
            handle,
            oscillator: Oscillator::new(start_y, end_y, speed),
        }
    }
}

impl Behavior for MoveFallingSpike {
    fn handle(&self) -> BodyHandle {
        self.handle
    }

    fn pre_step(&mut self, ctx: &mut Ctx) {
        let dt = ctx.dt;
        if let Some(body) = ctx.world.body_mut(self.handle) {
            body.pos.y = self.oscillator.advance(body.pos.y, dt);
        }
    }

    fn on_begin_contact(&mut self, me: ContactSide, other: ContactSide, ctx: &mut Ctx) {
        if me.fixture != MOVING_SPIKE_SENSOR || other.body != ctx.player.handle() {
            return;
        }
        ctx.player.take_damage(MOVING_SPIKE_DAMAGE);
        if ctx.player.has_lost() {
            ctx.events.push(GameEvent::PlayerLost);
        }
    }
}

/// Spike suspended above the level that drops when the player walks under it
pub struct FallingSpike {
    handle: BodyHandle,
    activated: bool,
}

/// Trigger sensor fixture index on the falling spike
const FALLING_SPIKE_TRIGGER: usize = 1;

impl FallingSpike {
    /// The spike hangs three units above the anchor point
    pub fn new(world: &mut World, x: f32, y: f32) -> Self {
        let tip = Shape::polygon(vec![
            Vec2::new(0.0, -1.0),
            Vec2::new(-0.5, 0.5),
            Vec2::new(0.5, 0.5),
        ]);
        let body = Body::new_dynamic(BodyTag::Spike, Vec2::new(x, y + 3.0), Sprite::Spike)
            .with_fixture(Fixture::solid(tip))
            // Tall trigger column reaching down from the spike
            .with_fixture(Fixture::sensor(Shape::rect_at(
                1.0,
                50.0,
                Vec2::new(0.0, -50.0),
            )))
            .with_gravity_scale(0.0);
        let handle = world.add_body(body);
        Self {
            handle,
            activated: false,
        }
    }

    pub fn is_activated(&self) -> bool {
        self.activated
    }
}

impl Behavior for FallingSpike {
    fn handle(&self) -> BodyHandle {
        self.handle
    }

    /// Falls straight down once triggered
    fn pre_step(&mut self, ctx: &mut Ctx) {
        if !self.activated {
            return;
        }
        if let Some(body) = ctx.world.body_mut(self.handle) {
            body.vel.x = 0.0;
        }
    }

    fn on_begin_contact(&mut self, me: ContactSide, other: ContactSide, ctx: &mut Ctx) {
        if self.activated || me.fixture != FALLING_SPIKE_TRIGGER {
            return;
        }
        if other.body != ctx.player.handle() {
            return;
        }
        self.activated = true;
        if let Some(body) = ctx.world.body_mut(self.handle) {
            body.gravity_scale = SPIKE_GRAVITY_SCALE;
            body.vel = Vec2::ZERO;
        }
        log::debug!("falling spike triggered at {:?}", self.handle);
    }

    /// One hit on the player, then gone; a spike that misses lands and
    /// stays as an obstacle
    fn on_collide(&mut self, _me: ContactSide, other: ContactSide, ctx: &mut Ctx) {
        if !self.activated || other.body != ctx.player.handle() {
            return;
        }
        ctx.player.take_damage(SPIKE_DAMAGE);
        if ctx.player.has_lost() {
            ctx.events.push(GameEvent::PlayerLost);
        }
        ctx.world.destroy(self.handle);
    }
}

/// Bouncy platform; restitution above one amplifies each landing
pub struct Trampoline {
    handle: BodyHandle,
}

impl Trampoline {
    pub fn new(world: &mut World, x: f32, y: f32) -> Self {
        let body = Body::new_static(BodyTag::Trampoline, Vec2::new(x, y), Sprite::Trampoline)
            .with_fixture(Fixture::solid(Shape::rect(2.0, 0.5)).with_restitution(TRAMPOLINE_RESTITUTION));
        let handle = world.add_body(body);
        Self { handle }
    }
}

impl Behavior for Trampoline {
    fn handle(&self) -> BodyHandle {
        self.handle
    }

    fn on_collide(&mut self, _me: ContactSide, other: ContactSide, ctx: &mut Ctx) {
        if other.body == ctx.player.handle() {
            ctx.events.push(GameEvent::Sound(SoundEffect::Jump));
        }
    }
}
