//! Walking and flying enemies
//!
//! Both enemy kinds patrol until the player comes within detection range,
//! then chase. A jumping player destroys an enemy on contact (stomp); a
//! grounded player takes one damage and a knockback impulse.

use glam::Vec2;

use crate::audio::SoundEffect;
use crate::consts::*;

use super::body::{Body, BodyHandle, BodyTag, Facing, Fixture, Sprite};
use super::gameworld::{Behavior, Ctx, GameEvent};
use super::shape::Shape;
use super::world::{ContactSide, World};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyKind {
    Snail,
    Fly,
}

/// Horizontal range an enemy walks when the player is out of reach; a
/// chase is unbounded and may leave it
#[derive(Debug, Clone, Copy)]
struct Patrol {
    left: f32,
    right: f32,
}

pub struct Enemy {
    handle: BodyHandle,
    kind: EnemyKind,
    speed: f32,
    detection_range: f32,
    patrol: Patrol,
    moving_right: bool,
    /// Flies hold their spawn altitude
    home_y: f32,
    walk_frame: u8,
    step_counter: u32,
}

impl Enemy {
    /// Ground walker patrolling around its spawn point
    pub fn snail(world: &mut World, x: f32, y: f32) -> Self {
        let body = Body::new_dynamic(BodyTag::Enemy, Vec2::new(x, y), Sprite::SnailIdle)
            .with_fixture(Fixture::solid(Shape::rect(0.5, 0.5)));
        let handle = world.add_body(body);
        Self {
            handle,
            kind: EnemyKind::Snail,
            speed: SNAIL_SPEED,
            detection_range: SNAIL_DETECTION_RANGE,
            patrol: Patrol {
                left: x - SNAIL_PATROL_RANGE,
                right: x + SNAIL_PATROL_RANGE,
            },
            moving_right: true,
            home_y: y,
            walk_frame: 0,
            step_counter: 0,
        }
    }

    /// Gravity-free flyer patrolling between two x limits
    pub fn fly(world: &mut World, x: f32, y: f32, left: f32, right: f32) -> Self {
        let body = Body::new_dynamic(
            BodyTag::Enemy,
            Vec2::new(x, y),
            Sprite::FlyWalk {
                frame: 0,
                facing: Facing::Right,
            },
        )
        .with_fixture(Fixture::solid(Shape::circle(0.5)))
        .with_gravity_scale(0.0);
        let handle = world.add_body(body);
        Self {
            handle,
            kind: EnemyKind::Fly,
            speed: FLY_SPEED,
            detection_range: FLY_DETECTION_RANGE,
            patrol: Patrol {
                left: left.min(right),
                right: left.max(right),
            },
            moving_right: true,
            home_y: y,
            walk_frame: 0,
            step_counter: 0,
        }
    }

    pub fn kind(&self) -> EnemyKind {
        self.kind
    }
}

impl Behavior for Enemy {
    fn handle(&self) -> BodyHandle {
        self.handle
    }

    /// Steering: chase the player inside detection range, otherwise patrol
    fn pre_step(&mut self, ctx: &mut Ctx) {
        let player_x = ctx.player.position(ctx.world).x;
        let Some(body) = ctx.world.body_mut(self.handle) else {
            return;
        };

        if body.pos.x >= self.patrol.right {
            self.moving_right = false;
        } else if body.pos.x <= self.patrol.left {
            self.moving_right = true;
        }

        // Patrol limits apply only while patrolling; the chase is unbounded
        let dx = player_x - body.pos.x;
        let dir = if dx.abs() < self.detection_range {
            dx.signum()
        } else if self.moving_right {
            1.0
        } else {
            -1.0
        };
        body.start_walking(dir * self.speed);

        match self.kind {
            // Slight downward bias keeps the walker pressed to the ground
            EnemyKind::Snail => body.vel.y = -1.0,
            EnemyKind::Fly => {
                body.vel.y = 0.0;
                body.pos.y = self.home_y;
            }
        }
    }

    /// Sprite frame selection, throttled like the player's
    fn post_step(&mut self, ctx: &mut Ctx) {
        self.step_counter += 1;
        if self.step_counter < STEP_INTERVAL {
            return;
        }
        self.step_counter = 0;

        let Some(body) = ctx.world.body_mut(self.handle) else {
            return;
        };
        let facing = if body.vel.x < 0.0 {
            Facing::Left
        } else {
            Facing::Right
        };
        self.walk_frame = (self.walk_frame + 1) % ENEMY_WALK_FRAMES;
        body.sprite = match self.kind {
            EnemyKind::Snail if body.vel.x.abs() < 0.01 => Sprite::SnailIdle,
            EnemyKind::Snail => Sprite::SnailWalk {
                frame: self.walk_frame,
                facing,
            },
            EnemyKind::Fly => Sprite::FlyWalk {
                frame: self.walk_frame,
                facing,
            },
        };
    }

    fn on_collide(&mut self, _me: ContactSide, other: ContactSide, ctx: &mut Ctx) {
        if other.body != ctx.player.handle() {
            return;
        }

        // Stomp wins: a jumping player destroys the enemy and takes nothing
        if ctx.player.is_jumping() {
            ctx.world.destroy(self.handle);
            ctx.events.push(GameEvent::Sound(SoundEffect::Splat));
            log::debug!("enemy stomped at {:?}", self.handle);
            return;
        }

        ctx.player.take_damage(1);
        if ctx.player.has_lost() {
            ctx.events.push(GameEvent::PlayerLost);
            return;
        }

        // Knock the player away from the enemy
        let enemy_pos = ctx
            .world
            .body(self.handle)
            .map(|b| b.pos)
            .unwrap_or_default();
        let player_handle = ctx.player.handle();
        if let Some(player_body) = ctx.world.body_mut(player_handle) {
            let away = (player_body.pos - enemy_pos).normalize_or_zero();
            player_body.apply_impulse(away * ENEMY_PUSH_IMPULSE);
        }
    }
}
