//! Player character: movement intent, jumping, foot sensor, health
//!
//! Input handlers mutate intent flags; the physics hooks translate intent
//! into velocities. Ground and trampoline detection runs through a thin foot
//! sensor mounted just below the body.

use glam::Vec2;

use crate::consts::*;

use super::body::{Body, BodyHandle, BodyKind, BodyTag, Facing, Fixture, Sprite};
use super::shape::Shape;
use super::world::{ContactSide, World};

/// Exactly one motion state holds at any time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionState {
    Idle,
    Walking,
    Jumping,
}

/// Fixture index of the player's solid body box
const BODY_FIXTURE: usize = 0;
/// Fixture index of the foot sensor
const FOOT_FIXTURE: usize = 1;

pub struct Player {
    handle: BodyHandle,
    health: u32,
    coins: u32,
    facing: Facing,
    moving_left: bool,
    moving_right: bool,
    state: MotionState,
    on_ground: bool,
    on_trampoline: bool,
    invincible: bool,
    touch_count: u32,
    step_counter: u32,
    walk_frame: u8,
}

impl Player {
    /// Create the player body in `world` at the level spawn point
    pub fn spawn(world: &mut World, pos: Vec2) -> Self {
        let body = Body::new_dynamic(BodyTag::Player, pos, Sprite::PlayerIdle)
            .with_fixture(Fixture::solid(Shape::rect(1.0, 2.0)))
            .with_fixture(Fixture::sensor(Shape::rect_at(
                0.9,
                0.1,
                Vec2::new(0.0, -2.0),
            )))
            .with_gravity_scale(PLAYER_GRAVITY_SCALE);
        let handle = world.add_body(body);
        Self {
            handle,
            health: MAX_HEALTH,
            coins: 0,
            facing: Facing::Right,
            moving_left: false,
            moving_right: false,
            state: MotionState::Idle,
            on_ground: true,
            on_trampoline: false,
            invincible: false,
            touch_count: 0,
            step_counter: 0,
            walk_frame: 0,
        }
    }

    pub fn handle(&self) -> BodyHandle {
        self.handle
    }

    pub fn position(&self, world: &World) -> Vec2 {
        world.body(self.handle).map(|b| b.pos).unwrap_or_default()
    }

    pub fn velocity(&self, world: &World) -> Vec2 {
        world.body(self.handle).map(|b| b.vel).unwrap_or_default()
    }

    // --- input intent -------------------------------------------------

    pub fn move_left(&mut self, world: &mut World) {
        self.moving_left = true;
        self.moving_right = false;
        self.facing = Facing::Left;
        if let Some(body) = world.body_mut(self.handle) {
            body.vel.x = -PLAYER_SPEED;
        }
    }

    pub fn move_right(&mut self, world: &mut World) {
        self.moving_right = true;
        self.moving_left = false;
        self.facing = Facing::Right;
        if let Some(body) = world.body_mut(self.handle) {
            body.vel.x = PLAYER_SPEED;
        }
    }

    pub fn stop_moving(&mut self, world: &mut World) {
        self.moving_left = false;
        self.moving_right = false;
        if let Some(body) = world.body_mut(self.handle) {
            body.vel.x = 0.0;
        }
    }

    /// Jump is allowed only from the ground or a trampoline; the trampoline
    /// launch overrides the normal jump velocity
    pub fn jump(&mut self, world: &mut World) {
        if !(self.on_ground || self.on_trampoline) {
            return;
        }
        let Some(body) = world.body_mut(self.handle) else {
            return;
        };
        if self.on_trampoline {
            body.vel.y = TRAMPOLINE_JUMP_SPEED;
        } else {
            body.vel.y = JUMP_SPEED;
            self.on_ground = false;
        }
        self.state = MotionState::Jumping;
    }

    pub fn is_moving_left(&self) -> bool {
        self.moving_left
    }

    pub fn is_moving_right(&self) -> bool {
        self.moving_right
    }

    // --- physics hooks ------------------------------------------------

    /// Kick the bounce if the player is resting on a trampoline edge with no
    /// vertical velocity, which would otherwise leave them stuck
    pub fn pre_step(&mut self, world: &mut World) {
        if !self.on_trampoline {
            return;
        }
        if let Some(body) = world.body_mut(self.handle)
            && body.vel.y.abs() < 0.01
        {
            body.vel.y = TRAMPOLINE_JUMP_SPEED;
            self.state = MotionState::Jumping;
        }
    }

    /// Throttled to every [`STEP_INTERVAL`]th tick: reapply movement intent,
    /// cap the trampoline launch, and derive the motion state
    pub fn post_step(&mut self, world: &mut World) {
        self.step_counter += 1;
        if self.step_counter < STEP_INTERVAL {
            return;
        }
        self.step_counter = 0;

        let Some(body) = world.body_mut(self.handle) else {
            return;
        };

        if self.moving_left {
            body.vel.x = -PLAYER_SPEED;
        } else if self.moving_right {
            body.vel.x = PLAYER_SPEED;
        }

        if self.on_trampoline && body.vel.y > MAX_TRAMPOLINE_HEIGHT {
            body.vel.y = MAX_TRAMPOLINE_HEIGHT;
        }

        if body.vel.y.abs() > 0.01 {
            self.state = MotionState::Jumping;
        } else if body.vel.x.abs() > 1.0 && self.on_ground {
            self.state = MotionState::Walking;
        } else if self.on_ground {
            self.state = MotionState::Idle;
        }

        body.sprite = match self.state {
            MotionState::Jumping => Sprite::PlayerJump {
                facing: self.facing,
            },
            MotionState::Walking => {
                self.walk_frame = (self.walk_frame + 1) % PLAYER_WALK_FRAMES;
                Sprite::PlayerWalk {
                    frame: self.walk_frame,
                    facing: self.facing,
                }
            }
            MotionState::Idle => Sprite::PlayerIdle,
        };
    }

    // --- contact hooks ------------------------------------------------

    pub fn on_begin_contact(&mut self, world: &World, me: ContactSide, other: ContactSide) {
        let Some(other_body) = world.body(other.body) else {
            return;
        };
        if me.fixture == FOOT_FIXTURE {
            if other_body.tag == BodyTag::Trampoline {
                self.on_trampoline = true;
                self.land();
            }
            if other_body.kind == BodyKind::Static {
                self.on_ground = true;
                self.land();
            }
        } else if me.fixture == BODY_FIXTURE && !other.sensor {
            self.touch_count += 1;
        }
    }

    pub fn on_end_contact(&mut self, world: &World, me: ContactSide, other: ContactSide) {
        if me.fixture != FOOT_FIXTURE {
            return;
        }
        let Some(other_body) = world.body(other.body) else {
            return;
        };
        if other_body.tag == BodyTag::Trampoline {
            self.on_trampoline = false;
        }
        if other_body.kind == BodyKind::Static {
            self.on_ground = false;
        }
    }

    /// Solid contact with any static body also counts as landing
    pub fn on_collide(&mut self, world: &World, other: BodyHandle) {
        let Some(other_body) = world.body(other) else {
            return;
        };
        if other_body.kind == BodyKind::Static {
            self.on_ground = true;
            self.land();
        }
    }

    fn land(&mut self) {
        if self.state == MotionState::Jumping {
            self.state = MotionState::Idle;
        }
    }

    // --- health, coins, score -----------------------------------------

    /// No-op while invincible
    pub fn take_damage(&mut self, amount: u32) {
        if !self.invincible {
            self.health = self.health.saturating_sub(amount);
        }
    }

    /// Never exceeds [`MAX_HEALTH`]
    pub fn heal(&mut self, amount: u32) {
        self.health = (self.health + amount).min(MAX_HEALTH);
    }

    pub fn has_lost(&self) -> bool {
        self.health == 0
    }

    pub fn health(&self) -> u32 {
        self.health
    }

    pub fn set_health(&mut self, health: u32) {
        self.health = health.min(MAX_HEALTH);
    }

    pub fn coins(&self) -> u32 {
        self.coins
    }

    pub fn set_coins(&mut self, coins: u32) {
        self.coins = coins;
    }

    pub fn add_coin(&mut self) {
        self.coins += 1;
    }

    pub fn score(&self) -> u32 {
        self.coins * COIN_SCORE
    }

    pub fn is_invincible(&self) -> bool {
        self.invincible
    }

    pub fn set_invincible(&mut self, invincible: bool) {
        self.invincible = invincible;
    }

    pub fn motion_state(&self) -> MotionState {
        self.state
    }

    pub fn is_jumping(&self) -> bool {
        self.state == MotionState::Jumping
    }

    pub fn is_on_ground(&self) -> bool {
        self.on_ground
    }

    pub fn is_on_trampoline(&self) -> bool {
        self.on_trampoline
    }

    pub fn touch_count(&self) -> u32 {
        self.touch_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{GRAVITY, SIM_DT};

    fn world_with_player() -> (World, Player) {
        let mut world = World::new(GRAVITY, SIM_DT);
        let player = Player::spawn(&mut world, Vec2::new(0.0, 0.0));
        (world, player)
    }

    #[test]
    fn heal_never_exceeds_max() {
        let (_, mut player) = world_with_player();
        player.heal(3);
        assert_eq!(player.health(), MAX_HEALTH);
        player.set_health(4);
        player.heal(5);
        assert_eq!(player.health(), MAX_HEALTH);
    }

    #[test]
    fn damage_is_noop_while_invincible() {
        let (_, mut player) = world_with_player();
        player.set_invincible(true);
        player.take_damage(2);
        assert_eq!(player.health(), MAX_HEALTH);
        player.set_invincible(false);
        player.take_damage(2);
        assert_eq!(player.health(), 4);
    }

    #[test]
    fn damage_saturates_at_zero() {
        let (_, mut player) = world_with_player();
        player.take_damage(10);
        assert_eq!(player.health(), 0);
        assert!(player.has_lost());
    }

    #[test]
    fn jump_requires_ground_or_trampoline() {
        let (mut world, mut player) = world_with_player();
        player.on_ground = false;
        player.jump(&mut world);
        assert_eq!(player.velocity(&world).y, 0.0);

        player.on_ground = true;
        player.jump(&mut world);
        assert_eq!(player.velocity(&world).y, JUMP_SPEED);
        assert!(player.is_jumping());
        assert!(!player.is_on_ground());
    }

    #[test]
    fn trampoline_jump_overrides_normal_jump() {
        let (mut world, mut player) = world_with_player();
        player.on_trampoline = true;
        player.on_ground = false;
        player.jump(&mut world);
        assert_eq!(player.velocity(&world).y, TRAMPOLINE_JUMP_SPEED);
    }

    #[test]
    fn trampoline_kick_when_stuck() {
        let (mut world, mut player) = world_with_player();
        player.on_trampoline = true;
        player.pre_step(&mut world);
        assert_eq!(player.velocity(&world).y, TRAMPOLINE_JUMP_SPEED);

        // Not stuck: kick must not fire
        let (mut world, mut player) = world_with_player();
        player.on_trampoline = true;
        world.body_mut(player.handle()).unwrap().vel.y = 5.0;
        player.pre_step(&mut world);
        assert_eq!(player.velocity(&world).y, 5.0);
    }

    #[test]
    fn movement_intent_reapplied_in_post_step() {
        let (mut world, mut player) = world_with_player();
        player.move_right(&mut world);
        // Collision response could have zeroed the velocity mid-tick
        world.body_mut(player.handle()).unwrap().vel.x = 0.0;
        player.post_step(&mut world); // tick 1: throttled out
        assert_eq!(player.velocity(&world).x, 0.0);
        player.post_step(&mut world); // tick 2: intent reapplied
        assert_eq!(player.velocity(&world).x, PLAYER_SPEED);
    }

    #[test]
    fn motion_state_derivation() {
        let (mut world, mut player) = world_with_player();
        assert_eq!(player.motion_state(), MotionState::Idle);

        // Walking: grounded with horizontal speed
        player.on_ground = true;
        world.body_mut(player.handle()).unwrap().vel = Vec2::new(6.0, 0.0);
        player.post_step(&mut world);
        player.post_step(&mut world);
        assert_eq!(player.motion_state(), MotionState::Walking);

        // Vertical motion wins over walking
        world.body_mut(player.handle()).unwrap().vel = Vec2::new(6.0, 3.0);
        player.post_step(&mut world);
        player.post_step(&mut world);
        assert_eq!(player.motion_state(), MotionState::Jumping);

        // Back at rest on the ground
        world.body_mut(player.handle()).unwrap().vel = Vec2::ZERO;
        player.post_step(&mut world);
        player.post_step(&mut world);
        assert_eq!(player.motion_state(), MotionState::Idle);
    }

    #[test]
    fn trampoline_launch_capped() {
        let (mut world, mut player) = world_with_player();
        player.on_trampoline = true;
        world.body_mut(player.handle()).unwrap().vel.y = TRAMPOLINE_JUMP_SPEED;
        player.post_step(&mut world);
        player.post_step(&mut world);
        assert_eq!(player.velocity(&world).y, MAX_TRAMPOLINE_HEIGHT);
    }
}
