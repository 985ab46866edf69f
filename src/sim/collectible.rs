//! Pickups and the level exit: coins, health gems, the door

use glam::Vec2;

use crate::audio::SoundEffect;
use crate::consts::*;

use super::body::{Body, BodyHandle, BodyTag, Fixture, Sprite};
use super::gameworld::{Behavior, Ctx, GameEvent};
use super::shape::Shape;
use super::world::{ContactSide, World};

/// One coin, gone after pickup
pub struct Coin {
    handle: BodyHandle,
}

impl Coin {
    pub fn new(world: &mut World, x: f32, y: f32) -> Self {
        let body = Body::new_static(BodyTag::Coin, Vec2::new(x, y), Sprite::Coin)
            .with_fixture(Fixture::solid(Shape::circle(1.5)).with_restitution(0.5));
        let handle = world.add_body(body);
        Self { handle }
    }
}

impl Behavior for Coin {
    fn handle(&self) -> BodyHandle {
        self.handle
    }

    fn on_collide(&mut self, _me: ContactSide, other: ContactSide, ctx: &mut Ctx) {
        if other.body != ctx.player.handle() {
            return;
        }
        ctx.player.add_coin();
        ctx.world.destroy(self.handle);
    }
}

/// Health gem: restores one point and grants timed invincibility
pub struct HealthCollectible {
    handle: BodyHandle,
}

impl HealthCollectible {
    pub fn new(world: &mut World, x: f32, y: f32) -> Self {
        let body = Body::new_dynamic(BodyTag::Health, Vec2::new(x, y), Sprite::HealthGem)
            .with_fixture(Fixture::solid(Shape::circle(0.5)));
        let handle = world.add_body(body);
        Self { handle }
    }
}

impl Behavior for HealthCollectible {
    fn handle(&self) -> BodyHandle {
        self.handle
    }

    fn on_collide(&mut self, _me: ContactSide, other: ContactSide, ctx: &mut Ctx) {
        if other.body != ctx.player.handle() {
            return;
        }
        ctx.player.heal(1);
        ctx.player.set_invincible(true);
        ctx.events.push(GameEvent::Sound(SoundEffect::Popcart));
        ctx.events.push(GameEvent::InvincibilityStarted);
        ctx.world.destroy(self.handle);
        log::debug!("health collected, player at {} hp", ctx.player.health());
    }
}

/// Level exit; touching it requests the next level
pub struct Door {
    handle: BodyHandle,
}

impl Door {
    pub fn new(world: &mut World, x: f32, y: f32) -> Self {
        let body = Body::new_static(BodyTag::Door, Vec2::new(x, y), Sprite::Door)
            .with_fixture(Fixture::solid(Shape::rect(1.0, 2.0)));
        let handle = world.add_body(body);
        Self { handle }
    }
}

impl Behavior for Door {
    fn handle(&self) -> BodyHandle {
        self.handle
    }

    fn on_collide(&mut self, _me: ContactSide, other: ContactSide, ctx: &mut Ctx) {
        if other.body == ctx.player.handle() {
            ctx.events.push(GameEvent::ReachedDoor);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::player::Player;

    fn parts() -> (World, Player) {
        let mut world = World::new(GRAVITY, SIM_DT);
        let player = Player::spawn(&mut world, Vec2::ZERO);
        (world, player)
    }

    fn sides(behavior: BodyHandle, player: BodyHandle) -> (ContactSide, ContactSide) {
        (
            ContactSide {
                body: behavior,
                fixture: 0,
                sensor: false,
            },
            ContactSide {
                body: player,
                fixture: 0,
                sensor: false,
            },
        )
    }

    #[test]
    fn coin_pickup_scores_and_despawns() {
        let (mut world, mut player) = parts();
        let mut coin = Coin::new(&mut world, 0.0, 0.0);
        let (me, other) = sides(coin.handle(), player.handle());
        let mut events = Vec::new();
        let mut ctx = Ctx {
            world: &mut world,
            player: &mut player,
            events: &mut events,
            dt: SIM_DT,
        };
        coin.on_collide(me, other, &mut ctx);
        assert_eq!(player.coins(), 1);
        assert_eq!(player.score(), COIN_SCORE);
        assert!(!world.is_alive(coin.handle()));
        assert!(events.is_empty());
    }

    #[test]
    fn health_gem_heals_and_grants_invincibility() {
        let (mut world, mut player) = parts();
        player.set_health(3);
        let mut gem = HealthCollectible::new(&mut world, 0.0, 0.0);
        let (me, other) = sides(gem.handle(), player.handle());
        let mut events = Vec::new();
        let mut ctx = Ctx {
            world: &mut world,
            player: &mut player,
            events: &mut events,
            dt: SIM_DT,
        };
        gem.on_collide(me, other, &mut ctx);
        assert_eq!(player.health(), 4);
        assert!(player.is_invincible());
        assert_eq!(
            events,
            vec![
                GameEvent::Sound(SoundEffect::Popcart),
                GameEvent::InvincibilityStarted,
            ]
        );
    }

    #[test]
    fn health_gem_at_full_health_still_grants_invincibility() {
        let (mut world, mut player) = parts();
        let mut gem = HealthCollectible::new(&mut world, 0.0, 0.0);
        let (me, other) = sides(gem.handle(), player.handle());
        let mut events = Vec::new();
        let mut ctx = Ctx {
            world: &mut world,
            player: &mut player,
            events: &mut events,
            dt: SIM_DT,
        };
        gem.on_collide(me, other, &mut ctx);
        assert_eq!(player.health(), MAX_HEALTH);
        assert!(player.is_invincible());
    }

    #[test]
    fn door_raises_reached_event() {
        let (mut world, mut player) = parts();
        let mut door = Door::new(&mut world, 0.0, 0.0);
        let (me, other) = sides(door.handle(), player.handle());
        let mut events = Vec::new();
        let mut ctx = Ctx {
            world: &mut world,
            player: &mut player,
            events: &mut events,
            dt: SIM_DT,
        };
        door.on_collide(me, other, &mut ctx);
        assert_eq!(events, vec![GameEvent::ReachedDoor]);
    }

    #[test]
    fn non_player_contact_is_ignored() {
        let (mut world, mut player) = parts();
        let mut coin = Coin::new(&mut world, 0.0, 0.0);
        let stray = world.add_body(
            Body::new_dynamic(BodyTag::Enemy, Vec2::ZERO, Sprite::SnailIdle)
                .with_fixture(Fixture::solid(Shape::rect(0.5, 0.5))),
        );
        let (me, other) = sides(coin.handle(), stray);
        let mut events = Vec::new();
        let mut ctx = Ctx {
            world: &mut world,
            player: &mut player,
            events: &mut events,
            dt: SIM_DT,
        };
        coin.on_collide(me, other, &mut ctx);
        assert_eq!(player.coins(), 0);
        assert!(world.is_alive(coin.handle()));
    }
}
