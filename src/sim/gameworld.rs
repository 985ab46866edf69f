//! Per-tick orchestration of physics and gameplay behaviors
//!
//! [`GameWorld`] owns the physics [`World`], the [`Player`], and a list of
//! behavior objects registered in insertion order. One [`GameWorld::step`]
//! runs the full tick:
//! 1. `pre_step` on the player, then each behavior in order
//! 2. physics: integrate, detect contacts, resolve solids
//! 3. dispatch Begin/End contact events; solid-solid Begins also fire
//!    `collide`
//! 4. `post_step` on the player, then each behavior
//! 5. sweep destroyed bodies and drop their behaviors
//!
//! A body destroyed inside a callback receives no further events this tick;
//! destruction takes effect before the next tick's `pre_step`.

use glam::Vec2;

use crate::audio::SoundEffect;
use crate::consts::{GRAVITY, SIM_DT};

use super::body::{BodyHandle, Sprite};
use super::player::Player;
use super::world::{ContactEvent, ContactKind, ContactSide, World};

/// Requests raised by gameplay for the controller to act on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// Play a one-shot sound effect
    Sound(SoundEffect),
    /// A health pickup started the invincibility window
    InvincibilityStarted,
    /// The player touched the level exit
    ReachedDoor,
    /// The player ran out of health
    PlayerLost,
}

/// Mutable view handed to behavior callbacks
pub struct Ctx<'a> {
    pub world: &'a mut World,
    pub player: &'a mut Player,
    pub events: &'a mut Vec<GameEvent>,
    pub dt: f32,
}

/// A gameplay behavior bound to one body
pub trait Behavior {
    /// The body this behavior drives
    fn handle(&self) -> BodyHandle;

    fn pre_step(&mut self, _ctx: &mut Ctx) {}
    fn post_step(&mut self, _ctx: &mut Ctx) {}
    fn on_begin_contact(&mut self, _me: ContactSide, _other: ContactSide, _ctx: &mut Ctx) {}
    fn on_end_contact(&mut self, _me: ContactSide, _other: ContactSide, _ctx: &mut Ctx) {}
    /// Solid-solid contact, fired after resolution
    fn on_collide(&mut self, _me: ContactSide, _other: ContactSide, _ctx: &mut Ctx) {}
}

/// What the renderer needs for one body
#[derive(Debug, Clone, Copy)]
pub struct RenderItem {
    pub pos: Vec2,
    pub rotation: f32,
    pub sprite: Sprite,
}

/// One level's running simulation
pub struct GameWorld {
    pub world: World,
    pub player: Player,
    behaviors: Vec<Box<dyn Behavior>>,
    events: Vec<GameEvent>,
    /// Background identifier handed to the renderer
    pub background: String,
}

impl GameWorld {
    pub fn new(spawn: Vec2, background: impl Into<String>) -> Self {
        let mut world = World::new(GRAVITY, SIM_DT);
        let player = Player::spawn(&mut world, spawn);
        Self {
            world,
            player,
            behaviors: Vec::new(),
            events: Vec::new(),
            background: background.into(),
        }
    }

    pub fn add_behavior(&mut self, behavior: Box<dyn Behavior>) {
        self.behaviors.push(behavior);
    }

    pub fn behavior_count(&self) -> usize {
        self.behaviors.len()
    }

    pub fn start(&mut self) {
        self.world.start();
    }

    pub fn stop(&mut self) {
        self.world.stop();
    }

    pub fn is_running(&self) -> bool {
        self.world.is_running()
    }

    /// Advance one fixed timestep; returns the gameplay events raised
    pub fn step(&mut self) -> Vec<GameEvent> {
        if !self.world.is_running() {
            return Vec::new();
        }
        let dt = self.world.dt;
        let mut behaviors = std::mem::take(&mut self.behaviors);
        let mut events = std::mem::take(&mut self.events);

        // Pre-step listeners, player first, then registration order
        self.player.pre_step(&mut self.world);
        {
            let mut ctx = Ctx {
                world: &mut self.world,
                player: &mut self.player,
                events: &mut events,
                dt,
            };
            for behavior in behaviors.iter_mut() {
                if ctx.world.is_alive(behavior.handle()) {
                    behavior.pre_step(&mut ctx);
                }
            }
        }

        // Integrate, detect, resolve
        let contact_events = self.world.step_physics();

        // Dispatch contact transitions
        for event in &contact_events {
            self.dispatch(event, &mut behaviors, &mut events);
        }

        // Post-step listeners
        self.player.post_step(&mut self.world);
        {
            let mut ctx = Ctx {
                world: &mut self.world,
                player: &mut self.player,
                events: &mut events,
                dt,
            };
            for behavior in behaviors.iter_mut() {
                if ctx.world.is_alive(behavior.handle()) {
                    behavior.post_step(&mut ctx);
                }
            }
        }

        // Sweep: destruction takes effect before the next tick begins
        self.world.sweep_destroyed();
        behaviors.retain(|b| self.world.is_alive(b.handle()));
        self.behaviors = behaviors;
        events
    }

    /// Route one contact event to both sides, dropping stale handles
    fn dispatch(
        &mut self,
        event: &ContactEvent,
        behaviors: &mut [Box<dyn Behavior>],
        events: &mut Vec<GameEvent>,
    ) {
        let dt = self.world.dt;
        for (me, other) in [(event.a, event.b), (event.b, event.a)] {
            // A body destroyed earlier this tick gets no further events
            if !self.world.is_alive(me.body) || !self.world.is_alive(other.body) {
                log::debug!("dropping contact event for destroyed body {:?}", me.body);
                continue;
            }

            if me.body == self.player.handle() {
                match event.kind {
                    ContactKind::Begin => {
                        self.player.on_begin_contact(&self.world, me, other);
                        if event.is_solid() {
                            self.player.on_collide(&self.world, other.body);
                        }
                    }
                    ContactKind::End => {
                        self.player.on_end_contact(&self.world, me, other);
                    }
                }
                continue;
            }

            let Some(behavior) = behaviors.iter_mut().find(|b| b.handle() == me.body) else {
                continue;
            };
            let mut ctx = Ctx {
                world: &mut self.world,
                player: &mut self.player,
                events,
                dt,
            };
            match event.kind {
                ContactKind::Begin => {
                    behavior.on_begin_contact(me, other, &mut ctx);
                    if event.is_solid()
                        && ctx.world.is_alive(me.body)
                        && ctx.world.is_alive(other.body)
                    {
                        behavior.on_collide(me, other, &mut ctx);
                    }
                }
                ContactKind::End => {
                    behavior.on_end_contact(me, other, &mut ctx);
                }
            }
        }
    }

    /// Enumerate sprite selectors for the renderer
    pub fn render_items(&self) -> Vec<RenderItem> {
        self.world
            .bodies()
            .map(|(_, body)| RenderItem {
                pos: body.pos,
                rotation: body.rotation,
                sprite: body.sprite,
            })
            .collect()
    }
}
