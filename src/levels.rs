//! Data-driven level definitions
//!
//! A level is a flat list of placement actions. The campaign ships three
//! hand-authored levels; arbitrary levels load from JSON with the same
//! schema. Every level needs exactly one spawn point and at least one exit
//! door to be playable.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::{
    Coin, Door, Elevator, Enemy, FallingSpike, GameWorld, HealthCollectible, MoveFallingSpike,
    Trampoline,
};
use crate::sim::{Body, BodyTag, Fixture, Shape, Sprite};

/// One placement in a level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LevelAction {
    Background {
        name: String,
    },
    Spawn {
        x: f32,
        y: f32,
    },
    Ground {
        x: f32,
        y: f32,
        half_width: f32,
        half_height: f32,
    },
    Trampoline {
        x: f32,
        y: f32,
    },
    Elevator {
        x: f32,
        start_y: f32,
        end_y: f32,
        speed: f32,
    },
    FallingSpike {
        x: f32,
        y: f32,
    },
    MoveFallingSpike {
        x: f32,
        start_y: f32,
        end_y: f32,
        speed: f32,
    },
    Snail {
        x: f32,
        y: f32,
    },
    Fly {
        x: f32,
        y: f32,
        left: f32,
        right: f32,
    },
    Coin {
        x: f32,
        y: f32,
    },
    HealthCollectible {
        x: f32,
        y: f32,
    },
    Door {
        x: f32,
        y: f32,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelDef {
    pub name: String,
    pub actions: Vec<LevelAction>,
}

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("level {0:?} has no spawn point")]
    MissingSpawn(String),
    #[error("level {0:?} has no exit door")]
    MissingDoor(String),
    #[error("failed to parse level: {0}")]
    Parse(#[from] serde_json::Error),
}

impl LevelDef {
    pub fn from_json(text: &str) -> Result<Self, LevelError> {
        let def: LevelDef = serde_json::from_str(text)?;
        def.validate()?;
        Ok(def)
    }

    pub fn validate(&self) -> Result<(), LevelError> {
        if !self
            .actions
            .iter()
            .any(|a| matches!(a, LevelAction::Spawn { .. }))
        {
            return Err(LevelError::MissingSpawn(self.name.clone()));
        }
        if !self
            .actions
            .iter()
            .any(|a| matches!(a, LevelAction::Door { .. }))
        {
            return Err(LevelError::MissingDoor(self.name.clone()));
        }
        Ok(())
    }
}

/// Instantiate a level into a fresh world, behaviors in action order
pub fn build_world(def: &LevelDef) -> Result<GameWorld, LevelError> {
    def.validate()?;

    let spawn = def
        .actions
        .iter()
        .find_map(|a| match a {
            LevelAction::Spawn { x, y } => Some(Vec2::new(*x, *y)),
            _ => None,
        })
        .ok_or_else(|| LevelError::MissingSpawn(def.name.clone()))?;
    let background = def
        .actions
        .iter()
        .find_map(|a| match a {
            LevelAction::Background { name } => Some(name.clone()),
            _ => None,
        })
        .unwrap_or_else(|| "background".to_string());

    let mut gw = GameWorld::new(spawn, background);
    for action in &def.actions {
        match *action {
            LevelAction::Background { .. } | LevelAction::Spawn { .. } => {}
            LevelAction::Ground {
                x,
                y,
                half_width,
                half_height,
            } => {
                gw.world.add_body(
                    Body::new_static(BodyTag::Terrain, Vec2::new(x, y), Sprite::Ground)
                        .with_fixture(Fixture::solid(Shape::rect(half_width, half_height))),
                );
            }
            LevelAction::Trampoline { x, y } => {
                let trampoline = Trampoline::new(&mut gw.world, x, y);
                gw.add_behavior(Box::new(trampoline));
            }
            LevelAction::Elevator {
                x,
                start_y,
                end_y,
                speed,
            } => {
                let elevator = Elevator::new(&mut gw.world, x, start_y, end_y, speed);
                gw.add_behavior(Box::new(elevator));
            }
            LevelAction::FallingSpike { x, y } => {
                let spike = FallingSpike::new(&mut gw.world, x, y);
                gw.add_behavior(Box::new(spike));
            }
            LevelAction::MoveFallingSpike {
                x,
                start_y,
                end_y,
                speed,
            } => {
                let spike = MoveFallingSpike::new(&mut gw.world, x, start_y, end_y, speed);
                gw.add_behavior(Box::new(spike));
            }
            LevelAction::Snail { x, y } => {
                let snail = Enemy::snail(&mut gw.world, x, y);
                gw.add_behavior(Box::new(snail));
            }
            LevelAction::Fly { x, y, left, right } => {
                let fly = Enemy::fly(&mut gw.world, x, y, left, right);
                gw.add_behavior(Box::new(fly));
            }
            LevelAction::Coin { x, y } => {
                let coin = Coin::new(&mut gw.world, x, y);
                gw.add_behavior(Box::new(coin));
            }
            LevelAction::HealthCollectible { x, y } => {
                let gem = HealthCollectible::new(&mut gw.world, x, y);
                gw.add_behavior(Box::new(gem));
            }
            LevelAction::Door { x, y } => {
                let door = Door::new(&mut gw.world, x, y);
                gw.add_behavior(Box::new(door));
            }
        }
    }
    log::info!(
        "built level {:?}: {} bodies, {} behaviors",
        def.name,
        gw.world.body_count(),
        gw.behavior_count()
    );
    Ok(gw)
}

/// The three shipped levels, in play order
pub fn campaign() -> Vec<LevelDef> {
    use LevelAction::*;
    vec![
        LevelDef {
            name: "meadow".to_string(),
            actions: vec![
                Background { name: "background".to_string() },
                Spawn { x: -14.0, y: -8.0 },
                Ground { x: 0.0, y: -10.0, half_width: 20.0, half_height: 1.0 },
                Ground { x: -4.0, y: -7.0, half_width: 2.0, half_height: 0.5 },
                Ground { x: 4.0, y: -5.0, half_width: 3.0, half_height: 0.5 },
                Trampoline { x: -10.0, y: -9.0 },
                FallingSpike { x: 4.0, y: 10.0 },
                MoveFallingSpike { x: -10.0, start_y: 0.0, end_y: 10.0, speed: 2.0 },
                Coin { x: -4.0, y: -6.0 },
                Coin { x: 4.0, y: -4.0 },
                HealthCollectible { x: -10.0, y: -7.5 },
                Snail { x: 0.0, y: -8.0 },
                Fly { x: -2.0, y: -1.0, left: -4.0, right: 0.0 },
                Door { x: 14.0, y: -8.0 },
            ],
        },
        LevelDef {
            name: "cliffs".to_string(),
            actions: vec![
                Background { name: "background2".to_string() },
                Spawn { x: -25.0, y: -8.0 },
                Ground { x: 2.0, y: -10.0, half_width: 32.0, half_height: 1.0 },
                Ground { x: -8.0, y: 0.0, half_width: 2.0, half_height: 0.5 },
                Ground { x: 8.0, y: 2.0, half_width: 2.0, half_height: 0.5 },
                Ground { x: 20.0, y: 4.0, half_width: 2.0, half_height: 0.5 },
                FallingSpike { x: -13.0, y: 5.0 },
                FallingSpike { x: 0.0, y: 6.0 },
                FallingSpike { x: 11.0, y: 7.0 },
                MoveFallingSpike { x: -8.0, start_y: 2.0, end_y: 8.0, speed: 2.0 },
                MoveFallingSpike { x: 8.0, start_y: 4.0, end_y: 12.0, speed: 2.5 },
                Elevator { x: -4.0, start_y: -8.0, end_y: 4.0, speed: 3.0 },
                Elevator { x: 4.0, start_y: -6.0, end_y: 4.0, speed: 3.0 },
                Elevator { x: 16.0, start_y: -4.0, end_y: 4.0, speed: 3.0 },
                Trampoline { x: -8.0, y: -9.0 },
                Trampoline { x: 8.0, y: -9.0 },
                Trampoline { x: 22.0, y: -9.0 },
                Snail { x: -15.0, y: -9.0 },
                Snail { x: 0.0, y: -9.0 },
                Snail { x: 15.0, y: -9.0 },
                Snail { x: 30.0, y: -9.0 },
                Fly { x: -18.0, y: 2.0, left: -8.0, right: 0.0 },
                Fly { x: 10.0, y: 6.0, left: 8.0, right: 4.0 },
                Coin { x: -8.0, y: 1.0 },
                Coin { x: 8.0, y: 3.0 },
                Door { x: 24.0, y: 6.0 },
            ],
        },
        LevelDef {
            name: "summit".to_string(),
            actions: vec![
                Background { name: "background3".to_string() },
                Spawn { x: -17.0, y: -8.0 },
                Ground { x: -14.0, y: -10.0, half_width: 8.0, half_height: 1.0 },
                Ground { x: 2.0, y: -10.0, half_width: 8.0, half_height: 1.0 },
                Ground { x: 16.0, y: -10.0, half_width: 8.0, half_height: 1.0 },
                Ground { x: -6.0, y: -8.0, half_width: 2.0, half_height: 0.5 },
                Ground { x: 4.0, y: -3.0, half_width: 2.0, half_height: 0.5 },
                Ground { x: 12.0, y: -6.0, half_width: 2.0, half_height: 0.5 },
                FallingSpike { x: -15.0, y: 5.0 },
                FallingSpike { x: -4.0, y: 6.0 },
                FallingSpike { x: 6.0, y: 7.0 },
                FallingSpike { x: 14.0, y: 8.0 },
                MoveFallingSpike { x: -12.0, start_y: -4.0, end_y: 5.0, speed: 2.0 },
                MoveFallingSpike { x: 0.0, start_y: 4.0, end_y: 12.0, speed: 2.5 },
                MoveFallingSpike { x: 8.0, start_y: 6.0, end_y: 16.0, speed: 3.0 },
                Elevator { x: -2.0, start_y: -8.0, end_y: 4.0, speed: 2.0 },
                Trampoline { x: 8.0, y: -9.0 },
                Trampoline { x: 16.0, y: -9.0 },
                Snail { x: 2.0, y: -8.0 },
                Snail { x: 12.0, y: -8.0 },
                Fly { x: -8.0, y: 3.0, left: -10.0, right: 1.0 },
                Fly { x: 14.0, y: 7.0, left: 12.0, right: 5.0 },
                Coin { x: -6.0, y: -4.0 },
                Coin { x: 12.0, y: -5.0 },
                HealthCollectible { x: 4.0, y: -2.0 },
                Door { x: 20.0, y: -8.0 },
            ],
        },
    ]
}
