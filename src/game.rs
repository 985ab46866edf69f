//! Game controller: level flow, saved stats, pause, and wall-clock timers
//!
//! The controller owns the level sequence and everything that outlives a
//! single level: health and coins carried between levels, the pause flag,
//! the audio service, and deadline timers (invincibility window, help
//! banner). Timers run on the wall clock and keep counting while paused.

use crate::audio::{AudioBackend, AudioService, SoundEffect};
use crate::consts::*;
use crate::levels::{self, LevelDef};
use crate::platform::Clock;
use crate::sim::{GameEvent, GameWorld, RenderItem};

/// Top-level flow state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Menu,
    Playing,
    GameOver,
    Credits,
}

/// Abstract input commands, mapped from keys by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    MoveLeft,
    MoveRight,
    StopLeft,
    StopRight,
    Jump,
    TogglePause,
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerEvent {
    InvincibilityOff,
    BannerOff,
}

/// Everything the HUD draws each frame
#[derive(Debug, Clone, Copy)]
pub struct HudModel {
    pub health: u32,
    pub coins: u32,
    pub score: u32,
    pub elapsed_ms: u64,
    pub banner_visible: bool,
    pub paused: bool,
}

pub struct Game {
    levels: Vec<LevelDef>,
    current_level: usize,
    /// Stats snapshotted at each level entry; restored on level load
    saved_health: u32,
    saved_coins: u32,
    start_time_ms: u64,
    world: Option<GameWorld>,
    paused: bool,
    phase: Phase,
    audio: AudioService,
    clock: Box<dyn Clock>,
    /// Absolute deadlines in wall-clock milliseconds
    timers: Vec<(u64, TimerEvent)>,
    banner_visible: bool,
}

impl Game {
    pub fn new(backend: Box<dyn AudioBackend>, clock: Box<dyn Clock>) -> Self {
        Self::with_levels(levels::campaign(), backend, clock)
    }

    /// Run an arbitrary level sequence instead of the shipped campaign
    pub fn with_levels(
        levels: Vec<LevelDef>,
        backend: Box<dyn AudioBackend>,
        clock: Box<dyn Clock>,
    ) -> Self {
        Self {
            levels,
            current_level: 0,
            saved_health: MAX_HEALTH,
            saved_coins: 0,
            start_time_ms: 0,
            world: None,
            paused: false,
            phase: Phase::Menu,
            audio: AudioService::new(backend),
            clock,
            timers: Vec::new(),
            banner_visible: false,
        }
    }

    /// Begin a fresh campaign from the first level
    pub fn start_game(&mut self) {
        self.phase = Phase::Playing;
        self.paused = false;
        self.current_level = 0;
        self.saved_health = MAX_HEALTH;
        self.saved_coins = 0;
        self.timers.clear();
        self.start_time_ms = self.clock.now_ms();
        self.banner_visible = true;
        self.timers
            .push((self.start_time_ms + BANNER_MS, TimerEvent::BannerOff));
        self.audio.music_start();
        self.load_current_level();
        log::info!("game started");
    }

    /// Restart the campaign from the beginning, keeping nothing
    pub fn reset_game(&mut self) {
        log::info!("game reset");
        self.audio.music_stop();
        self.start_game();
    }

    fn load_current_level(&mut self) {
        let Some(def) = self.levels.get(self.current_level) else {
            log::error!("no level {} to load", self.current_level);
            self.world = None;
            self.phase = Phase::Menu;
            return;
        };
        match levels::build_world(def) {
            Ok(mut world) => {
                world.player.set_health(self.saved_health);
                world.player.set_coins(self.saved_coins);
                if !self.paused {
                    world.start();
                }
                self.world = Some(world);
            }
            Err(err) => {
                log::error!("failed to build level {}: {err}", self.current_level);
                self.world = None;
                // Fall back to the previous level; with none left, the menu
                if self.current_level > 0 {
                    self.current_level -= 1;
                    self.load_current_level();
                } else {
                    self.phase = Phase::Menu;
                }
            }
        }
    }

    /// Carry stats forward and advance; past the last level the campaign
    /// is won
    fn load_next_level(&mut self) {
        if let Some(world) = &self.world {
            self.saved_health = world.player.health();
            self.saved_coins = world.player.coins();
        }
        self.current_level += 1;
        if self.current_level >= self.levels.len() {
            log::info!("campaign complete");
            self.phase = Phase::Credits;
            self.world = None;
            self.audio.music_stop();
            self.audio.play_one_shot(SoundEffect::OrchestralWin);
            return;
        }
        self.load_current_level();
    }

    /// Stop everything where it stands and show the game-over screen
    fn freeze_game(&mut self) {
        log::info!("game over on level {}", self.current_level);
        self.phase = Phase::GameOver;
        if let Some(world) = &mut self.world {
            world.stop();
        }
        self.audio.music_stop();
        self.audio.play_one_shot(SoundEffect::Trombone);
    }

    fn toggle_pause(&mut self) {
        self.paused = !self.paused;
        if let Some(world) = &mut self.world {
            if self.paused {
                world.stop();
                self.audio.music_stop();
            } else {
                world.start();
                self.audio.music_start();
            }
        }
    }

    pub fn handle_input(&mut self, input: Input) {
        match input {
            Input::Reset => {
                if self.phase != Phase::Menu {
                    self.reset_game();
                }
                return;
            }
            Input::TogglePause => {
                if self.phase == Phase::Playing {
                    self.toggle_pause();
                }
                return;
            }
            _ => {}
        }
        if self.phase != Phase::Playing || self.paused {
            return;
        }
        let Some(world) = self.world.as_mut() else {
            return;
        };
        match input {
            Input::MoveLeft => world.player.move_left(&mut world.world),
            Input::MoveRight => world.player.move_right(&mut world.world),
            Input::StopLeft => {
                // Releasing a key must not cancel the other direction
                if world.player.is_moving_left() {
                    world.player.stop_moving(&mut world.world);
                }
            }
            Input::StopRight => {
                if world.player.is_moving_right() {
                    world.player.stop_moving(&mut world.world);
                }
            }
            Input::Jump => world.player.jump(&mut world.world),
            Input::TogglePause | Input::Reset => unreachable!(),
        }
    }

    /// One fixed simulation step plus timer polling; timers fire even while
    /// paused or frozen
    pub fn tick(&mut self) {
        let now = self.clock.now_ms();
        self.poll_timers(now);

        if self.phase != Phase::Playing || self.paused {
            return;
        }
        let events = match self.world.as_mut() {
            Some(world) => world.step(),
            None => return,
        };
        for event in events {
            match event {
                GameEvent::Sound(effect) => self.audio.play_one_shot(effect),
                GameEvent::InvincibilityStarted => {
                    self.timers
                        .push((now + INVINCIBILITY_MS, TimerEvent::InvincibilityOff));
                }
                GameEvent::ReachedDoor => {
                    self.load_next_level();
                    return;
                }
                GameEvent::PlayerLost => {
                    self.freeze_game();
                    return;
                }
            }
        }
        // Damage without a dedicated event still ends the run
        if self
            .world
            .as_ref()
            .is_some_and(|world| world.player.has_lost())
        {
            self.freeze_game();
        }
    }

    fn poll_timers(&mut self, now: u64) {
        let mut due = Vec::new();
        self.timers.retain(|&(deadline, event)| {
            if deadline <= now {
                due.push(event);
                false
            } else {
                true
            }
        });
        for event in due {
            match event {
                TimerEvent::InvincibilityOff => {
                    if let Some(world) = &mut self.world {
                        world.player.set_invincible(false);
                        log::debug!("invincibility expired");
                    }
                }
                TimerEvent::BannerOff => self.banner_visible = false,
            }
        }
    }

    // --- read-side views ----------------------------------------------

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn current_level(&self) -> usize {
        self.current_level
    }

    /// Running level simulation, if one is loaded
    pub fn world(&self) -> Option<&GameWorld> {
        self.world.as_ref()
    }

    pub fn world_mut(&mut self) -> Option<&mut GameWorld> {
        self.world.as_mut()
    }

    pub fn hud(&self) -> HudModel {
        let (health, coins, score) = match &self.world {
            Some(world) => (
                world.player.health(),
                world.player.coins(),
                world.player.score(),
            ),
            None => (
                self.saved_health,
                self.saved_coins,
                self.saved_coins * COIN_SCORE,
            ),
        };
        HudModel {
            health,
            coins,
            score,
            elapsed_ms: self.clock.now_ms().saturating_sub(self.start_time_ms),
            banner_visible: self.banner_visible,
            paused: self.paused,
        }
    }

    pub fn render_items(&self) -> Vec<RenderItem> {
        self.world
            .as_ref()
            .map(|world| world.render_items())
            .unwrap_or_default()
    }

    pub fn background(&self) -> Option<&str> {
        self.world.as_ref().map(|world| world.background.as_str())
    }
}

/// Elapsed time as `MM:SS` for the HUD
pub fn format_time(elapsed_ms: u64) -> String {
    let total_secs = elapsed_ms / 1000;
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::NullBackend;
    use crate::platform::ManualClock;
    use std::rc::Rc;

    fn game_with_clock() -> (Game, Rc<ManualClock>) {
        let clock = Rc::new(ManualClock::new());
        let game = Game::new(
            Box::new(NullBackend::new()),
            Box::new(Rc::clone(&clock)),
        );
        (game, clock)
    }

    #[test]
    fn start_game_enters_playing_with_a_world() {
        let (mut game, _clock) = game_with_clock();
        assert_eq!(game.phase(), Phase::Menu);
        game.start_game();
        assert_eq!(game.phase(), Phase::Playing);
        assert_eq!(game.current_level(), 0);
        assert!(game.world.is_some());
        assert!(game.hud().banner_visible);
    }

    #[test]
    fn starting_with_no_levels_stays_in_the_menu() {
        let clock = Rc::new(ManualClock::new());
        let mut game = Game::with_levels(
            Vec::new(),
            Box::new(NullBackend::new()),
            Box::new(Rc::clone(&clock)),
        );
        game.start_game();
        assert_eq!(game.phase(), Phase::Menu);
        assert!(game.world().is_none());
    }

    #[test]
    fn pause_stops_simulation_but_not_timers() {
        let (mut game, clock) = game_with_clock();
        game.start_game();
        game.handle_input(Input::TogglePause);
        assert!(game.is_paused());

        let before = game.render_items();
        for _ in 0..10 {
            game.tick();
        }
        let after = game.render_items();
        assert_eq!(before.len(), after.len());
        for (a, b) in before.iter().zip(&after) {
            assert_eq!(a.pos, b.pos, "paused world must not advance");
            assert_eq!(a.sprite, b.sprite);
        }

        // Banner timer still expires on the wall clock
        clock.advance(BANNER_MS + 1);
        game.tick();
        assert!(!game.hud().banner_visible);
    }

    #[test]
    fn invincibility_expires_on_the_wall_clock() {
        let (mut game, clock) = game_with_clock();
        game.start_game();
        let now = clock.now_ms();
        game.world.as_mut().unwrap().player.set_invincible(true);
        game.timers
            .push((now + INVINCIBILITY_MS, TimerEvent::InvincibilityOff));

        clock.advance(INVINCIBILITY_MS - 1);
        game.tick();
        assert!(game.world.as_ref().unwrap().player.is_invincible());

        clock.advance(2);
        game.tick();
        assert!(!game.world.as_ref().unwrap().player.is_invincible());
    }

    #[test]
    fn door_advances_level_and_carries_stats() {
        let (mut game, _clock) = game_with_clock();
        game.start_game();
        {
            let world = game.world.as_mut().unwrap();
            world.player.set_coins(5);
            world.player.set_health(3);
        }
        game.load_next_level();
        assert_eq!(game.current_level(), 1);
        assert_eq!(game.saved_coins, 5);
        assert_eq!(game.saved_health, 3);
        let world = game.world.as_ref().unwrap();
        assert_eq!(world.player.coins(), 5);
        assert_eq!(world.player.health(), 3);
    }

    #[test]
    fn finishing_the_last_level_wins() {
        let (mut game, _clock) = game_with_clock();
        game.start_game();
        game.current_level = game.levels.len() - 1;
        game.load_next_level();
        assert_eq!(game.phase(), Phase::Credits);
        assert!(game.world.is_none());
    }

    #[test]
    fn zero_health_freezes_the_game() {
        let (mut game, _clock) = game_with_clock();
        game.start_game();
        game.world.as_mut().unwrap().player.set_health(0);
        game.tick();
        assert_eq!(game.phase(), Phase::GameOver);
        assert!(!game.world.as_ref().unwrap().is_running());
        // Inputs no longer move the player
        let world = game.world.as_ref().unwrap();
        let before = world.player.velocity(&world.world);
        game.handle_input(Input::Jump);
        let world = game.world.as_ref().unwrap();
        assert_eq!(world.player.velocity(&world.world), before);
    }

    #[test]
    fn reset_restarts_from_level_one() {
        let (mut game, _clock) = game_with_clock();
        game.start_game();
        game.world.as_mut().unwrap().player.set_health(0);
        game.tick();
        assert_eq!(game.phase(), Phase::GameOver);

        game.handle_input(Input::Reset);
        assert_eq!(game.phase(), Phase::Playing);
        assert_eq!(game.current_level(), 0);
        assert_eq!(game.hud().health, MAX_HEALTH);
        assert_eq!(game.hud().coins, 0);
    }

    #[test]
    fn releasing_one_key_keeps_the_other_direction() {
        let (mut game, _clock) = game_with_clock();
        game.start_game();
        game.handle_input(Input::MoveRight);
        game.handle_input(Input::StopLeft);
        let world = game.world.as_ref().unwrap();
        assert_eq!(world.player.velocity(&world.world).x, PLAYER_SPEED);
    }

    #[test]
    fn hud_time_formatting() {
        assert_eq!(format_time(0), "00:00");
        assert_eq!(format_time(59_999), "00:59");
        assert_eq!(format_time(61_000), "01:01");
        assert_eq!(format_time(600_000), "10:00");
    }
}
