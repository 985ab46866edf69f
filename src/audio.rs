//! Sound effect service over a pluggable backend
//!
//! The simulation core only names effects; this service owns clip loading
//! and playback. Each effect gets a small pool of clips played round-robin
//! so rapid retriggers overlap instead of cutting each other off. A clip
//! that fails to load logs once and stays silent.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::consts::CLIP_POOL_SIZE;

/// Backend-assigned handle for one loaded clip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClipId(pub u32);

/// Every sound effect the game can request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundEffect {
    /// Enemy stomped
    Splat,
    /// Trampoline bounce
    Jump,
    /// Health gem collected
    Popcart,
    /// Game over
    Trombone,
    /// Campaign finished
    OrchestralWin,
}

impl SoundEffect {
    pub const ALL: [SoundEffect; 5] = [
        SoundEffect::Splat,
        SoundEffect::Jump,
        SoundEffect::Popcart,
        SoundEffect::Trombone,
        SoundEffect::OrchestralWin,
    ];

    fn path(self) -> &'static str {
        match self {
            SoundEffect::Splat => "data/splat.wav",
            SoundEffect::Jump => "data/jump.wav",
            SoundEffect::Popcart => "data/popcart.wav",
            SoundEffect::Trombone => "data/sad_trombone.wav",
            SoundEffect::OrchestralWin => "data/orchestral_win.wav",
        }
    }
}

/// Looping track started on game start, stopped on pause and game over
pub const BACKGROUND_MUSIC_PATH: &str = "data/background.wav";

/// Platform audio hookup; the service never touches devices directly
pub trait AudioBackend {
    /// `None` on load failure; the service degrades to silence
    fn load(&mut self, path: &str) -> Option<ClipId>;
    fn play(&mut self, clip: ClipId);
    fn play_looping(&mut self, clip: ClipId);
    fn stop(&mut self, clip: ClipId);
}

struct Pool {
    clips: Vec<ClipId>,
    next: usize,
}

/// Owns the clip pools and the background music handle
pub struct AudioService {
    backend: Box<dyn AudioBackend>,
    pools: HashMap<SoundEffect, Pool>,
    music: Option<ClipId>,
}

impl AudioService {
    pub fn new(backend: Box<dyn AudioBackend>) -> Self {
        let mut service = Self {
            backend,
            pools: HashMap::new(),
            music: None,
        };
        service.preload();
        service
    }

    fn preload(&mut self) {
        for effect in SoundEffect::ALL {
            let mut clips = Vec::with_capacity(CLIP_POOL_SIZE);
            for _ in 0..CLIP_POOL_SIZE {
                match self.backend.load(effect.path()) {
                    Some(clip) => clips.push(clip),
                    None => {
                        log::warn!("failed to load sound clip {}", effect.path());
                        break;
                    }
                }
            }
            self.pools.insert(effect, Pool { clips, next: 0 });
        }
        self.music = self.backend.load(BACKGROUND_MUSIC_PATH);
        if self.music.is_none() {
            log::warn!("failed to load background music {BACKGROUND_MUSIC_PATH}");
        }
    }

    /// Round-robin playback from the effect's pool; silent if nothing loaded
    pub fn play_one_shot(&mut self, effect: SoundEffect) {
        let Some(pool) = self.pools.get_mut(&effect) else {
            return;
        };
        if pool.clips.is_empty() {
            log::debug!("dropping {effect:?}, no clips loaded");
            return;
        }
        let clip = pool.clips[pool.next];
        pool.next = (pool.next + 1) % pool.clips.len();
        self.backend.play(clip);
    }

    pub fn music_start(&mut self) {
        if let Some(music) = self.music {
            self.backend.play_looping(music);
        }
    }

    pub fn music_stop(&mut self) {
        if let Some(music) = self.music {
            self.backend.stop(music);
        }
    }
}

/// Everything the backend was asked to do, for headless runs and tests
#[derive(Debug, Default)]
pub struct BackendLog {
    pub loaded: Vec<String>,
    pub played: Vec<ClipId>,
    pub looped: Vec<ClipId>,
    pub stopped: Vec<ClipId>,
}

/// Backend that records calls and produces no sound
pub struct NullBackend {
    next_id: u32,
    /// Paths that refuse to load, for degradation tests
    pub fail_paths: Vec<String>,
    log: Rc<RefCell<BackendLog>>,
}

impl NullBackend {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            fail_paths: Vec::new(),
            log: Rc::new(RefCell::new(BackendLog::default())),
        }
    }

    /// Shared view of the call log, kept after the backend is boxed
    pub fn log(&self) -> Rc<RefCell<BackendLog>> {
        Rc::clone(&self.log)
    }
}

impl Default for NullBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioBackend for NullBackend {
    fn load(&mut self, path: &str) -> Option<ClipId> {
        if self.fail_paths.iter().any(|p| p == path) {
            return None;
        }
        let clip = ClipId(self.next_id);
        self.next_id += 1;
        self.log.borrow_mut().loaded.push(path.to_string());
        Some(clip)
    }

    fn play(&mut self, clip: ClipId) {
        self.log.borrow_mut().played.push(clip);
    }

    fn play_looping(&mut self, clip: ClipId) {
        self.log.borrow_mut().looped.push(clip);
    }

    fn stop(&mut self, clip: ClipId) {
        self.log.borrow_mut().stopped.push(clip);
    }
}
