//! Keyed registry of loaded sound-effect clips.
//!
//! # Design
//! Playback itself belongs to the host's audio subsystem, reached through
//! `ClipLoader` and `Clip`. The registry only remembers which clips are
//! already loaded. A clip that is stale or fails to play is evicted and
//! loaded again, once; a second failure is returned to the caller.
//! Single-threaded by construction (`&mut self`); no size bound or expiry.

use std::collections::HashMap;

use thiserror::Error;
use tracing::{debug, warn};

use crate::preferences::SoundPreferences;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AudioError {
    #[error("failed to load clip {name}: {reason}")]
    Load { name: String, reason: String },

    #[error("clip {0} is no longer loaded")]
    Stale(String),

    #[error("playback of {name} failed: {reason}")]
    Playback { name: String, reason: String },
}

/// A loaded, replayable sound.
pub trait Clip {
    fn is_loaded(&self) -> bool;
    fn rewind(&mut self) -> Result<(), AudioError>;
    fn play(&mut self) -> Result<(), AudioError>;
}

pub trait ClipLoader {
    type Clip: Clip;

    fn load(&mut self, name: &str) -> Result<Self::Clip, AudioError>;
}

/// The fixed set of bundled effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundEffect {
    Tap,
    Success,
    Error,
    LevelUp,
    Badge,
}

impl SoundEffect {
    pub fn file_name(self) -> &'static str {
        match self {
            SoundEffect::Tap => "tap.mp3",
            SoundEffect::Success => "success.mp3",
            SoundEffect::Error => "error.mp3",
            SoundEffect::LevelUp => "level_up.mp3",
            SoundEffect::Badge => "badge.mp3",
        }
    }
}

pub struct ClipRegistry<L: ClipLoader> {
    loader: L,
    clips: HashMap<String, L::Clip>,
}

impl<L: ClipLoader> ClipRegistry<L> {
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            clips: HashMap::new(),
        }
    }

    /// Return the cached clip for `name`, loading it on first use.
    pub fn get_or_create(&mut self, name: &str) -> Result<&mut L::Clip, AudioError> {
        if !self.clips.contains_key(name) {
            debug!(clip = name, "loading clip");
            let clip = self.loader.load(name)?;
            self.clips.insert(name.to_string(), clip);
        }
        self.clips
            .get_mut(name)
            .ok_or_else(|| AudioError::Stale(name.to_string()))
    }

    /// Drop the cached clip for `name`. Returns whether one was cached.
    pub fn evict(&mut self, name: &str) -> bool {
        self.clips.remove(name).is_some()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.clips.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    /// Replay `name` from the start, reloading it once on failure.
    pub fn play(&mut self, name: &str) -> Result<(), AudioError> {
        match self.try_play(name) {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!(clip = name, error = %e, "clip failed, reloading");
                self.evict(name);
                self.try_play(name)
            }
        }
    }

    /// Play `effect` unless sound effects are switched off.
    pub fn play_effect(
        &mut self,
        effect: SoundEffect,
        prefs: &SoundPreferences,
    ) -> Result<(), AudioError> {
        if !prefs.effects_enabled {
            return Ok(());
        }
        self.play(effect.file_name())
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    fn try_play(&mut self, name: &str) -> Result<(), AudioError> {
        let clip = self.get_or_create(name)?;
        if !clip.is_loaded() {
            return Err(AudioError::Stale(name.to_string()));
        }
        clip.rewind()?;
        clip.play()
    }
}
