//! Sound effect and music switches persisted in the key-value store.

use serde::Serialize;

use crate::storage::{KeyValueStore, StorageError};

pub const SOUND_EFFECTS_KEY: &str = "soundEnabled";
pub const MUSIC_KEY: &str = "musicEnabled";

/// Sound effect and background music toggles. Both default to on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SoundPreferences {
    pub effects_enabled: bool,
    pub music_enabled: bool,
}

impl Default for SoundPreferences {
    fn default() -> Self {
        Self {
            effects_enabled: true,
            music_enabled: true,
        }
    }
}

impl SoundPreferences {
    /// Only a stored `"false"` turns a flag off.
    pub fn load(store: &impl KeyValueStore) -> Result<Self, StorageError> {
        Ok(Self {
            effects_enabled: read_flag(store, SOUND_EFFECTS_KEY)?,
            music_enabled: read_flag(store, MUSIC_KEY)?,
        })
    }

    pub fn set_effects_enabled(
        &mut self,
        store: &mut impl KeyValueStore,
        enabled: bool,
    ) -> Result<(), StorageError> {
        store.set(SOUND_EFFECTS_KEY, flag(enabled))?;
        self.effects_enabled = enabled;
        Ok(())
    }

    pub fn set_music_enabled(
        &mut self,
        store: &mut impl KeyValueStore,
        enabled: bool,
    ) -> Result<(), StorageError> {
        store.set(MUSIC_KEY, flag(enabled))?;
        self.music_enabled = enabled;
        Ok(())
    }

    pub fn toggle_effects(&mut self, store: &mut impl KeyValueStore) -> Result<bool, StorageError> {
        let enabled = !self.effects_enabled;
        self.set_effects_enabled(store, enabled)?;
        Ok(enabled)
    }

    pub fn toggle_music(&mut self, store: &mut impl KeyValueStore) -> Result<bool, StorageError> {
        let enabled = !self.music_enabled;
        self.set_music_enabled(store, enabled)?;
        Ok(enabled)
    }
}

fn read_flag(store: &impl KeyValueStore, key: &str) -> Result<bool, StorageError> {
    Ok(store.get(key)?.as_deref() != Some("false"))
}

fn flag(enabled: bool) -> &'static str {
    if enabled {
        "true"
    } else {
        "false"
    }
}
