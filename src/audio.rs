//! Audio cue dispatch
//!
//! The simulation only emits `AudioCue`s. `AudioManager` turns them into
//! calls on a backend and owns volume and mute state.

use std::path::{Path, PathBuf};

use crate::sim::{AudioCue, GameEvent};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Pickup collected
    Pickup,
}

/// Something that can make noise
pub trait AudioBackend {
    fn play_effect(&mut self, effect: SoundEffect, volume: f32);
    /// Start looping the background track
    fn play_music(&mut self, path: &Path, volume: f32);
    fn stop_music(&mut self);
}

/// Backend for headless runs; writes every request to the log
#[derive(Debug, Default)]
pub struct LogBackend;

impl AudioBackend for LogBackend {
    fn play_effect(&mut self, effect: SoundEffect, volume: f32) {
        log::debug!("sfx {effect:?} at {volume:.2}");
    }

    fn play_music(&mut self, path: &Path, volume: f32) {
        log::info!("Music {} at {volume:.2}", path.display());
    }

    fn stop_music(&mut self) {
        log::info!("Music stopped");
    }
}

/// Audio manager for the game
pub struct AudioManager<B: AudioBackend> {
    backend: B,
    /// None when the track is missing; effects still play
    music: Option<PathBuf>,
    master_volume: f32,
    sfx_volume: f32,
    music_volume: f32,
    muted: bool,
}

impl<B: AudioBackend> AudioManager<B> {
    pub fn new(backend: B, music: Option<&Path>) -> Self {
        let music = match music {
            Some(path) if path.is_file() => Some(path.to_path_buf()),
            Some(path) => {
                log::warn!("Music file {} not found - music disabled", path.display());
                None
            }
            None => None,
        };
        Self {
            backend,
            music,
            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.5,
            muted: false,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn music_enabled(&self) -> bool {
        self.music.is_some()
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn effective_volume(&self, channel: f32) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * channel
        }
    }

    pub fn play(&mut self, effect: SoundEffect) {
        let vol = self.effective_volume(self.sfx_volume);
        if vol <= 0.0 {
            return;
        }
        self.backend.play_effect(effect, vol);
    }

    /// React to a simulation event; non-audio events are ignored
    pub fn handle(&mut self, event: &GameEvent) {
        let GameEvent::Audio(cue) = event else {
            return;
        };
        match cue {
            AudioCue::PlayPickup => self.play(SoundEffect::Pickup),
            AudioCue::StartMusic => {
                let vol = self.effective_volume(self.music_volume);
                if let Some(path) = &self.music {
                    self.backend.play_music(path, vol);
                }
            }
            AudioCue::StopMusic => {
                if self.music.is_some() {
                    self.backend.stop_music();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::CollectibleKind;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
        volumes: Vec<f32>,
    }

    impl AudioBackend for Recorder {
        fn play_effect(&mut self, effect: SoundEffect, volume: f32) {
            self.calls.push(format!("{effect:?}"));
            self.volumes.push(volume);
        }
        fn play_music(&mut self, _path: &Path, volume: f32) {
            self.calls.push("music".to_string());
            self.volumes.push(volume);
        }
        fn stop_music(&mut self) {
            self.calls.push("stop".to_string());
        }
    }

    #[test]
    fn test_missing_music_disables_music_only() {
        let missing = std::env::temp_dir().join("rat_rider_no_such_track.ogg");
        let mut audio = AudioManager::new(Recorder::default(), Some(&missing));
        assert!(!audio.music_enabled());

        audio.handle(&GameEvent::Audio(AudioCue::StartMusic));
        audio.handle(&GameEvent::Audio(AudioCue::PlayPickup));
        audio.handle(&GameEvent::Audio(AudioCue::StopMusic));
        assert_eq!(audio.backend().calls, vec!["Pickup"]);
    }

    #[test]
    fn test_music_cues_reach_backend() {
        let track = std::env::temp_dir().join(format!("rat_rider_track_{}.ogg", std::process::id()));
        std::fs::write(&track, b"").unwrap();
        let mut audio = AudioManager::new(Recorder::default(), Some(&track));
        assert!(audio.music_enabled());

        audio.handle(&GameEvent::Audio(AudioCue::StartMusic));
        audio.handle(&GameEvent::Collected(CollectibleKind::ScoreSmall));
        audio.handle(&GameEvent::Audio(AudioCue::StopMusic));
        assert_eq!(audio.backend().calls, vec!["music", "stop"]);
        let _ = std::fs::remove_file(&track);
    }

    #[test]
    fn test_master_volume_scales_channels() {
        let track = std::env::temp_dir().join(format!("rat_rider_vol_{}.ogg", std::process::id()));
        std::fs::write(&track, b"").unwrap();
        let mut audio = AudioManager::new(Recorder::default(), Some(&track));
        audio.set_master_volume(0.4);
        audio.handle(&GameEvent::Audio(AudioCue::PlayPickup));
        audio.handle(&GameEvent::Audio(AudioCue::StartMusic));

        let volumes = &audio.backend().volumes;
        assert!((volumes[0] - 0.4).abs() < 1e-6);
        assert!((volumes[1] - 0.2).abs() < 1e-6);

        audio.set_master_volume(3.0);
        audio.handle(&GameEvent::Audio(AudioCue::PlayPickup));
        assert!((audio.backend().volumes[2] - 1.0).abs() < 1e-6);
        let _ = std::fs::remove_file(&track);
    }

    #[test]
    fn test_muted_skips_effects() {
        let mut audio = AudioManager::new(Recorder::default(), None);
        audio.set_muted(true);
        audio.handle(&GameEvent::Audio(AudioCue::PlayPickup));
        assert!(audio.backend().calls.is_empty());
    }
}
