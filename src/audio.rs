use std::io::{self, Write};

pub const DEFAULT_VOLUME: f32 = 0.2;

/// Fire-and-forget sound output. Implementations must swallow their own failures.
pub trait AudioSink {
    fn play(&mut self, name: &str, volume: f32);

    /// Play the hit effect from position zero, cutting off any earlier hit still sounding
    fn play_hit(&mut self);
}

impl<A: AudioSink + ?Sized> AudioSink for Box<A> {
    fn play(&mut self, name: &str, volume: f32) {
        (**self).play(name, volume)
    }

    fn play_hit(&mut self) {
        (**self).play_hit()
    }
}

/// Rings the terminal bell. A bell has no playback position, so restarting
/// the hit effect is just ringing it again.
#[derive(Debug, Clone, Copy)]
pub struct TerminalBell {
    volume: f32,
}

impl TerminalBell {
    pub fn new(volume: f32) -> Self {
        Self { volume }
    }

    fn ring(volume: f32) {
        if volume <= 0.0 {
            return;
        }
        let mut out = io::stdout();
        let _ = out.write_all(b"\x07").and_then(|_| out.flush());
    }
}

impl Default for TerminalBell {
    fn default() -> Self {
        Self::new(DEFAULT_VOLUME)
    }
}

impl AudioSink for TerminalBell {
    fn play(&mut self, name: &str, volume: f32) {
        tracing::trace!(sound = name, volume, "bell");
        Self::ring(volume);
    }

    fn play_hit(&mut self) {
        Self::ring(self.volume);
    }
}

/// Used for `--mute`
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl AudioSink for Silent {
    fn play(&mut self, _name: &str, _volume: f32) {}
    fn play_hit(&mut self) {}
}

#[derive(Debug, Clone, PartialEq)]
pub enum Played {
    Named { name: String, volume: f32 },
    /// Hit effect, always from position zero
    HitFromStart,
}

/// Test double that records every request
#[derive(Debug, Clone, Default)]
pub struct RecordingAudio {
    pub played: Vec<Played>,
}

impl RecordingAudio {
    pub fn hit_count(&self) -> usize {
        self.played
            .iter()
            .filter(|p| matches!(p, Played::HitFromStart))
            .count()
    }
}

impl AudioSink for RecordingAudio {
    fn play(&mut self, name: &str, volume: f32) {
        self.played.push(Played::Named {
            name: name.to_string(),
            volume,
        });
    }

    fn play_hit(&mut self) {
        self.played.push(Played::HitFromStart);
    }
}
