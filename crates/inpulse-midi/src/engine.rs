//! Mixing engine control surface
//!
//! The host application owns the engine. This crate only reads and writes
//! named per-channel controls and registers observers for the few controls it
//! needs change notifications for (`beat_active`, `play_latched`).
//!
//! Observer notifications come back into the controller as [`EngineEvent`]s;
//! the engine never calls into the controller directly.

use crate::types::DeckChannel;

/// Engine controls used by the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineControl {
    // Readings
    /// Current (rate-adjusted) tempo
    Bpm,
    /// Tempo from the track's beatgrid, independent of pitch
    FileBpm,
    /// Fraction of the current beat already played (0.0-1.0)
    BeatDistance,
    /// Normalized play position (0.0-1.0)
    PlayPosition,
    /// Track duration in seconds
    Duration,
    LoopEnabled,
    BeatClosest,
    BeatNext,
    /// Toggles on every beat crossing (observed, not read)
    BeatActive,
    PlayLatched,

    // Commands
    ReloopToggle,
    SlipEnabled,
    /// Signed (possibly fractional) jump in beats
    BeatJump,
    Play,
    PlayStutter,
    CueDefault,
    StartPlay,
    BeatSync,
    SyncKey,
    LoadSelectedTrack,
    Eject,
}

impl EngineControl {
    /// Engine key name
    pub fn key(self) -> &'static str {
        match self {
            Self::Bpm => "bpm",
            Self::FileBpm => "file_bpm",
            Self::BeatDistance => "beat_distance",
            Self::PlayPosition => "playposition",
            Self::Duration => "duration",
            Self::LoopEnabled => "loop_enabled",
            Self::BeatClosest => "beat_closest",
            Self::BeatNext => "beat_next",
            Self::BeatActive => "beat_active",
            Self::PlayLatched => "play_latched",
            Self::ReloopToggle => "reloop_toggle",
            Self::SlipEnabled => "slip_enabled",
            Self::BeatJump => "beatjump",
            Self::Play => "play",
            Self::PlayStutter => "play_stutter",
            Self::CueDefault => "cue_default",
            Self::StartPlay => "start_play",
            Self::BeatSync => "beatsync",
            Self::SyncKey => "sync_key",
            Self::LoadSelectedTrack => "LoadSelectedTrack",
            Self::Eject => "eject",
        }
    }
}

/// Handle for an observer registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(pub u64);

/// Change notification for an observed control
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineEvent {
    pub channel: DeckChannel,
    pub control: EngineControl,
    pub value: f64,
}

/// Host mixing engine
///
/// Reads of unknown or unavailable values should return `f64::NAN`; the
/// controller treats non-finite readings as invalid input.
pub trait MixingEngine {
    /// Read a control value
    fn get_value(&self, channel: DeckChannel, control: EngineControl) -> f64;

    /// Write a control value
    fn set_value(&mut self, channel: DeckChannel, control: EngineControl, value: f64);

    /// Register for change notifications on a control
    fn connect(&mut self, channel: DeckChannel, control: EngineControl) -> ConnectionId;

    /// Drop an observer registration
    fn disconnect(&mut self, connection: ConnectionId);

    /// Read a boolean control
    fn is_enabled(&self, channel: DeckChannel, control: EngineControl) -> bool {
        self.get_value(channel, control) > 0.0
    }
}
