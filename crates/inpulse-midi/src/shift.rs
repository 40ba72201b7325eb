//! Shift layer for the transport buttons
//!
//! Each side has its own shift button. While it is held the controller also
//! re-sends the transport buttons on the shift channel (base status + 3), so
//! a transport press counts as shifted if either is true.

use crate::engine::{EngineControl, MixingEngine};
use crate::types::{DeckChannel, DeckSlot};

/// Shift state for one side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShiftState {
    #[default]
    Unshifted,
    Shifted,
}

impl ShiftState {
    pub fn from_held(held: bool) -> Self {
        if held {
            Self::Shifted
        } else {
            Self::Unshifted
        }
    }

    pub fn is_shifted(self) -> bool {
        self == Self::Shifted
    }
}

/// Shift state of both sides
#[derive(Debug, Clone, Copy, Default)]
pub struct ShiftButtons {
    /// Index 0 = left side, index 1 = right side
    held: [ShiftState; 2],
}

impl ShiftButtons {
    pub fn set(&mut self, slot: DeckSlot, held: bool) {
        self.held[slot.index()] = ShiftState::from_held(held);
    }

    pub fn get(&self, slot: DeckSlot) -> ShiftState {
        self.held[slot.index()]
    }
}

/// Transport buttons with a shift-layer function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TransportButton {
    Sync = 0x05,
    Cue = 0x06,
    Play = 0x07,
    Load = 0x0D,
}

impl TransportButton {
    /// Decode a button note (per-side buttons channel)
    pub fn from_note(note: u8) -> Option<Self> {
        match note {
            0x05 => Some(Self::Sync),
            0x06 => Some(Self::Cue),
            0x07 => Some(Self::Play),
            0x0D => Some(Self::Load),
            _ => None,
        }
    }

    /// What the button does in a shift state
    pub fn action(self, shift: ShiftState) -> TransportAction {
        match (self, shift) {
            (Self::Play, ShiftState::Unshifted) => TransportAction::TogglePlay,
            (Self::Play, ShiftState::Shifted) => TransportAction::PlayStutter,
            (Self::Cue, ShiftState::Unshifted) => TransportAction::Cue,
            (Self::Cue, ShiftState::Shifted) => TransportAction::StartPlay,
            (Self::Sync, ShiftState::Unshifted) => TransportAction::BeatSync,
            (Self::Sync, ShiftState::Shifted) => TransportAction::SyncKey,
            (Self::Load, ShiftState::Unshifted) => TransportAction::LoadTrack,
            (Self::Load, ShiftState::Shifted) => TransportAction::Eject,
        }
    }
}

/// Engine-side effect of a transport button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportAction {
    /// Flip `play` on press
    TogglePlay,
    PlayStutter,
    /// Hold-to-preview cue
    Cue,
    StartPlay,
    BeatSync,
    SyncKey,
    LoadTrack,
    Eject,
}

impl TransportAction {
    /// Engine control written by this action
    pub fn control(self) -> EngineControl {
        match self {
            Self::TogglePlay => EngineControl::Play,
            Self::PlayStutter => EngineControl::PlayStutter,
            Self::Cue => EngineControl::CueDefault,
            Self::StartPlay => EngineControl::StartPlay,
            Self::BeatSync => EngineControl::BeatSync,
            Self::SyncKey => EngineControl::SyncKey,
            Self::LoadTrack => EngineControl::LoadSelectedTrack,
            Self::Eject => EngineControl::Eject,
        }
    }

    /// Whether the release is forwarded to the engine
    ///
    /// Momentary controls get 1 on press and 0 on release; the rest only act
    /// on press.
    pub fn is_momentary(self) -> bool {
        !matches!(self, Self::TogglePlay | Self::PlayStutter)
    }

    /// Whether the action replaces or removes the channel's track
    pub fn changes_track(self) -> bool {
        matches!(self, Self::LoadTrack | Self::Eject)
    }

    /// Apply the action to a channel
    ///
    /// Returns false if the event was ignored (a release on a press-only action).
    pub fn apply<E: MixingEngine + ?Sized>(self, engine: &mut E, channel: DeckChannel, pressed: bool) -> bool {
        let control = self.control();
        match self {
            Self::TogglePlay if pressed => {
                let playing = engine.is_enabled(channel, control);
                engine.set_value(channel, control, if playing { 0.0 } else { 1.0 });
            }
            Self::PlayStutter if pressed => engine.set_value(channel, control, 1.0),
            _ if self.is_momentary() => {
                engine.set_value(channel, control, if pressed { 1.0 } else { 0.0 });
            }
            _ => return false,
        }
        true
    }
}
