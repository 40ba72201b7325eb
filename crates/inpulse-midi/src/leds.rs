//! LED addressing for the Inpulse 500
//!
//! Most LED messages are `(base status + side, code, value)` where side is 0
//! for the left deck and 1 for the right. Only the addresses and colors this
//! crate drives are listed here.

use crate::output::ShortMessage;
use crate::types::{DeckChannel, DeckSlot};

/// Base status bytes (add the side offset for per-deck addresses)
pub mod status {
    /// Mixer section buttons (FX deck selectors, browser), not side-offset
    pub const MIXER_BUTTONS: u8 = 0x90;
    /// Per-deck buttons (shift, transport, pad mode select)
    pub const BUTTONS: u8 = 0x91;
    /// Transport buttons on the hardware shift layer
    pub const SHIFTED_BUTTONS: u8 = 0x94;
    /// Pad grid
    pub const PADS: u8 = 0x96;
    /// Tempo and beat-align guide LEDs
    pub const BEAT_INDICATORS: u8 = 0x91;
    /// Deck number indicator
    pub const MASTER_LIGHTS: u8 = 0x91;
    /// Global knob/state channel
    pub const KNOBS: u8 = 0xB0;
}

/// Plain on/off LED values
pub const LED_ON: u8 = 0x7F;
pub const LED_OFF: u8 = 0x00;

/// Single-color indicator LEDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Light {
    BeatAlignFwd = 0x1C,
    BeatAlignRev = 0x1D,
    TempoUp = 0x1E,
    TempoDown = 0x1F,
    Tempo = 0x2C,
    BeatAlign = 0x2D,
    DeckIndicator = 0x30,
}

impl Light {
    /// Message switching this light on one deck side
    pub fn message(self, slot: DeckSlot, on: bool) -> ShortMessage {
        ShortMessage::new(
            status::BEAT_INDICATORS + slot.index() as u8,
            self as u8,
            if on { LED_ON } else { LED_OFF },
        )
    }
}

/// Pad color codes
pub mod color {
    pub const BLUE: u8 = 0x03;
    pub const WHITE: u8 = 0x7F;
    /// Slicer "triggered" pad value
    pub const TRIGGERED: u8 = 0x62;
}

/// Pad mode that hosts the slicer
pub const SLICER_PAD_MODE: u8 = 3;

/// Note of the first pad-mode select button
pub const PAD_MODE_SELECT_BASE: u8 = 0x0F;

/// Pad note for a mode (1-8) and pad (1-8)
///
/// Each mode owns 16 consecutive notes: 8 pads, then the same 8 pads on the
/// shift layer.
pub fn pad_code(pad_mode: u8, pad_number: u8, shifted: bool) -> u8 {
    let code = (pad_mode - 1) * 16 + (pad_number - 1);
    if shifted {
        code + 8
    } else {
        code
    }
}

/// Message setting a slicer pad (0-based) to a color
pub fn slicer_pad_message(slot: DeckSlot, pad: usize, value: u8) -> ShortMessage {
    ShortMessage::new(
        status::PADS + slot.index() as u8,
        pad_code(SLICER_PAD_MODE, pad as u8 + 1, false),
        value,
    )
}

/// Message for the deck number indicator of one side
pub fn deck_indicator_message(slot: DeckSlot, on: bool) -> ShortMessage {
    ShortMessage::new(
        status::MASTER_LIGHTS + slot.index() as u8,
        Light::DeckIndicator as u8,
        if on { LED_ON } else { LED_OFF },
    )
}

/// FX button note used as deck selector for a channel (FX1-FX4)
pub fn deck_selector_note(channel: DeckChannel) -> u8 {
    0x13 + channel.number()
}

/// Message lighting a deck selector button
pub fn deck_selector_message(channel: DeckChannel, on: bool) -> ShortMessage {
    ShortMessage::new(
        status::MIXER_BUTTONS,
        deck_selector_note(channel),
        if on { LED_ON } else { LED_OFF },
    )
}
