//! MIDI input handling
//!
//! Receives raw MIDI bytes from the midir callback, parses them with midly,
//! decodes the Inpulse 500 addressing scheme into [`ControllerInput`] and
//! forwards parsed events to the controller thread via flume.

use crate::connection::{MidiConnection, MidiConnectionError};
use crate::leds::{status, PAD_MODE_SELECT_BASE};
use crate::runtime::HostEvent;
use crate::shift::TransportButton;
use crate::types::{DeckChannel, DeckSlot};
use flume::Sender;
use midir::MidiInputConnection;
use midly::live::LiveEvent;
use midly::MidiMessage;

/// Note of the shift button (per side, on the buttons channel)
const SHIFT_NOTE: u8 = 0x04;

/// First slicer pad note (pad mode 3)
const SLICER_PAD_BASE: u8 = 0x20;

/// Slicer pad notes including the shift layer
const SLICER_PAD_NOTES: std::ops::RangeInclusive<u8> = 0x20..=0x2F;

/// Raw MIDI input event (before controller decoding)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiInputEvent {
    /// Note On message
    NoteOn { channel: u8, note: u8, velocity: u8 },
    /// Note Off message
    NoteOff { channel: u8, note: u8, velocity: u8 },
    /// Control Change message
    ControlChange { channel: u8, cc: u8, value: u8 },
}

impl MidiInputEvent {
    /// Parse raw MIDI bytes into an event
    ///
    /// Note On with velocity 0 is normalized to Note Off. Anything that is
    /// not a note or controller message is ignored.
    pub fn parse(data: &[u8]) -> Option<Self> {
        let event = match LiveEvent::parse(data) {
            Ok(event) => event,
            Err(e) => {
                log::trace!("[MIDI IN] unparseable message {:02x?}: {}", data, e);
                return None;
            }
        };

        let LiveEvent::Midi { channel, message } = event else {
            return None;
        };
        let channel = channel.as_int();

        match message {
            MidiMessage::NoteOn { key, vel } if vel.as_int() == 0 => Some(Self::NoteOff {
                channel,
                note: key.as_int(),
                velocity: 0,
            }),
            MidiMessage::NoteOn { key, vel } => Some(Self::NoteOn {
                channel,
                note: key.as_int(),
                velocity: vel.as_int(),
            }),
            MidiMessage::NoteOff { key, vel } => Some(Self::NoteOff {
                channel,
                note: key.as_int(),
                velocity: vel.as_int(),
            }),
            MidiMessage::Controller { controller, value } => Some(Self::ControlChange {
                channel,
                cc: controller.as_int(),
                value: value.as_int(),
            }),
            _ => None,
        }
    }

    /// Get the MIDI channel
    pub fn channel(&self) -> u8 {
        match self {
            Self::NoteOn { channel, .. } => *channel,
            Self::NoteOff { channel, .. } => *channel,
            Self::ControlChange { channel, .. } => *channel,
        }
    }

    /// Check if this is a "press" event (Note On or CC > threshold)
    pub fn is_press(&self) -> bool {
        match self {
            Self::NoteOn { velocity, .. } => *velocity > 0,
            Self::ControlChange { value, .. } => *value > 63,
            Self::NoteOff { .. } => false,
        }
    }
}

/// Decoded controller input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerInput {
    /// Slicer pad, raw index from the first slicer note
    ///
    /// Shift-layer pads decode to indices 8-15, which the slicer rejects.
    SlicerPad { slot: DeckSlot, pad: usize, pressed: bool },
    /// One of the eight pad-mode select buttons (mode 1-8)
    PadModeSelect { slot: DeckSlot, mode: u8, pressed: bool },
    /// Shift button
    Shift { slot: DeckSlot, held: bool },
    /// Transport button, `shift_layer` set when it arrived on the hardware
    /// shift channel
    Transport {
        slot: DeckSlot,
        button: TransportButton,
        shift_layer: bool,
        pressed: bool,
    },
    /// FX1-FX4 used as deck selectors
    DeckSelect { channel: DeckChannel, pressed: bool },
}

impl ControllerInput {
    /// Decode a parsed MIDI event using the Inpulse 500 addressing scheme
    pub fn decode(event: &MidiInputEvent) -> Option<Self> {
        let (status_channel, note, pressed) = match *event {
            MidiInputEvent::NoteOn { channel, note, .. } => (channel, note, event.is_press()),
            MidiInputEvent::NoteOff { channel, note, .. } => (channel, note, false),
            MidiInputEvent::ControlChange { .. } => return None,
        };
        let status_byte = 0x90 | status_channel;

        match status_byte {
            status::MIXER_BUTTONS => {
                let channel = note.checked_sub(0x13).and_then(DeckChannel::new)?;
                Some(Self::DeckSelect { channel, pressed })
            }
            s if side_of(s, status::BUTTONS).is_some() => {
                let slot = side_of(s, status::BUTTONS)?;
                match note {
                    SHIFT_NOTE => Some(Self::Shift { slot, held: pressed }),
                    n if (PAD_MODE_SELECT_BASE..PAD_MODE_SELECT_BASE + 8).contains(&n) => {
                        Some(Self::PadModeSelect {
                            slot,
                            mode: n - PAD_MODE_SELECT_BASE + 1,
                            pressed,
                        })
                    }
                    n => TransportButton::from_note(n).map(|button| Self::Transport {
                        slot,
                        button,
                        shift_layer: false,
                        pressed,
                    }),
                }
            }
            s if side_of(s, status::SHIFTED_BUTTONS).is_some() => {
                let slot = side_of(s, status::SHIFTED_BUTTONS)?;
                TransportButton::from_note(note).map(|button| Self::Transport {
                    slot,
                    button,
                    shift_layer: true,
                    pressed,
                })
            }
            s if side_of(s, status::PADS).is_some() => {
                let slot = side_of(s, status::PADS)?;
                SLICER_PAD_NOTES.contains(&note).then(|| Self::SlicerPad {
                    slot,
                    pad: (note - SLICER_PAD_BASE) as usize,
                    pressed,
                })
            }
            _ => None,
        }
    }
}

/// Side for a status byte relative to a per-side base status
fn side_of(status: u8, base: u8) -> Option<DeckSlot> {
    status.checked_sub(base).and_then(DeckSlot::from_side)
}

/// Callback data passed to midir
struct CallbackData {
    event_tx: Sender<HostEvent>,
}

/// MIDI input handler
///
/// Owns the midir connection and forwards parsed events to the controller.
pub struct MidiInputHandler {
    /// The midir connection (kept alive for the duration)
    _connection: MidiInputConnection<CallbackData>,
}

impl MidiInputHandler {
    /// Connect to a MIDI port with our callback
    pub fn connect(port_match: &str, event_tx: Sender<HostEvent>) -> Result<Self, MidiConnectionError> {
        let (midi_in, port) = MidiConnection::find_input_port(port_match)?;

        let connection = midi_in
            .connect(
                &port,
                "inpulse-midi-input",
                Self::midi_callback,
                CallbackData { event_tx },
            )
            .map_err(|e| MidiConnectionError::ConnectionError(e.to_string()))?;

        log::info!("MIDI: Input handler connected");

        Ok(Self {
            _connection: connection,
        })
    }

    /// The midir callback function
    ///
    /// Called from the MIDI driver thread whenever a message is received.
    /// Must be fast and non-blocking.
    fn midi_callback(_timestamp: u64, data: &[u8], callback_data: &mut CallbackData) {
        let Some(event) = MidiInputEvent::parse(data) else {
            return;
        };

        log::debug!("[MIDI IN] {:?}", event);

        if callback_data.event_tx.try_send(HostEvent::Midi(event)).is_err() {
            log::warn!("MIDI: Event channel full, dropping message");
        }
    }
}
