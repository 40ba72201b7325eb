//! MIDI output for LED feedback
//!
//! Everything the controller shows is a 3-byte short message. The controller
//! writes to any [`LedSink`]; [`MidiOutputHandler`] is the midir-backed sink
//! used with real hardware.

use midir::MidiOutputConnection;
use std::collections::HashMap;

/// 3-byte MIDI short message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShortMessage {
    pub status: u8,
    pub data1: u8,
    pub data2: u8,
}

impl ShortMessage {
    pub const fn new(status: u8, data1: u8, data2: u8) -> Self {
        Self {
            status,
            data1,
            data2,
        }
    }

    /// Wire bytes
    pub fn to_bytes(self) -> [u8; 3] {
        [self.status, self.data1, self.data2]
    }
}

/// Destination for LED messages
pub trait LedSink {
    /// Send one message
    fn send(&mut self, message: ShortMessage);

    /// Forget any cached LED state so the next sends go out unconditionally
    ///
    /// Called after deck rebinds and on init, when the hardware may show
    /// something other than what was last sent.
    fn invalidate(&mut self) {}
}

impl<T: LedSink + ?Sized> LedSink for Box<T> {
    fn send(&mut self, message: ShortMessage) {
        (**self).send(message)
    }

    fn invalidate(&mut self) {
        (**self).invalidate()
    }
}

/// Sink that drops everything (controller running without an output port)
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl LedSink for NullSink {
    fn send(&mut self, _message: ShortMessage) {}
}

/// Key for tracking last sent values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct MidiOutputKey {
    status: u8,
    data1: u8,
}

/// MIDI output handler for LED feedback
///
/// Only sends messages whose value differs from the last value sent to the
/// same address. The tempo guide re-evaluates four times a second, so most of
/// its output is suppressed here.
pub struct MidiOutputHandler {
    /// MIDI output connection
    connection: MidiOutputConnection,
    /// Last sent values (to avoid redundant sends)
    last_values: HashMap<MidiOutputKey, u8>,
}

impl MidiOutputHandler {
    /// Create a new output handler
    pub fn new(connection: MidiOutputConnection) -> Self {
        Self {
            connection,
            last_values: HashMap::new(),
        }
    }

    /// Force send a MIDI message (bypass change detection)
    pub fn send_forced(&mut self, message: ShortMessage) {
        log::debug!(
            "[MIDI OUT] {:#04x} {:#04x} {:#04x} (forced)",
            message.status,
            message.data1,
            message.data2
        );
        if let Err(e) = self.connection.send(&message.to_bytes()) {
            log::warn!("MIDI output: Failed to send message: {}", e);
        }
        self.last_values.insert(Self::key(&message), message.data2);
    }

    /// Switch off every LED this handler has lit
    pub fn clear_all(&mut self) {
        let keys: Vec<_> = self.last_values.keys().copied().collect();
        for key in keys {
            if self.last_values.get(&key) != Some(&0) {
                self.send_forced(ShortMessage::new(key.status, key.data1, 0));
            }
        }
        self.last_values.clear();
    }

    fn key(message: &ShortMessage) -> MidiOutputKey {
        MidiOutputKey {
            status: message.status,
            data1: message.data1,
        }
    }
}

impl LedSink for MidiOutputHandler {
    fn send(&mut self, message: ShortMessage) {
        let key = Self::key(&message);

        // Check if value changed
        if self.last_values.get(&key) == Some(&message.data2) {
            return;
        }

        log::debug!(
            "[MIDI OUT] {:#04x} {:#04x} {:#04x}",
            message.status,
            message.data1,
            message.data2
        );

        if let Err(e) = self.connection.send(&message.to_bytes()) {
            log::warn!("MIDI output: Failed to send message: {}", e);
            return;
        }

        self.last_values.insert(key, message.data2);
    }

    fn invalidate(&mut self) {
        self.last_values.clear();
    }
}

impl Drop for MidiOutputHandler {
    fn drop(&mut self) {
        // Clear all LEDs on disconnect
        self.clear_all();
    }
}
