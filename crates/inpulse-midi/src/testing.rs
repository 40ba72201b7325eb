//! Test doubles shared by the unit tests

use crate::engine::{ConnectionId, EngineControl, MixingEngine};
use crate::output::{LedSink, ShortMessage};
use crate::types::DeckChannel;
use std::collections::HashMap;

/// Initialize logging for a test (safe to call repeatedly)
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Scripted mixing engine
///
/// Reads return whatever the test stored with [`FakeEngine::set`] (NaN when
/// unset). Writes are stored and logged in order.
#[derive(Debug, Default)]
pub struct FakeEngine {
    values: HashMap<(DeckChannel, EngineControl), f64>,
    writes: Vec<(DeckChannel, EngineControl, f64)>,
    connections: HashMap<ConnectionId, (DeckChannel, EngineControl)>,
    next_connection: u64,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a reading without logging it as a write
    pub fn set(&mut self, channel: DeckChannel, control: EngineControl, value: f64) {
        self.values.insert((channel, control), value);
    }

    /// Script a playing deck's readings in one call
    pub fn set_deck(&mut self, channel: DeckChannel, bpm: f64, beat_distance: f64, playing: bool) {
        self.set(channel, EngineControl::Bpm, bpm);
        self.set(channel, EngineControl::BeatDistance, beat_distance);
        self.set(channel, EngineControl::PlayLatched, if playing { 1.0 } else { 0.0 });
    }

    pub fn value(&self, channel: DeckChannel, control: EngineControl) -> f64 {
        self.get_value(channel, control)
    }

    /// Every write in order
    pub fn writes(&self) -> &[(DeckChannel, EngineControl, f64)] {
        &self.writes
    }

    /// Writes to one channel, as (control, value)
    pub fn writes_to(&self, channel: DeckChannel) -> Vec<(EngineControl, f64)> {
        self.writes
            .iter()
            .filter(|(c, _, _)| *c == channel)
            .map(|(_, control, value)| (*control, *value))
            .collect()
    }

    pub fn clear_writes(&mut self) {
        self.writes.clear();
    }

    /// Check whether an observer is registered for a control
    pub fn is_connected(&self, channel: DeckChannel, control: EngineControl) -> bool {
        self.connections.values().any(|&c| c == (channel, control))
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }
}

impl MixingEngine for FakeEngine {
    fn get_value(&self, channel: DeckChannel, control: EngineControl) -> f64 {
        self.values.get(&(channel, control)).copied().unwrap_or(f64::NAN)
    }

    fn set_value(&mut self, channel: DeckChannel, control: EngineControl, value: f64) {
        self.writes.push((channel, control, value));
        self.values.insert((channel, control), value);
    }

    fn connect(&mut self, channel: DeckChannel, control: EngineControl) -> ConnectionId {
        let id = ConnectionId(self.next_connection);
        self.next_connection += 1;
        self.connections.insert(id, (channel, control));
        id
    }

    fn disconnect(&mut self, connection: ConnectionId) {
        self.connections.remove(&connection);
    }
}

/// LED sink that records everything sent to it
#[derive(Debug, Default)]
pub struct RecordingSink {
    messages: Vec<ShortMessage>,
    invalidations: usize,
}

impl RecordingSink {
    pub fn messages(&self) -> &[ShortMessage] {
        &self.messages
    }

    /// Drain the recorded messages
    pub fn take(&mut self) -> Vec<ShortMessage> {
        std::mem::take(&mut self.messages)
    }

    pub fn invalidations(&self) -> usize {
        self.invalidations
    }
}

impl LedSink for RecordingSink {
    fn send(&mut self, message: ShortMessage) {
        self.messages.push(message);
    }

    fn invalidate(&mut self) {
        self.invalidations += 1;
    }
}
