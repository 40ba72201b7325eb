//! Tempo and phase alignment guide
//!
//! Compares the two bound decks a few times a second and drives the tempo and
//! beat-align LEDs next to each pitch fader:
//!
//! - **Tempo**: the arrow points the way the deck's pitch fader should move;
//!   both "Tempo" LEDs light when the BPMs are within tolerance.
//! - **Phase**: once the tempos match and both decks play, the beat-align
//!   arrows show which way to nudge. Tracks at (about) double tempo compare
//!   the faster deck's beat with the slower deck's half-beat.

use crate::deck_target::DeckBindings;
use crate::engine::{EngineControl, MixingEngine};
use crate::leds::Light;
use crate::output::{LedSink, ShortMessage};
use crate::types::{DeckChannel, DeckSlot};
use std::time::Duration;

/// BPM difference below which decks count as on tempo
pub const TEMPO_TOLERANCE_BPM: f64 = 0.25;

/// BPM ratio above which decks are compared at double tempo
pub const DOUBLE_TEMPO_RATIO: f64 = 1.5;

/// Beat-distance difference below which decks count as in phase
pub const PHASE_TOLERANCE: f64 = 0.02;

/// Default evaluation period
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(250);

/// Readings of one deck
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeckReading {
    pub bpm: f64,
    pub playing: bool,
    /// Fraction of the current beat already played (0.0-1.0)
    pub beat_distance: f64,
}

impl DeckReading {
    /// Read a channel's current values from the engine
    pub fn read<E: MixingEngine + ?Sized>(engine: &E, channel: DeckChannel) -> Self {
        Self {
            bpm: engine.get_value(channel, EngineControl::Bpm),
            playing: engine.is_enabled(channel, EngineControl::PlayLatched),
            beat_distance: engine.get_value(channel, EngineControl::BeatDistance),
        }
    }

    fn has_valid_bpm(&self) -> bool {
        self.bpm.is_finite() && self.bpm > 0.0
    }
}

/// Tempo guide state of one deck
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TempoIndication {
    Up,
    Down,
    Aligned,
}

impl TempoIndication {
    fn messages(self, slot: DeckSlot) -> [ShortMessage; 3] {
        [
            Light::Tempo.message(slot, self == Self::Aligned),
            Light::TempoUp.message(slot, self == Self::Up),
            Light::TempoDown.message(slot, self == Self::Down),
        ]
    }
}

/// Beat-align guide state of one deck
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseIndication {
    Forward,
    Reverse,
    Aligned,
    /// All beat-align LEDs off
    Cleared,
}

impl PhaseIndication {
    fn messages(self, slot: DeckSlot) -> [ShortMessage; 3] {
        [
            Light::BeatAlignFwd.message(slot, self == Self::Forward),
            Light::BeatAlignRev.message(slot, self == Self::Reverse),
            Light::BeatAlign.message(slot, self == Self::Aligned),
        ]
    }
}

/// Guide state for both decks, indexed by slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TempoReport {
    pub tempo: [TempoIndication; 2],
    pub phase: [PhaseIndication; 2],
}

impl TempoReport {
    pub fn tempo(&self, slot: DeckSlot) -> TempoIndication {
        self.tempo[slot.index()]
    }

    pub fn phase(&self, slot: DeckSlot) -> PhaseIndication {
        self.phase[slot.index()]
    }

    /// LED messages: tempo for both decks, then phase for both decks
    pub fn messages(&self) -> Vec<ShortMessage> {
        let mut messages = Vec::with_capacity(12);
        for slot in DeckSlot::BOTH {
            messages.extend(self.tempo(slot).messages(slot));
        }
        for slot in DeckSlot::BOTH {
            messages.extend(self.phase(slot).messages(slot));
        }
        messages
    }
}

/// Compare two decks
///
/// Returns `None` when either BPM is zero, negative or not a number.
pub fn evaluate(a: &DeckReading, b: &DeckReading) -> Option<TempoReport> {
    if !a.has_valid_bpm() || !b.has_valid_bpm() {
        return None;
    }

    let mut diff = a.bpm - b.bpm;
    let mut double_tempo = false;
    if diff > 0.0 {
        if a.bpm / b.bpm > DOUBLE_TEMPO_RATIO {
            double_tempo = true;
            diff = a.bpm / 2.0 - b.bpm;
        }
    } else if b.bpm / a.bpm > DOUBLE_TEMPO_RATIO {
        double_tempo = true;
        diff = a.bpm - b.bpm / 2.0;
    }

    let tempo = if diff < -TEMPO_TOLERANCE_BPM {
        [TempoIndication::Down, TempoIndication::Up]
    } else if diff > TEMPO_TOLERANCE_BPM {
        [TempoIndication::Up, TempoIndication::Down]
    } else {
        [TempoIndication::Aligned, TempoIndication::Aligned]
    };

    let phase = if tempo[0] == TempoIndication::Aligned && a.playing && b.playing {
        phase_indication(a, b, double_tempo)
    } else {
        [PhaseIndication::Cleared, PhaseIndication::Cleared]
    };

    Some(TempoReport { tempo, phase })
}

fn phase_indication(a: &DeckReading, b: &DeckReading, double_tempo: bool) -> [PhaseIndication; 2] {
    let mut beat_a = a.beat_distance;
    let mut beat_b = b.beat_distance;
    if double_tempo {
        // The slower deck's beat spans two beats of the faster one
        if a.bpm > b.bpm {
            beat_b = fold_half_beat(beat_b);
        } else {
            beat_a = fold_half_beat(beat_a);
        }
    }

    let mut diff = beat_a - beat_b;
    if diff < 0.0 {
        diff += 1.0;
    }

    if diff < PHASE_TOLERANCE || diff > 1.0 - PHASE_TOLERANCE {
        [PhaseIndication::Aligned, PhaseIndication::Aligned]
    } else if diff < 0.5 {
        [PhaseIndication::Reverse, PhaseIndication::Forward]
    } else {
        [PhaseIndication::Forward, PhaseIndication::Reverse]
    }
}

fn fold_half_beat(beat_distance: f64) -> f64 {
    let half = if beat_distance > 0.5 {
        beat_distance - 0.5
    } else {
        beat_distance
    };
    half * 2.0
}

/// Evaluate the bound decks and update the guide LEDs
///
/// Returns the report that was sent, or `None` if the tick was skipped.
pub fn tick<E, S>(engine: &E, bindings: &DeckBindings, leds: &mut S) -> Option<TempoReport>
where
    E: MixingEngine + ?Sized,
    S: LedSink + ?Sized,
{
    let [channel_a, channel_b] = bindings.channels();
    let a = DeckReading::read(engine, channel_a);
    let b = DeckReading::read(engine, channel_b);

    let Some(report) = evaluate(&a, &b) else {
        log::debug!(
            "Tempo guide: skipping tick ({} at {} BPM, {} at {} BPM)",
            channel_a,
            a.bpm,
            channel_b,
            b.bpm
        );
        return None;
    };

    log::trace!("Tempo guide: {:?}", report);
    for message in report.messages() {
        leds.send(message);
    }
    Some(report)
}
