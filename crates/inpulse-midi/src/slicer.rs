//! Beat slicer - Jump the playhead to one of 8 beat-aligned slices
//!
//! The slicer divides a domain of beats (8 by default) into 8 equal sections,
//! one per pad. While slice mode is on, the pad of the section under the
//! playhead is lit on every beat. Pressing a pad:
//!
//! 1. enables slip mode, so the track keeps running underneath;
//! 2. jumps by the fractional number of beats that lands on the start of the
//!    pad's section;
//! 3. arms a one-shot exit timer for the end of the current beat, which leaves
//!    slip mode and snaps playback back to where the track would have been.
//!
//! ```text
//!  beat:   0   1   2   3   4   5   6   7   (domain = 8)
//!  pads:  [1] [2] [3] [4] [5] [6] [7] [8]
//!                  ▲ playhead, pad 3 lit
//! ```
//!
//! # Timer ownership
//!
//! Exit timers live on the controller's [`TimerQueue`]. The per-channel state
//! records the id of the timer it waits for; a timer whose id is no longer
//! recorded (the state was reset in the meantime) still performs its engine
//! writes on its own channel but leaves the state alone.

use crate::config::{is_valid_domain, SlicerColors, SlicerConfig, MIN_SLICER_DOMAIN};
use crate::engine::{EngineControl, MixingEngine};
use crate::leds::slicer_pad_message;
use crate::output::LedSink;
use crate::timer::{delay_from_ms, DeferredAction, TimerId, TimerQueue};
use crate::types::{DeckChannel, NUM_CHANNELS};
use std::time::Duration;

/// Number of slicer pads (always 8)
pub const SLICER_NUM_PADS: usize = 8;

/// Beat fraction after which a press is treated as meant for the next beat
pub const LATE_PRESS_THRESHOLD: f64 = 0.8;

/// Longest exit delay the slicer arms (two beats at 2 BPM)
pub const MAX_EXIT_DELAY: Duration = Duration::from_secs(60);

/// Delay between leaving slip mode and re-enabling a loop
pub const RELOOP_CORRECTION_DELAY: Duration = Duration::from_millis(2);

/// Slicer errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SlicerError {
    #[error("{channel}: cannot slice at {bpm} BPM")]
    InvalidBpm { channel: DeckChannel, bpm: f64 },

    #[error("{channel}: beat distance {beat_distance} outside [0, 1)")]
    InvalidBeatDistance { channel: DeckChannel, beat_distance: f64 },

    #[error("{channel}: cannot arm exit timer {delay_ms}ms ahead")]
    InvalidExitDelay { channel: DeckChannel, delay_ms: f64 },

    #[error("slicer pad {0} out of range (0-7)")]
    PadOutOfRange(usize),

    #[error("{0}: slice mode is not active")]
    SliceModeInactive(DeckChannel),

    #[error("slicer domain {0} must be a power of two and a multiple of 8")]
    InvalidDomain(u32),
}

/// Exit timer state of one channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlicerPhase {
    /// No exit pending
    #[default]
    Idle,
    /// Slip mode on, waiting for the exit timer
    Armed { timer: TimerId },
    /// Slip mode left inside a loop, waiting for the reloop correction
    Pending { correction: TimerId },
}

/// Per-channel slicer state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckSlicerState {
    /// Beats per slicer cycle
    pub domain: u32,
    /// Whole beats played since the start of the track
    pub beats_passed: u64,
    pub phase: SlicerPhase,
    /// Last pressed pad (0-7), cleared when the exit timer fires
    pub active_pad: Option<usize>,
    pub slice_mode: bool,
}

impl DeckSlicerState {
    fn new(domain: u32) -> Self {
        Self {
            domain,
            beats_passed: 0,
            phase: SlicerPhase::Idle,
            active_pad: None,
            slice_mode: false,
        }
    }

    /// Forget the transient state (keeps domain and slice mode)
    fn reset(&mut self) {
        self.beats_passed = 0;
        self.phase = SlicerPhase::Idle;
        self.active_pad = None;
    }

    pub fn is_armed(&self) -> bool {
        matches!(self.phase, SlicerPhase::Armed { .. })
    }

    /// Section (0-7) under the playhead
    pub fn current_section(&self) -> usize {
        current_section(self.beats_passed, self.domain)
    }
}

/// Slicer state for all four channels
#[derive(Debug, Clone)]
pub struct SlicerManager {
    decks: [DeckSlicerState; NUM_CHANNELS],
    colors: SlicerColors,
}

impl SlicerManager {
    /// Create from configuration
    ///
    /// An invalid domain falls back to 8 beats with a warning.
    pub fn new(config: &SlicerConfig) -> Self {
        let domain = if is_valid_domain(config.domain) {
            config.domain
        } else {
            log::warn!(
                "Slicer: invalid domain {}, using {}",
                config.domain,
                MIN_SLICER_DOMAIN
            );
            MIN_SLICER_DOMAIN
        };

        Self {
            decks: std::array::from_fn(|_| DeckSlicerState::new(domain)),
            colors: config.colors,
        }
    }

    pub fn state(&self, channel: DeckChannel) -> &DeckSlicerState {
        &self.decks[channel.index()]
    }

    fn state_mut(&mut self, channel: DeckChannel) -> &mut DeckSlicerState {
        &mut self.decks[channel.index()]
    }

    /// Turn slice mode on or off
    ///
    /// Turning it off resets the channel's transient state.
    pub fn set_slice_mode(&mut self, channel: DeckChannel, enabled: bool) {
        let state = self.state_mut(channel);
        if state.slice_mode != enabled {
            log::debug!("Slicer {}: slice mode {}", channel, if enabled { "on" } else { "off" });
        }
        state.slice_mode = enabled;
        if !enabled {
            state.reset();
        }
    }

    /// Reset a channel's transient state (track change, rebind)
    pub fn reset(&mut self, channel: DeckChannel) {
        log::debug!("Slicer {}: reset", channel);
        self.state_mut(channel).reset();
    }

    /// Change the beat domain of a channel
    pub fn set_domain(&mut self, channel: DeckChannel, domain: u32) -> Result<(), SlicerError> {
        if !is_valid_domain(domain) {
            return Err(SlicerError::InvalidDomain(domain));
        }
        self.state_mut(channel).domain = domain;
        Ok(())
    }

    /// Beat boundary on a bound channel
    ///
    /// Recomputes the beat counter and, in slice mode, redraws the pads.
    pub fn on_beat<E, S>(&mut self, engine: &E, leds: &mut S, channel: DeckChannel)
    where
        E: MixingEngine + ?Sized,
        S: LedSink + ?Sized,
    {
        // beat_active also toggles when the playhead leaves a beat; only the
        // arrival on a beat counts
        if engine.get_value(channel, EngineControl::BeatClosest)
            == engine.get_value(channel, EngineControl::BeatNext)
        {
            return;
        }

        let colors = self.colors;
        let state = self.state_mut(channel);

        match beats_passed(
            engine.get_value(channel, EngineControl::PlayPosition),
            engine.get_value(channel, EngineControl::Duration),
            engine.get_value(channel, EngineControl::FileBpm),
        ) {
            Some(beats) => state.beats_passed = beats,
            None => log::debug!("Slicer {}: no valid position, keeping beat {}", channel, state.beats_passed),
        }

        if !state.slice_mode {
            state.active_pad = None;
            return;
        }

        let slot = channel.slot();
        let section = state.current_section();
        log::trace!("Slicer {}: beat {} section {}", channel, state.beats_passed, section);

        match state.active_pad {
            Some(pad) if pad == section => {
                leds.send(slicer_pad_message(slot, pad, colors.triggered));
            }
            _ => {
                for pad in 0..SLICER_NUM_PADS {
                    let value = if pad == section { colors.playhead } else { colors.idle };
                    leds.send(slicer_pad_message(slot, pad, value));
                }
            }
        }
    }

    /// Slicer pad press on a bound channel
    ///
    /// Returns the number of beats jumped.
    pub fn on_pad_press<E, S>(
        &mut self,
        engine: &mut E,
        leds: &mut S,
        timers: &mut TimerQueue,
        now: Duration,
        channel: DeckChannel,
        pad: usize,
    ) -> Result<f64, SlicerError>
    where
        E: MixingEngine + ?Sized,
        S: LedSink + ?Sized,
    {
        if pad >= SLICER_NUM_PADS {
            return Err(SlicerError::PadOutOfRange(pad));
        }
        if !self.state(channel).slice_mode {
            return Err(SlicerError::SliceModeInactive(channel));
        }
        let bpm = engine.get_value(channel, EngineControl::Bpm);
        if !bpm.is_finite() || bpm <= 0.0 {
            return Err(SlicerError::InvalidBpm { channel, bpm });
        }

        let mut beat_distance = engine.get_value(channel, EngineControl::BeatDistance);
        if !beat_distance.is_finite() {
            log::debug!("Slicer {}: no beat distance, assuming beat start", channel);
            beat_distance = 0.0;
        }
        if !(0.0..1.0).contains(&beat_distance) {
            return Err(SlicerError::InvalidBeatDistance { channel, beat_distance });
        }
        let loop_enabled = engine.is_enabled(channel, EngineControl::LoopEnabled);
        let triggered = self.colors.triggered;

        let state = self.state(channel);
        let jump = beats_to_jump(pad, state.domain, state.beats_passed, beat_distance);

        // Nothing is written until the exit timer is known to be usable
        let exit_delay = if state.is_armed() {
            None
        } else {
            let last_beat_of_loop = state.beats_passed % state.domain as u64 == state.domain as u64 - 1;
            let delay_ms = exit_delay_ms(bpm, beat_distance, loop_enabled && last_beat_of_loop);
            match delay_from_ms(delay_ms).filter(|delay| *delay <= MAX_EXIT_DELAY) {
                Some(delay) => Some((delay, delay_ms)),
                None => return Err(SlicerError::InvalidExitDelay { channel, delay_ms }),
            }
        };

        let state = self.state_mut(channel);
        state.active_pad = Some(pad);
        if let Some((delay, delay_ms)) = exit_delay {
            let timer = timers.schedule_once(now, delay, DeferredAction::SlicerExit { channel });
            state.phase = SlicerPhase::Armed { timer };
            log::debug!("Slicer {}: exit in {:.1}ms ({:?})", channel, delay_ms, timer);
        }

        engine.set_value(channel, EngineControl::SlipEnabled, 1.0);

        // Beat jumps are not applied inside an active loop
        if loop_enabled {
            engine.set_value(channel, EngineControl::ReloopToggle, 1.0);
        }
        engine.set_value(channel, EngineControl::BeatJump, jump);
        if loop_enabled {
            engine.set_value(channel, EngineControl::ReloopToggle, 1.0);
        }

        leds.send(slicer_pad_message(channel.slot(), pad, triggered));

        log::debug!("Slicer {}: pad {} jump {:+.3} beats", channel, pad, jump);
        Ok(jump)
    }

    /// Exit timer fired
    pub fn on_exit_timer<E>(
        &mut self,
        engine: &mut E,
        timers: &mut TimerQueue,
        now: Duration,
        timer: TimerId,
        channel: DeckChannel,
    ) where
        E: MixingEngine + ?Sized,
    {
        let correction = if engine.is_enabled(channel, EngineControl::LoopEnabled) {
            engine.set_value(channel, EngineControl::ReloopToggle, 1.0);
            engine.set_value(channel, EngineControl::SlipEnabled, 0.0);
            Some(self.schedule_reloop_correction(timers, now, channel))
        } else {
            engine.set_value(channel, EngineControl::SlipEnabled, 0.0);
            None
        };

        let state = self.state_mut(channel);
        if state.phase != (SlicerPhase::Armed { timer }) {
            log::debug!("Slicer {}: {:?} no longer owns the state", channel, timer);
            return;
        }
        state.phase = match correction {
            Some(correction) => SlicerPhase::Pending { correction },
            None => SlicerPhase::Idle,
        };
        state.active_pad = None;
    }

    /// Schedule the second reloop toggle after a looped exit
    ///
    /// The engine needs a moment to resolve slip mode before the loop can be
    /// re-enabled, so this always goes through the queue.
    pub fn schedule_reloop_correction(&self, timers: &mut TimerQueue, now: Duration, channel: DeckChannel) -> TimerId {
        timers.schedule_once(now, RELOOP_CORRECTION_DELAY, DeferredAction::ReloopCorrection { channel })
    }

    /// Reloop correction fired
    pub fn on_reloop_correction<E>(&mut self, engine: &mut E, timer: TimerId, channel: DeckChannel)
    where
        E: MixingEngine + ?Sized,
    {
        engine.set_value(channel, EngineControl::ReloopToggle, 1.0);

        let state = self.state_mut(channel);
        if state.phase == (SlicerPhase::Pending { correction: timer }) {
            state.phase = SlicerPhase::Idle;
        }
    }
}

/// Whole beats played at a position
///
/// Returns `None` when the readings don't give a finite, non-negative count.
pub fn beats_passed(play_position: f64, duration_secs: f64, file_bpm: f64) -> Option<u64> {
    let beats = play_position * duration_secs * file_bpm / 60.0;
    (beats.is_finite() && beats >= 0.0).then(|| beats.floor() as u64)
}

/// Section (0-7) of the domain a beat falls in
pub fn current_section(beats_passed: u64, domain: u32) -> usize {
    let beats_per_pad = (domain as u64 / SLICER_NUM_PADS as u64).max(1);
    ((beats_passed % domain as u64) / beats_per_pad) as usize
}

/// Signed beat offset from the playhead to the start of a pad's section
pub fn beats_to_jump(pad: usize, domain: u32, beats_passed: u64, beat_distance: f64) -> f64 {
    let beats_per_pad = domain as f64 / SLICER_NUM_PADS as f64;
    pad as f64 * beats_per_pad - (beats_passed % domain as u64) as f64 - beat_distance
}

/// Milliseconds until the exit timer should fire
///
/// Normally the rest of the current beat. Late presses get one extra beat,
/// except on the last beat of an active loop where that would overrun the
/// loop end.
pub fn exit_delay_ms(bpm: f64, beat_distance: f64, last_beat_of_loop: bool) -> f64 {
    let beat_ms = 60_000.0 / bpm;
    let mut delay = (1.0 - beat_distance) * beat_ms;
    if beat_distance >= LATE_PRESS_THRESHOLD && !last_beat_of_loop {
        delay += beat_ms;
    }
    delay
}
