//! Controller binding layer
//!
//! [`InpulseController`] owns all controller-side state and is the single
//! entry point for everything the host delivers: MIDI input, engine observer
//! events and the passage of time. Every handler takes `&mut self`, so
//! callbacks never interleave inside a handler.
//!
//! ```text
//! MIDI bytes ──► decode ──┐
//! EngineEvent ────────────┼──► InpulseController ──► MixingEngine writes
//! advance_to(now) ────────┘         │
//!                                   └──────────────► LedSink (LED messages)
//! ```
//!
//! Handler errors are logged and swallowed; nothing propagates back to the
//! host.

use crate::config::ControllerConfig;
use crate::deck_target::{DeckBindings, Rebind};
use crate::engine::{ConnectionId, EngineControl, EngineEvent, MixingEngine};
use crate::input::{ControllerInput, MidiInputEvent};
use crate::leds::{self, deck_indicator_message, deck_selector_message, SLICER_PAD_MODE};
use crate::output::{LedSink, ShortMessage};
use crate::shift::{ShiftButtons, ShiftState};
use crate::slicer::{SlicerError, SlicerManager};
use crate::tempo;
use crate::timer::{DeferredAction, TimerId, TimerQueue};
use crate::types::{DeckChannel, DeckSlot};
use std::time::Duration;

/// Asks the controller to send the state of all its knobs and faders
pub const STATE_DUMP_REQUEST: ShortMessage = ShortMessage::new(leds::status::KNOBS, 0x7F, 0x7F);

/// Sent on shutdown: browser LED off, then lights-out
pub const SHUTDOWN_MESSAGES: [ShortMessage; 2] = [
    ShortMessage::new(leds::status::MIXER_BUTTONS, 0x05, 0x00),
    ShortMessage::new(leds::status::KNOBS, 0x7F, 0x7E),
];

/// Hercules DJControl Inpulse 500 controller
pub struct InpulseController<E: MixingEngine, S: LedSink> {
    engine: E,
    leds: S,
    config: ControllerConfig,
    bindings: DeckBindings,
    slicer: SlicerManager,
    shift: ShiftButtons,
    timers: TimerQueue,
    /// Host time of the last `init`/`advance_to`
    now: Duration,
    /// `beat_active` subscription of each side's bound channel
    beat_connections: [Option<ConnectionId>; 2],
    /// `play_latched` subscriptions for all channels
    play_connections: Vec<ConnectionId>,
    tempo_timer: Option<TimerId>,
    running: bool,
}

impl<E: MixingEngine, S: LedSink> InpulseController<E, S> {
    /// Create a controller
    ///
    /// Nothing is sent or subscribed until [`init`](Self::init).
    pub fn new(engine: E, leds: S, config: ControllerConfig) -> Self {
        if let Err(e) = config.validate() {
            log::warn!("Controller: {}", e);
        }

        let bindings = DeckBindings::new(config.initial_channels.a, config.initial_channels.b)
            .unwrap_or_else(|| {
                log::warn!("Controller: invalid initial channels, using defaults");
                DeckBindings::default()
            });
        let slicer = SlicerManager::new(&config.slicer);

        Self {
            engine,
            leds,
            config,
            bindings,
            slicer,
            shift: ShiftButtons::default(),
            timers: TimerQueue::new(),
            now: Duration::ZERO,
            beat_connections: [None, None],
            play_connections: Vec::new(),
            tempo_timer: None,
            running: false,
        }
    }

    /// Subscribe to the engine, sync the LEDs and start the tempo guide
    pub fn init(&mut self, now: Duration) {
        if self.running {
            log::warn!("Controller: init called twice");
            return;
        }
        self.now = now;
        log::info!(
            "Controller: init ({} on Deck A, {} on Deck B)",
            self.bindings.channel(DeckSlot::A),
            self.bindings.channel(DeckSlot::B)
        );

        self.leds.invalidate();
        self.leds.send(STATE_DUMP_REQUEST);

        for channel in DeckChannel::ALL {
            let id = self.engine.connect(channel, EngineControl::PlayLatched);
            self.play_connections.push(id);
            self.leds.send(deck_selector_message(channel, self.bindings.is_bound(channel)));
        }

        for slot in DeckSlot::BOTH {
            self.refresh_deck_status(slot);
        }

        let period = if self.config.tempo_tick_ms == 0 {
            tempo::DEFAULT_TICK_INTERVAL
        } else {
            self.config.tempo_tick()
        };
        self.tempo_timer = Some(self.timers.schedule_periodic(now, period, DeferredAction::TempoTick));
        self.running = true;
    }

    /// Cancel timers, drop subscriptions and turn the controller's lights off
    pub fn shutdown(&mut self) {
        if !self.running {
            return;
        }
        log::info!("Controller: shutdown ({} pending timer(s) dropped)", self.timers.len());

        if let Some(id) = self.tempo_timer.take() {
            self.timers.cancel(id);
        }
        self.timers.clear();

        for id in self.beat_connections.iter_mut().filter_map(Option::take) {
            self.engine.disconnect(id);
        }
        for id in self.play_connections.drain(..) {
            self.engine.disconnect(id);
        }

        for message in SHUTDOWN_MESSAGES {
            self.leds.send(message);
        }
        self.running = false;
    }

    /// Handle raw MIDI bytes
    pub fn handle_midi(&mut self, data: &[u8]) {
        if let Some(event) = MidiInputEvent::parse(data) {
            self.handle_midi_event(&event);
        }
    }

    /// Handle a parsed MIDI event
    pub fn handle_midi_event(&mut self, event: &MidiInputEvent) {
        match ControllerInput::decode(event) {
            Some(input) => self.handle_input(input),
            None => log::trace!("Controller: unhandled {:?}", event),
        }
    }

    /// Handle a decoded controller input
    pub fn handle_input(&mut self, input: ControllerInput) {
        if !self.running {
            log::debug!("Controller: not running, ignoring {:?}", input);
            return;
        }

        match input {
            ControllerInput::SlicerPad { slot, pad, pressed } => {
                if pressed {
                    self.press_slicer_pad(slot, pad);
                }
            }
            ControllerInput::PadModeSelect { slot, mode, pressed } => {
                if pressed {
                    let channel = self.bindings.channel(slot);
                    self.slicer.set_slice_mode(channel, mode == SLICER_PAD_MODE);
                }
            }
            ControllerInput::Shift { slot, held } => {
                self.shift.set(slot, held);
            }
            ControllerInput::Transport {
                slot,
                button,
                shift_layer,
                pressed,
            } => {
                let shift = ShiftState::from_held(shift_layer || self.shift.get(slot).is_shifted());
                let action = button.action(shift);
                let channel = self.bindings.channel(slot);
                if action.apply(&mut self.engine, channel, pressed) {
                    log::debug!("Controller: {:?} on {}", action, channel);
                    if pressed && action.changes_track() {
                        self.slicer.reset(channel);
                    }
                }
            }
            ControllerInput::DeckSelect { channel, pressed } => {
                if pressed {
                    self.select_channel(channel);
                }
            }
        }
    }

    fn press_slicer_pad(&mut self, slot: DeckSlot, pad: usize) {
        let channel = self.bindings.channel(slot);
        let result = self.slicer.on_pad_press(
            &mut self.engine,
            &mut self.leds,
            &mut self.timers,
            self.now,
            channel,
            pad,
        );
        match result {
            Ok(_) => {}
            Err(
                e @ (SlicerError::InvalidBpm { .. }
                | SlicerError::InvalidBeatDistance { .. }
                | SlicerError::InvalidExitDelay { .. }),
            ) => log::warn!("Slicer: {}", e),
            Err(e) => log::debug!("Slicer: {}", e),
        }
    }

    /// Handle an observer notification from the engine
    pub fn handle_engine_event(&mut self, event: EngineEvent) {
        if !self.running {
            return;
        }

        match event.control {
            EngineControl::BeatActive => {
                if self.bindings.is_bound(event.channel) {
                    self.slicer.on_beat(&self.engine, &mut self.leds, event.channel);
                } else {
                    log::debug!("Controller: beat on unbound {} ignored", event.channel);
                }
            }
            EngineControl::PlayLatched => {
                if let Some(slot) = self.bindings.slot_of(event.channel) {
                    self.leds.send(deck_indicator_message(slot, event.value > 0.0));
                }
            }
            other => log::trace!("Controller: unobserved {:?} on {}", other, event.channel),
        }
    }

    /// Run every deferred action due at `now`
    pub fn advance_to(&mut self, now: Duration) {
        if now < self.now {
            log::warn!("Controller: time went backwards ({:?} < {:?})", now, self.now);
            return;
        }
        self.now = now;

        while let Some((id, action)) = self.timers.pop_due(now) {
            match action {
                DeferredAction::TempoTick => {
                    tempo::tick(&self.engine, &self.bindings, &mut self.leds);
                }
                DeferredAction::SlicerExit { channel } => {
                    self.slicer
                        .on_exit_timer(&mut self.engine, &mut self.timers, now, id, channel);
                }
                DeferredAction::ReloopCorrection { channel } => {
                    self.slicer.on_reloop_correction(&mut self.engine, id, channel);
                }
            }
        }
    }

    /// Bind a channel to its side
    ///
    /// Moves the beat subscription, resets the slicer state of both the old
    /// and the new channel and refreshes the side's LEDs. Selecting the
    /// channel that is already bound only refreshes the side and returns `None`.
    pub fn select_channel(&mut self, channel: DeckChannel) -> Option<Rebind> {
        let Some(rebind) = self.bindings.bind(channel) else {
            let slot = channel.slot();
            log::debug!("Controller: {} already drives {}, refreshing", slot, channel);
            self.leds.invalidate();
            for bound in slot.channels() {
                self.leds.send(deck_selector_message(bound, bound == channel));
            }
            self.refresh_deck_status(slot);
            return None;
        };
        log::info!(
            "Controller: {} now drives {} (was {})",
            rebind.slot,
            rebind.current,
            rebind.previous
        );

        self.slicer.reset(rebind.previous);
        self.slicer.reset(rebind.current);

        self.leds.invalidate();
        self.leds.send(deck_selector_message(rebind.previous, false));
        self.leds.send(deck_selector_message(rebind.current, true));

        self.refresh_deck_status(rebind.slot);
        Some(rebind)
    }

    /// Resubscribe a side to its bound channel and resync its LEDs
    fn refresh_deck_status(&mut self, slot: DeckSlot) {
        let channel = self.bindings.channel(slot);

        let playing = self.engine.is_enabled(channel, EngineControl::PlayLatched);
        self.leds.send(deck_indicator_message(slot, playing));

        if let Some(old) = self.beat_connections[slot.index()].take() {
            self.engine.disconnect(old);
        }
        self.beat_connections[slot.index()] = Some(self.engine.connect(channel, EngineControl::BeatActive));

        // Draw the pads right away instead of waiting for the next beat
        self.slicer.on_beat(&self.engine, &mut self.leds, channel);
    }

    /// Earliest pending timer deadline
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn bindings(&self) -> &DeckBindings {
        &self.bindings
    }

    pub fn slicer(&self) -> &SlicerManager {
        &self.slicer
    }

    pub fn slicer_mut(&mut self) -> &mut SlicerManager {
        &mut self.slicer
    }

    pub fn timers(&self) -> &TimerQueue {
        &self.timers
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn leds(&self) -> &S {
        &self.leds
    }

    pub fn leds_mut(&mut self) -> &mut S {
        &mut self.leds
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leds::color;
    use crate::slicer::SlicerPhase;
    use crate::testing::{init_logger, FakeEngine, RecordingSink};

    const CH1: DeckChannel = DeckChannel::CHANNEL_1;
    const CH2: DeckChannel = DeckChannel::CHANNEL_2;
    const CH3: DeckChannel = DeckChannel::CHANNEL_3;

    type TestController = InpulseController<FakeEngine, RecordingSink>;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    /// 120 BPM deck sitting just past a whole beat
    fn load_deck(engine: &mut FakeEngine, channel: DeckChannel, beat: u64, beat_distance: f64) {
        engine.set(channel, EngineControl::Bpm, 120.0);
        engine.set(channel, EngineControl::FileBpm, 120.0);
        engine.set(channel, EngineControl::Duration, 60.0);
        engine.set(channel, EngineControl::PlayPosition, (beat as f64 + 0.01) / 120.0);
        engine.set(channel, EngineControl::BeatDistance, beat_distance);
        engine.set(channel, EngineControl::LoopEnabled, 0.0);
        engine.set(channel, EngineControl::PlayLatched, 1.0);
        engine.set(channel, EngineControl::BeatClosest, 1000.0);
        engine.set(channel, EngineControl::BeatNext, 2000.0);
    }

    fn controller() -> TestController {
        init_logger();
        let mut engine = FakeEngine::new();
        for channel in DeckChannel::ALL {
            load_deck(&mut engine, channel, 10, 0.4);
        }
        let mut controller = InpulseController::new(engine, RecordingSink::default(), ControllerConfig::default());
        controller.init(ms(0));
        controller.leds_mut().take();
        controller
    }

    fn beat(controller: &mut TestController, channel: DeckChannel) {
        controller.handle_engine_event(EngineEvent {
            channel,
            control: EngineControl::BeatActive,
            value: 1.0,
        });
    }

    #[test]
    fn test_init_subscribes_and_syncs_leds() {
        let mut engine = FakeEngine::new();
        engine.set(CH2, EngineControl::PlayLatched, 1.0);
        let mut controller = InpulseController::new(engine, RecordingSink::default(), ControllerConfig::default());
        controller.init(ms(0));

        let engine = controller.engine();
        assert!(engine.is_connected(CH1, EngineControl::BeatActive));
        assert!(engine.is_connected(CH2, EngineControl::BeatActive));
        assert!(!engine.is_connected(CH3, EngineControl::BeatActive));
        for channel in DeckChannel::ALL {
            assert!(engine.is_connected(channel, EngineControl::PlayLatched));
        }

        let messages = controller.leds().messages();
        assert_eq!(messages[0], STATE_DUMP_REQUEST);
        assert!(messages.contains(&ShortMessage::new(0x90, 0x14, 0x7F)));
        assert!(messages.contains(&ShortMessage::new(0x90, 0x15, 0x7F)));
        assert!(messages.contains(&ShortMessage::new(0x90, 0x16, 0x00)));
        assert!(messages.contains(&ShortMessage::new(0x91, 0x30, 0x00)));
        assert!(messages.contains(&ShortMessage::new(0x92, 0x30, 0x7F)));

        assert_eq!(controller.next_deadline(), Some(ms(250)));
    }

    #[test]
    fn test_shutdown_cleans_up() {
        let mut controller = controller();
        controller.shutdown();

        assert_eq!(controller.engine().connection_count(), 0);
        assert!(controller.timers().is_empty());
        assert_eq!(controller.leds().messages(), &SHUTDOWN_MESSAGES);
        assert!(!controller.is_running());

        // Input after shutdown is ignored
        controller.handle_midi(&[0x91, 0x07, 0x7F]);
        assert!(controller.engine().writes().is_empty());
    }

    #[test]
    fn test_tempo_tick_every_period() {
        let mut controller = controller();

        controller.advance_to(ms(249));
        assert!(controller.leds().messages().is_empty());

        controller.advance_to(ms(250));
        assert_eq!(controller.leds().messages().len(), 12);

        controller.advance_to(ms(500));
        assert_eq!(controller.leds().messages().len(), 24);
    }

    #[test]
    fn test_slicer_flow_over_midi() {
        let mut controller = controller();

        // Pad mode 3 turns slice mode on for the left side's channel
        controller.handle_midi(&[0x91, 0x11, 0x7F]);
        assert!(controller.slicer().state(CH1).slice_mode);
        assert!(!controller.slicer().state(CH2).slice_mode);

        beat(&mut controller, CH1);
        assert_eq!(controller.slicer().state(CH1).beats_passed, 10);
        assert_eq!(controller.leds().messages().len(), 8);
        controller.leds_mut().take();

        controller.handle_midi(&[0x96, 0x23, 0x7F]);
        let jump = controller
            .engine()
            .writes_to(CH1)
            .into_iter()
            .find(|(c, _)| *c == EngineControl::BeatJump)
            .map(|(_, v)| v)
            .unwrap();
        assert!((jump - 0.6).abs() < 1e-9);
        assert_eq!(
            controller.leds().messages(),
            &[ShortMessage::new(0x96, 0x23, color::TRIGGERED)]
        );

        // Release does nothing
        controller.engine_mut().clear_writes();
        controller.handle_midi(&[0x96, 0x23, 0x00]);
        assert!(controller.engine().writes().is_empty());

        // 300ms later the exit timer leaves slip mode
        controller.advance_to(ms(300));
        assert!(controller
            .engine()
            .writes_to(CH1)
            .contains(&(EngineControl::SlipEnabled, 0.0)));
        assert_eq!(controller.slicer().state(CH1).active_pad, None);
    }

    #[test]
    fn test_other_pad_mode_disables_slicer() {
        let mut controller = controller();
        controller.handle_midi(&[0x91, 0x11, 0x7F]);
        controller.handle_midi(&[0x91, 0x0F, 0x7F]);
        assert!(!controller.slicer().state(CH1).slice_mode);

        controller.handle_midi(&[0x96, 0x20, 0x7F]);
        assert!(controller.engine().writes().is_empty());
    }

    #[test]
    fn test_zero_bpm_press_is_a_no_op() {
        let mut controller = controller();
        controller.handle_midi(&[0x91, 0x11, 0x7F]);
        controller.engine_mut().set(CH1, EngineControl::Bpm, 0.0);

        controller.handle_midi(&[0x96, 0x21, 0x7F]);
        assert!(controller.engine().writes().is_empty());
        // Only the tempo tick is pending
        assert_eq!(controller.timers().len(), 1);
    }

    #[test]
    fn test_deck_select_moves_subscription() {
        let mut controller = controller();

        let rebind = controller.select_channel(CH3).unwrap();
        assert_eq!(rebind.previous, CH1);
        assert_eq!(controller.bindings().channel(DeckSlot::A), CH3);

        let engine = controller.engine();
        assert!(!engine.is_connected(CH1, EngineControl::BeatActive));
        assert!(engine.is_connected(CH3, EngineControl::BeatActive));
        assert!(engine.is_connected(CH2, EngineControl::BeatActive));

        let leds = controller.leds();
        assert_eq!(leds.invalidations(), 2);
        assert!(leds.messages().contains(&ShortMessage::new(0x90, 0x14, 0x00)));
        assert!(leds.messages().contains(&ShortMessage::new(0x90, 0x16, 0x7F)));
        assert!(leds.messages().contains(&ShortMessage::new(0x91, 0x30, 0x7F)));

        // Selecting the bound channel again is not a rebind
        assert_eq!(controller.select_channel(CH3), None);
        assert_eq!(controller.bindings().channel(DeckSlot::A), CH3);
    }

    #[test]
    fn test_reselecting_bound_channel_refreshes_side() {
        let mut controller = controller();
        controller.handle_midi(&[0x91, 0x11, 0x7F]);
        controller.handle_midi(&[0x96, 0x25, 0x7F]);
        assert_eq!(controller.slicer().state(CH1).active_pad, Some(5));
        let connections = controller.engine().connection_count();
        controller.leds_mut().take();

        assert_eq!(controller.select_channel(CH1), None);

        let leds = controller.leds();
        assert_eq!(leds.invalidations(), 2);
        let messages = leds.messages();
        assert!(messages.contains(&ShortMessage::new(0x90, 0x14, 0x7F)));
        assert!(messages.contains(&ShortMessage::new(0x90, 0x16, 0x00)));
        // Deck indicator follows play_latched
        assert!(messages.contains(&ShortMessage::new(0x91, 0x30, 0x7F)));
        // Pads redrawn for beat 10 (section 2)
        assert!(messages.iter().any(|m| m.status == 0x96 && m.data1 == 0x22));

        let engine = controller.engine();
        assert!(engine.is_connected(CH1, EngineControl::BeatActive));
        assert_eq!(engine.connection_count(), connections);
        // Slicer state survives
        assert_eq!(controller.slicer().state(CH1).active_pad, Some(5));
    }

    #[test]
    fn test_deck_select_over_midi() {
        let mut controller = controller();
        controller.handle_midi(&[0x90, 0x17, 0x7F]);
        assert_eq!(controller.bindings().channel(DeckSlot::B), DeckChannel::CHANNEL_4);
        assert_eq!(controller.bindings().channel(DeckSlot::A), CH1);
    }

    #[test]
    fn test_beats_on_unbound_channel_ignored() {
        let mut controller = controller();
        controller.slicer_mut().set_slice_mode(CH3, true);

        beat(&mut controller, CH3);
        assert_eq!(controller.slicer().state(CH3).beats_passed, 0);
        assert!(controller.leds().messages().is_empty());
    }

    #[test]
    fn test_play_latched_lights_bound_side() {
        let mut controller = controller();

        controller.handle_engine_event(EngineEvent {
            channel: CH2,
            control: EngineControl::PlayLatched,
            value: 0.0,
        });
        assert_eq!(controller.leds().messages(), &[ShortMessage::new(0x92, 0x30, 0x00)]);

        // Channel 4 is not bound
        controller.handle_engine_event(EngineEvent {
            channel: DeckChannel::CHANNEL_4,
            control: EngineControl::PlayLatched,
            value: 1.0,
        });
        assert_eq!(controller.leds().messages().len(), 1);
    }

    #[test]
    fn test_rebind_with_timer_in_flight() {
        let mut controller = controller();
        controller.handle_midi(&[0x91, 0x11, 0x7F]);
        beat(&mut controller, CH1);
        controller.handle_midi(&[0x96, 0x22, 0x7F]);
        assert!(controller.slicer().state(CH1).is_armed());

        // Rebind the left side to channel 3 and use the slicer there
        controller.handle_midi(&[0x90, 0x16, 0x7F]);
        assert_eq!(controller.slicer().state(CH1).phase, SlicerPhase::Idle);
        controller.handle_midi(&[0x91, 0x11, 0x7F]);
        controller.advance_to(ms(100));
        beat(&mut controller, CH3);
        controller.handle_midi(&[0x96, 0x25, 0x7F]);
        let ch3_state = controller.slicer().state(CH3).clone();
        assert_eq!(ch3_state.active_pad, Some(5));

        // The old timer fires: channel 1 leaves slip mode, channel 3 is untouched
        controller.engine_mut().clear_writes();
        controller.advance_to(ms(300));
        assert_eq!(
            controller.engine().writes_to(CH1),
            vec![(EngineControl::SlipEnabled, 0.0)]
        );
        assert!(controller.engine().writes_to(CH3).is_empty());
        assert_eq!(controller.slicer().state(CH3), &ch3_state);
    }

    #[test]
    fn test_shift_layer_transport() {
        let mut controller = controller();

        // Shift held, play button on the regular channel
        controller.handle_midi(&[0x91, 0x04, 0x7F]);
        controller.handle_midi(&[0x91, 0x07, 0x7F]);
        assert_eq!(
            controller.engine().writes_to(CH1),
            vec![(EngineControl::PlayStutter, 1.0)]
        );
        controller.handle_midi(&[0x91, 0x04, 0x00]);

        // Hardware shift channel alone is enough
        controller.engine_mut().clear_writes();
        controller.handle_midi(&[0x95, 0x06, 0x7F]);
        assert_eq!(
            controller.engine().writes_to(CH2),
            vec![(EngineControl::StartPlay, 1.0)]
        );

        // Unshifted sync
        controller.engine_mut().clear_writes();
        controller.handle_midi(&[0x92, 0x05, 0x7F]);
        assert_eq!(
            controller.engine().writes_to(CH2),
            vec![(EngineControl::BeatSync, 1.0)]
        );
    }

    #[test]
    fn test_load_resets_slicer_state() {
        let mut controller = controller();
        controller.handle_midi(&[0x91, 0x11, 0x7F]);
        beat(&mut controller, CH1);
        controller.handle_midi(&[0x96, 0x20, 0x7F]);
        assert_eq!(controller.slicer().state(CH1).active_pad, Some(0));

        controller.handle_midi(&[0x91, 0x0D, 0x7F]);
        let state = controller.slicer().state(CH1);
        assert_eq!(state.active_pad, None);
        assert_eq!(state.beats_passed, 0);
        assert_eq!(state.phase, SlicerPhase::Idle);
        assert!(state.slice_mode);
        assert!(controller
            .engine()
            .writes_to(CH1)
            .contains(&(EngineControl::LoadSelectedTrack, 1.0)));
    }
}
