//! Controller thread
//!
//! Runs an [`InpulseController`] on its own thread for hosts that deliver MIDI
//! and engine notifications from several threads. Everything reaches the
//! controller through one bounded flume channel; due timers fire between
//! events, using the earliest pending deadline as the receive timeout.

use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use flume::{Receiver, RecvTimeoutError, Sender};

use crate::controller::InpulseController;
use crate::engine::{EngineEvent, MixingEngine};
use crate::input::MidiInputEvent;
use crate::output::LedSink;

/// Capacity of the host event channel
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Longest the thread sleeps without a pending timer
const IDLE_TIMEOUT: Duration = Duration::from_secs(1);

/// Events delivered to the controller thread
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostEvent {
    /// MIDI from the controller
    Midi(MidiInputEvent),
    /// Observer notification from the engine
    Engine(EngineEvent),
    /// Stop the thread (the controller is shut down first)
    Shutdown,
}

/// Handle to a running controller thread
pub struct ControllerRuntime {
    event_tx: Sender<HostEvent>,
    thread: Option<JoinHandle<()>>,
}

impl ControllerRuntime {
    /// Start the controller on a new thread
    ///
    /// The controller is initialized on the thread; host time starts at zero.
    pub fn spawn<E, S>(controller: InpulseController<E, S>) -> std::io::Result<Self>
    where
        E: MixingEngine + Send + 'static,
        S: LedSink + Send + 'static,
    {
        let (tx, rx) = flume::bounded::<HostEvent>(EVENT_CHANNEL_CAPACITY);

        let thread = std::thread::Builder::new()
            .name("inpulse-controller".into())
            .spawn(move || {
                Self::run(rx, controller);
            })?;

        Ok(Self {
            event_tx: tx,
            thread: Some(thread),
        })
    }

    fn run<E: MixingEngine, S: LedSink>(rx: Receiver<HostEvent>, mut controller: InpulseController<E, S>) {
        let start = Instant::now();
        controller.init(Duration::ZERO);
        log::info!("Controller thread started");

        loop {
            let deadline = controller
                .next_deadline()
                .and_then(|d| start.checked_add(d))
                .unwrap_or_else(|| Instant::now() + IDLE_TIMEOUT);

            match rx.recv_deadline(deadline) {
                Ok(HostEvent::Midi(event)) => controller.handle_midi_event(&event),
                Ok(HostEvent::Engine(event)) => controller.handle_engine_event(event),
                Ok(HostEvent::Shutdown) => {
                    log::info!("Controller thread: shutdown requested");
                    break;
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    log::info!("Controller thread: channel disconnected, shutting down");
                    break;
                }
            }

            controller.advance_to(start.elapsed());
        }

        controller.shutdown();
    }

    /// Sender for host events (clone it into MIDI callbacks and engine observers)
    pub fn sender(&self) -> Sender<HostEvent> {
        self.event_tx.clone()
    }

    /// Queue an event without blocking
    ///
    /// Returns false if the thread is behind or gone and the event was dropped.
    pub fn send(&self, event: HostEvent) -> bool {
        self.event_tx.try_send(event).is_ok()
    }

    /// Shut the controller down and wait for the thread to finish
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        let Some(thread) = self.thread.take() else {
            return;
        };
        // A full channel still gets the shutdown through eventually
        if self.event_tx.send(HostEvent::Shutdown).is_err() {
            log::debug!("Controller thread already stopped");
        }
        if thread.join().is_err() {
            log::warn!("Controller thread panicked");
        }
    }
}

impl Drop for ControllerRuntime {
    fn drop(&mut self) {
        self.stop();
    }
}
