//! Hercules DJControl Inpulse 500 support for a host mixing engine
//!
//! This crate provides:
//! - A beat-synchronized slicer on pad mode 3
//! - A tempo/phase alignment guide on the beat-align LEDs
//! - Deck selection (FX1-FX4), shift-layer transport and deck indicators
//! - MIDI device connection and input handling via midir
//! - MIDI message parsing via midly
//! - Change-tracked LED output
//!
//! # Architecture
//!
//! ```text
//! MIDI Device → midir callback → flume channel ─┐
//! Engine observers ─────────────────────────────┼→ controller thread → engine / LEDs
//! Timer deadlines ──────────────────────────────┘
//! ```
//!
//! The host owns the mixing engine and exposes it through [`MixingEngine`].
//! [`InpulseController`] can also be driven directly from a single-threaded
//! host loop without [`ControllerRuntime`].

mod config;
mod connection;
mod controller;
mod deck_target;
mod engine;
mod input;
mod leds;
mod output;
mod runtime;
mod shift;
mod slicer;
mod tempo;
mod timer;
mod types;

#[cfg(test)]
mod testing;

pub use config::{
    default_config_path, load_config, parse_config, save_config, ConfigError, ControllerConfig,
    InitialChannels, SlicerColors, SlicerConfig,
};
pub use connection::{MidiConnection, MidiConnectionError};
pub use controller::{InpulseController, SHUTDOWN_MESSAGES, STATE_DUMP_REQUEST};
pub use deck_target::{DeckBindings, LayerSelection, Rebind};
pub use engine::{ConnectionId, EngineControl, EngineEvent, MixingEngine};
pub use input::{ControllerInput, MidiInputEvent, MidiInputHandler};
pub use output::{LedSink, MidiOutputHandler, NullSink, ShortMessage};
pub use runtime::{ControllerRuntime, HostEvent};
pub use shift::{ShiftButtons, ShiftState, TransportAction, TransportButton};
pub use slicer::{DeckSlicerState, SlicerError, SlicerManager, SlicerPhase};
pub use tempo::{DeckReading, PhaseIndication, TempoIndication, TempoReport};
pub use timer::{DeferredAction, TimerId, TimerQueue};
pub use types::{DeckChannel, DeckSlot, InvalidChannel};

use flume::Sender;

/// Error type for device setup
#[derive(Debug, thiserror::Error)]
pub enum MidiError {
    #[error("Invalid controller config: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("MIDI connection error: {0}")]
    ConnectionError(#[from] MidiConnectionError),

    #[error("Failed to start controller thread: {0}")]
    ThreadError(#[from] std::io::Error),
}

/// A connected Inpulse 500
///
/// Owns the MIDI ports and the controller thread. Dropping it shuts the
/// controller down and turns its lights off.
pub struct InpulseDevice {
    /// Input goes first so nothing is queued after shutdown starts
    _input: MidiInputHandler,
    runtime: ControllerRuntime,
}

impl InpulseDevice {
    /// Connect to the controller and start driving `engine`
    ///
    /// A missing output port only disables LED feedback; a missing input
    /// port is an error.
    pub fn connect<E>(engine: E, config: ControllerConfig) -> Result<Self, MidiError>
    where
        E: MixingEngine + Send + 'static,
    {
        config.validate()?;

        let leds: Box<dyn LedSink + Send> = match MidiConnection::connect_output(&config.port_match) {
            Some(connection) => Box::new(MidiOutputHandler::new(connection)),
            None => {
                log::warn!("MIDI: No output port for '{}', LED feedback disabled", config.port_match);
                Box::new(NullSink)
            }
        };

        let port_match = config.port_match.clone();
        let runtime = ControllerRuntime::spawn(InpulseController::new(engine, leds, config))?;
        let input = MidiInputHandler::connect(&port_match, runtime.sender())?;

        log::info!("Inpulse 500 connected on '{}'", port_match);
        Ok(Self {
            _input: input,
            runtime,
        })
    }

    /// Sender for engine observer notifications
    pub fn event_sender(&self) -> Sender<HostEvent> {
        self.runtime.sender()
    }

    /// Deliver an engine observer notification
    ///
    /// Returns false if the event was dropped.
    pub fn notify(&self, event: EngineEvent) -> bool {
        self.runtime.send(HostEvent::Engine(event))
    }
}
