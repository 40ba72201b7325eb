//! MIDI port discovery and connection
//!
//! Uses midir for cross-platform MIDI I/O (ALSA on Linux, CoreMIDI on macOS, WinMM on Windows).
//! Only the ports of the configured controller are opened; there is no
//! general device enumeration beyond listing names for diagnostics.

use midir::{MidiInput, MidiInputPort, MidiOutput, MidiOutputConnection};

/// Error type for MIDI connection operations
#[derive(Debug, thiserror::Error)]
pub enum MidiConnectionError {
    #[error("Failed to initialize MIDI input: {0}")]
    InputInitError(String),

    #[error("Failed to initialize MIDI output: {0}")]
    OutputInitError(String),

    #[error("No MIDI input ports available")]
    NoInputPorts,

    #[error("No MIDI port found matching pattern: {0}")]
    PortNotFound(String),

    #[error("Failed to connect to MIDI port: {0}")]
    ConnectionError(String),

    #[error("Failed to get port info: {0}")]
    PortInfoError(String),
}

/// Port lookup for the controller
pub struct MidiConnection;

impl MidiConnection {
    /// Find the controller's input port
    ///
    /// Returns the `MidiInput` so the caller can connect it with its own callback.
    pub fn find_input_port(port_match: &str) -> Result<(MidiInput, MidiInputPort), MidiConnectionError> {
        let midi_in = MidiInput::new("inpulse-midi-in")
            .map_err(|e| MidiConnectionError::InputInitError(e.to_string()))?;

        let in_ports = midi_in.ports();
        if in_ports.is_empty() {
            return Err(MidiConnectionError::NoInputPorts);
        }

        let input_port = in_ports
            .into_iter()
            .find(|port| {
                midi_in
                    .port_name(port)
                    .map(|name| port_matches(&name, port_match))
                    .unwrap_or(false)
            })
            .ok_or_else(|| MidiConnectionError::PortNotFound(port_match.to_string()))?;

        let port_name = midi_in
            .port_name(&input_port)
            .map_err(|e| MidiConnectionError::PortInfoError(e.to_string()))?;

        log::info!("MIDI: Found input port: {}", port_name);

        Ok((midi_in, input_port))
    }

    /// Connect to the controller's output port
    ///
    /// A missing output port is not fatal; the controller then runs without
    /// LED feedback.
    pub fn connect_output(port_match: &str) -> Option<MidiOutputConnection> {
        let midi_out = match MidiOutput::new("inpulse-midi-out") {
            Ok(out) => out,
            Err(e) => {
                log::warn!("MIDI: Failed to initialize output: {}", e);
                return None;
            }
        };

        let out_ports = midi_out.ports();

        let output_port = out_ports.iter().find(|port| {
            midi_out
                .port_name(port)
                .map(|name| port_matches(&name, port_match))
                .unwrap_or(false)
        })?;

        let port_name = midi_out.port_name(output_port).ok()?;
        log::info!("MIDI: Found output port: {}", port_name);

        match midi_out.connect(output_port, "inpulse-midi-output") {
            Ok(conn) => {
                log::info!("MIDI: Connected to output port");
                Some(conn)
            }
            Err(e) => {
                log::warn!("MIDI: Failed to connect to output: {}", e);
                None
            }
        }
    }

    /// List all available MIDI input ports
    pub fn list_input_ports() -> Result<Vec<String>, MidiConnectionError> {
        let midi_in = MidiInput::new("inpulse-midi-list")
            .map_err(|e| MidiConnectionError::InputInitError(e.to_string()))?;

        Ok(midi_in
            .ports()
            .iter()
            .filter_map(|port| midi_in.port_name(port).ok())
            .collect())
    }
}

/// Normalize a MIDI port name by removing hardware-specific identifiers
///
/// ALSA port names include dynamic IDs that change between reconnections:
/// - "DJControl Inpulse 500 MIDI 1 [hw:2,0,0]" -> "DJControl Inpulse 500 MIDI 1"
/// - "DJControl Inpulse 500:DJControl Inpulse 500 MIDI 1 24:0" -> "DJControl Inpulse 500:DJControl Inpulse 500 MIDI 1"
pub fn normalize_port_name(name: &str) -> String {
    let mut result = name.trim();

    if let Some(bracket_pos) = result.rfind('[') {
        result = result[..bracket_pos].trim();
    }

    // Trailing "client:port"
    if let Some(last_space) = result.rfind(' ') {
        let suffix = &result[last_space + 1..];
        if let Some((client, port)) = suffix.split_once(':') {
            let all_digits = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
            if all_digits(client) && all_digits(port) {
                result = result[..last_space].trim();
            }
        }
    }

    result.to_string()
}

/// Case-insensitive substring match of a port name against a pattern
pub fn port_matches(actual_port: &str, pattern: &str) -> bool {
    normalize_port_name(actual_port)
        .to_lowercase()
        .contains(&pattern.trim().to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_port_name() {
        assert_eq!(
            normalize_port_name("DJControl Inpulse 500 MIDI 1 [hw:2,0,0]"),
            "DJControl Inpulse 500 MIDI 1"
        );
        assert_eq!(
            normalize_port_name("DJControl Inpulse 500:DJControl Inpulse 500 MIDI 1 24:0"),
            "DJControl Inpulse 500:DJControl Inpulse 500 MIDI 1"
        );
        assert_eq!(normalize_port_name("  DJControl Inpulse 500  "), "DJControl Inpulse 500");
        // Not a client:port suffix
        assert_eq!(normalize_port_name("Mixer a:b"), "Mixer a:b");
    }

    #[test]
    fn test_port_matches() {
        assert!(port_matches("DJControl Inpulse 500 MIDI 1 [hw:2,0,0]", "djcontrol inpulse 500"));
        assert!(!port_matches("DJControl Inpulse 300 MIDI 1", "DJControl Inpulse 500"));
    }

    #[test]
    fn test_list_ports() {
        // Port availability depends on the system; this must just not crash
        let _input_ports = MidiConnection::list_input_ports();
    }
}
