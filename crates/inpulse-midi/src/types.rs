//! Deck and channel identifiers
//!
//! The Inpulse 500 has two physical sides, each of which can drive one of two
//! engine channels:
//!
//! ```text
//! Left side  (Deck A) ──► [Channel1] or [Channel3]
//! Right side (Deck B) ──► [Channel2] or [Channel4]
//! ```
//!
//! Per-channel state (slicer, subscriptions) is keyed by [`DeckChannel`];
//! anything that addresses controller hardware is keyed by [`DeckSlot`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of engine channels the controller can address
pub const NUM_CHANNELS: usize = 4;

/// Error for channel numbers outside 1-4
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("engine channel {0} out of range (1-4)")]
pub struct InvalidChannel(pub u8);

/// One of the four engine channels (`[Channel1]` .. `[Channel4]`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct DeckChannel(u8);

impl DeckChannel {
    pub const CHANNEL_1: DeckChannel = DeckChannel(1);
    pub const CHANNEL_2: DeckChannel = DeckChannel(2);
    pub const CHANNEL_3: DeckChannel = DeckChannel(3);
    pub const CHANNEL_4: DeckChannel = DeckChannel(4);

    /// All channels in order
    pub const ALL: [DeckChannel; NUM_CHANNELS] = [
        Self::CHANNEL_1,
        Self::CHANNEL_2,
        Self::CHANNEL_3,
        Self::CHANNEL_4,
    ];

    /// Create from a 1-based channel number
    pub fn new(number: u8) -> Option<Self> {
        (1..=NUM_CHANNELS as u8).contains(&number).then_some(Self(number))
    }

    /// 1-based channel number
    pub fn number(self) -> u8 {
        self.0
    }

    /// 0-based index for per-channel arrays
    pub fn index(self) -> usize {
        (self.0 - 1) as usize
    }

    /// The controller side this channel lives on
    ///
    /// Odd channels belong to the left side, even channels to the right.
    pub fn slot(self) -> DeckSlot {
        if self.0 % 2 == 1 {
            DeckSlot::A
        } else {
            DeckSlot::B
        }
    }
}

impl fmt::Display for DeckChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[Channel{}]", self.0)
    }
}

impl TryFrom<u8> for DeckChannel {
    type Error = InvalidChannel;

    fn try_from(number: u8) -> Result<Self, Self::Error> {
        Self::new(number).ok_or(InvalidChannel(number))
    }
}

impl From<DeckChannel> for u8 {
    fn from(channel: DeckChannel) -> u8 {
        channel.0
    }
}

/// Logical deck slot (one per physical controller side)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DeckSlot {
    /// Left side
    #[default]
    A,
    /// Right side
    B,
}

impl DeckSlot {
    /// Both slots, left first
    pub const BOTH: [DeckSlot; 2] = [DeckSlot::A, DeckSlot::B];

    /// 0 for the left side, 1 for the right
    ///
    /// This is also the offset added to a MIDI base status byte to address
    /// the side's LEDs.
    pub fn index(self) -> usize {
        match self {
            Self::A => 0,
            Self::B => 1,
        }
    }

    /// Slot for a MIDI side offset (0 or 1)
    pub fn from_side(side: u8) -> Option<Self> {
        match side {
            0 => Some(Self::A),
            1 => Some(Self::B),
            _ => None,
        }
    }

    /// The two channels this slot can be bound to
    pub fn channels(self) -> [DeckChannel; 2] {
        match self {
            Self::A => [DeckChannel::CHANNEL_1, DeckChannel::CHANNEL_3],
            Self::B => [DeckChannel::CHANNEL_2, DeckChannel::CHANNEL_4],
        }
    }
}

impl fmt::Display for DeckSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A => f.write_str("Deck A"),
            Self::B => f.write_str("Deck B"),
        }
    }
}
