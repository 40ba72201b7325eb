//! Deck targeting for the Inpulse 500
//!
//! Each physical side drives one of two engine channels at a time, selected
//! with the FX1-FX4 buttons:
//!
//! ```text
//! Left side  ──► Layer A: [Channel1]  │  Layer B: [Channel3]
//! Right side ──► Layer A: [Channel2]  │  Layer B: [Channel4]
//!
//! [FX1] / [FX3] select the left side's channel
//! [FX2] / [FX4] select the right side's channel
//! ```

use crate::types::{DeckChannel, DeckSlot};

/// Layer selection state for one side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayerSelection {
    /// Layer A (default): channels 1 & 2
    #[default]
    A,
    /// Layer B: channels 3 & 4
    B,
}

impl LayerSelection {
    /// Layer a channel belongs to
    fn of(channel: DeckChannel) -> Self {
        if channel.number() <= 2 {
            Self::A
        } else {
            Self::B
        }
    }

    /// Channel this layer selects on a side
    fn channel(self, slot: DeckSlot) -> DeckChannel {
        let [layer_a, layer_b] = slot.channels();
        match self {
            Self::A => layer_a,
            Self::B => layer_b,
        }
    }
}

/// Result of a binding change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rebind {
    pub slot: DeckSlot,
    /// Channel the side was bound to before
    pub previous: DeckChannel,
    /// Channel the side is bound to now
    pub current: DeckChannel,
}

/// Which channel each side currently drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeckBindings {
    /// Index 0 = left side, index 1 = right side
    layers: [LayerSelection; 2],
}

impl DeckBindings {
    /// Create with explicit initial channels
    ///
    /// Returns `None` if a channel lives on the other side.
    pub fn new(a: DeckChannel, b: DeckChannel) -> Option<Self> {
        if a.slot() != DeckSlot::A || b.slot() != DeckSlot::B {
            return None;
        }
        Some(Self {
            layers: [LayerSelection::of(a), LayerSelection::of(b)],
        })
    }

    /// Channel currently bound to a side
    pub fn channel(&self, slot: DeckSlot) -> DeckChannel {
        self.layers[slot.index()].channel(slot)
    }

    /// Both bound channels, left side first
    pub fn channels(&self) -> [DeckChannel; 2] {
        [self.channel(DeckSlot::A), self.channel(DeckSlot::B)]
    }

    /// Current layer of a side
    pub fn layer(&self, slot: DeckSlot) -> LayerSelection {
        self.layers[slot.index()]
    }

    /// Side a channel is bound to, if it is bound at all
    pub fn slot_of(&self, channel: DeckChannel) -> Option<DeckSlot> {
        let slot = channel.slot();
        (self.channel(slot) == channel).then_some(slot)
    }

    /// Check whether a channel is currently driven by a side
    pub fn is_bound(&self, channel: DeckChannel) -> bool {
        self.slot_of(channel).is_some()
    }

    /// Bind a channel to its side
    ///
    /// Returns `None` when the channel is already bound (nothing changes).
    pub fn bind(&mut self, channel: DeckChannel) -> Option<Rebind> {
        let slot = channel.slot();
        let previous = self.channel(slot);
        if previous == channel {
            return None;
        }
        self.layers[slot.index()] = LayerSelection::of(channel);
        Some(Rebind {
            slot,
            previous,
            current: channel,
        })
    }
}
