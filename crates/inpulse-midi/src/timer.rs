//! Deferred-action queue
//!
//! Stands in for the host's timer facility. Every pending piece of deferred
//! work is a [`DeferredAction`] value with a deadline on the controller's
//! clock; nothing is stored as a closure, so pending work can be inspected,
//! cancelled and logged.
//!
//! The queue never reads a wall clock. The owner passes `now` in and drains
//! due entries with [`TimerQueue::pop_due`].

use crate::types::DeckChannel;
use std::time::Duration;

/// Handle for a scheduled action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// Work that can be scheduled on the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredAction {
    /// Periodic tempo/phase indicator evaluation
    TempoTick,
    /// End of a slicer audition: leave slip mode on the channel
    SlicerExit { channel: DeckChannel },
    /// Second reloop toggle issued after a looped slicer exit, once the
    /// engine has had time to resolve slip mode
    ReloopCorrection { channel: DeckChannel },
}

#[derive(Debug, Clone)]
struct TimerEntry {
    id: TimerId,
    deadline: Duration,
    period: Option<Duration>,
    action: DeferredAction,
}

/// Pending deferred actions, ordered by deadline then scheduling order
#[derive(Debug, Default)]
pub struct TimerQueue {
    entries: Vec<TimerEntry>,
    next_id: u64,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a one-shot action `delay` after `now`
    pub fn schedule_once(&mut self, now: Duration, delay: Duration, action: DeferredAction) -> TimerId {
        self.insert(now.saturating_add(delay), None, action)
    }

    /// Schedule an action every `period`, first firing one period after `now`
    ///
    /// A zero period is clamped to 1ms so a periodic entry can never starve
    /// the queue.
    pub fn schedule_periodic(&mut self, now: Duration, period: Duration, action: DeferredAction) -> TimerId {
        let period = period.max(Duration::from_millis(1));
        self.insert(now.saturating_add(period), Some(period), action)
    }

    fn insert(&mut self, deadline: Duration, period: Option<Duration>, action: DeferredAction) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        log::trace!("timer {:?}: {:?} at {:?}", id, action, deadline);
        self.entries.push(TimerEntry {
            id,
            deadline,
            period,
            action,
        });
        id
    }

    /// Cancel a pending action
    ///
    /// Returns false if the timer already fired (one-shot) or was never scheduled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    /// Drop every pending action
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Earliest pending deadline
    pub fn next_deadline(&self) -> Option<Duration> {
        self.entries.iter().map(|e| e.deadline).min()
    }

    /// Number of pending actions
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pending actions in scheduling order
    pub fn pending(&self) -> impl Iterator<Item = (TimerId, DeferredAction)> + '_ {
        self.entries.iter().map(|e| (e.id, e.action))
    }

    /// Remove and return the earliest action due at `now`
    ///
    /// Periodic actions are re-armed one period after their deadline. If the
    /// owner fell behind by more than a period, missed ticks are skipped
    /// rather than replayed.
    pub fn pop_due(&mut self, now: Duration) -> Option<(TimerId, DeferredAction)> {
        let idx = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.deadline <= now)
            .min_by_key(|(_, e)| (e.deadline, e.id))
            .map(|(i, _)| i)?;

        match self.entries[idx].period {
            Some(period) => {
                let entry = &mut self.entries[idx];
                let mut next = entry.deadline.saturating_add(period);
                if next <= now {
                    next = now.saturating_add(period);
                }
                entry.deadline = next;
                Some((entry.id, entry.action))
            }
            None => {
                let entry = self.entries.remove(idx);
                Some((entry.id, entry.action))
            }
        }
    }
}

/// Convert a millisecond delay computed from beat math into a `Duration`
///
/// Returns `None` for negative, non-finite or unrepresentable delays.
pub fn delay_from_ms(ms: f64) -> Option<Duration> {
    if ms < 0.0 {
        return None;
    }
    Duration::try_from_secs_f64(ms / 1000.0).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_one_shot_fires_once() {
        let mut q = TimerQueue::new();
        let ch = DeckChannel::CHANNEL_1;
        let id = q.schedule_once(ms(0), ms(100), DeferredAction::SlicerExit { channel: ch });

        assert_eq!(q.pop_due(ms(99)), None);
        assert_eq!(q.pop_due(ms(100)), Some((id, DeferredAction::SlicerExit { channel: ch })));
        assert_eq!(q.pop_due(ms(500)), None);
        assert!(q.is_empty());
    }

    #[test]
    fn test_due_order_is_deadline_then_fifo() {
        let mut q = TimerQueue::new();
        let a = q.schedule_once(ms(0), ms(10), DeferredAction::TempoTick);
        let b = q.schedule_once(ms(0), ms(5), DeferredAction::TempoTick);
        let c = q.schedule_once(ms(0), ms(10), DeferredAction::TempoTick);

        assert_eq!(q.pop_due(ms(20)).map(|(id, _)| id), Some(b));
        assert_eq!(q.pop_due(ms(20)).map(|(id, _)| id), Some(a));
        assert_eq!(q.pop_due(ms(20)).map(|(id, _)| id), Some(c));
    }

    #[test]
    fn test_periodic_rearms_and_skips_missed_ticks() {
        let mut q = TimerQueue::new();
        let id = q.schedule_periodic(ms(0), ms(250), DeferredAction::TempoTick);

        assert_eq!(q.next_deadline(), Some(ms(250)));
        assert_eq!(q.pop_due(ms(250)).map(|(i, _)| i), Some(id));
        assert_eq!(q.next_deadline(), Some(ms(500)));

        // Fell behind by several periods: one tick, then rescheduled from now
        assert!(q.pop_due(ms(2000)).is_some());
        assert_eq!(q.pop_due(ms(2000)), None);
        assert_eq!(q.next_deadline(), Some(ms(2250)));
    }

    #[test]
    fn test_far_deadline_saturates() {
        let mut q = TimerQueue::new();
        q.schedule_once(Duration::MAX, ms(10), DeferredAction::TempoTick);
        assert_eq!(q.next_deadline(), Some(Duration::MAX));
    }

    #[test]
    fn test_cancel() {
        let mut q = TimerQueue::new();
        let id = q.schedule_once(ms(0), ms(10), DeferredAction::TempoTick);
        assert_eq!(q.len(), 1);
        assert!(q.cancel(id));
        assert!(!q.cancel(id));
        assert_eq!(q.pop_due(ms(100)), None);
    }

    #[test]
    fn test_delay_from_ms_rejects_invalid() {
        assert_eq!(delay_from_ms(250.0), Some(ms(250)));
        assert_eq!(delay_from_ms(f64::INFINITY), None);
        assert_eq!(delay_from_ms(f64::NAN), None);
        assert_eq!(delay_from_ms(-1.0), None);
        // Finite but far beyond what a Duration can hold
        assert_eq!(delay_from_ms(3e304), None);
    }
}
