//! Output signals emitted by the progression core.
//!
//! Components never call back into their collaborators. Instead every
//! mutation appends [`Signal`]s to a [`SignalLog`] in the order they happen.
//! The owning [`Courier`](crate::courier::Courier) reacts to the ones that
//! feed back into the core (level-ups, skill changes) before the entry point
//! returns, and hands the full log to presentation collaborators.

use serde::{Deserialize, Serialize};

use crate::delivery::ZoneId;
use crate::destination::DestinationId;
use crate::skills::SkillTrack;

/// Something observable happened inside the core.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Signal {
    /// Held packages or capacity changed.
    InventoryChanged,
    /// A pickup was refused because the inventory is at capacity.
    PickupFailedFull,
    /// A delivery session bound itself to a zone.
    DeliveryStarted {
        zone: ZoneId,
        destination: DestinationId,
    },
    /// Normalized progress (0.0–1.0) of the package currently being handed over.
    DeliveryProgress(f32),
    /// One package left the inventory and earned `reward` XP.
    PackageDelivered {
        destination: DestinationId,
        streak: u32,
        reward: i64,
    },
    /// The delivery session returned to inactive.
    DeliveryStopped,
    /// A streak of two or more deliveries was interrupted or exhausted.
    StreakEnded(u32),
    /// Raw XP amount granted, before level carry-over.
    XpGained(i64),
    /// Ledger settled after an XP grant.
    XpChanged,
    /// Experience level reached.
    LevelUp(u32),
    SkillLevelChanged {
        track: SkillTrack,
        level: u32,
    },
    /// Three distinct tracks are offered to the player.
    SkillChoiceOffered([SkillTrack; 3]),
    SkillChoiceResolved(SkillTrack),
    /// Current or maximum hearts changed.
    HealthChanged,
}

/// Append-only, ordered record of emitted signals.
#[derive(Debug, Clone, Default)]
pub struct SignalLog {
    entries: Vec<Signal>,
}

impl SignalLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, signal: Signal) {
        self.entries.push(signal);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Signal> {
        self.entries.get(index).copied()
    }

    pub fn as_slice(&self) -> &[Signal] {
        &self.entries
    }

    /// Count signals matching a predicate.
    pub fn count(&self, pred: impl Fn(&Signal) -> bool) -> usize {
        self.entries.iter().filter(|s| pred(s)).count()
    }

    /// Take every recorded signal, leaving the log empty.
    pub fn drain(&mut self) -> Vec<Signal> {
        std::mem::take(&mut self.entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_preserves_emission_order() {
        let mut log = SignalLog::new();
        log.emit(Signal::XpGained(10));
        log.emit(Signal::LevelUp(2));
        log.emit(Signal::XpChanged);
        assert_eq!(
            log.as_slice(),
            &[Signal::XpGained(10), Signal::LevelUp(2), Signal::XpChanged]
        );
        assert_eq!(log.count(|s| matches!(s, Signal::LevelUp(_))), 1);
    }

    #[test]
    fn drain_empties_the_log() {
        let mut log = SignalLog::new();
        log.emit(Signal::InventoryChanged);
        let drained = log.drain();
        assert_eq!(drained, vec![Signal::InventoryChanged]);
        assert!(log.is_empty());
        assert_eq!(log.get(0), None);
    }
}
