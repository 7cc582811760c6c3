//! Capacity-bounded package inventory.
//!
//! Packages are counted per destination. Zero counts are never stored, and
//! the total held never exceeds the capacity cached from the skill tree.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::destination::DestinationId;
use crate::signals::{Signal, SignalLog};
use crate::skills::SkillTree;

/// Packages held per destination, bounded by the Capacity track.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageInventory {
    counts: BTreeMap<DestinationId, u32>,
    capacity: u32,
}

impl PackageInventory {
    /// Empty inventory sized from the current Capacity level.
    pub fn new(skills: &SkillTree) -> Self {
        Self {
            counts: BTreeMap::new(),
            capacity: skills.capacity(),
        }
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn total_held(&self) -> u32 {
        self.counts.values().sum()
    }

    pub fn is_full(&self) -> bool {
        self.total_held() >= self.capacity
    }

    pub fn count(&self, destination: DestinationId) -> u32 {
        self.counts.get(&destination).copied().unwrap_or(0)
    }

    /// Held packages per destination, ordered by id.
    pub fn counts(&self) -> impl Iterator<Item = (DestinationId, u32)> + '_ {
        self.counts.iter().map(|(&id, &count)| (id, count))
    }

    /// Take one package for `destination` if there is room.
    pub fn try_add(&mut self, destination: DestinationId, signals: &mut SignalLog) -> bool {
        if self.is_full() {
            log::debug!(
                "Pickup for destination {} refused: {}/{} held",
                destination,
                self.total_held(),
                self.capacity
            );
            signals.emit(Signal::PickupFailedFull);
            return false;
        }

        *self.counts.entry(destination).or_insert(0) += 1;
        signals.emit(Signal::InventoryChanged);
        true
    }

    /// Drop one package for `destination`. Fails if none are held.
    pub fn remove_one(&mut self, destination: DestinationId, signals: &mut SignalLog) -> bool {
        let Some(count) = self.counts.get_mut(&destination) else {
            return false;
        };
        if *count <= 1 {
            self.counts.remove(&destination);
        } else {
            *count -= 1;
        }
        signals.emit(Signal::InventoryChanged);
        true
    }

    /// Refresh the cached capacity after a Capacity level change.
    ///
    /// Holdings are never evicted. Capacity only grows because skill levels
    /// only grow, so the bound keeps holding.
    pub fn recompute_capacity(&mut self, skills: &SkillTree, signals: &mut SignalLog) {
        self.capacity = skills.capacity();
        signals.emit(Signal::InventoryChanged);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skills::SkillTrack;

    fn setup() -> (SkillTree, PackageInventory, SignalLog) {
        let skills = SkillTree::default();
        let inventory = PackageInventory::new(&skills);
        (skills, inventory, SignalLog::new())
    }

    #[test]
    fn empty_inventory() {
        let (_, inv, _) = setup();
        assert_eq!(inv.capacity(), 15);
        assert_eq!(inv.total_held(), 0);
        assert_eq!(inv.count(DestinationId(3)), 0);
        assert!(!inv.is_full());
    }

    #[test]
    fn add_and_count_per_destination() {
        let (_, mut inv, mut signals) = setup();
        assert!(inv.try_add(DestinationId(1), &mut signals));
        assert!(inv.try_add(DestinationId(1), &mut signals));
        assert!(inv.try_add(DestinationId(2), &mut signals));
        assert_eq!(inv.count(DestinationId(1)), 2);
        assert_eq!(inv.count(DestinationId(2)), 1);
        assert_eq!(inv.total_held(), 3);
        assert_eq!(signals.count(|s| *s == Signal::InventoryChanged), 3);
    }

    #[test]
    fn sixteenth_pickup_fails_at_capacity_fifteen() {
        let (_, mut inv, mut signals) = setup();
        for i in 0..15 {
            assert!(inv.try_add(DestinationId(i % 4), &mut signals));
        }
        assert!(inv.is_full());
        assert!(!inv.try_add(DestinationId(0), &mut signals));
        assert_eq!(inv.total_held(), 15);
        assert_eq!(signals.as_slice().last(), Some(&Signal::PickupFailedFull));
        assert_eq!(signals.count(|s| *s == Signal::PickupFailedFull), 1);
    }

    #[test]
    fn remove_drops_empty_entries() {
        let (_, mut inv, mut signals) = setup();
        inv.try_add(DestinationId(5), &mut signals);
        inv.try_add(DestinationId(5), &mut signals);
        assert!(inv.remove_one(DestinationId(5), &mut signals));
        assert_eq!(inv.count(DestinationId(5)), 1);
        assert!(inv.remove_one(DestinationId(5), &mut signals));
        assert_eq!(inv.count(DestinationId(5)), 0);
        assert_eq!(inv.counts().count(), 0);
    }

    #[test]
    fn remove_absent_fails_silently() {
        let (_, mut inv, mut signals) = setup();
        assert!(!inv.remove_one(DestinationId(8), &mut signals));
        assert!(signals.is_empty());
    }

    #[test]
    fn counts_are_ordered_and_positive() {
        let (_, mut inv, mut signals) = setup();
        for id in [9, 2, 9, 4] {
            inv.try_add(DestinationId(id), &mut signals);
        }
        let rows: Vec<_> = inv.counts().collect();
        assert_eq!(
            rows,
            vec![
                (DestinationId(2), 1),
                (DestinationId(4), 1),
                (DestinationId(9), 2)
            ]
        );
    }

    #[test]
    fn capacity_grows_with_skill() {
        let (mut skills, mut inv, mut signals) = setup();
        for _ in 0..15 {
            inv.try_add(DestinationId(1), &mut signals);
        }
        assert!(!inv.try_add(DestinationId(1), &mut signals));

        skills.level_up(SkillTrack::Capacity, &mut signals);
        // The cache is only refreshed when asked to.
        assert_eq!(inv.capacity(), 15);
        inv.recompute_capacity(&skills, &mut signals);
        assert_eq!(inv.capacity(), 18);

        for _ in 0..3 {
            assert!(inv.try_add(DestinationId(1), &mut signals));
        }
        assert!(!inv.try_add(DestinationId(1), &mut signals));
        assert_eq!(inv.total_held(), 18);
    }

    #[test]
    fn total_never_exceeds_capacity() {
        let (_, mut inv, mut signals) = setup();
        for i in 0..100u32 {
            inv.try_add(DestinationId(i % 7), &mut signals);
            assert!(inv.total_held() <= inv.capacity());
            if i % 5 == 0 {
                inv.remove_one(DestinationId(i % 7), &mut signals);
            }
        }
    }
}
