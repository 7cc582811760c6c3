//! Heart-based health pool.
//!
//! Maximum hearts follow the Health skill track and are floored at one.
//! What happens at zero hearts is the host's call.

use serde::{Deserialize, Serialize};

use crate::signals::{Signal, SignalLog};
use crate::skills::SkillTree;

/// Starting state of the heart pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    /// Hearts the courier spawns with, clamped to `[1, max]`.
    pub starting_hearts: u32,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self { starting_hearts: 1 }
    }
}

/// Current and maximum hearts. `current` never exceeds `max`, and `max` is
/// at least one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthPool {
    current: u32,
    max: u32,
}

impl HealthPool {
    pub fn new(skills: &SkillTree, config: &HealthConfig) -> Self {
        let max = skills.max_hearts().max(1);
        Self {
            current: config.starting_hearts.clamp(1, max),
            max,
        }
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn is_depleted(&self) -> bool {
        self.current == 0
    }

    /// Refresh max hearts after a Health level change.
    pub fn recompute_max(&mut self, skills: &SkillTree, signals: &mut SignalLog) {
        self.max = skills.max_hearts().max(1);
        self.current = self.current.min(self.max);
        signals.emit(Signal::HealthChanged);
    }

    pub fn take_damage(&mut self, amount: u32, signals: &mut SignalLog) {
        if amount == 0 {
            return;
        }
        self.current = self.current.saturating_sub(amount);
        signals.emit(Signal::HealthChanged);
    }

    pub fn heal(&mut self, amount: u32, signals: &mut SignalLog) {
        if amount == 0 {
            return;
        }
        self.current = self.current.saturating_add(amount).min(self.max);
        signals.emit(Signal::HealthChanged);
    }

    pub fn restore_full(&mut self, signals: &mut SignalLog) {
        self.current = self.max;
        signals.emit(Signal::HealthChanged);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skills::SkillTrack;

    #[test]
    fn starts_with_one_heart() {
        let skills = SkillTree::default();
        let pool = HealthPool::new(&skills, &HealthConfig::default());
        assert_eq!(pool.current(), 1);
        assert_eq!(pool.max(), 1);
    }

    #[test]
    fn starting_hearts_are_clamped() {
        let skills = SkillTree::default();
        let pool = HealthPool::new(&skills, &HealthConfig { starting_hearts: 9 });
        assert_eq!(pool.current(), 1);
        let pool = HealthPool::new(&skills, &HealthConfig { starting_hearts: 0 });
        assert_eq!(pool.current(), 1);
    }

    #[test]
    fn damage_floors_at_zero() {
        let skills = SkillTree::default();
        let mut pool = HealthPool::new(&skills, &HealthConfig::default());
        let mut signals = SignalLog::new();
        pool.take_damage(0, &mut signals);
        assert!(signals.is_empty());
        pool.take_damage(5, &mut signals);
        assert_eq!(pool.current(), 0);
        assert!(pool.is_depleted());
        assert_eq!(signals.as_slice(), &[Signal::HealthChanged]);
    }

    #[test]
    fn health_level_raises_max_not_current() {
        let mut skills = SkillTree::default();
        let mut pool = HealthPool::new(&skills, &HealthConfig::default());
        let mut signals = SignalLog::new();
        skills.level_up(SkillTrack::Health, &mut signals);
        skills.level_up(SkillTrack::Health, &mut signals);
        pool.recompute_max(&skills, &mut signals);
        assert_eq!(pool.max(), 3);
        assert_eq!(pool.current(), 1);

        pool.heal(1, &mut signals);
        assert_eq!(pool.current(), 2);
        pool.heal(10, &mut signals);
        assert_eq!(pool.current(), 3);
    }

    #[test]
    fn restore_full_fills_to_max() {
        let mut skills = SkillTree::default();
        let mut signals = SignalLog::new();
        skills.level_up(SkillTrack::Health, &mut signals);
        let mut pool = HealthPool::new(&skills, &HealthConfig::default());
        pool.take_damage(1, &mut signals);
        assert!(pool.is_depleted());
        pool.restore_full(&mut signals);
        assert_eq!(pool.current(), 2);
    }

    #[test]
    fn zero_base_hearts_still_has_one_max() {
        let skills = SkillTree::new(crate::skills::SkillTreeConfig {
            base_hearts: 0,
            ..Default::default()
        });
        let pool = HealthPool::new(&skills, &HealthConfig::default());
        assert_eq!(pool.max(), 1);
    }
}
