//! Skill tracks, levels, and derived stats.
//!
//! The courier has five independent tracks. Each level-up increments one
//! track by exactly one; levels never decrease. Everything the rest of the
//! core needs from the tree is a derived stat recomputed on demand from the
//! current levels and the [`SkillTreeConfig`] tuning.
//!
//! ```
//! use postal_logic::signals::SignalLog;
//! use postal_logic::skills::{SkillTrack, SkillTree, SkillTreeConfig};
//!
//! let mut tree = SkillTree::new(SkillTreeConfig::default());
//! let mut signals = SignalLog::new();
//! assert_eq!(tree.capacity(), 15);
//! tree.level_up(SkillTrack::Capacity, &mut signals);
//! assert_eq!(tree.capacity(), 18);
//! ```

use serde::{Deserialize, Serialize};

use crate::signals::{Signal, SignalLog};

/// Progression axes a courier can invest level-ups in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SkillTrack {
    Capacity = 0,
    Delivery = 1,
    Health = 2,
    Movement = 3,
    Knowledge = 4,
}

impl SkillTrack {
    /// All tracks in order.
    pub const ALL: [SkillTrack; 5] = [
        SkillTrack::Capacity,
        SkillTrack::Delivery,
        SkillTrack::Health,
        SkillTrack::Movement,
        SkillTrack::Knowledge,
    ];

    /// Map a raw track id coming from a collaborator. Unknown ids are `None`.
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            0 => Some(Self::Capacity),
            1 => Some(Self::Delivery),
            2 => Some(Self::Health),
            3 => Some(Self::Movement),
            4 => Some(Self::Knowledge),
            _ => None,
        }
    }

    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Capacity => "Capacity",
            Self::Delivery => "Delivery",
            Self::Health => "Health",
            Self::Movement => "Movement",
            Self::Knowledge => "Knowledge",
        }
    }
}

/// Current level of every track.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillLevels {
    pub capacity: u32,
    pub delivery: u32,
    pub health: u32,
    pub movement: u32,
    pub knowledge: u32,
}

impl SkillLevels {
    pub fn get(&self, track: SkillTrack) -> u32 {
        match track {
            SkillTrack::Capacity => self.capacity,
            SkillTrack::Delivery => self.delivery,
            SkillTrack::Health => self.health,
            SkillTrack::Movement => self.movement,
            SkillTrack::Knowledge => self.knowledge,
        }
    }

    fn slot(&mut self, track: SkillTrack) -> &mut u32 {
        match track {
            SkillTrack::Capacity => &mut self.capacity,
            SkillTrack::Delivery => &mut self.delivery,
            SkillTrack::Health => &mut self.health,
            SkillTrack::Movement => &mut self.movement,
            SkillTrack::Knowledge => &mut self.knowledge,
        }
    }
}

/// Tuning constants for the derived-stat formulas.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillTreeConfig {
    /// Levels the courier starts with.
    pub starting_levels: SkillLevels,
    /// Packages carried at Capacity level 0.
    pub base_capacity: u32,
    /// Extra packages per Capacity level.
    pub capacity_per_level: u32,
    /// Seconds to hand over one package at Delivery level 0.
    pub base_delivery_seconds: f32,
    /// Per-level factor applied to delivery time, strictly inside (0, 1).
    pub delivery_multiplier_per_level: f32,
    /// Hearts at Health level 0.
    pub base_hearts: u32,
    /// Move speed gained per Movement level (0.10 = +10%).
    pub movement_percent_per_level: f32,
    /// Bonus XP per delivered package for each Knowledge level.
    pub knowledge_xp_per_level: i64,
}

impl Default for SkillTreeConfig {
    fn default() -> Self {
        Self {
            starting_levels: SkillLevels::default(),
            base_capacity: 15,
            capacity_per_level: 3,
            base_delivery_seconds: 2.0,
            delivery_multiplier_per_level: 0.9,
            base_hearts: 1,
            movement_percent_per_level: 0.10,
            knowledge_xp_per_level: 2,
        }
    }
}

/// The courier's skill levels plus the tuning that turns them into stats.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillTree {
    levels: SkillLevels,
    config: SkillTreeConfig,
}

impl SkillTree {
    pub fn new(config: SkillTreeConfig) -> Self {
        Self {
            levels: config.starting_levels.clone(),
            config,
        }
    }

    pub fn levels(&self) -> &SkillLevels {
        &self.levels
    }

    pub fn config(&self) -> &SkillTreeConfig {
        &self.config
    }

    pub fn level(&self, track: SkillTrack) -> u32 {
        self.levels.get(track)
    }

    /// Level for a raw track id; 0 when the id names no track.
    pub fn level_of_id(&self, id: u8) -> u32 {
        SkillTrack::from_id(id).map_or(0, |track| self.level(track))
    }

    /// Raise `track` by one level and announce the new level.
    pub fn level_up(&mut self, track: SkillTrack, signals: &mut SignalLog) -> u32 {
        let slot = self.levels.slot(track);
        *slot = slot.saturating_add(1);
        let level = *slot;
        log::info!("Skill {} raised to level {}", track.name(), level);
        signals.emit(Signal::SkillLevelChanged { track, level });
        level
    }

    /// Level up by raw track id. Unknown ids change nothing and emit nothing.
    pub fn level_up_id(&mut self, id: u8, signals: &mut SignalLog) -> Option<u32> {
        SkillTrack::from_id(id).map(|track| self.level_up(track, signals))
    }

    // ── Derived stats ──────────────────────────────────────────────────

    /// Maximum packages the courier can hold.
    pub fn capacity(&self) -> u32 {
        self.config
            .base_capacity
            .saturating_add(self.levels.capacity.saturating_mul(self.config.capacity_per_level))
    }

    /// Unclamped seconds per package. Callers apply their own minimum.
    pub fn delivery_seconds(&self) -> f32 {
        let exponent = i32::try_from(self.levels.delivery).unwrap_or(i32::MAX);
        self.config.base_delivery_seconds * self.config.delivery_multiplier_per_level.powi(exponent)
    }

    pub fn max_hearts(&self) -> u32 {
        self.config.base_hearts.saturating_add(self.levels.health)
    }

    /// Multiplier applied to walk and run speed by the locomotion layer.
    pub fn move_speed_multiplier(&self) -> f32 {
        1.0 + self.levels.movement as f32 * self.config.movement_percent_per_level
    }

    /// Flat XP added to every successful delivery.
    pub fn knowledge_bonus_per_delivery(&self) -> i64 {
        i64::from(self.levels.knowledge).saturating_mul(self.config.knowledge_xp_per_level)
    }

    /// Player-facing summary of what a track currently does.
    pub fn describe(&self, track: SkillTrack) -> String {
        let level = self.level(track);
        let cfg = &self.config;
        match track {
            SkillTrack::Capacity => format!(
                "Max packages: {}  (Base {}, +{}/lvl)\nCurrent level: {}",
                self.capacity(),
                cfg.base_capacity,
                cfg.capacity_per_level,
                level
            ),
            SkillTrack::Delivery => format!(
                "Seconds/package: {:.2}s  (Base {:.2}s, -{:.0}%/lvl)\nCurrent level: {}",
                self.delivery_seconds(),
                cfg.base_delivery_seconds,
                (1.0 - cfg.delivery_multiplier_per_level) * 100.0,
                level
            ),
            SkillTrack::Health => {
                format!("Hearts: {}\nCurrent level: {}", self.max_hearts(), level)
            }
            SkillTrack::Movement => format!(
                "Move multiplier: x{:.2}  (+{:.0}%/lvl)\nCurrent level: {}",
                self.move_speed_multiplier(),
                cfg.movement_percent_per_level * 100.0,
                level
            ),
            SkillTrack::Knowledge => format!(
                "Bonus XP per delivered package: +{}\n(also boosts streak deliveries)\nCurrent level: {}",
                self.knowledge_bonus_per_delivery(),
                level
            ),
        }
    }
}

impl Default for SkillTree {
    fn default() -> Self {
        Self::new(SkillTreeConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> SkillTree {
        SkillTree::default()
    }

    #[test]
    fn fresh_tree_has_zero_levels() {
        let t = tree();
        for track in SkillTrack::ALL {
            assert_eq!(t.level(track), 0);
        }
    }

    #[test]
    fn unknown_track_id_reads_zero() {
        let t = tree();
        assert_eq!(t.level_of_id(5), 0);
        assert_eq!(t.level_of_id(255), 0);
    }

    #[test]
    fn track_ids_round_trip() {
        for track in SkillTrack::ALL {
            assert_eq!(SkillTrack::from_id(track.id()), Some(track));
        }
        assert_eq!(SkillTrack::from_id(9), None);
    }

    #[test]
    fn level_up_increments_by_one_and_signals() {
        let mut t = tree();
        let mut signals = SignalLog::new();
        assert_eq!(t.level_up(SkillTrack::Knowledge, &mut signals), 1);
        assert_eq!(t.level_up(SkillTrack::Knowledge, &mut signals), 2);
        assert_eq!(t.level(SkillTrack::Knowledge), 2);
        assert_eq!(t.level(SkillTrack::Capacity), 0);
        assert_eq!(
            signals.as_slice(),
            &[
                Signal::SkillLevelChanged {
                    track: SkillTrack::Knowledge,
                    level: 1
                },
                Signal::SkillLevelChanged {
                    track: SkillTrack::Knowledge,
                    level: 2
                },
            ]
        );
    }

    #[test]
    fn level_up_unknown_id_is_silent() {
        let mut t = tree();
        let mut signals = SignalLog::new();
        assert_eq!(t.level_up_id(42, &mut signals), None);
        assert!(signals.is_empty());
        assert_eq!(t.level_up_id(2, &mut signals), Some(1));
        assert_eq!(t.level(SkillTrack::Health), 1);
    }

    #[test]
    fn capacity_scales_per_level() {
        let mut t = tree();
        let mut signals = SignalLog::new();
        assert_eq!(t.capacity(), 15);
        t.level_up(SkillTrack::Capacity, &mut signals);
        t.level_up(SkillTrack::Capacity, &mut signals);
        assert_eq!(t.capacity(), 21);
    }

    #[test]
    fn delivery_gets_ten_percent_faster() {
        let mut t = tree();
        let mut signals = SignalLog::new();
        assert!((t.delivery_seconds() - 2.0).abs() < f32::EPSILON);
        t.level_up(SkillTrack::Delivery, &mut signals);
        assert!((t.delivery_seconds() - 1.8).abs() < 1e-5);
        t.level_up(SkillTrack::Delivery, &mut signals);
        assert!((t.delivery_seconds() - 1.62).abs() < 1e-5);
    }

    #[test]
    fn delivery_time_stays_positive_at_high_levels() {
        let config = SkillTreeConfig {
            starting_levels: SkillLevels {
                delivery: 500,
                ..SkillLevels::default()
            },
            ..SkillTreeConfig::default()
        };
        let t = SkillTree::new(config);
        assert!(t.delivery_seconds() >= 0.0);
        assert!(t.delivery_seconds() < 0.05);
    }

    #[test]
    fn knowledge_bonus_saturates() {
        let config = SkillTreeConfig {
            starting_levels: SkillLevels {
                knowledge: u32::MAX,
                ..SkillLevels::default()
            },
            knowledge_xp_per_level: i64::MAX,
            ..SkillTreeConfig::default()
        };
        assert_eq!(SkillTree::new(config).knowledge_bonus_per_delivery(), i64::MAX);
    }

    #[test]
    fn hearts_movement_knowledge() {
        let mut t = tree();
        let mut signals = SignalLog::new();
        assert_eq!(t.max_hearts(), 1);
        assert!((t.move_speed_multiplier() - 1.0).abs() < f32::EPSILON);
        assert_eq!(t.knowledge_bonus_per_delivery(), 0);

        t.level_up(SkillTrack::Health, &mut signals);
        t.level_up(SkillTrack::Movement, &mut signals);
        t.level_up(SkillTrack::Movement, &mut signals);
        t.level_up(SkillTrack::Knowledge, &mut signals);

        assert_eq!(t.max_hearts(), 2);
        assert!((t.move_speed_multiplier() - 1.2).abs() < 1e-5);
        assert_eq!(t.knowledge_bonus_per_delivery(), 2);
    }

    #[test]
    fn starting_levels_come_from_config() {
        let config = SkillTreeConfig {
            starting_levels: SkillLevels {
                capacity: 2,
                knowledge: 3,
                ..SkillLevels::default()
            },
            ..SkillTreeConfig::default()
        };
        let t = SkillTree::new(config);
        assert_eq!(t.capacity(), 21);
        assert_eq!(t.knowledge_bonus_per_delivery(), 6);
    }

    #[test]
    fn descriptions_mention_current_level() {
        let mut t = tree();
        let mut signals = SignalLog::new();
        t.level_up(SkillTrack::Capacity, &mut signals);
        let text = t.describe(SkillTrack::Capacity);
        assert!(text.contains("Max packages: 18"));
        assert!(text.contains("Current level: 1"));
        assert!(t.describe(SkillTrack::Delivery).contains("2.00s"));
        for track in SkillTrack::ALL {
            assert!(!t.describe(track).is_empty());
        }
    }
}
