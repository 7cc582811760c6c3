//! Experience points and the level curve.
//!
//! XP is granted in whole points. Surplus carries over into the next level,
//! so one large grant can cross several thresholds; each crossing emits its
//! own [`Signal::LevelUp`].

use serde::{Deserialize, Serialize};

use crate::signals::{Signal, SignalLog};

/// Shape of the level curve.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceConfig {
    /// XP needed to go from level 1 to level 2.
    pub base_xp_to_next: i64,
    /// Extra XP required for each level after the first.
    pub xp_per_level: i64,
}

impl Default for ExperienceConfig {
    fn default() -> Self {
        Self {
            base_xp_to_next: 100,
            xp_per_level: 25,
        }
    }
}

/// XP required to advance from `level` to `level + 1`.
///
/// `100 + (level - 1) * 25` with the default curve. Never returns less than 1.
pub fn xp_to_next(level: u32, config: &ExperienceConfig) -> i64 {
    let steps = i64::from(level.max(1) - 1);
    config
        .base_xp_to_next
        .saturating_add(steps.saturating_mul(config.xp_per_level))
        .max(1)
}

/// Level and XP progress of one courier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperienceLedger {
    level: u32,
    current_xp: i64,
    xp_to_next: i64,
    config: ExperienceConfig,
}

impl ExperienceLedger {
    pub fn new(config: ExperienceConfig) -> Self {
        Self {
            level: 1,
            current_xp: 0,
            xp_to_next: xp_to_next(1, &config),
            config,
        }
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn current_xp(&self) -> i64 {
        self.current_xp
    }

    pub fn xp_to_next(&self) -> i64 {
        self.xp_to_next
    }

    /// Progress toward the next level in `[0, 1)`.
    pub fn normalized(&self) -> f32 {
        if self.xp_to_next <= 0 {
            return 0.0;
        }
        self.current_xp as f32 / self.xp_to_next as f32
    }

    /// Grant XP, carrying surplus across as many levels as it covers.
    ///
    /// Emits `XpGained(amount)` first, one `LevelUp` per level crossed, then a
    /// single `XpChanged`. Non-positive amounts are ignored. Returns the number
    /// of levels gained.
    pub fn add_xp(&mut self, amount: i64, signals: &mut SignalLog) -> u32 {
        if amount <= 0 {
            return 0;
        }

        signals.emit(Signal::XpGained(amount));
        self.current_xp = self.current_xp.saturating_add(amount);

        let mut gained = 0;
        while self.current_xp >= self.xp_to_next {
            self.current_xp -= self.xp_to_next;
            self.level = self.level.saturating_add(1);
            self.xp_to_next = xp_to_next(self.level, &self.config);
            gained += 1;
            log::info!(
                "Reached level {} (next level at {} XP)",
                self.level,
                self.xp_to_next
            );
            signals.emit(Signal::LevelUp(self.level));
        }

        signals.emit(Signal::XpChanged);
        gained
    }
}

impl Default for ExperienceLedger {
    fn default() -> Self {
        Self::new(ExperienceConfig::default())
    }
}
