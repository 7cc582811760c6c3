//! Timed, per-zone delivery sessions with streak rewards.
//!
//! While the courier stands in a delivery zone, packages for that zone's
//! destination are handed over one at a time. Each package takes
//! [`SkillTree::delivery_seconds`] (floored at a small minimum) of
//! accumulated `tick` time. Consecutive deliveries in the same zone build a
//! streak that raises the XP reward:
//!
//! | Streak position | 1 | 2 | 3 | 4 | 5 | 6 | 7 | 8 | 9 | 10 |
//! |-----------------|---|---|---|---|---|---|---|---|---|----|
//! | Base XP | 10 | 12 | 15 | 19 | 24 | 30 | 37 | 45 | 54 | 64 |
//!
//! Leaving the zone, switching zones, or running out of packages ends the
//! streak. A package that was only partly handed over earns nothing.
//!
//! ```
//! use postal_logic::delivery::base_xp;
//!
//! let rewards: Vec<i64> = (1..=4).map(base_xp).collect();
//! assert_eq!(rewards, vec![10, 12, 15, 19]);
//! ```

use serde::{Deserialize, Serialize};

use crate::destination::DestinationId;
use crate::experience::ExperienceLedger;
use crate::inventory::PackageInventory;
use crate::signals::{Signal, SignalLog};
use crate::skills::SkillTree;

/// Id of a delivery zone trigger in the world.
pub type ZoneId = u32;

/// XP for the first package of a streak with the default tuning.
pub const DEFAULT_BASE_XP: i64 = 10;

/// Timing and reward tuning for deliveries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliveryConfig {
    /// Lower bound on seconds per package, however high the Delivery level.
    pub min_duration_seconds: f32,
    /// XP for the first package of a streak.
    pub base_xp: i64,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            min_duration_seconds: 0.05,
            base_xp: DEFAULT_BASE_XP,
        }
    }
}

/// Base XP for the `streak_position`-th consecutive delivery (1-indexed).
pub fn base_xp(streak_position: u32) -> i64 {
    streak_reward(DEFAULT_BASE_XP, streak_position)
}

/// Streak reward on top of an arbitrary first-package XP.
///
/// The bonus grows by 2, 3, 4, ... per extra package: `k * (k + 3) / 2` with
/// `k = streak_position - 1`. Saturates instead of overflowing on absurd
/// streaks.
pub fn streak_reward(base: i64, streak_position: u32) -> i64 {
    let k = i64::from(streak_position.saturating_sub(1));
    base.saturating_add(k.saturating_mul(k + 3) / 2)
}

/// Announcer name for a finished streak, if it has one.
pub fn streak_title(count: u32) -> Option<&'static str> {
    match count {
        2 => Some("di-livery"),
        3 => Some("tri-livery"),
        4 => Some("tet-livery"),
        5 => Some("pent-livery"),
        6 => Some("hex-livery"),
        7 => Some("hept-livery"),
        8 => Some("oct-livery"),
        9 => Some("non-livery"),
        10 => Some("de-livery"),
        _ => None,
    }
}

/// Where the session is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DeliveryState {
    Inactive,
    Delivering {
        zone: ZoneId,
        destination: DestinationId,
        /// Seconds spent on the package currently being handed over.
        elapsed: f32,
    },
}

/// Collaborators a session reads and writes while delivering.
///
/// A missing inventory or ledger keeps the session inactive.
pub struct DeliveryDeps<'a> {
    pub skills: &'a SkillTree,
    pub inventory: Option<&'a mut PackageInventory>,
    pub ledger: Option<&'a mut ExperienceLedger>,
}

impl DeliveryDeps<'_> {
    fn ready(&self) -> bool {
        self.inventory.is_some() && self.ledger.is_some()
    }
}

/// Delivery state machine for one courier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliverySession {
    state: DeliveryState,
    streak: u32,
    config: DeliveryConfig,
}

impl DeliverySession {
    pub fn new(config: DeliveryConfig) -> Self {
        Self {
            state: DeliveryState::Inactive,
            streak: 0,
            config,
        }
    }

    pub fn state(&self) -> DeliveryState {
        self.state
    }

    pub fn is_delivering(&self) -> bool {
        matches!(self.state, DeliveryState::Delivering { .. })
    }

    pub fn active_zone(&self) -> Option<ZoneId> {
        match self.state {
            DeliveryState::Delivering { zone, .. } => Some(zone),
            DeliveryState::Inactive => None,
        }
    }

    /// Seconds into the current package; 0 when inactive.
    ///
    /// Stays below `required_duration` except right after a Delivery level-up
    /// shortens the timer mid-package. The next tick then completes that
    /// package, even with `dt == 0`.
    pub fn elapsed(&self) -> f32 {
        match self.state {
            DeliveryState::Delivering { elapsed, .. } => elapsed,
            DeliveryState::Inactive => 0.0,
        }
    }

    pub fn streak_count(&self) -> u32 {
        self.streak
    }

    /// Seconds one package takes at the current Delivery level.
    pub fn required_duration(&self, skills: &SkillTree) -> f32 {
        skills.delivery_seconds().max(self.config.min_duration_seconds)
    }

    /// The courier walked into `zone`, which delivers to `destination`.
    ///
    /// Zones without a destination are ignored. Entering a different zone
    /// ends the running streak first; re-entering the active zone changes
    /// nothing.
    pub fn enter_zone(
        &mut self,
        zone: ZoneId,
        destination: Option<DestinationId>,
        deps: &DeliveryDeps<'_>,
        signals: &mut SignalLog,
    ) {
        let Some(destination) = destination else {
            return;
        };
        if !deps.ready() {
            return;
        }

        if let DeliveryState::Delivering { zone: current, .. } = self.state {
            if current == zone {
                return;
            }
            log::debug!("Switching delivery from zone {} to zone {}", current, zone);
            self.stop(signals);
        }

        log::debug!(
            "Delivering to destination {} in zone {}",
            destination,
            zone
        );
        self.state = DeliveryState::Delivering {
            zone,
            destination,
            elapsed: 0.0,
        };
        self.streak = 0;
        signals.emit(Signal::DeliveryStarted { zone, destination });
    }

    /// The courier left `zone`. Ignored unless it is the active zone.
    pub fn exit_zone(&mut self, zone: ZoneId, signals: &mut SignalLog) {
        if self.active_zone() != Some(zone) {
            return;
        }
        log::debug!("Left delivery zone {}", zone);
        self.stop(signals);
    }

    /// Advance the package timer by `dt` seconds.
    ///
    /// Hands over at most one package per call. Stops the session when no
    /// package for the destination is left.
    pub fn tick(&mut self, dt: f32, deps: &mut DeliveryDeps<'_>, signals: &mut SignalLog) {
        let DeliveryState::Delivering {
            zone,
            destination,
            elapsed,
        } = self.state
        else {
            return;
        };
        let skills = deps.skills;
        let (Some(inventory), Some(ledger)) =
            (deps.inventory.as_deref_mut(), deps.ledger.as_deref_mut())
        else {
            return;
        };

        if inventory.count(destination) == 0 {
            log::debug!("Out of packages for destination {}", destination);
            self.stop(signals);
            return;
        }

        let required = self.required_duration(skills);
        let elapsed = elapsed + dt.max(0.0);
        signals.emit(Signal::DeliveryProgress((elapsed / required).clamp(0.0, 1.0)));

        if elapsed < required {
            self.state = DeliveryState::Delivering {
                zone,
                destination,
                elapsed,
            };
            return;
        }

        if !inventory.remove_one(destination, signals) {
            log::warn!(
                "Package for destination {} vanished mid-delivery; ending session",
                destination
            );
            self.stop(signals);
            return;
        }

        self.streak += 1;
        let reward = streak_reward(self.config.base_xp, self.streak)
            .saturating_add(skills.knowledge_bonus_per_delivery());
        signals.emit(Signal::PackageDelivered {
            destination,
            streak: self.streak,
            reward,
        });
        ledger.add_xp(reward, signals);

        self.state = DeliveryState::Delivering {
            zone,
            destination,
            elapsed: 0.0,
        };
    }

    fn end_streak(&mut self, signals: &mut SignalLog) {
        if self.streak >= 2 {
            log::info!(
                "Delivery streak of {} ended ({})",
                self.streak,
                streak_title(self.streak).unwrap_or("streak")
            );
            signals.emit(Signal::StreakEnded(self.streak));
        }
        self.streak = 0;
    }

    /// End the streak and drop any partial package progress.
    fn stop(&mut self, signals: &mut SignalLog) {
        self.end_streak(signals);
        self.state = DeliveryState::Inactive;
        signals.emit(Signal::DeliveryStopped);
    }
}

impl Default for DeliverySession {
    fn default() -> Self {
        Self::new(DeliveryConfig::default())
    }
}
