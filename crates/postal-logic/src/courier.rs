//! The courier: owner of one player's progression state.
//!
//! `Courier` is the single entry point collaborators talk to. Each input
//! runs the matching component operation and then reacts, in emission
//! order, to the signals that feed back into the core:
//!
//! * `LevelUp` owes a skill pick and presents it if none is showing.
//! * `SkillLevelChanged(Capacity)` refreshes the inventory's capacity.
//! * `SkillLevelChanged(Health)` refreshes max hearts.
//!
//! Reactions can emit further signals (a pick resolution levels a track,
//! which changes capacity). Dispatch keeps going until the log settles, so
//! every invariant holds again by the time an entry point returns.
//! Presentation collaborators collect the whole log with
//! [`Courier::drain_signals`].

use crate::config::ProgressionConfig;
use crate::delivery::{DeliveryDeps, DeliverySession, ZoneId};
use crate::destination::{DestinationId, DestinationRegistry};
use crate::experience::ExperienceLedger;
use crate::health::HealthPool;
use crate::inventory::PackageInventory;
use crate::rewards::LevelUpRewardCoordinator;
use crate::signals::{Signal, SignalLog};
use crate::skills::{SkillTrack, SkillTree};

/// One courier's progression: every component plus the signals they emit.
///
/// Hosts drive it through the input methods and read results back through
/// the queries and [`Courier::drain_signals`].
pub struct Courier {
    skills: SkillTree,
    experience: ExperienceLedger,
    inventory: PackageInventory,
    health: HealthPool,
    delivery: DeliverySession,
    rewards: LevelUpRewardCoordinator,
    destinations: Option<DestinationRegistry>,
    pause_while_choosing: bool,
    signals: SignalLog,
    /// Signals before this index have already been reacted to.
    dispatched: usize,
}

impl Courier {
    pub fn new(config: ProgressionConfig) -> Self {
        let skills = SkillTree::new(config.skills);
        let inventory = PackageInventory::new(&skills);
        let health = HealthPool::new(&skills, &config.health);
        Self {
            experience: ExperienceLedger::new(config.experience),
            inventory,
            health,
            delivery: DeliverySession::new(config.delivery),
            rewards: LevelUpRewardCoordinator::new(&config.choices),
            destinations: None,
            pause_while_choosing: config.choices.pause_while_choosing,
            skills,
            signals: SignalLog::new(),
            dispatched: 0,
        }
    }

    /// Only accept destinations registered in `registry`.
    pub fn with_destinations(mut self, registry: DestinationRegistry) -> Self {
        self.destinations = Some(registry);
        self
    }

    // ── Queries ────────────────────────────────────────────────────────

    pub fn skills(&self) -> &SkillTree {
        &self.skills
    }

    pub fn experience(&self) -> &ExperienceLedger {
        &self.experience
    }

    pub fn inventory(&self) -> &PackageInventory {
        &self.inventory
    }

    pub fn health(&self) -> &HealthPool {
        &self.health
    }

    pub fn delivery(&self) -> &DeliverySession {
        &self.delivery
    }

    pub fn rewards(&self) -> &LevelUpRewardCoordinator {
        &self.rewards
    }

    pub fn destinations(&self) -> Option<&DestinationRegistry> {
        self.destinations.as_ref()
    }

    /// Whether delivery timers are frozen for an on-screen skill pick.
    pub fn is_paused(&self) -> bool {
        self.pause_while_choosing && self.rewards.is_presenting()
    }

    /// Signals emitted since the last drain, oldest first.
    pub fn pending_signals(&self) -> &[Signal] {
        self.signals.as_slice()
    }

    /// Hand every emitted signal to the caller.
    pub fn drain_signals(&mut self) -> Vec<Signal> {
        self.dispatched = 0;
        self.signals.drain()
    }

    // ── Inputs ─────────────────────────────────────────────────────────

    /// A dropped package touched the courier. Returns whether it was taken.
    pub fn pick_up(&mut self, raw_destination: i64) -> bool {
        let Some(destination) = self.resolve(raw_destination) else {
            return false;
        };
        let taken = self.inventory.try_add(destination, &mut self.signals);
        self.dispatch();
        taken
    }

    /// The courier entered a zone bound to `raw_destination`.
    pub fn enter_zone(&mut self, zone: ZoneId, raw_destination: i64) {
        let destination = self.resolve(raw_destination);
        let deps = DeliveryDeps {
            skills: &self.skills,
            inventory: Some(&mut self.inventory),
            ledger: Some(&mut self.experience),
        };
        self.delivery
            .enter_zone(zone, destination, &deps, &mut self.signals);
        self.dispatch();
    }

    pub fn exit_zone(&mut self, zone: ZoneId) {
        self.delivery.exit_zone(zone, &mut self.signals);
        self.dispatch();
    }

    /// Advance one frame of `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        let dt = if self.is_paused() { 0.0 } else { dt };
        let mut deps = DeliveryDeps {
            skills: &self.skills,
            inventory: Some(&mut self.inventory),
            ledger: Some(&mut self.experience),
        };
        self.delivery.tick(dt, &mut deps, &mut self.signals);
        self.dispatch();
    }

    /// Resolve the on-screen skill pick. Returns `false` if it was rejected.
    pub fn choose_track(&mut self, track: SkillTrack) -> bool {
        let chosen = self
            .rewards
            .choose_track(track, &mut self.skills, &mut self.signals);
        self.dispatch();
        chosen
    }

    pub fn take_damage(&mut self, amount: u32) {
        self.health.take_damage(amount, &mut self.signals);
        self.dispatch();
    }

    pub fn heal(&mut self, amount: u32) {
        self.health.heal(amount, &mut self.signals);
        self.dispatch();
    }

    pub fn restore_full_health(&mut self) {
        self.health.restore_full(&mut self.signals);
        self.dispatch();
    }

    // ── Internals ──────────────────────────────────────────────────────

    fn resolve(&self, raw: i64) -> Option<DestinationId> {
        let id = DestinationId::from_raw(raw)?;
        match &self.destinations {
            Some(registry) if !registry.contains(id) => {
                log::debug!("Ignoring unregistered destination {}", id);
                None
            }
            _ => Some(id),
        }
    }

    /// React to every signal not yet handled, including ones the reactions
    /// themselves emit.
    fn dispatch(&mut self) {
        while let Some(signal) = self.signals.get(self.dispatched) {
            self.dispatched += 1;
            match signal {
                Signal::LevelUp(_) => {
                    self.rewards.enqueue_choice();
                    self.rewards.try_show_next(&mut self.signals);
                }
                Signal::SkillLevelChanged {
                    track: SkillTrack::Capacity,
                    ..
                } => {
                    self.inventory
                        .recompute_capacity(&self.skills, &mut self.signals);
                }
                Signal::SkillLevelChanged {
                    track: SkillTrack::Health,
                    ..
                } => {
                    self.health.recompute_max(&self.skills, &mut self.signals);
                }
                _ => {}
            }
        }
    }
}

impl Default for Courier {
    fn default() -> Self {
        Self::new(ProgressionConfig::default())
    }
}
