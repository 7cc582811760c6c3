//! Level-up reward choices.
//!
//! Every experience level-up owes the player one skill pick. Picks are
//! queued and presented strictly one at a time: three distinct tracks are
//! drawn, the player chooses one, the tree levels it, and the next owed
//! pick (if any) is presented immediately.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::signals::{Signal, SignalLog};
use crate::skills::{SkillTrack, SkillTree};

/// Number of tracks offered per pick.
pub const CHOICES_OFFERED: usize = 3;

/// How level-up skill picks are presented.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChoiceConfig {
    /// Freeze delivery timers while a pick is on screen.
    pub pause_while_choosing: bool,
    /// Fixed seed for the track draw; `None` seeds from OS entropy.
    pub seed: Option<u64>,
}

impl Default for ChoiceConfig {
    fn default() -> Self {
        Self {
            pause_while_choosing: true,
            seed: None,
        }
    }
}

/// Draw three distinct tracks with a Fisher–Yates shuffle of all five.
pub fn draw_distinct_tracks<R: Rng + ?Sized>(rng: &mut R) -> [SkillTrack; CHOICES_OFFERED] {
    let mut pool = SkillTrack::ALL;
    pool.shuffle(rng);
    [pool[0], pool[1], pool[2]]
}

/// Queues owed picks and serializes their presentation.
#[derive(Debug, Clone)]
pub struct LevelUpRewardCoordinator {
    pending: u32,
    offered: Option<[SkillTrack; CHOICES_OFFERED]>,
    rng: StdRng,
}

impl LevelUpRewardCoordinator {
    pub fn new(config: &ChoiceConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            pending: 0,
            offered: None,
            rng,
        }
    }

    /// Picks owed but not yet presented.
    pub fn pending(&self) -> u32 {
        self.pending
    }

    pub fn is_presenting(&self) -> bool {
        self.offered.is_some()
    }

    /// Tracks currently on offer.
    pub fn offered(&self) -> Option<[SkillTrack; CHOICES_OFFERED]> {
        self.offered
    }

    /// Record one owed pick for a level-up.
    pub fn enqueue_choice(&mut self) {
        self.pending = self.pending.saturating_add(1);
    }

    /// Present the next owed pick unless one is already showing.
    pub fn try_show_next(
        &mut self,
        signals: &mut SignalLog,
    ) -> Option<[SkillTrack; CHOICES_OFFERED]> {
        if self.offered.is_some() || self.pending == 0 {
            return None;
        }
        self.pending -= 1;
        let picks = draw_distinct_tracks(&mut self.rng);
        self.offered = Some(picks);
        signals.emit(Signal::SkillChoiceOffered(picks));
        Some(picks)
    }

    /// Resolve the presented pick with `track`.
    ///
    /// Rejected (returns `false`) when nothing is presented or `track` was
    /// not offered. On success the track is leveled exactly once and the
    /// next owed pick is presented.
    pub fn choose_track(
        &mut self,
        track: SkillTrack,
        skills: &mut SkillTree,
        signals: &mut SignalLog,
    ) -> bool {
        let Some(offered) = self.offered else {
            log::warn!("Skill {} chosen with no pick on screen", track.name());
            return false;
        };
        if !offered.contains(&track) {
            log::warn!("Skill {} was not among the offered tracks", track.name());
            return false;
        }

        skills.level_up(track, signals);
        self.offered = None;
        signals.emit(Signal::SkillChoiceResolved(track));
        self.try_show_next(signals);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn seeded(seed: u64) -> LevelUpRewardCoordinator {
        LevelUpRewardCoordinator::new(&ChoiceConfig {
            seed: Some(seed),
            ..ChoiceConfig::default()
        })
    }

    #[test]
    fn draws_are_always_distinct() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..500 {
            let [a, b, c] = draw_distinct_tracks(&mut rng);
            assert!(a != b && b != c && a != c);
        }
    }

    #[test]
    fn every_ordered_triple_is_reachable() {
        let mut rng = StdRng::seed_from_u64(99);
        let mut seen = HashSet::new();
        for _ in 0..20_000 {
            seen.insert(draw_distinct_tracks(&mut rng));
        }
        assert_eq!(seen.len(), 60);
    }

    #[test]
    fn nothing_to_show_without_level_ups() {
        let mut coord = seeded(3);
        let mut signals = SignalLog::new();
        assert_eq!(coord.try_show_next(&mut signals), None);
        assert!(!coord.is_presenting());
        assert!(signals.is_empty());
    }

    #[test]
    fn picks_are_presented_one_at_a_time() {
        let mut coord = seeded(3);
        let mut skills = SkillTree::default();
        let mut signals = SignalLog::new();

        coord.enqueue_choice();
        coord.enqueue_choice();
        let first = coord.try_show_next(&mut signals).expect("first pick");
        assert_eq!(coord.try_show_next(&mut signals), None);
        assert_eq!(coord.pending(), 1);

        assert!(coord.choose_track(first[0], &mut skills, &mut signals));
        assert_eq!(skills.level(first[0]), 1);
        // The second pick is shown straight away.
        assert!(coord.is_presenting());
        assert_eq!(coord.pending(), 0);

        let second = coord.offered().expect("second pick");
        assert!(coord.choose_track(second[2], &mut skills, &mut signals));
        assert!(!coord.is_presenting());
        assert_eq!(
            signals.count(|s| matches!(s, Signal::SkillChoiceOffered(_))),
            2
        );
        assert_eq!(
            signals.count(|s| matches!(s, Signal::SkillChoiceResolved(_))),
            2
        );
    }

    #[test]
    fn choosing_without_presentation_is_rejected() {
        let mut coord = seeded(5);
        let mut skills = SkillTree::default();
        let mut signals = SignalLog::new();
        assert!(!coord.choose_track(SkillTrack::Health, &mut skills, &mut signals));
        assert_eq!(skills.level(SkillTrack::Health), 0);
    }

    #[test]
    fn choosing_an_unoffered_track_is_rejected() {
        let mut coord = seeded(5);
        let mut skills = SkillTree::default();
        let mut signals = SignalLog::new();
        coord.enqueue_choice();
        let offered = coord.try_show_next(&mut signals).expect("pick");
        let missing = SkillTrack::ALL
            .into_iter()
            .find(|t| !offered.contains(t))
            .expect("two tracks are left out");
        assert!(!coord.choose_track(missing, &mut skills, &mut signals));
        assert_eq!(skills.level(missing), 0);
        assert!(coord.is_presenting());
    }

    #[test]
    fn same_seed_same_offers() {
        let mut a = seeded(42);
        let mut b = seeded(42);
        let mut signals = SignalLog::new();
        a.enqueue_choice();
        b.enqueue_choice();
        assert_eq!(a.try_show_next(&mut signals), b.try_show_next(&mut signals));
    }
}
