//! Pure progression logic for Postal.
//!
//! This crate contains the gameplay economy of a courier: the packages they
//! carry, the timed deliveries that turn packages into experience, the level
//! curve, and the skill tree whose levels feed back into all of it. Nothing
//! here knows about rendering, physics, or an engine. Collaborators feed in
//! raw input (zone enter/exit, pickups, frame time, skill picks) and read
//! back state and [`signals::Signal`]s.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | JSON-loadable tuning for every component, with validation |
//! | [`courier`] | Owner aggregate: entry points and signal feedback wiring |
//! | [`delivery`] | Per-zone delivery state machine, streak rewards |
//! | [`destination`] | Destination ids and the read-only registry |
//! | [`experience`] | XP ledger and level curve |
//! | [`health`] | Heart pool sized by the Health track |
//! | [`inventory`] | Capacity-bounded package counts per destination |
//! | [`rewards`] | Queued, one-at-a-time level-up skill picks |
//! | [`signals`] | Ordered output signals for presentation layers |
//! | [`skills`] | Five skill tracks and their derived stats |

pub mod config;
pub mod courier;
pub mod delivery;
pub mod destination;
pub mod experience;
pub mod health;
pub mod inventory;
pub mod rewards;
pub mod signals;
pub mod skills;
