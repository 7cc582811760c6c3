//! Delivery destinations and the read-only registry that names them.
//!
//! The core only stores and compares [`DestinationId`]s. Display names live
//! in the [`DestinationRegistry`], which the host loads once and never
//! mutates.

use std::collections::HashMap;
use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Stable id of a registered destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DestinationId(pub u32);

impl DestinationId {
    /// Convert a raw id from a collaborator. Negative or out-of-range ids mean
    /// "no destination".
    pub fn from_raw(raw: i64) -> Option<Self> {
        u32::try_from(raw).ok().map(Self)
    }
}

impl fmt::Display for DestinationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A delivery target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    pub id: DestinationId,
    pub display_name: String,
}

/// Id-indexed set of destinations.
#[derive(Debug, Clone, Default)]
pub struct DestinationRegistry {
    destinations: Vec<Destination>,
    by_id: HashMap<DestinationId, usize>,
}

impl DestinationRegistry {
    /// Build a registry. When ids repeat, the later entry wins the lookup.
    pub fn new(destinations: Vec<Destination>) -> Self {
        let by_id = destinations
            .iter()
            .enumerate()
            .map(|(i, d)| (d.id, i))
            .collect();
        Self {
            destinations,
            by_id,
        }
    }

    /// Parse a JSON array of destinations, rejecting duplicate ids.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let destinations: Vec<Destination> = serde_json::from_str(json)?;
        let mut seen = HashMap::new();
        for d in &destinations {
            if let Some(previous) = seen.insert(d.id, d.display_name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "destination id {} used by both '{}' and '{}'",
                    d.id, previous, d.display_name
                )));
            }
        }
        Ok(Self::new(destinations))
    }

    pub fn get(&self, id: DestinationId) -> Option<&Destination> {
        self.by_id.get(&id).map(|&i| &self.destinations[i])
    }

    pub fn contains(&self, id: DestinationId) -> bool {
        self.by_id.contains_key(&id)
    }

    /// Display name, or `"Destination {id}"` for unregistered ids.
    pub fn display_name(&self, id: DestinationId) -> String {
        match self.get(id) {
            Some(d) => d.display_name.clone(),
            None => format!("Destination {}", id),
        }
    }

    /// Uniformly pick a registered destination. `None` when empty.
    pub fn random<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&Destination> {
        if self.destinations.is_empty() {
            return None;
        }
        let i = rng.gen_range(0..self.destinations.len());
        self.destinations.get(i)
    }

    pub fn len(&self) -> usize {
        self.destinations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.destinations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Destination> {
        self.destinations.iter()
    }
}
