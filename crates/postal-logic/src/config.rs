//! Tuning for the whole progression core, loadable from JSON.
//!
//! Every section defaults to the shipped tuning, so a config file only needs
//! the values it overrides:
//!
//! ```
//! use postal_logic::config::ProgressionConfig;
//!
//! let config = ProgressionConfig::from_json(r#"{ "skills": { "base_capacity": 20 } }"#).unwrap();
//! assert_eq!(config.skills.base_capacity, 20);
//! assert_eq!(config.skills.capacity_per_level, 3);
//! ```

use serde::{Deserialize, Serialize};

use crate::delivery::DeliveryConfig;
use crate::experience::ExperienceConfig;
use crate::health::HealthConfig;
use crate::rewards::ChoiceConfig;
use crate::skills::SkillTreeConfig;

/// Tuning for every component, one section each.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionConfig {
    pub skills: SkillTreeConfig,
    pub experience: ExperienceConfig,
    pub delivery: DeliveryConfig,
    pub choices: ChoiceConfig,
    pub health: HealthConfig,
}

impl ProgressionConfig {
    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: ProgressionConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject tuning that would break the core's invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let skills = &self.skills;
        if skills.base_capacity == 0 {
            return Err(ConfigError::Invalid(
                "skills.base_capacity must be at least 1".into(),
            ));
        }
        if !(skills.base_delivery_seconds > 0.0 && skills.base_delivery_seconds.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "skills.base_delivery_seconds must be positive, got {}",
                skills.base_delivery_seconds
            )));
        }
        let m = skills.delivery_multiplier_per_level;
        if !(m > 0.0 && m < 1.0) {
            return Err(ConfigError::Invalid(format!(
                "skills.delivery_multiplier_per_level must be inside (0, 1), got {}",
                m
            )));
        }
        let movement = skills.movement_percent_per_level;
        if movement.is_nan() || movement < 0.0 {
            return Err(ConfigError::Invalid(
                "skills.movement_percent_per_level must not be negative".into(),
            ));
        }
        if skills.knowledge_xp_per_level < 0 {
            return Err(ConfigError::Invalid(
                "skills.knowledge_xp_per_level must not be negative".into(),
            ));
        }
        if self.experience.base_xp_to_next <= 0 {
            return Err(ConfigError::Invalid(
                "experience.base_xp_to_next must be positive".into(),
            ));
        }
        if self.experience.xp_per_level < 0 {
            return Err(ConfigError::Invalid(
                "experience.xp_per_level must not be negative".into(),
            ));
        }
        let floor = self.delivery.min_duration_seconds;
        if !(floor > 0.0 && floor.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "delivery.min_duration_seconds must be positive, got {}",
                floor
            )));
        }
        if self.delivery.base_xp <= 0 {
            return Err(ConfigError::Invalid(
                "delivery.base_xp must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Errors from loading configuration or destination data.
#[derive(Debug)]
pub enum ConfigError {
    Json(serde_json::Error),
    Invalid(String),
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Json(e)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Json(e) => write!(f, "Config parse error: {}", e),
            ConfigError::Invalid(msg) => write!(f, "Invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Json(e) => Some(e),
            ConfigError::Invalid(_) => None,
        }
    }
}
