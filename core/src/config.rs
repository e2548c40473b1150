use serde::Deserialize;

use crate::error::ConfigError;
use crate::model::Team;

/// Tunables for enemy decision making.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Below this share of max hp a self-heal takes priority.
    pub low_hp_ratio: f64,
    /// Chance to use an offensive skill instead of a basic attack.
    pub skill_chance: f64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            low_hp_ratio: 0.3,
            skill_chance: 0.5,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    pub hero_critical_rate: f64,
    pub enemy_critical_rate: f64,
    pub ai: AiConfig,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            hero_critical_rate: 0.2,
            enemy_critical_rate: 0.15,
            ai: AiConfig::default(),
        }
    }
}

impl BattleConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: BattleConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("hero_critical_rate", self.hero_critical_rate),
            ("enemy_critical_rate", self.enemy_critical_rate),
            ("ai.low_hp_ratio", self.ai.low_hp_ratio),
            ("ai.skill_chance", self.ai.skill_chance),
        ];
        for (field, value) in fields {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::RateOutOfRange { field, value });
            }
        }
        Ok(())
    }

    pub fn critical_rate_for(&self, team: Team) -> f64 {
        match team {
            Team::Hero => self.hero_critical_rate,
            Team::Enemy => self.enemy_critical_rate,
        }
    }
}
