use thiserror::Error;

use crate::model::{CharacterId, Team};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkillError {
    #[error("{user} insufficient MP")]
    InsufficientMp { user: String },
    #[error("target {0} is not in this battle")]
    UnknownTarget(CharacterId),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TargetingError {
    #[error("not selecting a target")]
    NotSelecting,
    #[error("{0} is not a valid target")]
    InvalidTarget(CharacterId),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BattleError {
    #[error("{} roster is empty", .0.as_str())]
    EmptyRoster(Team),
    #[error("character {0} is not in this battle")]
    UnknownCharacter(CharacterId),
    #[error("character {0} is down")]
    ActorDefeated(CharacterId),
    #[error(transparent)]
    Skill(#[from] SkillError),
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to parse skill data: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("skill `{0}` is already registered")]
    DuplicateSkill(String),
    #[error("skill `{0}` is not registered")]
    UnknownSkill(String),
    #[error("skill `{id}` has a negative {field}: {value}")]
    NegativeValue {
        id: String,
        field: &'static str,
        value: i32,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse battle config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("`{field}` must be within [0, 1], got {value}")]
    RateOutOfRange { field: &'static str, value: f64 },
}
