pub mod battle;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
mod log;
pub mod model;
pub mod presets;
pub mod rng;
pub mod skill;
pub mod step_api;

pub use battle::BattleController;
pub use catalog::SkillCatalog;
pub use config::{AiConfig, BattleConfig};
pub use error::{BattleError, CatalogError, ConfigError, SkillError, TargetingError};
pub use event::{BattleEvent, BattleEventKind, EventData};
pub use model::{Character, CharacterId, CharacterStats, Position, Team};
pub use rng::RandomSource;
pub use skill::{Effect, EffectKind, Skill, TargetType};
