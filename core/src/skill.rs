use serde::{Deserialize, Serialize};

use crate::model::Character;

pub type SkillId = String;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TargetType {
    #[serde(rename = "self")]
    SelfOnly,
    SingleAlly,
    SingleEnemy,
    AllAllies,
    AllEnemies,
}

impl TargetType {
    pub fn as_str(self) -> &'static str {
        match self {
            TargetType::SelfOnly => "self",
            TargetType::SingleAlly => "single-ally",
            TargetType::SingleEnemy => "single-enemy",
            TargetType::AllAllies => "all-allies",
            TargetType::AllEnemies => "all-enemies",
        }
    }

    pub fn is_single(self) -> bool {
        matches!(self, TargetType::SingleAlly | TargetType::SingleEnemy)
    }

    pub fn hits_enemies(self) -> bool {
        matches!(self, TargetType::SingleEnemy | TargetType::AllEnemies)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EffectKind {
    Damage,
    Heal,
    Buff,
    Debuff,
}

impl EffectKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EffectKind::Damage => "damage",
            EffectKind::Heal => "heal",
            EffectKind::Buff => "buff",
            EffectKind::Debuff => "debuff",
        }
    }
}

/// One step of a skill.
///
/// `value` is a percentage of the user's attack for damage and a flat
/// amount for heal. `duration` is carried for buff/debuff data but not
/// read by resolution.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    #[serde(rename = "type")]
    pub kind: EffectKind,
    pub value: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
}

impl Effect {
    pub const fn damage(power: i32) -> Self {
        Self {
            kind: EffectKind::Damage,
            value: power,
            duration: None,
        }
    }

    pub const fn heal(amount: i32) -> Self {
        Self {
            kind: EffectKind::Heal,
            value: amount,
            duration: None,
        }
    }
}

/// Immutable skill definition, shared between owners through `Rc`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    pub id: SkillId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub mp_cost: i32,
    pub target_type: TargetType,
    pub effects: Vec<Effect>,
}

impl Skill {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        mp_cost: i32,
        target_type: TargetType,
        effects: Vec<Effect>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            mp_cost,
            target_type,
            effects,
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn can_use(&self, user: &Character) -> bool {
        user.mp >= self.mp_cost && user.is_alive()
    }

    pub fn has_effect(&self, kind: EffectKind) -> bool {
        self.effects.iter().any(|e| e.kind == kind)
    }
}

pub const BASIC_ATTACK_ID: &str = "basic-attack";

pub const BUILTIN_SKILL_IDS: [&str; 6] = [
    BASIC_ATTACK_ID,
    "strong-attack",
    "heal",
    "fireball",
    "slime-attack",
    "goblin-attack",
];

pub fn basic_attack() -> Skill {
    Skill::new(
        BASIC_ATTACK_ID,
        "Attack",
        0,
        TargetType::SingleEnemy,
        vec![Effect::damage(100)],
    )
    .describe("Basic attack")
}

pub fn builtin_skill(id: &str) -> Option<Skill> {
    let skill = match id {
        BASIC_ATTACK_ID => basic_attack(),
        "strong-attack" => Skill::new(
            id,
            "Power Strike",
            10,
            TargetType::SingleEnemy,
            vec![Effect::damage(180)],
        )
        .describe("A heavy blow"),
        "heal" => Skill::new(id, "Heal", 15, TargetType::SelfOnly, vec![Effect::heal(30)])
            .describe("Restore health"),
        "fireball" => Skill::new(
            id,
            "Fireball",
            20,
            TargetType::SingleEnemy,
            vec![Effect::damage(200)],
        )
        .describe("Hurl a ball of flame"),
        "slime-attack" => Skill::new(
            id,
            "Venom Sting",
            10,
            TargetType::SingleEnemy,
            vec![Effect::damage(160)],
        )
        .describe("A poisoned strike"),
        "goblin-attack" => Skill::new(
            id,
            "Goblin Slash",
            8,
            TargetType::SingleEnemy,
            vec![Effect::damage(150)],
        )
        .describe("A quick slash"),
        _ => return None,
    };
    Some(skill)
}
