use std::fmt;
use std::rc::Rc;

use serde::Serialize;

use crate::skill::Skill;

/// Two-side team marker used for rosters and targeting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Team {
    Hero,
    Enemy,
}

impl Team {
    pub fn as_str(self) -> &'static str {
        match self {
            Team::Hero => "hero",
            Team::Enemy => "enemy",
        }
    }

    pub fn opponent(self) -> Team {
        match self {
            Team::Hero => Team::Enemy,
            Team::Enemy => Team::Hero,
        }
    }
}

/// Stable handle of a character inside one battle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CharacterId(pub u32);

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Screen placement, consumed only by the presentation layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

/// Construction-time description of a character.
///
/// Optional fields fall back the same way the battle roster expects:
/// `max_hp` to `hp`, `mp` to 0, `max_mp` to `mp`, `speed` to 10.
#[derive(Clone, Debug, Default)]
pub struct CharacterStats {
    pub name: String,
    pub hp: i32,
    pub max_hp: Option<i32>,
    pub mp: Option<i32>,
    pub max_mp: Option<i32>,
    pub attack: i32,
    pub defense: i32,
    pub speed: Option<f32>,
    pub skills: Vec<Rc<Skill>>,
}

impl CharacterStats {
    pub fn new(name: impl Into<String>, hp: i32, attack: i32, defense: i32) -> Self {
        Self {
            name: name.into(),
            hp,
            attack,
            defense,
            ..Self::default()
        }
    }

    pub fn mp(mut self, mp: i32) -> Self {
        self.mp = Some(mp);
        self
    }

    pub fn max_hp(mut self, max_hp: i32) -> Self {
        self.max_hp = Some(max_hp);
        self
    }

    pub fn speed(mut self, speed: f32) -> Self {
        self.speed = Some(speed);
        self
    }

    pub fn skill(mut self, skill: Rc<Skill>) -> Self {
        self.skills.push(skill);
        self
    }
}

const DEFAULT_SPEED: f32 = 10.0;

/// Runtime combatant. Heroes and enemies share this type.
///
/// Invariant: `0 <= hp <= max_hp` and `0 <= mp <= max_mp` after every
/// mutation made through the methods below.
#[derive(Clone, Debug)]
pub struct Character {
    pub(crate) id: CharacterId,
    pub(crate) team: Team,
    pub name: String,
    pub hp: i32,
    pub max_hp: i32,
    pub mp: i32,
    pub max_mp: i32,
    pub attack: i32,
    pub defense: i32,
    pub speed: f32,
    pub skills: Vec<Rc<Skill>>,
    pub position: Position,
}

impl Character {
    pub fn new(stats: CharacterStats) -> Self {
        let mp = stats.mp.unwrap_or(0);
        Self {
            id: CharacterId::default(),
            team: Team::Hero,
            name: stats.name,
            hp: stats.hp,
            max_hp: stats.max_hp.unwrap_or(stats.hp),
            mp,
            max_mp: stats.max_mp.unwrap_or(mp),
            attack: stats.attack,
            defense: stats.defense,
            speed: stats.speed.unwrap_or(DEFAULT_SPEED),
            skills: stats.skills,
            position: Position::default(),
        }
    }

    pub fn id(&self) -> CharacterId {
        self.id
    }

    pub fn team(&self) -> Team {
        self.team
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    pub fn take_damage(&mut self, amount: i32) {
        self.hp = self.hp.saturating_sub(amount).clamp(0, self.max_hp.max(0));
    }

    pub fn heal(&mut self, amount: i32) {
        self.hp = self.hp.saturating_add(amount).clamp(0, self.max_hp.max(0));
    }

    pub fn spend_mp(&mut self, amount: i32) {
        self.mp = self.mp.saturating_sub(amount).clamp(0, self.max_mp.max(0));
    }

    pub fn skill(&self, skill_id: &str) -> Option<&Rc<Skill>> {
        self.skills.iter().find(|s| s.id == skill_id)
    }
}

#[cfg(test)]
mod tests {
    use super::{Character, CharacterStats};

    #[test]
    fn stats_defaults_follow_current_values() {
        let c = Character::new(CharacterStats::new("Hero", 100, 30, 10).mp(50));
        assert_eq!(c.max_hp, 100);
        assert_eq!(c.max_mp, 50);
        assert_eq!(c.speed, 10.0);
        assert!(c.skills.is_empty());
    }

    #[test]
    fn hp_stays_within_bounds() {
        let mut c = Character::new(CharacterStats::new("Hero", 100, 30, 10));
        c.take_damage(250);
        assert_eq!(c.hp, 0);
        assert!(!c.is_alive());

        c.heal(500);
        assert_eq!(c.hp, 100);
    }

    #[test]
    fn negative_amounts_stay_within_bounds() {
        let mut c = Character::new(CharacterStats::new("Slime", 50, 20, 8).mp(10));
        c.spend_mp(-50);
        assert_eq!(c.mp, 10);

        c.heal(-80);
        assert_eq!(c.hp, 0);

        c.take_damage(-500);
        assert_eq!(c.hp, 50);
    }

    #[test]
    fn extreme_amounts_saturate() {
        let mut c = Character::new(CharacterStats::new("Slime", 50, 20, 8));
        c.take_damage(10);
        c.heal(i32::MAX);
        assert_eq!(c.hp, 50);

        c.take_damage(i32::MAX);
        assert_eq!(c.hp, 0);
        c.take_damage(i32::MIN);
        assert_eq!(c.hp, 50);
    }

    #[test]
    fn spending_mp_never_goes_negative() {
        let mut c = Character::new(CharacterStats::new("Mage", 80, 25, 8).mp(5));
        c.spend_mp(20);
        assert_eq!(c.mp, 0);
    }
}
