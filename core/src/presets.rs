use crate::catalog::SkillCatalog;
use crate::model::{Character, CharacterStats};

fn build(catalog: &SkillCatalog, stats: CharacterStats, skill_ids: &[&str]) -> Character {
    let stats = catalog
        .resolve_many(skill_ids.iter().copied())
        .into_iter()
        .fold(stats, CharacterStats::skill);
    Character::new(stats)
}

/// Creates the default hero party: a Warrior and a Mage.
pub fn demo_heroes(catalog: &SkillCatalog) -> Vec<Character> {
    vec![
        build(
            catalog,
            CharacterStats::new("Warrior", 120, 35, 12).mp(60).speed(18.0),
            &["strong-attack", "heal"],
        ),
        build(
            catalog,
            CharacterStats::new("Mage", 80, 25, 8).mp(100).speed(15.0),
            &["fireball"],
        ),
    ]
}

/// Creates the default enemy pack: a Slime and a Goblin.
pub fn demo_enemies(catalog: &SkillCatalog) -> Vec<Character> {
    vec![
        build(
            catalog,
            CharacterStats::new("Slime", 80, 20, 8).mp(20).speed(12.0),
            &["slime-attack"],
        ),
        build(
            catalog,
            CharacterStats::new("Goblin", 60, 25, 6).mp(15).speed(16.0),
            &["goblin-attack"],
        ),
    ]
}
