use crate::engine::damage::{DamageCalculator, DamageParams};
use crate::error::SkillError;
use crate::model::{Character, CharacterId};
use crate::skill::{EffectKind, Skill};

/// What one effect did to one target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EffectResult {
    pub target: CharacterId,
    pub target_name: String,
    pub kind: EffectKind,
    /// Damage dealt, hp actually restored, or the raw value for pass-through kinds.
    pub value: i32,
    pub is_critical: bool,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkillOutcome {
    pub message: String,
    pub effects: Vec<EffectResult>,
}

fn index_of(units: &[Character], id: CharacterId) -> Option<usize> {
    units.iter().position(|c| c.id == id)
}

impl Skill {
    /// Spends MP and resolves every effect against every target, effect by
    /// effect in declaration order and target by target in list order.
    ///
    /// Fails without touching any character when the user cannot pay or an
    /// id is unknown. Damage skips targets that are already down; heal does
    /// not. Success does not imply any effect landed.
    pub fn use_on(
        &self,
        units: &mut [Character],
        user: CharacterId,
        targets: &[CharacterId],
        damage: &mut DamageCalculator<'_>,
    ) -> Result<SkillOutcome, SkillError> {
        let user_idx = index_of(units, user).ok_or(SkillError::UnknownTarget(user))?;
        let target_idx: Vec<usize> = targets
            .iter()
            .map(|&id| index_of(units, id).ok_or(SkillError::UnknownTarget(id)))
            .collect::<Result<_, _>>()?;

        if !self.can_use(&units[user_idx]) {
            return Err(SkillError::InsufficientMp {
                user: units[user_idx].name.clone(),
            });
        }

        units[user_idx].spend_mp(self.mp_cost);
        let user_attack = units[user_idx].attack;
        let mut effects = Vec::with_capacity(self.effects.len() * target_idx.len());

        for effect in &self.effects {
            for &idx in &target_idx {
                let target = &mut units[idx];
                let result = match effect.kind {
                    EffectKind::Damage => {
                        if !target.is_alive() {
                            continue;
                        }
                        let hit = damage.calculate(
                            DamageParams::new(user_attack, target.defense).power(effect.value),
                        );
                        target.take_damage(hit.damage);
                        EffectResult {
                            target: target.id,
                            target_name: target.name.clone(),
                            kind: EffectKind::Damage,
                            value: hit.damage,
                            is_critical: hit.is_critical,
                            message: format!("{} takes {} damage!", target.name, hit.damage),
                        }
                    }
                    EffectKind::Heal => {
                        let healed = effect.value.min(target.max_hp - target.hp).max(0);
                        target.heal(effect.value);
                        EffectResult {
                            target: target.id,
                            target_name: target.name.clone(),
                            kind: EffectKind::Heal,
                            value: healed,
                            is_critical: false,
                            message: format!("{} recovers {} HP!", target.name, healed),
                        }
                    }
                    // Buffs and debuffs are recorded but not resolved yet.
                    kind @ (EffectKind::Buff | EffectKind::Debuff) => EffectResult {
                        target: target.id,
                        target_name: target.name.clone(),
                        kind,
                        value: effect.value,
                        is_critical: false,
                        message: format!("{} is affected by {}!", target.name, kind.as_str()),
                    },
                };
                effects.push(result);
            }
        }

        tracing::debug!(
            skill = %self.id,
            user = %units[user_idx].name,
            results = effects.len(),
            "skill resolved"
        );

        Ok(SkillOutcome {
            message: format!("{} uses {}!", units[user_idx].name, self.name),
            effects,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::engine::damage::DamageCalculator;
    use crate::error::SkillError;
    use crate::model::{Character, CharacterId, CharacterStats};
    use crate::rng::ScriptedRolls;
    use crate::skill::{builtin_skill, Effect, EffectKind, Skill, TargetType};

    fn roster(stats: Vec<CharacterStats>) -> Vec<Character> {
        stats
            .into_iter()
            .enumerate()
            .map(|(i, s)| {
                let mut c = Character::new(s);
                c.id = CharacterId(i as u32);
                c
            })
            .collect()
    }

    #[test]
    fn insufficient_mp_changes_nothing() {
        let mut units = roster(vec![
            CharacterStats::new("Mage", 80, 25, 8).mp(5),
            CharacterStats::new("Slime", 80, 20, 8),
        ]);
        let fireball = builtin_skill("fireball").unwrap();
        let mut rolls = ScriptedRolls::default();
        let err = fireball
            .use_on(
                &mut units,
                CharacterId(0),
                &[CharacterId(1)],
                &mut DamageCalculator::new(&mut rolls),
            )
            .unwrap_err();

        assert_eq!(err, SkillError::InsufficientMp { user: "Mage".into() });
        assert_eq!(err.to_string(), "Mage insufficient MP");
        assert_eq!(units[0].mp, 5);
        assert_eq!(units[1].hp, 80);
    }

    #[test]
    fn damage_uses_effect_value_as_skill_power() {
        let mut units = roster(vec![
            CharacterStats::new("Mage", 80, 25, 8).mp(100),
            CharacterStats::new("Slime", 80, 20, 8),
        ]);
        let fireball = builtin_skill("fireball").unwrap();
        let mut rolls = ScriptedRolls::default();
        let outcome = fireball
            .use_on(
                &mut units,
                CharacterId(0),
                &[CharacterId(1)],
                &mut DamageCalculator::new(&mut rolls),
            )
            .unwrap();

        // floor(25 * 200 / 100) - 8
        assert_eq!(outcome.effects[0].value, 42);
        assert_eq!(units[1].hp, 38);
        assert_eq!(units[0].mp, 80);
    }

    #[test]
    fn heal_clamps_to_max_hp_and_reports_restored_amount() {
        let mut units = roster(vec![CharacterStats::new("Cleric", 60, 10, 5)
            .max_hp(100)
            .mp(20)]);
        let big_heal = Skill::new("big-heal", "Big Heal", 5, TargetType::SelfOnly, vec![Effect::heal(100)]);
        let mut rolls = ScriptedRolls::default();
        let outcome = big_heal
            .use_on(
                &mut units,
                CharacterId(0),
                &[CharacterId(0)],
                &mut DamageCalculator::new(&mut rolls),
            )
            .unwrap();

        assert_eq!(units[0].hp, 100);
        assert_eq!(outcome.effects[0].value, 40);
    }

    #[test]
    fn effects_iterate_effect_then_target_and_skip_dead_for_damage() {
        let mut units = roster(vec![
            CharacterStats::new("Sage", 100, 40, 5).mp(50),
            CharacterStats::new("A", 50, 10, 0),
            CharacterStats::new("B", 50, 10, 0),
        ]);
        units[2].hp = 0;
        let skill = Skill::new(
            "drain",
            "Drain",
            10,
            TargetType::AllEnemies,
            vec![Effect::damage(50), Effect::heal(5)],
        );
        let mut rolls = ScriptedRolls::default();
        let outcome = skill
            .use_on(
                &mut units,
                CharacterId(0),
                &[CharacterId(1), CharacterId(2)],
                &mut DamageCalculator::new(&mut rolls),
            )
            .unwrap();

        let order: Vec<(EffectKind, u32)> = outcome
            .effects
            .iter()
            .map(|e| (e.kind, e.target.0))
            .collect();
        assert_eq!(
            order,
            vec![
                (EffectKind::Damage, 1),
                (EffectKind::Heal, 1),
                (EffectKind::Heal, 2),
            ]
        );
        // Healing a downed target raises hp without any other revive logic.
        assert_eq!(units[2].hp, 5);
    }

    #[test]
    fn all_targets_down_still_succeeds_and_spends_mp() {
        let mut units = roster(vec![
            CharacterStats::new("Mage", 80, 25, 8).mp(30),
            CharacterStats::new("Slime", 80, 20, 8),
        ]);
        units[1].hp = 0;
        let fireball = builtin_skill("fireball").unwrap();
        let mut rolls = ScriptedRolls::default();
        let outcome = fireball
            .use_on(
                &mut units,
                CharacterId(0),
                &[CharacterId(1)],
                &mut DamageCalculator::new(&mut rolls),
            )
            .unwrap();

        assert!(outcome.effects.is_empty());
        assert_eq!(units[0].mp, 10);
    }

    #[test]
    fn buff_is_recorded_without_mutation() {
        let mut units = roster(vec![CharacterStats::new("Knight", 90, 20, 10).mp(10)]);
        let guard = Skill::new(
            "guard",
            "Guard",
            0,
            TargetType::SelfOnly,
            vec![Effect {
                kind: EffectKind::Buff,
                value: 5,
                duration: Some(2),
            }],
        );
        let mut rolls = ScriptedRolls::default();
        let outcome = guard
            .use_on(
                &mut units,
                CharacterId(0),
                &[CharacterId(0)],
                &mut DamageCalculator::new(&mut rolls),
            )
            .unwrap();

        assert_eq!(outcome.effects.len(), 1);
        assert_eq!(outcome.effects[0].kind, EffectKind::Buff);
        assert_eq!(units[0].hp, 90);
        assert_eq!(units[0].defense, 10);
    }

    #[test]
    fn unknown_target_is_rejected_before_spending_mp() {
        let mut units = roster(vec![CharacterStats::new("Mage", 80, 25, 8).mp(30)]);
        let fireball = builtin_skill("fireball").unwrap();
        let mut rolls = ScriptedRolls::default();
        let err = fireball
            .use_on(
                &mut units,
                CharacterId(0),
                &[CharacterId(9)],
                &mut DamageCalculator::new(&mut rolls),
            )
            .unwrap_err();
        assert_eq!(err, SkillError::UnknownTarget(CharacterId(9)));
        assert_eq!(units[0].mp, 30);
    }
}
