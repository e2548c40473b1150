use std::rc::Rc;

use crate::config::AiConfig;
use crate::model::{Character, CharacterId};
use crate::rng::RandomSource;
use crate::skill::{EffectKind, Skill, TargetType};

#[derive(Clone, Debug, PartialEq)]
pub enum AiAction {
    Attack { target: CharacterId },
    Skill { skill: Rc<Skill>, target: CharacterId },
    /// No living candidate to act on.
    Pass,
}

/// Priority policy for computer-controlled characters:
/// emergency self-heal, then a coin flip for an offensive skill, then a
/// basic attack on the weakest living candidate.
pub struct EnemyAi<'r> {
    rng: &'r mut dyn RandomSource,
    config: &'r AiConfig,
}

impl<'r> EnemyAi<'r> {
    pub fn new(rng: &'r mut dyn RandomSource, config: &'r AiConfig) -> Self {
        Self { rng, config }
    }

    pub fn decide_action(&mut self, actor: &Character, candidates: &[&Character]) -> AiAction {
        let heal_skill = actor.skills.iter().find(|s| {
            s.target_type == TargetType::SelfOnly && s.has_effect(EffectKind::Heal) && s.can_use(actor)
        });
        if let Some(skill) = heal_skill {
            if (actor.hp as f64) < actor.max_hp as f64 * self.config.low_hp_ratio {
                tracing::debug!(actor = %actor.name, skill = %skill.id, "ai chose emergency heal");
                return AiAction::Skill {
                    skill: Rc::clone(skill),
                    target: actor.id,
                };
            }
        }

        let Some(target) = select_target(candidates) else {
            tracing::debug!(actor = %actor.name, "ai has no living target, passing");
            return AiAction::Pass;
        };

        let attack_skills: Vec<&Rc<Skill>> = actor
            .skills
            .iter()
            .filter(|s| s.target_type == TargetType::SingleEnemy && s.can_use(actor))
            .collect();

        if !attack_skills.is_empty() && self.rng.next_unit() < self.config.skill_chance {
            let skill = attack_skills[self.rng.pick_index(attack_skills.len())];
            tracing::debug!(actor = %actor.name, skill = %skill.id, target = %target, "ai chose skill");
            return AiAction::Skill {
                skill: Rc::clone(skill),
                target,
            };
        }

        AiAction::Attack { target }
    }
}

/// Lowest-hp living candidate; ties keep the earliest one.
pub fn select_target(candidates: &[&Character]) -> Option<CharacterId> {
    candidates
        .iter()
        .filter(|c| c.is_alive())
        .fold(None::<&Character>, |lowest, current| match lowest {
            Some(l) if current.hp >= l.hp => Some(l),
            _ => Some(current),
        })
        .map(|c| c.id)
}
