use std::rc::Rc;

use crate::config::BattleConfig;
use crate::engine::damage::{DamageCalculator, DamageParams, DamageResult};
use crate::engine::enemy_ai::{AiAction, EnemyAi};
use crate::engine::event_bus::{EventBus, SubscriberId};
use crate::engine::skill_system::SkillOutcome;
use crate::engine::targeting::{needs_manual_selection, valid_targets, TargetingStateMachine};
use crate::engine::turn_system::TurnScheduler;
use crate::error::BattleError;
use crate::event::{BattleEvent, BattleEventKind, EventData};
use crate::model::{Character, CharacterId, Team};
use crate::rng::RandomSource;
use crate::skill::{EffectKind, Skill};

/// Top-level battle orchestrator.
///
/// Owns both rosters (heroes first, then enemies), the turn scheduler and
/// the event bus. Heroes are handed back to the host when ready; enemies
/// act immediately inside [`BattleController::update`].
pub struct BattleController {
    units: Vec<Character>,
    scheduler: TurnScheduler,
    bus: EventBus,
    rng: Box<dyn RandomSource>,
    config: BattleConfig,
    end_announced: bool,
}

impl BattleController {
    pub fn new(
        heroes: Vec<Character>,
        enemies: Vec<Character>,
        rng: Box<dyn RandomSource>,
    ) -> Result<Self, BattleError> {
        Self::with_config(heroes, enemies, rng, BattleConfig::default())
    }

    pub fn with_config(
        heroes: Vec<Character>,
        enemies: Vec<Character>,
        rng: Box<dyn RandomSource>,
        config: BattleConfig,
    ) -> Result<Self, BattleError> {
        if heroes.is_empty() {
            return Err(BattleError::EmptyRoster(Team::Hero));
        }
        if enemies.is_empty() {
            return Err(BattleError::EmptyRoster(Team::Enemy));
        }

        let mut units = Vec::with_capacity(heroes.len() + enemies.len());
        let mut scheduler = TurnScheduler::new();
        let enlisted = heroes
            .into_iter()
            .map(|c| (c, Team::Hero))
            .chain(enemies.into_iter().map(|c| (c, Team::Enemy)));
        for (idx, (mut character, team)) in enlisted.enumerate() {
            character.id = CharacterId(idx as u32);
            character.team = team;
            scheduler.add(character.id);
            units.push(character);
        }

        Ok(Self {
            units,
            scheduler,
            bus: EventBus::new(),
            rng,
            config,
            end_announced: false,
        })
    }

    pub fn on(&mut self, listener: impl FnMut(&BattleEvent) + 'static) -> SubscriberId {
        self.bus.subscribe(listener)
    }

    pub fn off(&mut self, id: SubscriberId) -> bool {
        self.bus.unsubscribe(id)
    }

    /// Advances the timeline. Returns the hero whose turn it is, if any.
    /// A ready enemy acts to completion before this returns `None`.
    pub fn update(&mut self, delta_time: f32) -> Option<CharacterId> {
        if self.is_battle_over() {
            return None;
        }

        self.scheduler.advance(&self.units, delta_time);
        let actor = self.scheduler.next_ready(&self.units)?;
        let (team, name) = {
            let c = self.character(actor)?;
            (c.team, c.name.clone())
        };

        self.emit(BattleEvent::new(BattleEventKind::TurnStart, format!("{name}'s turn!")).actor(actor));

        match team {
            Team::Hero => Some(actor),
            Team::Enemy => {
                self.run_enemy_turn(actor);
                None
            }
        }
    }

    /// Basic attack using the attacker side's critical rate.
    pub fn execute_attack(
        &mut self,
        attacker: CharacterId,
        target: CharacterId,
    ) -> Result<DamageResult, BattleError> {
        let a = self.index_of(attacker)?;
        let t = self.index_of(target)?;
        if !self.units[a].is_alive() {
            return Err(BattleError::ActorDefeated(attacker));
        }

        let rate = self.config.critical_rate_for(self.units[a].team);
        let params = DamageParams::new(self.units[a].attack, self.units[t].defense).critical_rate(rate);
        let hit = DamageCalculator::new(self.rng.as_mut()).calculate(params);
        self.units[t].take_damage(hit.damage);

        let crit_text = if hit.is_critical { " [critical!]" } else { "" };
        let message = format!(
            "{} attacks! {} damage!{crit_text}",
            self.units[a].name, hit.damage
        );
        self.emit(
            BattleEvent::new(BattleEventKind::Attack, message)
                .actor(attacker)
                .target(Some(target))
                .data(BattleEvent::hit(hit.damage, hit.is_critical)),
        );
        self.emit(
            BattleEvent::new(BattleEventKind::Damage, "")
                .target(Some(target))
                .data(BattleEvent::hit(hit.damage, hit.is_critical)),
        );

        self.scheduler.consume(attacker);
        self.finish_turn(attacker);
        Ok(hit)
    }

    /// Resolves `skill` through the skill engine. On failure only a `skill`
    /// event is emitted and the caster keeps the turn.
    pub fn execute_skill(
        &mut self,
        skill: &Skill,
        caster: CharacterId,
        targets: &[CharacterId],
    ) -> Result<SkillOutcome, BattleError> {
        self.index_of(caster)?;
        for &t in targets {
            self.index_of(t)?;
        }

        let result = {
            let mut damage = DamageCalculator::new(self.rng.as_mut());
            skill.use_on(&mut self.units, caster, targets, &mut damage)
        };

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::debug!(skill = %skill.id, caster = %caster, %err, "skill rejected");
                self.emit(BattleEvent::new(BattleEventKind::Skill, err.to_string()).actor(caster));
                return Err(err.into());
            }
        };

        let single_target = match targets {
            [only] => Some(*only),
            _ => None,
        };
        self.emit(
            BattleEvent::new(BattleEventKind::Skill, outcome.message.clone())
                .actor(caster)
                .target(single_target)
                .data(EventData {
                    skill_id: Some(skill.id.clone()),
                    ..EventData::default()
                }),
        );

        for effect in &outcome.effects {
            let event = match effect.kind {
                EffectKind::Damage => BattleEvent::new(BattleEventKind::Damage, effect.message.clone())
                    .data(BattleEvent::hit(effect.value, effect.is_critical)),
                EffectKind::Heal => BattleEvent::new(BattleEventKind::Heal, effect.message.clone()).data(
                    EventData {
                        amount: Some(effect.value),
                        ..EventData::default()
                    },
                ),
                EffectKind::Buff | EffectKind::Debuff => continue,
            };
            self.emit(event.target(Some(effect.target)));
        }

        self.scheduler.consume(caster);
        self.finish_turn(caster);
        Ok(outcome)
    }

    /// Returns `Ok(true)` when the host must run a targeting session first.
    /// Otherwise the targets are resolved automatically and the skill is
    /// executed right away.
    pub fn handle_skill_use(&mut self, caster: CharacterId, skill: &Skill) -> Result<bool, BattleError> {
        let targets = {
            let caster_ref = &self.units[self.index_of(caster)?];
            let (allies, enemies) = self.sides(caster_ref.team);
            valid_targets(skill.target_type, &allies, &enemies, caster_ref)
        };

        if needs_manual_selection(skill.target_type, targets.len()) {
            return Ok(true);
        }

        self.execute_skill(skill, caster, &targets)?;
        Ok(false)
    }

    pub fn execute_targeted_skill(
        &mut self,
        caster: CharacterId,
        skill: &Skill,
        targets: &[CharacterId],
    ) -> Result<SkillOutcome, BattleError> {
        self.execute_skill(skill, caster, targets)
    }

    /// Opens a targeting session with the caster's own side as allies.
    pub fn begin_targeting(
        &self,
        targeting: &mut TargetingStateMachine,
        caster: CharacterId,
        skill: Rc<Skill>,
    ) -> Result<(), BattleError> {
        let caster_ref = &self.units[self.index_of(caster)?];
        let (allies, enemies) = self.sides(caster_ref.team);
        targeting.start_targeting(skill, &allies, &enemies, caster_ref);
        Ok(())
    }

    pub fn is_battle_over(&self) -> bool {
        !has_alive(&self.units, Team::Hero) || !has_alive(&self.units, Team::Enemy)
    }

    pub fn is_victory(&self) -> bool {
        has_alive(&self.units, Team::Hero) && !has_alive(&self.units, Team::Enemy)
    }

    pub fn is_defeat(&self) -> bool {
        !has_alive(&self.units, Team::Hero)
    }

    pub fn heroes(&self) -> impl Iterator<Item = &Character> {
        self.units.iter().filter(|c| c.team == Team::Hero)
    }

    pub fn enemies(&self) -> impl Iterator<Item = &Character> {
        self.units.iter().filter(|c| c.team == Team::Enemy)
    }

    pub fn characters(&self) -> &[Character] {
        &self.units
    }

    pub fn character(&self, id: CharacterId) -> Option<&Character> {
        self.units.iter().find(|c| c.id == id)
    }

    pub fn scheduler(&self) -> &TurnScheduler {
        &self.scheduler
    }

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    /// Zeroes every turn gauge.
    pub fn reset_turns(&mut self) {
        self.scheduler.reset();
    }

    fn run_enemy_turn(&mut self, actor: CharacterId) {
        let Ok(actor_idx) = self.index_of(actor) else {
            return;
        };
        let action = {
            let candidates: Vec<&Character> = self.units.iter().filter(|c| c.team == Team::Hero).collect();
            EnemyAi::new(self.rng.as_mut(), &self.config.ai).decide_action(&self.units[actor_idx], &candidates)
        };

        match action {
            AiAction::Skill { skill, target } => {
                if let Err(err) = self.execute_skill(&skill, actor, &[target]) {
                    tracing::warn!(actor = %actor, %err, "enemy skill failed");
                }
            }
            AiAction::Attack { target } => {
                if let Err(err) = self.execute_attack(actor, target) {
                    tracing::warn!(actor = %actor, %err, "enemy attack failed");
                }
            }
            AiAction::Pass => {
                self.scheduler.consume(actor);
                self.finish_turn(actor);
            }
        }
    }

    fn finish_turn(&mut self, actor: CharacterId) {
        self.emit(BattleEvent::new(BattleEventKind::TurnEnd, "").actor(actor));

        if self.end_announced || !self.is_battle_over() {
            return;
        }
        self.end_announced = true;
        let result = if self.is_victory() { "victory" } else { "defeat" };
        tracing::info!(result, "battle over");
        self.emit(BattleEvent::new(BattleEventKind::BattleEnd, result));
    }

    fn sides(&self, team: Team) -> (Vec<&Character>, Vec<&Character>) {
        self.units.iter().partition(|c| c.team == team)
    }

    fn index_of(&self, id: CharacterId) -> Result<usize, BattleError> {
        self.units
            .iter()
            .position(|c| c.id == id)
            .ok_or(BattleError::UnknownCharacter(id))
    }

    fn emit(&mut self, event: BattleEvent) {
        self.bus.emit(&event);
    }
}

fn has_alive(units: &[Character], team: Team) -> bool {
    units.iter().any(|u| u.team == team && u.is_alive())
}
