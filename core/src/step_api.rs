use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;

use crate::battle::BattleController;
use crate::catalog::SkillCatalog;
use crate::engine::targeting::{TargetingState, TargetingStateMachine};
use crate::error::BattleError;
use crate::log::push_event;
use crate::model::CharacterId;
use crate::presets::{demo_enemies, demo_heroes};
use crate::rng::seeded;

mod manager;

pub(crate) fn round2(v: f32) -> f32 {
    (v * 100.0).round() / 100.0
}

#[wasm_bindgen(getter_with_clone)]
pub struct StepResult {
    pub events: Vec<String>,
    /// Id of the hero waiting for a command, or -1.
    pub ready_actor: i32,
    pub need_target: bool,
    pub ended: bool,
    pub victory: bool,
    pub error: String,
}

impl StepResult {
    fn invalid_handle(handle: u32) -> Self {
        Self {
            events: Vec::new(),
            ready_actor: -1,
            need_target: false,
            ended: true,
            victory: false,
            error: format!("invalid_handle:{handle}"),
        }
    }
}

#[wasm_bindgen(getter_with_clone)]
#[derive(Clone)]
pub struct UnitSnapshot {
    pub id: u32,
    pub name: String,
    pub team: String,
    pub hp: i32,
    pub max_hp: i32,
    pub mp: i32,
    pub max_mp: i32,
    pub turn_gauge: f32,
}

#[wasm_bindgen(getter_with_clone)]
pub struct Snapshot {
    pub ended: bool,
    pub victory: bool,
    pub units: Vec<UnitSnapshot>,
}

/// One battle driven by the host: the controller, the current targeting
/// session and the event lines not yet handed out.
pub(crate) struct ActiveBattle {
    pub(crate) seed: u64,
    pub(crate) controller: BattleController,
    pub(crate) targeting: TargetingStateMachine,
    pub(crate) ready_actor: Option<CharacterId>,
    events: Rc<RefCell<Vec<String>>>,
}

impl ActiveBattle {
    pub(crate) fn new(seed: u64) -> Result<Self, BattleError> {
        let catalog = SkillCatalog::builtin();
        let mut controller = BattleController::new(
            demo_heroes(&catalog),
            demo_enemies(&catalog),
            Box::new(seeded(seed)),
        )?;

        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        controller.on(move |event| push_event(&mut sink.borrow_mut(), event));

        Ok(Self {
            seed,
            controller,
            targeting: TargetingStateMachine::new(),
            ready_actor: None,
            events,
        })
    }

    pub(crate) fn reset(&mut self) -> Result<(), BattleError> {
        *self = Self::new(self.seed)?;
        Ok(())
    }

    /// Advances the timeline unless a hero is still waiting for a command.
    pub(crate) fn step_once(&mut self, dt: f32) -> StepResult {
        if self.ready_actor.is_none() && !self.controller.is_battle_over() {
            self.ready_actor = self.controller.update(dt);
        }
        self.result(String::new())
    }

    pub(crate) fn attack(&mut self, actor: u32, target: u32) -> StepResult {
        let (actor, target) = (CharacterId(actor), CharacterId(target));
        if let Err(error) = self.expect_command(actor) {
            return self.result(error);
        }

        let opposing = self.controller.character(actor).map(|c| c.team().opponent());
        let target_ok = self
            .controller
            .character(target)
            .is_some_and(|t| t.is_alive() && Some(t.team()) == opposing);
        if !target_ok {
            return self.result(format!("invalid_target:{}", target.0));
        }

        match self.controller.execute_attack(actor, target) {
            Ok(_) => {
                self.ready_actor = None;
                self.result(String::new())
            }
            Err(err) => self.result(err.to_string()),
        }
    }

    pub(crate) fn use_skill(&mut self, actor: u32, skill_id: &str) -> StepResult {
        let actor = CharacterId(actor);
        if let Err(error) = self.expect_command(actor) {
            return self.result(error);
        }

        let Some(skill) = self
            .controller
            .character(actor)
            .and_then(|c| c.skill(skill_id))
            .cloned()
        else {
            return self.result(format!("unknown_skill:{skill_id}"));
        };

        match self.controller.handle_skill_use(actor, &skill) {
            Ok(true) => match self.controller.begin_targeting(&mut self.targeting, actor, skill) {
                Ok(()) => self.result(String::new()),
                Err(err) => self.result(err.to_string()),
            },
            Ok(false) => {
                self.ready_actor = None;
                self.result(String::new())
            }
            Err(err) => self.result(err.to_string()),
        }
    }

    pub(crate) fn select_target(&mut self, target: u32) -> StepResult {
        let Some(candidate) = self.controller.character(CharacterId(target)).cloned() else {
            return self.result(format!("invalid_target:{target}"));
        };
        if let Err(err) = self.targeting.select_target(&candidate, self.controller.characters()) {
            return self.result(err.to_string());
        }
        let Some(commit) = self.targeting.complete_targeting() else {
            return self.result("targeting_not_confirmed".to_string());
        };

        match self
            .controller
            .execute_targeted_skill(commit.caster, &commit.skill, &commit.targets)
        {
            Ok(_) => {
                self.ready_actor = None;
                self.result(String::new())
            }
            Err(err) => self.result(err.to_string()),
        }
    }

    pub(crate) fn cancel_targeting(&mut self) -> StepResult {
        self.targeting.cancel_targeting();
        self.result(String::new())
    }

    pub(crate) fn valid_targets(&self) -> Vec<u32> {
        self.targeting.valid_targets().iter().map(|id| id.0).collect()
    }

    fn expect_command(&self, actor: CharacterId) -> Result<(), String> {
        if self.targeting.state() != TargetingState::Idle {
            return Err("targeting_in_progress".to_string());
        }
        if self.ready_actor != Some(actor) {
            return Err(format!("not_ready:{}", actor.0));
        }
        Ok(())
    }

    fn result(&mut self, error: String) -> StepResult {
        if !error.is_empty() {
            tracing::warn!(%error, "host command rejected");
        }
        StepResult {
            events: std::mem::take(&mut *self.events.borrow_mut()),
            ready_actor: self.ready_actor.map_or(-1, |id| id.0 as i32),
            need_target: self.targeting.state() == TargetingState::Selecting,
            ended: self.controller.is_battle_over(),
            victory: self.controller.is_victory(),
            error,
        }
    }
}

/// Returns 0 when the battle could not be created.
#[wasm_bindgen]
pub fn create_battle(seed: u32) -> u32 {
    manager::create_battle(seed)
}

#[wasm_bindgen]
pub fn destroy_battle(handle: u32) {
    manager::destroy_battle(handle);
}

#[wasm_bindgen]
pub fn reset_battle(handle: u32) -> bool {
    manager::reset_battle(handle)
}

#[wasm_bindgen]
pub fn step(handle: u32, dt: f32) -> StepResult {
    manager::with_battle_mut(handle, |battle| battle.step_once(dt))
        .unwrap_or_else(|| StepResult::invalid_handle(handle))
}

#[wasm_bindgen]
pub fn attack(handle: u32, actor: u32, target: u32) -> StepResult {
    manager::with_battle_mut(handle, |battle| battle.attack(actor, target))
        .unwrap_or_else(|| StepResult::invalid_handle(handle))
}

#[wasm_bindgen]
pub fn use_skill(handle: u32, actor: u32, skill_id: &str) -> StepResult {
    manager::with_battle_mut(handle, |battle| battle.use_skill(actor, skill_id))
        .unwrap_or_else(|| StepResult::invalid_handle(handle))
}

#[wasm_bindgen]
pub fn select_target(handle: u32, target: u32) -> StepResult {
    manager::with_battle_mut(handle, |battle| battle.select_target(target))
        .unwrap_or_else(|| StepResult::invalid_handle(handle))
}

#[wasm_bindgen]
pub fn cancel_targeting(handle: u32) -> StepResult {
    manager::with_battle_mut(handle, |battle| battle.cancel_targeting())
        .unwrap_or_else(|| StepResult::invalid_handle(handle))
}

#[wasm_bindgen]
pub fn valid_targets(handle: u32) -> Vec<u32> {
    manager::with_battle(handle, |battle| battle.valid_targets()).unwrap_or_default()
}

#[wasm_bindgen]
pub fn get_snapshot(handle: u32) -> Snapshot {
    manager::with_battle(handle, |battle| battle.snapshot()).unwrap_or_else(|| Snapshot {
        ended: true,
        victory: false,
        units: Vec::new(),
    })
}
