//! Target selection for player-cast skills.
//!
//! A session runs `Idle -> Selecting -> Confirmed -> Idle`; cancelling
//! from `Selecting` returns straight to `Idle`. Valid targets are
//! computed once, when the session starts:
//! - enemy-type skills: living enemies
//! - ally-type skills: living allies
//! - `self`: the caster, if alive
//!
//! Whether the host needs to prompt at all is decided by
//! [`needs_manual_selection`]: group and self skills never do, single
//! target skills only when there is more than one valid target.

use std::rc::Rc;

use crate::error::TargetingError;
use crate::model::{Character, CharacterId};
use crate::skill::{Skill, TargetType};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TargetingState {
    Idle,
    Selecting,
    Confirmed,
}

impl TargetingState {
    pub fn as_str(self) -> &'static str {
        match self {
            TargetingState::Idle => "IDLE",
            TargetingState::Selecting => "SELECTING",
            TargetingState::Confirmed => "CONFIRMED",
        }
    }
}

/// Committed selection handed back by [`TargetingStateMachine::complete_targeting`].
#[derive(Clone, Debug, PartialEq)]
pub struct TargetingCommit {
    pub skill: Rc<Skill>,
    pub caster: CharacterId,
    pub targets: Vec<CharacterId>,
}

/// Living characters a skill may be aimed at, in roster order.
pub fn valid_targets(
    target_type: TargetType,
    allies: &[&Character],
    enemies: &[&Character],
    caster: &Character,
) -> Vec<CharacterId> {
    let alive = |side: &[&Character]| -> Vec<CharacterId> {
        side.iter().filter(|c| c.is_alive()).map(|c| c.id).collect()
    };
    match target_type {
        TargetType::SingleEnemy | TargetType::AllEnemies => alive(enemies),
        TargetType::SingleAlly | TargetType::AllAllies => alive(allies),
        TargetType::SelfOnly => {
            if caster.is_alive() {
                vec![caster.id]
            } else {
                Vec::new()
            }
        }
    }
}

pub fn needs_manual_selection(target_type: TargetType, valid_count: usize) -> bool {
    target_type.is_single() && valid_count > 1
}

#[derive(Debug)]
pub struct TargetingStateMachine {
    state: TargetingState,
    skill: Option<Rc<Skill>>,
    caster: Option<CharacterId>,
    allies: Vec<CharacterId>,
    enemies: Vec<CharacterId>,
    valid: Vec<CharacterId>,
    selected: Vec<CharacterId>,
}

impl Default for TargetingStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl TargetingStateMachine {
    pub fn new() -> Self {
        Self {
            state: TargetingState::Idle,
            skill: None,
            caster: None,
            allies: Vec::new(),
            enemies: Vec::new(),
            valid: Vec::new(),
            selected: Vec::new(),
        }
    }

    pub fn start_targeting(
        &mut self,
        skill: Rc<Skill>,
        allies: &[&Character],
        enemies: &[&Character],
        caster: &Character,
    ) {
        self.valid = valid_targets(skill.target_type, allies, enemies, caster);
        self.allies = allies.iter().map(|c| c.id).collect();
        self.enemies = enemies.iter().map(|c| c.id).collect();
        self.caster = Some(caster.id);
        self.selected.clear();
        self.state = TargetingState::Selecting;

        tracing::debug!(
            skill = %skill.id,
            target_type = skill.target_type.as_str(),
            caster = %caster.name,
            valid = self.valid.len(),
            "targeting started"
        );
        self.skill = Some(skill);
    }

    /// Commits a selection. Single-target skills take exactly `candidate`;
    /// group skills take every member of the targeted side still alive in
    /// `roster`, no matter which one was picked; `self` takes the caster.
    pub fn select_target(
        &mut self,
        candidate: &Character,
        roster: &[Character],
    ) -> Result<&[CharacterId], TargetingError> {
        let (TargetingState::Selecting, Some(skill)) = (self.state, self.skill.as_ref()) else {
            return Err(TargetingError::NotSelecting);
        };
        if !candidate.is_alive() || !self.valid.contains(&candidate.id) {
            return Err(TargetingError::InvalidTarget(candidate.id));
        }

        self.selected = match skill.target_type {
            TargetType::SingleEnemy | TargetType::SingleAlly => vec![candidate.id],
            TargetType::AllEnemies | TargetType::AllAllies => {
                let side = if skill.target_type.hits_enemies() {
                    &self.enemies
                } else {
                    &self.allies
                };
                side.iter()
                    .copied()
                    .filter(|id| roster.iter().any(|c| c.id == *id && c.is_alive()))
                    .collect()
            }
            TargetType::SelfOnly => self.caster.into_iter().collect(),
        };
        self.state = TargetingState::Confirmed;
        tracing::debug!(selected = self.selected.len(), "targeting confirmed");
        Ok(&self.selected)
    }

    pub fn cancel_targeting(&mut self) {
        tracing::debug!(state = self.state.as_str(), "targeting cancelled");
        self.clear_session();
    }

    /// Ends the session. Returns the selection only if one was confirmed.
    pub fn complete_targeting(&mut self) -> Option<TargetingCommit> {
        let commit = match (self.state, &self.skill, self.caster) {
            (TargetingState::Confirmed, Some(skill), Some(caster)) => Some(TargetingCommit {
                skill: Rc::clone(skill),
                caster,
                targets: std::mem::take(&mut self.selected),
            }),
            _ => None,
        };
        self.clear_session();
        commit
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn state(&self) -> TargetingState {
        self.state
    }

    pub fn valid_targets(&self) -> &[CharacterId] {
        &self.valid
    }

    pub fn selected_targets(&self) -> &[CharacterId] {
        &self.selected
    }

    pub fn current_skill(&self) -> Option<&Rc<Skill>> {
        self.skill.as_ref()
    }

    pub fn caster(&self) -> Option<CharacterId> {
        self.caster
    }

    pub fn allies(&self) -> &[CharacterId] {
        &self.allies
    }

    pub fn enemies(&self) -> &[CharacterId] {
        &self.enemies
    }

    fn clear_session(&mut self) {
        self.state = TargetingState::Idle;
        self.skill = None;
        self.selected.clear();
        self.valid.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::{needs_manual_selection, TargetingState, TargetingStateMachine};
    use crate::error::TargetingError;
    use crate::model::{Character, CharacterId, CharacterStats, Team};
    use crate::skill::{Effect, Skill, TargetType};

    fn character(id: u32, team: Team, name: &str) -> Character {
        let mut c = Character::new(CharacterStats::new(name, 50, 10, 5));
        c.id = CharacterId(id);
        c.team = team;
        c
    }

    fn skill(target_type: TargetType) -> Rc<Skill> {
        Rc::new(Skill::new("s", "S", 0, target_type, vec![Effect::damage(100)]))
    }

    struct Field {
        heroes: Vec<Character>,
        enemies: Vec<Character>,
    }

    impl Field {
        fn new() -> Self {
            Self {
                heroes: vec![character(0, Team::Hero, "Warrior"), character(1, Team::Hero, "Mage")],
                enemies: vec![
                    character(2, Team::Enemy, "Slime"),
                    character(3, Team::Enemy, "Goblin"),
                    character(4, Team::Enemy, "Bat"),
                ],
            }
        }

        fn roster(&self) -> Vec<Character> {
            self.heroes.iter().chain(&self.enemies).cloned().collect()
        }

        fn start(&self, tsm: &mut TargetingStateMachine, target_type: TargetType) {
            let allies: Vec<&Character> = self.heroes.iter().collect();
            let enemies: Vec<&Character> = self.enemies.iter().collect();
            tsm.start_targeting(skill(target_type), &allies, &enemies, &self.heroes[0]);
        }
    }

    #[test]
    fn single_enemy_selection_commits_exactly_the_candidate() {
        let field = Field::new();
        let mut tsm = TargetingStateMachine::new();
        field.start(&mut tsm, TargetType::SingleEnemy);
        assert_eq!(tsm.state(), TargetingState::Selecting);
        assert_eq!(tsm.valid_targets(), &[CharacterId(2), CharacterId(3), CharacterId(4)]);

        let selected = tsm.select_target(&field.enemies[1], &field.roster()).unwrap().to_vec();
        assert_eq!(selected, vec![CharacterId(3)]);
        assert_eq!(tsm.state(), TargetingState::Confirmed);

        let commit = tsm.complete_targeting().unwrap();
        assert_eq!(commit.caster, CharacterId(0));
        assert_eq!(commit.targets, vec![CharacterId(3)]);
        assert_eq!(tsm.state(), TargetingState::Idle);
        assert!(tsm.valid_targets().is_empty());
        assert!(tsm.selected_targets().is_empty());
    }

    #[test]
    fn group_skill_ignores_which_valid_candidate_was_clicked() {
        let mut field = Field::new();
        field.enemies[2].hp = 0;
        let mut tsm = TargetingStateMachine::new();
        field.start(&mut tsm, TargetType::AllEnemies);

        let selected = tsm.select_target(&field.enemies[1], &field.roster()).unwrap().to_vec();
        assert_eq!(selected, vec![CharacterId(2), CharacterId(3)]);
    }

    #[test]
    fn group_commit_drops_targets_downed_after_the_session_started() {
        let mut field = Field::new();
        let mut tsm = TargetingStateMachine::new();
        field.start(&mut tsm, TargetType::AllAllies);
        assert_eq!(tsm.valid_targets(), &[CharacterId(0), CharacterId(1)]);

        field.heroes[1].hp = 0;
        let selected = tsm.select_target(&field.heroes[0], &field.roster()).unwrap().to_vec();
        assert_eq!(selected, vec![CharacterId(0)]);
    }

    #[test]
    fn self_skill_selects_the_caster() {
        let field = Field::new();
        let mut tsm = TargetingStateMachine::new();
        field.start(&mut tsm, TargetType::SelfOnly);
        assert_eq!(tsm.valid_targets(), &[CharacterId(0)]);

        assert_eq!(
            tsm.select_target(&field.heroes[1], &field.roster()),
            Err(TargetingError::InvalidTarget(CharacterId(1)))
        );
        let selected = tsm.select_target(&field.heroes[0], &field.roster()).unwrap().to_vec();
        assert_eq!(selected, vec![CharacterId(0)]);
    }

    #[test]
    fn invalid_candidates_leave_state_untouched() {
        let mut field = Field::new();
        field.enemies[0].hp = 0;
        let mut tsm = TargetingStateMachine::new();
        field.start(&mut tsm, TargetType::SingleEnemy);

        assert_eq!(
            tsm.select_target(&field.enemies[0], &field.roster()),
            Err(TargetingError::InvalidTarget(CharacterId(2)))
        );
        assert_eq!(
            tsm.select_target(&field.heroes[1], &field.roster()),
            Err(TargetingError::InvalidTarget(CharacterId(1)))
        );
        assert_eq!(tsm.state(), TargetingState::Selecting);
        assert!(tsm.selected_targets().is_empty());
    }

    #[test]
    fn selecting_outside_a_session_fails() {
        let field = Field::new();
        let mut tsm = TargetingStateMachine::new();
        assert_eq!(tsm.select_target(&field.enemies[0], &field.roster()), Err(TargetingError::NotSelecting));

        field.start(&mut tsm, TargetType::SingleEnemy);
        tsm.select_target(&field.enemies[0], &field.roster()).unwrap();
        assert_eq!(tsm.select_target(&field.enemies[1], &field.roster()), Err(TargetingError::NotSelecting));
    }

    #[test]
    fn cancel_returns_to_idle_without_commit() {
        let field = Field::new();
        let mut tsm = TargetingStateMachine::new();
        field.start(&mut tsm, TargetType::SingleAlly);
        tsm.cancel_targeting();
        assert_eq!(tsm.state(), TargetingState::Idle);
        assert!(tsm.current_skill().is_none());
        assert!(tsm.complete_targeting().is_none());
    }

    #[test]
    fn reset_clears_rosters_too() {
        let field = Field::new();
        let mut tsm = TargetingStateMachine::new();
        field.start(&mut tsm, TargetType::SingleAlly);
        assert_eq!(tsm.allies().len(), 2);
        tsm.reset();
        assert!(tsm.allies().is_empty());
        assert!(tsm.enemies().is_empty());
        assert!(tsm.caster().is_none());
    }

    #[test]
    fn manual_selection_only_for_real_choices() {
        assert!(!needs_manual_selection(TargetType::SingleEnemy, 0));
        assert!(!needs_manual_selection(TargetType::SingleEnemy, 1));
        assert!(needs_manual_selection(TargetType::SingleEnemy, 2));
        assert!(needs_manual_selection(TargetType::SingleAlly, 3));
        assert!(!needs_manual_selection(TargetType::AllEnemies, 3));
        assert!(!needs_manual_selection(TargetType::AllAllies, 3));
        assert!(!needs_manual_selection(TargetType::SelfOnly, 1));
    }
}
