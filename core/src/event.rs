use serde::Serialize;

use crate::model::CharacterId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BattleEventKind {
    TurnStart,
    Attack,
    Skill,
    Damage,
    Heal,
    TurnEnd,
    BattleEnd,
}

/// Optional numeric payload attached to an event.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub damage: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_critical: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skill_id: Option<String>,
}

/// Informational record broadcast to presentation layers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BattleEvent {
    #[serde(rename = "type")]
    pub kind: BattleEventKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor: Option<CharacterId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<CharacterId>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<EventData>,
}

impl BattleEvent {
    pub fn new(kind: BattleEventKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            actor: None,
            target: None,
            message: message.into(),
            data: None,
        }
    }

    pub fn actor(mut self, actor: CharacterId) -> Self {
        self.actor = Some(actor);
        self
    }

    pub fn target(mut self, target: Option<CharacterId>) -> Self {
        self.target = target;
        self
    }

    pub fn data(mut self, data: EventData) -> Self {
        self.data = Some(data);
        self
    }

    pub fn hit(damage: i32, is_critical: bool) -> EventData {
        EventData {
            damage: Some(damage),
            is_critical: Some(is_critical),
            ..EventData::default()
        }
    }

    pub fn to_json_line(&self) -> String {
        // Every field is a plain string, integer, bool or unit enum.
        serde_json::to_string(self).unwrap_or_default()
    }
}
