use std::collections::BTreeMap;
use std::rc::Rc;

use serde::Deserialize;

use crate::error::CatalogError;
use crate::skill::{builtin_skill, EffectKind, Skill, BUILTIN_SKILL_IDS};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillCategory {
    Physical,
    Magic,
    Poison,
    Healing,
    Buff,
    Debuff,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillRarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

#[derive(Deserialize)]
struct SkillData {
    #[serde(flatten)]
    skill: Skill,
    #[serde(default)]
    category: Option<SkillCategory>,
    #[serde(default)]
    rarity: Option<SkillRarity>,
}

#[derive(Deserialize)]
struct SkillDataCollection {
    skills: BTreeMap<String, SkillData>,
}

#[derive(Clone, Debug)]
struct CatalogEntry {
    skill: Rc<Skill>,
    category: Option<SkillCategory>,
    rarity: Option<SkillRarity>,
}

/// Registry of skill definitions keyed by id.
///
/// Lookups hand out shared `Rc<Skill>` values, so characters built from
/// the same catalog point at the same definition.
#[derive(Clone, Debug, Default)]
pub struct SkillCatalog {
    entries: BTreeMap<String, CatalogEntry>,
}

impl SkillCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        for id in BUILTIN_SKILL_IDS {
            let Some(skill) = builtin_skill(id) else {
                continue;
            };
            let (category, rarity) = match id {
                "heal" => (SkillCategory::Healing, SkillRarity::Common),
                "fireball" => (SkillCategory::Magic, SkillRarity::Uncommon),
                "slime-attack" => (SkillCategory::Poison, SkillRarity::Common),
                _ => (SkillCategory::Physical, SkillRarity::Common),
            };
            catalog
                .entries
                .entry(skill.id.clone())
                .or_insert_with(|| CatalogEntry {
                    skill: Rc::new(skill),
                    category: Some(category),
                    rarity: Some(rarity),
                });
        }
        catalog
    }

    /// Parses `{ "skills": { "<id>": { ...skill data... } } }`.
    pub fn from_json(text: &str) -> Result<Self, CatalogError> {
        let collection: SkillDataCollection = serde_json::from_str(text)?;
        let mut catalog = Self::new();
        for (_, data) in collection.skills {
            catalog.insert_with(data.skill, data.category, data.rarity)?;
        }
        tracing::debug!(skills = catalog.len(), "skill catalog loaded");
        Ok(catalog)
    }

    pub fn insert(&mut self, skill: Skill) -> Result<Rc<Skill>, CatalogError> {
        self.insert_with(skill, None, None)
    }

    pub fn insert_with(
        &mut self,
        skill: Skill,
        category: Option<SkillCategory>,
        rarity: Option<SkillRarity>,
    ) -> Result<Rc<Skill>, CatalogError> {
        if self.entries.contains_key(&skill.id) {
            return Err(CatalogError::DuplicateSkill(skill.id));
        }
        validate(&skill)?;
        let skill = Rc::new(skill);
        self.entries.insert(
            skill.id.clone(),
            CatalogEntry {
                skill: Rc::clone(&skill),
                category,
                rarity,
            },
        );
        Ok(skill)
    }

    pub fn get(&self, id: &str) -> Option<Rc<Skill>> {
        self.entries.get(id).map(|e| Rc::clone(&e.skill))
    }

    pub fn require(&self, id: &str) -> Result<Rc<Skill>, CatalogError> {
        self.get(id).ok_or_else(|| CatalogError::UnknownSkill(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn all(&self) -> Vec<Rc<Skill>> {
        self.entries.values().map(|e| Rc::clone(&e.skill)).collect()
    }

    pub fn by_category(&self, category: SkillCategory) -> Vec<Rc<Skill>> {
        self.filtered(|e| e.category == Some(category))
    }

    pub fn by_rarity(&self, rarity: SkillRarity) -> Vec<Rc<Skill>> {
        self.filtered(|e| e.rarity == Some(rarity))
    }

    /// Unknown ids are skipped.
    pub fn resolve_many<'a>(&self, ids: impl IntoIterator<Item = &'a str>) -> Vec<Rc<Skill>> {
        ids.into_iter()
            .filter_map(|id| {
                let skill = self.get(id);
                if skill.is_none() {
                    tracing::warn!(skill = id, "unknown skill id skipped");
                }
                skill
            })
            .collect()
    }

    fn filtered(&self, keep: impl Fn(&CatalogEntry) -> bool) -> Vec<Rc<Skill>> {
        self.entries
            .values()
            .filter(|e| keep(e))
            .map(|e| Rc::clone(&e.skill))
            .collect()
    }
}

/// MP costs and heal amounts must not be negative.
fn validate(skill: &Skill) -> Result<(), CatalogError> {
    let negative = |field: &'static str, value: i32| CatalogError::NegativeValue {
        id: skill.id.clone(),
        field,
        value,
    };
    if skill.mp_cost < 0 {
        return Err(negative("mpCost", skill.mp_cost));
    }
    if let Some(effect) = skill
        .effects
        .iter()
        .find(|e| e.kind == EffectKind::Heal && e.value < 0)
    {
        return Err(negative("heal value", effect.value));
    }
    Ok(())
}
