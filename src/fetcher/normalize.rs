//! SRD API payloads and their normalization into [`Monster`] records
//!
//! Every payload field is optional; absent fields fall back to documented
//! defaults. Only `index` and `name` are required.

use crate::error::{Error, Result};
use crate::types::{AbilityScores, Attack, LegendaryAction, Monster, SpecialAbility, TextMap};
use regex::Regex;
use serde::de::{IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fmt;
use std::sync::LazyLock;
use tracing::warn;

/// Fallback values for fields missing from a payload
pub mod defaults {
    /// Size category
    pub const SIZE: &str = "Medium";
    /// Creature type
    pub const KIND: &str = "unknown";
    /// Alignment
    pub const ALIGNMENT: &str = "unaligned";
    /// Armor class
    pub const ARMOR_CLASS: i64 = 10;
    /// Hit points
    pub const HIT_POINTS: i64 = 10;
    /// Hit dice
    pub const HIT_DICE: &str = "1d8";
    /// Challenge rating
    pub const CHALLENGE_RATING: f64 = 0.0;
    /// Proficiency bonus
    pub const PROFICIENCY_BONUS: i64 = 2;
    /// Experience value
    pub const XP: i64 = 0;
    /// Each ability score
    pub const ABILITY_SCORE: i64 = 10;
    /// Legendary action cost
    pub const LEGENDARY_COST: i64 = 1;
}

/// Entry of `GET /monsters`
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct MonsterRef {
    /// Slug used for the detail endpoint
    pub index: String,
    /// Display name
    pub name: String,
}

/// Body of `GET /monsters`
#[derive(Debug, Deserialize)]
pub struct MonsterList {
    /// Listed monsters, in API order
    #[serde(default)]
    pub results: Vec<MonsterRef>,
}

/// Body of `GET /monsters/{index}`, every field optional
///
/// Field names mirror the API schema.
#[allow(missing_docs)]
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ApiMonster {
    #[serde(default)]
    pub index: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub subtype: Option<String>,
    #[serde(default)]
    pub alignment: Option<String>,
    /// A list of `{type, value}` entries, or a bare number in older payloads
    #[serde(default)]
    pub armor_class: Option<Value>,
    #[serde(default)]
    pub hit_points: Option<i64>,
    #[serde(default)]
    pub hit_dice: Option<String>,
    #[serde(default, deserialize_with = "lenient_fields")]
    pub speed: Option<OrderedFields>,
    #[serde(default)]
    pub strength: Option<i64>,
    #[serde(default)]
    pub dexterity: Option<i64>,
    #[serde(default)]
    pub constitution: Option<i64>,
    #[serde(default)]
    pub intelligence: Option<i64>,
    #[serde(default)]
    pub wisdom: Option<i64>,
    #[serde(default)]
    pub charisma: Option<i64>,
    #[serde(default)]
    pub challenge_rating: Option<f64>,
    #[serde(default)]
    pub proficiency_bonus: Option<i64>,
    #[serde(default)]
    pub xp: Option<i64>,
    #[serde(default)]
    pub actions: Option<Vec<ApiAction>>,
    #[serde(default)]
    pub special_abilities: Option<Vec<ApiAction>>,
    #[serde(default)]
    pub legendary_actions: Option<Vec<ApiAction>>,
    #[serde(default, deserialize_with = "lenient_fields")]
    pub senses: Option<OrderedFields>,
    #[serde(default)]
    pub languages: Option<String>,
    #[serde(default)]
    pub damage_vulnerabilities: Option<Vec<Value>>,
    #[serde(default)]
    pub damage_resistances: Option<Vec<Value>>,
    #[serde(default)]
    pub damage_immunities: Option<Vec<Value>>,
    #[serde(default)]
    pub condition_immunities: Option<Vec<Value>>,
}

/// An action, special ability or legendary action entry
#[allow(missing_docs)]
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ApiAction {
    pub name: String,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub attack_bonus: Option<i64>,
    /// A list of damage entries or a single entry
    #[serde(default)]
    pub damage: Option<Value>,
}

/// JSON object fields in document order
///
/// `serde_json::Map` sorts its keys, which would reorder speed and sense
/// entries.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OrderedFields(pub Vec<(String, Value)>);

impl<'de> Deserialize<'de> for OrderedFields {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct FieldsVisitor;

        impl<'de> Visitor<'de> for FieldsVisitor {
            type Value = OrderedFields;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a JSON object")
            }

            fn visit_map<A>(self, mut access: A) -> std::result::Result<OrderedFields, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut fields = Vec::new();
                while let Some((k, v)) = access.next_entry::<String, Value>()? {
                    fields.push((k, v));
                }
                Ok(OrderedFields(fields))
            }
        }

        deserializer.deserialize_map(FieldsVisitor)
    }
}

// Non-object values (null, strings, numbers) are treated as absent
fn lenient_fields<'de, D>(deserializer: D) -> std::result::Result<Option<OrderedFields>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum FieldsOrOther {
        Fields(OrderedFields),
        Other(IgnoredAny),
    }

    Ok(match FieldsOrOther::deserialize(deserializer)? {
        FieldsOrOther::Fields(fields) => Some(fields),
        FieldsOrOther::Other(_) => None,
    })
}

impl ApiMonster {
    /// Challenge rating with the documented fallback
    pub fn rating(&self) -> f64 {
        self.challenge_rating.unwrap_or(defaults::CHALLENGE_RATING)
    }

    /// True when the payload lists at least one legendary action
    pub fn has_legendary_actions(&self) -> bool {
        self.legendary_actions
            .as_ref()
            .is_some_and(|actions| !actions.is_empty())
    }
}

/// Convert an API payload into a [`Monster`]
pub fn normalize(data: ApiMonster) -> Result<Monster> {
    let index = data
        .index
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::InvalidRecord {
            index: "<unknown>".to_string(),
            reason: "missing index".to_string(),
        })?;
    let name = data
        .name
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::InvalidRecord {
            index: index.clone(),
            reason: "missing name".to_string(),
        })?;

    let ability_scores = AbilityScores {
        strength: data.strength.unwrap_or(defaults::ABILITY_SCORE),
        dexterity: data.dexterity.unwrap_or(defaults::ABILITY_SCORE),
        constitution: data.constitution.unwrap_or(defaults::ABILITY_SCORE),
        intelligence: data.intelligence.unwrap_or(defaults::ABILITY_SCORE),
        wisdom: data.wisdom.unwrap_or(defaults::ABILITY_SCORE),
        charisma: data.charisma.unwrap_or(defaults::ABILITY_SCORE),
    };

    let attacks = data
        .actions
        .unwrap_or_default()
        .into_iter()
        .filter(|action| action.attack_bonus.is_some_and(|bonus| bonus != 0))
        .map(normalize_attack)
        .collect();

    let special_abilities = data
        .special_abilities
        .unwrap_or_default()
        .into_iter()
        .map(|ability| SpecialAbility {
            name: ability.name,
            description: ability.desc.unwrap_or_default(),
        })
        .collect();

    let legendary_actions: Vec<LegendaryAction> = data
        .legendary_actions
        .unwrap_or_default()
        .into_iter()
        .map(|action| LegendaryAction {
            cost: legendary_cost(&action.name),
            name: action.name,
            description: action.desc.unwrap_or_default(),
        })
        .collect();

    let speed: TextMap = data
        .speed
        .unwrap_or_default()
        .0
        .into_iter()
        .filter(|(mode, _)| mode != "hover")
        .map(|(mode, value)| (mode, value_to_text(&value)))
        .collect();

    // passive_perception arrives as a number and is kept as text like the rest
    let senses: TextMap = data
        .senses
        .unwrap_or_default()
        .0
        .into_iter()
        .map(|(sense, value)| (sense, value_to_text(&value)))
        .collect();

    Ok(Monster {
        index,
        name,
        size: data.size.unwrap_or_else(|| defaults::SIZE.to_string()),
        kind: data.kind.unwrap_or_else(|| defaults::KIND.to_string()),
        alignment: data
            .alignment
            .unwrap_or_else(|| defaults::ALIGNMENT.to_string()),
        armor_class: armor_class(data.armor_class.as_ref()),
        hit_points: data.hit_points.unwrap_or(defaults::HIT_POINTS),
        hit_dice: data
            .hit_dice
            .unwrap_or_else(|| defaults::HIT_DICE.to_string()),
        speed,
        ability_scores,
        challenge_rating: data
            .challenge_rating
            .unwrap_or(defaults::CHALLENGE_RATING),
        proficiency_bonus: data
            .proficiency_bonus
            .unwrap_or(defaults::PROFICIENCY_BONUS),
        xp: data.xp.unwrap_or(defaults::XP),
        attacks,
        special_abilities,
        senses,
        languages: data.languages.unwrap_or_default(),
        damage_vulnerabilities: qualifier_names(data.damage_vulnerabilities),
        damage_resistances: qualifier_names(data.damage_resistances),
        damage_immunities: qualifier_names(data.damage_immunities),
        condition_immunities: qualifier_names(data.condition_immunities),
        subtype: data.subtype.filter(|s| !s.is_empty()),
        legendary_actions: (!legendary_actions.is_empty()).then_some(legendary_actions),
    })
}

fn normalize_attack(action: ApiAction) -> Attack {
    // Only the first damage entry is kept
    let first_damage = match &action.damage {
        Some(Value::Array(entries)) => entries.first(),
        Some(entry @ Value::Object(_)) => Some(entry),
        _ => None,
    };

    let (damage, damage_type) = match first_damage {
        Some(Value::Object(entry)) => (
            entry
                .get("damage_dice")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            entry
                .get("damage_type")
                .and_then(|t| t.get("name"))
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        ),
        _ => (String::new(), String::new()),
    };

    Attack {
        attack_bonus: action.attack_bonus.unwrap_or_default(),
        name: action.name,
        damage,
        damage_type,
        description: action.desc.unwrap_or_default(),
    }
}

fn armor_class(value: Option<&Value>) -> i64 {
    let found = match value {
        Some(Value::Array(entries)) => entries
            .first()
            .and_then(|entry| entry.get("value"))
            .and_then(Value::as_i64),
        Some(Value::Number(n)) => n.as_i64(),
        _ => None,
    };
    found.unwrap_or(defaults::ARMOR_CLASS)
}

// Qualifiers are either plain strings or `{index, name, url}` references
fn qualifier_names(values: Option<Vec<Value>>) -> Vec<String> {
    values
        .unwrap_or_default()
        .iter()
        .map(|value| match value {
            Value::String(s) => s.clone(),
            Value::Object(obj) => match obj.get("name") {
                Some(Value::String(name)) => name.clone(),
                _ => value.to_string(),
            },
            other => other.to_string(),
        })
        .collect()
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

static COST_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    regex::RegexBuilder::new(r"\(costs\s+(\d+)\s+actions?\)")
        .case_insensitive(true)
        .build()
        .map_err(|e| warn!("invalid legendary cost pattern: {e}"))
        .ok()
});

/// Legendary action cost from a "(Costs N Actions)" name suffix, default 1
pub fn legendary_cost(name: &str) -> i64 {
    COST_PATTERN
        .as_ref()
        .and_then(|re| re.captures(name))
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(defaults::LEGENDARY_COST)
}
