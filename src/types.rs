//! Core record types for bestiary
//!
//! [`Monster`] is the normalized, flat shape every component agrees on. Its
//! serde layout (camelCase keys, optional fields last and omitted when absent)
//! is the record format of the interchange document.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A normalized monster record
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Monster {
    /// Unique slug, e.g. "adult-red-dragon"
    pub index: String,
    /// Display name
    pub name: String,
    /// Size category ("Medium", "Huge", ...)
    pub size: String,
    /// Creature type ("dragon", "undead", ...)
    #[serde(rename = "type")]
    pub kind: String,
    /// Alignment text
    pub alignment: String,
    /// Armor class
    pub armor_class: i64,
    /// Average hit points
    pub hit_points: i64,
    /// Hit dice expression, e.g. "19d12"
    pub hit_dice: String,
    /// Movement mode to rate, e.g. walk → "40 ft."
    pub speed: TextMap,
    /// The six ability scores
    pub ability_scores: AbilityScores,
    /// Challenge rating; fractional below 1 (0.125, 0.25, 0.5)
    #[serde(serialize_with = "serialize_rating")]
    pub challenge_rating: f64,
    /// Proficiency bonus
    pub proficiency_bonus: i64,
    /// Experience value
    pub xp: i64,
    /// Attack actions, in source order
    pub attacks: Vec<Attack>,
    /// Special abilities, in source order
    pub special_abilities: Vec<SpecialAbility>,
    /// Sense name to value, e.g. darkvision → "120 ft."
    pub senses: TextMap,
    /// Languages text
    pub languages: String,
    /// Damage vulnerabilities
    pub damage_vulnerabilities: Vec<String>,
    /// Damage resistances
    pub damage_resistances: Vec<String>,
    /// Damage immunities
    pub damage_immunities: Vec<String>,
    /// Condition immunities
    pub condition_immunities: Vec<String>,
    /// Creature subtype, e.g. "shapechanger"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
    /// Legendary actions; `None` for non-legendary monsters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legendary_actions: Option<Vec<LegendaryAction>>,
}

impl Monster {
    /// True when the monster has at least one legendary action
    pub fn is_legendary(&self) -> bool {
        self.legendary_actions
            .as_ref()
            .is_some_and(|actions| !actions.is_empty())
    }
}

/// The six ability scores
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityScores {
    /// Strength
    pub strength: i64,
    /// Dexterity
    pub dexterity: i64,
    /// Constitution
    pub constitution: i64,
    /// Intelligence
    pub intelligence: i64,
    /// Wisdom
    pub wisdom: i64,
    /// Charisma
    pub charisma: i64,
}

impl Default for AbilityScores {
    fn default() -> Self {
        Self {
            strength: 10,
            dexterity: 10,
            constitution: 10,
            intelligence: 10,
            wisdom: 10,
            charisma: 10,
        }
    }
}

/// An attack action
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attack {
    /// Action name, e.g. "Bite"
    pub name: String,
    /// To-hit bonus
    pub attack_bonus: i64,
    /// Damage dice of the first damage entry, e.g. "2d10+8"
    pub damage: String,
    /// Damage type of the first damage entry, e.g. "Piercing"
    pub damage_type: String,
    /// Rules text
    pub description: String,
}

/// A passive or triggered special ability
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialAbility {
    /// Ability name
    pub name: String,
    /// Rules text
    pub description: String,
}

/// A legendary action
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegendaryAction {
    /// Action name
    pub name: String,
    /// Rules text
    pub description: String,
    /// Number of legendary actions spent
    #[serde(default = "default_cost")]
    pub cost: i64,
}

fn default_cost() -> i64 {
    1
}

// whole ratings are written as integers (11, not 11.0)
fn serialize_rating<S>(rating: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if rating.is_finite() && rating.fract() == 0.0 && rating.abs() < i64::MAX as f64 {
        serializer.serialize_i64(*rating as i64)
    } else {
        serializer.serialize_f64(*rating)
    }
}

/// Insertion-ordered string map
///
/// Speed and sense entries must come back out in the order the API listed
/// them, which rules out `HashMap`/`BTreeMap`. Serialized as a plain JSON
/// object.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TextMap(Vec<(String, String)>);

impl TextMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, replacing an existing key in place
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key, value)),
        }
    }

    /// Look up a value
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when the map has no entries
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TextMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = TextMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl Serialize for TextMap {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for TextMap {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct TextMapVisitor;

        impl<'de> Visitor<'de> for TextMapVisitor {
            type Value = TextMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of strings")
            }

            fn visit_map<A>(self, mut access: A) -> Result<TextMap, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut map = TextMap::new();
                while let Some((k, v)) = access.next_entry::<String, String>()? {
                    map.insert(k, v);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(TextMapVisitor)
    }
}
