//! TypeScript object-literal rendering of monster records
//!
//! Output is byte-for-byte deterministic: field order is fixed, maps keep
//! their insertion order, and nothing depends on hashing or the clock.
//! Rendering the same [`Monster`] twice always yields the same string.
//!
//! Rule text (attack, special ability and legendary action descriptions) is
//! escaped so it stays a valid single-line string literal.

use crate::types::{AbilityScores, Attack, LegendaryAction, Monster, SpecialAbility, TextMap};
use std::fmt::Write;

/// Render one monster as a `"<index>": { ... }` entry of an object literal.
///
/// The entry is indented by two spaces and carries no trailing comma or
/// newline; callers join entries themselves.
pub fn render_monster(monster: &Monster) -> String {
    let mut out = String::with_capacity(1024);

    // Writing into a String cannot fail
    let _ = write!(
        out,
        "  \"{index}\": {{\n    index: \"{index}\",\n    name: \"{name}\",\n    size: \"{size}\",\n    type: \"{kind}\"",
        index = monster.index,
        name = monster.name,
        size = monster.size,
        kind = monster.kind,
    );
    if let Some(subtype) = monster.subtype.as_deref().filter(|s| !s.is_empty()) {
        let _ = write!(out, ",\n    subtype: \"{subtype}\"");
    }
    out.push_str(",\n");

    let _ = writeln!(out, "    alignment: \"{}\",", monster.alignment);
    let _ = writeln!(out, "    armorClass: {},", monster.armor_class);
    let _ = writeln!(out, "    hitPoints: {},", monster.hit_points);
    let _ = writeln!(out, "    hitDice: \"{}\",", monster.hit_dice);
    let _ = writeln!(out, "    speed: {},", render_text_map(&monster.speed));
    let _ = writeln!(
        out,
        "    abilityScores: {},",
        render_ability_scores(&monster.ability_scores)
    );
    let _ = writeln!(
        out,
        "    challengeRating: {},",
        format_rating(monster.challenge_rating)
    );
    let _ = writeln!(out, "    proficiencyBonus: {},", monster.proficiency_bonus);
    let _ = writeln!(out, "    xp: {},", monster.xp);
    let _ = writeln!(
        out,
        "    attacks: {},",
        render_block(monster.attacks.iter().map(render_attack))
    );
    let _ = writeln!(
        out,
        "    specialAbilities: {},",
        render_block(monster.special_abilities.iter().map(render_special_ability))
    );
    let _ = writeln!(out, "    senses: {},", render_text_map(&monster.senses));
    let _ = writeln!(out, "    languages: \"{}\",", monster.languages);
    let _ = writeln!(
        out,
        "    damageVulnerabilities: {},",
        render_string_list(&monster.damage_vulnerabilities)
    );
    let _ = writeln!(
        out,
        "    damageResistances: {},",
        render_string_list(&monster.damage_resistances)
    );
    let _ = writeln!(
        out,
        "    damageImmunities: {},",
        render_string_list(&monster.damage_immunities)
    );
    let _ = write!(
        out,
        "    conditionImmunities: {}",
        render_string_list(&monster.condition_immunities)
    );

    if let Some(actions) = monster.legendary_actions.as_ref().filter(|a| !a.is_empty()) {
        let _ = write!(
            out,
            ",\n    legendaryActions: {}",
            render_block(actions.iter().map(render_legendary_action))
        );
    }

    out.push_str("\n  }");
    out
}

/// Number of lines [`render_monster`] produces for this monster
pub fn line_count(monster: &Monster) -> usize {
    render_monster(monster).split('\n').count()
}

/// Escape rule text for a double-quoted single-line literal.
///
/// Backslashes are doubled and quotes become `\"`; every line break (`\n`,
/// `\r\n`, `\r`) becomes one space.
pub fn escape_description(text: &str) -> String {
    // backslashes first, so the ones added for quotes are not doubled
    text.replace('\\', "\\\\")
        .replace("\r\n", " ")
        .replace(['\r', '\n'], " ")
        .replace('"', "\\\"")
}

/// Format a challenge rating: whole numbers without a fraction, others in
/// shortest decimal form (`0.125`).
pub fn format_rating(rating: f64) -> String {
    if rating.is_finite() && rating.fract() == 0.0 {
        format!("{}", rating as i64)
    } else {
        format!("{rating}")
    }
}

fn render_text_map(map: &TextMap) -> String {
    if map.is_empty() {
        return "{}".to_string();
    }
    let entries: Vec<String> = map.iter().map(|(k, v)| format!("{k}: \"{v}\"")).collect();
    format!("{{ {} }}", entries.join(", "))
}

fn render_string_list(items: &[String]) -> String {
    if items.is_empty() {
        return "[]".to_string();
    }
    let quoted: Vec<String> = items.iter().map(|item| format!("\"{item}\"")).collect();
    format!("[{}]", quoted.join(", "))
}

fn render_ability_scores(scores: &AbilityScores) -> String {
    format!(
        "{{\n      strength: {},\n      dexterity: {},\n      constitution: {},\n      intelligence: {},\n      wisdom: {},\n      charisma: {}\n    }}",
        scores.strength,
        scores.dexterity,
        scores.constitution,
        scores.intelligence,
        scores.wisdom,
        scores.charisma,
    )
}

// `[]` when empty, otherwise one sub-object per entry on its own lines
fn render_block(entries: impl Iterator<Item = String>) -> String {
    let entries: Vec<String> = entries.collect();
    if entries.is_empty() {
        return "[]".to_string();
    }
    format!("[\n{}\n    ]", entries.join(",\n"))
}

fn render_attack(attack: &Attack) -> String {
    format!(
        "      {{\n        name: \"{}\",\n        attackBonus: {},\n        damage: \"{}\",\n        damageType: \"{}\",\n        description: \"{}\"\n      }}",
        attack.name,
        attack.attack_bonus,
        attack.damage,
        attack.damage_type,
        escape_description(&attack.description),
    )
}

fn render_special_ability(ability: &SpecialAbility) -> String {
    format!(
        "      {{\n        name: \"{}\",\n        description: \"{}\"\n      }}",
        ability.name,
        escape_description(&ability.description),
    )
}

fn render_legendary_action(action: &LegendaryAction) -> String {
    format!(
        "      {{\n        name: \"{}\",\n        description: \"{}\",\n        cost: {}\n      }}",
        action.name,
        escape_description(&action.description),
        action.cost,
    )
}
