//! Cursor-aware completion for skill lines being typed.
//!
//! [`detect_context`] looks at the text before the cursor and works out which
//! slot of the grammar is being filled; [`suggestions`] asks the registry for
//! candidates and [`apply_suggestion`] splices a chosen one into the text.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use skilline_data::{HasParameters, MetaskillDef, ParamType, SKILL_NAME_KEYS, Schema, SchemaRegistry};

static MECHANIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:-\s*)?([A-Za-z0-9_:]*)$").expect("mechanic pattern"));
static MECHANIC_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:-\s*)?([A-Za-z][A-Za-z0-9_:\-]*)\{([^}]*)$").expect("parameter pattern"));
static TARGETER_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@([A-Za-z][A-Za-z0-9_:\-]*)\{([^}]*)$").expect("targeter option pattern"));
static TARGETER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"@([A-Za-z0-9_]*)$").expect("targeter pattern"));
static TRIGGER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"~([A-Za-z0-9_:]*)$").expect("trigger pattern"));
static CONDITION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\?!?([A-Za-z0-9_]*)$").expect("condition pattern"));

/// Grammar slot under the cursor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "slot", rename_all = "snake_case")]
pub enum Slot {
    None,
    Mechanic,
    Parameter { mechanic: String },
    ParameterValue { mechanic: String, parameter: String },
    Metaskill,
    Targeter,
    TargeterOption { targeter: String },
    Trigger,
    Condition,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionContext {
    pub slot: Slot,
    /// Partial word typed so far.
    pub query: String,
    /// Byte offset where the partial word starts.
    pub start: usize,
    /// Byte offset of the cursor.
    pub cursor: usize,
}

impl CompletionContext {
    fn none(cursor: usize) -> Self {
        Self {
            slot: Slot::None,
            query: String::new(),
            start: cursor,
            cursor,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Suggestion {
    fn plain(text: impl Into<String>, category: &str) -> Self {
        Self {
            text: text.into(),
            description: None,
            category: Some(category.to_string()),
        }
    }

    fn from_schema(schema: &dyn Schema) -> Self {
        Self {
            text: schema.name().to_string(),
            description: (!schema.description().is_empty()).then(|| schema.description().to_string()),
            category: (!schema.category().is_empty()).then(|| schema.category().to_string()),
        }
    }
}

fn clamp_cursor(text: &str, cursor: usize) -> usize {
    let mut cursor = cursor.min(text.len());
    while !text.is_char_boundary(cursor) {
        cursor -= 1;
    }
    cursor
}

/// Work out which slot the cursor sits in. `cursor` is a byte offset and is
/// clamped to the text.
///
/// ```
/// use skilline_script::complete::{Slot, detect_context};
///
/// let ctx = detect_context("- damage{amount=5} @PI", 22);
/// assert_eq!(ctx.slot, Slot::Targeter);
/// assert_eq!(ctx.query, "PI");
/// ```
pub fn detect_context(text: &str, cursor: usize) -> CompletionContext {
    let cursor = clamp_cursor(text, cursor);
    let before = &text[..cursor];
    let line = before.rsplit('\n').next().unwrap_or(before);

    let at = |query: &str, slot: Slot| CompletionContext {
        slot,
        query: query.to_string(),
        start: cursor - query.len(),
        cursor,
    };

    if let Some(caps) = MECHANIC.captures(line) {
        let query = caps.get(1).map_or("", |m| m.as_str());
        return at(query, Slot::Mechanic);
    }

    if let Some(caps) = MECHANIC_BLOCK.captures(line) {
        let mechanic = caps.get(1).map_or("", |m| m.as_str()).to_string();
        let block = caps.get(2).map_or("", |m| m.as_str());
        let last = block.rsplit(';').next().unwrap_or(block).trim_start();
        return match last.split_once('=') {
            Some((key, value))
                if mechanic.eq_ignore_ascii_case("skill")
                    && SKILL_NAME_KEYS.iter().any(|k| k.eq_ignore_ascii_case(key.trim())) =>
            {
                at(value, Slot::Metaskill)
            },
            Some((key, value)) => at(
                value,
                Slot::ParameterValue {
                    mechanic,
                    parameter: key.trim().to_string(),
                },
            ),
            None => at(last, Slot::Parameter { mechanic }),
        };
    }

    if let Some(caps) = TARGETER_BLOCK.captures(line) {
        let targeter = caps.get(1).map_or("", |m| m.as_str()).to_string();
        let block = caps.get(2).map_or("", |m| m.as_str());
        let last = block.rsplit(';').next().unwrap_or(block).trim_start();
        if !last.contains('=') {
            return at(last, Slot::TargeterOption { targeter });
        }
        return CompletionContext::none(cursor);
    }

    for (pattern, slot) in [(&TARGETER, Slot::Targeter), (&TRIGGER, Slot::Trigger), (&CONDITION, Slot::Condition)] {
        if let Some(caps) = pattern.captures(line) {
            return at(caps.get(1).map_or("", |m| m.as_str()), slot);
        }
    }

    CompletionContext::none(cursor)
}

fn matches(name: &str, query: &str) -> bool {
    name.to_ascii_lowercase().contains(query)
}

fn schema_hits<'a, T: Schema + 'a>(items: impl IntoIterator<Item = &'a T>, query: &str, limit: usize) -> Vec<Suggestion> {
    items
        .into_iter()
        .filter(|s| matches(s.name(), query) || s.aliases().iter().any(|a| matches(a, query)))
        .take(limit)
        .map(|s| Suggestion::from_schema(s))
        .collect()
}

fn metaskill_hits(metaskills: &[MetaskillDef], query: &str, limit: usize) -> Vec<Suggestion> {
    metaskills
        .iter()
        .filter(|m| matches(&m.internal_name, query))
        .take(limit)
        .map(|m| Suggestion {
            text: m.internal_name.clone(),
            description: Some(format!("Metaskill with {} skill(s)", m.skills.len())),
            category: Some("metaskill".to_string()),
        })
        .collect()
}

/// Candidates for `ctx`, at most `limit` of them, in catalog order.
pub fn suggestions(
    registry: &SchemaRegistry,
    ctx: &CompletionContext,
    metaskills: &[MetaskillDef],
    limit: usize,
) -> Vec<Suggestion> {
    let query = ctx.query.to_ascii_lowercase();
    match &ctx.slot {
        Slot::None => Vec::new(),
        Slot::Mechanic => schema_hits(registry.mechanics(), &query, limit),
        Slot::Targeter => schema_hits(registry.targeters(), &query, limit),
        Slot::Trigger => schema_hits(registry.triggers(), &query, limit),
        Slot::Condition => schema_hits(registry.conditions(), &query, limit),
        Slot::Metaskill => metaskill_hits(metaskills, &query, limit),
        Slot::Parameter { mechanic } => registry
            .mechanic(mechanic)
            .map(|m| parameter_hits(m, &query, limit))
            .unwrap_or_default(),
        Slot::TargeterOption { targeter } => registry
            .targeter(targeter)
            .map(|t| parameter_hits(t, &query, limit))
            .unwrap_or_default(),
        Slot::ParameterValue { mechanic, parameter } => {
            let Some(schema) = registry.mechanic(mechanic) else {
                return Vec::new();
            };
            if schema.name.eq_ignore_ascii_case("skill") && SKILL_NAME_KEYS.iter().any(|k| k.eq_ignore_ascii_case(parameter)) {
                return metaskill_hits(metaskills, &query, limit);
            }
            let Some((_, param)) = schema.parameter(parameter) else {
                return Vec::new();
            };
            let values: Vec<String> = match param.kind {
                ParamType::Enum => param.values.clone(),
                ParamType::Boolean => vec!["true".to_string(), "false".to_string()],
                _ => Vec::new(),
            };
            values
                .into_iter()
                .filter(|v| matches(v, &query))
                .take(limit)
                .map(|v| Suggestion::plain(v, "value"))
                .collect()
        },
    }
}

fn parameter_hits(schema: &impl HasParameters, query: &str, limit: usize) -> Vec<Suggestion> {
    schema
        .parameter_map()
        .iter()
        .filter(|(name, p)| matches(name, query) || p.aliases.iter().any(|a| matches(a, query)))
        .take(limit)
        .map(|(name, p)| {
            let kind = type_label(p.kind);
            Suggestion {
                text: name.clone(),
                description: (!p.description.is_empty()).then(|| p.description.clone()),
                category: Some(if p.required { format!("{kind} (required)") } else { kind.to_string() }),
            }
        })
        .collect()
}

fn type_label(kind: ParamType) -> &'static str {
    match kind {
        ParamType::String => "string",
        ParamType::Number => "number",
        ParamType::Boolean => "boolean",
        ParamType::Enum => "enum",
        ParamType::List => "list",
    }
}

/// Replace the partial word with `choice`, returning the new text and the
/// new cursor offset. Mechanics gain a `{`, parameter and option names a `=`.
///
/// ```
/// use skilline_script::complete::{apply_suggestion, detect_context};
///
/// let ctx = detect_context("- dam", 5);
/// assert_eq!(apply_suggestion("- dam", &ctx, "damage"), ("- damage{".to_string(), 9));
/// ```
pub fn apply_suggestion(text: &str, ctx: &CompletionContext, choice: &str) -> (String, usize) {
    let suffix = match ctx.slot {
        Slot::Mechanic => "{",
        Slot::Parameter { .. } | Slot::TargeterOption { .. } => "=",
        _ => "",
    };
    let start = clamp_cursor(text, ctx.start);
    let end = clamp_cursor(text, ctx.cursor).max(start);
    let mut out = String::with_capacity(text.len() + choice.len() + suffix.len());
    out.push_str(&text[..start]);
    out.push_str(choice);
    out.push_str(suffix);
    let cursor = out.len();
    out.push_str(&text[end..]);
    (out, cursor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use skilline_data::SkillLineAst;

    fn ctx(text: &str) -> CompletionContext {
        detect_context(text, text.len())
    }

    #[test]
    fn mechanic_context_with_or_without_list_marker() {
        assert_eq!(ctx("- eff").slot, Slot::Mechanic);
        assert_eq!(ctx("eff").query, "eff");
        assert_eq!(ctx("").slot, Slot::Mechanic);
    }

    #[test]
    fn parameter_name_and_value_contexts() {
        let c = ctx("- damage{amount=5;ty");
        assert_eq!(
            c.slot,
            Slot::Parameter {
                mechanic: "damage".into()
            }
        );
        assert_eq!(c.query, "ty");
        assert_eq!(c.start, "- damage{amount=5;".len());

        let c = ctx("potion{type=SP");
        assert_eq!(
            c.slot,
            Slot::ParameterValue {
                mechanic: "potion".into(),
                parameter: "type".into()
            }
        );
        assert_eq!(c.query, "SP");
    }

    #[test]
    fn metaskill_context_inside_skill_mechanic() {
        let c = ctx("- skill{s=Fi");
        assert_eq!(c.slot, Slot::Metaskill);
        assert_eq!(c.query, "Fi");
    }

    #[test]
    fn targeter_trigger_and_condition_contexts() {
        assert_eq!(ctx("heal{a=1} @P").slot, Slot::Targeter);
        assert_eq!(
            ctx("heal{a=1} @PIR{ra").slot,
            Slot::TargeterOption {
                targeter: "PIR".into()
            }
        );
        assert_eq!(ctx("heal{a=1} @self ~onT").slot, Slot::Trigger);
        assert_eq!(ctx("heal{a=1} @self ?!rai").query, "rai");
        assert_eq!(ctx("heal{a=1} @self ").slot, Slot::None);
    }

    #[test]
    fn only_the_current_line_counts() {
        let text = "- damage{amount=5}\n- he";
        let c = ctx(text);
        assert_eq!(c.slot, Slot::Mechanic);
        assert_eq!(c.start, text.len() - 2);
    }

    #[test]
    fn cursor_is_clamped() {
        let c = detect_context("@ta", 99);
        assert_eq!(c.cursor, 3);
        assert_eq!(c.slot, Slot::Targeter);
    }

    #[test]
    fn suggestions_come_from_registry() {
        let reg = SchemaRegistry::builtin();
        let names: Vec<String> = suggestions(&reg, &ctx("- hea"), &[], 10).into_iter().map(|s| s.text).collect();
        assert_eq!(names, vec!["heal", "healpercent"]);

        let params = suggestions(&reg, &ctx("damage{am"), &[], 10);
        assert_eq!(params[0].text, "amount");
        assert_eq!(params[0].category.as_deref(), Some("number (required)"));

        let values: Vec<String> = suggestions(&reg, &ctx("damage{ia="), &[], 10).into_iter().map(|s| s.text).collect();
        assert_eq!(values, vec!["true", "false"]);
    }

    #[test]
    fn suggestions_respect_limit() {
        let reg = SchemaRegistry::builtin();
        assert_eq!(suggestions(&reg, &ctx("~on"), &[], 3).len(), 3);
    }

    #[test]
    fn metaskill_suggestions_describe_size() {
        let reg = SchemaRegistry::builtin();
        let metaskills = vec![MetaskillDef {
            internal_name: "FireBurst".into(),
            skills: vec![SkillLineAst::new("ignite")],
            ..MetaskillDef::default()
        }];
        let hits = suggestions(&reg, &ctx("skill{s=fire"), &metaskills, 10);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].description.as_deref(), Some("Metaskill with 1 skill(s)"));
    }

    #[test]
    fn apply_inserts_suffix_and_keeps_tail() {
        let text = "- damage{am} @self";
        let c = detect_context(text, 11);
        let (out, cursor) = apply_suggestion(text, &c, "amount");
        assert_eq!(out, "- damage{amount=} @self");
        assert_eq!(cursor, 16);

        let c = ctx("heal{a=1} @P");
        assert_eq!(apply_suggestion("heal{a=1} @P", &c, "PIR"), ("heal{a=1} @PIR".to_string(), 14));
    }
}
