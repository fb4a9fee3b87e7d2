use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A single value inside a `{key=value}` block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    /// Raw token texts of a bracketed value such as `conditions=[ ... ]`.
    List(Vec<String>),
}

impl ParamValue {
    /// Numeric view of the value; quoted numbers count, percentages do not.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Int(i) => Some(*i as f64),
            ParamValue::Float(f) => Some(*f),
            ParamValue::Text(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
            ParamValue::Bool(_) | ParamValue::List(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(b) => Some(*b),
            ParamValue::Text(s) if s.eq_ignore_ascii_case("true") => Some(true),
            ParamValue::Text(s) if s.eq_ignore_ascii_case("false") => Some(false),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ParamValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// True for empty or whitespace-only text, which counts as "not provided".
    pub fn is_blank(&self) -> bool {
        matches!(self, ParamValue::Text(s) if s.trim().is_empty())
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(b) => write!(f, "{b}"),
            ParamValue::Int(i) => write!(f, "{i}"),
            ParamValue::Float(x) => write!(f, "{x}"),
            ParamValue::Text(s) => f.write_str(s),
            ParamValue::List(items) => write!(f, "[{}]", items.join(" ")),
        }
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

/// Insertion-ordered parameter map.
///
/// Skill lines are order sensitive when regenerated, so this keeps keys in
/// the order they were authored. Re-inserting an existing key replaces the
/// value in place.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Params(Vec<(String, ParamValue)>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace `key`, returning the previous value if any.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Option<ParamValue> {
        let key = key.into();
        let value = value.into();
        if let Some(slot) = self.0.iter_mut().find(|(k, _)| *k == key) {
            return Some(std::mem::replace(&mut slot.1, value));
        }
        self.0.push((key, value));
        None
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Case-insensitive lookup, returning the key as authored.
    pub fn get_ignore_case(&self, key: &str) -> Option<(&str, &ParamValue)> {
        self.0
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(k, v)| (k.as_str(), v))
    }

    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        let idx = self.0.iter().position(|(k, _)| k == key)?;
        Some(self.0.remove(idx).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}

impl Serialize for Params {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Params {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ParamsVisitor;

        impl<'de> Visitor<'de> for ParamsVisitor {
            type Value = Params;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of parameter names to values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Params, A::Error> {
                let mut params = Params::new();
                while let Some((k, v)) = access.next_entry::<String, ParamValue>()? {
                    params.insert(k, v);
                }
                Ok(params)
            }
        }

        deserializer.deserialize_map(ParamsVisitor)
    }
}

/// `@type{options}` portion of a skill line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Targeter {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Params>,
}

impl Targeter {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            options: None,
        }
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.options.get_or_insert_with(Params::new).insert(key, value);
        self
    }
}

/// `~name` or `~name:value` portion of a skill line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trigger {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl Trigger {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }

    pub fn with_value(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
        }
    }

    /// Split a fused `name:value` identifier on its first colon.
    ///
    /// ```
    /// use skilline_data::Trigger;
    ///
    /// let t = Trigger::from_fused("onTimer:100");
    /// assert_eq!(t.name, "onTimer");
    /// assert_eq!(t.value.as_deref(), Some("100"));
    /// assert_eq!(Trigger::from_fused("onAttack").value, None);
    /// ```
    pub fn from_fused(text: &str) -> Self {
        match text.split_once(':') {
            Some((name, value)) if !value.is_empty() => Self::with_value(name, value),
            Some((name, _)) => Self::new(name),
            None => Self::new(text),
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}:{value}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// One `?cond` gate. `params` holds the raw `{...}` text verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineCondition {
    #[serde(default)]
    pub negated: bool,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<String>,
}

impl InlineCondition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            negated: false,
            name: name.into(),
            params: None,
        }
    }

    pub fn negated(name: impl Into<String>) -> Self {
        Self {
            negated: true,
            ..Self::new(name)
        }
    }
}

/// Renders the annotated form, e.g. `!raining` or `inblock{t=STONE}`.
impl fmt::Display for InlineCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            f.write_str("!")?;
        }
        f.write_str(&self.name)?;
        if let Some(params) = &self.params {
            f.write_str(params)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthOp {
    #[serde(rename = "<")]
    Below,
    #[serde(rename = "=")]
    Equal,
    #[serde(rename = ">")]
    Above,
}

impl HealthOp {
    pub fn symbol(self) -> char {
        match self {
            HealthOp::Below => '<',
            HealthOp::Equal => '=',
            HealthOp::Above => '>',
        }
    }

    pub fn from_symbol(c: char) -> Option<Self> {
        match c {
            '<' => Some(HealthOp::Below),
            '=' => Some(HealthOp::Equal),
            '>' => Some(HealthOp::Above),
            _ => None,
        }
    }
}

/// Health gate such as `<50%`, `>100`, or `=30%-50%`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthModifier {
    #[serde(rename = "operator")]
    pub op: HealthOp,
    pub value: String,
}

impl HealthModifier {
    pub fn new(op: HealthOp, value: impl Into<String>) -> Self {
        Self { op, value: value.into() }
    }
}

/// Structured form of one skill line.
///
/// Only `mechanic` is required; every other field is independent of the
/// rest. Text order is fixed: mechanic, parameters, targeter, trigger,
/// inline conditions, health modifier, chance.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SkillLineAst {
    pub mechanic: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Params>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub targeter: Option<Targeter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger: Option<Trigger>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inline_conditions: Vec<InlineCondition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_modifier: Option<HealthModifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chance: Option<f64>,
}

impl SkillLineAst {
    pub fn new(mechanic: impl Into<String>) -> Self {
        Self {
            mechanic: mechanic.into(),
            ..Self::default()
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.parameters.get_or_insert_with(Params::new).insert(key, value);
        self
    }

    pub fn with_targeter(mut self, targeter: Targeter) -> Self {
        self.targeter = Some(targeter);
        self
    }

    pub fn with_trigger(mut self, trigger: Trigger) -> Self {
        self.trigger = Some(trigger);
        self
    }

    pub fn with_condition(mut self, condition: InlineCondition) -> Self {
        self.inline_conditions.push(condition);
        self
    }

    pub fn with_health(mut self, modifier: HealthModifier) -> Self {
        self.health_modifier = Some(modifier);
        self
    }

    pub fn with_chance(mut self, chance: f64) -> Self {
        self.chance = Some(chance);
        self
    }

    /// Look up a parameter by any of the given names (case-insensitive).
    pub fn param_any(&self, names: &[&str]) -> Option<(&str, &ParamValue)> {
        let params = self.parameters.as_ref()?;
        names.iter().find_map(|n| params.get_ignore_case(n))
    }
}

/// Boss bar settings for a mob.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BossBarDef {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub style: Option<String>,
}

/// A mob definition as far as skill validation is concerned.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MobDef {
    pub internal_name: String,
    #[serde(rename = "type", default)]
    pub entity_type: String,
    #[serde(default)]
    pub display: Option<String>,
    #[serde(default)]
    pub health: Option<f64>,
    #[serde(default)]
    pub damage: Option<f64>,
    #[serde(default)]
    pub armor: Option<f64>,
    #[serde(default)]
    pub faction: Option<String>,
    #[serde(default)]
    pub mount: Option<String>,
    #[serde(default)]
    pub boss_bar: Option<BossBarDef>,
    #[serde(default)]
    pub equipment: Vec<String>,
    #[serde(default)]
    pub skills: Vec<SkillLineAst>,
}

/// A reusable, named collection of skill lines invoked through `skill{s=...}`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MetaskillDef {
    pub internal_name: String,
    #[serde(default)]
    pub cooldown: Option<f64>,
    #[serde(default)]
    pub conditions: Vec<String>,
    #[serde(default)]
    pub target_conditions: Vec<String>,
    #[serde(default)]
    pub trigger_conditions: Vec<String>,
    #[serde(default)]
    pub skills: Vec<SkillLineAst>,
}

/// Everything validated together before export.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProjectDef {
    #[serde(default)]
    pub mobs: Vec<MobDef>,
    #[serde(default)]
    pub metaskills: Vec<MetaskillDef>,
}

impl ProjectDef {
    pub fn metaskill_names(&self) -> std::collections::HashSet<String> {
        self.metaskills.iter().map(|m| m.internal_name.clone()).collect()
    }

    pub fn mob_names(&self) -> std::collections::HashSet<String> {
        self.mobs.iter().map(|m| m.internal_name.clone()).collect()
    }
}
