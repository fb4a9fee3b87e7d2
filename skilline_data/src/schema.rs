//! Schema catalogs for mechanics, targeters, conditions and triggers.
//!
//! A [`SchemaRegistry`] is built once (from the builtin catalog, a TOML
//! schema file, or both) and then only read. Validators and completion
//! helpers borrow it.

use crate::builtin;
use crate::defs::ParamValue;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("failed to read schema file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed schema file: {0}")]
    Toml(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    #[default]
    String,
    Number,
    Boolean,
    Enum,
    #[serde(alias = "array")]
    List,
}

/// Shape of a single parameter or targeter option.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParameterSchema {
    #[serde(rename = "type", default)]
    pub kind: ParamType,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<ParamValue>,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
}

impl ParameterSchema {
    fn of(kind: ParamType) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    pub fn string() -> Self {
        Self::of(ParamType::String)
    }

    pub fn number() -> Self {
        Self::of(ParamType::Number)
    }

    pub fn boolean() -> Self {
        Self::of(ParamType::Boolean)
    }

    pub fn list() -> Self {
        Self::of(ParamType::List)
    }

    pub fn one_of(values: &[&str]) -> Self {
        Self {
            values: values.iter().map(|v| (*v).to_string()).collect(),
            ..Self::of(ParamType::Enum)
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<ParamValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    pub fn alias(mut self, alias: &str) -> Self {
        self.aliases.push(alias.to_string());
        self
    }

    pub fn describe(mut self, text: &str) -> Self {
        self.description = text.to_string();
        self
    }

    /// True when `key` names this parameter either directly or by alias.
    pub fn answers_to(&self, name: &str, key: &str) -> bool {
        name.eq_ignore_ascii_case(key) || self.aliases.iter().any(|a| a.eq_ignore_ascii_case(key))
    }
}

/// Common surface of every catalog entry.
pub trait Schema {
    fn name(&self) -> &str;
    fn aliases(&self) -> &[String];
    fn description(&self) -> &str;
    fn category(&self) -> &str;
}

macro_rules! impl_schema {
    ($($ty:ty),+) => {
        $(impl Schema for $ty {
            fn name(&self) -> &str {
                &self.name
            }
            fn aliases(&self) -> &[String] {
                &self.aliases
            }
            fn description(&self) -> &str {
                &self.description
            }
            fn category(&self) -> &str {
                &self.category
            }
        })+
    };
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MechanicSchema {
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub parameters: BTreeMap<String, ParameterSchema>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TargeterSchema {
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub options: BTreeMap<String, ParameterSchema>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConditionSchema {
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub parameters: BTreeMap<String, ParameterSchema>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TriggerSchema {
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    /// Whether the trigger takes a `:value` suffix, e.g. `~onTimer:100`.
    #[serde(default)]
    pub has_value: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<ParamType>,
}

impl_schema!(MechanicSchema, TargeterSchema, ConditionSchema, TriggerSchema);

/// Parameter-bearing schemas share one lookup helper.
pub trait HasParameters {
    fn parameter_map(&self) -> &BTreeMap<String, ParameterSchema>;

    /// Find the schema entry that `key` refers to, by name or alias.
    fn parameter(&self, key: &str) -> Option<(&str, &ParameterSchema)> {
        self.parameter_map()
            .iter()
            .find(|(name, p)| p.answers_to(name, key))
            .map(|(name, p)| (name.as_str(), p))
    }
}

impl HasParameters for MechanicSchema {
    fn parameter_map(&self) -> &BTreeMap<String, ParameterSchema> {
        &self.parameters
    }
}

impl HasParameters for TargeterSchema {
    fn parameter_map(&self) -> &BTreeMap<String, ParameterSchema> {
        &self.options
    }
}

impl HasParameters for ConditionSchema {
    fn parameter_map(&self) -> &BTreeMap<String, ParameterSchema> {
        &self.parameters
    }
}

/// On-disk form of a schema file.
///
/// ```toml
/// [[mechanics]]
/// name = "damage"
/// category = "Damage"
/// [mechanics.parameters.amount]
/// type = "number"
/// required = true
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SchemaSet {
    #[serde(default)]
    pub mechanics: Vec<MechanicSchema>,
    #[serde(default)]
    pub targeters: Vec<TargeterSchema>,
    #[serde(default)]
    pub conditions: Vec<ConditionSchema>,
    #[serde(default)]
    pub triggers: Vec<TriggerSchema>,
}

impl SchemaSet {
    /// Parse a schema set from TOML text.
    ///
    /// # Errors
    /// Returns [`SchemaError::Toml`] when the text is not a valid schema file.
    pub fn from_toml_str(text: &str) -> Result<Self, SchemaError> {
        Ok(toml::from_str(text)?)
    }

    pub fn len(&self) -> usize {
        self.mechanics.len() + self.targeters.len() + self.conditions.len() + self.triggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Ordered entries plus a lowercase name/alias index.
#[derive(Debug, Clone)]
struct Catalog<T: Schema> {
    items: Vec<T>,
    index: HashMap<String, usize>,
}

impl<T: Schema> Default for Catalog<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T: Schema> Catalog<T> {
    /// Add or replace an entry. A later entry with the same name wins, and
    /// only its own aliases stay indexed.
    fn upsert(&mut self, item: T) {
        let key = item.name().to_ascii_lowercase();
        let idx = match self.index.get(&key) {
            Some(&idx) if self.items[idx].name().eq_ignore_ascii_case(item.name()) => {
                // The replacement brings its own aliases.
                self.index.retain(|_, v| *v != idx);
                self.items[idx] = item;
                idx
            }
            _ => {
                self.items.push(item);
                self.items.len() - 1
            }
        };
        let entry = &self.items[idx];
        self.index.insert(entry.name().to_ascii_lowercase(), idx);
        for alias in entry.aliases() {
            // Aliases never shadow a canonical name.
            let alias = alias.to_ascii_lowercase();
            let shadows_name = self
                .index
                .get(&alias)
                .is_some_and(|&other| self.items[other].name().eq_ignore_ascii_case(&alias));
            if !shadows_name {
                self.index.insert(alias, idx);
            }
        }
    }

    fn get(&self, name: &str) -> Option<&T> {
        self.index.get(&name.to_ascii_lowercase()).map(|&i| &self.items[i])
    }

    fn names(&self) -> Vec<&str> {
        self.items.iter().map(|s| s.name()).collect()
    }

    fn by_category(&self, category: &str) -> Vec<&T> {
        self.items
            .iter()
            .filter(|s| s.category().eq_ignore_ascii_case(category))
            .collect()
    }

    fn categories(&self) -> Vec<&str> {
        let mut cats: Vec<&str> = Vec::new();
        for item in &self.items {
            if !item.category().is_empty() && !cats.contains(&item.category()) {
                cats.push(item.category());
            }
        }
        cats
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaKind {
    Mechanic,
    Targeter,
    Condition,
    Trigger,
}

impl SchemaKind {
    pub const ALL: [SchemaKind; 4] = [
        SchemaKind::Mechanic,
        SchemaKind::Targeter,
        SchemaKind::Condition,
        SchemaKind::Trigger,
    ];

    /// Sigil written in front of the name in skill-line text.
    pub fn prefix(self) -> &'static str {
        match self {
            SchemaKind::Targeter => "@",
            SchemaKind::Trigger => "~",
            SchemaKind::Condition => "?",
            SchemaKind::Mechanic => "",
        }
    }
}

impl std::fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SchemaKind::Mechanic => "mechanic",
            SchemaKind::Targeter => "targeter",
            SchemaKind::Condition => "condition",
            SchemaKind::Trigger => "trigger",
        };
        f.write_str(s)
    }
}

/// Borrowed view of any catalog entry, used by search results.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SchemaRef<'a> {
    Mechanic(&'a MechanicSchema),
    Targeter(&'a TargeterSchema),
    Condition(&'a ConditionSchema),
    Trigger(&'a TriggerSchema),
}

impl SchemaRef<'_> {
    pub fn kind(&self) -> SchemaKind {
        match self {
            SchemaRef::Mechanic(_) => SchemaKind::Mechanic,
            SchemaRef::Targeter(_) => SchemaKind::Targeter,
            SchemaRef::Condition(_) => SchemaKind::Condition,
            SchemaRef::Trigger(_) => SchemaKind::Trigger,
        }
    }

    fn schema(&self) -> &dyn Schema {
        match self {
            SchemaRef::Mechanic(s) => *s,
            SchemaRef::Targeter(s) => *s,
            SchemaRef::Condition(s) => *s,
            SchemaRef::Trigger(s) => *s,
        }
    }

    pub fn name(&self) -> &str {
        self.schema().name()
    }

    pub fn description(&self) -> &str {
        self.schema().description()
    }

    pub fn category(&self) -> &str {
        self.schema().category()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit<'a> {
    pub item: SchemaRef<'a>,
    pub score: u32,
}

const SCORE_NAME: u32 = 10;
const SCORE_ALIAS: u32 = 8;
const SCORE_DESCRIPTION: u32 = 5;
const SCORE_CATEGORY: u32 = 3;

fn relevance(schema: &dyn Schema, query: &str) -> u32 {
    let mut score = 0;
    if schema.name().to_ascii_lowercase().contains(query) {
        score += SCORE_NAME;
    }
    if schema.aliases().iter().any(|a| a.to_ascii_lowercase().contains(query)) {
        score += SCORE_ALIAS;
    }
    if schema.description().to_ascii_lowercase().contains(query) {
        score += SCORE_DESCRIPTION;
    }
    if schema.category().to_ascii_lowercase().contains(query) {
        score += SCORE_CATEGORY;
    }
    score
}

/// Immutable lookup tables for every known schema entry.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    mechanics: Catalog<MechanicSchema>,
    targeters: Catalog<TargeterSchema>,
    conditions: Catalog<ConditionSchema>,
    triggers: Catalog<TriggerSchema>,
}

impl SchemaRegistry {
    /// A registry with nothing in it.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The curated catalog shipped with the crate.
    pub fn builtin() -> Self {
        Self::from_set(builtin::schema_set())
    }

    pub fn from_set(set: SchemaSet) -> Self {
        Self::empty().with_overlay(set)
    }

    /// Build a registry from a TOML schema file's contents alone.
    ///
    /// # Errors
    /// Returns [`SchemaError::Toml`] if the text does not describe a schema set.
    pub fn from_toml_str(text: &str) -> Result<Self, SchemaError> {
        Ok(Self::from_set(SchemaSet::from_toml_str(text)?))
    }

    /// Read a TOML schema file from disk.
    ///
    /// # Errors
    /// Returns [`SchemaError::Io`] if the file can't be read, or
    /// [`SchemaError::Toml`] if it can't be parsed.
    pub fn load(path: &Path) -> Result<SchemaSet, SchemaError> {
        let text = std::fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let set = SchemaSet::from_toml_str(&text)?;
        info!("loaded {} schema entries from '{}'", set.len(), path.display());
        Ok(set)
    }

    /// Merge `set` over this registry; entries with an existing name replace it.
    pub fn with_overlay(mut self, set: SchemaSet) -> Self {
        debug!(
            "applying schema overlay: {} mechanics, {} targeters, {} conditions, {} triggers",
            set.mechanics.len(),
            set.targeters.len(),
            set.conditions.len(),
            set.triggers.len()
        );
        set.mechanics.into_iter().for_each(|m| self.mechanics.upsert(m));
        set.targeters.into_iter().for_each(|t| self.targeters.upsert(t));
        set.conditions.into_iter().for_each(|c| self.conditions.upsert(c));
        set.triggers.into_iter().for_each(|t| self.triggers.upsert(t));
        self
    }

    pub fn mechanic(&self, name: &str) -> Option<&MechanicSchema> {
        self.mechanics.get(name)
    }

    /// Look up a targeter; a leading `@` is ignored.
    pub fn targeter(&self, name: &str) -> Option<&TargeterSchema> {
        self.targeters.get(name.strip_prefix('@').unwrap_or(name))
    }

    pub fn condition(&self, name: &str) -> Option<&ConditionSchema> {
        let name = name.strip_prefix('?').unwrap_or(name);
        self.conditions.get(name.strip_prefix('!').unwrap_or(name))
    }

    /// Look up a trigger; a leading `~` and a `:value` suffix are ignored.
    pub fn trigger(&self, name: &str) -> Option<&TriggerSchema> {
        let name = name.strip_prefix('~').unwrap_or(name);
        let name = name.split_once(':').map_or(name, |(n, _)| n);
        self.triggers.get(name)
    }

    pub fn mechanic_names(&self) -> Vec<&str> {
        self.mechanics.names()
    }

    pub fn targeter_names(&self) -> Vec<&str> {
        self.targeters.names()
    }

    pub fn condition_names(&self) -> Vec<&str> {
        self.conditions.names()
    }

    pub fn trigger_names(&self) -> Vec<&str> {
        self.triggers.names()
    }

    pub fn mechanics(&self) -> &[MechanicSchema] {
        &self.mechanics.items
    }

    pub fn targeters(&self) -> &[TargeterSchema] {
        &self.targeters.items
    }

    pub fn conditions(&self) -> &[ConditionSchema] {
        &self.conditions.items
    }

    pub fn triggers(&self) -> &[TriggerSchema] {
        &self.triggers.items
    }

    pub fn mechanics_by_category(&self, category: &str) -> Vec<&MechanicSchema> {
        self.mechanics.by_category(category)
    }

    pub fn targeters_by_category(&self, category: &str) -> Vec<&TargeterSchema> {
        self.targeters.by_category(category)
    }

    pub fn conditions_by_category(&self, category: &str) -> Vec<&ConditionSchema> {
        self.conditions.by_category(category)
    }

    pub fn triggers_by_category(&self, category: &str) -> Vec<&TriggerSchema> {
        self.triggers.by_category(category)
    }

    /// Distinct categories of one kind, in first-seen order.
    pub fn categories(&self, kind: SchemaKind) -> Vec<&str> {
        match kind {
            SchemaKind::Mechanic => self.mechanics.categories(),
            SchemaKind::Targeter => self.targeters.categories(),
            SchemaKind::Condition => self.conditions.categories(),
            SchemaKind::Trigger => self.triggers.categories(),
        }
    }

    /// Case-insensitive search over every catalog.
    ///
    /// Hits are ordered by relevance; ties keep catalog order (mechanics,
    /// targeters, conditions, triggers). A blank query finds nothing.
    ///
    /// ```
    /// use skilline_data::SchemaRegistry;
    ///
    /// let reg = SchemaRegistry::builtin();
    /// let hits = reg.search("ignite");
    /// assert_eq!(hits[0].item.name(), "ignite");
    /// assert!(reg.search("   ").is_empty());
    /// ```
    pub fn search(&self, query: &str) -> Vec<SearchHit<'_>> {
        let query = query.trim().to_ascii_lowercase();
        if query.is_empty() {
            return Vec::new();
        }
        let all = self
            .mechanics
            .items
            .iter()
            .map(SchemaRef::Mechanic)
            .chain(self.targeters.items.iter().map(SchemaRef::Targeter))
            .chain(self.conditions.items.iter().map(SchemaRef::Condition))
            .chain(self.triggers.items.iter().map(SchemaRef::Trigger));
        let mut hits: Vec<SearchHit<'_>> = all
            .filter_map(|item| {
                let score = relevance(item.schema(), &query);
                (score > 0).then_some(SearchHit { item, score })
            })
            .collect();
        hits.sort_by(|a, b| b.score.cmp(&a.score));
        hits
    }

    /// Every name and alias of one kind, with the kind's sigil in front.
    pub fn autocomplete(&self, kind: SchemaKind) -> Vec<String> {
        fn collect<T: Schema>(items: &[T], prefix: &str) -> Vec<String> {
            let mut out = Vec::new();
            for item in items {
                out.push(format!("{prefix}{}", item.name()));
                out.extend(item.aliases().iter().map(|a| format!("{prefix}{a}")));
            }
            out
        }
        // Conditions are listed bare; the `?` is typed separately.
        match kind {
            SchemaKind::Mechanic => collect(&self.mechanics.items, ""),
            SchemaKind::Targeter => collect(&self.targeters.items, "@"),
            SchemaKind::Condition => collect(&self.conditions.items, ""),
            SchemaKind::Trigger => collect(&self.triggers.items, "~"),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.mechanics.items.is_empty()
            && self.targeters.items.is_empty()
            && self.conditions.items.is_empty()
            && self.triggers.items.is_empty()
    }
}
