use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use serde::Serialize;

use crate::defs::{MetaskillDef, MobDef, ParamValue, Params, ProjectDef, SkillLineAst};
use crate::schema::{HasParameters, ParamType, ParameterSchema, SchemaRegistry};

/// Parameter keys that name the metaskill a `skill` mechanic runs.
pub const SKILL_NAME_KEYS: [&str; 4] = ["s", "skill", "spell", "metaskill"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("error"),
            Severity::Warning => f.write_str("warning"),
            Severity::Info => f.write_str("info"),
        }
    }
}

/// One finding, addressed by a dotted field path such as `parameters.amount`
/// or `skills[2].targeter`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl ValidationIssue {
    fn new(severity: Severity, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            severity,
            suggestion: None,
            path: None,
        }
    }

    pub fn error(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, field, message)
    }

    pub fn warning(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, field, message)
    }

    pub fn info(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Info, field, message)
    }

    pub fn suggest(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Re-root an issue found on a single skill line under `skills[index]`.
    pub fn under_skill(mut self, index: usize) -> Self {
        let root = format!("skills[{index}]");
        self.field = format!("{root}.{}", self.field);
        self.path = Some(root);
        self
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.severity, self.field, self.message)?;
        if let Some(suggestion) = &self.suggestion {
            write!(f, " ({suggestion})")?;
        }
        Ok(())
    }
}

/// Issues of one definition, with severity views.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ValidationResult {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationResult {
    pub fn new(issues: Vec<ValidationIssue>) -> Self {
        Self { issues }
    }

    /// True when there are no errors; warnings and info don't count.
    pub fn valid(&self) -> bool {
        !self.issues.iter().any(|i| i.severity == Severity::Error)
    }

    fn of(&self, severity: Severity) -> Vec<&ValidationIssue> {
        self.issues.iter().filter(|i| i.severity == severity).collect()
    }

    pub fn errors(&self) -> Vec<&ValidationIssue> {
        self.of(Severity::Error)
    }

    pub fn warnings(&self) -> Vec<&ValidationIssue> {
        self.of(Severity::Warning)
    }

    pub fn info(&self) -> Vec<&ValidationIssue> {
        self.of(Severity::Info)
    }

    pub fn push(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }
}

impl From<Vec<ValidationIssue>> for ValidationResult {
    fn from(issues: Vec<ValidationIssue>) -> Self {
        Self::new(issues)
    }
}

/// Results for a whole project, keyed by internal name in project order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ProjectReport {
    pub mobs: Vec<(String, ValidationResult)>,
    pub metaskills: Vec<(String, ValidationResult)>,
    /// Cross-definition findings such as duplicate names.
    pub project: ValidationResult,
}

impl ProjectReport {
    pub fn can_export(&self) -> bool {
        self.project.valid()
            && self.mobs.iter().all(|(_, r)| r.valid())
            && self.metaskills.iter().all(|(_, r)| r.valid())
    }

    /// Every result with its owner label, e.g. `mob FireBoss`.
    pub fn all(&self) -> impl Iterator<Item = (String, &ValidationResult)> {
        std::iter::once(("project".to_string(), &self.project))
            .chain(self.mobs.iter().map(|(n, r)| (format!("mob {n}"), r)))
            .chain(self.metaskills.iter().map(|(n, r)| (format!("metaskill {n}"), r)))
    }

    pub fn error_count(&self) -> usize {
        self.all().map(|(_, r)| r.errors().len()).sum()
    }

    pub fn warning_count(&self) -> usize {
        self.all().map(|(_, r)| r.warnings().len()).sum()
    }
}

/// Schema-driven checks over skill lines and the definitions holding them.
#[derive(Debug, Clone, Copy)]
pub struct Validator<'r> {
    registry: &'r SchemaRegistry,
}

impl<'r> Validator<'r> {
    pub fn new(registry: &'r SchemaRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &'r SchemaRegistry {
        self.registry
    }

    /// Check one skill line. `known_skills` holds the metaskill names that
    /// `skill{s=...}` may refer to.
    ///
    /// ```
    /// use std::collections::HashSet;
    /// use skilline_data::{SchemaRegistry, Severity, SkillLineAst, Validator};
    ///
    /// let registry = SchemaRegistry::builtin();
    /// let skill = SkillLineAst::new("damage").with_param("type", "magic");
    /// let issues = Validator::new(&registry).validate_skill(&skill, &HashSet::new());
    /// assert!(issues.iter().any(|i| i.field == "parameters.amount" && i.severity == Severity::Error));
    /// ```
    pub fn validate_skill(&self, skill: &SkillLineAst, known_skills: &HashSet<String>) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        if skill.mechanic.trim().is_empty() {
            issues.push(
                ValidationIssue::error("mechanic", "Skill has no mechanic")
                    .suggest("Specify what action this skill performs"),
            );
            return issues;
        }

        let schema = self.registry.mechanic(&skill.mechanic);
        match schema {
            None => issues.push(
                ValidationIssue::warning("mechanic", format!("Unknown mechanic: {}", skill.mechanic))
                    .suggest("Check the mechanic name or add it to a schema file"),
            ),
            Some(schema) => check_params(
                "parameters",
                &skill.mechanic,
                schema.parameter_map(),
                skill.parameters.as_ref(),
                &mut issues,
            ),
        }

        if self.is_skill_invocation(&skill.mechanic) {
            if let Some((key, value)) = skill.param_any(&SKILL_NAME_KEYS).filter(|(_, v)| !v.is_blank()) {
                let name = value.to_string();
                if !known_skills.contains(&name) {
                    issues.push(
                        ValidationIssue::error(
                            format!("parameters.{key}"),
                            format!("Referenced metaskill \"{name}\" does not exist"),
                        )
                        .suggest("Create the metaskill or fix the reference"),
                    );
                }
            }
        }

        if let Some(targeter) = &skill.targeter {
            match self.registry.targeter(&targeter.kind) {
                None => issues.push(
                    ValidationIssue::warning("targeter", format!("Unknown targeter: @{}", targeter.kind))
                        .suggest("Check the targeter name or add it to a schema file"),
                ),
                Some(schema) => check_params(
                    "targeter.options",
                    &format!("@{}", schema.name),
                    schema.parameter_map(),
                    targeter.options.as_ref(),
                    &mut issues,
                ),
            }
        }

        if let Some(trigger) = &skill.trigger {
            match self.registry.trigger(&trigger.name) {
                None => issues.push(
                    ValidationIssue::warning("trigger", format!("Unknown trigger: ~{}", trigger.name))
                        .suggest("Check the trigger name or add it to a schema file"),
                ),
                Some(schema) if schema.has_value && trigger.value.is_none() => issues.push(
                    ValidationIssue::warning("trigger", format!("Trigger ~{} expects a value", schema.name))
                        .suggest(format!("Write it as ~{}:<value>", schema.name)),
                ),
                Some(_) => {},
            }
        }

        for (idx, condition) in skill.inline_conditions.iter().enumerate() {
            if self.registry.condition(&condition.name).is_none() {
                issues.push(
                    ValidationIssue::warning(
                        format!("inline_conditions[{idx}]"),
                        format!("Unknown condition: {}", condition.name),
                    )
                    .suggest("Check the condition name or add it to a schema file"),
                );
            }
        }

        if let Some(health) = &skill.health_modifier {
            if health.value.trim().is_empty() {
                issues.push(
                    ValidationIssue::warning("health_modifier", "Health modifier has no value")
                        .suggest("Use a number, a percentage, or a range such as 30%-50%"),
                );
            }
        }

        if let Some(chance) = skill.chance {
            if !(0.0..=1.0).contains(&chance) {
                issues.push(
                    ValidationIssue::error("chance", "Chance should be between 0.0 and 1.0")
                        .suggest("Use 0.5 for 50% chance, 1.0 for 100% chance"),
                );
            }
        }

        issues
    }

    /// Check a mob and every skill line it carries.
    pub fn validate_mob(&self, mob: &MobDef, known_mobs: &HashSet<String>, known_skills: &HashSet<String>) -> ValidationResult {
        let mut result = ValidationResult::default();
        check_internal_name(&mob.internal_name, "mob", &mut result);

        if mob.entity_type.trim().is_empty() {
            result.push(
                ValidationIssue::error("type", "Entity type is required")
                    .suggest("Select an entity type (e.g., ZOMBIE, SKELETON)"),
            );
        }

        if let Some(health) = mob.health {
            if health <= 0.0 {
                result.push(
                    ValidationIssue::error("health", "Health must be greater than 0").suggest("Set health to at least 1"),
                );
            } else if health > 10_000.0 {
                result.push(
                    ValidationIssue::info("health", "Health value is extremely high")
                        .suggest("Consider if this mob really needs more than 10,000 HP"),
                );
            }
        }

        if mob.damage.is_some_and(|d| d < 0.0) {
            result.push(ValidationIssue::error("damage", "Damage cannot be negative").suggest("Set damage to 0 or higher"));
        }

        if mob.armor.is_some_and(|a| !(0.0..=20.0).contains(&a)) {
            result.push(
                ValidationIssue::warning("armor", "Armor should be between 0 and 20")
                    .suggest("Armor values range from 0 to 20"),
            );
        }

        if let Some(mount) = &mob.mount {
            if *mount == mob.internal_name {
                result.push(ValidationIssue::error("mount", "Mob cannot mount itself").suggest("Reference a different mob"));
            } else if !known_mobs.contains(mount) {
                result.push(
                    ValidationIssue::error("mount", format!("Referenced mob \"{mount}\" does not exist"))
                        .suggest("Create the mount mob first or fix the reference"),
                );
            }
        }

        for (idx, skill) in mob.skills.iter().enumerate() {
            for issue in self.validate_skill(skill, known_skills) {
                result.push(issue.under_skill(idx));
            }
        }

        if let Some(bar) = &mob.boss_bar {
            let untitled = bar.title.as_deref().is_none_or(|t| t.trim().is_empty())
                && mob.display.as_deref().is_none_or(|d| d.trim().is_empty())
                && mob.internal_name.trim().is_empty();
            if bar.enabled && untitled {
                result.push(
                    ValidationIssue::warning("boss_bar.title", "Boss bar has no title")
                        .suggest("Set a boss bar title or display name"),
                );
            }
        }

        for (idx, item) in mob.equipment.iter().enumerate() {
            if !item.contains(':') {
                result.push(
                    ValidationIssue::warning(format!("equipment[{idx}]"), "Equipment item missing slot number")
                        .suggest("Format should be ITEM_NAME:SLOT (e.g., DIAMOND_SWORD:0)"),
                );
            }
        }

        result
    }

    /// Check a metaskill, including direct self-invocation.
    pub fn validate_metaskill(&self, metaskill: &MetaskillDef, known_skills: &HashSet<String>) -> ValidationResult {
        let mut result = ValidationResult::default();
        check_internal_name(&metaskill.internal_name, "metaskill", &mut result);

        if metaskill.cooldown.is_some_and(|c| c < 0.0) {
            result.push(
                ValidationIssue::error("cooldown", "Cooldown cannot be negative")
                    .suggest("Set cooldown to 0 or higher (in seconds)"),
            );
        }

        if metaskill.skills.is_empty() {
            result.push(
                ValidationIssue::warning("skills", "Metaskill has no skills")
                    .suggest("Add at least one skill to this metaskill"),
            );
        }

        for (idx, skill) in metaskill.skills.iter().enumerate() {
            for issue in self.validate_skill(skill, known_skills) {
                result.push(issue.under_skill(idx));
            }
        }

        for (idx, skill) in metaskill.skills.iter().enumerate() {
            if self.invoked_skill(skill).as_deref() == Some(metaskill.internal_name.as_str()) {
                let mut issue = ValidationIssue::error(format!("skills[{idx}]"), "Metaskill calls itself (circular reference)")
                    .suggest("Remove the self-reference to prevent infinite recursion");
                issue.path = Some(format!("skills[{idx}]"));
                result.push(issue);
            }
        }

        result
    }

    /// Validate every definition, then look for duplicate names and
    /// invocation cycles spanning more than one metaskill.
    pub fn validate_project(&self, project: &ProjectDef) -> ProjectReport {
        let known_mobs = project.mob_names();
        let known_skills = project.metaskill_names();

        let mut report = ProjectReport {
            mobs: project
                .mobs
                .iter()
                .map(|m| (m.internal_name.clone(), self.validate_mob(m, &known_mobs, &known_skills)))
                .collect(),
            metaskills: project
                .metaskills
                .iter()
                .map(|m| (m.internal_name.clone(), self.validate_metaskill(m, &known_skills)))
                .collect(),
            project: ValidationResult::default(),
        };

        track_names("mobs", project.mobs.iter().map(|m| m.internal_name.as_str()), &mut report.project);
        track_names(
            "metaskills",
            project.metaskills.iter().map(|m| m.internal_name.as_str()),
            &mut report.project,
        );

        for cycle in self.invocation_cycles(project) {
            let Some(first) = cycle.first() else { continue };
            let issue = ValidationIssue::error("skills", format!("Indirect invocation cycle: {}", cycle.join(" -> ")))
                .suggest("Break the cycle so the metaskills cannot call each other forever");
            if let Some((_, result)) = report.metaskills.iter_mut().find(|(name, _)| name == first) {
                result.push(issue);
            }
        }

        report
    }

    fn is_skill_invocation(&self, mechanic: &str) -> bool {
        mechanic.eq_ignore_ascii_case("skill")
            || self
                .registry
                .mechanic(mechanic)
                .is_some_and(|m| m.name.eq_ignore_ascii_case("skill"))
    }

    /// Name of the metaskill a line runs, if it is a `skill` invocation.
    pub fn invoked_skill(&self, skill: &SkillLineAst) -> Option<String> {
        if !self.is_skill_invocation(&skill.mechanic) {
            return None;
        }
        skill
            .param_any(&SKILL_NAME_KEYS)
            .map(|(_, v)| v.to_string())
            .filter(|n| !n.trim().is_empty())
    }

    /// Cycles of length two or more in the metaskill invocation graph.
    ///
    /// Each cycle is rotated to start at the metaskill that comes first in
    /// the project, closed by repeating that name, and reported once.
    pub fn invocation_cycles(&self, project: &ProjectDef) -> Vec<Vec<String>> {
        let order: HashMap<&str, usize> = project
            .metaskills
            .iter()
            .enumerate()
            .rev()
            .map(|(i, m)| (m.internal_name.as_str(), i))
            .collect();
        let mut graph: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for (idx, metaskill) in project.metaskills.iter().enumerate() {
            let edges = graph.entry(idx).or_default();
            for skill in &metaskill.skills {
                let Some(target) = self.invoked_skill(skill) else { continue };
                if let Some(&t) = order.get(target.as_str()) {
                    if t != idx && !edges.contains(&t) {
                        edges.push(t);
                    }
                }
            }
        }

        // Elementary cycles through `start` that only visit later metaskills,
        // so each cycle is found once, already rotated to its first member.
        let mut found: Vec<Vec<usize>> = Vec::new();
        let mut on_path = vec![false; project.metaskills.len()];
        let mut path = Vec::new();
        for start in 0..project.metaskills.len() {
            walk_cycles(start, start, &graph, &mut on_path, &mut path, &mut found);
        }

        found
            .into_iter()
            .map(|cycle| {
                let mut names: Vec<String> = cycle
                    .iter()
                    .map(|&i| project.metaskills[i].internal_name.clone())
                    .collect();
                if let Some(first) = names.first().cloned() {
                    names.push(first);
                }
                names
            })
            .collect()
    }
}

fn walk_cycles(
    start: usize,
    node: usize,
    graph: &BTreeMap<usize, Vec<usize>>,
    on_path: &mut [bool],
    path: &mut Vec<usize>,
    found: &mut Vec<Vec<usize>>,
) {
    on_path[node] = true;
    path.push(node);
    for &next in graph.get(&node).map(Vec::as_slice).unwrap_or_default() {
        if next == start {
            found.push(path.clone());
        } else if next > start && !on_path[next] {
            walk_cycles(start, next, graph, on_path, path, found);
        }
    }
    path.pop();
    on_path[node] = false;
}

fn check_internal_name(name: &str, kind: &str, result: &mut ValidationResult) {
    if name.trim().is_empty() {
        result.push(
            ValidationIssue::error("internal_name", "Internal name is required")
                .suggest(format!("Provide a unique identifier for this {kind}")),
        );
    } else if name.chars().any(char::is_whitespace) {
        result.push(
            ValidationIssue::warning("internal_name", "Internal name should not contain spaces")
                .suggest("Use underscores instead of spaces (e.g., Fire_Boss)"),
        );
    }
}

fn track_names<'a>(kind: &str, names: impl Iterator<Item = &'a str>, result: &mut ValidationResult) {
    let mut seen = HashSet::new();
    for (idx, name) in names.enumerate() {
        if !name.is_empty() && !seen.insert(name) {
            result.push(
                ValidationIssue::error(format!("{kind}[{idx}].internal_name"), format!("Duplicate internal name '{name}'"))
                    .suggest("Internal names must be unique within a project"),
            );
        }
    }
}

fn type_mismatch(schema: &ParameterSchema, value: &ParamValue) -> Option<String> {
    match schema.kind {
        ParamType::Number if value.as_f64().is_none() => Some("should be a number".to_string()),
        ParamType::Boolean if value.as_bool().is_none() => Some("should be true or false".to_string()),
        ParamType::Enum if !schema.values.is_empty() => {
            let text = value.to_string();
            (!schema.values.iter().any(|v| v.eq_ignore_ascii_case(&text))).then(|| "has an invalid value".to_string())
        },
        _ => None,
    }
}

fn check_params(
    prefix: &str,
    owner: &str,
    schema: &BTreeMap<String, ParameterSchema>,
    given: Option<&Params>,
    issues: &mut Vec<ValidationIssue>,
) {
    for (name, param) in schema {
        let found = given.and_then(|g| g.iter().find(|(k, _)| param.answers_to(name, k)));
        let value = match found {
            Some((_, v)) if !v.is_blank() => v,
            _ => {
                if param.required {
                    let hint = if param.description.is_empty() {
                        format!("Add the {name} parameter")
                    } else {
                        param.description.clone()
                    };
                    issues.push(
                        ValidationIssue::error(format!("{prefix}.{name}"), format!("Required parameter \"{name}\" is missing"))
                            .suggest(hint),
                    );
                }
                continue;
            },
        };

        if let Some(problem) = type_mismatch(param, value) {
            let hint = if param.values.is_empty() {
                format!("Current value \"{value}\" is not valid")
            } else {
                format!("Valid values: {}", param.values.join(", "))
            };
            issues.push(ValidationIssue::error(format!("{prefix}.{name}"), format!("Parameter \"{name}\" {problem}")).suggest(hint));
            continue;
        }

        if param.kind == ParamType::Number {
            let Some(number) = value.as_f64() else { continue };
            if let Some(min) = param.min.filter(|m| number < *m) {
                issues.push(
                    ValidationIssue::warning(format!("{prefix}.{name}"), format!("Parameter \"{name}\" is below minimum value"))
                        .suggest(format!("Minimum value is {min}, you have {number}")),
                );
            }
            if let Some(max) = param.max.filter(|m| number > *m) {
                issues.push(
                    ValidationIssue::warning(format!("{prefix}.{name}"), format!("Parameter \"{name}\" exceeds maximum value"))
                        .suggest(format!("Maximum value is {max}, you have {number}")),
                );
            }
        }
    }

    for key in given.into_iter().flat_map(Params::keys) {
        if !schema.iter().any(|(name, p)| p.answers_to(name, key)) {
            issues.push(
                ValidationIssue::info(format!("{prefix}.{key}"), format!("Unknown parameter \"{key}\" for {owner}"))
                    .suggest("This parameter may not be recognized"),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defs::{BossBarDef, HealthModifier, HealthOp, InlineCondition, Targeter, Trigger};

    fn registry() -> SchemaRegistry {
        SchemaRegistry::builtin()
    }

    fn known(names: &[&str]) -> HashSet<String> {
        names.iter().map(|n| (*n).to_string()).collect()
    }

    fn mob(name: &str) -> MobDef {
        MobDef {
            internal_name: name.to_string(),
            entity_type: "ZOMBIE".into(),
            ..MobDef::default()
        }
    }

    fn metaskill(name: &str, calls: &[&str]) -> MetaskillDef {
        let mut skills = vec![SkillLineAst::new("damage").with_param("amount", 1)];
        skills.extend(calls.iter().map(|c| SkillLineAst::new("skill").with_param("s", *c)));
        MetaskillDef {
            internal_name: name.to_string(),
            skills,
            ..MetaskillDef::default()
        }
    }

    #[test]
    fn blank_mechanic_stops_validation() {
        let reg = registry();
        let skill = SkillLineAst::new("  ").with_chance(4.0);
        let issues = Validator::new(&reg).validate_skill(&skill, &HashSet::new());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "mechanic");
        assert_eq!(issues[0].severity, Severity::Error);
    }

    #[test]
    fn unknown_mechanic_is_only_a_warning() {
        let reg = registry();
        let skill = SkillLineAst::new("frobnicate").with_param("x", 1);
        let result = ValidationResult::new(Validator::new(&reg).validate_skill(&skill, &HashSet::new()));
        assert!(result.valid());
        assert_eq!(result.warnings().len(), 1);
        assert!(result.info().is_empty());
    }

    #[test]
    fn required_parameter_honors_aliases() {
        let reg = registry();
        let v = Validator::new(&reg);
        let by_alias = SkillLineAst::new("damage").with_param("A", 5);
        assert!(v.validate_skill(&by_alias, &HashSet::new()).is_empty());
        let missing = SkillLineAst::new("damage");
        let issues = v.validate_skill(&missing, &HashSet::new());
        assert!(matches!(issues.as_slice(), [i] if i.field == "parameters.amount" && i.severity == Severity::Error));
    }

    #[test]
    fn type_and_range_problems_are_reported() {
        let reg = registry();
        let v = Validator::new(&reg);
        let skill = SkillLineAst::new("damage")
            .with_param("amount", "lots")
            .with_param("ignorearmor", "maybe");
        let issues = v.validate_skill(&skill, &HashSet::new());
        assert_eq!(issues.iter().filter(|i| i.severity == Severity::Error).count(), 2);

        let negative = SkillLineAst::new("damage").with_param("amount", -3);
        let issues = v.validate_skill(&negative, &HashSet::new());
        assert!(matches!(issues.as_slice(), [i] if i.severity == Severity::Warning && i.message.contains("minimum")));
    }

    #[test]
    fn enum_membership_ignores_case() {
        let reg = registry();
        let v = Validator::new(&reg);
        let ok = SkillLineAst::new("potion").with_param("type", "speed");
        assert!(v.validate_skill(&ok, &HashSet::new()).is_empty());
        let bad = SkillLineAst::new("potion").with_param("type", "FLIGHT");
        let issues = v.validate_skill(&bad, &HashSet::new());
        assert!(issues.iter().any(|i| i.severity == Severity::Error && i.field == "parameters.type"));
    }

    #[test]
    fn unknown_parameter_is_info() {
        let reg = registry();
        let skill = SkillLineAst::new("heal").with_param("amount", 2).with_param("sparkle", true);
        let issues = Validator::new(&reg).validate_skill(&skill, &HashSet::new());
        assert!(matches!(issues.as_slice(), [i] if i.severity == Severity::Info && i.field == "parameters.sparkle"));
    }

    #[test]
    fn sub_skill_reference_must_exist() {
        let reg = registry();
        let v = Validator::new(&reg);
        let skill = SkillLineAst::new("skill").with_param("s", "DoesNotExist");
        let issues = v.validate_skill(&skill, &HashSet::new());
        assert!(matches!(issues.as_slice(), [i] if i.field == "parameters.s" && i.severity == Severity::Error));
        assert!(v.validate_skill(&skill, &known(&["DoesNotExist"])).is_empty());

        let via_alias = SkillLineAst::new("metaskill").with_param("spell", "Missing");
        assert_eq!(v.validate_skill(&via_alias, &HashSet::new()).len(), 1);
    }

    #[test]
    fn sub_skill_check_works_without_schema() {
        let reg = SchemaRegistry::empty();
        let skill = SkillLineAst::new("skill").with_param("s", "Nope");
        let issues = Validator::new(&reg).validate_skill(&skill, &HashSet::new());
        assert_eq!(issues.len(), 2);
        assert!(issues.iter().any(|i| i.severity == Severity::Error));
    }

    #[test]
    fn targeter_trigger_and_condition_checks() {
        let reg = registry();
        let skill = SkillLineAst::new("heal")
            .with_param("amount", 1)
            .with_targeter(Targeter::new("nowhere"))
            .with_trigger(Trigger::new("onTimer"))
            .with_condition(InlineCondition::new("fullmoon"))
            .with_health(HealthModifier::new(HealthOp::Below, ""));
        let issues = Validator::new(&reg).validate_skill(&skill, &HashSet::new());
        let fields: Vec<&str> = issues.iter().map(|i| i.field.as_str()).collect();
        assert_eq!(fields, vec!["targeter", "trigger", "inline_conditions[0]", "health_modifier"]);
        assert!(issues.iter().all(|i| i.severity == Severity::Warning));
    }

    #[test]
    fn targeter_options_are_checked_like_parameters() {
        let reg = registry();
        let skill = SkillLineAst::new("heal")
            .with_param("amount", 1)
            .with_targeter(Targeter::new("PIR").with_option("r", "far").with_option("color", "red"));
        let issues = Validator::new(&reg).validate_skill(&skill, &HashSet::new());
        assert!(issues.iter().any(|i| i.field == "targeter.options.radius" && i.severity == Severity::Error));
        assert!(issues.iter().any(|i| i.field == "targeter.options.color" && i.severity == Severity::Info));
    }

    #[test]
    fn chance_outside_unit_range_is_an_error() {
        let reg = registry();
        let skill = SkillLineAst::new("heal").with_param("amount", 1).with_chance(1.5);
        let result = ValidationResult::new(Validator::new(&reg).validate_skill(&skill, &HashSet::new()));
        assert!(!result.valid());
        assert_eq!(result.errors()[0].field, "chance");
    }

    #[test]
    fn mob_structural_checks() {
        let reg = registry();
        let mut boss = mob("Fire Boss");
        boss.health = Some(0.0);
        boss.damage = Some(-1.0);
        boss.armor = Some(30.0);
        boss.mount = Some("Horse".into());
        boss.equipment = vec!["DIAMOND_SWORD".into(), "IRON_HELMET:4".into()];
        boss.skills = vec![SkillLineAst::new("damage")];
        let result = Validator::new(&reg).validate_mob(&boss, &known(&["Fire Boss"]), &HashSet::new());

        let fields: Vec<&str> = result.issues.iter().map(|i| i.field.as_str()).collect();
        assert!(fields.contains(&"internal_name"));
        assert!(fields.contains(&"health"));
        assert!(fields.contains(&"damage"));
        assert!(fields.contains(&"armor"));
        assert!(fields.contains(&"mount"));
        assert!(fields.contains(&"equipment[0]"));
        assert!(!fields.contains(&"equipment[1]"));
        let nested = result.issues.iter().find(|i| i.field == "skills[0].parameters.amount").expect("nested");
        assert_eq!(nested.path.as_deref(), Some("skills[0]"));
    }

    #[test]
    fn mob_cannot_mount_itself() {
        let reg = registry();
        let mut m = mob("Rider");
        m.mount = Some("Rider".into());
        let result = Validator::new(&reg).validate_mob(&m, &known(&["Rider"]), &HashSet::new());
        assert_eq!(result.errors().len(), 1);
        assert_eq!(result.errors()[0].message, "Mob cannot mount itself");
    }

    #[test]
    fn boss_bar_title_falls_back_to_names() {
        let reg = registry();
        let mut m = mob("Boss");
        m.boss_bar = Some(BossBarDef {
            enabled: true,
            ..BossBarDef::default()
        });
        let result = Validator::new(&reg).validate_mob(&m, &HashSet::new(), &HashSet::new());
        assert!(result.is_empty());
    }

    #[test]
    fn metaskill_self_invocation_is_an_error() {
        let reg = registry();
        let ms = metaskill("Loop", &["Loop"]);
        let result = Validator::new(&reg).validate_metaskill(&ms, &known(&["Loop"]));
        assert!(matches!(result.errors().as_slice(), [i] if i.field == "skills[1]" && i.message.contains("calls itself")));
    }

    #[test]
    fn empty_metaskill_warns() {
        let reg = registry();
        let ms = MetaskillDef {
            internal_name: "Nothing".into(),
            cooldown: Some(-1.0),
            ..MetaskillDef::default()
        };
        let result = Validator::new(&reg).validate_metaskill(&ms, &HashSet::new());
        assert_eq!(result.errors().len(), 1);
        assert_eq!(result.warnings().len(), 1);
    }

    #[test]
    fn project_reports_duplicates_and_cycles() {
        let reg = registry();
        let project = ProjectDef {
            mobs: vec![mob("Boss"), mob("Boss")],
            metaskills: vec![
                metaskill("A", &["B"]),
                metaskill("B", &["C"]),
                metaskill("C", &["A"]),
                metaskill("D", &["A"]),
            ],
        };
        let report = Validator::new(&reg).validate_project(&project);
        assert!(!report.can_export());
        assert_eq!(report.project.errors().len(), 1);

        let (_, a) = &report.metaskills[0];
        assert!(matches!(a.errors().as_slice(), [i] if i.message.ends_with("A -> B -> C -> A")));
        for (_, other) in &report.metaskills[1..] {
            assert!(other.valid());
        }
    }

    #[test]
    fn cycles_are_reported_once() {
        let reg = registry();
        let project = ProjectDef {
            metaskills: vec![metaskill("B", &["A"]), metaskill("A", &["B"])],
            ..ProjectDef::default()
        };
        let cycles = Validator::new(&reg).invocation_cycles(&project);
        assert_eq!(cycles, vec![vec!["B".to_string(), "A".to_string(), "B".to_string()]]);
    }

    #[test]
    fn cycles_sharing_a_node_are_all_found() {
        let reg = registry();
        let project = ProjectDef {
            metaskills: vec![
                metaskill("A", &["B", "C"]),
                metaskill("B", &["D"]),
                metaskill("C", &["B"]),
                metaskill("D", &["A"]),
            ],
            ..ProjectDef::default()
        };
        let validator = Validator::new(&reg);
        let cycles = validator.invocation_cycles(&project);
        assert_eq!(
            cycles,
            vec![
                vec!["A".to_string(), "B".into(), "D".into(), "A".into()],
                vec!["A".to_string(), "C".into(), "B".into(), "D".into(), "A".into()],
            ]
        );

        let report = validator.validate_project(&project);
        let (_, a) = &report.metaskills[0];
        let messages: Vec<&str> = a.errors().iter().map(|i| i.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "Indirect invocation cycle: A -> B -> D -> A",
                "Indirect invocation cycle: A -> C -> B -> D -> A",
            ]
        );
    }

    #[test]
    fn clean_project_can_export() {
        let reg = registry();
        let mut boss = mob("Boss");
        boss.skills = vec![SkillLineAst::new("skill").with_param("s", "Burst")];
        let project = ProjectDef {
            mobs: vec![boss],
            metaskills: vec![metaskill("Burst", &[])],
        };
        let report = Validator::new(&reg).validate_project(&project);
        assert!(report.can_export());
        assert_eq!(report.error_count(), 0);
    }
}
