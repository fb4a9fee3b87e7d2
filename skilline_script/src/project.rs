//! Project files: mobs and metaskills with their skills written as text.
//!
//! ```toml
//! [[mobs]]
//! internal_name = "FireBoss"
//! type = "BLAZE"
//! health = 500
//! skills = ["damage{amount=10} @target ~onAttack"]
//!
//! [[metaskills]]
//! internal_name = "FireBurst"
//! skills = ["ignite{ticks=40} @PIR{r=5}"]
//! ```

use std::fmt;
use std::path::Path;

use log::{debug, info};
use serde::Deserialize;
use thiserror::Error;
use toml_edit::{Document, Item, Value};

use skilline_data::{BossBarDef, MetaskillDef, MobDef, ProjectDef, SkillLineAst};

use crate::generator::generate_skill_line;
use crate::parser::{ParserOptions, parse_skill_line_with};

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("failed to read project file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed project file: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("could not edit project file: {0}")]
    Edit(#[from] toml_edit::TomlError),
}

#[derive(Debug, Deserialize)]
struct ProjectFile {
    #[serde(default)]
    mobs: Vec<MobFile>,
    #[serde(default)]
    metaskills: Vec<MetaskillFile>,
}

#[derive(Debug, Deserialize)]
struct MobFile {
    #[serde(default)]
    internal_name: String,
    #[serde(rename = "type", default)]
    entity_type: String,
    display: Option<String>,
    health: Option<f64>,
    damage: Option<f64>,
    armor: Option<f64>,
    faction: Option<String>,
    mount: Option<String>,
    boss_bar: Option<BossBarDef>,
    #[serde(default)]
    equipment: Vec<String>,
    #[serde(default)]
    skills: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct MetaskillFile {
    #[serde(default)]
    internal_name: String,
    cooldown: Option<f64>,
    #[serde(default)]
    conditions: Vec<String>,
    #[serde(default)]
    target_conditions: Vec<String>,
    #[serde(default)]
    trigger_conditions: Vec<String>,
    #[serde(default)]
    skills: Vec<String>,
}

/// Parse trouble on one skill line of a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineDiagnostic {
    /// Owner label such as `mob FireBoss`.
    pub owner: String,
    pub index: usize,
    pub source: String,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl fmt::Display for LineDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for e in &self.errors {
            writeln!(f, "{} skills[{}]: error: {e}", self.owner, self.index)?;
        }
        for w in &self.warnings {
            writeln!(f, "{} skills[{}]: warning: {w}", self.owner, self.index)?;
        }
        write!(f, "    {}", self.source)
    }
}

/// A project plus whatever the parser had to say about its skill lines.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedProject {
    pub project: ProjectDef,
    pub diagnostics: Vec<LineDiagnostic>,
}

impl LoadedProject {
    pub fn has_parse_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| !d.errors.is_empty())
    }

    pub fn has_parse_warnings(&self) -> bool {
        self.diagnostics.iter().any(|d| !d.warnings.is_empty())
    }
}

/// Parse every line, keeping indices aligned with the source list. A line
/// that fails to lex becomes an empty skill so validation still sees it.
fn parse_lines(owner: &str, lines: &[String], options: ParserOptions, diags: &mut Vec<LineDiagnostic>) -> Vec<SkillLineAst> {
    lines
        .iter()
        .enumerate()
        .map(|(index, source)| {
            let mut diag = LineDiagnostic {
                owner: owner.to_string(),
                index,
                source: source.clone(),
                errors: Vec::new(),
                warnings: Vec::new(),
            };
            let ast = match parse_skill_line_with(source, options) {
                Ok(outcome) => {
                    diag.errors = outcome.errors.iter().map(ToString::to_string).collect();
                    diag.warnings = outcome.warnings.iter().map(ToString::to_string).collect();
                    outcome.ast
                },
                Err(e) => {
                    diag.errors.push(e.to_string());
                    SkillLineAst::default()
                },
            };
            if !diag.errors.is_empty() || !diag.warnings.is_empty() {
                diags.push(diag);
            }
            ast
        })
        .collect()
}

/// Parse project TOML text into definitions.
///
/// # Errors
/// Returns [`ProjectError::Toml`] if the text isn't a valid project file.
/// Bad skill lines are not errors here; they show up as diagnostics.
pub fn parse_project(text: &str, options: ParserOptions) -> Result<LoadedProject, ProjectError> {
    let file: ProjectFile = toml::from_str(text)?;
    let mut diagnostics = Vec::new();

    let mobs = file
        .mobs
        .into_iter()
        .map(|m| MobDef {
            skills: parse_lines(&format!("mob {}", m.internal_name), &m.skills, options, &mut diagnostics),
            internal_name: m.internal_name,
            entity_type: m.entity_type,
            display: m.display,
            health: m.health,
            damage: m.damage,
            armor: m.armor,
            faction: m.faction,
            mount: m.mount,
            boss_bar: m.boss_bar,
            equipment: m.equipment,
        })
        .collect();

    let metaskills = file
        .metaskills
        .into_iter()
        .map(|m| MetaskillDef {
            skills: parse_lines(&format!("metaskill {}", m.internal_name), &m.skills, options, &mut diagnostics),
            internal_name: m.internal_name,
            cooldown: m.cooldown,
            conditions: m.conditions,
            target_conditions: m.target_conditions,
            trigger_conditions: m.trigger_conditions,
        })
        .collect();

    Ok(LoadedProject {
        project: ProjectDef { mobs, metaskills },
        diagnostics,
    })
}

/// Read and parse a project file from disk.
///
/// # Errors
/// Returns [`ProjectError::Io`] if the file can't be read, otherwise as
/// [`parse_project`].
pub fn load_project(path: &Path, options: ParserOptions) -> Result<LoadedProject, ProjectError> {
    let text = std::fs::read_to_string(path).map_err(|source| ProjectError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let loaded = parse_project(&text, options)?;
    info!(
        "loaded project '{}': {} mobs, {} metaskills",
        path.display(),
        loaded.project.mobs.len(),
        loaded.project.metaskills.len()
    );
    Ok(loaded)
}

/// Rewrite every parseable skill line in canonical form, leaving the rest
/// of the document (comments, spacing, key order) untouched.
///
/// Returns the new text and how many lines changed. Lines with parse errors
/// or warnings are left as written, since their canonical form could drop
/// text the parser skipped.
///
/// # Errors
/// Returns [`ProjectError::Edit`] if the text is not valid TOML.
pub fn format_project(text: &str, options: ParserOptions) -> Result<(String, usize), ProjectError> {
    let mut doc = text.parse::<Document>()?;
    let mut changed = 0;
    for section in ["mobs", "metaskills"] {
        let Some(tables) = doc.get_mut(section).and_then(Item::as_array_of_tables_mut) else {
            continue;
        };
        for table in tables.iter_mut() {
            let Some(skills) = table.get_mut("skills").and_then(Item::as_array_mut) else {
                continue;
            };
            for value in skills.iter_mut() {
                let Some(source) = value.as_str() else { continue };
                let Some(canonical) = canonical_line(source, options) else {
                    debug!("leaving skill line as written: {source}");
                    continue;
                };
                if canonical != source {
                    let decor = value.decor().clone();
                    *value = Value::from(canonical);
                    *value.decor_mut() = decor;
                    changed += 1;
                }
            }
        }
    }
    Ok((doc.to_string(), changed))
}

fn canonical_line(source: &str, options: ParserOptions) -> Option<String> {
    let outcome = parse_skill_line_with(source, options).ok()?;
    (outcome.is_ok() && outcome.warnings.is_empty()).then(|| generate_skill_line(&outcome.ast))
}
