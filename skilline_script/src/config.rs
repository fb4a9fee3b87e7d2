//! `skilline.toml` settings for the command line tool.
//!
//! ```toml
//! schema_overlays = ["schemas/custom.toml"]
//! deny_warnings = false
//! suggestion_limit = 10
//! lenient_chance = false
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use skilline_data::SchemaRegistry;

use crate::parser::ParserOptions;

/// File looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "skilline.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Schema files merged over the builtin catalog, in order. Relative
    /// paths resolve against the config file's directory.
    pub schema_overlays: Vec<PathBuf>,
    /// Treat validation warnings as failures in `check`.
    pub deny_warnings: bool,
    /// Most completion candidates to show.
    pub suggestion_limit: usize,
    pub lenient_chance: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_overlays: Vec::new(),
            deny_warnings: false,
            suggestion_limit: 10,
            lenient_chance: false,
        }
    }
}

impl Config {
    pub fn parser_options(&self) -> ParserOptions {
        ParserOptions {
            lenient_chance: self.lenient_chance,
        }
    }

    /// Builtin catalog with every overlay applied.
    ///
    /// # Errors
    /// Fails if an overlay file can't be read or parsed.
    pub fn registry(&self) -> Result<SchemaRegistry> {
        let mut registry = SchemaRegistry::builtin();
        for path in &self.schema_overlays {
            let set = SchemaRegistry::load(path).with_context(|| format!("loading schema overlay '{}'", path.display()))?;
            registry = registry.with_overlay(set);
        }
        Ok(registry)
    }
}

/// Load settings, falling back to defaults.
///
/// An explicit `path` that can't be loaded is reported with `warn!`; a
/// missing default file is normal and only noted with `info!`.
pub fn load_config(path: Option<&Path>) -> Config {
    let (path, explicit) = match path {
        Some(p) => (p.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };
    if !explicit && !path.exists() {
        info!("no {DEFAULT_CONFIG_FILE} found, using default settings");
        return Config::default();
    }
    match try_load_config(&path) {
        Ok(config) => {
            info!("loaded settings from '{}'", path.display());
            config
        },
        Err(e) => {
            warn!("failed to load settings from '{}': {e:#}; using defaults", path.display());
            Config::default()
        },
    }
}

/// # Errors
/// Fails if the file can't be read or isn't valid settings TOML.
fn try_load_config(path: &Path) -> Result<Config> {
    let text = fs::read_to_string(path).with_context(|| format!("reading settings from '{}'", path.display()))?;
    let mut config: Config =
        toml::from_str(&text).with_context(|| format!("parsing settings from '{}'", path.display()))?;
    if let Some(dir) = path.parent() {
        for overlay in &mut config.schema_overlays {
            if overlay.is_relative() {
                *overlay = dir.join(&*overlay);
            }
        }
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_explicit_file_falls_back_to_defaults() {
        let config = load_config(Some(Path::new("/definitely/not/here/skilline.toml")));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "lenient_chance = true\nsuggestion_limit = 3").expect("write");
        let config = load_config(Some(file.path()));
        assert!(config.lenient_chance);
        assert_eq!(config.suggestion_limit, 3);
        assert!(!config.deny_warnings);
        assert!(config.parser_options().lenient_chance);
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "suggestion_limit = \"many\"").expect("write");
        assert_eq!(load_config(Some(file.path())), Config::default());
    }

    #[test]
    fn overlays_resolve_relative_to_config_and_apply() {
        let dir = tempfile::tempdir().expect("temp dir");
        fs::write(
            dir.path().join("extra.toml"),
            "[[mechanics]]\nname = \"shout\"\ncategory = \"Communication\"\n",
        )
        .expect("write overlay");
        let config_path = dir.path().join("skilline.toml");
        fs::write(&config_path, "schema_overlays = [\"extra.toml\"]\n").expect("write config");

        let config = load_config(Some(&config_path));
        assert_eq!(config.schema_overlays, vec![dir.path().join("extra.toml")]);
        let registry = config.registry().expect("registry");
        assert!(registry.mechanic("shout").is_some());
        assert!(registry.mechanic("damage").is_some());
    }

    #[test]
    fn broken_overlay_is_an_error() {
        let config = Config {
            schema_overlays: vec![PathBuf::from("/definitely/not/here.toml")],
            ..Config::default()
        };
        assert!(config.registry().is_err());
    }
}
