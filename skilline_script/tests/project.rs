use std::fs;

use pretty_assertions::assert_eq;

use skilline_data::{SchemaRegistry, Severity, Validator};
use skilline_script::{ParserOptions, ProjectError, format_project, load_project, parse_project};

const FIRE_DUNGEON: &str = include_str!("fixtures/fire_dungeon.toml");

#[test]
fn loads_mobs_and_metaskills_from_disk() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("fire_dungeon.toml");
    fs::write(&path, FIRE_DUNGEON).expect("write project");

    let loaded = load_project(&path, ParserOptions::default()).expect("load");
    assert!(loaded.diagnostics.is_empty(), "{:?}", loaded.diagnostics);

    let project = &loaded.project;
    assert_eq!(project.mob_names().len(), 2);
    let boss = &project.mobs[0];
    assert_eq!(boss.entity_type, "BLAZE");
    assert_eq!(boss.mount.as_deref(), Some("LavaSteed"));
    assert!(boss.boss_bar.as_ref().is_some_and(|b| b.enabled));
    assert_eq!(boss.skills.len(), 3);
    assert_eq!(boss.skills[2].health_modifier.as_ref().map(|h| h.value.as_str()), Some("30%-50%"));
    assert_eq!(project.metaskills[0].cooldown, Some(5.0));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let err = load_project(&dir.path().join("nope.toml"), ParserOptions::default()).expect_err("no file");
    assert!(matches!(err, ProjectError::Io { .. }));
}

#[test]
fn validation_finds_the_cycle_and_structural_problems() {
    let loaded = parse_project(FIRE_DUNGEON, ParserOptions::default()).expect("parse");
    let registry = SchemaRegistry::builtin();
    let report = Validator::new(&registry).validate_project(&loaded.project);

    assert!(!report.can_export());
    assert!(report.project.is_empty());

    let (name, boss) = &report.mobs[0];
    assert_eq!(name, "FireBoss");
    assert_eq!(boss.errors().len(), 0, "{:?}", boss.errors());
    let warnings = boss.warnings();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].field, "equipment[1]");

    let (name, burst) = &report.metaskills[0];
    assert_eq!(name, "FireBurst");
    let cycle: Vec<_> = burst.issues.iter().filter(|i| i.severity == Severity::Error).collect();
    assert_eq!(cycle.len(), 1);
    assert_eq!(cycle[0].message, "Indirect invocation cycle: FireBurst -> Phase2 -> FireBurst");

    let (_, phase2) = &report.metaskills[1];
    assert!(phase2.valid());
    assert_eq!(report.error_count(), 1);
}

#[test]
fn cycle_free_project_can_export() {
    let text = FIRE_DUNGEON.replace(
        "skills = [\"skill{s=FireBurst} @self\", \"heal{amount=50} @self\"]",
        "skills = [\"heal{amount=50} @self\"]",
    );
    let loaded = parse_project(&text, ParserOptions::default()).expect("parse");
    let registry = SchemaRegistry::builtin();
    let report = Validator::new(&registry).validate_project(&loaded.project);
    assert!(report.can_export(), "{report:?}");
    assert_eq!(report.warning_count(), 1);
}

#[test]
fn duplicate_names_and_bad_references() {
    let text = r#"
[[mobs]]
internal_name = "Imp"
type = "VEX"
mount = "Ghost"
skills = ["skill{s=Nowhere}"]

[[mobs]]
internal_name = "Imp"
type = "VEX"
"#;
    let loaded = parse_project(text, ParserOptions::default()).expect("parse");
    let registry = SchemaRegistry::builtin();
    let report = Validator::new(&registry).validate_project(&loaded.project);

    let dup = report.project.errors();
    assert_eq!(dup.len(), 1);
    assert_eq!(dup[0].field, "mobs[1].internal_name");

    let (_, imp) = &report.mobs[0];
    let fields: Vec<&str> = imp.errors().iter().map(|i| i.field.as_str()).collect();
    assert_eq!(fields, vec!["mount", "skills[0].parameters.s"]);
}

#[test]
fn unparseable_lines_keep_their_slot() {
    let text = "[[metaskills]]\ninternal_name = \"Broken\"\nskills = [\"@self\", \"heal{amount=1}\"]\n";
    let loaded = parse_project(text, ParserOptions::default()).expect("parse");
    assert!(loaded.has_parse_errors());
    assert_eq!(loaded.diagnostics[0].owner, "metaskill Broken");
    assert_eq!(loaded.diagnostics[0].index, 0);
    assert_eq!(loaded.project.metaskills[0].skills.len(), 2);
    assert_eq!(loaded.project.metaskills[0].skills[1].mechanic, "heal");
}

#[test]
fn format_project_canonicalizes_and_keeps_layout() {
    let (formatted, changed) = format_project(FIRE_DUNGEON, ParserOptions::default()).expect("format");
    assert_eq!(changed, 2);
    assert!(formatted.starts_with("# Fire dungeon"));
    assert!(formatted.contains("\"damage{amount=10} @target ~onAttack\", # opener"));
    assert!(formatted.contains("\"ignite{ticks=40} @PIR{r=5}\""));
    assert!(formatted.contains("[mobs.boss_bar]"));

    let original = parse_project(FIRE_DUNGEON, ParserOptions::default()).expect("parse original");
    let reformatted = parse_project(&formatted, ParserOptions::default()).expect("parse formatted");
    assert_eq!(original.project, reformatted.project);
}

#[test]
fn format_project_in_place() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("fire_dungeon.toml");
    fs::write(&path, FIRE_DUNGEON).expect("write project");

    let text = fs::read_to_string(&path).expect("read");
    let (formatted, _) = format_project(&text, ParserOptions::default()).expect("format");
    fs::write(&path, &formatted).expect("write back");

    let again = fs::read_to_string(&path).expect("read again");
    let (_, changed) = format_project(&again, ParserOptions::default()).expect("format again");
    assert_eq!(changed, 0);
}
