use pretty_assertions::assert_eq;

use skilline_data::{HealthModifier, HealthOp, InlineCondition, ParamValue, SkillLineAst, Targeter, Trigger};
use skilline_script::{
    LexError, ParserOptions, generate_skill_line, parse_skill_block, parse_skill_line, parse_skill_line_with,
    render_skill_block,
};

fn parse_ok(src: &str) -> SkillLineAst {
    let out = parse_skill_line(src).expect("lex ok");
    assert!(out.is_ok(), "unexpected errors for {src:?}: {:?}", out.errors);
    out.ast
}

#[test]
fn full_line_parses_every_component() {
    let ast = parse_ok("damage{amount=10;type=magic} @PIR{r=5} ~onTimer:100 ?day <50% 0.8");
    let expected = SkillLineAst::new("damage")
        .with_param("amount", 10)
        .with_param("type", "magic")
        .with_targeter(Targeter::new("PIR").with_option("r", 5))
        .with_trigger(Trigger::with_value("onTimer", "100"))
        .with_condition(InlineCondition::new("day"))
        .with_health(HealthModifier::new(HealthOp::Below, "50%"))
        .with_chance(0.8);
    assert_eq!(ast, expected);
}

#[test]
fn particles_line_regenerates_verbatim() {
    let src = "effect:particles{p=flame;a=20} @PIR{r=5} ~onTimer:100";
    let ast = parse_ok(src);
    assert_eq!(ast.mechanic, "effect:particles");
    let params = ast.parameters.as_ref().expect("params");
    assert_eq!(params.get("p"), Some(&ParamValue::Text("flame".into())));
    assert_eq!(params.get("a"), Some(&ParamValue::Int(20)));
    assert_eq!(ast.trigger.as_ref().map(ToString::to_string).as_deref(), Some("onTimer:100"));
    assert_eq!(generate_skill_line(&ast), src);
}

#[test]
fn blank_input_reports_missing_mechanic() {
    for src in ["", "   "] {
        let out = parse_skill_line(src).expect("lex ok");
        assert!(out.ast.mechanic.is_empty());
        assert_eq!(out.errors.len(), 1);
        assert!(out.errors[0].message.starts_with("Expected mechanic name"));
    }
}

#[test]
fn parameter_values_keep_their_types() {
    let amount = |src: &str, key: &str| parse_ok(src).parameters.and_then(|p| p.get(key).cloned());
    assert_eq!(amount("heal{amount=10}", "amount"), Some(ParamValue::Int(10)));
    assert_eq!(amount("heal{amount=\"10\"}", "amount"), Some(ParamValue::Text("10".into())));
    assert_eq!(amount("heal{silent=true}", "silent"), Some(ParamValue::Bool(true)));
    assert_eq!(amount("heal{silent=TRUE}", "silent"), Some(ParamValue::Bool(true)));
}

#[test]
fn chance_needs_a_decimal_point() {
    assert_eq!(parse_ok("damage{amount=5} @target 0.5").chance, Some(0.5));

    let out = parse_skill_line("damage{amount=5} @target 5").expect("lex ok");
    assert!(out.is_ok());
    assert_eq!(out.ast.chance, None);
    assert_eq!(out.warnings.len(), 1);
}

#[test]
fn out_of_range_chance_needs_lenient_parsing() {
    let strict = parse_skill_line("damage{amount=5} 1.5").expect("lex ok");
    assert_eq!(strict.ast.chance, None);

    let lenient = parse_skill_line_with("damage{amount=5} 1.5", ParserOptions { lenient_chance: true }).expect("lex ok");
    assert_eq!(lenient.ast.chance, Some(1.5));
    assert_eq!(lenient.warnings.len(), 1);
    assert!(lenient.warnings[0].message.contains("outside the typical range"));
}

#[test]
fn health_range_form() {
    let ast = parse_ok("skill{s=Phase2} @self ~onDamaged =30%-50%");
    assert_eq!(ast.health_modifier, Some(HealthModifier::new(HealthOp::Equal, "30%-50%")));
}

#[test]
fn split_trigger_value_is_joined() {
    let ast = parse_ok("heal{amount=2} ~onTimer : 20");
    assert_eq!(ast.trigger, Some(Trigger::with_value("onTimer", "20")));
    assert_eq!(generate_skill_line(&ast), "heal{amount=2} ~onTimer:20");
}

#[test]
fn negated_conditions_with_raw_parameters() {
    let ast = parse_ok("ignite @self ?!raining ?inblock{t=STONE}");
    assert_eq!(ast.inline_conditions.len(), 2);
    assert!(ast.inline_conditions[0].negated);
    assert_eq!(ast.inline_conditions[1].params.as_deref(), Some("{t=STONE}"));
}

#[test]
fn unterminated_string_is_a_lex_error() {
    let err = parse_skill_line("message{m=\"oops} @self").expect_err("should not lex");
    assert_eq!(err, LexError::UnterminatedString { position: 10 });
}

#[test]
fn structural_error_keeps_partial_ast() {
    let out = parse_skill_line("damage{amount=10} @").expect("lex ok");
    assert!(!out.is_ok());
    assert_eq!(out.ast.mechanic, "damage");
    assert!(out.ast.parameters.is_some());
    assert!(out.ast.targeter.is_none());
    assert!(out.errors[0].message.contains("Expected targeter type"));
    assert_eq!(out.errors[0].position, 19);
}

#[test]
fn skill_block_golden() {
    let src = include_str!("fixtures/fire_boss_skills.txt");
    let lines = parse_skill_block(src, ParserOptions::default());
    assert_eq!(lines.len(), 6);
    assert_eq!(lines[0].line, 2);
    assert_eq!(lines[3].line, 7);

    let skills: Vec<SkillLineAst> = lines
        .into_iter()
        .map(|l| {
            let out = l.outcome.expect("lex ok");
            assert!(out.is_ok(), "line {}: {:?}", l.line, out.errors);
            out.ast
        })
        .collect();
    let actual = render_skill_block(&skills);
    let expected = include_str!("fixtures/fire_boss_skills.canonical.txt");
    assert_eq!(actual, expected);
}

#[test]
fn canonical_block_is_a_fixed_point() {
    let canonical = include_str!("fixtures/fire_boss_skills.canonical.txt");
    let skills: Vec<SkillLineAst> = parse_skill_block(canonical, ParserOptions::default())
        .into_iter()
        .map(|l| l.outcome.expect("lex ok").ast)
        .collect();
    assert_eq!(render_skill_block(&skills), canonical);
}
