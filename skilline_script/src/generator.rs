//! Canonical text for skill-line ASTs.

use skilline_data::{ParamValue, Params, SkillLineAst};

use crate::lexer::{TokenKind, tokenize};
use crate::parser::is_bool_word;

/// Render an AST as one canonical skill line.
///
/// Components appear in grammar order separated by single spaces; absent
/// fields and empty `{}` groups are left out.
///
/// ```
/// use skilline_data::{SkillLineAst, Targeter};
/// use skilline_script::generate_skill_line;
///
/// let ast = SkillLineAst::new("damage")
///     .with_param("amount", 10)
///     .with_param("type", "magic")
///     .with_targeter(Targeter::new("target"))
///     .with_chance(1.0);
/// assert_eq!(generate_skill_line(&ast), "damage{amount=10;type=magic} @target 1.0");
/// ```
pub fn generate_skill_line(ast: &SkillLineAst) -> String {
    let mut parts = Vec::new();

    let mut head = ast.mechanic.clone();
    if let Some(params) = ast.parameters.as_ref().filter(|p| !p.is_empty()) {
        head.push_str(&render_params(params));
    }
    parts.push(head);

    if let Some(targeter) = &ast.targeter {
        let mut t = format!("@{}", targeter.kind);
        if let Some(options) = targeter.options.as_ref().filter(|o| !o.is_empty()) {
            t.push_str(&render_params(options));
        }
        parts.push(t);
    }

    if let Some(trigger) = &ast.trigger {
        parts.push(format!("~{trigger}"));
    }

    for condition in &ast.inline_conditions {
        parts.push(format!("?{condition}"));
    }

    if let Some(health) = &ast.health_modifier {
        parts.push(format!("{}{}", health.op.symbol(), health.value));
    }

    if let Some(chance) = ast.chance {
        parts.push(format_float(chance));
    }

    parts.join(" ")
}

/// One `- <line>` entry per skill, newline terminated.
pub fn render_skill_block(skills: &[SkillLineAst]) -> String {
    skills
        .iter()
        .map(|s| format!("- {}\n", generate_skill_line(s)))
        .collect()
}

fn render_params(params: &Params) -> String {
    let body: Vec<String> = params.iter().map(|(k, v)| format!("{k}={}", render_value(v))).collect();
    format!("{{{}}}", body.join(";"))
}

pub(crate) fn render_value(value: &ParamValue) -> String {
    match value {
        ParamValue::Bool(b) => b.to_string(),
        ParamValue::Int(i) => i.to_string(),
        ParamValue::Float(f) => format_float(*f),
        ParamValue::Text(s) => quote_if_needed(s),
        ParamValue::List(items) => format!("[{}]", items.join(" ")),
    }
}

/// Floats always carry a decimal point so they lex back as floats.
fn format_float(value: f64) -> String {
    let text = value.to_string();
    if value.is_finite() && !text.contains('.') {
        format!("{text}.0")
    } else {
        text
    }
}

/// Bare when the text lexes back as the same single text-valued token.
fn quote_if_needed(text: &str) -> String {
    let bare = match tokenize(text).as_deref() {
        Ok([tok, eof]) if eof.is(TokenKind::Eof) && tok.text == text => match tok.kind {
            TokenKind::Identifier => !is_bool_word(text),
            TokenKind::Number => text.ends_with('%'),
            _ => false,
        },
        _ => false,
    };
    if bare {
        return text.to_string();
    }
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for ch in text.chars() {
        if matches!(ch, '"' | '\\') {
            quoted.push('\\');
        }
        quoted.push(ch);
    }
    quoted.push('"');
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;
    use skilline_data::{HealthModifier, HealthOp, InlineCondition, Targeter, Trigger};

    #[test]
    fn text_quoting_rules() {
        assert_eq!(quote_if_needed("magic"), "magic");
        assert_eq!(quote_if_needed("effect:particles"), "effect:particles");
        assert_eq!(quote_if_needed("50%"), "50%");
        assert_eq!(quote_if_needed("10"), "\"10\"");
        assert_eq!(quote_if_needed("true"), "\"true\"");
        assert_eq!(quote_if_needed("two words"), "\"two words\"");
        assert_eq!(quote_if_needed("a;b"), "\"a;b\"");
        assert_eq!(quote_if_needed(""), "\"\"");
        assert_eq!(quote_if_needed("say \"hi\" \\o/"), r#""say \"hi\" \\o/""#);
    }

    #[test]
    fn floats_keep_a_decimal_point() {
        assert_eq!(format_float(1.0), "1.0");
        assert_eq!(format_float(0.25), "0.25");
        assert_eq!(format_float(-3.0), "-3.0");
    }

    #[test]
    fn values_render_by_variant() {
        assert_eq!(render_value(&ParamValue::Bool(false)), "false");
        assert_eq!(render_value(&ParamValue::Int(-4)), "-4");
        assert_eq!(render_value(&ParamValue::List(vec!["a".into(), "b".into()])), "[a b]");
    }

    #[test]
    fn all_components_in_order() {
        let ast = SkillLineAst::new("effect:particles")
            .with_param("p", "flame")
            .with_param("a", 20)
            .with_targeter(Targeter::new("PIR").with_option("r", 5))
            .with_trigger(Trigger::with_value("onTimer", "100"))
            .with_condition(InlineCondition::negated("raining"))
            .with_health(HealthModifier::new(HealthOp::Equal, "30%-50%"))
            .with_chance(0.5);
        assert_eq!(
            generate_skill_line(&ast),
            "effect:particles{p=flame;a=20} @PIR{r=5} ~onTimer:100 ?!raining =30%-50% 0.5"
        );
    }

    #[test]
    fn empty_groups_are_omitted() {
        let mut ast = SkillLineAst::new("heal").with_targeter(Targeter::new("self"));
        ast.parameters = Some(Params::new());
        if let Some(t) = ast.targeter.as_mut() {
            t.options = Some(Params::new());
        }
        assert_eq!(generate_skill_line(&ast), "heal @self");
    }

    #[test]
    fn block_prefixes_each_line() {
        let skills = vec![SkillLineAst::new("heal").with_param("amount", 1), SkillLineAst::new("leap")];
        assert_eq!(render_skill_block(&skills), "- heal{amount=1}\n- leap\n");
    }
}
