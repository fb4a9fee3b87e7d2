use skilline_data::ParamValue;

/// Strip the delimiters from a quoted token and decode backslash escapes.
///
/// An escaped character passes through as itself, so `\"` yields `"` and
/// `\\` yields `\`.
pub(crate) fn unescape(quoted: &str) -> String {
    let mut chars = quoted.chars();
    let open = chars.next();
    let mut inner: Vec<char> = chars.collect();
    if open.is_some() && inner.last() == open.as_ref() {
        inner.pop();
    }
    let mut out = String::with_capacity(inner.len());
    let mut escape = false;
    for ch in inner {
        if escape {
            out.push(ch);
            escape = false;
        } else if ch == '\\' {
            escape = true;
        } else {
            out.push(ch);
        }
    }
    out
}

pub(crate) fn is_bool_word(text: &str) -> bool {
    text.eq_ignore_ascii_case("true") || text.eq_ignore_ascii_case("false")
}

/// Typed value of a NUMBER token: percentages stay text, a `.` makes a float.
pub(super) fn number_value(text: &str) -> ParamValue {
    if text.ends_with('%') {
        return ParamValue::Text(text.to_string());
    }
    if text.contains('.') {
        return text
            .parse::<f64>()
            .map_or_else(|_| ParamValue::Text(text.to_string()), ParamValue::Float);
    }
    text.parse::<i64>()
        .map_or_else(|_| ParamValue::Text(text.to_string()), ParamValue::Int)
}

/// Typed value of a bare identifier.
pub(super) fn word_value(text: &str) -> ParamValue {
    if is_bool_word(text) {
        ParamValue::Bool(text.eq_ignore_ascii_case("true"))
    } else {
        ParamValue::Text(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unescape_strips_delimiters_and_escapes() {
        assert_eq!(unescape(r#""say \"hi\"""#), r#"say "hi""#);
        assert_eq!(unescape(r"'a\\b'"), r"a\b");
        assert_eq!(unescape(r#""\n""#), "n");
        assert_eq!(unescape(r#""""#), "");
    }

    #[test]
    fn number_coercion() {
        assert_eq!(number_value("10"), ParamValue::Int(10));
        assert_eq!(number_value("-2.5"), ParamValue::Float(-2.5));
        assert_eq!(number_value("50%"), ParamValue::Text("50%".into()));
        assert_eq!(
            number_value("99999999999999999999"),
            ParamValue::Text("99999999999999999999".into())
        );
    }

    #[test]
    fn word_coercion() {
        assert_eq!(word_value("TRUE"), ParamValue::Bool(true));
        assert_eq!(word_value("False"), ParamValue::Bool(false));
        assert_eq!(word_value("magic"), ParamValue::Text("magic".into()));
    }
}
