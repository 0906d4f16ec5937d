use std::collections::BTreeMap;

/// Variable map for one rendering unit.
///
/// Ordered so that building and logging the map is deterministic.
pub type VarMap = BTreeMap<String, String>;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";
const IF_MARKER: &str = "{{#if";
const END_IF: &str = "{{/if}}";

/// Render a template against a variable map.
///
/// Two passes: literal `{{name}}` substitution, then conditional-block
/// evaluation. Both degrade rather than fail — a letter is always produced.
#[must_use]
pub fn render(template: &str, vars: &VarMap) -> String {
    let substituted = substitute_placeholders(template, vars);
    apply_conditionals(&substituted, vars)
}

/// Case-sensitive ASCII identifier: alphanumerics and underscores.
#[must_use]
pub fn is_identifier(token: &str) -> bool {
    !token.is_empty()
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Truthiness for conditional blocks: defined, non-empty, non-zero.
#[must_use]
pub fn is_truthy(value: Option<&str>) -> bool {
    match value {
        Some(raw) => {
            let trimmed = raw.trim();
            !trimmed.is_empty()
                && trimmed != "0"
                && !trimmed.eq_ignore_ascii_case("false")
        }
        None => false,
    }
}

/// All identifiers a template references, in first-occurrence order.
///
/// Covers both plain placeholders and conditional markers; the template
/// library uses this to cross-check declared variable lists at load time.
#[must_use]
pub fn extract_placeholders(template: &str) -> Vec<String> {
    let mut found = Vec::new();
    let mut rest = template;
    while let Some(start) = rest.find(OPEN) {
        let after_open = &rest[start + OPEN.len()..];
        let Some(end) = after_open.find(CLOSE) else {
            break;
        };
        let inner = after_open[..end].trim();
        let name = inner
            .strip_prefix("#if")
            .map_or(inner, str::trim_start);
        if is_identifier(name) && !found.iter().any(|seen| seen == name) {
            found.push(name.to_string());
        }
        rest = &after_open[end + CLOSE.len()..];
    }
    found
}

/// Pass 1: replace every `{{name}}` token with its mapped value, empty string
/// for unknown names. Conditional markers and malformed tokens pass through
/// verbatim.
fn substitute_placeholders(template: &str, vars: &VarMap) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    loop {
        let Some(start) = rest.find(OPEN) else {
            out.push_str(rest);
            break;
        };
        out.push_str(&rest[..start]);
        let after_open = &rest[start + OPEN.len()..];
        let Some(end) = after_open.find(CLOSE) else {
            // Unterminated token: keep the tail verbatim.
            out.push_str(&rest[start..]);
            break;
        };
        let inner = &after_open[..end];
        if is_identifier(inner) {
            if let Some(value) = vars.get(inner) {
                out.push_str(value);
            }
        } else {
            // Conditional markers ("#if name", "/if") and anything malformed
            // survive this pass untouched.
            out.push_str(OPEN);
            out.push_str(inner);
            out.push_str(CLOSE);
        }
        rest = &after_open[end + CLOSE.len()..];
    }
    out
}

/// Pass 2: evaluate `{{#if name}}...{{/if}}` spans against the variable map.
///
/// The span body is kept verbatim when the variable is truthy and removed
/// entirely otherwise. An unterminated opener leaves the remaining text
/// untouched.
fn apply_conditionals(text: &str, vars: &VarMap) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    loop {
        let Some(start) = rest.find(IF_MARKER) else {
            out.push_str(rest);
            break;
        };
        out.push_str(&rest[..start]);
        let marker_tail = &rest[start + IF_MARKER.len()..];
        let parsed = marker_tail
            .starts_with(|c: char| c.is_ascii_whitespace())
            .then(|| marker_tail.find(CLOSE))
            .flatten()
            .and_then(|marker_end| {
                let name = marker_tail[..marker_end].trim();
                is_identifier(name).then(|| (name, &marker_tail[marker_end + CLOSE.len()..]))
            });
        let Some((name, body_and_tail)) = parsed else {
            // Malformed opener: emit it verbatim and move past "{{#if".
            out.push_str(IF_MARKER);
            rest = marker_tail;
            continue;
        };
        let Some(body_end) = body_and_tail.find(END_IF) else {
            // Unterminated span: leave everything from the opener untouched.
            out.push_str(&rest[start..]);
            break;
        };
        if is_truthy(vars.get(name).map(String::as_str)) {
            out.push_str(&body_and_tail[..body_end]);
        }
        rest = &body_and_tail[body_end + END_IF.len()..];
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn vars(pairs: &[(&str, &str)]) -> VarMap {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn substitutes_known_placeholders() {
        let out = render(
            "Dear {{bureau_name}}, re: {{creditor}}",
            &vars(&[("bureau_name", "Experian"), ("creditor", "Acme Bank")]),
        );
        assert_eq!(out, "Dear Experian, re: Acme Bank");
    }

    #[test]
    fn unknown_placeholders_become_empty_string() {
        let out = render("Hello {{missing}}!", &VarMap::new());
        assert_eq!(out, "Hello !");
    }

    #[test]
    fn rendering_is_deterministic() {
        let template = "{{a}} {{#if b}}kept{{/if}} {{c}}";
        let v = vars(&[("a", "x"), ("b", "1")]);
        assert_eq!(render(template, &v), render(template, &v));
    }

    #[test]
    fn truthy_conditional_keeps_body_and_removes_markers() {
        let out = render(
            "Before{{#if flag}}MIDDLE{{/if}}After",
            &vars(&[("flag", "yes")]),
        );
        assert_eq!(out, "BeforeMIDDLEAfter");
    }

    #[test]
    fn falsy_conditional_removes_entire_span() {
        let out = render("Before{{#if flag}}MIDDLE{{/if}}After", &VarMap::new());
        assert_eq!(out, "BeforeAfter");
    }

    #[test]
    fn zero_false_and_blank_are_falsy() {
        for falsy in ["0", "false", "FALSE", "", "   "] {
            let out = render("a{{#if x}}b{{/if}}c", &vars(&[("x", falsy)]));
            assert_eq!(out, "ac", "value {falsy:?} should be falsy");
        }
    }

    #[test]
    fn placeholders_inside_conditionals_substitute() {
        let out = render(
            "{{#if review}}Please route to {{reviewer}}.{{/if}}",
            &vars(&[("review", "1"), ("reviewer", "compliance desk")]),
        );
        assert_eq!(out, "Please route to compliance desk.");
    }

    #[test]
    fn sequential_conditionals_evaluate_independently() {
        let out = render(
            "{{#if a}}first{{/if}}-{{#if b}}second{{/if}}",
            &vars(&[("b", "1")]),
        );
        assert_eq!(out, "-second");
    }

    #[test]
    fn unterminated_conditional_leaves_tail_untouched() {
        let out = render("start {{#if x}}never closed", &vars(&[("x", "1")]));
        assert_eq!(out, "start {{#if x}}never closed");
    }

    #[test]
    fn unterminated_placeholder_is_verbatim() {
        let out = render("oops {{broken", &VarMap::new());
        assert_eq!(out, "oops {{broken");
    }

    #[test]
    fn non_identifier_tokens_pass_through() {
        let out = render("{{not valid}} stays", &VarMap::new());
        assert_eq!(out, "{{not valid}} stays");
    }

    #[test]
    fn identifiers_are_case_sensitive() {
        let out = render("{{Name}}|{{name}}", &vars(&[("name", "lower")]));
        assert_eq!(out, "|lower");
    }

    #[test]
    fn extracts_placeholders_in_order_without_duplicates() {
        let names = extract_placeholders(
            "{{client_name}} {{#if manual_review}}{{client_name}} {{reviewer}}{{/if}}",
        );
        assert_eq!(names, vec!["client_name", "manual_review", "reviewer"]);
    }
}
