/// Substitute handed back to the host for an externalized request: a `var`
/// style external whose value is looked up at runtime in the shared
/// namespace object, keyed by the original request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalReference {
    pub request: String,
    pub expression: String,
}

impl ExternalReference {
    pub fn global(namespace: &str, request: &str) -> Self {
        Self {
            request: request.to_string(),
            expression: format!(
                "window[{}][{}]",
                js_string_literal(namespace),
                js_string_literal(request)
            ),
        }
    }
}

/// Single-quoted JS string literal.
pub fn js_string_literal(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('\'');
    for ch in value.chars() {
        match ch {
            '\'' => quoted.push_str("\\'"),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\u{2028}' => quoted.push_str("\\u2028"),
            '\u{2029}' => quoted.push_str("\\u2029"),
            _ => quoted.push(ch),
        }
    }
    quoted.push('\'');
    quoted
}
