use crate::{js_string_literal, ExternalMap};

/// Source of the vendor entry: one namespace object literal, one `require`
/// binding per line, in request order.
pub fn generate_entry_template(namespace: &str, externals: &ExternalMap) -> String {
    let mut lines = Vec::with_capacity(externals.len() + 2);
    lines.push(format!("window[{}] = {{", js_string_literal(namespace)));
    externals.iter().for_each(|(request, resolved)| {
        lines.push(format!(
            "{}: require({}),",
            js_string_literal(request),
            js_string_literal(resolved)
        ));
    });
    lines.push("}".to_string());
    lines.join("\n")
}
