//! `{{key}}` placeholder substitution for generated text.

use crate::domain::entities::properties::Properties;

/// Substitute `{{key}}` placeholders with scalar property values.
///
/// Strings are inserted verbatim, numbers and booleans through `Display`.
/// Unknown keys and null, map or list values leave the placeholder as is.
pub fn render_placeholders(text: &str, props: &Properties) -> String {
    let mut result = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find("{{") {
        result.push_str(&rest[..start]);
        let after_open = &rest[start + 2..];

        let Some(end) = after_open.find("}}") else {
            rest = &rest[start..];
            break;
        };

        let key = after_open[..end].trim();
        match props.get(key).and_then(|v| v.as_scalar_string()) {
            Some(value) => result.push_str(&value),
            None => result.push_str(&rest[start..start + 2 + end + 2]),
        }
        rest = &after_open[end + 2..];
    }

    result.push_str(rest);
    result
}
