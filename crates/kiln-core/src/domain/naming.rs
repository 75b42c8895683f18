//! Name derivation for generated services.

/// Service name for an application, optionally scoped to a sub-folder.
///
/// | application | sub_folder | result |
/// |-------------|------------|--------|
/// | "shop" | `None` | "shop" |
/// | "My Shop" | "api" | "my-shop-api" |
/// | "shop" | "  " | "shop" |
pub fn derive_service_name(application: &str, sub_folder: Option<&str>) -> String {
    match sub_folder.map(str::trim).filter(|s| !s.is_empty()) {
        Some(sub) => to_kebab_case(&format!("{application}-{sub}")),
        None => to_kebab_case(application),
    }
}

/// Convert a string to kebab-case.
///
/// Used for service names, directory names and artifact ids.
pub fn to_kebab_case(s: &str) -> String {
    split_words(s).join("-")
}

/// Split a string into lowercase words.
///
/// ## Word Boundary Detection
///
/// 1. **Separators:** any non-alphanumeric character (`_`, `-`, `.`, whitespace)
/// 2. **camelCase:** `aB` → split between `a` and `B`
/// 3. **Acronym boundary:** `HTTPRequest` → split between `P` and `R`
///    (detected by `Upper Upper Lower` pattern)
fn split_words(input: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();

    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(current.to_lowercase());
                current.clear();
            }
            continue;
        }

        if let Some(next) = chars.peek() {
            // "myApp" → "my" + "App"
            if c.is_lowercase() && next.is_uppercase() {
                current.push(c);
                words.push(current.to_lowercase());
                current.clear();
                continue;
            }

            // "HTTPServer" → "HTTP" + "Server"
            if c.is_uppercase()
                && next.is_uppercase()
                && chars.clone().nth(1).is_some_and(|n| n.is_lowercase())
            {
                current.push(c);
                words.push(current.to_lowercase());
                current.clear();
                continue;
            }
        }

        current.push(c);
    }

    if !current.is_empty() {
        words.push(current.to_lowercase());
    }

    words
}
