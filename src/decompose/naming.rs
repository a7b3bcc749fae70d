/// Extension shared by applet fragments and the view template
pub const TEMPLATE_EXTENSION: &str = "swt";

/// File name of the rewritten shell document
pub const VIEW_TEMPLATE_FILE: &str = "view_template.swt";

/// Normalize a manifest name into a file and include-safe token
///
/// Surrounding whitespace is trimmed, every character outside
/// `[A-Za-z0-9_-]` becomes `_`, and the result is lower-cased. Distinct names
/// can normalize to the same token.
pub fn normalize_name(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// `applet_{normalized}.swt`
pub fn applet_file_name(normalized_name: &str) -> String {
    format!("applet_{}.{}", normalized_name, TEMPLATE_EXTENSION)
}
