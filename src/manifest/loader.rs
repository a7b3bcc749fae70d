//! Tolerant manifest loading
//!
//! Model output is "almost JSON": it may arrive inside a markdown fence, carry
//! `//` or `/* */` comments, trailing commas, or prose around the object. A
//! strict parse is tried first; only on failure is the text sanitized and
//! parsed again.

use crate::assemble::read_lossy;
use crate::error::{Result, TemplateError};
use crate::manifest::{FlatEntry, Manifest, ManifestDocument};
use regex::Regex;
use serde_json::Value;
use std::path::Path;
use std::sync::LazyLock;

/// Hint attached to unparseable manifest errors
pub const MANIFEST_HINT: &str = "Remove comments/trailing commas or paste a clean JSON.";

static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^\s*```(?:json)?\s*|\s*```\s*$").expect("code fence pattern is valid")
});

fn unparseable(reason: impl Into<String>) -> TemplateError {
    TemplateError::ManifestUnparseable {
        reason: reason.into(),
        hint: MANIFEST_HINT.to_string(),
    }
}

/// Strip fences, comments and trailing commas, then keep the first JSON block
pub fn sanitize_json(text: &str) -> String {
    let unfenced = CODE_FENCE.replace_all(text, "");
    let without_comments = strip_comments(&unfenced);
    let without_commas = strip_trailing_commas(&without_comments);
    extract_first_block(without_commas.trim()).to_string()
}

/// Parse JSON, retrying once on the sanitized text
pub fn parse_lenient(text: &str) -> Result<Value> {
    match serde_json::from_str::<Value>(text) {
        Ok(value) => Ok(value),
        Err(strict_err) => {
            log::debug!("Strict manifest parse failed ({}), sanitizing", strict_err);
            let cleaned = sanitize_json(text);
            serde_json::from_str::<Value>(&cleaned).map_err(|e| unparseable(e.to_string()))
        }
    }
}

/// Load a manifest of either shape from text
pub fn load_manifest(text: &str) -> Result<ManifestDocument> {
    let value = parse_lenient(text)?;
    match value {
        Value::Array(_) => {
            let entries: Vec<FlatEntry> = serde_json::from_value(value).map_err(|e| unparseable(e.to_string()))?;
            Ok(ManifestDocument::Flat(entries))
        }
        Value::Object(_) => {
            let manifest: Manifest = serde_json::from_value(value).map_err(|e| unparseable(e.to_string()))?;
            Ok(ManifestDocument::Hierarchical(manifest))
        }
        other => Err(unparseable(format!(
            "expected an object or array at the top level, found {}",
            json_kind(&other)
        ))),
    }
}

/// Load a manifest from disk
pub fn load_manifest_file(path: &Path) -> Result<ManifestDocument> {
    if !path.is_file() {
        return Err(TemplateError::MissingInput(format!("{} not found", path.display())));
    }
    let text = read_lossy(path).map_err(|e| TemplateError::io(path, e))?;
    load_manifest(&text)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Remove `//` and `/* */` comments outside string literals
fn strip_comments(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if in_string {
            out.push(c);
            if c == '\\' {
                if let Some(&next) = chars.get(i + 1) {
                    out.push(next);
                    i += 1;
                }
            } else if c == '"' {
                in_string = false;
            }
            i += 1;
            continue;
        }
        match (c, chars.get(i + 1).copied()) {
            ('"', _) => {
                in_string = true;
                out.push(c);
                i += 1;
            }
            ('/', Some('/')) => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            ('/', Some('*')) => {
                i += 2;
                while i < chars.len() && !(chars[i] == '*' && chars.get(i + 1) == Some(&'/')) {
                    i += 1;
                }
                i += 2;
            }
            _ => {
                out.push(c);
                i += 1;
            }
        }
    }
    out
}

/// Remove commas directly followed (modulo whitespace) by `}` or `]`
fn strip_trailing_commas(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;
    for (i, &c) in chars.iter().enumerate() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        if c == '"' {
            in_string = true;
        } else if c == ',' {
            let next = chars[i + 1..].iter().copied().find(|ch| !ch.is_whitespace());
            if matches!(next, Some('}') | Some(']')) {
                continue;
            }
        }
        out.push(c);
    }
    out
}

/// First balanced `{...}` or `[...]` block; through the last closer if unbalanced
fn extract_first_block(text: &str) -> &str {
    let Some(start) = block_start(text) else {
        return text;
    };

    let mut stack = Vec::new();
    let mut in_string = false;
    let mut escaped = false;
    for (offset, c) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => stack.push('}'),
            '[' => stack.push(']'),
            '}' | ']' => {
                if stack.pop() != Some(c) {
                    break;
                }
                if stack.is_empty() {
                    return &text[start..start + offset + c.len_utf8()];
                }
            }
            _ => {}
        }
    }

    match text.rfind(['}', ']']) {
        Some(end) if end > start => &text[start..=end],
        _ => &text[start..],
    }
}

/// Start of the manifest block
///
/// The first `{` wins, so brackets in surrounding prose are ignored. An array
/// is taken only when the text starts with `[`, when `[` directly opens the
/// first object, or when there is no object at all.
fn block_start(text: &str) -> Option<usize> {
    if text.trim_start().starts_with('[') {
        return text.find('[');
    }
    let Some(brace) = text.find('{') else {
        return text.find('[');
    };
    let before = &text[..brace];
    match before.trim_end().strip_suffix('[') {
        Some(head) => Some(head.len()),
        None => Some(brace),
    }
}
