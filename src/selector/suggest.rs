//! Alternative selectors for selectors that match nothing

use crate::dom::DomTree;
use indexmap::IndexSet;

/// Upper bound on returned suggestions
pub const MAX_SUGGESTIONS: usize = 5;

/// Structural tags scanned by [`SuggestionStrategy::CommonContainers`], in order
pub const COMMON_CONTAINER_TAGS: [&str; 7] = ["header", "footer", "main", "section", "div", "nav", "aside"];

/// Ways of finding an alternative for a selector, in order of preference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionStrategy {
    /// Classes containing the selector's trailing class name
    TrailingClassFragment,
    /// The selector's leading token as a bare tag name
    LeadingTag,
    /// `tag.firstClass` for classed structural elements
    CommonContainers,
    /// `#id` for every element with an id
    IdAttributes,
}

impl SuggestionStrategy {
    /// Precedence used by [`suggest`]
    pub const ORDER: [SuggestionStrategy; 4] = [
        SuggestionStrategy::TrailingClassFragment,
        SuggestionStrategy::LeadingTag,
        SuggestionStrategy::CommonContainers,
        SuggestionStrategy::IdAttributes,
    ];

    /// Candidate selectors, not yet verified against the tree
    pub fn candidates(&self, tree: &DomTree, selector: &str) -> Vec<String> {
        match self {
            SuggestionStrategy::TrailingClassFragment => trailing_class_candidates(tree, selector),
            SuggestionStrategy::LeadingTag => leading_tag_candidates(tree, selector),
            SuggestionStrategy::CommonContainers => common_container_candidates(tree),
            SuggestionStrategy::IdAttributes => tree
                .elements()
                .filter_map(|e| e.id())
                .filter(|id| !id.is_empty())
                .map(|id| format!("#{}", id))
                .collect(),
        }
    }
}

/// Suggest up to [`MAX_SUGGESTIONS`] selectors that do resolve in `tree`
///
/// A selector that already resolves is returned as the only suggestion. An
/// empty result means no strategy produced a verified match.
pub fn suggest(tree: &DomTree, selector: &str) -> Vec<String> {
    if tree.matches(selector) {
        return vec![selector.trim().to_string()];
    }

    for strategy in SuggestionStrategy::ORDER {
        let verified: IndexSet<String> = strategy
            .candidates(tree, selector)
            .into_iter()
            .filter(|candidate| tree.matches(candidate))
            .collect();

        if !verified.is_empty() {
            log::debug!(
                "Suggestions for '{}' from {:?}: {} candidate(s)",
                selector,
                strategy,
                verified.len()
            );
            return verified.into_iter().take(MAX_SUGGESTIONS).collect();
        }
    }

    Vec::new()
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

/// Class name following the last `.` of the selector
fn trailing_class(selector: &str) -> Option<&str> {
    let (_, after) = selector.rsplit_once('.')?;
    let end = after.find(|c: char| !is_name_char(c)).unwrap_or(after.len());
    let class = &after[..end];
    (!class.is_empty()).then_some(class)
}

/// The trailing class, then successively shorter prefixes split on `-` or `_`
fn class_fragments(class: &str) -> Vec<&str> {
    let mut fragments = vec![class];
    let mut current = class;
    while let Some(idx) = current.rfind(['-', '_']) {
        current = &current[..idx];
        if current.is_empty() {
            break;
        }
        fragments.push(current);
    }
    fragments
}

fn trailing_class_candidates(tree: &DomTree, selector: &str) -> Vec<String> {
    let Some(class) = trailing_class(selector) else {
        return Vec::new();
    };

    for fragment in class_fragments(class) {
        let candidates: Vec<String> = tree
            .elements()
            .flat_map(|e| e.classes())
            .filter(|cls| cls.contains(fragment))
            .map(|cls| format!(".{}", cls))
            .collect();
        if !candidates.is_empty() {
            return candidates;
        }
    }
    Vec::new()
}

fn leading_tag_candidates(tree: &DomTree, selector: &str) -> Vec<String> {
    let trimmed = selector.trim_start();
    let end = trimmed.find(|c: char| !is_name_char(c)).unwrap_or(trimmed.len());
    let tag = &trimmed[..end];
    if tag.is_empty() || !tag.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return Vec::new();
    }

    if tree.elements().any(|e| e.is_tag(tag)) {
        vec![tag.to_ascii_lowercase()]
    } else {
        Vec::new()
    }
}

fn common_container_candidates(tree: &DomTree) -> Vec<String> {
    COMMON_CONTAINER_TAGS
        .iter()
        .flat_map(|&tag| {
            tree.elements()
                .filter(move |e| e.is_tag(tag))
                .filter_map(move |e| e.classes().next().map(|cls| format!("{}.{}", tag, cls)))
        })
        .collect()
}
