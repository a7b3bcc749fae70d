//! Cross-check a manifest against the document it describes

use crate::dom::DomTree;
use crate::manifest::{FlatEntry, Manifest, ManifestNode};
use crate::selector::suggest;
use serde::{Deserialize, Serialize};

/// Alternatives for one selector that failed to resolve
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorSuggestion {
    /// Composed selector that matched nothing
    pub expected: String,
    /// Selectors that do resolve, in strategy order
    pub similar: Vec<String>,
    /// Manifest node the selector belongs to
    pub container_name: String,
}

/// Outcome of a validation pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// False iff `missing` is non-empty
    pub valid: bool,
    pub missing: Vec<String>,
    pub suggestions: Vec<SelectorSuggestion>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    fn new() -> Self {
        Self {
            valid: true,
            ..Default::default()
        }
    }

    fn record_missing(&mut self, tree: &DomTree, selector: &str, name: &str) {
        self.valid = false;
        self.missing.push(selector.to_string());

        let similar = suggest(tree, selector);
        if similar.is_empty() {
            self.warnings.push(format!("No similar selectors found for {}", selector));
        } else {
            self.suggestions.push(SelectorSuggestion {
                expected: selector.to_string(),
                similar,
                container_name: name.to_string(),
            });
        }
    }
}

/// A child's selector is its ancestors' selectors joined by single spaces
pub fn compose_selector(parent: &str, selector: &str) -> String {
    if parent.is_empty() {
        selector.trim().to_string()
    } else {
        format!("{} {}", parent, selector).trim().to_string()
    }
}

/// Validate every node of a hierarchical manifest
///
/// Composed selectors are resolved against the whole tree. Neither the tree
/// nor the manifest is modified.
pub fn validate(tree: &DomTree, manifest: &Manifest) -> ValidationReport {
    let mut report = ValidationReport::new();
    for container in &manifest.containers {
        validate_node(tree, container, "", &mut report);
    }
    log::debug!(
        "Validated {} manifest node(s): {} missing",
        manifest.count_nodes(),
        report.missing.len()
    );
    report
}

fn validate_node(tree: &DomTree, node: &ManifestNode, parent: &str, report: &mut ValidationReport) {
    let full_selector = compose_selector(parent, &node.selector);

    if tree.matches(&full_selector) {
        if let Some(item) = &node.item_selector {
            let rows = compose_selector(&full_selector, item);
            if !tree.matches(&rows) {
                report
                    .warnings
                    .push(format!("No rows matched item selector {} in {}", item, full_selector));
            }
        }
    } else {
        report.record_missing(tree, &full_selector, &node.name);
    }

    for child in &node.children {
        validate_node(tree, child, &full_selector, report);
    }
}

/// Validate the entries of a flat manifest
pub fn validate_flat(tree: &DomTree, entries: &[FlatEntry]) -> ValidationReport {
    let mut report = ValidationReport::new();
    for entry in entries {
        let selector = entry.selector.trim();
        if !tree.matches(selector) {
            report.record_missing(tree, selector, &entry.name);
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::Role;

    fn tree() -> DomTree {
        DomTree::parse(concat!(
            "<div class=\"hdr\"><div class=\"nav\">X</div></div>",
            "<section class=\"missing-box\"><table><tr><td>1</td></tr></table></section>"
        ))
    }

    #[test]
    fn test_valid_manifest() {
        let manifest = Manifest::new(vec![
            ManifestNode::new("Header", ".hdr").with_child(ManifestNode::new("Nav", ".nav")),
        ]);
        let report = validate(&tree(), &manifest);

        assert!(report.valid);
        assert!(report.missing.is_empty());
        assert!(report.suggestions.is_empty());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_composed_selectors_are_reported() {
        let manifest = Manifest::new(vec![
            ManifestNode::new("Header", ".hdr")
                .with_child(ManifestNode::new("Nav", ".nav"))
                .with_child(ManifestNode::new("Search", ".missing-thing")),
        ]);
        let report = validate(&tree(), &manifest);

        assert!(!report.valid);
        assert_eq!(report.missing, vec![".hdr .missing-thing"]);
        assert_eq!(report.suggestions.len(), 1);
        assert_eq!(report.suggestions[0].expected, ".hdr .missing-thing");
        assert_eq!(report.suggestions[0].container_name, "Search");
        assert!(report.suggestions[0].similar.contains(&".missing-box".to_string()));
    }

    #[test]
    fn test_children_of_missing_container_compose_with_it() {
        let manifest = Manifest::new(vec![
            ManifestNode::new("Footer", ".ftr").with_child(ManifestNode::new("Links", ".nav")),
        ]);
        let report = validate(&tree(), &manifest);

        assert_eq!(report.missing, vec![".ftr", ".ftr .nav"]);
        assert_eq!(report.valid, report.missing.is_empty());
    }

    #[test]
    fn test_warning_when_no_suggestions() {
        let tree = DomTree::parse("<p>plain</p>");
        let manifest = Manifest::new(vec![ManifestNode::new("Header", ".hdr")]);
        let report = validate(&tree, &manifest);

        assert!(!report.valid);
        assert!(report.suggestions.is_empty());
        assert_eq!(report.warnings, vec!["No similar selectors found for .hdr"]);
    }

    #[test]
    fn test_malformed_selector_counts_as_missing() {
        let manifest = Manifest::new(vec![ManifestNode::new("Header", ".hdr:first")]);
        let report = validate(&tree(), &manifest);

        assert!(!report.valid);
        assert_eq!(report.missing, vec![".hdr:first"]);
        assert_eq!(report.suggestions[0].similar, vec![".hdr"]);
    }

    #[test]
    fn test_item_selector_warning_does_not_invalidate() {
        let manifest = Manifest::new(vec![
            ManifestNode::new("Grid", ".missing-box")
                .with_role(Role::Grid)
                .with_item_selector("li"),
        ]);
        let report = validate(&tree(), &manifest);

        assert!(report.valid);
        assert_eq!(report.warnings, vec!["No rows matched item selector li in .missing-box"]);
    }

    #[test]
    fn test_validation_is_repeatable() {
        let tree = tree();
        let manifest = Manifest::new(vec![ManifestNode::new("Gone", ".gone")]);
        let before = tree.clone();

        let first = validate(&tree, &manifest);
        let second = validate(&tree, &manifest);

        assert_eq!(first, second);
        assert_eq!(tree, before);
    }

    #[test]
    fn test_flat_validation() {
        let entries = vec![
            FlatEntry::new("Nav", ".nav", Role::Navigation),
            FlatEntry::new("Gone", "#gone", Role::Generic),
        ];
        let report = validate_flat(&tree(), &entries);

        assert!(!report.valid);
        assert_eq!(report.missing, vec!["#gone"]);
        assert_eq!(report.suggestions[0].container_name, "Gone");
    }

    #[test]
    fn test_compose_selector() {
        assert_eq!(compose_selector("", ".a"), ".a");
        assert_eq!(compose_selector(".a", ".b"), ".a .b");
        assert_eq!(compose_selector(".a .b", " > .c"), ".a .b  > .c");
    }
}
