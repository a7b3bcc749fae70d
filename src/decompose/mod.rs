//! Manifest-driven decomposition of a document into applet fragments
//!
//! Every pass works on two trees: the parsed lookup tree, which is only read,
//! and a deep clone (the view) that gets its component contents replaced by
//! include markers. Later entries always resolve against the untouched lookup
//! tree.

pub mod naming;
pub mod resolution;
pub mod wrapper;

pub use naming::{TEMPLATE_EXTENSION, VIEW_TEMPLATE_FILE, applet_file_name, normalize_name};
pub use resolution::{Resolution, ResolutionMap};
pub use wrapper::{AppletWrapper, IncludeMarker};

use crate::dom::{DomTree, ElementNode, NodePath};
use crate::manifest::{FlatEntry, Manifest, ManifestDocument, Role};
use crate::selector::Scope;
use serde::{Deserialize, Serialize};

/// One extracted component
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fragment {
    /// Manifest name as written
    pub name: String,
    pub normalized_name: String,
    pub role: Role,
    /// Inner HTML of the matched element
    pub body: String,
    /// `body` wrapped in the role's applet template
    pub template: String,
}

impl Fragment {
    fn from_element(name: &str, role: Role, element: &ElementNode) -> Self {
        let normalized_name = normalize_name(name);
        let body = element.inner_html();
        let template = AppletWrapper::for_role(role).render(&normalized_name, &body);
        Self {
            name: name.to_string(),
            normalized_name,
            role,
            body,
            template,
        }
    }

    /// `applet_{normalized}.swt`
    pub fn file_name(&self) -> String {
        applet_file_name(&self.normalized_name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryStatus {
    #[serde(rename = "ok")]
    Ok,
    #[serde(rename = "not found")]
    NotFound,
}

/// Per-entry result of a decomposition pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryOutcome {
    pub name: String,
    pub normalized_name: String,
    pub status: EntryStatus,
}

/// Fragments plus the rewritten shell
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Decomposition {
    pub fragments: Vec<Fragment>,
    pub entries: Vec<EntryOutcome>,
    /// Serialized view document
    pub shell: String,
}

impl Decomposition {
    /// Number of entries whose selector matched nothing
    pub fn not_found(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.status == EntryStatus::NotFound)
            .count()
    }
}

/// Decompose with whichever pipeline matches the manifest's shape
pub fn decompose(tree: &DomTree, manifest: &ManifestDocument) -> Decomposition {
    match manifest {
        ManifestDocument::Hierarchical(manifest) => decompose_hierarchy(tree, manifest),
        ManifestDocument::Flat(entries) => decompose_flat(tree, entries),
    }
}

/// Flat pipeline: every entry resolves against the whole document
///
/// Unmatched entries are reported as not found and produce no fragment. In the
/// view, each matched element is emptied and receives an include comment.
pub fn decompose_flat(tree: &DomTree, entries: &[FlatEntry]) -> Decomposition {
    let mut view = ViewTree::new(tree);
    let mut fragments = Vec::new();
    let mut outcomes = Vec::with_capacity(entries.len());

    for entry in entries {
        let normalized_name = normalize_name(&entry.name);
        let resolution = Resolution::resolve(tree, Scope::Document, &entry.selector, entry.role);
        let Some((path, element)) = resolution
            .target
            .as_ref()
            .and_then(|path| Some((path, tree.node_at(path)?)))
        else {
            log::warn!("Component '{}' not found for selector '{}'", entry.name, entry.selector);
            outcomes.push(EntryOutcome {
                name: entry.name.clone(),
                normalized_name,
                status: EntryStatus::NotFound,
            });
            continue;
        };

        let fragment = Fragment::from_element(&entry.name, entry.role, element);
        log::debug!("Extracted '{}' as {}", entry.name, fragment.file_name());

        match view.clear(path) {
            Some(view_element) => {
                view_element.append(IncludeMarker::new(&fragment.normalized_name).to_comment());
            }
            None => log::debug!("'{}' no longer present in the view", entry.selector),
        }

        outcomes.push(EntryOutcome {
            name: entry.name.clone(),
            normalized_name,
            status: EntryStatus::Ok,
        });
        fragments.push(fragment);
    }

    Decomposition {
        fragments,
        entries: outcomes,
        shell: view.tree.to_html(),
    }
}

/// Hierarchical pipeline: children resolve only inside their container
///
/// The container's view element is emptied and gets one include element per
/// matched child, in manifest order. Missing containers and children are
/// skipped without an entry.
pub fn decompose_hierarchy(tree: &DomTree, manifest: &Manifest) -> Decomposition {
    let mut view = ViewTree::new(tree);
    let mut fragments = Vec::new();
    let mut outcomes = Vec::new();

    for container in &manifest.containers {
        let scope = Resolution::resolve(tree, Scope::Document, &container.selector, container.role);
        let Some(scope_path) = scope.target else {
            log::warn!("Container '{}' not found for selector '{}'", container.name, container.selector);
            continue;
        };
        let Some(view_container) = view.clear(&scope_path) else {
            log::warn!("Container '{}' no longer present in the view", container.name);
            continue;
        };

        let children = ResolutionMap::for_children(tree, &scope_path, &container.children);
        for name in children.unresolved() {
            log::debug!("Child '{}' of '{}' not found, skipping", name, container.name);
        }

        for (name, resolution, path) in children.resolved() {
            let Some(element) = tree.node_at(path) else {
                continue;
            };
            let fragment = Fragment::from_element(name, resolution.role, element);
            view_container.add_child(IncludeMarker::new(&fragment.normalized_name).to_element());

            outcomes.push(EntryOutcome {
                name: name.clone(),
                normalized_name: fragment.normalized_name.clone(),
                status: EntryStatus::Ok,
            });
            fragments.push(fragment);
        }
    }

    Decomposition {
        fragments,
        entries: outcomes,
        shell: view.tree.to_html(),
    }
}

/// The view copy plus the elements already emptied in it
///
/// Lookup paths stay valid on the clone except below an emptied element, whose
/// original descendants are gone.
struct ViewTree {
    tree: DomTree,
    cleared: Vec<NodePath>,
}

impl ViewTree {
    fn new(tree: &DomTree) -> Self {
        Self {
            tree: tree.clone(),
            cleared: Vec::new(),
        }
    }

    /// Empty the element at `path`; `None` if an earlier clear removed it
    fn clear(&mut self, path: &NodePath) -> Option<&mut ElementNode> {
        if self.cleared.iter().any(|done| done.is_strict_ancestor_of(path)) {
            return None;
        }
        self.cleared.push(path.clone());
        let element = self.tree.node_at_mut(path)?;
        element.clear();
        Some(element)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{ManifestNode, load_manifest};

    #[test]
    fn test_hierarchical_end_to_end_example() {
        let manifest = load_manifest(
            r#"{"containers":[{"name":"Header","selector":".hdr","children":[{"name":"Nav","selector":".nav"}]}]}"#,
        )
        .unwrap();
        let tree = DomTree::parse(r#"<div class="hdr"><div class="nav">X</div></div>"#);

        let result = decompose(&tree, &manifest);

        assert_eq!(result.fragments.len(), 1);
        let fragment = &result.fragments[0];
        assert_eq!(fragment.file_name(), "applet_nav.swt");
        assert_eq!(fragment.body, "X");
        assert_eq!(
            fragment.template,
            "<siebel:Applet name=\"nav\" type=\"Generic\">\n  X\n</siebel:Applet>\n"
        );
        assert_eq!(
            result.shell,
            concat!(
                "<html><head></head><body><div class=\"hdr\">",
                "<siebel:IncludeApplet name=\"nav\" file=\"applet_nav.swt\"></siebel:IncludeApplet>",
                "</div></body></html>"
            )
        );
        assert_eq!(
            result.entries,
            vec![EntryOutcome {
                name: "Nav".to_string(),
                normalized_name: "nav".to_string(),
                status: EntryStatus::Ok,
            }]
        );
    }

    #[test]
    fn test_sibling_containers_do_not_cross_match() {
        let tree = DomTree::parse(concat!(
            "<div class=\"left\"><span class=\"title\">Left title</span></div>",
            "<div class=\"right\"><span class=\"title\">Right title</span></div>"
        ));
        let manifest = Manifest::new(vec![
            ManifestNode::new("Left", ".left").with_child(ManifestNode::new("Left Title", ".title")),
            ManifestNode::new("Right", ".right").with_child(ManifestNode::new("Right Title", ".title")),
        ]);

        let result = decompose_hierarchy(&tree, &manifest);

        assert_eq!(result.fragments.len(), 2);
        assert_eq!(result.fragments[0].normalized_name, "left_title");
        assert_eq!(result.fragments[0].body, "Left title");
        assert_eq!(result.fragments[1].normalized_name, "right_title");
        assert_eq!(result.fragments[1].body, "Right title");
    }

    #[test]
    fn test_hierarchy_skips_missing_children_and_containers() {
        let tree = DomTree::parse(concat!(
            "<header class=\"hdr\"><nav class=\"nav\">N</nav><p>stray</p></header>",
            "<footer>F</footer>"
        ));
        let manifest = Manifest::new(vec![
            ManifestNode::new("Header", ".hdr")
                .with_child(ManifestNode::new("Search", ".search"))
                .with_child(ManifestNode::new("Nav", ".nav").with_role(Role::Navigation)),
            ManifestNode::new("Sidebar", ".side").with_child(ManifestNode::new("Menu", ".menu")),
        ]);

        let result = decompose_hierarchy(&tree, &manifest);

        assert_eq!(result.entries.len(), 1);
        assert_eq!(result.fragments[0].name, "Nav");
        assert!(result.fragments[0].template.contains("type=\"List\""));
        // Cleared container only keeps include markers; untouched parts remain
        assert!(result.shell.contains(
            "<header class=\"hdr\"><siebel:IncludeApplet name=\"nav\" file=\"applet_nav.swt\"></siebel:IncludeApplet></header>"
        ));
        assert!(!result.shell.contains("stray"));
        assert!(result.shell.contains("<footer>F</footer>"));
    }

    #[test]
    fn test_include_markers_follow_manifest_order() {
        let tree = DomTree::parse(
            "<main class=\"m\"><div class=\"b\">B</div><div class=\"a\">A</div></main>",
        );
        let manifest = Manifest::new(vec![
            ManifestNode::new("Main", ".m")
                .with_child(ManifestNode::new("A", ".a"))
                .with_child(ManifestNode::new("B", ".b")),
        ]);

        let result = decompose_hierarchy(&tree, &manifest);

        let a = result.shell.find("name=\"a\"").unwrap();
        let b = result.shell.find("name=\"b\"").unwrap();
        assert!(a < b);
    }

    #[test]
    fn test_flat_partial_failure_isolation() {
        let tree = DomTree::parse(concat!(
            "<ul class=\"menu\">\n<li>One</li>\n<li>Two</li>\n</ul>",
            "<form id=\"f\"><input name=\"q\"></form>"
        ));
        let entries = vec![
            FlatEntry::new("Menu", ".menu", Role::List),
            FlatEntry::new("Missing", ".nope", Role::Form),
            FlatEntry::new("Broken", "ul:first", Role::Form),
            FlatEntry::new("Search Form", "#f", Role::Form),
        ];

        let result = decompose_flat(&tree, &entries);

        assert_eq!(result.fragments.len(), 2);
        assert_eq!(result.not_found(), 2);
        let statuses: Vec<_> = result.entries.iter().map(|e| e.status).collect();
        assert_eq!(
            statuses,
            vec![EntryStatus::Ok, EntryStatus::NotFound, EntryStatus::NotFound, EntryStatus::Ok]
        );
        assert_eq!(result.fragments[0].body, "<li>One</li><li>Two</li>");
        assert_eq!(result.fragments[1].normalized_name, "search_form");
        assert!(result.fragments[1].template.contains("<siebel:FormBody>"));
    }

    #[test]
    fn test_flat_view_uses_comment_markers() {
        let tree = DomTree::parse("<div class=\"hdr\"><span>X</span></div>");
        let result = decompose_flat(&tree, &[FlatEntry::new("Header", ".hdr", Role::Banner)]);

        assert!(result.shell.contains(
            "<div class=\"hdr\"><!-- siebel:IncludeApplet name='header' file='applet_header.swt' --></div>"
        ));
    }

    #[test]
    fn test_lookup_tree_is_not_mutated() {
        let tree = DomTree::parse("<div class=\"outer\"><div class=\"inner\">I</div></div>");
        let before = tree.clone();
        // The outer entry empties the view's outer element, yet the inner one
        // still resolves against the lookup tree
        let entries = vec![
            FlatEntry::new("Outer", ".outer", Role::Region),
            FlatEntry::new("Inner", ".inner", Role::Region),
        ];

        let result = decompose_flat(&tree, &entries);

        assert_eq!(tree, before);
        assert_eq!(result.fragments.len(), 2);
        assert_eq!(result.fragments[1].body, "I");
        assert!(!result.shell.contains("applet_inner.swt"));
    }

    #[test]
    fn test_markers_stay_on_the_matched_element() {
        let tree = DomTree::parse(concat!(
            "<div class=\"outer\"><div class=\"box\"><p>inner</p></div></div>",
            "<div class=\"box\"><p>other</p></div>"
        ));
        let manifest = Manifest::new(vec![
            ManifestNode::new("Outer", ".outer").with_child(ManifestNode::new("X", ".box")),
            ManifestNode::new("Box", ".box").with_child(ManifestNode::new("Y", "p")),
        ]);

        let result = decompose_hierarchy(&tree, &manifest);

        // The first .box went into X's fragment, so the second container has
        // no view element left to rewrite
        let names: Vec<_> = result.fragments.iter().map(|f| f.normalized_name.as_str()).collect();
        assert_eq!(names, vec!["x"]);
        assert!(result.shell.contains("<div class=\"box\"><p>other</p></div>"));
        assert!(!result.shell.contains("applet_y.swt"));

        let flat = decompose_flat(
            &tree,
            &[
                FlatEntry::new("Outer", ".outer", Role::Region),
                FlatEntry::new("Box", ".box", Role::Region),
            ],
        );
        assert_eq!(flat.fragments[1].body, "<p>inner</p>");
        assert!(flat.shell.contains("<div class=\"box\"><p>other</p></div>"));
        assert!(!flat.shell.contains("applet_box.swt"));
    }

    #[test]
    fn test_shell_is_produced_when_nothing_resolves() {
        let tree = DomTree::parse("<!DOCTYPE html><p>Only</p>");
        let result = decompose_flat(&tree, &[FlatEntry::new("Gone", ".gone", Role::Generic)]);

        assert!(result.fragments.is_empty());
        assert_eq!(result.shell, tree.to_html());
    }

    #[test]
    fn test_decomposition_is_deterministic() {
        let html = "<section class=\"s\" data-a=\"1\" id=\"x\"><b class=\"k\">bold</b> tail</section>";
        let entries = vec![FlatEntry::new("Sec", ".s", Role::Content)];

        let first = decompose_flat(&DomTree::parse(html), &entries);
        let second = decompose_flat(&DomTree::parse(html), &entries);

        assert_eq!(first, second);
        assert_eq!(first.fragments[0].body, "<b class=\"k\">bold</b> tail");
    }
}
