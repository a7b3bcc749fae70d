//! Manifest model: the named components of a mockup and their selectors
//!
//! Two shapes exist. The hierarchical shape is an object with `containers`,
//! each holding `children`; child selectors are scoped to the container. The
//! flat shape is a plain array of `{name, selector, role}` entries resolved
//! against the whole document.

pub mod loader;

pub use loader::{MANIFEST_HINT, load_manifest, load_manifest_file, parse_lenient, sanitize_json};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Component role, used to pick the applet wrapper
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum Role {
    List,
    Navigation,
    Grid,
    Form,
    Main,
    Content,
    Banner,
    Region,
    Button,
    Toolbar,
    Action,
    /// Any role not listed above, including a missing one
    #[default]
    Generic,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::List => "list",
            Role::Navigation => "navigation",
            Role::Grid => "grid",
            Role::Form => "form",
            Role::Main => "main",
            Role::Content => "content",
            Role::Banner => "banner",
            Role::Region => "region",
            Role::Button => "button",
            Role::Toolbar => "toolbar",
            Role::Action => "action",
            Role::Generic => "generic",
        }
    }

    /// Parse a role name, case-insensitively
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "list" => Role::List,
            "navigation" => Role::Navigation,
            "grid" => Role::Grid,
            "form" => Role::Form,
            "main" => Role::Main,
            "content" => Role::Content,
            "banner" => Role::Banner,
            "region" => Role::Region,
            "button" => Role::Button,
            "toolbar" => Role::Toolbar,
            "action" => Role::Action,
            _ => Role::Generic,
        }
    }
}

impl From<Option<String>> for Role {
    fn from(value: Option<String>) -> Self {
        value.as_deref().map(Role::parse).unwrap_or_default()
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a manifest node groups children or is a leaf applet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeKind {
    Container,
    Applet,
}

impl From<String> for NodeKind {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "applet" | "component" => NodeKind::Applet,
            _ => NodeKind::Container,
        }
    }
}

impl From<NodeKind> for String {
    fn from(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Container => "container".to_string(),
            NodeKind::Applet => "applet".to_string(),
        }
    }
}

fn default_name() -> String {
    "unknown".to_string()
}

/// One named component of the hierarchical manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestNode {
    /// Unique among its siblings; used for file and include names
    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default)]
    pub role: Role,

    /// CSS selector, relative to the parent container's match
    pub selector: String,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<NodeKind>,

    /// Row selector for list-like components
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_selector: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ManifestNode>,
}

impl ManifestNode {
    pub fn new(name: impl Into<String>, selector: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: Role::Generic,
            selector: selector.into(),
            kind: None,
            item_selector: None,
            children: Vec::new(),
        }
    }

    /// Builder method: set role
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    /// Builder method: append a child
    pub fn with_child(mut self, child: ManifestNode) -> Self {
        self.children.push(child);
        self
    }

    /// Builder method: set item selector
    pub fn with_item_selector(mut self, item_selector: impl Into<String>) -> Self {
        self.item_selector = Some(item_selector.into());
        self
    }

    /// Declared kind, or inferred from whether the node has children
    pub fn kind(&self) -> NodeKind {
        self.kind.unwrap_or(if self.children.is_empty() {
            NodeKind::Applet
        } else {
            NodeKind::Container
        })
    }

    /// Count this node and every descendant
    pub fn count_nodes(&self) -> usize {
        1 + self.children.iter().map(ManifestNode::count_nodes).sum::<usize>()
    }
}

/// Hierarchical manifest
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub containers: Vec<ManifestNode>,
}

impl Manifest {
    pub fn new(containers: Vec<ManifestNode>) -> Self {
        Self { containers }
    }

    /// Total number of manifest nodes
    pub fn count_nodes(&self) -> usize {
        self.containers.iter().map(ManifestNode::count_nodes).sum()
    }
}

/// Entry of the flat manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatEntry {
    pub name: String,
    pub selector: String,
    #[serde(default)]
    pub role: Role,
}

impl FlatEntry {
    pub fn new(name: impl Into<String>, selector: impl Into<String>, role: Role) -> Self {
        Self {
            name: name.into(),
            selector: selector.into(),
            role,
        }
    }
}

/// A loaded manifest of either shape
#[derive(Debug, Clone, PartialEq)]
pub enum ManifestDocument {
    Hierarchical(Manifest),
    Flat(Vec<FlatEntry>),
}

impl ManifestDocument {
    /// Name of the shape, for logs and tool output
    pub fn shape(&self) -> &'static str {
        match self {
            ManifestDocument::Hierarchical(_) => "hierarchical",
            ManifestDocument::Flat(_) => "flat",
        }
    }
}
