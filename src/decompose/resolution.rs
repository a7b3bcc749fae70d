use crate::dom::{DomTree, NodePath};
use crate::manifest::{ManifestNode, Role};
use crate::selector::{self, Scope, Selector};
use indexmap::IndexMap;
use serde::Serialize;

/// Where one manifest selector landed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    /// Selector as written in the manifest
    pub selector: String,

    pub role: Role,

    /// Matched element, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<NodePath>,

    /// Set when the selector could not be parsed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Resolution {
    /// Resolve `selector` in `scope`, turning parse errors into a failed resolution
    pub fn resolve(tree: &DomTree, scope: Scope<'_>, selector: &str, role: Role) -> Self {
        let (target, error) = match Selector::parse(selector) {
            Ok(parsed) => (selector::resolve(tree, scope, &parsed), None),
            Err(e) => {
                log::warn!("Skipping selector '{}': {}", selector, e);
                (None, Some(e.to_string()))
            }
        };
        Self {
            selector: selector.to_string(),
            role,
            target,
            error,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.target.is_some()
    }
}

/// Manifest name to resolution, in manifest order
///
/// Names are unique among siblings; a repeated name replaces the earlier
/// resolution but keeps its position.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResolutionMap {
    map: IndexMap<String, Resolution>,
}

impl ResolutionMap {
    pub fn new() -> Self {
        Self { map: IndexMap::new() }
    }

    /// Resolve each child of a container within the container's subtree
    pub fn for_children(tree: &DomTree, scope: &NodePath, children: &[ManifestNode]) -> Self {
        let mut map = Self::new();
        for child in children {
            let resolution = Resolution::resolve(tree, Scope::Subtree(scope), &child.selector, child.role);
            map.insert(child.name.clone(), resolution);
        }
        map
    }

    /// Record a resolution, returning the one it replaced
    pub fn insert(&mut self, name: impl Into<String>, resolution: Resolution) -> Option<Resolution> {
        let name = name.into();
        let replaced = self.map.insert(name.clone(), resolution);
        if replaced.is_some() {
            log::warn!("Manifest name '{}' appears twice in the same container", name);
        }
        replaced
    }

    pub fn get(&self, name: &str) -> Option<&Resolution> {
        self.map.get(name)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Iterate over all (name, resolution) pairs
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Resolution)> {
        self.map.iter()
    }

    /// Entries whose selector matched, with their target path
    pub fn resolved(&self) -> impl Iterator<Item = (&String, &Resolution, &NodePath)> {
        self.map
            .iter()
            .filter_map(|(name, res)| res.target.as_ref().map(|path| (name, res, path)))
    }

    /// Names whose selector matched nothing
    pub fn unresolved(&self) -> impl Iterator<Item = &String> {
        self.map.iter().filter(|(_, res)| !res.is_resolved()).map(|(name, _)| name)
    }

    /// Export to JSON for debugging
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.map)
    }
}
