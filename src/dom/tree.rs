use crate::dom::element::{DomNode, ElementNode};
use crate::error::{Result, TemplateError};
use crate::selector::{self, Scope, Selector};
use scraper::{ElementRef, Html, Node};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Location of an element as child indices from the root element
///
/// Indices count every child node (text and comments included), so a path is
/// only meaningful for the tree it was computed on or for a clone of it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    /// Path of the root element
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn from_indices(indices: Vec<usize>) -> Self {
        Self(indices)
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    /// Number of steps below the root
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// Path of the child at `index`
    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }

    /// Path of the parent element, `None` for the root
    pub fn parent(&self) -> Option<Self> {
        let (_, rest) = self.0.split_last()?;
        Some(Self(rest.to_vec()))
    }

    /// Whether `other` lies strictly below this path
    pub fn is_strict_ancestor_of(&self, other: &NodePath) -> bool {
        other.0.len() > self.0.len() && other.0.starts_with(&self.0)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("/")?;
        let parts: Vec<String> = self.0.iter().map(|i| i.to_string()).collect();
        f.write_str(&parts.join("/"))
    }
}

/// A parsed HTML document
#[derive(Debug, Clone, PartialEq)]
pub struct DomTree {
    /// Doctype name (`html` for `<!DOCTYPE html>`)
    pub doctype: Option<String>,

    /// Root element of the DOM tree, normally `<html>`
    pub root: ElementNode,
}

impl DomTree {
    /// Create a tree around an existing root element
    pub fn new(root: ElementNode) -> Self {
        Self {
            doctype: None,
            root,
        }
    }

    /// Parse an HTML document
    ///
    /// The HTML5 parser recovers from any input, so this never fails; missing
    /// `html`, `head` and `body` elements are synthesized.
    pub fn parse(html: &str) -> Self {
        let document = Html::parse_document(html);

        let doctype = document.tree.root().children().find_map(|child| match child.value() {
            Node::Doctype(doctype) => Some(doctype.name().to_string()),
            _ => None,
        });

        let root = convert_element(document.root_element());
        log::debug!("Parsed document with root <{}>", root.tag_name);

        Self { doctype, root }
    }

    /// Serialize the whole document
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        if let Some(doctype) = &self.doctype {
            out.push_str("<!DOCTYPE ");
            out.push_str(doctype);
            out.push('>');
        }
        out.push_str(&self.root.outer_html());
        out
    }

    /// Convert the DOM tree to JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.root).map_err(TemplateError::from)
    }

    /// Element at `path`
    pub fn node_at(&self, path: &NodePath) -> Option<&ElementNode> {
        let mut node = &self.root;
        for &index in path.indices() {
            node = node.children.get(index)?.as_element()?;
        }
        Some(node)
    }

    /// Mutable element at `path`
    pub fn node_at_mut(&mut self, path: &NodePath) -> Option<&mut ElementNode> {
        let mut node = &mut self.root;
        for &index in path.indices() {
            node = node.children.get_mut(index)?.as_element_mut()?;
        }
        Some(node)
    }

    /// Iterate over all elements in document order, root first
    pub fn elements(&self) -> Elements<'_> {
        Elements {
            stack: vec![&self.root],
        }
    }

    /// Count total elements in the tree
    pub fn count_elements(&self) -> usize {
        self.elements().count()
    }

    /// First element matching `css` anywhere in the document
    pub fn select(&self, css: &str) -> Result<Option<&ElementNode>> {
        Ok(self.select_path(css)?.and_then(|path| self.node_at(&path)))
    }

    /// Path of the first element matching `css` anywhere in the document
    pub fn select_path(&self, css: &str) -> Result<Option<NodePath>> {
        let selector = Selector::parse(css)?;
        Ok(selector::resolve(self, Scope::Document, &selector))
    }

    /// Path of the first strict descendant of `scope` matching `css`
    pub fn select_within(&self, scope: &NodePath, css: &str) -> Result<Option<NodePath>> {
        let selector = Selector::parse(css)?;
        Ok(selector::resolve(self, Scope::Subtree(scope), &selector))
    }

    /// Mutable access to the first element matching `css`
    pub fn select_mut(&mut self, css: &str) -> Result<Option<&mut ElementNode>> {
        match self.select_path(css)? {
            Some(path) => Ok(self.node_at_mut(&path)),
            None => Ok(None),
        }
    }

    /// Whether `css` parses and matches at least one element
    pub fn matches(&self, css: &str) -> bool {
        matches!(self.select_path(css), Ok(Some(_)))
    }
}

/// Pre-order iterator over the elements of a tree
pub struct Elements<'a> {
    stack: Vec<&'a ElementNode>,
}

impl<'a> Iterator for Elements<'a> {
    type Item = &'a ElementNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.child_elements().collect::<Vec<_>>().into_iter().rev());
        Some(node)
    }
}

fn convert_element(element: ElementRef<'_>) -> ElementNode {
    let value = element.value();
    let mut node = ElementNode::new(value.name());
    for (name, attr_value) in value.attrs() {
        node.add_attribute(name, attr_value);
    }

    for child in element.children() {
        match child.value() {
            Node::Element(_) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    node.add_child(convert_element(child_element));
                }
            }
            Node::Text(text) => node.append(DomNode::Text(String::from(&*text.text))),
            Node::Comment(comment) => node.append(DomNode::Comment(String::from(&*comment.comment))),
            _ => {}
        }
    }

    node
}
