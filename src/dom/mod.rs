//! DOM parsing and manipulation module
//!
//! This module provides the document model the decomposition engine works on:
//! - ElementNode / DomNode: owned element tree with text and comment children
//! - DomTree: a parsed document, deep-clonable into independent copies
//! - NodePath: child-index path locating an element inside a tree

pub mod element;
pub mod tree;

pub use element::{DomNode, ElementNode};
pub use tree::{DomTree, Elements, NodePath};

/// Parse an HTML document into a DomTree
pub fn parse_document(html: &str) -> DomTree {
    DomTree::parse(html)
}
