use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Elements serialized without an end tag
const VOID_ELEMENTS: [&str; 14] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose text children are written verbatim
const RAW_TEXT_ELEMENTS: [&str; 6] = ["script", "style", "xmp", "iframe", "noembed", "noframes"];

/// A child of an element: another element, a text run or a comment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum DomNode {
    Element(ElementNode),
    Text(String),
    Comment(String),
}

impl DomNode {
    /// Borrow the element if this node is one
    pub fn as_element(&self) -> Option<&ElementNode> {
        match self {
            DomNode::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut ElementNode> {
        match self {
            DomNode::Element(element) => Some(element),
            _ => None,
        }
    }

    /// A text node consisting of a single line break
    pub fn is_bare_newline(&self) -> bool {
        matches!(self, DomNode::Text(text) if text == "\n")
    }

    /// Serialize this node as HTML, escaping text unless `raw_text` is set
    fn write_html(&self, out: &mut String, raw_text: bool) {
        match self {
            DomNode::Element(element) => element.write_html(out),
            DomNode::Text(text) if raw_text => out.push_str(text),
            DomNode::Text(text) => escape_text(text, out),
            DomNode::Comment(text) => {
                out.push_str("<!--");
                out.push_str(text);
                out.push_str("-->");
            }
        }
    }

    /// Serialize this node as HTML
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out, false);
        out
    }
}

impl From<ElementNode> for DomNode {
    fn from(element: ElementNode) -> Self {
        DomNode::Element(element)
    }
}

/// Represents a DOM element node
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ElementNode {
    /// HTML tag name (e.g., "div", "nav", "siebel:IncludeApplet")
    pub tag_name: String,

    /// Element attributes in source order
    #[serde(default)]
    pub attributes: IndexMap<String, String>,

    /// Child nodes in document order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DomNode>,
}

impl ElementNode {
    /// Create a new ElementNode
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            attributes: IndexMap::new(),
            children: Vec::new(),
        }
    }

    /// Builder method: set attributes
    pub fn with_attributes(mut self, attributes: IndexMap<String, String>) -> Self {
        self.attributes = attributes;
        self
    }

    /// Builder method: set a single attribute
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.add_attribute(key, value);
        self
    }

    /// Builder method: append a text child
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(DomNode::Text(text.into()));
        self
    }

    /// Builder method: set children
    pub fn with_children(mut self, children: Vec<DomNode>) -> Self {
        self.children = children;
        self
    }

    /// Builder method: append an element child
    pub fn with_child(mut self, child: ElementNode) -> Self {
        self.add_child(child);
        self
    }

    /// Add a single attribute
    pub fn add_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(key.into(), value.into());
    }

    /// Add a child element
    pub fn add_child(&mut self, child: ElementNode) {
        self.children.push(DomNode::Element(child));
    }

    /// Append any kind of child node
    pub fn append(&mut self, node: DomNode) {
        self.children.push(node);
    }

    /// Remove every child, keeping the element and its attributes
    pub fn clear(&mut self) {
        self.children.clear();
    }

    /// Get attribute value by key
    pub fn get_attribute(&self, key: &str) -> Option<&String> {
        self.attributes.get(key)
    }

    /// Iterate over the entries of the class list
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attributes
            .get("class")
            .map(|classes| classes.split_whitespace())
            .into_iter()
            .flatten()
    }

    /// Check if element has a specific class
    pub fn has_class(&self, class_name: &str) -> bool {
        self.classes().any(|c| c == class_name)
    }

    /// Get element ID
    pub fn id(&self) -> Option<&String> {
        self.attributes.get("id")
    }

    /// Check if element is a specific tag
    pub fn is_tag(&self, tag: &str) -> bool {
        self.tag_name.eq_ignore_ascii_case(tag)
    }

    /// Iterate over element children only
    pub fn child_elements(&self) -> impl Iterator<Item = &ElementNode> {
        self.children.iter().filter_map(DomNode::as_element)
    }

    /// Concatenated text of all descendant text nodes
    pub fn text_content(&self) -> String {
        let mut text = String::new();
        self.collect_text(&mut text);
        text
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                DomNode::Element(element) => element.collect_text(out),
                DomNode::Text(t) => out.push_str(t),
                DomNode::Comment(_) => {}
            }
        }
    }

    fn is_void(&self) -> bool {
        VOID_ELEMENTS.iter().any(|&tag| self.is_tag(tag))
    }

    fn is_raw_text(&self) -> bool {
        RAW_TEXT_ELEMENTS.iter().any(|&tag| self.is_tag(tag))
    }

    fn write_open_tag(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag_name);
        for (name, value) in &self.attributes {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            escape_attribute(value, out);
            out.push('"');
        }
        out.push('>');
    }

    fn write_html(&self, out: &mut String) {
        self.write_open_tag(out);
        if self.is_void() && self.children.is_empty() {
            return;
        }
        self.write_children(out, false);
        out.push_str("</");
        out.push_str(&self.tag_name);
        out.push('>');
    }

    fn write_children(&self, out: &mut String, skip_bare_newlines: bool) {
        let raw = self.is_raw_text();
        for child in &self.children {
            if skip_bare_newlines && child.is_bare_newline() {
                continue;
            }
            child.write_html(out, raw);
        }
    }

    /// Serialize the element including its own tags
    pub fn outer_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    /// Serialize the children in order, skipping stray `"\n"` text nodes
    pub fn inner_html(&self) -> String {
        let mut out = String::new();
        self.write_children(&mut out, true);
        out
    }
}

fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
}

fn escape_attribute(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
}
