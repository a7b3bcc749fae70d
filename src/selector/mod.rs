//! CSS selector parsing and resolution against a [`DomTree`]
//!
//! Supported syntax is the subset manifests use in practice:
//! - type selectors and `*`
//! - classes (`.a`, compound `.a.b`) and ids (`#main`)
//! - attribute presence and equality (`[data-role]`, `[type="text"]`)
//! - descendant (`A B`) and child (`A > B`) combinators
//! - selector lists (`A, B`)
//!
//! Matching returns the first element in document order.

pub mod suggest;

pub use suggest::{SuggestionStrategy, suggest};

use crate::dom::{DomTree, ElementNode, NodePath};
use crate::error::{Result, TemplateError};
use std::collections::HashSet;

/// Where resolution looks for candidates
#[derive(Debug, Clone, Copy)]
pub enum Scope<'p> {
    /// Every element of the document, root included
    Document,
    /// Strict descendants of the element at the given path
    Subtree(&'p NodePath),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttributeTest {
    Exists(String),
    Equals(String, String),
}

/// One compound selector, e.g. `div.card#main[data-x]`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<AttributeTest>,
}

impl Compound {
    fn is_empty(&self) -> bool {
        self.tag.is_none() && self.id.is_none() && self.classes.is_empty() && self.attributes.is_empty()
    }

    fn matches(&self, element: &ElementNode) -> bool {
        if let Some(tag) = &self.tag {
            if !element.is_tag(tag) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if element.id().map(String::as_str) != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.iter().all(|class| element.has_class(class)) {
            return false;
        }
        self.attributes.iter().all(|test| match test {
            AttributeTest::Exists(name) => element.get_attribute(name).is_some(),
            AttributeTest::Equals(name, value) => {
                element.get_attribute(name).map(String::as_str) == Some(value.as_str())
            }
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

/// Subject compound plus the compounds to its left, nearest first
#[derive(Debug, Clone, PartialEq, Eq)]
struct Complex {
    subject: Compound,
    ancestors: Vec<(Combinator, Compound)>,
}

impl Complex {
    /// `ancestors` holds the element's ancestor chain, root first
    fn matches(&self, element: &ElementNode, ancestors: &[&ElementNode]) -> bool {
        self.subject.matches(element) && Self::match_ancestors(&self.ancestors, ancestors)
    }

    fn match_ancestors(remaining: &[(Combinator, Compound)], ancestors: &[&ElementNode]) -> bool {
        let mut failed = HashSet::new();
        Self::match_from(remaining, 0, ancestors, ancestors.len(), &mut failed)
    }

    /// Match `remaining[step..]` against `ancestors[..depth]`
    ///
    /// `failed` remembers `(step, depth)` pairs already known not to match, so
    /// descendant backtracking visits each pair once.
    fn match_from(
        remaining: &[(Combinator, Compound)],
        step: usize,
        ancestors: &[&ElementNode],
        depth: usize,
        failed: &mut HashSet<(usize, usize)>,
    ) -> bool {
        let Some((combinator, compound)) = remaining.get(step) else {
            return true;
        };
        if failed.contains(&(step, depth)) {
            return false;
        }
        let matched = match combinator {
            Combinator::Child => {
                depth > 0
                    && compound.matches(ancestors[depth - 1])
                    && Self::match_from(remaining, step + 1, ancestors, depth - 1, failed)
            }
            Combinator::Descendant => (0..depth).rev().any(|i| {
                compound.matches(ancestors[i]) && Self::match_from(remaining, step + 1, ancestors, i, failed)
            }),
        };
        if !matched {
            failed.insert((step, depth));
        }
        matched
    }
}

/// A parsed selector list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    alternatives: Vec<Complex>,
}

impl Selector {
    /// Parse selector text
    pub fn parse(text: &str) -> Result<Self> {
        let alternatives = split_list(text)
            .into_iter()
            .map(|part| parse_complex(text, part))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            source: text.trim().to_string(),
            alternatives,
        })
    }

    /// Selector text as given, trimmed
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether `element`, with the given ancestor chain, matches
    pub fn matches(&self, element: &ElementNode, ancestors: &[&ElementNode]) -> bool {
        self.alternatives.iter().any(|alt| alt.matches(element, ancestors))
    }
}

fn invalid(selector: &str, reason: impl Into<String>) -> TemplateError {
    TemplateError::InvalidSelector {
        selector: selector.to_string(),
        reason: reason.into(),
    }
}

/// Split on top-level commas, ignoring commas inside brackets or quotes
fn split_list(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.saturating_sub(1),
            (None, ',') if depth == 0 => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii()
}

struct Cursor<'a> {
    selector: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let start = self.pos;
        while self.peek().is_some_and(&pred) {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }

    fn ident(&mut self, what: &str) -> Result<String> {
        let ident = self.take_while(is_ident_char);
        if ident.is_empty() {
            return Err(invalid(self.selector, format!("expected {} at offset {}", what, self.pos)));
        }
        Ok(ident)
    }

    fn attribute(&mut self) -> Result<AttributeTest> {
        self.skip_whitespace();
        let name = self.ident("attribute name")?;
        self.skip_whitespace();
        match self.peek() {
            Some(']') => {
                self.pos += 1;
                Ok(AttributeTest::Exists(name))
            }
            Some('=') => {
                self.pos += 1;
                self.skip_whitespace();
                let value = match self.peek() {
                    Some(q @ ('"' | '\'')) => {
                        self.pos += 1;
                        let value = self.take_while(|c| c != q);
                        if self.peek() != Some(q) {
                            return Err(invalid(self.selector, "unterminated attribute value"));
                        }
                        self.pos += 1;
                        value
                    }
                    _ => self.ident("attribute value")?,
                };
                self.skip_whitespace();
                if self.peek() != Some(']') {
                    return Err(invalid(self.selector, "expected ']'"));
                }
                self.pos += 1;
                Ok(AttributeTest::Equals(name, value))
            }
            _ => Err(invalid(self.selector, "unsupported attribute operator")),
        }
    }

    fn compound(&mut self) -> Result<Compound> {
        let mut compound = Compound::default();
        let mut universal = false;
        match self.peek() {
            Some('*') => {
                self.pos += 1;
                universal = true;
            }
            Some(c) if is_ident_char(c) => {
                compound.tag = Some(self.take_while(is_ident_char));
            }
            _ => {}
        }
        loop {
            match self.peek() {
                Some('.') => {
                    self.pos += 1;
                    compound.classes.push(self.ident("class name")?);
                }
                Some('#') => {
                    self.pos += 1;
                    compound.id = Some(self.ident("id")?);
                }
                Some('[') => {
                    self.pos += 1;
                    compound.attributes.push(self.attribute()?);
                }
                Some(':') => {
                    return Err(invalid(self.selector, "pseudo-classes are not supported"));
                }
                _ => break,
            }
        }
        if compound.is_empty() && !universal {
            return Err(invalid(self.selector, format!("expected selector at offset {}", self.pos)));
        }
        Ok(compound)
    }
}

fn parse_complex(selector: &str, text: &str) -> Result<Complex> {
    let mut cursor = Cursor {
        selector,
        chars: text.chars().collect(),
        pos: 0,
    };
    cursor.skip_whitespace();
    if cursor.peek().is_none() {
        return Err(invalid(selector, "empty selector"));
    }

    let mut compounds = vec![cursor.compound()?];
    let mut combinators = Vec::new();
    loop {
        let had_space = cursor.skip_whitespace();
        let combinator = match cursor.peek() {
            None => break,
            Some('>') => {
                cursor.pos += 1;
                cursor.skip_whitespace();
                Combinator::Child
            }
            Some(c @ ('+' | '~')) => {
                return Err(invalid(selector, format!("combinator '{}' is not supported", c)));
            }
            Some(_) if had_space => Combinator::Descendant,
            Some(c) => return Err(invalid(selector, format!("unexpected '{}'", c))),
        };
        combinators.push(combinator);
        compounds.push(cursor.compound()?);
    }

    let subject = compounds.pop().unwrap_or_default();
    let ancestors = combinators.into_iter().rev().zip(compounds.into_iter().rev()).collect();
    Ok(Complex { subject, ancestors })
}

/// Find the first element matching `selector` within `scope`, in document order
pub fn resolve(tree: &DomTree, scope: Scope<'_>, selector: &Selector) -> Option<NodePath> {
    let scope_path = match scope {
        Scope::Document => None,
        Scope::Subtree(path) => Some(path.indices()),
    };
    let mut path = Vec::new();
    let mut ancestors = Vec::new();
    search(&tree.root, &mut path, &mut ancestors, scope_path, selector)
}

fn search<'a>(
    node: &'a ElementNode,
    path: &mut Vec<usize>,
    ancestors: &mut Vec<&'a ElementNode>,
    scope: Option<&[usize]>,
    selector: &Selector,
) -> Option<NodePath> {
    let candidate = match scope {
        None => true,
        Some(scope) => path.len() > scope.len() && path.starts_with(scope),
    };
    if candidate && selector.matches(node, ancestors) {
        return Some(NodePath::from_indices(path.clone()));
    }

    ancestors.push(node);
    for (index, child) in node.children.iter().enumerate() {
        let Some(child) = child.as_element() else {
            continue;
        };
        path.push(index);
        // Only walk towards the scope node or inside it
        let relevant = match scope {
            None => true,
            Some(scope) => scope.starts_with(path) || path.starts_with(scope),
        };
        let found = if relevant {
            search(child, path, ancestors, scope, selector)
        } else {
            None
        };
        path.pop();
        if found.is_some() {
            ancestors.pop();
            return found;
        }
    }
    ancestors.pop();
    None
}
