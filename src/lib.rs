//! # siebel-webtemplate
//!
//! A Rust library for turning generated HTML mockups into Siebel Open UI web templates.
//!
//! ## Features
//!
//! - **Manifest-driven decomposition**: Split a page into applet fragments named by a JSON manifest
//! - **Selector resolution**: A small CSS selector engine with scoped lookups and similarity suggestions
//! - **Validation**: Cross-check manifest selectors against the HTML before generating anything
//! - **Run directories**: Timestamped output folders with atomic writes and a zip archive
//! - **Tool System**: Every operation exposed as a named tool with JSON parameters
//!
//! ## CLI
//!
//! The `webtemplate` binary (default `cli` feature) drives the tool registry:
//!
//! ```bash
//! # Create a run from a model reply with fenced json/html/css blocks
//! webtemplate ingest --response-file reply.md
//!
//! # Check selectors, then generate and package the templates
//! webtemplate validate 20240101_120000
//! webtemplate generate 20240101_120000
//! ```
//!
//! ## Library Usage
//!
//! ### Decomposing a document
//!
//! ```rust
//! use siebel_webtemplate::{DomTree, decompose, load_manifest};
//!
//! # fn main() -> siebel_webtemplate::Result<()> {
//! let tree = DomTree::parse(r#"<div class="hdr"><div class="nav">X</div></div>"#);
//! let manifest = load_manifest(
//!     r#"{"containers":[{"name":"Header","selector":".hdr","children":[{"name":"Nav","selector":".nav"}]}]}"#,
//! )?;
//!
//! let result = decompose(&tree, &manifest);
//! assert_eq!(result.fragments[0].file_name(), "applet_nav.swt");
//! assert!(result.shell.contains("siebel:IncludeApplet"));
//! # Ok(())
//! # }
//! ```
//!
//! ### Using the Tool System
//!
//! ```rust,no_run
//! use siebel_webtemplate::{Config, Workspace};
//! use siebel_webtemplate::tools::{ToolContext, ToolRegistry};
//! use serde_json::json;
//!
//! # fn main() -> siebel_webtemplate::Result<()> {
//! let workspace = Workspace::new(Config::from_env());
//! let registry = ToolRegistry::with_defaults();
//! let mut context = ToolContext::new(&workspace);
//!
//! registry.execute("generate", json!({"run": "20240101_120000"}), &mut context)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! - [`dom`]: Owned DOM tree parsed from HTML
//! - [`selector`]: Selector parsing, resolution and suggestions
//! - [`manifest`]: Manifest model and tolerant loader
//! - [`validate`]: Manifest-against-DOM validation
//! - [`decompose`]: Fragment extraction and shell rewriting
//! - [`assemble`]: Run directories, template output and archives
//! - [`ingest`]: Model reply parsing
//! - [`pipeline`]: End-to-end generate and validate
//! - [`tools`]: Tool registry
//! - [`error`]: Error types and result aliases

pub mod assemble;
pub mod config;
pub mod decompose;
pub mod dom;
pub mod error;
pub mod ingest;
pub mod manifest;
pub mod pipeline;
pub mod selector;
pub mod tools;
pub mod validate;
pub mod workspace;

pub use assemble::{AssemblyReport, OutputAssembler, RunDirectory, RunDirectoryProvider, TimestampedRuns};
pub use config::Config;
pub use decompose::{Decomposition, Fragment, decompose, decompose_flat, decompose_hierarchy, normalize_name};
pub use dom::{DomNode, DomTree, ElementNode, NodePath};
pub use error::{Result, TemplateError};
pub use manifest::{FlatEntry, Manifest, ManifestDocument, ManifestNode, Role, load_manifest};
pub use pipeline::{GenerationReport, generate_templates, validate_run};
pub use selector::{Scope, Selector, resolve, suggest};
pub use tools::{Tool, ToolContext, ToolRegistry, ToolResult};
pub use validate::{ValidationReport, validate, validate_flat};
pub use workspace::Workspace;
