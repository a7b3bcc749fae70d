//! Named operations with JSON parameters and JSON results
//!
//! The CLI drives everything through [`ToolRegistry`]; each tool declares a
//! typed parameter struct whose JSON schema is published alongside it.

pub mod generate;
pub mod import;
pub mod ingest;
pub mod package;
pub mod preview;
pub mod suggest;
pub mod validate;

pub use generate::{GenerateParams, GenerateTool};
pub use import::{ImportParams, ImportTool};
pub use ingest::{IngestParams, IngestTool};
pub use package::{PackageParams, PackageTool};
pub use preview::{PreviewParams, PreviewTool};
pub use suggest::{SuggestParams, SuggestTool};
pub use validate::{ValidateParams, ValidateTool};

use crate::assemble::RunDirectory;
use crate::error::{Result, TemplateError};
use crate::workspace::Workspace;
use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outcome of a tool invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolResult {
    pub fn success() -> Self {
        Self {
            success: true,
            data: None,
            error: None,
        }
    }

    pub fn success_with(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// A failed result that still carries data
    pub fn failure_with(error: impl Into<String>, data: Value) -> Self {
        Self {
            success: false,
            data: Some(data),
            error: Some(error.into()),
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

/// What a tool runs against
pub struct ToolContext<'a> {
    pub workspace: &'a Workspace,
}

impl<'a> ToolContext<'a> {
    pub fn new(workspace: &'a Workspace) -> Self {
        Self { workspace }
    }

    /// Open a run of the workspace
    pub fn run(&self, name: &str) -> Result<RunDirectory> {
        self.workspace.open_run(name)
    }
}

/// Typed tool
pub trait Tool: Send + Sync {
    type Params: DeserializeOwned + JsonSchema;

    fn name(&self) -> &str;

    /// JSON schema of `Params`
    fn parameters_schema(&self) -> Value {
        schemars::schema_for!(Self::Params).to_value()
    }

    fn execute_typed(&self, params: Self::Params, context: &mut ToolContext) -> Result<ToolResult>;

    /// Deserialize `params` and run
    fn execute(&self, params: Value, context: &mut ToolContext) -> Result<ToolResult> {
        let typed: Self::Params = serde_json::from_value(params)
            .map_err(|e| TemplateError::InvalidArgument(format!("{}: {}", Tool::name(self), e)))?;
        self.execute_typed(typed, context)
    }
}

/// Object-safe view of a [`Tool`], used by the registry
pub trait DynTool: Send + Sync {
    fn name(&self) -> &str;
    fn parameters_schema(&self) -> Value;
    fn execute(&self, params: Value, context: &mut ToolContext) -> Result<ToolResult>;
}

impl<T: Tool> DynTool for T {
    fn name(&self) -> &str {
        Tool::name(self)
    }

    fn parameters_schema(&self) -> Value {
        Tool::parameters_schema(self)
    }

    fn execute(&self, params: Value, context: &mut ToolContext) -> Result<ToolResult> {
        Tool::execute(self, params, context)
    }
}

/// Tools by name, in registration order
#[derive(Default)]
pub struct ToolRegistry {
    tools: IndexMap<String, Box<dyn DynTool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in tool
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(IngestTool);
        registry.register(ImportTool);
        registry.register(ValidateTool);
        registry.register(SuggestTool);
        registry.register(GenerateTool);
        registry.register(PackageTool);
        registry.register(PreviewTool);
        registry
    }

    /// Add a tool, replacing any tool of the same name
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        self.tools.insert(Tool::name(&tool).to_string(), Box::new(tool));
    }

    pub fn get(&self, name: &str) -> Option<&dyn DynTool> {
        self.tools.get(name).map(|tool| tool.as_ref())
    }

    pub fn has(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tools.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Run the tool called `name`
    pub fn execute(&self, name: &str, params: Value, context: &mut ToolContext) -> Result<ToolResult> {
        let tool = self
            .get(name)
            .ok_or_else(|| TemplateError::UnknownTool(name.to_string()))?;
        log::debug!("Executing tool '{}'", name);
        tool.execute(params, context)
    }

    /// Name and parameter schema of every tool
    pub fn describe(&self) -> Value {
        let tools: Vec<Value> = self
            .tools
            .values()
            .map(|tool| {
                serde_json::json!({
                    "name": tool.name(),
                    "parameters": tool.parameters_schema(),
                })
            })
            .collect();
        Value::Array(tools)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_registry_defaults() {
        let registry = ToolRegistry::with_defaults();
        let names: Vec<_> = registry.names().collect();
        assert_eq!(
            names,
            vec!["ingest", "import", "validate", "suggest", "generate", "package", "preview"]
        );
        assert_eq!(registry.len(), 7);
        assert!(registry.has("generate"));
        assert!(!registry.has("navigate"));
    }

    #[test]
    fn test_unknown_tool() {
        let dir = tempdir().unwrap();
        let workspace = Workspace::new(Config::new().output_root(dir.path()));
        let mut context = ToolContext::new(&workspace);

        let err = ToolRegistry::with_defaults()
            .execute("navigate", json!({}), &mut context)
            .unwrap_err();
        assert!(matches!(err, TemplateError::UnknownTool(_)));
    }

    #[test]
    fn test_bad_params_are_invalid_arguments() {
        let dir = tempdir().unwrap();
        let workspace = Workspace::new(Config::new().output_root(dir.path()));
        let mut context = ToolContext::new(&workspace);

        let err = ToolRegistry::with_defaults()
            .execute("generate", json!({"archive": true}), &mut context)
            .unwrap_err();
        assert!(matches!(err, TemplateError::InvalidArgument(_)));
    }

    #[test]
    fn test_describe_lists_schemas() {
        let described = ToolRegistry::with_defaults().describe();
        let tools = described.as_array().unwrap();
        assert_eq!(tools.len(), 7);
        assert_eq!(tools[0]["name"], "ingest");
        assert!(tools[0]["parameters"].is_object());
    }

    #[test]
    fn test_tool_result_constructors() {
        let ok = ToolResult::success_with(json!({"a": 1}));
        assert!(ok.success);
        assert_eq!(ok.data, Some(json!({"a": 1})));

        let failed = ToolResult::failure("boom");
        assert!(!failed.success);
        assert_eq!(failed.error.as_deref(), Some("boom"));
        assert_eq!(serde_json::to_value(&failed).unwrap(), json!({"success": false, "error": "boom"}));
    }
}
