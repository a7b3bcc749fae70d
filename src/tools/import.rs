use crate::error::Result;
use crate::ingest::import_documents;
use crate::tools::{Tool, ToolContext, ToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Parameters for the import tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ImportParams {
    /// HTML mockup
    pub html: PathBuf,

    /// JSON manifest describing the mockup
    pub manifest: PathBuf,

    /// Stylesheet of the mockup
    #[serde(default)]
    pub css: Option<PathBuf>,
}

/// Tool for creating a run from documents on disk
#[derive(Default)]
pub struct ImportTool;

impl Tool for ImportTool {
    type Params = ImportParams;

    fn name(&self) -> &str {
        "import"
    }

    fn execute_typed(&self, params: ImportParams, context: &mut ToolContext) -> Result<ToolResult> {
        let (_, report) = import_documents(
            context.workspace.runs(),
            &params.html,
            &params.manifest,
            params.css.as_deref(),
        )?;
        Ok(ToolResult::success_with(serde_json::to_value(&report)?))
    }
}
