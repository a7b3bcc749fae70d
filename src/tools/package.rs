use crate::error::Result;
use crate::tools::{Tool, ToolContext, ToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the package tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PackageParams {
    /// Run directory name
    pub run: String,
}

/// Tool for zipping a run's `webtemplate/` directory
#[derive(Default)]
pub struct PackageTool;

impl Tool for PackageTool {
    type Params = PackageParams;

    fn name(&self) -> &str {
        "package"
    }

    fn execute_typed(&self, params: PackageParams, context: &mut ToolContext) -> Result<ToolResult> {
        let run = context.run(&params.run)?;
        let archive = context.workspace.assembler().archive(&run)?;
        Ok(ToolResult::success_with(serde_json::json!({
            "run": run.name(),
            "archive": archive,
        })))
    }
}
