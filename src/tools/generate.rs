use crate::error::Result;
use crate::pipeline::generate_templates_with;
use crate::tools::{Tool, ToolContext, ToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the generate tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GenerateParams {
    /// Run directory name
    pub run: String,

    /// Also build the zip archive (default: true)
    #[serde(default = "default_archive")]
    pub archive: bool,
}

fn default_archive() -> bool {
    true
}

/// Tool for decomposing a run's HTML into Siebel templates
#[derive(Default)]
pub struct GenerateTool;

impl Tool for GenerateTool {
    type Params = GenerateParams;

    fn name(&self) -> &str {
        "generate"
    }

    fn execute_typed(&self, params: GenerateParams, context: &mut ToolContext) -> Result<ToolResult> {
        let run = context.run(&params.run)?;
        let report = generate_templates_with(context.workspace.assembler(), &run, params.archive)?;
        Ok(ToolResult::success_with(serde_json::to_value(&report)?))
    }
}
