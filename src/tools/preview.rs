use crate::assemble::preview_html;
use crate::error::{Result, TemplateError};
use crate::tools::{Tool, ToolContext, ToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Parameters for the preview tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PreviewParams {
    /// Run directory name
    pub run: String,

    /// Write the page here instead of returning it
    #[serde(default)]
    pub output: Option<PathBuf>,
}

/// Tool for rendering a run's HTML with its CSS inlined
#[derive(Default)]
pub struct PreviewTool;

impl Tool for PreviewTool {
    type Params = PreviewParams;

    fn name(&self) -> &str {
        "preview"
    }

    fn execute_typed(&self, params: PreviewParams, context: &mut ToolContext) -> Result<ToolResult> {
        let run = context.run(&params.run)?;
        let html = preview_html(&run)?;

        match params.output {
            Some(path) => {
                std::fs::write(&path, &html).map_err(|e| TemplateError::io(&path, e))?;
                Ok(ToolResult::success_with(serde_json::json!({
                    "run": run.name(),
                    "written_to": path,
                    "bytes": html.len(),
                })))
            }
            None => Ok(ToolResult::success_with(serde_json::json!({
                "run": run.name(),
                "html": html,
            }))),
        }
    }
}
