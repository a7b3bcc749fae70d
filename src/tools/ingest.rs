use crate::error::{Result, TemplateError};
use crate::ingest::{ingest_response, record_source_image};
use crate::tools::{Tool, ToolContext, ToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Parameters for the ingest tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct IngestParams {
    /// Model reply text
    #[serde(default)]
    pub response: Option<String>,

    /// File holding the model reply, used when `response` is absent
    #[serde(default)]
    pub response_file: Option<PathBuf>,

    /// Screenshot the reply was generated from
    #[serde(default)]
    pub image: Option<PathBuf>,
}

/// Tool for creating a run from a fenced model reply
#[derive(Default)]
pub struct IngestTool;

impl Tool for IngestTool {
    type Params = IngestParams;

    fn name(&self) -> &str {
        "ingest"
    }

    fn execute_typed(&self, params: IngestParams, context: &mut ToolContext) -> Result<ToolResult> {
        let raw = match (params.response, &params.response_file) {
            (Some(text), _) => text,
            (None, Some(path)) => std::fs::read_to_string(path).map_err(|e| TemplateError::io(path, e))?,
            (None, None) => {
                return Err(TemplateError::InvalidArgument(
                    "ingest needs either 'response' or 'response_file'".to_string(),
                ));
            }
        };

        let workspace = context.workspace;
        let (run, report) = ingest_response(workspace.runs(), &raw)?;

        let source_image = match &params.image {
            Some(image) => Some(record_source_image(&run, &workspace.config().upload_root, image)?),
            None => None,
        };

        Ok(ToolResult::success_with(serde_json::json!({
            "run": report.run,
            "has_html": report.has_html,
            "has_css": report.has_css,
            "has_manifest": report.has_manifest,
            "source_image": source_image,
        })))
    }
}
