use crate::error::Result;
use crate::pipeline::validate_run;
use crate::tools::{Tool, ToolContext, ToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the validate tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ValidateParams {
    /// Run directory name
    pub run: String,
}

/// Tool for checking a run's manifest selectors against its HTML
#[derive(Default)]
pub struct ValidateTool;

impl Tool for ValidateTool {
    type Params = ValidateParams;

    fn name(&self) -> &str {
        "validate"
    }

    fn execute_typed(&self, params: ValidateParams, context: &mut ToolContext) -> Result<ToolResult> {
        let run = context.run(&params.run)?;
        let report = validate_run(&run)?;
        let data = serde_json::to_value(&report)?;
        if report.valid {
            Ok(ToolResult::success_with(data))
        } else {
            let error = format!("{} selector(s) did not resolve", report.missing.len());
            Ok(ToolResult::failure_with(error, data))
        }
    }
}
