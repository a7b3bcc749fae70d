use crate::assemble::RunDirectory;
use crate::dom::DomTree;
use crate::error::Result;
use crate::selector::suggest;
use crate::tools::{Tool, ToolContext, ToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the suggest tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SuggestParams {
    /// Run directory name
    pub run: String,

    /// Selector to find alternatives for
    pub selector: String,
}

/// Tool for listing resolving selectors similar to a failing one
#[derive(Default)]
pub struct SuggestTool;

impl Tool for SuggestTool {
    type Params = SuggestParams;

    fn name(&self) -> &str {
        "suggest"
    }

    fn execute_typed(&self, params: SuggestParams, context: &mut ToolContext) -> Result<ToolResult> {
        let run = context.run(&params.run)?;
        let tree = DomTree::parse(&run.read_artifact(RunDirectory::GENERATED_HTML)?);
        let resolves = tree.matches(&params.selector);
        let similar = suggest(&tree, &params.selector);

        Ok(ToolResult::success_with(serde_json::json!({
            "selector": params.selector,
            "resolves": resolves,
            "similar": similar,
        })))
    }
}
