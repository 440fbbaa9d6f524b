use crate::error::Result;
use crate::tools::{Tool, ToolContext, ToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the open_export tool (none needed)
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct OpenExportParams {}

/// Exports the active conversation and opens the document in a new tab,
/// where it triggers the browser's print dialog
#[derive(Default)]
pub struct OpenExportTool;

impl Tool for OpenExportTool {
    type Params = OpenExportParams;

    fn name(&self) -> &str {
        "open_export"
    }

    fn execute_typed(&self, _params: OpenExportParams, context: &mut ToolContext) -> Result<ToolResult> {
        let exporter = context.exporter.clone();
        let tree = context.get_dom()?;
        let html = exporter.export_html(tree);

        let tab = context.session.open_document(&html)?;

        Ok(ToolResult::success_with(serde_json::json!({
            "url": tab.get_url(),
            "bytes": html.len(),
            "message": "Opened export document in a new tab"
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_export_tool_name() {
        let tool = OpenExportTool;
        assert_eq!(tool.name(), "open_export");
        assert!(tool.parameters_schema().is_object());
    }
}
