use crate::error::Result;
use crate::export::ExportFormat;
use crate::tools::{Tool, ToolContext, ToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the export_conversation tool
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ExportConversationParams {
    /// Output format: "html" (default) or "markdown"
    #[serde(default)]
    pub format: ExportFormat,
}

/// Exports the conversation in the active tab and returns the document
#[derive(Default)]
pub struct ExportConversationTool;

impl Tool for ExportConversationTool {
    type Params = ExportConversationParams;

    fn name(&self) -> &str {
        "export_conversation"
    }

    fn execute_typed(&self, params: ExportConversationParams, context: &mut ToolContext) -> Result<ToolResult> {
        let exporter = context.exporter.clone();
        let tree = context.get_dom()?;
        let document = exporter.export(tree, params.format);

        Ok(ToolResult::success_with(serde_json::json!({
            "format": document.format,
            "content": document.content,
            "date": document.date.format("%Y-%m-%d").to_string(),
            "source": tree.location,
            "kept": document.kept,
            "skipped": document.skipped
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_params_default_format() {
        let params: ExportConversationParams = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(params.format, ExportFormat::Html);

        let params: ExportConversationParams =
            serde_json::from_value(serde_json::json!({"format": "markdown"})).unwrap();
        assert_eq!(params.format, ExportFormat::Markdown);
    }

    #[test]
    fn test_export_tool_name() {
        let tool = ExportConversationTool;
        assert_eq!(tool.name(), "export_conversation");
        assert!(tool.parameters_schema().is_object());
    }
}
