//! MCP (Model Context Protocol) server for conversation export
//!
//! This module wraps the tool registry in rmcp tools.

pub mod handler;
pub use handler::BrowserServer;

use crate::tools::{ExportConversationParams, NavigateParams, SavePdfParams, ToolContext, ToolResult as InternalToolResult};
use rmcp::{ErrorData as McpError,
           handler::server::wrapper::Parameters,
           model::{CallToolResult, Content},
           tool, tool_router};

/// Convert internal ToolResult to MCP CallToolResult
fn convert_result(result: InternalToolResult) -> Result<CallToolResult, McpError> {
    if result.success {
        let text = match result.data {
            Some(data) => serde_json::to_string_pretty(&data).unwrap_or_else(|_| data.to_string()),
            None => "Success".to_string(),
        };
        Ok(CallToolResult::success(vec![Content::text(text)]))
    } else {
        let error_msg = result.error.unwrap_or_else(|| "Unknown error".to_string());
        Err(McpError::internal_error(error_msg, None))
    }
}

impl BrowserServer {
    fn run_tool(&self, name: &str, params: serde_json::Value) -> Result<CallToolResult, McpError> {
        let session = self.session();
        let mut context = ToolContext::with_exporter(&session, self.exporter());

        let result = session
            .tool_registry()
            .execute(name, params, &mut context)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;

        convert_result(result)
    }
}

#[tool_router]
impl BrowserServer {
    /// Navigate to a conversation
    #[tool(description = "Open a conversation URL in the browser")]
    fn browser_navigate(&self, params: Parameters<NavigateParams>) -> Result<CallToolResult, McpError> {
        let params = serde_json::to_value(params.0).map_err(|e| McpError::invalid_params(e.to_string(), None))?;
        self.run_tool("navigate", params)
    }

    /// Export the open conversation
    #[tool(description = "Export the conversation in the active tab as a standalone HTML or Markdown document")]
    fn chat_export(&self, params: Parameters<ExportConversationParams>) -> Result<CallToolResult, McpError> {
        let params = serde_json::to_value(params.0).map_err(|e| McpError::invalid_params(e.to_string(), None))?;
        self.run_tool("export_conversation", params)
    }

    /// Open a printable copy in a new tab
    #[tool(description = "Export the active conversation and open the printable document in a new tab")]
    fn chat_open_export(&self) -> Result<CallToolResult, McpError> {
        self.run_tool("open_export", serde_json::json!({}))
    }

    /// Save the open conversation as PDF
    #[tool(description = "Export the active conversation and save it as a PDF file")]
    fn chat_save_pdf(&self, params: Parameters<SavePdfParams>) -> Result<CallToolResult, McpError> {
        if params.0.path.trim().is_empty() {
            return Err(McpError::invalid_params("path must not be empty", None));
        }
        let params = serde_json::to_value(params.0).map_err(|e| McpError::invalid_params(e.to_string(), None))?;
        self.run_tool("save_pdf", params)
    }
}
