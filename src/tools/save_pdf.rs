use crate::error::{ExportError, Result};
use crate::tools::{Tool, ToolContext, ToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the save_pdf tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SavePdfParams {
    /// File the PDF is written to
    pub path: String,
}

/// Exports the active conversation and prints it to a PDF file
#[derive(Default)]
pub struct SavePdfTool;

impl Tool for SavePdfTool {
    type Params = SavePdfParams;

    fn name(&self) -> &str {
        "save_pdf"
    }

    fn execute_typed(&self, params: SavePdfParams, context: &mut ToolContext) -> Result<ToolResult> {
        if params.path.trim().is_empty() {
            return Err(ExportError::InvalidArgument("path must not be empty".to_string()));
        }

        let exporter = context.exporter.clone();
        let tree = context.get_dom()?;
        let document = exporter.export_for_print(tree);

        let pdf = context.session.render_pdf(&document.content)?;
        std::fs::write(&params.path, &pdf)?;

        Ok(ToolResult::success_with(serde_json::json!({
            "path": params.path,
            "bytes": pdf.len(),
            "kept": document.kept,
            "skipped": document.skipped
        })))
    }
}
