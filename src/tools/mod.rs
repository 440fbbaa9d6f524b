//! Export operations exposed as named tools with JSON parameters
//!
//! Each tool declares a typed parameter struct (with a JSON schema for MCP
//! clients) and runs against a [`ToolContext`] borrowing the browser session.

pub mod export;
pub mod navigate;
pub mod open_export;
pub mod save_pdf;
pub mod utils;

pub use export::{ExportConversationParams, ExportConversationTool};
pub use navigate::{NavigateParams, NavigateTool};
pub use open_export::{OpenExportParams, OpenExportTool};
pub use save_pdf::{SavePdfParams, SavePdfTool};

use crate::browser::BrowserSession;
use crate::dom::DomTree;
use crate::error::{ExportError, Result};
use crate::export::Exporter;
use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Outcome of a tool invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolResult {
    pub fn success() -> Self {
        Self { success: true, data: None, error: None }
    }

    pub fn success_with(data: serde_json::Value) -> Self {
        Self { success: true, data: Some(data), error: None }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self { success: false, data: None, error: Some(error.into()) }
    }
}

/// What a tool runs against
pub struct ToolContext<'a> {
    pub session: &'a BrowserSession,

    /// Exporter used by export tools
    pub exporter: Arc<Exporter>,

    /// Page tree captured earlier in this invocation
    dom: Option<DomTree>,
}

impl<'a> ToolContext<'a> {
    pub fn new(session: &'a BrowserSession) -> Self {
        Self::with_exporter(session, Arc::new(Exporter::default()))
    }

    pub fn with_exporter(session: &'a BrowserSession, exporter: Arc<Exporter>) -> Self {
        Self { session, exporter, dom: None }
    }

    /// Capture the active tab's tree once and reuse it
    pub fn get_dom(&mut self) -> Result<&DomTree> {
        if self.dom.is_none() {
            self.dom = Some(self.session.extract_dom()?);
        }
        self.dom
            .as_ref()
            .ok_or_else(|| ExportError::DomParseFailed("DOM not captured".to_string()))
    }

    /// Forget the captured tree, e.g. after navigating
    pub fn invalidate_dom(&mut self) {
        self.dom = None;
    }
}

/// A named operation with typed parameters
pub trait Tool: Send + Sync {
    type Params: DeserializeOwned + JsonSchema;

    fn name(&self) -> &str;

    /// JSON schema of the parameters
    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::to_value(schemars::schema_for!(Self::Params)).unwrap_or(serde_json::Value::Null)
    }

    fn execute_typed(&self, params: Self::Params, context: &mut ToolContext) -> Result<ToolResult>;
}

/// Object-safe view of a [`Tool`] for the registry
trait DynTool: Send + Sync {
    fn name(&self) -> &str;
    fn parameters_schema(&self) -> serde_json::Value;
    fn execute(&self, params: serde_json::Value, context: &mut ToolContext) -> Result<ToolResult>;
}

impl<T: Tool> DynTool for T {
    fn name(&self) -> &str {
        Tool::name(self)
    }

    fn parameters_schema(&self) -> serde_json::Value {
        Tool::parameters_schema(self)
    }

    fn execute(&self, params: serde_json::Value, context: &mut ToolContext) -> Result<ToolResult> {
        let typed = serde_json::from_value(params).map_err(|e| ExportError::ToolExecutionFailed {
            tool: Tool::name(self).to_string(),
            reason: format!("Invalid parameters: {}", e),
        })?;
        self.execute_typed(typed, context)
    }
}

/// Tools by name, in registration order
#[derive(Default)]
pub struct ToolRegistry {
    tools: IndexMap<String, Box<dyn DynTool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in tool
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(NavigateTool);
        registry.register(ExportConversationTool);
        registry.register(OpenExportTool);
        registry.register(SavePdfTool);
        registry
    }

    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        let tool: Box<dyn DynTool> = Box::new(tool);
        self.tools.insert(tool.name().to_string(), tool);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tools.keys().map(String::as_str)
    }

    pub fn schema(&self, name: &str) -> Option<serde_json::Value> {
        self.tools.get(name).map(|tool| tool.parameters_schema())
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Run the tool called `name` with untyped parameters
    pub fn execute(&self, name: &str, params: serde_json::Value, context: &mut ToolContext) -> Result<ToolResult> {
        let tool = self.tools.get(name).ok_or_else(|| ExportError::ToolExecutionFailed {
            tool: name.to_string(),
            reason: "Unknown tool".to_string(),
        })?;
        tool.execute(params, context)
    }
}
