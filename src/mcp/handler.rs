use crate::browser::{BrowserSession, ConnectionOptions, LaunchOptions};
use crate::export::Exporter;
use rmcp::{ServerHandler,
           handler::server::router::tool::ToolRouter,
           model::{Implementation, ServerCapabilities, ServerInfo},
           tool_handler};
use std::sync::{Arc, Mutex, MutexGuard};

/// MCP server exporting conversations from a managed browser
#[derive(Clone)]
pub struct BrowserServer {
    session: Arc<Mutex<BrowserSession>>,
    exporter: Arc<Exporter>,
    tool_router: ToolRouter<Self>,
}

impl BrowserServer {
    /// Launch a headless browser with default options
    pub fn new() -> crate::error::Result<Self> {
        Self::with_options(LaunchOptions::default())
    }

    pub fn with_options(options: LaunchOptions) -> crate::error::Result<Self> {
        Ok(Self::from_session(BrowserSession::launch(options)?, Exporter::default()))
    }

    /// Attach to a browser the user is already logged in with
    pub fn connect(options: ConnectionOptions) -> crate::error::Result<Self> {
        Ok(Self::from_session(BrowserSession::connect(options)?, Exporter::default()))
    }

    pub fn from_session(session: BrowserSession, exporter: Exporter) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
            exporter: Arc::new(exporter),
            tool_router: Self::tool_router(),
        }
    }

    /// Lock the browser session; a poisoned lock is recovered
    pub fn session(&self) -> MutexGuard<'_, BrowserSession> {
        self.session.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn exporter(&self) -> Arc<Exporter> {
        self.exporter.clone()
    }
}

#[tool_handler]
impl ServerHandler for BrowserServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Exports ChatGPT conversations from the browser tab. Navigate to a conversation, then use \
                 chat_export for HTML/Markdown, chat_open_export to open a printable copy, or chat_save_pdf."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            ..Default::default()
        }
    }
}
