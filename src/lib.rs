//! # chat-export
//!
//! Exports a ChatGPT conversation, as rendered in the browser, into a
//! standalone printable HTML document (or Markdown, or PDF).
//!
//! ## Features
//!
//! - **Tree capture**: lower the live DOM of a Chrome tab (over CDP) or a saved page into a plain [`DomTree`]
//! - **Export pipeline**: find conversation turns, clean their content, drop repeated turns and images
//! - **Output**: self-contained HTML with an auto-print script, Markdown, or PDF printed by the browser
//! - **MCP Server**: the export operations as Model Context Protocol tools
//!
//! ## MCP Server
//!
//! ```bash
//! # Attach to a browser that is logged in
//! cargo run --features mcp-server --bin mcp-server -- --ws-endpoint ws://127.0.0.1:9222/devtools/browser/<id>
//!
//! # Launch a visible browser
//! cargo run --features mcp-server --bin mcp-server -- --headed
//! ```
//!
//! ## Library Usage
//!
//! ### Exporting the open conversation
//!
//! ```rust,no_run
//! use chat_export::{BrowserSession, ExportFormat, Exporter, LaunchOptions};
//!
//! # fn main() -> chat_export::Result<()> {
//! let session = BrowserSession::launch(LaunchOptions::default().headless(false))?;
//! session.navigate("https://chatgpt.com/c/<conversation-id>")?;
//! session.wait_for_navigation()?;
//!
//! let exporter = Exporter::default();
//! let document = session.export_conversation(&exporter, ExportFormat::Html)?;
//! session.open_document(&document.content)?;
//! # Ok(())
//! # }
//! ```
//!
//! ### Exporting a saved page
//!
//! ```rust,no_run
//! use chat_export::{DomTree, Exporter};
//!
//! # fn main() -> chat_export::Result<()> {
//! let markup = std::fs::read_to_string("conversation.html")?;
//! let tree = DomTree::from_html(&markup)?.with_location("https://chatgpt.com/c/<conversation-id>");
//!
//! let html = Exporter::default().export_html(&tree);
//! std::fs::write("export.html", html)?;
//! # Ok(())
//! # }
//! ```
//!
//! ### Using the Tool System
//!
//! ```rust,no_run
//! use chat_export::{BrowserSession, LaunchOptions};
//! use chat_export::tools::{ToolContext, ToolRegistry};
//! use serde_json::json;
//!
//! # fn main() -> chat_export::Result<()> {
//! let session = BrowserSession::launch(LaunchOptions::default())?;
//! let registry = ToolRegistry::with_defaults();
//! let mut context = ToolContext::new(&session);
//!
//! registry.execute("navigate", json!({"url": "/c/<conversation-id>"}), &mut context)?;
//! registry.execute("save_pdf", json!({"path": "conversation.pdf"}), &mut context)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! - [`browser`]: Browser session management and configuration
//! - [`dom`]: Generic element tree, matchers and capture from a tab or saved page
//! - [`export`]: Walker, normalizer, deduplication and document assembly
//! - [`tools`]: Export operations as named tools with JSON parameters
//! - [`error`]: Error types and result aliases
//! - [`mcp`]: Model Context Protocol server (requires `mcp-handler` feature)

pub mod browser;
pub mod dom;
pub mod error;
pub mod export;
pub mod tools;

#[cfg(feature = "mcp-handler")]
pub mod mcp;

pub use browser::{BrowserSession, ConnectionOptions, LaunchOptions};
pub use dom::{DomTree, ElementNode, MatcherSet, Node, NodeMatcher};
pub use error::{ExportError, Result};
pub use export::{ExportDocument, ExportFormat, ExportOptions, Exporter, HostProfile, Sender};
pub use tools::{Tool, ToolContext, ToolRegistry, ToolResult};

#[cfg(feature = "mcp-handler")]
pub use mcp::BrowserServer;
#[cfg(feature = "mcp-handler")]
pub use rmcp::ServiceExt;
