use crate::{browser::config::{ConnectionOptions, LaunchOptions},
            dom::DomTree,
            error::{ExportError, Result},
            export::{ExportDocument, ExportFormat, Exporter},
            tools::{ToolContext, ToolRegistry}};
use headless_chrome::{Browser, Tab, types::PrintToPdfOptions};
use std::{ffi::OsStr,
          io::Write,
          path::Path,
          sync::Arc,
          time::Duration};
use tempfile::NamedTempFile;

/// Browser session that manages a Chrome/Chromium instance
pub struct BrowserSession {
    /// The underlying headless_chrome Browser instance
    browser: Browser,

    /// Tool registry for executing export tools
    tool_registry: ToolRegistry,
}

impl BrowserSession {
    /// Launch a new browser instance with the given options
    pub fn launch(options: LaunchOptions) -> Result<Self> {
        let mut launch_opts = headless_chrome::LaunchOptions::default();

        // Host sites refuse to render conversations for automation-flagged browsers
        launch_opts.ignore_default_args.push(OsStr::new("--enable-automation"));
        launch_opts.args.push(OsStr::new("--disable-blink-features=AutomationControlled"));

        // Keep the browser alive while the user logs in and opens a conversation
        launch_opts.idle_browser_timeout = Duration::from_secs(60 * 60);

        launch_opts.headless = options.headless;
        launch_opts.window_size = Some((options.window_width, options.window_height));

        if let Some(path) = options.chrome_path {
            launch_opts.path = Some(path);
        }

        if let Some(dir) = options.user_data_dir {
            launch_opts.user_data_dir = Some(dir);
        }

        launch_opts.sandbox = options.sandbox;

        let browser = Browser::new(launch_opts).map_err(|e| ExportError::LaunchFailed(e.to_string()))?;

        browser.new_tab().map_err(|e| ExportError::LaunchFailed(format!("Failed to create tab: {}", e)))?;

        Ok(Self { browser, tool_registry: ToolRegistry::with_defaults() })
    }

    /// Connect to an existing browser instance via WebSocket
    pub fn connect(options: ConnectionOptions) -> Result<Self> {
        let browser = Browser::connect_with_timeout(options.ws_url, Duration::from_millis(options.timeout))
            .map_err(|e| ExportError::ConnectionFailed(e.to_string()))?;

        Ok(Self { browser, tool_registry: ToolRegistry::with_defaults() })
    }

    /// Launch a browser with default options
    pub fn new() -> Result<Self> {
        Self::launch(LaunchOptions::default())
    }

    /// Get the active tab
    pub fn tab(&self) -> Result<Arc<Tab>> {
        self.get_active_tab()
    }

    /// Create a new tab
    pub fn new_tab(&self) -> Result<Arc<Tab>> {
        self.browser
            .new_tab()
            .map_err(|e| ExportError::TabOperationFailed(format!("Failed to create tab: {}", e)))
    }

    /// Get all tabs
    pub fn get_tabs(&self) -> Result<Vec<Arc<Tab>>> {
        let tabs = self
            .browser
            .get_tabs()
            .lock()
            .map_err(|e| ExportError::TabOperationFailed(format!("Failed to get tabs: {}", e)))?
            .clone();

        Ok(tabs)
    }

    /// Get the currently active tab by checking the document visibility and focus state
    pub fn get_active_tab(&self) -> Result<Arc<Tab>> {
        let tabs = self.get_tabs()?;

        // Visible and focused is the strongest signal
        for tab in &tabs {
            match tab.evaluate("document.visibilityState === 'visible' && document.hasFocus()", false) {
                Ok(remote_object) => {
                    if remote_object.value.and_then(|v| v.as_bool()).unwrap_or(false) {
                        return Ok(tab.clone());
                    }
                }
                Err(e) => {
                    log::debug!("Failed to check tab status: {}", e);
                    continue;
                }
            }
        }

        for tab in &tabs {
            if let Ok(remote_object) = tab.evaluate("document.visibilityState === 'visible'", false) {
                if remote_object.value.and_then(|v| v.as_bool()).unwrap_or(false) {
                    return Ok(tab.clone());
                }
            }
        }

        Err(ExportError::TabOperationFailed("No active tab found".to_string()))
    }

    /// Get the underlying Browser instance
    pub fn browser(&self) -> &Browser {
        &self.browser
    }

    /// Navigate to a URL using the active tab
    pub fn navigate(&self, url: &str) -> Result<()> {
        self.tab()?
            .navigate_to(url)
            .map_err(|e| ExportError::NavigationFailed(format!("Failed to navigate to {}: {}", url, e)))?;

        Ok(())
    }

    /// Wait for navigation to complete
    pub fn wait_for_navigation(&self) -> Result<()> {
        self.tab()?
            .wait_until_navigated()
            .map_err(|e| ExportError::NavigationFailed(format!("Navigation timeout: {}", e)))?;

        Ok(())
    }

    /// Location of the active tab
    pub fn current_url(&self) -> Result<String> {
        Ok(self.tab()?.get_url())
    }

    /// Extract the DOM tree from the active tab
    pub fn extract_dom(&self) -> Result<DomTree> {
        crate::dom::extract_dom(&self.tab()?)
    }

    /// Export the conversation shown in the active tab
    pub fn export_conversation(&self, exporter: &Exporter, format: ExportFormat) -> Result<ExportDocument> {
        let tree = self.extract_dom()?;
        Ok(exporter.export(&tree, format))
    }

    /// Open an export document in a new, focused tab for the user to print or save
    ///
    /// The document file outlives the call so the tab can reload it.
    pub fn open_document(&self, html: &str) -> Result<Arc<Tab>> {
        let path = temp_document(html)?
            .into_temp_path()
            .keep()
            .map_err(|e| e.error)?;
        let tab = self.load_file(&path)?;

        tab.activate()
            .map_err(|e| ExportError::TabOperationFailed(format!("Failed to activate tab: {}", e)))?;

        Ok(tab)
    }

    /// Print an export document to PDF through the browser's print pipeline
    ///
    /// The document should not carry the auto-print script; the headless
    /// viewer is printed over CDP instead. The temporary document is removed
    /// when this returns, on success or failure.
    pub fn render_pdf(&self, html: &str) -> Result<Vec<u8>> {
        let document = temp_document(html)?;
        let tab = self.load_file(document.path())?;

        let pdf = tab
            .print_to_pdf(Some(PrintToPdfOptions {
                print_background: Some(true),
                ..Default::default()
            }))
            .map_err(|e| ExportError::PdfRenderFailed(e.to_string()));

        close_tab(&tab);
        pdf
    }

    /// Load a local file in a new tab; the tab is closed again if loading fails
    fn load_file(&self, path: &Path) -> Result<Arc<Tab>> {
        let url = format!("file://{}", path.display());
        let tab = self.new_tab()?;

        if let Err(e) = tab.navigate_to(&url).and_then(|t| t.wait_until_navigated()) {
            close_tab(&tab);
            return Err(ExportError::NavigationFailed(format!("Failed to load {}: {}", url, e)));
        }

        Ok(tab)
    }

    /// Get the tool registry
    pub fn tool_registry(&self) -> &ToolRegistry {
        &self.tool_registry
    }

    /// Get mutable tool registry
    pub fn tool_registry_mut(&mut self) -> &mut ToolRegistry {
        &mut self.tool_registry
    }

    /// Execute a tool by name
    pub fn execute_tool(&self, name: &str, params: serde_json::Value) -> Result<crate::tools::ToolResult> {
        let mut context = ToolContext::new(self);
        self.tool_registry.execute(name, params, &mut context)
    }

    /// Close the browser
    pub fn close(&self) -> Result<()> {
        // The browser process exits when `Browser` is dropped; closing tabs is the best we can do here
        for tab in self.get_tabs()? {
            close_tab(&tab);
        }
        Ok(())
    }
}

/// Write `html` to a temporary `.html` file, removed when dropped
fn temp_document(html: &str) -> Result<NamedTempFile> {
    let mut file = tempfile::Builder::new().prefix("chat-export-").suffix(".html").tempfile()?;
    file.write_all(html.as_bytes())?;
    file.flush()?;
    Ok(file)
}

fn close_tab(tab: &Tab) {
    if let Err(e) = tab.close(false) {
        log::debug!("Failed to close tab: {}", e);
    }
}
