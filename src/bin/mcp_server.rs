//! Chat export MCP server
//!
//! Exposes the conversation export tools to MCP clients over stdio or
//! streamable HTTP.

use chat_export::browser::{ConnectionOptions, LaunchOptions};
use chat_export::mcp::BrowserServer;
use clap::{Parser, ValueEnum};
use rmcp::{ServiceExt, transport::stdio};
use rmcp::transport::streamable_http_server::{StreamableHttpService, session::local::LocalSessionManager};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Transport {
    /// Standard input/output transport (default)
    Stdio,
    /// HTTP streamable transport
    Http,
}

#[derive(Parser)]
#[command(name = "chat-export-mcp")]
#[command(version)]
#[command(about = "ChatGPT conversation export MCP server", long_about = None)]
struct Cli {
    /// Launch browser in headed mode (default: headless)
    #[arg(long, short = 'H')]
    headed: bool,

    /// Path to custom browser executable
    #[arg(long, value_name = "PATH")]
    executable_path: Option<String>,

    /// WebSocket endpoint of an already running browser
    #[arg(long, value_name = "URL")]
    ws_endpoint: Option<String>,

    /// Persistent browser profile directory, e.g. one that is logged in
    #[arg(long, value_name = "DIR")]
    user_data_dir: Option<String>,

    /// Transport type to use
    #[arg(long, short = 't', value_enum, default_value = "stdio")]
    transport: Transport,

    /// Port for HTTP transport
    #[arg(long, short = 'p', default_value = "3000")]
    port: u16,

    /// HTTP streamable endpoint path
    #[arg(long, default_value = "/mcp")]
    http_path: String,
}

/// How each server instance gets its browser
#[derive(Clone)]
enum BrowserSource {
    Launch(LaunchOptions),
    Connect(ConnectionOptions),
}

impl BrowserSource {
    fn from_cli(cli: &Cli) -> Self {
        if let Some(ref endpoint) = cli.ws_endpoint {
            return Self::Connect(ConnectionOptions::new(endpoint.clone()));
        }

        let mut options = LaunchOptions::new().headless(!cli.headed);
        if let Some(ref path) = cli.executable_path {
            options = options.chrome_path(path);
        }
        if let Some(ref dir) = cli.user_data_dir {
            options = options.user_data_dir(dir);
        }
        Self::Launch(options)
    }

    fn start(&self) -> chat_export::Result<BrowserServer> {
        match self {
            Self::Launch(options) => BrowserServer::with_options(options.clone()),
            Self::Connect(options) => BrowserServer::connect(options.clone()),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();
    let source = BrowserSource::from_cli(&cli);

    log::info!("Chat export MCP server v{}", env!("CARGO_PKG_VERSION"));
    match &source {
        BrowserSource::Launch(options) => {
            log::info!("Browser mode: {}", if options.headless { "headless" } else { "headed" });
        }
        BrowserSource::Connect(options) => log::info!("WebSocket endpoint: {}", options.ws_url),
    }

    match cli.transport {
        Transport::Stdio => {
            log::info!("Ready to accept MCP connections via stdio");
            let service = source.start()?;
            let server = service.serve(stdio()).await?;
            let quit_reason = server.waiting().await?;
            log::info!("Server quit with reason: {:?}", quit_reason);
            // Give a small delay for destructors to complete
            tokio::time::sleep(tokio::time::Duration::from_millis(200)).await;
        }
        Transport::Http => {
            let bind_addr = format!("127.0.0.1:{}", cli.port);

            let service_factory = move || source.start().map_err(std::io::Error::other);

            let http_service = StreamableHttpService::new(
                service_factory,
                LocalSessionManager::default().into(),
                Default::default(),
            );

            let router = axum::Router::new().nest_service(&cli.http_path, http_service);

            log::info!("Ready to accept MCP connections at http://{}{}", bind_addr, cli.http_path);

            let listener = tokio::net::TcpListener::bind(bind_addr).await?;
            axum::serve(listener, router).await?;
        }
    }

    Ok(())
}
