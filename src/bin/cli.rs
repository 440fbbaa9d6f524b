//! chat-export command line
//!
//! `file` exports a saved conversation page without a browser; `live`
//! exports the conversation open in a (launched or attached) browser.

use anyhow::Context;
use chat_export::browser::{BrowserSession, ConnectionOptions, LaunchOptions};
use chat_export::dom::parse_saved_page;
use chat_export::export::{ExportDocument, ExportFormat, ExportOptions, Exporter, HostProfile};
use chat_export::tools::utils::{file_stem_for, normalize_url};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "chat-export")]
#[command(version)]
#[command(about = "Export ChatGPT conversations to standalone HTML, Markdown or PDF", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Export a saved conversation page
    File {
        /// Saved page (HTML)
        input: PathBuf,

        /// Conversation URL recorded as the document source
        #[arg(long, value_name = "URL")]
        source: Option<String>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Export the conversation open in a browser
    Live {
        /// Conversation to open first; the active tab is used when omitted
        #[arg(long, value_name = "URL")]
        url: Option<String>,

        /// WebSocket endpoint of an already running browser
        #[arg(long, value_name = "URL")]
        ws_endpoint: Option<String>,

        /// Launch browser in headed mode (default: headless)
        #[arg(long, short = 'H')]
        headed: bool,

        /// Persistent browser profile directory, e.g. one that is logged in
        #[arg(long, value_name = "DIR")]
        user_data_dir: Option<PathBuf>,

        /// Also print the export to this PDF file
        #[arg(long, value_name = "PATH")]
        pdf: Option<PathBuf>,

        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Args)]
struct OutputArgs {
    /// Output file; derived from the document title when omitted
    #[arg(long, short = 'o', value_name = "PATH")]
    output: Option<PathBuf>,

    #[arg(long, value_enum, default_value = "html")]
    format: ExportFormat,

    /// JSON host profile overriding the built-in ChatGPT matchers
    #[arg(long, value_name = "PATH")]
    profile: Option<PathBuf>,
}

impl OutputArgs {
    fn exporter(&self) -> anyhow::Result<Exporter> {
        let profile = match &self.profile {
            Some(path) => HostProfile::from_json_file(path)?,
            None => HostProfile::default(),
        };
        Ok(Exporter::new(profile, ExportOptions::default()))
    }

    fn write(&self, exporter: &Exporter, document: &ExportDocument) -> anyhow::Result<PathBuf> {
        let path = match &self.output {
            Some(path) => path.clone(),
            None => default_output(exporter, document),
        };
        std::fs::write(&path, &document.content).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }
}

fn default_output(exporter: &Exporter, document: &ExportDocument) -> PathBuf {
    let title = format!("{} - {}", exporter.options().title, document.date.format("%Y-%m-%d"));
    let extension = match document.format {
        ExportFormat::Html => "html",
        ExportFormat::Markdown => "md",
    };
    PathBuf::from(format!("{}.{}", file_stem_for(&title), extension))
}

fn export_file(input: &Path, source: Option<String>, output: &OutputArgs) -> anyhow::Result<()> {
    let markup = std::fs::read_to_string(input).with_context(|| format!("Failed to read {}", input.display()))?;
    let location = source.unwrap_or_else(|| format!("file://{}", input.display()));

    let exporter = output.exporter()?;
    let tree = parse_saved_page(&markup, &location)?;
    let document = exporter.export(&tree, output.format);

    let path = output.write(&exporter, &document)?;
    println!("Exported {} messages to {}", document.kept, path.display());
    Ok(())
}

struct LiveArgs {
    url: Option<String>,
    ws_endpoint: Option<String>,
    headed: bool,
    user_data_dir: Option<PathBuf>,
    pdf: Option<PathBuf>,
}

fn export_live(args: LiveArgs, output: &OutputArgs) -> anyhow::Result<()> {
    let session = match args.ws_endpoint {
        Some(endpoint) => BrowserSession::connect(ConnectionOptions::new(endpoint))?,
        None => {
            let mut options = LaunchOptions::new().headless(!args.headed);
            if let Some(dir) = args.user_data_dir {
                options = options.user_data_dir(dir);
            }
            BrowserSession::launch(options)?
        }
    };

    if let Some(url) = args.url {
        let url = normalize_url(&url);
        log::info!("Opening {}", url);
        session.navigate(&url)?;
        session.wait_for_navigation()?;
    }

    let exporter = output.exporter()?;
    let tree = session.extract_dom()?;

    let document = exporter.export(&tree, output.format);
    let path = output.write(&exporter, &document)?;
    println!("Exported {} messages to {}", document.kept, path.display());

    if let Some(pdf_path) = args.pdf {
        let printable = exporter.export_for_print(&tree);
        let pdf = session.render_pdf(&printable.content)?;
        std::fs::write(&pdf_path, pdf).with_context(|| format!("Failed to write {}", pdf_path.display()))?;
        println!("Saved PDF to {}", pdf_path.display());
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::File { input, source, output } => export_file(&input, source, &output),
        Command::Live {
            url,
            ws_endpoint,
            headed,
            user_data_dir,
            pdf,
            output,
        } => export_live(
            LiveArgs {
                url,
                ws_endpoint,
                headed,
                user_data_dir,
                pdf,
            },
            &output,
        ),
    }
}
