//! CLI binary for gotenberg-node.
//!
//! A thin host over the library crate: each positional input becomes one
//! input item, flags map to `NodeParameters`, and the resulting PDFs are
//! written to disk or printed as host items.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gotenberg_node::{
    credentials_description, execute, node_description, write_results, Credentials,
    ExecutionProgressCallback, GotenbergClient, InputItem, NodeParameters, Operation,
    ProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress bar with one log line per converted item.
struct CliProgressCallback {
    bar: ProgressBar,
    started: std::sync::Mutex<Option<Instant>>,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} {prefix:.bold}  \
                 [{bar:42.green/238}] {pos:>3}/{len} items  ⏱ {elapsed_precise}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  ")
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
        );
        bar.set_prefix("Converting");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            started: std::sync::Mutex::new(None),
        })
    }

    fn item_elapsed(&self) -> String {
        let secs = self
            .started
            .lock()
            .ok()
            .and_then(|mut s| s.take())
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0);
        dim(&format!("{secs:.1}s"))
    }
}

impl ExecutionProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total_items: usize) {
        self.bar.set_length(total_items as u64);
    }

    fn on_item_start(&self, index: usize, _total: usize) {
        if let Ok(mut s) = self.started.lock() {
            *s = Some(Instant::now());
        }
        self.bar.set_message(format!("item {index}"));
    }

    fn on_item_complete(&self, index: usize, total: usize, pdf_bytes: usize) {
        self.bar.println(format!(
            "  {} Item {:>3}/{:<3}  {:<12}  {}",
            green("✓"),
            index,
            total,
            dim(&format!("{pdf_bytes:>8} bytes")),
            self.item_elapsed(),
        ));
        self.bar.inc(1);
    }

    fn on_item_error(&self, index: usize, total: usize, error: &str) {
        // Keep the bar tidy; the full error is reported on exit.
        let msg = match error.char_indices().nth(79) {
            Some((cut, _)) => format!("{}\u{2026}", &error[..cut]),
            None => error.to_string(),
        };
        self.bar.println(format!(
            "  {} Item {:>3}/{:<3}  {}  {}",
            red("✗"),
            index,
            total,
            red(&msg),
            self.item_elapsed(),
        ));
    }

    fn on_batch_complete(&self, _total: usize, _success_count: usize) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Render a web page
  gotenberg url https://example.com -o out/

  # Several pages, one PDF each (page-1.pdf, page-2.pdf)
  gotenberg --output-filename page.pdf url https://a.example https://b.example

  # HTML and Markdown files
  gotenberg html invoice.html --output-filename invoice.pdf
  gotenberg markdown README.md --wrapper template.html

  # Office documents, landscape, selected pages
  gotenberg --landscape --page-ranges 1-3 office slides.pptx

  # Extra form fields are passed through to the service untouched
  gotenberg --option waitDelay=2s --option emulatedMediaType=print url https://example.com

  # Host-shaped JSON items instead of files
  gotenberg --json url https://example.com > items.json

  # Print the node's parameter schema
  gotenberg describe

ENVIRONMENT VARIABLES:
  GOTENBERG_API_URL          Base URL of the Gotenberg service
  GOTENBERG_USERNAME         Basic-auth username
  GOTENBERG_PASSWORD         Basic-auth password
  GOTENBERG_OUTPUT_FILENAME  Name of the produced PDF
  GOTENBERG_OUTPUT_DIR       Directory PDFs are written to
  GOTENBERG_TIMEOUT          Request timeout in seconds (default: none)
  RUST_LOG                   Override log filter (e.g. gotenberg_node=debug)
"#;

/// Convert URLs, HTML, Markdown and Office documents to PDF through Gotenberg.
#[derive(Parser, Debug)]
#[command(
    name = "gotenberg",
    version,
    about = "Convert URLs, HTML, Markdown and Office documents to PDF through Gotenberg",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Base URL of the Gotenberg service.
    #[arg(long, env = "GOTENBERG_API_URL", default_value = "http://localhost:3000", global = true)]
    api_url: String,

    /// Basic-auth username.
    #[arg(long, env = "GOTENBERG_USERNAME", global = true)]
    username: Option<String>,

    /// Basic-auth password.
    #[arg(long, env = "GOTENBERG_PASSWORD", hide_env_values = true, global = true)]
    password: Option<String>,

    /// Name the service gives the produced PDF.
    #[arg(long, env = "GOTENBERG_OUTPUT_FILENAME", default_value = "output.pdf", global = true)]
    output_filename: String,

    /// Landscape paper orientation.
    #[arg(long, global = true)]
    landscape: bool,

    /// Pages to print, e.g. "1-5, 8, 11-13".
    #[arg(long, global = true)]
    page_ranges: Option<String>,

    /// Extra form field sent verbatim (repeatable).
    #[arg(long = "option", value_name = "KEY=VALUE", global = true)]
    options: Vec<String>,

    /// Directory the PDFs are written to.
    #[arg(short, long, env = "GOTENBERG_OUTPUT_DIR", default_value = ".", global = true)]
    output_dir: PathBuf,

    /// Print host items as JSON instead of writing files.
    #[arg(long, global = true)]
    json: bool,

    /// Request timeout in seconds. Unset means no client-side timeout.
    #[arg(long, env = "GOTENBERG_TIMEOUT", global = true)]
    timeout: Option<u64>,

    /// Disable progress bar.
    #[arg(long, global = true)]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render web pages (one PDF per URL).
    Url {
        #[arg(required = true)]
        urls: Vec<String>,
    },
    /// Render HTML files (one PDF per file).
    Html {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Render Markdown files inside an HTML wrapper.
    Markdown {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// HTML template containing {{ toHTML "content.md" }}.
        #[arg(long)]
        wrapper: Option<PathBuf>,
    },
    /// Convert Office documents through LibreOffice.
    Office {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Print the node's parameter and credential schema as JSON.
    Describe,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO-level logs when it is shown.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    if let Command::Describe = cli.command {
        let schema = serde_json::json!({
            "node": node_description(),
            "credentials": credentials_description(),
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&schema).context("Failed to serialise schema")?
        );
        return Ok(());
    }

    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn ExecutionProgressCallback>)
    } else {
        None
    };

    let (params, items) = build_request(&cli, progress_cb).await?;
    let credentials = match (&cli.username, &cli.password) {
        (Some(user), password) => Some(Credentials::new(
            user.clone(),
            password.clone().unwrap_or_default(),
        )),
        (None, _) => None,
    };
    let host = match cli.timeout {
        Some(secs) => GotenbergClient::with_timeout(credentials, secs),
        None => GotenbergClient::new(credentials),
    }
    .context("Failed to create HTTP client")?;

    // ── Run conversion ───────────────────────────────────────────────────
    let start = Instant::now();
    let results = execute(&host, &params, &items)
        .await
        .context("Conversion failed")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&results).context("Failed to serialise output")?;
        println!("{json}");
        return Ok(());
    }

    let paths = write_results(&results, &cli.output_dir)
        .await
        .context("Failed to write PDFs")?;

    if !cli.quiet {
        for path in &paths {
            eprintln!("{}  {}", green("✔"), bold(&path.display().to_string()));
        }
        eprintln!(
            "   {} item(s) in {}ms",
            dim(&paths.len().to_string()),
            start.elapsed().as_millis()
        );
    }

    Ok(())
}

/// Map CLI args to `NodeParameters` and input items.
async fn build_request(
    cli: &Cli,
    progress: Option<ProgressCallback>,
) -> Result<(NodeParameters, Vec<InputItem>)> {
    let mut builder = NodeParameters::builder()
        .api_url(&cli.api_url)
        .output_filename(&cli.output_filename);

    if cli.landscape {
        builder = builder.landscape(true);
    }
    if let Some(ref ranges) = cli.page_ranges {
        builder = builder.page_ranges(ranges);
    }
    for raw in &cli.options {
        let (key, value) = parse_option(raw)?;
        builder = builder.option(key, value);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    let (builder, items): (_, Vec<InputItem>) = match &cli.command {
        Command::Url { urls } => (
            builder.operation(Operation::ConvertUrl),
            urls.iter()
                .map(|u| InputItem::new().with_field("url", u.as_str()))
                .collect(),
        ),
        Command::Html { files } => (
            builder.operation(Operation::ConvertHtml),
            text_items(files, "htmlContent").await?,
        ),
        Command::Markdown { files, wrapper } => {
            let mut builder = builder.operation(Operation::ConvertMarkdown);
            if let Some(path) = wrapper {
                builder = builder.html_wrapper(read_text(path).await?);
            }
            (builder, text_items(files, "markdownContent").await?)
        }
        Command::Office { files } => (
            builder.operation(Operation::ConvertOffice),
            files
                .iter()
                .map(|f| InputItem::new().with_field("officeFile", f.display().to_string()))
                .collect(),
        ),
        Command::Describe => anyhow::bail!("describe does not convert anything"),
    };

    let params = builder.build().context("Invalid configuration")?;
    Ok((params, items))
}

/// One item per file, with the file's text under `field`.
async fn text_items(files: &[PathBuf], field: &str) -> Result<Vec<InputItem>> {
    let mut items = Vec::with_capacity(files.len());
    for path in files {
        items.push(InputItem::new().with_field(field, read_text(path).await?));
    }
    Ok(items)
}

async fn read_text(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {:?}", path))
}

/// Parse `--option key=value`.
fn parse_option(raw: &str) -> Result<(String, String)> {
    let Some((key, value)) = raw.split_once('=') else {
        anyhow::bail!("Invalid option '{}': expected KEY=VALUE", raw);
    };
    let key = key.trim();
    if key.is_empty() {
        anyhow::bail!("Invalid option '{}': key is empty", raw);
    }
    Ok((key.to_string(), value.to_string()))
}
