use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Instant;

use anyhow::Context;
use blaze_core::{
    BlazeError, ExtractConfig, FetchConfig, OutputFormat, Reader, fetch_file, fetch_stdin, fetch_url, proxy_links,
};
use clap::Parser;
use owo_colors::OwoColorize;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use url::Url;

mod echo;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Output format accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Markdown,
    Html,
    Text,
    Json,
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "markdown" | "md" => Ok(Self::Markdown),
            "html" => Ok(Self::Html),
            "text" | "txt" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid format: {}. Valid options: markdown, html, text, json", s)),
        }
    }
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Markdown => OutputFormat::Markdown,
            Format::Html => OutputFormat::Html,
            Format::Text => OutputFormat::PlainText,
            Format::Json => OutputFormat::Json,
        }
    }
}

/// Read the main content of a web page, without the clutter
#[derive(Parser, Debug)]
#[command(name = "blaze")]
#[command(version)]
#[command(about = "Reader mode for web pages: extract the main content", long_about = None)]
struct Args {
    /// URL to fetch, local HTML file, or "-" for stdin
    #[arg(value_name = "INPUT")]
    input: String,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Output format (html, text, json, markdown)
    #[arg(short, long, default_value = "html", value_name = "FORMAT")]
    format: Format,

    /// HTTP timeout in seconds
    #[arg(long, default_value = "30", value_name = "SECS")]
    timeout: u64,

    /// Custom User-Agent for HTTP requests
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,

    /// JSON file with extraction settings
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Text length a semantic element must exceed to win without scoring
    #[arg(long, value_name = "NUM")]
    semantic_min_chars: Option<usize>,

    /// Text length below which a scored container is ignored
    #[arg(long, value_name = "NUM")]
    min_candidate_chars: Option<usize>,

    /// Resolve relative links against this URL (defaults to INPUT when it is a URL)
    #[arg(long, value_name = "URL", value_parser = Url::parse)]
    base_url: Option<Url>,

    /// Rewrite every link to ROUTE?url=<original>
    #[arg(long, value_name = "ROUTE")]
    proxy: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn is_url(&self) -> bool {
        self.input.starts_with("http://") || self.input.starts_with("https://")
    }

    /// Settings file first, then individual flags on top
    fn extract_config(&self) -> anyhow::Result<ExtractConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let raw = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file: {}", path.display()))?;
                serde_json::from_str(&raw).with_context(|| format!("Invalid config file: {}", path.display()))?
            }
            None => ExtractConfig::default(),
        };

        if let Some(chars) = self.semantic_min_chars {
            config.semantic_min_text_len = chars;
        }
        if let Some(chars) = self.min_candidate_chars {
            config.score.min_text_len = chars;
        }

        Ok(config)
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    if args.verbose {
        echo::print_banner();
        echo::print_info("Debug logging enabled");
        eprintln!();
    }

    let started = Instant::now();
    let html = if args.input == "-" {
        if args.verbose {
            echo::print_step(1, 4, "Reading from stdin");
        }
        fetch_stdin().context("Failed to read from stdin")?
    } else if args.is_url() {
        if args.verbose {
            echo::print_step(1, 4, &format!("Fetching from {}", args.input.bright_white().underline()));
        }

        let mut config = FetchConfig { timeout: args.timeout, ..Default::default() };
        if let Some(user_agent) = &args.user_agent {
            config.user_agent = user_agent.clone();
        }

        fetch_url(&args.input, &config).await.context("Failed to fetch URL")?
    } else {
        if args.verbose {
            echo::print_step(1, 4, &format!("Reading from file {}", args.input.bright_white()));
        }
        fetch_file(&args.input).with_context(|| format!("Failed to read file: {}", args.input))?
    };

    if args.verbose {
        eprintln!("  {} {}", "Size:".dimmed(), echo::format_size(html.len()).bright_white());
        echo::print_timing("Read", started.elapsed());
        eprintln!();
        echo::print_step(2, 4, "Loading settings");
    }

    let reader = Reader::with_config(args.extract_config()?).context("Invalid extraction settings")?;

    if args.verbose {
        echo::print_step(3, 4, "Extracting main content");
    }

    let extracting = Instant::now();
    let base_url = match &args.base_url {
        Some(url) => Some(url.to_string()),
        None => args.is_url().then(|| args.input.clone()),
    };
    debug!(?base_url, bytes = html.len(), "extracting");
    let result = match &base_url {
        Some(url) => reader.parse_with_url(&html, url),
        None => reader.parse(&html),
    };

    let mut article = match result {
        Ok(article) => article,
        Err(BlazeError::NoCandidate) => {
            echo::print_warning("This page could not be simplified");
            return Err(BlazeError::NoCandidate).context("Failed to extract content");
        }
        Err(e) => return Err(e).context("Failed to extract content"),
    };

    if let Some(route) = &args.proxy {
        article.content = proxy_links(&article.content, route).context("Failed to rewrite links")?;
    }

    if args.verbose {
        echo::print_timing("Extract", extracting.elapsed());
        echo::print_extraction_details(&article);
        echo::print_step(4, 4, "Writing output");
        eprintln!("  {} {}", "Format:".dimmed(), format!("{:?}", args.format).bright_white());
        eprintln!();
    }

    let output = article
        .to_format(args.format.into())
        .context("Failed to render article")?;

    match args.output {
        Some(path) => {
            fs::write(&path, output).with_context(|| format!("Failed to write to file: {}", path.display()))?;
            echo::print_success(&format!("Output written to {}", path.display().bright_white()));
        }
        None => {
            println!("{}", output);
        }
    }

    Ok(())
}
