use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{CommandFactory, Parser};
use headliner_core::{QuerySyntax, ScrapeConfig, Scraper, SelectorConfig, TextEncoding};
use tracing::info;

mod echo;
mod logging;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Scrape a news listing page into a spreadsheet and a plain-text report
#[derive(Parser, Debug)]
#[command(name = "headliner")]
#[command(version)]
#[command(about = "Scrape a news listing page into a spreadsheet and a plain-text report", long_about = None)]
struct Args {
    /// Listing page URL (http, https or file)
    #[arg(short, long, value_name = "URL")]
    url: Option<String>,

    /// TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Query syntax (css, xpath); switches to that syntax's default queries
    #[arg(long, value_name = "SYNTAX")]
    syntax: Option<QuerySyntax>,

    /// Query matching one element per article teaser
    #[arg(long, value_name = "QUERY")]
    article_query: Option<String>,

    /// Query, relative to a teaser, matching its title link
    #[arg(long, value_name = "QUERY")]
    title_query: Option<String>,

    /// Attribute of the title link holding the title
    #[arg(long, value_name = "ATTR")]
    title_attr: Option<String>,

    /// Attribute of the title link holding the article URL
    #[arg(long, value_name = "ATTR")]
    url_attr: Option<String>,

    /// Attempts per request, including the first
    #[arg(long, value_name = "NUM")]
    max_retries: Option<u32>,

    /// HTTP timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Spreadsheet output file
    #[arg(long, value_name = "FILE")]
    xlsx: Option<PathBuf>,

    /// Text report output file
    #[arg(long, value_name = "FILE")]
    text: Option<PathBuf>,

    /// Text report encoding (utf-8, utf-8-sig)
    #[arg(long, value_name = "ENCODING")]
    encoding: Option<TextEncoding>,

    /// Fetch every article page and extract its body text
    #[arg(long)]
    content: bool,

    /// Keep teasers carrying advertisement class markers
    #[arg(long)]
    keep_ads: bool,

    /// Directory for run logs
    #[arg(long, default_value = "logs", value_name = "DIR")]
    log_dir: PathBuf,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Generate shell completion script
    #[arg(long, value_name = "SHELL")]
    completions: Option<clap_complete::Shell>,
}

/// Defaults, then the configuration file, then command-line flags.
fn build_config(args: &Args) -> anyhow::Result<ScrapeConfig> {
    let mut config = match &args.config {
        Some(path) => ScrapeConfig::load(path)
            .with_context(|| format!("Failed to load configuration: {}", path.display()))?,
        None => ScrapeConfig::default(),
    };

    if let Some(url) = &args.url {
        config.listing_url = url.clone();
    }

    if let Some(syntax) = args.syntax
        && syntax != config.selectors.syntax
    {
        let defaults = SelectorConfig::defaults_for(syntax);
        config.selectors = SelectorConfig {
            title_attr: config.selectors.title_attr.clone(),
            url_attr: config.selectors.url_attr.clone(),
            ..defaults
        };
    }
    if let Some(query) = &args.article_query {
        config.selectors.article_query = query.clone();
    }
    if let Some(query) = &args.title_query {
        config.selectors.title_query = query.clone();
    }
    if let Some(attr) = &args.title_attr {
        config.selectors.title_attr = attr.clone();
    }
    if let Some(attr) = &args.url_attr {
        config.selectors.url_attr = attr.clone();
    }

    if let Some(max_retries) = args.max_retries {
        config.fetch.max_retries = max_retries;
    }
    if let Some(timeout) = args.timeout {
        config.fetch.timeout_secs = timeout;
    }

    if let Some(path) = &args.xlsx {
        config.export.spreadsheet.path = path.clone();
    }
    if let Some(path) = &args.text {
        config.export.text.path = path.clone();
    }
    if let Some(encoding) = args.encoding {
        config.export.text.encoding = encoding;
    }

    config.fetch_content |= args.content;
    if args.keep_ads {
        config.filter_ads = false;
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    if let Some(shell) = args.completions {
        clap_complete::generate(shell, &mut Args::command(), "headliner", &mut io::stdout());
        return Ok(ExitCode::SUCCESS);
    }

    let config = build_config(&args)?;
    let log_path = logging::init(&args.log_dir, args.verbose)?;

    if args.verbose {
        echo::print_banner(&config);
        echo::print_info(&format!("Logging to {}", log_path.display()));
    }
    info!(log = %log_path.display(), "Starting VnExpress scraper");

    let report = Scraper::new(config).context("Failed to set up scraper")?.run();
    echo::print_report(&report);

    Ok(if report.produced_output() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> Args {
        Args::parse_from(std::iter::once("headliner").chain(extra.iter().copied()))
    }

    #[test]
    fn test_defaults_without_flags() {
        let config = build_config(&args(&[])).unwrap();
        assert_eq!(config, ScrapeConfig::default());
    }

    #[test]
    fn test_flags_override_defaults() {
        let config = build_config(&args(&[
            "--url",
            "https://example.com/news",
            "--max-retries",
            "5",
            "--timeout",
            "3",
            "--text",
            "out.txt",
            "--encoding",
            "utf-8-sig",
            "--content",
            "--keep-ads",
        ]))
        .unwrap();

        assert_eq!(config.listing_url, "https://example.com/news");
        assert_eq!(config.fetch.max_retries, 5);
        assert_eq!(config.fetch.timeout_secs, 3);
        assert_eq!(config.export.text.path, PathBuf::from("out.txt"));
        assert_eq!(config.export.text.encoding, TextEncoding::Utf8Bom);
        assert!(config.fetch_content);
        assert!(!config.filter_ads);
    }

    #[test]
    fn test_syntax_switch_takes_its_defaults() {
        let config = build_config(&args(&["--syntax", "xpath", "--title-attr", "data-title"])).unwrap();
        assert_eq!(config.selectors.syntax, QuerySyntax::XPath);
        assert!(config.selectors.article_query.starts_with("//article"));
        assert_eq!(config.selectors.title_attr, "data-title");
    }

    #[test]
    fn test_invalid_override_rejected() {
        assert!(build_config(&args(&["--max-retries", "0"])).is_err());
        assert!(build_config(&args(&["--article-query", "article["])).is_err());
    }

    #[test]
    fn test_command_is_well_formed() {
        Args::command().debug_assert();
    }
}
