//! CLI binary for edgequake-pdf2prod.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ExtractionConfig`, drives a `Dashboard` and prints the report.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_pdf2prod::{
    parse_extraction, AccentColor, Dashboard, DashboardObserver, ExtractionConfig,
    NormalizedReport, PreferenceStore, ReportError,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::future::Future;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
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

// ── CLI observer using indicatif ─────────────────────────────────────────────

/// Spinner shown while an extraction is in flight, plus the one-line
/// success/failure notifications.
struct CliObserver {
    bar: ProgressBar,
}

impl CliObserver {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Extracting");
        Arc::new(Self { bar })
    }
}

impl DashboardObserver for CliObserver {
    fn on_upload_start(&self, input: &str) {
        self.bar.set_message(input.to_string());
        self.bar.enable_steady_tick(Duration::from_millis(80));
    }

    fn on_report_ready(&self, report: &NormalizedReport) {
        self.bar.finish_and_clear();
        let date = if report.date.is_empty() {
            "undated report"
        } else {
            report.date.as_str()
        };
        eprintln!("{} Report loaded  {}", green("✔"), dim(date));
    }

    fn on_upload_failed(&self, error: &ReportError) {
        self.bar.finish_and_clear();
        let (title, description) = error.user_message();
        eprintln!("{} {}  {}", red("✘"), bold(title), dim(&description));
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Extract a daily report and print the summary text
  pdf2prod daily_report.pdf

  # Normalized report as JSON
  pdf2prod --json daily_report.pdf > report.json

  # Re-render a saved model reply without calling the model
  pdf2prod --from-json reply.json

  # Chart series and their descriptions
  pdf2prod --charts --describe-charts daily_report.pdf

  # Suggested explanations for the day's figures
  pdf2prod --insights daily_report.pdf

  # Store the API key and accent color once
  pdf2prod --save-api-key AIza... --accent "Sky Blue"

ENVIRONMENT VARIABLES:
  GEMINI_API_KEY          Google Gemini API key (default provider)
  OPENAI_API_KEY          OpenAI API key
  ANTHROPIC_API_KEY       Anthropic API key
  EDGEQUAKE_PROVIDER      Override provider (gemini, openai, anthropic, ollama)
  EDGEQUAKE_MODEL         Override model ID
  RUST_LOG                Override the log filter

PREFERENCES:
  The saved API key and accent color live in
  ~/.config/pdf2prod/preferences.json (platform config directory).
"#;

/// Extract daily production reports from PDFs using Vision LLMs.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2prod",
    version,
    about = "Extract daily production reports from PDFs using Vision LLMs",
    long_about = "Send a daily production-report PDF (local file or URL) to a Vision Language \
Model, normalize the Lantabur and Taqwa figures, and print them as a fixed-layout summary, \
JSON, or chart series.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF/image path or HTTP/HTTPS URL (a JSON file with --from-json).
    input: Option<String>,

    /// Treat INPUT as a saved model reply; no model call is made.
    #[arg(long)]
    from_json: bool,

    /// Print the normalized report as JSON instead of the summary text.
    #[arg(long, env = "PDF2PROD_JSON")]
    json: bool,

    /// Print the chart series derived from the report.
    #[arg(long)]
    charts: bool,

    /// Ask the model to describe each chart.
    #[arg(long)]
    describe_charts: bool,

    /// Ask the model for explanations of the day's figures.
    #[arg(long)]
    insights: bool,

    /// API key for this run only (overrides the saved key).
    #[arg(long)]
    api_key: Option<String>,

    /// Save this API key to the preferences file.
    #[arg(long)]
    save_api_key: Option<String>,

    /// Save the accent color: "Light Green", "Sky Blue", "Thistle", "Coral".
    #[arg(long)]
    accent: Option<String>,

    /// Preferences file (defaults to the platform config directory).
    #[arg(long, env = "PDF2PROD_PREFERENCES")]
    preferences: Option<PathBuf>,

    /// LLM provider: gemini, openai, anthropic, ollama, azure.
    #[arg(long, env = "EDGEQUAKE_PROVIDER")]
    provider: Option<String>,

    /// LLM model ID (e.g. gemini-2.0-flash, gpt-4.1-mini).
    #[arg(long, env = "EDGEQUAKE_MODEL")]
    model: Option<String>,

    /// Seconds to wait for each model call before giving up.
    #[arg(long, env = "PDF2PROD_TIMEOUT", default_value_t = 120)]
    timeout: u64,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "PDF2PROD_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Disable the spinner.
    #[arg(long, env = "PDF2PROD_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2PROD_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors and the report itself.
    #[arg(short, long, env = "PDF2PROD_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner carries the feedback, so INFO logs would only interleave
    // with it.
    let show_progress = !cli.quiet && !cli.no_progress;
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

    // ── Preferences ──────────────────────────────────────────────────────
    let store = match cli.preferences {
        Some(ref path) => PreferenceStore::at(path),
        None => PreferenceStore::default_location().context("Failed to locate preferences")?,
    };
    let mut dashboard = Dashboard::with_store(store).context("Failed to load preferences")?;
    if show_progress {
        dashboard = dashboard.with_observer(CliObserver::new());
    }

    if let Some(ref key) = cli.save_api_key {
        dashboard
            .set_api_key(key.trim())
            .context("Failed to save API key")?;
        if !cli.quiet {
            eprintln!("{} API key saved", green("✔"));
        }
    }
    if let Some(ref name) = cli.accent {
        let accent: AccentColor = name.parse()?;
        dashboard.set_accent(accent).context("Failed to save accent color")?;
        if !cli.quiet {
            eprintln!("{} Accent set to {}  {}", green("✔"), bold(accent.name()), dim(accent.hsl()));
        }
    }

    let Some(ref input) = cli.input else {
        return Ok(());
    };

    // ── Load the report ──────────────────────────────────────────────────
    let config = build_config(&cli)?;
    let limit = Duration::from_secs(cli.timeout);

    if cli.from_json {
        let text = tokio::fs::read_to_string(input)
            .await
            .with_context(|| format!("Failed to read {input}"))?;
        let raw = parse_extraction(&text).map_err(report_error)?;
        dashboard.load_raw(raw).map_err(report_error)?;
    } else {
        let outcome = tokio::time::timeout(limit, dashboard.upload(input, &config))
            .await
            .map(|result| result.map(|_| ()));
        match outcome {
            Ok(result) => result.map_err(report_error)?,
            Err(_) => {
                // The in-flight call was dropped; land the failure so the
                // dashboard leaves the loading state.
                let timed_out = ReportError::LlmApiError {
                    message: format!("no reply within {}s", cli.timeout),
                };
                dashboard
                    .finish_upload(Err(timed_out))
                    .map_err(report_error)?;
            }
        }
    }

    // ── Output ───────────────────────────────────────────────────────────
    if cli.json {
        let report = dashboard.report().ok_or(ReportError::NoReport)?;
        let json = serde_json::to_string_pretty(report).context("Failed to serialise report")?;
        println!("{json}");
    } else {
        println!("{}", dashboard.text());
    }

    if cli.charts {
        let charts = dashboard.charts()?;
        let json = serde_json::to_string_pretty(&charts).context("Failed to serialise charts")?;
        println!("{json}");
    }

    if cli.describe_charts {
        let described = with_timeout(limit, dashboard.describe_charts(&config))
            .await
            .context("Chart description failed")?;
        for (chart, description) in described {
            println!();
            println!("{}", bold(&chart.title));
            match description {
                Ok(text) => println!("{text}"),
                Err(e) => eprintln!("  {} {}", red("✗"), e),
            }
        }
    }

    if cli.insights {
        let insights = with_timeout(limit, dashboard.insights(&config))
            .await
            .context("Insight suggestion failed")?;
        println!();
        println!("{}", bold("Insights"));
        for line in insights {
            println!("- {line}");
        }
    }

    Ok(())
}

/// Map CLI args to `ExtractionConfig`.
fn build_config(cli: &Cli) -> Result<ExtractionConfig> {
    let mut builder = ExtractionConfig::builder().download_timeout_secs(cli.download_timeout);
    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider);
    }
    if let Some(ref model) = cli.model {
        builder = builder.model(model);
    }
    if let Some(ref key) = cli.api_key {
        builder = builder.api_key(key);
    }
    builder.build().context("Invalid configuration")
}

/// Wrap a library error with its notification title.
fn report_error(e: ReportError) -> anyhow::Error {
    let (title, _) = e.user_message();
    anyhow::Error::new(e).context(title)
}

async fn with_timeout<T>(
    limit: Duration,
    fut: impl Future<Output = Result<T, ReportError>>,
) -> Result<T> {
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result.map_err(report_error),
        Err(_) => anyhow::bail!("no reply within {}s", limit.as_secs()),
    }
}
