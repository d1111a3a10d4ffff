//! # edgequake-pdf2prod
//!
//! Turn a daily production-report PDF into a normalized, two-entity
//! production report using a Vision Language Model.
//!
//! ## Why this crate?
//!
//! The daily report is a dense, hand-laid-out PDF covering two production
//! units (**Lantabur** and **Taqwa**). Templated text extraction breaks every
//! time the layout shifts. Instead the whole document is handed to a VLM
//! with a fixed JSON schema, and the loosely-typed reply is normalized into
//! a report whose numbers, percentages and month-to-date figures are
//! guaranteed to be well-formed.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF / image
//!  │
//!  ├─ 1. Input      resolve local file or download from URL, sniff MIME
//!  ├─ 2. Encode     bytes → base64 ImageData
//!  ├─ 3. VLM        one call with the extraction schema
//!  ├─ 4. Parse      strip fences, locate the JSON object → RawExtraction
//!  ├─ 5. Normalize  coerce numbers, percentages, Avg/day → NormalizedReport
//!  └─ 6. Present    fixed-layout text + chart series
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_pdf2prod::{extract_report, format_report, ExtractionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Key read from GEMINI_API_KEY unless given explicitly.
//!     let config = ExtractionConfig::default();
//!     let report = extract_report("daily_report.pdf", &config).await?;
//!     println!("{}", format_report(Some(&report)));
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2prod` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! ```toml
//! edgequake-pdf2prod = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod chart;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod extract;
pub mod format;
pub mod model;
pub mod pipeline;
pub mod preferences;
pub mod progress;
pub mod prompts;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use chart::{all_charts, ChartData, ChartKind, ChartPoint};
pub use config::{
    default_model_for, ExtractionConfig, ExtractionConfigBuilder, DEFAULT_MODEL, DEFAULT_PROVIDER,
};
pub use dashboard::{Dashboard, DashboardStatus};
pub use error::ReportError;
pub use extract::{
    describe_chart, describe_charts, extract_raw, extract_raw_from_bytes, extract_report,
    suggest_insights,
};
pub use format::{format_report, NO_DATA};
pub use model::{Entity, EntityReport, LineItem, NormalizedReport, RawEntity, RawExtraction, Share};
pub use pipeline::normalize::normalize;
pub use pipeline::response::parse_extraction;
pub use preferences::{AccentColor, PreferenceStore, UserPreferences};
pub use progress::{DashboardObserver, NoopObserver, Observer};
