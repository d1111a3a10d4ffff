//! The dashboard's shared state: at most one report, its text, a loading
//! flag and the user preferences.
//!
//! All report mutations go through three transitions:
//!
//! ```text
//!            begin_upload                finish_upload(Ok)
//!   Idle ───────────────────▶ Loading ─────────────────────▶ Idle(report = new)
//!                                 │
//!                                 │ finish_upload(Err)
//!                                 ▼
//!                       Idle(report cleared, or unchanged for input errors)
//!
//!   Idle(report) ── clear ──▶ Idle(report = None)
//! ```
//!
//! A second `begin_upload` while loading is rejected with
//! [`ReportError::UploadInProgress`]. The report is replaced only when a new
//! result lands, so a failure never leaves a half-updated report behind.

use crate::chart::{self, ChartData};
use crate::config::ExtractionConfig;
use crate::error::ReportError;
use crate::extract;
use crate::format::format_report;
use crate::model::{NormalizedReport, RawExtraction};
use crate::pipeline::normalize::normalize;
use crate::preferences::{AccentColor, PreferenceStore, UserPreferences};
use crate::progress::{NoopObserver, Observer};
use std::sync::Arc;
use tracing::{info, warn};

/// Whether an extraction is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DashboardStatus {
    #[default]
    Idle,
    Loading,
}

/// Single-writer application state.
pub struct Dashboard {
    report: Option<NormalizedReport>,
    text: String,
    status: DashboardStatus,
    preferences: UserPreferences,
    store: Option<PreferenceStore>,
    observer: Observer,
}

impl Dashboard {
    /// A dashboard with the given preferences and no persistence.
    pub fn new(preferences: UserPreferences) -> Self {
        Self {
            report: None,
            text: format_report(None),
            status: DashboardStatus::Idle,
            preferences,
            store: None,
            observer: Arc::new(NoopObserver),
        }
    }

    /// A dashboard whose preferences are read from (and written to) `store`.
    pub fn with_store(store: PreferenceStore) -> Result<Self, ReportError> {
        let preferences = store.load()?;
        let mut dashboard = Self::new(preferences);
        dashboard.store = Some(store);
        Ok(dashboard)
    }

    pub fn with_observer(mut self, observer: Observer) -> Self {
        self.observer = observer;
        self
    }

    // ── Accessors ────────────────────────────────────────────────────────

    pub fn report(&self) -> Option<&NormalizedReport> {
        self.report.as_ref()
    }

    /// The formatted report text ("No data available." when empty).
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn status(&self) -> DashboardStatus {
        self.status
    }

    pub fn is_loading(&self) -> bool {
        self.status == DashboardStatus::Loading
    }

    pub fn preferences(&self) -> &UserPreferences {
        &self.preferences
    }

    // ── Preferences ──────────────────────────────────────────────────────

    /// Update the API key and persist it immediately.
    pub fn set_api_key(&mut self, key: impl Into<String>) -> Result<(), ReportError> {
        self.preferences.api_key = key.into();
        self.persist()
    }

    /// Update the accent color and persist it immediately.
    pub fn set_accent(&mut self, accent: AccentColor) -> Result<(), ReportError> {
        self.preferences.accent = accent;
        self.persist()
    }

    fn persist(&self) -> Result<(), ReportError> {
        match &self.store {
            Some(store) => store.save(&self.preferences),
            None => Ok(()),
        }
    }

    /// `base` with the stored API key filled in when it has none.
    pub fn config_for(&self, base: &ExtractionConfig) -> ExtractionConfig {
        let mut config = base.clone();
        if config.api_key.is_none() {
            config.api_key = self.preferences.api_key().map(str::to_string);
        }
        config
    }

    // ── Transitions ──────────────────────────────────────────────────────

    /// Idle → Loading.
    ///
    /// Rejected while another upload is in flight, and when no credential is
    /// available; in both cases nothing changes.
    pub fn begin_upload(&mut self, input: &str, config: &ExtractionConfig) -> Result<(), ReportError> {
        if self.is_loading() {
            return Err(ReportError::UploadInProgress);
        }
        if let Err(e) = extract::check_credential(config) {
            self.observer.on_upload_failed(&e);
            return Err(e);
        }
        self.status = DashboardStatus::Loading;
        self.observer.on_upload_start(input);
        Ok(())
    }

    /// Loading → Idle with the outcome of the extraction.
    ///
    /// On success the normalized report atomically replaces the previous
    /// one. Input errors (the file never reached the model) leave the report
    /// unchanged; every other error clears it.
    pub fn finish_upload(
        &mut self,
        outcome: Result<RawExtraction, ReportError>,
    ) -> Result<&NormalizedReport, ReportError> {
        self.status = DashboardStatus::Idle;
        match outcome {
            Ok(raw) => {
                let report = normalize(&raw);
                self.text = format_report(Some(&report));
                self.observer.on_report_ready(&report);
                info!("Report for '{}' loaded", report.date);
                Ok(&*self.report.insert(report))
            }
            Err(e) => {
                warn!("Upload failed: {}", e);
                if !is_input_error(&e) {
                    self.set_report(None);
                }
                self.observer.on_upload_failed(&e);
                Err(e)
            }
        }
    }

    /// Idle(report) → Idle(None).
    pub fn clear(&mut self) {
        self.set_report(None);
        self.observer.on_cleared();
    }

    fn set_report(&mut self, report: Option<NormalizedReport>) {
        self.text = format_report(report.as_ref());
        self.report = report;
    }

    // ── Operations ───────────────────────────────────────────────────────

    /// Run a full upload: begin, extract, finish.
    pub async fn upload(
        &mut self,
        input: &str,
        base: &ExtractionConfig,
    ) -> Result<&NormalizedReport, ReportError> {
        let config = self.config_for(base);
        self.begin_upload(input, &config)?;
        let outcome = extract::extract_raw(input, &config).await;
        self.finish_upload(outcome)
    }

    /// Load an already-extracted report (e.g. a saved reply) without
    /// calling the model.
    pub fn load_raw(&mut self, raw: RawExtraction) -> Result<&NormalizedReport, ReportError> {
        if self.is_loading() {
            return Err(ReportError::UploadInProgress);
        }
        self.status = DashboardStatus::Loading;
        self.finish_upload(Ok(raw))
    }

    /// Chart data for the current report.
    pub fn charts(&self) -> Result<Vec<ChartData>, ReportError> {
        self.report
            .as_ref()
            .map(chart::all_charts)
            .ok_or(ReportError::NoReport)
    }

    /// Describe every chart of the current report, in chart order.
    pub async fn describe_charts(
        &self,
        base: &ExtractionConfig,
    ) -> Result<Vec<(ChartData, Result<String, ReportError>)>, ReportError> {
        let charts = self.charts()?;
        let config = self.config_for(base);
        extract::check_credential(&config)?;
        let descriptions = extract::describe_charts(&charts, &config).await;
        Ok(charts.into_iter().zip(descriptions).collect())
    }

    /// Suggest explanations for the current report.
    pub async fn insights(&self, base: &ExtractionConfig) -> Result<Vec<String>, ReportError> {
        if self.report.is_none() {
            return Err(ReportError::NoReport);
        }
        let config = self.config_for(base);
        extract::check_credential(&config)?;
        extract::suggest_insights(&self.text, &config).await
    }
}

/// Errors raised before the document reached the model.
fn is_input_error(e: &ReportError) -> bool {
    matches!(
        e,
        ReportError::FileReadFailed { .. }
            | ReportError::UnsupportedDocument { .. }
            | ReportError::DownloadFailed { .. }
            | ReportError::DownloadTimeout { .. }
            | ReportError::MissingCredential { .. }
    )
}
