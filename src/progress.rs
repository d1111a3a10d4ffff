//! Observer trait for dashboard state transitions.
//!
//! Inject an [`Arc<dyn DashboardObserver>`] into
//! [`crate::dashboard::Dashboard::with_observer`] to be told when an upload
//! starts, lands, fails, or the report is cleared. This is where a UI shows
//! its loading spinner and its notifications; the library itself never
//! prints.
//!
//! # Example
//!
//! ```rust
//! use edgequake_pdf2prod::{DashboardObserver, ReportError};
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! struct FailureCounter(AtomicUsize);
//!
//! impl DashboardObserver for FailureCounter {
//!     fn on_upload_failed(&self, error: &ReportError) {
//!         let (title, _) = error.user_message();
//!         eprintln!("{title}");
//!         self.0.fetch_add(1, Ordering::SeqCst);
//!     }
//! }
//! ```

use crate::error::ReportError;
use crate::model::NormalizedReport;
use std::sync::Arc;

/// Called by [`crate::dashboard::Dashboard`] on each state transition.
///
/// All methods have default no-op implementations so implementors only
/// override what they care about.
pub trait DashboardObserver: Send + Sync {
    /// The dashboard entered the loading state.
    fn on_upload_start(&self, input: &str) {
        let _ = input;
    }

    /// A new report replaced the previous one.
    fn on_report_ready(&self, report: &NormalizedReport) {
        let _ = report;
    }

    /// The upload failed; the report has been cleared or left unchanged as
    /// the error kind dictates.
    fn on_upload_failed(&self, error: &ReportError) {
        let _ = error;
    }

    /// The report was explicitly cleared.
    fn on_cleared(&self) {}
}

/// A no-op observer; the default when none is configured.
pub struct NoopObserver;

impl DashboardObserver for NoopObserver {}

/// Convenience alias for the type stored in the dashboard.
pub type Observer = Arc<dyn DashboardObserver>;
