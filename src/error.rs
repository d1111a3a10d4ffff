//! Error types for the edgequake-pdf2prod library.
//!
//! Every fallible operation returns [`ReportError`]. The variants follow the
//! three failure sites a caller has to handle:
//!
//! * **Input** — the document could not be read or is not something the
//!   model can look at ([`ReportError::FileReadFailed`],
//!   [`ReportError::UnsupportedDocument`], download errors).
//! * **Model** — the LLM call failed or returned nothing usable
//!   ([`ReportError::ExtractionFailed`], [`ReportError::LlmApiError`]).
//! * **Credentials / state** — nothing was sent because a precondition did
//!   not hold ([`ReportError::MissingCredential`],
//!   [`ReportError::UploadInProgress`], [`ReportError::NoReport`]).
//!
//! Malformed fields inside an otherwise parseable extraction are never an
//! error: the normalizer tolerates them silently.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the edgequake-pdf2prod library.
#[derive(Debug, Error)]
pub enum ReportError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The local document could not be read into memory.
    #[error("Failed to read '{path}': {source}")]
    FileReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The bytes are neither a PDF nor an image the model accepts.
    #[error("'{path}' is not a PDF or image document\nFirst bytes: {magic:?}")]
    UnsupportedDocument { path: PathBuf, magic: [u8; 4] },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'")]
    DownloadTimeout { url: String, secs: u64 },

    // ── LLM errors ────────────────────────────────────────────────────────
    /// The model returned no structurally parseable report.
    #[error("Extraction failed: {reason}")]
    ExtractionFailed { reason: String },

    /// No API key is available for the provider that would be called.
    #[error("No API key configured for provider '{provider}'.\nSet it with --save-api-key or the provider's *_API_KEY variable.")]
    MissingCredential { provider: String },

    /// The configured provider could not be created.
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// The LLM API returned an error or an empty answer.
    #[error("LLM API error: {message}")]
    LlmApiError { message: String },

    // ── State errors ──────────────────────────────────────────────────────
    /// An upload is already being processed.
    #[error("An upload is already in progress")]
    UploadInProgress,

    /// The action needs a report but none is loaded.
    #[error("No production report is loaded")]
    NoReport,

    // ── Preferences / config ──────────────────────────────────────────────
    /// The preferences file could not be read or written.
    #[error("Preferences file '{path}': {detail}")]
    PreferencesFailed { path: PathBuf, detail: String },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ReportError {
    /// Short `(title, description)` pair suitable for a user notification.
    pub fn user_message(&self) -> (&'static str, String) {
        match self {
            ReportError::ExtractionFailed { .. } => (
                "PDF Processing Failed",
                "AI model failed to return data in the expected format. \
                 The PDF might not match the fixed format."
                    .to_string(),
            ),
            ReportError::FileReadFailed { .. } => {
                ("File Read Error", "Could not read the selected file.".to_string())
            }
            ReportError::MissingCredential { .. } => (
                "API Key Required",
                "Please set your API key in settings to process PDFs.".to_string(),
            ),
            ReportError::UploadInProgress => (
                "Upload In Progress",
                "Wait for the current report to finish processing.".to_string(),
            ),
            ReportError::NoReport => (
                "No Data",
                "No production data available.".to_string(),
            ),
            other => ("PDF Processing Failed", other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extraction_failed_display() {
        let e = ReportError::ExtractionFailed {
            reason: "no JSON object in response".into(),
        };
        assert!(e.to_string().contains("no JSON object"));
    }

    #[test]
    fn missing_credential_mentions_provider() {
        let e = ReportError::MissingCredential {
            provider: "gemini".into(),
        };
        assert!(e.to_string().contains("gemini"));
    }

    #[test]
    fn user_message_for_extraction_failure() {
        let e = ReportError::ExtractionFailed {
            reason: "empty".into(),
        };
        let (title, body) = e.user_message();
        assert_eq!(title, "PDF Processing Failed");
        assert!(body.contains("expected format"));
    }

    #[test]
    fn user_message_falls_back_to_display() {
        let e = ReportError::LlmApiError {
            message: "quota exceeded".into(),
        };
        let (_, body) = e.user_message();
        assert!(body.contains("quota exceeded"));
    }
}
