//! Input resolution: load a local file or URL into a [`DocumentPayload`].
//!
//! The model receives the document itself, so there is nothing to render:
//! we read the bytes, sniff the MIME type from the magic bytes and hand the
//! payload to [`crate::pipeline::encode`]. Only single-page documents are
//! expected; that is the caller's contract and is not checked here.

use crate::error::ReportError;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A document ready to be attached to a model request.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentPayload {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl DocumentPayload {
    /// Wrap raw bytes, sniffing the MIME type.
    ///
    /// `origin` is only used in the error when the bytes are unsupported.
    pub fn from_bytes(bytes: Vec<u8>, origin: &Path) -> Result<Self, ReportError> {
        match sniff_mime(&bytes) {
            Some(mime) => Ok(Self {
                bytes,
                mime_type: mime.to_string(),
            }),
            None => {
                let mut magic = [0u8; 4];
                let n = bytes.len().min(4);
                magic[..n].copy_from_slice(&bytes[..n]);
                Err(ReportError::UnsupportedDocument {
                    path: origin.to_path_buf(),
                    magic,
                })
            }
        }
    }
}

/// MIME type for the document formats the model accepts.
pub fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(b"%PDF") {
        Some("application/pdf")
    } else if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
        Some("image/png")
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("image/jpeg")
    } else {
        None
    }
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Resolve the input string to a document payload.
pub async fn resolve_input(input: &str, timeout_secs: u64) -> Result<DocumentPayload, ReportError> {
    if is_url(input) {
        download_url(input, timeout_secs).await
    } else {
        read_local(Path::new(input)).await
    }
}

/// Read a local file into memory.
pub async fn read_local(path: &Path) -> Result<DocumentPayload, ReportError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| ReportError::FileReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
    debug!("Read {} bytes from {}", bytes.len(), path.display());
    DocumentPayload::from_bytes(bytes, path)
}

/// Download a URL into memory.
async fn download_url(url: &str, timeout_secs: u64) -> Result<DocumentPayload, ReportError> {
    info!("Downloading report from: {}", url);

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| ReportError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            ReportError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            ReportError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    })?;

    if !response.status().is_success() {
        return Err(ReportError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| ReportError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    info!("Downloaded {} bytes", bytes.len());
    DocumentPayload::from_bytes(bytes.to_vec(), &PathBuf::from(url))
}
