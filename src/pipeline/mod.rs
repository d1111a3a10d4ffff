//! Pipeline stages from uploaded document to normalized report.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ encode ──▶ llm ──▶ response ──▶ normalize
//! (path/URL) (base64)  (call)  (JSON parse)  (coerce + percentages)
//! ```
//!
//! 1. [`input`]     — read the document and sniff its MIME type
//! 2. [`encode`]    — base64-wrap it as a request attachment
//! 3. [`llm`]       — the single model call; the only stage with network I/O
//! 4. [`response`]  — strip fences, find the JSON object, check the skeleton
//! 5. [`normalize`] — total, pure conversion to [`crate::model::NormalizedReport`]

pub mod encode;
pub mod input;
pub mod llm;
pub mod normalize;
pub mod response;
