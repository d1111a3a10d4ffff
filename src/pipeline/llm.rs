//! Model interaction: build messages, make exactly one call, parse the reply.
//!
//! There is no retry loop. A failed call surfaces immediately so the caller
//! can clear its state and tell the user; re-uploading is the retry. There
//! is no timeout either: callers that need one wrap these futures.

use crate::config::ExtractionConfig;
use crate::error::ReportError;
use crate::model::RawExtraction;
use crate::pipeline::{encode, input::DocumentPayload, response};
use crate::prompts;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Ask the model to extract a report from `doc`.
///
/// ## Message Layout
///
/// 1. **System message** — extraction instructions plus the JSON schema
///    (or the configured override)
/// 2. **User message** — the document as an attachment
pub async fn request_extraction(
    provider: &Arc<dyn LLMProvider>,
    doc: &DocumentPayload,
    config: &ExtractionConfig,
) -> Result<RawExtraction, ReportError> {
    let system_prompt = config
        .system_prompt
        .clone()
        .unwrap_or_else(prompts::extraction_prompt);

    let messages = vec![
        ChatMessage::system(system_prompt),
        ChatMessage::user_with_images(
            "Extract the production report from this document.",
            vec![encode::encode_document(doc)],
        ),
    ];

    let content = complete(provider, &messages, config)
        .await
        .map_err(|e| match e {
            ReportError::LlmApiError { message } => ReportError::ExtractionFailed { reason: message },
            other => other,
        })?;

    response::parse_extraction(&content)
}

/// Send `messages` once and return the reply text.
pub async fn complete(
    provider: &Arc<dyn LLMProvider>,
    messages: &[ChatMessage],
    config: &ExtractionConfig,
) -> Result<String, ReportError> {
    let start = Instant::now();
    let options = build_options(config);

    match provider.chat(messages, Some(&options)).await {
        Ok(response) => {
            debug!(
                "{} input tokens, {} output tokens, {:?}",
                response.prompt_tokens,
                response.completion_tokens,
                start.elapsed()
            );
            if response.content.trim().is_empty() {
                return Err(ReportError::LlmApiError {
                    message: "the model returned an empty response".into(),
                });
            }
            Ok(response.content)
        }
        Err(e) => {
            warn!("LLM call failed after {:?}: {}", start.elapsed(), e);
            Err(ReportError::LlmApiError {
                message: e.to_string(),
            })
        }
    }
}

/// Build `CompletionOptions` from the config.
fn build_options(config: &ExtractionConfig) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(config.temperature),
        max_tokens: Some(config.max_tokens),
        ..Default::default()
    }
}
