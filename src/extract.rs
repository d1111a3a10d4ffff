//! Entry points for the three model-backed operations.
//!
//! * [`extract_raw`] / [`extract_report`] — document → report
//! * [`describe_chart`] — chart payload → one-paragraph description
//! * [`suggest_insights`] — report text → list of explanations
//!
//! Each makes exactly one model call per item and never retries. The
//! credential is checked before any input is read or any request is sent,
//! so a missing key has no side effects.

use crate::chart::ChartData;
use crate::config::ExtractionConfig;
use crate::error::ReportError;
use crate::model::{NormalizedReport, RawExtraction};
use crate::pipeline::input::{self, DocumentPayload};
use crate::pipeline::{llm, normalize, response};
use crate::prompts;
use edgequake_llm::{
    AnthropicProvider, ChatMessage, GeminiProvider, LLMProvider, OpenAIProvider,
    OpenRouterProvider, ProviderFactory,
};
use futures::stream::{self, StreamExt};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Chart descriptions requested at once by [`describe_charts`].
const DESCRIBE_CONCURRENCY: usize = 4;

/// Extract the raw report from a local file or URL.
///
/// # Errors
/// - [`ReportError::MissingCredential`] before anything else happens
/// - [`ReportError::FileReadFailed`] / [`ReportError::UnsupportedDocument`]
///   for unreadable input
/// - [`ReportError::ExtractionFailed`] when the reply has no usable report
pub async fn extract_raw(
    input_str: impl AsRef<str>,
    config: &ExtractionConfig,
) -> Result<RawExtraction, ReportError> {
    let input_str = input_str.as_ref();
    info!("Starting extraction: {}", input_str);

    check_credential(config)?;
    let doc = input::resolve_input(input_str, config.download_timeout_secs).await?;
    extract_document(&doc, config).await
}

/// Extract the raw report from in-memory document bytes.
pub async fn extract_raw_from_bytes(
    bytes: Vec<u8>,
    config: &ExtractionConfig,
) -> Result<RawExtraction, ReportError> {
    check_credential(config)?;
    let doc = DocumentPayload::from_bytes(bytes, Path::new("<memory>"))?;
    extract_document(&doc, config).await
}

/// Extract and normalize in one step.
pub async fn extract_report(
    input_str: impl AsRef<str>,
    config: &ExtractionConfig,
) -> Result<NormalizedReport, ReportError> {
    let raw = extract_raw(input_str, config).await?;
    Ok(normalize::normalize(&raw))
}

/// Run the extraction call for an already-loaded document.
pub async fn extract_document(
    doc: &DocumentPayload,
    config: &ExtractionConfig,
) -> Result<RawExtraction, ReportError> {
    let provider = resolve_provider(config)?;
    debug!(
        "Sending {} ({} bytes) to {}",
        doc.mime_type,
        doc.bytes.len(),
        config.effective_provider()
    );
    let raw = llm::request_extraction(&provider, doc, config).await?;
    info!("Extraction complete");
    Ok(raw)
}

/// Ask the model to describe one chart.
pub async fn describe_chart(
    chart: &ChartData,
    config: &ExtractionConfig,
) -> Result<String, ReportError> {
    let provider = resolve_provider(config)?;
    let messages = vec![
        ChatMessage::system(prompts::CHART_DESCRIPTION_PROMPT),
        ChatMessage::user(prompts::chart_description_request(
            &chart.title,
            &chart.kind.to_string(),
            &chart.to_json(),
        )),
    ];
    let content = llm::complete(&provider, &messages, config).await?;
    response::parse_description(&content).ok_or_else(|| ReportError::LlmApiError {
        message: "the model returned an empty description".into(),
    })
}

/// Describe several charts; results are in the same order as `charts`.
pub async fn describe_charts(
    charts: &[ChartData],
    config: &ExtractionConfig,
) -> Vec<Result<String, ReportError>> {
    stream::iter(charts.iter().map(|chart| describe_chart(chart, config)))
        .buffered(DESCRIBE_CONCURRENCY)
        .collect()
        .await
}

/// Ask the model for explanations of the formatted report text.
pub async fn suggest_insights(
    report_text: &str,
    config: &ExtractionConfig,
) -> Result<Vec<String>, ReportError> {
    let provider = resolve_provider(config)?;
    let messages = vec![
        ChatMessage::system(prompts::INSIGHTS_PROMPT),
        ChatMessage::user(prompts::insights_request(report_text)),
    ];
    let content = llm::complete(&provider, &messages, config).await?;
    let insights = response::parse_insights(&content);
    if insights.is_empty() {
        return Err(ReportError::LlmApiError {
            message: "the model returned no insights".into(),
        });
    }
    Ok(insights)
}

// ── Credentials & provider ───────────────────────────────────────────────

/// Environment variable holding the key for `provider`, if it needs one.
pub fn api_key_env_var(provider: &str) -> Option<&'static str> {
    match provider.to_ascii_lowercase().as_str() {
        "gemini" | "google" => Some("GEMINI_API_KEY"),
        "openai" => Some("OPENAI_API_KEY"),
        "anthropic" => Some("ANTHROPIC_API_KEY"),
        "mistral" => Some("MISTRAL_API_KEY"),
        "openrouter" => Some("OPENROUTER_API_KEY"),
        "azure" => Some("AZURE_OPENAI_API_KEY"),
        // Local servers (ollama, lmstudio, …) need no key.
        _ => None,
    }
}

/// Whether `provider` can be built around an explicit key. Other providers
/// only read their key from the environment.
fn takes_direct_key(provider: &str) -> bool {
    matches!(
        provider.to_ascii_lowercase().as_str(),
        "gemini" | "google" | "openai" | "anthropic" | "claude" | "openrouter" | "open-router"
    )
}

/// Fail with [`ReportError::MissingCredential`] when the configured provider
/// needs a key and neither the config nor the environment has one.
pub fn check_credential(config: &ExtractionConfig) -> Result<(), ReportError> {
    if config.provider.is_some() {
        return Ok(());
    }
    let provider = config.effective_provider();
    if config.api_key.is_some() && takes_direct_key(provider) {
        return Ok(());
    }
    match api_key_env_var(provider) {
        Some(var) if std::env::var(var).map_or(true, |v| v.trim().is_empty()) => {
            Err(ReportError::MissingCredential {
                provider: provider.to_string(),
            })
        }
        _ => Ok(()),
    }
}

/// Resolve the LLM provider.
///
/// 1. **Pre-built provider** (`config.provider`) — used as-is.
/// 2. **Configured key** — handed straight to the provider's constructor.
///    The process environment is never written.
/// 3. **Named provider + model** — created through
///    [`ProviderFactory::create_llm_provider`], which reads the provider's
///    key from the environment.
fn resolve_provider(config: &ExtractionConfig) -> Result<Arc<dyn LLMProvider>, ReportError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    check_credential(config)?;

    let name = config.effective_provider();
    let model = config.effective_model().ok_or_else(|| {
        ReportError::InvalidConfig(format!(
            "provider '{name}' has no default model; set one explicitly"
        ))
    })?;

    if let Some(key) = config.api_key.as_deref() {
        if let Some(provider) = provider_with_key(name, model, key) {
            return Ok(provider);
        }
        debug!("Provider '{}' takes its key from the environment only", name);
    }

    ProviderFactory::create_llm_provider(name, model).map_err(|e| {
        ReportError::ProviderNotConfigured {
            provider: name.to_string(),
            hint: format!("{e}"),
        }
    })
}

fn provider_with_key(name: &str, model: &str, key: &str) -> Option<Arc<dyn LLMProvider>> {
    let provider: Arc<dyn LLMProvider> = match name.to_ascii_lowercase().as_str() {
        "gemini" | "google" => Arc::new(GeminiProvider::new(key).with_model(model)),
        "openai" => Arc::new(OpenAIProvider::new(key).with_model(model)),
        "anthropic" | "claude" => Arc::new(AnthropicProvider::new(key).with_model(model)),
        "openrouter" | "open-router" => Arc::new(OpenRouterProvider::new(key).with_model(model)),
        _ => return None,
    };
    Some(provider)
}

#[cfg(test)]
mod tests {
    use super::*;
    use edgequake_llm::MockProvider;

    #[test]
    fn env_var_mapping() {
        assert_eq!(api_key_env_var("gemini"), Some("GEMINI_API_KEY"));
        assert_eq!(api_key_env_var("OpenAI"), Some("OPENAI_API_KEY"));
        assert_eq!(api_key_env_var("ollama"), None);
    }

    #[test]
    fn configured_key_satisfies_credential_check() {
        let config = ExtractionConfig::builder().api_key("k").build().unwrap();
        assert!(check_credential(&config).is_ok());
    }

    #[test]
    fn keyless_provider_needs_no_credential() {
        let config = ExtractionConfig::builder()
            .provider_name("ollama")
            .build()
            .unwrap();
        assert!(check_credential(&config).is_ok());
    }

    #[tokio::test]
    async fn missing_credential_before_reading_input() {
        // A provider name whose variable is never set in test environments.
        let config = ExtractionConfig::builder()
            .provider_name("openrouter")
            .model("google/gemini-2.0-flash-001")
            .build()
            .unwrap();
        if std::env::var("OPENROUTER_API_KEY").is_ok() {
            return;
        }
        let err = extract_raw("/definitely/not/here.pdf", &config)
            .await
            .unwrap_err();
        assert!(matches!(err, ReportError::MissingCredential { .. }));
    }

    #[test]
    fn configured_key_is_not_exported() {
        let before = std::env::var("GEMINI_API_KEY");
        let config = ExtractionConfig::builder()
            .api_key("stored-secret")
            .build()
            .unwrap();
        let provider = resolve_provider(&config).unwrap();
        assert_eq!(provider.name(), "gemini");
        assert_eq!(provider.model(), "gemini-2.0-flash");
        assert_eq!(std::env::var("GEMINI_API_KEY"), before);
    }

    #[test]
    fn key_follows_named_provider() {
        let config = ExtractionConfig::builder()
            .provider_name("openai")
            .api_key("sk-test")
            .build()
            .unwrap();
        let provider = resolve_provider(&config).unwrap();
        assert_eq!(provider.name(), "openai");
        assert_eq!(provider.model(), "gpt-4.1-mini");
    }

    #[test]
    fn env_only_provider_ignores_configured_key() {
        if std::env::var("MISTRAL_API_KEY").is_ok() {
            return;
        }
        let config = ExtractionConfig::builder()
            .provider_name("mistral")
            .api_key("k")
            .build()
            .unwrap();
        let err = check_credential(&config).unwrap_err();
        assert!(matches!(err, ReportError::MissingCredential { .. }));
    }

    // ── Model calls against a scripted provider ──────────────────────────

    async fn scripted(replies: &[&str]) -> ExtractionConfig {
        let mock = MockProvider::new();
        for reply in replies {
            mock.add_response(*reply).await;
        }
        ExtractionConfig::builder()
            .provider(Arc::new(mock))
            .build()
            .unwrap()
    }

    fn pdf() -> DocumentPayload {
        DocumentPayload::from_bytes(b"%PDF-1.7\n%test".to_vec(), Path::new("report.pdf")).unwrap()
    }

    const REPLY: &str = r#"```json
{"date": "02 Jun 2025",
 "lantabur": {"dailyProductionTotal": 13266.2,
              "loadingCapacity": [{"name": "Black", "value": 2853}],
              "inHouse": {"value": 12934.2}, "subContract": {"value": 332}},
 "taqwa": {"dailyProductionTotal": 0}}
```"#;

    #[tokio::test]
    async fn extraction_reply_is_parsed() {
        let config = scripted(&[REPLY]).await;
        let raw = extract_document(&pdf(), &config).await.unwrap();
        let report = normalize::normalize(&raw);
        assert_eq!(report.date, "02 Jun 2025");
        assert_eq!(report.lantabur.loading_capacity[0].percentage, 21.51);
    }

    #[tokio::test]
    async fn empty_object_reply_fails_extraction() {
        let config = scripted(&["{}"]).await;
        let err = extract_document(&pdf(), &config).await.unwrap_err();
        assert!(matches!(err, ReportError::ExtractionFailed { .. }));
    }

    #[tokio::test]
    async fn blank_reply_fails_extraction() {
        let config = scripted(&["   "]).await;
        let err = extract_document(&pdf(), &config).await.unwrap_err();
        assert!(matches!(err, ReportError::ExtractionFailed { .. }));
    }

    #[tokio::test]
    async fn unsupported_bytes_never_reach_the_model() {
        let config = scripted(&[REPLY]).await;
        let err = extract_raw_from_bytes(b"GIF89a....".to_vec(), &config)
            .await
            .unwrap_err();
        assert!(matches!(err, ReportError::UnsupportedDocument { .. }));
    }

    fn chart() -> ChartData {
        ChartData {
            kind: crate::chart::ChartKind::Pie,
            title: "Lantabur In-House vs Sub-Contract".into(),
            points: Vec::new(),
        }
    }

    #[tokio::test]
    async fn plain_text_description_is_accepted() {
        let config = scripted(&["  In-house production dominates.  "]).await;
        let text = describe_chart(&chart(), &config).await.unwrap();
        assert_eq!(text, "In-house production dominates.");
    }

    #[tokio::test]
    async fn json_description_is_unwrapped() {
        let config = scripted(&[r#"{"description": "Sub-contract is marginal."}"#]).await;
        let text = describe_chart(&chart(), &config).await.unwrap();
        assert_eq!(text, "Sub-contract is marginal.");
    }

    #[tokio::test]
    async fn blank_description_is_an_api_error() {
        let config = scripted(&[""]).await;
        let err = describe_chart(&chart(), &config).await.unwrap_err();
        assert!(matches!(err, ReportError::LlmApiError { .. }));
    }

    #[tokio::test]
    async fn describe_charts_keeps_one_result_per_chart() {
        // An exhausted script answers with a fixed placeholder.
        let config = scripted(&[]).await;
        let results = describe_charts(&[chart(), chart(), chart()], &config).await;
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| r.as_ref().is_ok_and(|t| !t.is_empty())));
    }

    #[tokio::test]
    async fn bulleted_insights_are_split() {
        let config = scripted(&["1. Low RFT on Lantabur\n2. Taqwa idle\n"]).await;
        let insights = suggest_insights("Date: 02 Jun 2025", &config).await.unwrap();
        assert_eq!(insights, vec!["Low RFT on Lantabur", "Taqwa idle"]);
    }

    #[tokio::test]
    async fn blank_insights_are_an_api_error() {
        let config = scripted(&["\n\n"]).await;
        let err = suggest_insights("Date: 02 Jun 2025", &config)
            .await
            .unwrap_err();
        assert!(matches!(err, ReportError::LlmApiError { .. }));
    }
}
