//! Configuration for the LLM-backed requests.
//!
//! All three model calls (extraction, chart description, insights) read the
//! same [`ExtractionConfig`], built via its [`ExtractionConfigBuilder`]. The
//! config only describes *how to reach the model*; it carries no timeout for
//! the extraction call itself. Callers that need one wrap the future in
//! `tokio::time::timeout`.

use crate::error::ReportError;
use edgequake_llm::LLMProvider;
use std::fmt;
use std::sync::Arc;

/// Provider used when nothing else is configured.
pub const DEFAULT_PROVIDER: &str = "gemini";

/// Model used for [`DEFAULT_PROVIDER`] when none is named.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Vision-capable model used when `provider` is named without a model.
///
/// `None` means the provider has no sensible default and a model must be
/// given explicitly.
pub fn default_model_for(provider: &str) -> Option<&'static str> {
    match provider.to_ascii_lowercase().as_str() {
        "gemini" | "google" => Some(DEFAULT_MODEL),
        "openai" => Some("gpt-4.1-mini"),
        "anthropic" => Some("claude-sonnet-4-20250514"),
        "mistral" => Some("pixtral-large-latest"),
        "ollama" => Some("llava"),
        _ => None,
    }
}

/// Configuration for the LLM requests.
///
/// # Example
/// ```rust
/// use edgequake_pdf2prod::ExtractionConfig;
///
/// let config = ExtractionConfig::builder()
///     .provider_name("gemini")
///     .model("gemini-2.0-flash")
///     .api_key("AIza...")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ExtractionConfig {
    /// LLM model identifier. If None, the provider's default from
    /// [`default_model_for`] is used.
    pub model: Option<String>,

    /// LLM provider name (e.g. "gemini", "openai", "anthropic").
    /// If None, [`DEFAULT_PROVIDER`] is used.
    pub provider_name: Option<String>,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`
    /// and skips the credential check.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// API key for the named provider (usually the stored preference).
    ///
    /// When None, the provider's own `*_API_KEY` environment variable is
    /// consulted. With neither, calls fail with
    /// [`ReportError::MissingCredential`] before touching the network.
    pub api_key: Option<String>,

    /// Sampling temperature. Default: 0.1.
    ///
    /// Extraction is transcription, not composition; a low temperature keeps
    /// the numbers faithful to the page.
    pub temperature: f32,

    /// Maximum tokens the model may generate per call. Default: 4096.
    pub max_tokens: usize,

    /// Custom extraction prompt. If None, uses the built-in one.
    pub system_prompt: Option<String>,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            model: None,
            provider_name: None,
            provider: None,
            api_key: None,
            temperature: 0.1,
            max_tokens: 4096,
            system_prompt: None,
            download_timeout_secs: 120,
        }
    }
}

impl fmt::Debug for ExtractionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionConfig")
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .finish()
    }
}

impl ExtractionConfig {
    /// Create a new builder for `ExtractionConfig`.
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder {
            config: Self::default(),
        }
    }

    /// Provider name that will be used for the next call.
    pub fn effective_provider(&self) -> &str {
        self.provider_name.as_deref().unwrap_or(DEFAULT_PROVIDER)
    }

    /// Model that will be used for the next call, if one is known.
    pub fn effective_model(&self) -> Option<&str> {
        self.model
            .as_deref()
            .or_else(|| default_model_for(self.effective_provider()))
    }
}

/// Builder for [`ExtractionConfig`].
#[derive(Debug)]
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
}

impl ExtractionConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    /// Set the API key. Empty strings are treated as "no key".
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.config.api_key = if key.trim().is_empty() {
            None
        } else {
            Some(key)
        };
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractionConfig, ReportError> {
        let c = &self.config;
        if c.max_tokens == 0 {
            return Err(ReportError::InvalidConfig(
                "max_tokens must be ≥ 1".into(),
            ));
        }
        if c.model.as_deref().is_some_and(|m| m.trim().is_empty()) {
            return Err(ReportError::InvalidConfig("model must not be empty".into()));
        }
        if c.provider_name.as_deref().is_some_and(|p| p.trim().is_empty()) {
            return Err(ReportError::InvalidConfig(
                "provider name must not be empty".into(),
            ));
        }
        if c.provider.is_none() && c.effective_model().is_none() {
            return Err(ReportError::InvalidConfig(format!(
                "provider '{}' has no default model; set one explicitly",
                c.effective_provider()
            )));
        }
        Ok(self.config)
    }
}
