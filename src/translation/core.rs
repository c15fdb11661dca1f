/*!
 * Core completion service implementation.
 *
 * This module defines the [`Completion`] capability the pipeline depends
 * on, and [`CompletionService`], the production implementation that
 * dispatches over the closed set of supported providers.
 */

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;
use rand::seq::IndexedRandom;
use url::Url;

use crate::app_config::{TranslationConfig, TranslationProvider};
use crate::errors::{ConfigError, ProviderError};
use crate::providers::anthropic::{Anthropic, AnthropicRequest};
use crate::providers::ollama::{GenerationRequest, Ollama};
use crate::providers::openai::{OpenAI, OpenAIRequest};
use crate::translation::formatting;

/// The LLM boundary the pipeline depends on: one prompt in, one text out.
///
/// Implementations must not hide failures; a [`ProviderError`] aborts the
/// current document run and leaves the stage cache at its last checkpoint.
#[async_trait]
pub trait Completion: Send + Sync {
    /// Run a single completion request.
    async fn complete(&self, prompt: &str) -> Result<String, ProviderError>;
}

/// Token usage statistics for tracking API consumption
#[derive(Debug, Clone)]
pub struct TokenUsageStats {
    /// Number of prompt tokens
    pub prompt_tokens: u64,

    /// Number of completion tokens
    pub completion_tokens: u64,

    /// Total number of tokens
    pub total_tokens: u64,

    /// Start time of token tracking
    pub start_time: Instant,

    /// Total time spent on API requests
    pub api_duration: Duration,

    /// Provider name
    pub provider: String,

    /// Model name
    pub model: String,
}

impl TokenUsageStats {
    /// Create new token usage stats with provider info
    pub fn with_provider_info(provider: String, model: String) -> Self {
        Self {
            prompt_tokens: 0,
            completion_tokens: 0,
            total_tokens: 0,
            start_time: Instant::now(),
            api_duration: Duration::from_secs(0),
            provider,
            model,
        }
    }

    /// Add token usage numbers, ignoring counts the provider didn't report
    pub fn add_usage(&mut self, prompt_tokens: Option<u64>, completion_tokens: Option<u64>) {
        if let Some(pt) = prompt_tokens {
            self.prompt_tokens += pt;
            self.total_tokens += pt;
        }

        if let Some(ct) = completion_tokens {
            self.completion_tokens += ct;
            self.total_tokens += ct;
        }
    }

    /// Calculate tokens per minute rate
    pub fn tokens_per_minute(&self) -> f64 {
        let duration_minutes = if self.api_duration.as_secs_f64() > 0.0 {
            self.api_duration.as_secs_f64() / 60.0
        } else {
            self.start_time.elapsed().as_secs_f64() / 60.0
        };

        if duration_minutes > 0.0 {
            self.total_tokens as f64 / duration_minutes
        } else {
            0.0
        }
    }

    /// Generate a summary of token usage
    pub fn summary(&self) -> String {
        format!(
            "Token usage: provider={} model={} prompt={} completion={} total={} ({:.0} tokens/min)",
            self.provider,
            self.model,
            self.prompt_tokens,
            self.completion_tokens,
            self.total_tokens,
            self.tokens_per_minute()
        )
    }
}

/// Provider client implementation variants
#[derive(Debug, Clone)]
enum ProviderClient {
    /// Ollama LLM service
    Ollama(Ollama),

    /// OpenAI API service
    OpenAI(OpenAI),

    /// Anthropic API service
    Anthropic(Anthropic),
}

/// Production [`Completion`] implementation dispatching over providers.
///
/// Responses are stripped of any delimiter tags the model echoed back, and
/// provider-reported token usage is accumulated for the run summary.
#[derive(Clone)]
pub struct CompletionService {
    /// Provider implementation
    provider: ProviderClient,

    /// Configuration for the completion service
    config: TranslationConfig,

    /// Accumulated token usage, shared across clones
    usage: Arc<Mutex<TokenUsageStats>>,
}

impl CompletionService {
    /// Create a new completion service from the translation configuration.
    ///
    /// API keys may be given as a comma-separated list; one is chosen at
    /// random here so repeated runs spread load across keys.
    pub fn new(config: &TranslationConfig) -> Result<Self, ConfigError> {
        validate_endpoint(&config.get_endpoint())?;

        let timeout_secs = config.get_timeout_secs();
        let retry_count = config.common.retry_count;
        let retry_backoff_ms = config.common.retry_backoff_ms;
        let rate_limit = config.get_rate_limit();

        let provider = match config.provider {
            TranslationProvider::Ollama => ProviderClient::Ollama(Ollama::new_with_config(
                config.get_endpoint(),
                timeout_secs,
                retry_count,
                retry_backoff_ms,
                rate_limit,
            )),
            TranslationProvider::OpenAI => {
                let api_key = pick_api_key(&config.get_api_key()).ok_or_else(|| {
                    ConfigError::MissingApiKey {
                        provider: "openai".to_string(),
                    }
                })?;
                ProviderClient::OpenAI(OpenAI::new_with_config(
                    api_key,
                    config.get_endpoint(),
                    timeout_secs,
                    retry_count,
                    retry_backoff_ms,
                    rate_limit,
                ))
            }
            TranslationProvider::Anthropic => {
                let api_key = pick_api_key(&config.get_api_key()).ok_or_else(|| {
                    ConfigError::MissingApiKey {
                        provider: "anthropic".to_string(),
                    }
                })?;
                ProviderClient::Anthropic(Anthropic::new_with_config(
                    api_key,
                    config.get_endpoint(),
                    timeout_secs,
                    retry_count,
                    retry_backoff_ms,
                    rate_limit,
                ))
            }
        };

        let usage = TokenUsageStats::with_provider_info(
            config.provider.to_lowercase_string(),
            config.get_model(),
        );

        Ok(Self {
            provider,
            config: config.clone(),
            usage: Arc::new(Mutex::new(usage)),
        })
    }

    /// Test the connection to the configured provider
    pub async fn test_connection(&self) -> Result<(), ProviderError> {
        match &self.provider {
            ProviderClient::Ollama(client) => {
                client.version().await?;
                Ok(())
            }
            ProviderClient::OpenAI(client) => client.test_connection(&self.config.get_model()).await,
            ProviderClient::Anthropic(client) => {
                client.test_connection(&self.config.get_model()).await
            }
        }
    }

    /// Summary of accumulated token usage for this service
    pub fn usage_summary(&self) -> String {
        self.usage.lock().summary()
    }

    fn record_usage(
        &self,
        prompt_tokens: Option<u64>,
        completion_tokens: Option<u64>,
        duration: Duration,
    ) {
        let mut usage = self.usage.lock();
        usage.add_usage(prompt_tokens, completion_tokens);
        usage.api_duration += duration;
    }
}

#[async_trait]
impl Completion for CompletionService {
    async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        let model = self.config.get_model();
        let temperature = self.config.common.temperature;
        let top_p = self.config.common.top_p;
        let start_time = Instant::now();

        let text = match &self.provider {
            ProviderClient::Ollama(client) => {
                let request = GenerationRequest::new(&model, prompt)
                    .temperature(temperature)
                    .top_p(top_p);

                let response = client.generate(request).await?;
                self.record_usage(
                    response.prompt_eval_count,
                    response.eval_count,
                    start_time.elapsed(),
                );
                response.response
            }
            ProviderClient::OpenAI(client) => {
                let request = OpenAIRequest::new(&model)
                    .add_message("user", prompt)
                    .temperature(temperature)
                    .top_p(top_p)
                    .max_tokens(max_tokens_for_model(&model));

                let response = client.complete(request).await?;
                if response.choices.is_empty() {
                    return Err(ProviderError::ParseError(
                        "OpenAI returned no choices".to_string(),
                    ));
                }

                let usage = response.usage.as_ref();
                self.record_usage(
                    usage.map(|u| u.prompt_tokens),
                    usage.map(|u| u.completion_tokens),
                    start_time.elapsed(),
                );
                OpenAI::extract_text(&response)
            }
            ProviderClient::Anthropic(client) => {
                let request = AnthropicRequest::new(&model, max_tokens_for_model(&model))
                    .add_message("user", prompt)
                    .temperature(temperature)
                    .top_p(top_p);

                let response = client.complete(request).await?;
                self.record_usage(
                    Some(response.usage.input_tokens),
                    Some(response.usage.output_tokens),
                    start_time.elapsed(),
                );
                Anthropic::extract_text(&response)
            }
        };

        Ok(formatting::strip_translation_tags(&text))
    }
}

/// Reject endpoints that are not absolute URLs before any request is made.
fn validate_endpoint(endpoint: &str) -> Result<(), ConfigError> {
    Url::parse(endpoint).map_err(|_| ConfigError::InvalidEndpoint(endpoint.to_string()))?;
    Ok(())
}

/// Pick one API key out of a comma-separated list.
fn pick_api_key(raw: &str) -> Option<String> {
    let keys: Vec<&str> = raw
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .collect();

    keys.choose(&mut rand::rng()).map(|k| k.to_string())
}

/// Maximum completion tokens to request for a given model
fn max_tokens_for_model(model: &str) -> u32 {
    match model {
        m if m.starts_with("gpt-4o") => 16384,
        m if m.starts_with("claude-3-5") || m.starts_with("claude-3-7") => 8192,
        m if m.starts_with("claude") => 4096,
        _ => 4096,
    }
}
