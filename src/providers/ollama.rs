use std::time::Duration;

use log::error;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::errors::ProviderError;

/// Ollama client for interacting with a local Ollama server
#[derive(Debug, Clone)]
pub struct Ollama {
    /// HTTP client for API requests
    client: Client,
    /// Base URL of the Ollama server
    base_url: String,
    /// Maximum number of retry attempts
    max_retries: u32,
    /// Base backoff time in milliseconds for exponential backoff
    backoff_base_ms: u64,
    /// Optional rate limit in requests per minute
    rate_limit: Option<u32>,
}

/// Ollama generation request
#[derive(Debug, Clone, Serialize)]
pub struct GenerationRequest {
    /// The model to use
    model: String,

    /// The prompt to generate from
    prompt: String,

    /// System prompt to guide the model
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,

    /// Whether to stream the response; we always request a single object
    stream: bool,

    /// Sampling options
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerationOptions>,
}

/// Sampling options for a generation request
#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerationOptions {
    /// Temperature for generation
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,

    /// Top probability mass to consider (nucleus sampling)
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
}

/// Ollama generation response
#[derive(Debug, Deserialize)]
pub struct GenerationResponse {
    /// The model that produced the response
    #[serde(default)]
    pub model: String,

    /// The generated text
    pub response: String,

    /// Whether generation finished
    #[serde(default)]
    pub done: bool,

    /// Number of prompt tokens evaluated, when reported
    #[serde(default)]
    pub prompt_eval_count: Option<u64>,

    /// Number of generated tokens, when reported
    #[serde(default)]
    pub eval_count: Option<u64>,
}

/// Ollama version response
#[derive(Debug, Deserialize)]
pub struct VersionResponse {
    /// Server version string
    pub version: String,
}

impl GenerationRequest {
    /// Create a new generation request
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            system: None,
            stream: false,
            options: None,
        }
    }

    /// Set the system prompt
    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.options.get_or_insert_with(Default::default).temperature = Some(temperature);
        self
    }

    /// Set the top_p (nucleus sampling)
    pub fn top_p(mut self, top_p: f32) -> Self {
        self.options.get_or_insert_with(Default::default).top_p = Some(top_p);
        self
    }
}

impl Ollama {
    /// Create a new Ollama client with default retry settings
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::new_with_config(endpoint, 120, 3, 1000, None)
    }

    /// Create a new Ollama client with full configuration
    pub fn new_with_config(
        endpoint: impl Into<String>,
        timeout_secs: u64,
        max_retries: u32,
        backoff_base_ms: u64,
        rate_limit: Option<u32>,
    ) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                // Ollama speaks HTTP/1.1
                .http1_only()
                .build()
                .unwrap_or_default(),
            base_url: endpoint.into().trim_end_matches('/').to_string(),
            max_retries,
            backoff_base_ms,
            rate_limit,
        }
    }

    /// Generate text from the Ollama API with retry logic
    pub async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationResponse, ProviderError> {
        let url = format!("{}/api/generate", self.base_url);

        let mut last_error = ProviderError::RequestFailed("no attempt made".to_string());

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                self.sleep_before_retry(attempt).await;
            }

            match self.client.post(&url).json(&request).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return response
                            .json::<GenerationResponse>()
                            .await
                            .map_err(|e| ProviderError::ParseError(e.to_string()));
                    }

                    let message = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "failed to read error body".to_string());
                    let api_error = ProviderError::ApiError {
                        status_code: status.as_u16(),
                        message,
                    };

                    if status.is_server_error() {
                        // Server error, worth retrying
                        error!(
                            "Ollama API error ({}) - attempt {}/{}",
                            status,
                            attempt + 1,
                            self.max_retries + 1
                        );
                        last_error = api_error;
                    } else {
                        // Client error, don't retry
                        return Err(api_error);
                    }
                }
                Err(e) => {
                    error!(
                        "Ollama network error: {} - attempt {}/{}",
                        e,
                        attempt + 1,
                        self.max_retries + 1
                    );
                    last_error = ProviderError::RequestFailed(e.to_string());
                }
            }
        }

        Err(last_error)
    }

    /// Query the server version, as a cheap connection test
    pub async fn version(&self) -> Result<String, ProviderError> {
        let url = format!("{}/api/version", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ProviderError::ApiError {
                status_code: response.status().as_u16(),
                message: "version query failed".to_string(),
            });
        }

        let version = response
            .json::<VersionResponse>()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;
        Ok(version.version)
    }

    async fn sleep_before_retry(&self, attempt: u32) {
        if let Some(rate_limit) = self.rate_limit {
            let delay_ms = 60_000 / rate_limit as u64;
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        }
        let backoff_ms = self.backoff_base_ms * (1u64 << (attempt - 1));
        tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
    }
}
