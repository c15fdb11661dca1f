/*!
 * Error types for the mdxlate application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use std::path::PathBuf;

use thiserror::Error;

/// Errors caused by invalid or incomplete configuration.
///
/// These are fatal: they are surfaced immediately and never retried.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A language code that is not a valid ISO 639-1/639-2 code
    #[error("Invalid language code: {0}")]
    InvalidLanguage(String),

    /// A provider that requires an API key was selected without one
    #[error("API key is required for the {provider} provider")]
    MissingApiKey {
        /// Provider identifier
        provider: String,
    },

    /// The per-chunk token limit must be strictly positive
    #[error("Token limit must be greater than zero (got {0})")]
    InvalidTokenLimit(usize),

    /// A provider identifier that is not part of the supported set
    #[error("Unsupported provider: {0}")]
    UnsupportedProvider(String),

    /// A provider endpoint that is not a valid URL
    #[error("Invalid endpoint URL: {0}")]
    InvalidEndpoint(String),

    /// The tokenizer encoding could not be initialized
    #[error("Failed to initialize tokenizer: {0}")]
    Tokenizer(String),
}

/// Errors that can occur when talking to provider APIs.
///
/// Provider failures abort the current document run without advancing the
/// stage checkpoint, so a re-invocation resumes at the failed chunk.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

/// Errors raised while splitting a document into chunks.
#[derive(Error, Debug)]
pub enum SplitError {
    /// A single atomic unit exceeds the chunk budget and the chunker was
    /// configured to fail rather than emit an oversized chunk
    #[error("Atomic unit at chunk {index} has {tokens} tokens, exceeding the budget of {limit}")]
    OversizedChunk {
        /// Index the oversized chunk would have had
        index: usize,
        /// Token count of the atomic unit
        tokens: usize,
        /// The chunk budget that was exceeded
        limit: usize,
    },
}

/// Errors from the durable stage cache.
#[derive(Error, Debug)]
pub enum CacheError {
    /// A persisted record whose results length disagrees with its done index.
    /// Fatal for that stage: the operator must clear the scope and restart.
    #[error("Corrupt checkpoint for stage '{stage}': done_idx {done_idx} but {results} results")]
    Corrupt {
        /// Stage name of the corrupt record
        stage: String,
        /// The persisted done index
        done_idx: i64,
        /// Number of persisted results
        results: usize,
    },

    /// Error reading or writing a checkpoint file
    #[error("Cache I/O error at {path:?}: {source}")]
    Io {
        /// Path of the checkpoint file or scope directory
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Error serializing or deserializing a checkpoint record
    #[error("Cache serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from chunking
    #[error("Split error: {0}")]
    Split(#[from] SplitError),

    /// Error from the stage cache
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
