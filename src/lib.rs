/*!
 * # mdxlate - Markdown Document Translation with AI
 *
 * A Rust library for translating long markdown/LaTeX documents using AI.
 *
 * ## Features
 *
 * - Token-budgeted chunking that keeps chunks roughly equal in size
 * - Three-stage translation pipeline (draft, reflect, revise) with
 *   cross-chunk context windows
 * - Durable per-stage checkpoints so interrupted runs resume without
 *   re-querying the LLM
 * - Translate documents using various AI providers:
 *   - Ollama (local LLM)
 *   - OpenAI API
 *   - Anthropic API
 * - Markdown structure preservation and post-processing cleanup
 * - Batch processing of input directories
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `translation`: The translation pipeline:
 *   - `translation::chunking`: Token budgeting and recursive chunking
 *   - `translation::cache`: Durable stage checkpoints
 *   - `translation::pipeline`: Three-stage orchestration
 *   - `translation::core`: Completion service over LLM providers
 *   - `translation::prompts`: Prompt templates for the three stages
 *   - `translation::formatting`: Markdown cleanup passes
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `language_utils`: ISO language code utilities
 * - `providers`: Client implementations for various LLM providers
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod providers;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use errors::{AppError, CacheError, ConfigError, ProviderError, SplitError};
pub use translation::cache::{JsonStageCache, StageCheckpoint, StageStore};
pub use translation::chunking::{compute_chunk_size, Chunk, Chunker, TokenCounter};
pub use translation::core::{Completion, CompletionService};
pub use translation::pipeline::{Stage, Translator};
