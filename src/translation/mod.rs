/*!
 * Document translation pipeline.
 *
 * This module contains the core functionality for translating markdown
 * documents through a chunked, resumable three-stage LLM pipeline. It is
 * split into several submodules:
 *
 * - `chunking`: Token budgeting and recursive document chunking
 * - `cache`: Durable per-stage checkpoints for resumable runs
 * - `pipeline`: The draft/reflect/revise orchestration
 * - `core`: Completion service over the supported LLM providers
 * - `prompts`: Prompt templates for the three stages
 * - `formatting`: Markdown cleanup passes
 */

// Re-export main types for easier usage
pub use self::cache::{JsonStageCache, StageCheckpoint, StageStore};
pub use self::chunking::{compute_chunk_size, Chunk, Chunker, TokenCounter, TokenEncoding};
pub use self::core::{Completion, CompletionService, TokenUsageStats};
pub use self::pipeline::{tagged_window, Stage, Translator, CONTEXT_WINDOW};
pub use self::prompts::PromptContext;

// Submodules
pub mod cache;
pub mod chunking;
pub mod core;
pub mod formatting;
pub mod pipeline;
pub mod prompts;
