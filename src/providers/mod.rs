/*!
 * Provider implementations for different completion services.
 *
 * This module contains client implementations for various LLM providers:
 * - Ollama: Local LLM server
 * - OpenAI: OpenAI API integration (also covers OpenAI-compatible endpoints)
 * - Anthropic: Anthropic API integration
 *
 * Each client owns its credential handling and request shaping, and applies
 * bounded retry with exponential backoff at this boundary so the pipeline's
 * resumability contract stays independent of retry policy. The pipeline
 * itself only sees the [`crate::translation::core::Completion`] capability.
 */

pub mod anthropic;
pub mod mock;
pub mod ollama;
pub mod openai;
