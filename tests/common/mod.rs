/*!
 * Common test utilities shared across the test suite.
 */

use std::sync::Arc;

use once_cell::sync::Lazy;

use mdxlate::app_config::Config;
use mdxlate::translation::chunking::{Chunker, TokenCounter, TokenEncoding};
use mdxlate::translation::prompts::PromptContext;

/// One tokenizer for the whole test run; BPE construction is expensive.
static COUNTER: Lazy<Arc<TokenCounter>> =
    Lazy::new(|| Arc::new(TokenCounter::new(TokenEncoding::O200kBase).unwrap()));

/// Shared token counter.
pub fn shared_counter() -> Arc<TokenCounter> {
    COUNTER.clone()
}

/// Initialize test logging; safe to call from every test.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A chunker over the shared counter.
pub fn chunker() -> Chunker {
    Chunker::new(shared_counter())
}

/// Standard prompt context used in tests.
pub fn prompt_context() -> PromptContext {
    PromptContext::new("English", "Chinese", "China")
}

/// A markdown document long enough to split into several chunks at small
/// token budgets.
pub fn sample_markdown() -> String {
    let mut doc = String::from("# Sample Document\n\n");
    for i in 1..=8 {
        doc.push_str(&format!(
            "## Section {}\n\nThis is paragraph number {} with enough words \
             to carry a handful of tokens. It mentions [a link](https://example.com) \
             and keeps going for a little while longer.\n\n",
            i, i
        ));
    }
    doc
}

/// A config pointing output and cache at the given temp dirs.
pub fn test_config(output_dir: &std::path::Path, cache_dir: &std::path::Path) -> Config {
    let mut config = Config::default();
    config.output_folder = output_dir.to_path_buf();
    config.cache_dir = Some(cache_dir.to_path_buf());
    config
}
