use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{error, info, warn};
use parking_lot::Mutex;
use sha2::{Digest, Sha256};

use crate::app_config::Config;
use crate::errors::AppError;
use crate::file_utils::{sanitize_filename, FileManager};
use crate::language_utils;
use crate::translation::cache::{JsonStageCache, StageStore};
use crate::translation::chunking::{Chunker, TokenCounter};
use crate::translation::core::{Completion, CompletionService};
use crate::translation::pipeline::{Stage, Translator};
use crate::translation::prompts::PromptContext;

// @module: Application controller for document translation

/// Outcome of a batch run over an input directory.
#[derive(Debug, Default)]
pub struct BatchSummary {
    /// Documents translated and written successfully
    pub processed: usize,
    /// Documents that failed and were left in place
    pub failed: usize,
}

impl BatchSummary {
    /// One-line human readable summary
    pub fn summary(&self) -> String {
        format!(
            "{} document(s) translated, {} failed",
            self.processed, self.failed
        )
    }
}

/// Main application controller for document translation
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Shared token counter
    counter: Arc<TokenCounter>,
    // @field: Language/locale context for prompts
    prompts: PromptContext,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self, AppError> {
        config.validate()?;

        let counter = Arc::new(TokenCounter::new(config.token_encoding)?);
        let prompts = PromptContext::new(
            language_utils::get_language_name(&config.source_language)?,
            language_utils::get_language_name(&config.target_language)?,
            config.country.clone(),
        );

        Ok(Self {
            config,
            counter,
            prompts,
        })
    }

    /// Run the main workflow over an input file or directory.
    ///
    /// Each document gets its own pipeline run and cache scope; a failure
    /// on one document never aborts the rest of the batch.
    pub async fn run(&self, input_path: &Path) -> Result<BatchSummary, AppError> {
        let service = CompletionService::new(&self.config.translation)?;

        let documents = if input_path.is_dir() {
            FileManager::find_documents(input_path).map_err(|e| AppError::File(e.to_string()))?
        } else {
            vec![input_path.to_path_buf()]
        };

        if documents.is_empty() {
            warn!("No documents found in {:?}", input_path);
            return Ok(BatchSummary::default());
        }

        let mut summary = BatchSummary::default();
        for path in &documents {
            match self.process_document(&service, path).await {
                Ok(output_path) => {
                    info!("Translated {:?} -> {:?}", path, output_path);
                    summary.processed += 1;
                }
                Err(e) => {
                    // The source file and the cache scope are left intact so
                    // a re-invocation resumes this document.
                    error!("Failed to translate {:?}: {}", path, e);
                    summary.failed += 1;
                }
            }
        }

        info!("{}", service.usage_summary());
        info!("{}", summary.summary());
        Ok(summary)
    }

    /// Translate a single document through the full pipeline and write the
    /// result. The source file is deleted and the cache scope cleared only
    /// after the output is durably on disk.
    pub async fn process_document<C: Completion + Clone>(
        &self,
        completion: &C,
        path: &Path,
    ) -> Result<PathBuf, AppError> {
        let source_text =
            FileManager::read_to_string(path).map_err(|e| AppError::File(e.to_string()))?;

        let scope_dir = self.config.cache_root().join(run_scope_id(path, &source_text));
        let cache = JsonStageCache::new(scope_dir);
        let chunker = Chunker::new(self.counter.clone());

        let translator = Translator::new(
            completion.clone(),
            cache.clone(),
            self.prompts.clone(),
            chunker,
            self.config.token_limit,
        )
        .with_progress(progress_reporter());

        let translation = translator.translate(&source_text).await?;

        let filename = FileManager::derive_output_filename(&translation, path);
        let output_path = self.config.output_folder.join(filename);
        FileManager::write_to_file(&output_path, &translation)
            .map_err(|e| AppError::File(e.to_string()))?;

        if !self.config.keep_source {
            FileManager::remove_file(path).map_err(|e| AppError::File(e.to_string()))?;
        }
        cache.clear()?;

        Ok(output_path)
    }
}

/// Scope directory name for one document run.
///
/// Combines the source file stem with a digest of the document text, so a
/// changed document never resumes onto a stale checkpoint and distinct
/// documents never share a scope.
pub fn run_scope_id(path: &Path, text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    let digest_hex: String = digest[..6].iter().map(|b| format!("{:02x}", b)).collect();

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "document".to_string());
    let stem = sanitize_filename(&stem);

    format!("{}-{}", stem, digest_hex)
}

/// Per-stage progress bars shared through one MultiProgress display.
fn progress_reporter() -> impl Fn(Stage, usize, usize) + Send + Sync + 'static {
    let multi = MultiProgress::new();
    let bars: Mutex<HashMap<&'static str, ProgressBar>> = Mutex::new(HashMap::new());

    move |stage, completed, total| {
        let mut bars = bars.lock();
        let bar = bars.entry(stage.name()).or_insert_with(|| {
            let bar = multi.add(ProgressBar::new(total as u64));
            bar.set_style(
                ProgressStyle::with_template("{prefix:>14} [{bar:40.cyan/blue}] {pos}/{len}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("=> "),
            );
            bar.set_prefix(stage.label());
            bar
        });

        bar.set_position(completed as u64);
        if completed >= total {
            bar.finish();
        }
    }
}
