/*!
 * Three-stage translation pipeline orchestration.
 *
 * The pipeline runs three sequential, per-chunk stages over a document:
 * 1. Draft: a direct translation of each chunk, no cross-chunk context
 * 2. Reflect: a critique of each draft, given a window of neighbouring
 *    source chunks as context
 * 3. Revise: the improved translation, given the draft and the critique
 *
 * Each stage is independently resumable: the checkpoint for a stage is
 * persisted after every chunk, a stage that is already complete returns
 * its cached results without any completion calls, and a partially
 * complete stage resumes at the chunk after its last checkpoint. Chunks
 * are processed strictly in increasing index order with exactly one
 * writer, so checkpoints never need merge logic.
 */

use log::{debug, info};

use crate::errors::AppError;
use crate::translation::cache::StageStore;
use crate::translation::chunking::{compute_chunk_size, Chunk, Chunker};
use crate::translation::core::Completion;
use crate::translation::formatting;
use crate::translation::prompts::{PromptContext, TRANSLATE_CLOSE, TRANSLATE_OPEN};

/// How many raw chunks of context to include before and after the chunk
/// under translation in the reflect and revise stages.
pub const CONTEXT_WINDOW: usize = 2;

/// One stage of the translation pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Direct per-chunk translation
    Draft,
    /// Critique of the draft with neighbouring context
    Reflect,
    /// Improved translation incorporating the critique
    Revise,
}

impl Stage {
    /// Stable name used as the cache key for this stage.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Reflect => "reflect",
            Self::Revise => "revise",
        }
    }

    /// Human-readable label for progress reporting.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Draft => "1: drafting",
            Self::Reflect => "2: reflecting",
            Self::Revise => "3: revising",
        }
    }
}

/// Progress callback: stage, chunks completed, total chunks.
pub type ProgressFn = dyn Fn(Stage, usize, usize) + Send + Sync;

/// Build the tagged context window for the chunk at `index`.
///
/// Up to [`CONTEXT_WINDOW`] preceding and following raw chunks surround
/// the current chunk, which is delimited by the translate markers; the
/// window is clipped at the document boundaries.
pub fn tagged_window(chunks: &[Chunk], index: usize) -> String {
    let start = index.saturating_sub(CONTEXT_WINDOW);
    let end = (index + 1 + CONTEXT_WINDOW).min(chunks.len());

    let mut window = String::new();
    for chunk in &chunks[start..index] {
        window.push_str(&chunk.text);
    }
    window.push_str(TRANSLATE_OPEN);
    window.push_str(&chunks[index].text);
    window.push_str(TRANSLATE_CLOSE);
    for chunk in &chunks[index + 1..end] {
        window.push_str(&chunk.text);
    }

    window
}

/// The translation pipeline orchestrator for a single document run.
///
/// Owns the in-memory stage results during the run; the [`StageStore`]
/// owns their durable mirror. A translator instance is scoped to one
/// document and must not be shared across concurrent documents.
pub struct Translator<C: Completion, S: StageStore> {
    /// Completion boundary
    completion: C,

    /// Durable per-stage checkpoints for this run's scope
    cache: S,

    /// Language/locale context for prompts
    prompts: PromptContext,

    /// Document chunker
    chunker: Chunker,

    /// Per-chunk token limit
    token_limit: usize,

    /// Optional progress callback
    progress: Option<Box<ProgressFn>>,
}

impl<C: Completion, S: StageStore> Translator<C, S> {
    /// Create a translator for one document run.
    pub fn new(
        completion: C,
        cache: S,
        prompts: PromptContext,
        chunker: Chunker,
        token_limit: usize,
    ) -> Self {
        Self {
            completion,
            cache,
            prompts,
            chunker,
            token_limit,
            progress: None,
        }
    }

    /// Attach a progress callback.
    pub fn with_progress(
        mut self,
        progress: impl Fn(Stage, usize, usize) + Send + Sync + 'static,
    ) -> Self {
        self.progress = Some(Box::new(progress));
        self
    }

    /// Translate a whole document.
    ///
    /// Runs the link-normalization pre-pass, chunks the document under the
    /// token budget, executes the three stages in order, and reassembles
    /// and cleans the result. An empty document yields an empty string
    /// without any completion calls.
    pub async fn translate(&self, source_text: &str) -> Result<String, AppError> {
        let text = formatting::normalize_markdown_links(source_text);

        let token_count = self.chunker.counter().count(&text);
        let chunk_size = compute_chunk_size(token_count, self.token_limit)?;
        debug!(
            "Document has {} tokens, chunk budget {}",
            token_count, chunk_size
        );

        let chunks = self.chunker.split(&text, chunk_size)?;
        if chunks.is_empty() {
            debug!("Document is empty, nothing to translate");
            return Ok(String::new());
        }
        info!("Translating document in {} chunks", chunks.len());

        let drafts = self.draft_stage(&chunks).await?;
        let reflections = self.reflect_stage(&chunks, &drafts).await?;
        let revisions = self.revise_stage(&chunks, &drafts, &reflections).await?;

        Ok(formatting::cleanup(&revisions.concat()))
    }

    /// Run the draft stage: translate each chunk on its own.
    pub async fn draft_stage(&self, chunks: &[Chunk]) -> Result<Vec<String>, AppError> {
        self.run_stage(Stage::Draft, chunks, |chunk| {
            self.prompts.draft_prompt(&chunk.text)
        })
        .await
    }

    /// Run the reflect stage: critique each draft in context.
    ///
    /// Only requires the draft result for the chunk being processed, so a
    /// resumed reflect stage never depends on where a previous process
    /// died within the draft stage.
    pub async fn reflect_stage(
        &self,
        chunks: &[Chunk],
        drafts: &[String],
    ) -> Result<Vec<String>, AppError> {
        debug_assert_eq!(chunks.len(), drafts.len());
        self.run_stage(Stage::Reflect, chunks, |chunk| {
            let tagged = tagged_window(chunks, chunk.index);
            self.prompts
                .reflect_prompt(&tagged, &chunk.text, &drafts[chunk.index])
        })
        .await
    }

    /// Run the revise stage: rewrite each draft using its critique.
    ///
    /// Each result is stored with a leading blank line so adjacent chunks
    /// stay visually distinct after plain concatenation.
    pub async fn revise_stage(
        &self,
        chunks: &[Chunk],
        drafts: &[String],
        reflections: &[String],
    ) -> Result<Vec<String>, AppError> {
        debug_assert_eq!(chunks.len(), drafts.len());
        debug_assert_eq!(chunks.len(), reflections.len());
        self.run_stage(Stage::Revise, chunks, |chunk| {
            let tagged = tagged_window(chunks, chunk.index);
            self.prompts.revise_prompt(
                &tagged,
                &chunk.text,
                &drafts[chunk.index],
                &reflections[chunk.index],
            )
        })
        .await
    }

    /// The shared stage loop: load the checkpoint, return early when the
    /// stage is complete, otherwise resume at the next chunk and persist
    /// the checkpoint after every completion call.
    async fn run_stage<F>(
        &self,
        stage: Stage,
        chunks: &[Chunk],
        build_prompt: F,
    ) -> Result<Vec<String>, AppError>
    where
        F: Fn(&Chunk) -> String,
    {
        let mut checkpoint = self.cache.load(stage.name())?;
        let total = chunks.len();

        if checkpoint.is_complete(total) {
            debug!(
                "Stage '{}' already complete, reusing {} cached results",
                stage.name(),
                checkpoint.results.len()
            );
            self.report(stage, total, total);
            return Ok(checkpoint.results);
        }

        let resume_at = checkpoint.resume_index().min(total);
        if resume_at > 0 {
            info!(
                "Resuming stage '{}' at chunk {} of {}",
                stage.name(),
                resume_at,
                total
            );
        }
        self.report(stage, resume_at, total);

        for chunk in &chunks[resume_at..] {
            let prompt = build_prompt(chunk);
            let output = self.completion.complete(&prompt).await?;

            let output = if stage == Stage::Revise {
                format!("\n\n{}", output)
            } else {
                output
            };

            checkpoint.record(chunk.index, output);
            // The checkpoint must be durable before the next chunk starts;
            // a crash at any point leaves exactly the completed prefix.
            self.cache.save(stage.name(), &checkpoint)?;

            self.report(stage, chunk.index + 1, total);
        }

        Ok(checkpoint.results)
    }

    fn report(&self, stage: Stage, completed: usize, total: usize) {
        if let Some(progress) = &self.progress {
            progress(stage, completed, total);
        }
    }
}
