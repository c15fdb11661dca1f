/*!
 * Durable per-stage translation checkpoints.
 *
 * Each pipeline stage persists the index of the last completed chunk and
 * the ordered results produced so far, after every chunk. A crashed or
 * interrupted run reloads the checkpoint and resumes at the next chunk
 * without re-querying the LLM for completed work.
 *
 * Storage lives behind the small [`StageStore`] trait so the backend is
 * swappable without touching orchestration logic; the default backend is
 * one JSON file per stage under a per-run scope directory.
 */

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::errors::CacheError;

/// Durable record of one stage's progress.
///
/// `done_idx` is the index of the last completed chunk, `-1` when the
/// stage has not started. Invariant: `results.len() == done_idx + 1`;
/// `results[i]` is the output for chunk `i`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageCheckpoint {
    /// Index of the last completed chunk, -1 if none
    pub done_idx: i64,
    /// Ordered per-chunk results, one per completed chunk
    pub results: Vec<String>,
}

impl StageCheckpoint {
    /// A checkpoint for a stage that has not started.
    pub fn empty() -> Self {
        Self {
            done_idx: -1,
            results: Vec::new(),
        }
    }

    /// Whether every chunk of a `chunk_count`-chunk document is done.
    pub fn is_complete(&self, chunk_count: usize) -> bool {
        self.done_idx == chunk_count as i64 - 1
    }

    /// The index the stage loop resumes at.
    pub fn resume_index(&self) -> usize {
        (self.done_idx + 1) as usize
    }

    /// Record the result for the next chunk in sequence.
    pub fn record(&mut self, index: usize, result: String) {
        debug_assert_eq!(index, self.resume_index(), "chunks must complete in order");
        self.results.push(result);
        self.done_idx = index as i64;
    }

    /// Whether the record satisfies the length invariant.
    fn is_consistent(&self) -> bool {
        if self.done_idx < 0 {
            self.done_idx == -1 && self.results.is_empty()
        } else {
            self.results.len() as i64 == self.done_idx + 1
        }
    }
}

impl Default for StageCheckpoint {
    fn default() -> Self {
        Self::empty()
    }
}

/// Persistence interface for stage checkpoints.
///
/// Writes for a given stage are always sequential (single writer with a
/// monotonically increasing done index), so `save` is last-writer-wins
/// with no merge logic.
pub trait StageStore: Send + Sync {
    /// Load the checkpoint for a stage, or the not-started checkpoint if
    /// none has been persisted. Fails with [`CacheError::Corrupt`] when a
    /// persisted record violates the length invariant.
    fn load(&self, stage: &str) -> Result<StageCheckpoint, CacheError>;

    /// Durably persist the full checkpoint for a stage. Must have reached
    /// storage when this returns: the pipeline only starts the next chunk
    /// after a successful save.
    fn save(&self, stage: &str, checkpoint: &StageCheckpoint) -> Result<(), CacheError>;

    /// Delete every stage entry in this scope.
    fn clear(&self) -> Result<(), CacheError>;
}

/// JSON-file checkpoint store, one file per stage in a scope directory.
///
/// The scope directory identifies a single document run; callers derive it
/// from the source file so unrelated runs never share state.
#[derive(Debug, Clone)]
pub struct JsonStageCache {
    scope_dir: PathBuf,
}

impl JsonStageCache {
    /// Create a store rooted at the given scope directory. The directory
    /// is created lazily on the first save.
    pub fn new(scope_dir: impl Into<PathBuf>) -> Self {
        Self {
            scope_dir: scope_dir.into(),
        }
    }

    /// The scope directory backing this store.
    pub fn scope_dir(&self) -> &Path {
        &self.scope_dir
    }

    fn stage_path(&self, stage: &str) -> PathBuf {
        self.scope_dir.join(format!("{}.json", stage))
    }

    fn io_error(path: &Path, source: std::io::Error) -> CacheError {
        CacheError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl StageStore for JsonStageCache {
    fn load(&self, stage: &str) -> Result<StageCheckpoint, CacheError> {
        let path = self.stage_path(stage);
        if !path.exists() {
            return Ok(StageCheckpoint::empty());
        }

        let raw = fs::read_to_string(&path).map_err(|e| Self::io_error(&path, e))?;
        let checkpoint: StageCheckpoint = serde_json::from_str(&raw)?;

        if !checkpoint.is_consistent() {
            return Err(CacheError::Corrupt {
                stage: stage.to_string(),
                done_idx: checkpoint.done_idx,
                results: checkpoint.results.len(),
            });
        }

        Ok(checkpoint)
    }

    fn save(&self, stage: &str, checkpoint: &StageCheckpoint) -> Result<(), CacheError> {
        fs::create_dir_all(&self.scope_dir).map_err(|e| Self::io_error(&self.scope_dir, e))?;

        let path = self.stage_path(stage);
        // Write the full record to a sibling temp file, fsync, then rename
        // over the target so a crash mid-write never corrupts the previous
        // checkpoint.
        let mut tmp =
            NamedTempFile::new_in(&self.scope_dir).map_err(|e| Self::io_error(&path, e))?;
        let json = serde_json::to_string_pretty(checkpoint)?;
        tmp.write_all(json.as_bytes())
            .map_err(|e| Self::io_error(&path, e))?;
        tmp.as_file()
            .sync_all()
            .map_err(|e| Self::io_error(&path, e))?;
        tmp.persist(&path)
            .map_err(|e| Self::io_error(&path, e.error))?;

        Ok(())
    }

    fn clear(&self) -> Result<(), CacheError> {
        if self.scope_dir.exists() {
            fs::remove_dir_all(&self.scope_dir)
                .map_err(|e| Self::io_error(&self.scope_dir, e))?;
        }
        Ok(())
    }
}
