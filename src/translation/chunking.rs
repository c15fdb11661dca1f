/*!
 * Token budgeting and document chunking.
 *
 * This module computes a per-chunk token budget for a document and splits
 * the document into an ordered sequence of token-bounded chunks. Splitting
 * is recursive and separator-aware (paragraph, then line, then sentence,
 * then word) with zero overlap, and concatenating the chunks in order
 * reconstructs the input exactly.
 */

use std::sync::Arc;

use log::warn;
use serde::{Deserialize, Serialize};
use tiktoken_rs::CoreBPE;

use crate::errors::{ConfigError, SplitError};

/// Separator ladder used by the recursive splitter, coarsest first.
const SEPARATORS: [&str; 4] = ["\n\n", "\n", ". ", " "];

/// Tokenizer encoding identifier.
///
/// Token counts are deterministic for a fixed encoding, which the cache
/// relies on across resumed runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenEncoding {
    /// The o200k_base encoding (GPT-4o family)
    #[default]
    O200kBase,
    /// The cl100k_base encoding (GPT-4 family)
    Cl100kBase,
}

impl std::str::FromStr for TokenEncoding {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "o200k" | "o200k_base" => Ok(Self::O200kBase),
            "cl100k" | "cl100k_base" => Ok(Self::Cl100kBase),
            other => Err(ConfigError::Tokenizer(format!(
                "unknown encoding: {}",
                other
            ))),
        }
    }
}

/// Token counter over a tiktoken BPE encoding.
pub struct TokenCounter {
    bpe: CoreBPE,
}

impl TokenCounter {
    /// Create a counter for the given encoding.
    ///
    /// BPE construction is relatively expensive, so callers should create
    /// one counter per process and share it.
    pub fn new(encoding: TokenEncoding) -> Result<Self, ConfigError> {
        let bpe = match encoding {
            TokenEncoding::O200kBase => tiktoken_rs::o200k_base(),
            TokenEncoding::Cl100kBase => tiktoken_rs::cl100k_base(),
        }
        .map_err(|e| ConfigError::Tokenizer(e.to_string()))?;

        Ok(Self { bpe })
    }

    /// Count the tokens in a string.
    pub fn count(&self, text: &str) -> usize {
        self.bpe.encode_with_special_tokens(text).len()
    }
}

/// Compute the target chunk size for a document.
///
/// Aims for chunks of roughly equal size rather than maximally packing
/// chunks to the limit, keeping per-call latency and context windows
/// comparable across the document.
///
/// Returns `token_count` unchanged when the whole document fits within the
/// limit, and `0` for an empty document (callers treat that as "no chunks").
pub fn compute_chunk_size(token_count: usize, token_limit: usize) -> Result<usize, ConfigError> {
    if token_limit == 0 {
        return Err(ConfigError::InvalidTokenLimit(token_limit));
    }

    if token_count <= token_limit {
        return Ok(token_count);
    }

    let num_chunks = token_count.div_ceil(token_limit);
    let mut chunk_size = token_count / num_chunks;

    let remaining_tokens = token_count % token_limit;
    if remaining_tokens > 0 {
        chunk_size += remaining_tokens / num_chunks;
    }

    Ok(chunk_size)
}

/// An ordered, token-bounded slice of the source document.
///
/// `index` is the chunk's position in document order and the join key
/// across all three translation stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Position in document order
    pub index: usize,
    /// The chunk text, separators included
    pub text: String,
}

impl Chunk {
    /// Create a new chunk.
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
        }
    }
}

/// Policy for atomic units whose token count alone exceeds the budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OversizedPolicy {
    /// Emit the unit as its own oversized chunk and log a warning
    #[default]
    Emit,
    /// Fail the split with [`SplitError::OversizedChunk`]
    Fail,
}

/// Recursive, separator-aware document splitter.
///
/// Guarantees: chunk order equals source order, chunks never overlap, and
/// concatenating all chunk texts reproduces the input byte-for-byte. A
/// chunk only exceeds the budget when a single atomic unit does (see
/// [`OversizedPolicy`]); text is never cut mid-token.
pub struct Chunker {
    counter: Arc<TokenCounter>,
    policy: OversizedPolicy,
}

impl Chunker {
    /// Create a chunker sharing the given token counter.
    pub fn new(counter: Arc<TokenCounter>) -> Self {
        Self {
            counter,
            policy: OversizedPolicy::default(),
        }
    }

    /// Set the policy for oversized atomic units.
    pub fn with_policy(mut self, policy: OversizedPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The shared token counter.
    pub fn counter(&self) -> &TokenCounter {
        &self.counter
    }

    /// Split `text` into chunks of at most `chunk_size` tokens.
    ///
    /// An empty input (or a zero budget, which only arises from an empty
    /// input) yields an empty sequence; downstream stages treat that as
    /// nothing to translate.
    pub fn split(&self, text: &str, chunk_size: usize) -> Result<Vec<Chunk>, SplitError> {
        if text.is_empty() || chunk_size == 0 {
            return Ok(Vec::new());
        }

        let pieces = self.split_recursive(text, chunk_size, &SEPARATORS);

        let mut chunks = Vec::with_capacity(pieces.len());
        for (index, piece) in pieces.into_iter().enumerate() {
            let tokens = self.counter.count(&piece);
            if tokens > chunk_size {
                match self.policy {
                    OversizedPolicy::Emit => {
                        warn!(
                            "Chunk {} is an atomic unit of {} tokens, over the budget of {}",
                            index, tokens, chunk_size
                        );
                    }
                    OversizedPolicy::Fail => {
                        return Err(SplitError::OversizedChunk {
                            index,
                            tokens,
                            limit: chunk_size,
                        });
                    }
                }
            }
            chunks.push(Chunk::new(index, piece));
        }

        Ok(chunks)
    }

    /// Split on the coarsest separator that helps, recursing into fragments
    /// that are still over budget, then greedily re-merge neighbours.
    fn split_recursive(&self, text: &str, chunk_size: usize, separators: &[&str]) -> Vec<String> {
        if self.counter.count(text) <= chunk_size {
            return vec![text.to_string()];
        }

        let Some((separator, rest)) = separators.split_first() else {
            // Atomic unit over the limit; the caller applies the policy.
            return vec![text.to_string()];
        };

        let fragments = split_keep_separator(text, separator);
        if fragments.len() <= 1 {
            return self.split_recursive(text, chunk_size, rest);
        }

        let mut pieces = Vec::new();
        for fragment in fragments {
            if self.counter.count(&fragment) > chunk_size {
                pieces.extend(self.split_recursive(&fragment, chunk_size, rest));
            } else {
                pieces.push(fragment);
            }
        }

        self.merge_adjacent(pieces, chunk_size)
    }

    /// Greedily merge adjacent pieces while the result stays within budget.
    fn merge_adjacent(&self, pieces: Vec<String>, chunk_size: usize) -> Vec<String> {
        let mut merged: Vec<String> = Vec::with_capacity(pieces.len());

        for piece in pieces {
            match merged.last_mut() {
                Some(last) if self.counter.count(&format!("{}{}", last, piece)) <= chunk_size => {
                    last.push_str(&piece);
                }
                _ => merged.push(piece),
            }
        }

        merged
    }
}

/// Split `text` on `separator`, keeping the separator attached to the
/// preceding fragment so that concatenation is lossless.
fn split_keep_separator(text: &str, separator: &str) -> Vec<String> {
    let mut fragments = Vec::new();
    let mut rest = text;

    while let Some(pos) = rest.find(separator) {
        let end = pos + separator.len();
        fragments.push(rest[..end].to_string());
        rest = &rest[end..];
    }

    if !rest.is_empty() {
        fragments.push(rest.to_string());
    }

    fragments
}
