/*!
 * Tests for the three-stage pipeline orchestration: stage ordering,
 * checkpointing, and idempotent resume.
 */

use tempfile::TempDir;

use mdxlate::providers::mock::MockCompletion;
use mdxlate::translation::cache::{JsonStageCache, StageCheckpoint, StageStore};
use mdxlate::translation::chunking::Chunk;
use mdxlate::translation::pipeline::Translator;

use crate::common;

fn chunk_seq(count: usize) -> Vec<Chunk> {
    (0..count)
        .map(|i| Chunk::new(i, format!("chunk number {}. ", i)))
        .collect()
}

fn translator(
    mock: &MockCompletion,
    cache: &JsonStageCache,
    token_limit: usize,
) -> Translator<MockCompletion, JsonStageCache> {
    Translator::new(
        mock.clone(),
        cache.clone(),
        common::prompt_context(),
        common::chunker(),
        token_limit,
    )
}

#[tokio::test]
async fn test_translate_withSmallDocument_shouldMakeOneCallPerStage() {
    let dir = TempDir::new().unwrap();
    let cache = JsonStageCache::new(dir.path().join("scope"));
    let mock = MockCompletion::working();

    // Well under the limit, so the whole document is a single chunk.
    let result = translator(&mock, &cache, 1000)
        .translate("A short document that fits in one chunk.")
        .await
        .unwrap();

    assert_eq!(mock.calls(), 3);
    assert!(!result.is_empty());
}

#[tokio::test]
async fn test_translate_withEmptyDocument_shouldMakeNoCalls() {
    let dir = TempDir::new().unwrap();
    let cache = JsonStageCache::new(dir.path().join("scope"));
    let mock = MockCompletion::working();

    let result = translator(&mock, &cache, 1000).translate("").await.unwrap();

    assert_eq!(result, "");
    assert_eq!(mock.calls(), 0);
}

#[tokio::test]
async fn test_translate_shouldRunStagesInOrderWithoutInterleaving() {
    let dir = TempDir::new().unwrap();
    let cache = JsonStageCache::new(dir.path().join("scope"));
    let mock = MockCompletion::working();

    translator(&mock, &cache, 30)
        .translate(&common::sample_markdown())
        .await
        .unwrap();

    let prompts = mock.prompts();
    assert_eq!(prompts.len() % 3, 0);
    let per_stage = prompts.len() / 3;
    assert!(per_stage > 1, "document should split into several chunks");

    for (i, prompt) in prompts.iter().enumerate() {
        if i < per_stage {
            assert!(
                prompt.contains("professional translation"),
                "call {} should be a draft prompt",
                i
            );
        } else if i < 2 * per_stage {
            assert!(
                prompt.contains("constructive criticism")
                    && !prompt.contains("EXPERT_SUGGESTIONS"),
                "call {} should be a reflect prompt",
                i
            );
        } else {
            assert!(
                prompt.contains("EXPERT_SUGGESTIONS"),
                "call {} should be a revise prompt",
                i
            );
        }
    }
}

#[tokio::test]
async fn test_draftStage_withPartialCheckpoint_shouldResumeAtNextChunk() {
    let dir = TempDir::new().unwrap();
    let cache = JsonStageCache::new(dir.path().join("scope"));

    // Pre-seed the draft stage: chunks 0..=2 already done.
    let mut seeded = StageCheckpoint::empty();
    seeded.record(0, "cached zero".to_string());
    seeded.record(1, "cached one".to_string());
    seeded.record(2, "cached two".to_string());
    cache.save("draft", &seeded).unwrap();

    let mock = MockCompletion::working();
    let chunks = chunk_seq(5);

    let results = translator(&mock, &cache, 1000)
        .draft_stage(&chunks)
        .await
        .unwrap();

    // Only chunks 3 and 4 hit the completion service.
    assert_eq!(mock.calls(), 2);
    assert_eq!(results.len(), 5);
    assert_eq!(results[0], "cached zero");
    assert_eq!(results[1], "cached one");
    assert_eq!(results[2], "cached two");
}

#[tokio::test]
async fn test_draftStage_withCompleteCheckpoint_shouldMakeNoCalls() {
    let dir = TempDir::new().unwrap();
    let cache = JsonStageCache::new(dir.path().join("scope"));

    let mut seeded = StageCheckpoint::empty();
    for i in 0..3 {
        seeded.record(i, format!("done {}", i));
    }
    cache.save("draft", &seeded).unwrap();

    let mock = MockCompletion::working();
    let chunks = chunk_seq(3);

    let results = translator(&mock, &cache, 1000)
        .draft_stage(&chunks)
        .await
        .unwrap();

    assert_eq!(mock.calls(), 0);
    assert_eq!(results, vec!["done 0", "done 1", "done 2"]);
}

#[tokio::test]
async fn test_draftStage_onFailure_shouldLeaveCheckpointAtLastSuccess() {
    let dir = TempDir::new().unwrap();
    let cache = JsonStageCache::new(dir.path().join("scope"));

    // Calls 0 and 1 succeed, call 2 fails.
    let mock = MockCompletion::fail_at(2);
    let chunks = chunk_seq(5);

    let result = translator(&mock, &cache, 1000).draft_stage(&chunks).await;
    assert!(result.is_err());

    let checkpoint = cache.load("draft").unwrap();
    assert_eq!(checkpoint.done_idx, 1);
    assert_eq!(checkpoint.results.len(), 2);
}

#[tokio::test]
async fn test_translate_afterInterruption_shouldMatchUninterruptedRun() {
    common::init_logging();
    let text = common::sample_markdown();

    // Control: an uninterrupted run.
    let control_dir = TempDir::new().unwrap();
    let control_cache = JsonStageCache::new(control_dir.path().join("scope"));
    let control_mock = MockCompletion::working();
    let expected = translator(&control_mock, &control_cache, 30)
        .translate(&text)
        .await
        .unwrap();
    let total_calls = control_mock.calls();

    // Interrupted run: dies partway through the draft stage.
    let dir = TempDir::new().unwrap();
    let cache = JsonStageCache::new(dir.path().join("scope"));
    let failing = MockCompletion::fail_at(2);
    let err = translator(&failing, &cache, 30).translate(&text).await;
    assert!(err.is_err());

    // Resume with a healthy service against the same cache scope.
    let resumed_mock = MockCompletion::working();
    let resumed = translator(&resumed_mock, &cache, 30)
        .translate(&text)
        .await
        .unwrap();

    assert_eq!(resumed, expected);
    // The two completed chunks were replayed from cache, not recomputed.
    assert_eq!(resumed_mock.calls(), total_calls - 2);
}

#[tokio::test]
async fn test_translate_withReflectFailure_shouldKeepDraftStageComplete() {
    let text = common::sample_markdown();

    // First find out how many chunks the document splits into.
    let probe_dir = TempDir::new().unwrap();
    let probe_cache = JsonStageCache::new(probe_dir.path().join("scope"));
    let probe_mock = MockCompletion::working();
    translator(&probe_mock, &probe_cache, 30)
        .translate(&text)
        .await
        .unwrap();
    let chunk_count = probe_mock.calls() / 3;

    // Fail on the first reflect call.
    let dir = TempDir::new().unwrap();
    let cache = JsonStageCache::new(dir.path().join("scope"));
    let failing = MockCompletion::fail_at(chunk_count);
    assert!(translator(&failing, &cache, 30).translate(&text).await.is_err());

    let draft = cache.load("draft").unwrap();
    assert!(draft.is_complete(chunk_count));
    let reflect = cache.load("reflect").unwrap();
    assert_eq!(reflect.done_idx, -1);

    // Resuming only replays reflect and revise.
    let resumed_mock = MockCompletion::working();
    translator(&resumed_mock, &cache, 30)
        .translate(&text)
        .await
        .unwrap();
    assert_eq!(resumed_mock.calls(), 2 * chunk_count);
}

#[tokio::test]
async fn test_reviseStage_shouldPrefixResultsWithBlankLine() {
    let dir = TempDir::new().unwrap();
    let cache = JsonStageCache::new(dir.path().join("scope"));
    let mock = MockCompletion::working();

    let chunks = chunk_seq(2);
    let drafts = vec!["d0".to_string(), "d1".to_string()];
    let reflections = vec!["r0".to_string(), "r1".to_string()];

    let revisions = translator(&mock, &cache, 1000)
        .revise_stage(&chunks, &drafts, &reflections)
        .await
        .unwrap();

    for revision in &revisions {
        assert!(revision.starts_with("\n\n"));
    }
}
