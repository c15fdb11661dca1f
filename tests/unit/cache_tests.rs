/*!
 * Tests for the durable stage checkpoint store.
 */

use std::fs;

use tempfile::TempDir;

use mdxlate::translation::cache::{JsonStageCache, StageCheckpoint, StageStore};

fn scope(dir: &TempDir) -> JsonStageCache {
    JsonStageCache::new(dir.path().join("scope"))
}

#[test]
fn test_cache_load_withNoEntry_shouldReturnNotStarted() {
    let dir = TempDir::new().unwrap();
    let cache = scope(&dir);

    let checkpoint = cache.load("draft").unwrap();
    assert_eq!(checkpoint.done_idx, -1);
    assert!(checkpoint.results.is_empty());
}

#[test]
fn test_cache_saveThenLoad_shouldRoundTrip() {
    let dir = TempDir::new().unwrap();
    let cache = scope(&dir);

    let mut checkpoint = StageCheckpoint::empty();
    checkpoint.record(0, "first".to_string());
    checkpoint.record(1, "second".to_string());
    cache.save("draft", &checkpoint).unwrap();

    let loaded = cache.load("draft").unwrap();
    assert_eq!(loaded, checkpoint);
}

#[test]
fn test_cache_save_shouldOverwritePreviousCheckpoint() {
    let dir = TempDir::new().unwrap();
    let cache = scope(&dir);

    let mut checkpoint = StageCheckpoint::empty();
    checkpoint.record(0, "first".to_string());
    cache.save("draft", &checkpoint).unwrap();

    checkpoint.record(1, "second".to_string());
    cache.save("draft", &checkpoint).unwrap();

    let loaded = cache.load("draft").unwrap();
    assert_eq!(loaded.done_idx, 1);
    assert_eq!(loaded.results.len(), 2);
}

#[test]
fn test_cache_stages_shouldBeIndependent() {
    let dir = TempDir::new().unwrap();
    let cache = scope(&dir);

    let mut draft = StageCheckpoint::empty();
    draft.record(0, "draft output".to_string());
    cache.save("draft", &draft).unwrap();

    let reflect = cache.load("reflect").unwrap();
    assert_eq!(reflect.done_idx, -1);
}

#[test]
fn test_cache_load_withLengthMismatch_shouldDetectCorruption() {
    let dir = TempDir::new().unwrap();
    let cache = scope(&dir);

    // Persist something valid first so the scope dir exists.
    cache.save("draft", &StageCheckpoint::empty()).unwrap();

    // Hand-write a record whose lengths disagree.
    let path = cache.scope_dir().join("draft.json");
    fs::write(&path, r#"{"done_idx": 3, "results": ["only", "two"]}"#).unwrap();

    let result = cache.load("draft");
    assert!(matches!(
        result,
        Err(mdxlate::CacheError::Corrupt { done_idx: 3, .. })
    ));
}

#[test]
fn test_cache_clear_shouldRemoveScope() {
    let dir = TempDir::new().unwrap();
    let cache = scope(&dir);

    let mut checkpoint = StageCheckpoint::empty();
    checkpoint.record(0, "x".to_string());
    cache.save("draft", &checkpoint).unwrap();
    cache.save("reflect", &checkpoint).unwrap();
    assert!(cache.scope_dir().exists());

    cache.clear().unwrap();
    assert!(!cache.scope_dir().exists());

    // A cleared scope reads back as not started.
    let loaded = cache.load("draft").unwrap();
    assert_eq!(loaded.done_idx, -1);
}

#[test]
fn test_cache_clear_withMissingScope_shouldSucceed() {
    let dir = TempDir::new().unwrap();
    let cache = scope(&dir);

    cache.clear().unwrap();
}
