/*!
 * End-to-end document processing tests: read, translate, write, source
 * deletion, cache teardown, and failure isolation.
 */

use std::fs;

use tempfile::TempDir;

use mdxlate::app_controller::{run_scope_id, Controller};
use mdxlate::providers::mock::MockCompletion;

use crate::common;

struct Workspace {
    input: TempDir,
    output: TempDir,
    cache: TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self {
            input: TempDir::new().unwrap(),
            output: TempDir::new().unwrap(),
            cache: TempDir::new().unwrap(),
        }
    }

    fn controller(&self) -> Controller {
        let config = common::test_config(self.output.path(), self.cache.path());
        Controller::with_config(config).unwrap()
    }
}

#[tokio::test]
async fn test_processDocument_shouldWriteOutputAndTearDown() {
    common::init_logging();
    let workspace = Workspace::new();
    let source_path = workspace.input.path().join("notes.md");
    let source_text = "Some notes without a heading.";
    fs::write(&source_path, source_text).unwrap();

    let scope_id = run_scope_id(&source_path, source_text);
    let mock = MockCompletion::working();

    let output_path = workspace
        .controller()
        .process_document(&mock, &source_path)
        .await
        .unwrap();

    // Output written under the source stem (no heading in the translation).
    assert_eq!(output_path.file_name().unwrap(), "notes.md");
    assert!(output_path.exists());
    let translation = fs::read_to_string(&output_path).unwrap();
    assert!(translation.contains("mock:"));

    // Source removed and cache scope cleared after the successful write.
    assert!(!source_path.exists());
    assert!(!workspace.cache.path().join(scope_id).exists());
}

#[tokio::test]
async fn test_processDocument_withKeepSource_shouldRetainSource() {
    let workspace = Workspace::new();
    let source_path = workspace.input.path().join("keep.md");
    fs::write(&source_path, "Keep me around.").unwrap();

    let mut config = common::test_config(workspace.output.path(), workspace.cache.path());
    config.keep_source = true;
    let controller = Controller::with_config(config).unwrap();

    let mock = MockCompletion::working();
    controller
        .process_document(&mock, &source_path)
        .await
        .unwrap();

    assert!(source_path.exists());
}

#[tokio::test]
async fn test_processDocument_onFailure_shouldLeaveSourceAndCache() {
    let workspace = Workspace::new();
    let source_path = workspace.input.path().join("doc.md");
    let source_text = common::sample_markdown();
    fs::write(&source_path, &source_text).unwrap();

    // Dies after the first completed chunk.
    let mock = MockCompletion::fail_at(1);

    let result = workspace
        .controller()
        .process_document(&mock, &source_path)
        .await;
    assert!(result.is_err());

    // The source survives, no output is written, and the partial
    // checkpoint remains for resumption.
    assert!(source_path.exists());
    assert!(fs::read_dir(workspace.output.path()).unwrap().next().is_none());
    let scope_dir = workspace.cache.path().join(run_scope_id(&source_path, &source_text));
    assert!(scope_dir.join("draft.json").exists());
}

#[tokio::test]
async fn test_processDocument_afterFailure_shouldResumeFromCheckpoint() {
    // Control run on a separate workspace to learn the total call count.
    let control = Workspace::new();
    let control_path = control.input.path().join("doc.md");
    fs::write(&control_path, common::sample_markdown()).unwrap();

    let mut control_config = common::test_config(control.output.path(), control.cache.path());
    control_config.token_limit = 30;
    let control_mock = MockCompletion::working();
    Controller::with_config(control_config)
        .unwrap()
        .process_document(&control_mock, &control_path)
        .await
        .unwrap();
    let total_calls = control_mock.calls();
    assert!(total_calls > 3, "document should split into several chunks");

    // Interrupted run: the fourth completion call dies.
    let workspace = Workspace::new();
    let source_path = workspace.input.path().join("doc.md");
    fs::write(&source_path, common::sample_markdown()).unwrap();

    let mut config = common::test_config(workspace.output.path(), workspace.cache.path());
    config.token_limit = 30;
    let controller = Controller::with_config(config).unwrap();

    let failing = MockCompletion::fail_at(3);
    assert!(controller
        .process_document(&failing, &source_path)
        .await
        .is_err());

    let resumed = MockCompletion::working();
    let output_path = controller
        .process_document(&resumed, &source_path)
        .await
        .unwrap();

    assert!(output_path.exists());
    assert!(!source_path.exists());
    // The three chunks completed before the failure came from cache.
    assert_eq!(resumed.calls(), total_calls - 3);
}

#[tokio::test]
async fn test_processDocument_withHeading_shouldDeriveOutputName() {
    let workspace = Workspace::new();
    let source_path = workspace.input.path().join("raw_input.md");
    fs::write(&source_path, "Body only, no heading").unwrap();

    // The mock output never starts with "# ", so the derived name falls
    // back to the source stem.
    let mock = MockCompletion::working();
    let output_path = workspace
        .controller()
        .process_document(&mock, &source_path)
        .await
        .unwrap();

    assert_eq!(output_path.file_name().unwrap(), "raw_input.md");
}

#[tokio::test]
async fn test_run_withFailingProvider_shouldIsolateDocumentFailures() {
    let workspace = Workspace::new();
    fs::write(workspace.input.path().join("one.md"), "First document.").unwrap();
    fs::write(workspace.input.path().join("two.md"), "Second document.").unwrap();

    // The default config points at a local Ollama endpoint; without a
    // server the completion boundary fails, which must not abort the
    // batch or delete any source file.
    let mut config = common::test_config(workspace.output.path(), workspace.cache.path());
    config.translation.common.retry_count = 0;
    let controller = Controller::with_config(config).unwrap();

    let summary = controller.run(workspace.input.path()).await.unwrap();

    assert_eq!(summary.processed + summary.failed, 2);
    if summary.failed == 2 {
        assert!(workspace.input.path().join("one.md").exists());
        assert!(workspace.input.path().join("two.md").exists());
    }
}

#[tokio::test]
async fn test_run_withEmptyDirectory_shouldDoNothing() {
    let workspace = Workspace::new();

    let summary = workspace
        .controller()
        .run(workspace.input.path())
        .await
        .unwrap();

    assert_eq!(summary.processed, 0);
    assert_eq!(summary.failed, 0);
}
