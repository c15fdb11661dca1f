/*!
 * Tests for file and directory utilities
 */

use std::fs;

use tempfile::TempDir;

use mdxlate::file_utils::FileManager;

#[test]
fn test_findDocuments_shouldListOnlyRegularFiles() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("b.md"), "b").unwrap();
    fs::write(dir.path().join("a.md"), "a").unwrap();
    fs::write(dir.path().join(".hidden"), "x").unwrap();
    fs::create_dir(dir.path().join("subdir")).unwrap();
    fs::write(dir.path().join("subdir").join("nested.md"), "n").unwrap();

    let documents = FileManager::find_documents(dir.path()).unwrap();

    let names: Vec<String> = documents
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
        .collect();
    assert_eq!(names, vec!["a.md", "b.md"]);
}

#[test]
fn test_findDocuments_withEmptyDir_shouldReturnEmpty() {
    let dir = TempDir::new().unwrap();
    assert!(FileManager::find_documents(dir.path()).unwrap().is_empty());
}

#[test]
fn test_writeToFile_shouldCreateParentDirectories() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("deep").join("out.md");

    FileManager::write_to_file(&path, "content").unwrap();

    assert_eq!(FileManager::read_to_string(&path).unwrap(), "content");
}

#[test]
fn test_removeFile_shouldDeleteExistingFile() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("doc.md");
    fs::write(&path, "x").unwrap();

    FileManager::remove_file(&path).unwrap();
    assert!(!path.exists());
}

#[test]
fn test_removeFile_withMissingFile_shouldFail() {
    let dir = TempDir::new().unwrap();
    assert!(FileManager::remove_file(dir.path().join("missing.md")).is_err());
}

#[test]
fn test_ensureDir_shouldBeIdempotent() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cache");

    FileManager::ensure_dir(&path).unwrap();
    FileManager::ensure_dir(&path).unwrap();
    assert!(FileManager::dir_exists(&path));
}
