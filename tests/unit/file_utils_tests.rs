/*!
 * Tests for file utility functions
 */

use codeconv::file_utils::FileManager;

use crate::common;

#[test]
fn test_findSourceFiles_shouldSkipHiddenAndMetadataDirs() {
    let dir = common::create_temp_dir().unwrap();
    let root = dir.path();
    common::create_test_file(root, "main.c", "int main() {}").unwrap();
    common::create_test_file(root, "lib/util.h", "#define X 1").unwrap();
    common::create_test_file(root, ".git/hooks/pre.c", "x").unwrap();
    common::create_test_file(root, "__MACOSX/main.c", "x").unwrap();
    common::create_test_file(root, "notes.txt", "x").unwrap();

    let files = FileManager::find_source_files(root, &["c", "h"]).unwrap();
    let relative: Vec<String> = files
        .iter()
        .map(|f| FileManager::relative_slash_path(f, root).unwrap())
        .collect();

    assert_eq!(relative, vec!["lib/util.h", "main.c"]);
}

#[test]
fn test_cleanSourceDirectory_shouldRemoveArchiverMetadata() {
    let dir = common::create_temp_dir().unwrap();
    let root = dir.path();
    common::create_test_file(root, "__MACOSX/._main.c", "x").unwrap();
    common::create_test_file(root, "src/._app.py", "x").unwrap();
    common::create_test_file(root, "src/app.py", "print(1)").unwrap();

    let removed = FileManager::clean_source_directory(root).unwrap();

    assert_eq!(removed, 2);
    assert!(!root.join("__MACOSX").exists());
    assert!(!root.join("src/._app.py").exists());
    assert!(root.join("src/app.py").exists());
}

#[test]
fn test_descendSingleDir_shouldStepThroughWrappers() {
    let dir = common::create_temp_dir().unwrap();
    let root = dir.path();
    common::create_test_file(root, "project/inner/main.c", "x").unwrap();
    common::create_test_file(root, "project/inner/util.c", "x").unwrap();
    common::create_test_file(root, "project/.DS_Store", "x").unwrap();

    let found = FileManager::descend_single_dir(root).unwrap();
    assert_eq!(found, root.join("project").join("inner"));
}

#[test]
fn test_descendSingleDir_withSeveralEntries_shouldStayPut() {
    let dir = common::create_temp_dir().unwrap();
    let root = dir.path();
    common::create_test_file(root, "a/main.c", "x").unwrap();
    common::create_test_file(root, "README.md", "x").unwrap();

    assert_eq!(FileManager::descend_single_dir(root).unwrap(), root.to_path_buf());
}

#[test]
fn test_readSource_withLatin1Bytes_shouldDecode() {
    let dir = common::create_temp_dir().unwrap();
    let path = dir.path().join("legacy.c");
    std::fs::write(&path, [b'/', b'/', b' ', 0xE9, b'\n']).unwrap();

    let text = FileManager::read_source(&path).unwrap();
    assert_eq!(text, "// é\n");
}

#[test]
fn test_writeToFile_shouldCreateParentDirectories() {
    let dir = common::create_temp_dir().unwrap();
    let path = dir.path().join("deep/nested/out.py");

    FileManager::write_to_file(&path, "x = 1\n").unwrap();

    assert!(FileManager::file_exists(&path));
    assert!(FileManager::dir_exists(dir.path().join("deep/nested")));
}

#[test]
fn test_removeDirIfExists_shouldReportWhetherAnythingWasRemoved() {
    let dir = common::create_temp_dir().unwrap();
    let target = dir.path().join("gone");
    FileManager::ensure_dir(&target).unwrap();

    assert!(FileManager::remove_dir_if_exists(&target).unwrap());
    assert!(!FileManager::remove_dir_if_exists(&target).unwrap());
}
