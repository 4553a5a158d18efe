/*!
 * Tests for upload validation and archive handling
 */

use bytes::Bytes;
use codeconv::app_config::UploadConfig;
use codeconv::archive;
use codeconv::errors::UploadError;
use codeconv::upload::{self, sanitize_filename, UploadPolicy};

use crate::common;

fn small_policy() -> UploadPolicy {
    UploadPolicy::from_config(&UploadConfig {
        max_upload_bytes: 10 * 1024,
        allowed_extensions: vec!["zip".to_string()],
        max_extracted_bytes: 64 * 1024,
    })
}

#[test]
fn test_sanitizeFilename_shouldDropDirectoriesAndOddCharacters() {
    assert_eq!(sanitize_filename("../../etc/my project.zip"), "my_project.zip");
    assert_eq!(sanitize_filename("C:\\Users\\me\\code.ZIP"), "code.ZIP");
    assert_eq!(sanitize_filename("..hidden.zip"), "hidden.zip");
}

#[test]
fn test_validate_withAllowedExtension_shouldReturnSanitizedName() {
    let name = small_policy().validate("Project Files.ZIP", 100).unwrap();
    assert_eq!(name, "Project_Files.ZIP");
}

#[test]
fn test_validate_withDisallowedExtension_shouldFail() {
    let err = small_policy().validate("project.rar", 100).unwrap_err();
    assert!(matches!(err, UploadError::DisallowedExtension { ref extension, .. } if extension == "rar"));
}

#[test]
fn test_validate_overLimit_shouldReturnTooLarge() {
    let err = small_policy().validate("project.zip", 10 * 1024 + 1).unwrap_err();
    assert!(matches!(err, UploadError::TooLarge { limit } if limit == 10 * 1024));
}

#[test]
fn test_validate_withEmptyName_shouldReturnNoFile() {
    assert!(matches!(small_policy().validate("", 1), Err(UploadError::NoFile)));
}

#[tokio::test]
async fn test_prepare_shouldUnpackIntoSessionDirectory() {
    let dir = common::create_temp_dir().unwrap();
    let data = common::zip_bytes(&[("myproj/main.c", common::sample_c_source())]);

    let prepared = upload::prepare(&small_policy(), dir.path(), "myproj.zip", Bytes::from(data))
        .await
        .unwrap();

    assert!(prepared.session_dir.starts_with(dir.path()));
    assert!(prepared.archive_path.exists());
    assert!(prepared.project_dir.ends_with("myproj"));
    assert!(prepared.project_dir.join("main.c").exists());
}

#[tokio::test]
async fn test_prepare_withCorruptArchive_shouldFailAndCleanUp() {
    let dir = common::create_temp_dir().unwrap();

    let err = upload::prepare(&small_policy(), dir.path(), "broken.zip", Bytes::from_static(b"not a zip"))
        .await
        .unwrap_err();

    assert!(matches!(err, UploadError::InvalidArchive(_)));
    assert_eq!(common::entry_count(dir.path()), 0);
}

#[tokio::test]
async fn test_prepare_withEmptyBody_shouldReturnNoFile() {
    let dir = common::create_temp_dir().unwrap();
    let err = upload::prepare(&small_policy(), dir.path(), "empty.zip", Bytes::new())
        .await
        .unwrap_err();
    assert!(matches!(err, UploadError::NoFile));
}

#[test]
fn test_extractZip_overExtractedLimit_shouldFail() {
    let dir = common::create_temp_dir().unwrap();
    let big = "x".repeat(4096);
    let data = common::zip_bytes(&[("a.c", big.as_str()), ("b.c", big.as_str())]);
    let archive_path = dir.path().join("big.zip");
    std::fs::write(&archive_path, data).unwrap();

    let err = archive::extract_zip(&archive_path, &dir.path().join("out"), 5000).unwrap_err();
    assert!(matches!(err, UploadError::ExtractedTooLarge { limit: 5000 }));
}

#[test]
fn test_createZip_shouldStoreRelativeSlashPaths() {
    let dir = common::create_temp_dir().unwrap();
    let project = dir.path().join("project");
    common::create_test_file(&project, "main.py", "print(1)\n").unwrap();
    common::create_test_file(&project, "pkg/util.py", "x = 1\n").unwrap();
    let dest = dir.path().join("out/project.zip");

    let count = archive::create_zip(&project, &dest).unwrap();

    assert_eq!(count, 2);
    assert_eq!(archive::list_entries(&dest).unwrap(), vec!["main.py", "pkg/util.py"]);
}
