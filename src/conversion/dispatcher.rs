/*!
 * Project conversion.
 *
 * Walks an extracted project, converts every file whose extension belongs to
 * the conversion type and writes the result under the target directory with
 * the same relative layout. A file that cannot be converted is reported and
 * skipped; it never stops the rest of the project.
 */

use anyhow::{anyhow, Context, Result};
use log::{debug, error, info, warn};
use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;

use super::report::{ConversionReport, FileArtifact, FileConversionRecord, FileError, FileStatus};
use super::{analysis, guidance, rules, scaffold, validation, ConversionType};
use crate::ai::AiConverter;
use crate::file_utils::FileManager;

/// Converts whole projects, with AI when available and rules otherwise
#[derive(Debug, Clone, Default)]
pub struct ProjectConverter {
    ai: Option<AiConverter>,
}

/// Code for one file and where it came from
struct ConvertedFile {
    code: String,
    ai_used: bool,
    model: Option<String>,
}

impl ProjectConverter {
    pub fn new(ai: Option<AiConverter>) -> Self {
        Self { ai }
    }

    /// Converter that never calls a model
    pub fn rules_only() -> Self {
        Self { ai: None }
    }

    pub fn has_ai(&self) -> bool {
        self.ai.is_some()
    }

    /// Convert every recognized file of `source_dir` into `target_dir`
    ///
    /// # Returns
    /// * `Result<ConversionReport>` - Per-file outcome; errors only for job-level failures
    pub async fn convert_project(
        &self,
        source_dir: &Path,
        target_dir: &Path,
        conversion_type: ConversionType,
        use_ai: bool,
    ) -> Result<ConversionReport> {
        self.convert_project_with_progress(source_dir, target_dir, conversion_type, use_ai, |_, _, _| {})
            .await
    }

    /// Same as `convert_project`, calling `on_progress(done, total, file)` after each file
    pub async fn convert_project_with_progress<F>(
        &self,
        source_dir: &Path,
        target_dir: &Path,
        conversion_type: ConversionType,
        use_ai: bool,
        mut on_progress: F,
    ) -> Result<ConversionReport>
    where
        F: FnMut(usize, usize, &str),
    {
        if !FileManager::dir_exists(source_dir) {
            return Err(anyhow!("Source directory does not exist: {:?}", source_dir));
        }
        FileManager::ensure_dir(target_dir)?;

        let cleanup_warning = match FileManager::clean_source_directory(source_dir) {
            Ok(removed) => {
                if removed > 0 {
                    debug!("Removed {} archiver metadata entries from {:?}", removed, source_dir);
                }
                None
            }
            Err(e) => {
                warn!("Could not clean {:?}: {:#}", source_dir, e);
                Some(format!("Archiver metadata could not be removed: {:#}", e))
            }
        };

        let files = FileManager::find_source_files(source_dir, conversion_type.source_extensions())
            .with_context(|| format!("Failed to scan {:?}", source_dir))?;

        let ai = if use_ai { self.ai.as_ref() } else { None };
        let mut report = ConversionReport {
            conversion_type,
            source_dir: source_dir.to_string_lossy().to_string(),
            target_dir: target_dir.to_string_lossy().to_string(),
            files_converted: Vec::with_capacity(files.len()),
            errors: Vec::new(),
            warnings: Vec::new(),
            manifests: Vec::new(),
            ai_used: ai.is_some(),
            next_steps: None,
            analysis: None,
        };
        report.warnings.extend(cleanup_warning);

        info!(
            "Converting {} file(s) from {:?} ({}, AI {})",
            files.len(),
            source_dir,
            conversion_type,
            if ai.is_some() { "on" } else { "off" }
        );

        if use_ai && ai.is_none() {
            report
                .warnings
                .push("AI conversion requested but no model is configured; rule-based conversion used".to_string());
        }

        if files.is_empty() {
            let extensions = conversion_type
                .source_extensions()
                .iter()
                .map(|e| format!(".{}", e))
                .collect::<Vec<_>>()
                .join(", ");
            report.warnings.push(format!(
                "No {} source files found (looked for {})",
                conversion_type.source_language().display_name(),
                extensions
            ));
        }

        let mut written_by: HashMap<String, String> = HashMap::new();
        let total = files.len();

        for (index, path) in files.iter().enumerate() {
            let source_rel = FileManager::relative_slash_path(path, source_dir)?;
            let target_rel = target_relative_path(&source_rel, conversion_type.target_extension());
            let mut warnings = Vec::new();

            if let Some(earlier) = written_by.get(&target_rel) {
                warnings.push(format!(
                    "{} overwrites the output of {}",
                    source_rel, earlier
                ));
            }

            let started = Instant::now();
            let outcome = self
                .convert_file(path, &source_rel, &target_rel, target_dir, conversion_type, ai, &mut warnings)
                .await;

            match outcome {
                Ok((converted, source_code)) => {
                    let check = validation::check_output(conversion_type, &converted.code);
                    warnings.extend(check.warnings.iter().cloned());
                    written_by.insert(target_rel.clone(), source_rel.clone());

                    debug!(
                        "Converted {} -> {} ({})",
                        source_rel,
                        target_rel,
                        converted.model.as_deref().unwrap_or("rules")
                    );

                    report.files_converted.push(FileConversionRecord {
                        source: source_rel.clone(),
                        target: target_rel,
                        status: FileStatus::Success,
                        warnings,
                        ai_used: converted.ai_used,
                        model: converted.model,
                        artifact: Some(FileArtifact {
                            source_code,
                            target_code: converted.code,
                            duration_ms: started.elapsed().as_millis() as i64,
                            output_non_empty: check.output_non_empty,
                            delimiters_balanced: check.delimiters_balanced,
                        }),
                    });
                }
                Err(err) => {
                    let message = format!("{:#}", err);
                    error!("Failed to convert {}: {}", source_rel, message);

                    report.errors.push(FileError {
                        file: source_rel.clone(),
                        error: message,
                    });
                    report.files_converted.push(FileConversionRecord {
                        source: source_rel.clone(),
                        target: target_rel,
                        status: FileStatus::Error,
                        warnings,
                        ai_used: false,
                        model: None,
                        artifact: None,
                    });
                }
            }

            on_progress(index + 1, total, &source_rel);
        }

        match scaffold::write_manifests(target_dir, conversion_type) {
            Ok(manifests) => report.manifests = manifests,
            Err(err) => {
                error!("Failed to write manifests: {:#}", err);
                report
                    .warnings
                    .push(format!("Failed to write project manifests: {:#}", err));
            }
        }

        report.next_steps = Some(guidance::next_steps(
            conversion_type,
            report.ai_used,
            report.error_count(),
        ));
        report.analysis = Some(analysis::analyze_conversion(conversion_type, source_dir, target_dir));

        info!(
            "Conversion finished: {} succeeded, {} failed",
            report.success_count(),
            report.error_count()
        );

        Ok(report)
    }

    /// Read, convert and write one file
    ///
    /// # Returns
    /// * `Result<(ConvertedFile, String)>` - Converted code and the decoded source
    #[allow(clippy::too_many_arguments)]
    async fn convert_file(
        &self,
        path: &Path,
        source_rel: &str,
        target_rel: &str,
        target_dir: &Path,
        conversion_type: ConversionType,
        ai: Option<&AiConverter>,
        warnings: &mut Vec<String>,
    ) -> Result<(ConvertedFile, String)> {
        let source = FileManager::read_source(path)?;
        let file_name = source_rel.rsplit('/').next().unwrap_or(source_rel);

        let mut converted = None;
        if let Some(ai) = ai {
            match ai.convert(&source, conversion_type).await {
                Ok(result) => {
                    converted = Some(ConvertedFile {
                        code: result.code,
                        ai_used: true,
                        model: Some(result.model),
                    });
                }
                Err(err) => {
                    warn!("AI conversion of {} failed, using rules: {}", source_rel, err);
                    warnings.push(format!("{}; rule-based conversion used", err));
                }
            }
        }

        let converted = match converted {
            Some(converted) => converted,
            None => ConvertedFile {
                code: rules::convert(conversion_type, &source, file_name)?,
                ai_used: false,
                model: None,
            },
        };

        FileManager::write_to_file(target_dir.join(target_rel), &converted.code)?;
        Ok((converted, source))
    }
}

/// Replace the extension of a `/` separated relative path
pub fn target_relative_path(source_rel: &str, target_extension: &str) -> String {
    let (dir, file) = match source_rel.rsplit_once('/') {
        Some((dir, file)) => (Some(dir), file),
        None => (None, source_rel),
    };

    let stem = match file.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => file,
    };

    match dir {
        Some(dir) => format!("{}/{}.{}", dir, stem, target_extension),
        None => format!("{}.{}", stem, target_extension),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_targetRelativePath_shouldSwapExtensionOnly() {
        assert_eq!(target_relative_path("main.c", "py"), "main.py");
        assert_eq!(target_relative_path("src/app.test.js", "py"), "src/app.test.py");
        assert_eq!(target_relative_path("a.b/Makefile", "py"), "a.b/Makefile.py");
    }

    #[tokio::test]
    async fn test_convertProject_withMainC_shouldProduceOneSuccess() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src");
        let out = dir.path().join("out");
        FileManager::write_to_file(
            src.join("main.c"),
            "#include <stdio.h>\nint main() {\n    printf(\"hi\\n\");\n    return 0;\n}\n",
        )
        .unwrap();

        let report = ProjectConverter::rules_only()
            .convert_project(&src, &out, ConversionType::CToPython, false)
            .await
            .unwrap();

        assert_eq!(report.files_converted.len(), 1);
        let record = &report.files_converted[0];
        assert_eq!(record.source, "main.c");
        assert_eq!(record.target, "main.py");
        assert!(record.is_success());
        assert!(!record.ai_used);
        assert!(!report.ai_used);
        assert!(out.join("main.py").exists());
        assert_eq!(report.manifests, vec!["requirements.txt", "README.md"]);
        assert!(report.next_steps.is_some());

        let analysis = report.analysis.expect("analysis attached");
        assert_eq!(analysis.source.files_analyzed, 1);
        assert!(analysis.source.has_main);
        assert_eq!(analysis.source.imports, vec!["stdio.h"]);
        assert_eq!(analysis.target.files_analyzed, 1);
        assert!(analysis
            .recommendations
            .iter()
            .any(|r| r.starts_with("No test files found")));
    }

    #[tokio::test]
    async fn test_convertProject_withBinaryFile_shouldRecordErrorAndContinue() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src");
        let out = dir.path().join("out");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("a.py"), b"x = 1\0\0").unwrap();
        fs::write(src.join("b.py"), "y = 2\n").unwrap();

        let report = ProjectConverter::rules_only()
            .convert_project(&src, &out, ConversionType::PythonToJavascript, false)
            .await
            .unwrap();

        assert_eq!(report.files_converted.len(), 2);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].file, "a.py");
        assert_eq!(report.success_targets(), vec!["b.js"]);
        assert!(!out.join("a.js").exists());
    }

    #[tokio::test]
    async fn test_convertProject_withHeaderAndSource_shouldWarnOnCollision() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src");
        FileManager::write_to_file(src.join("main.c"), "int x = 1;\n").unwrap();
        FileManager::write_to_file(src.join("main.h"), "int y;\n").unwrap();

        let report = ProjectConverter::rules_only()
            .convert_project(&src, &dir.path().join("out"), ConversionType::CToPython, false)
            .await
            .unwrap();

        assert_eq!(report.success_count(), 2);
        let second = &report.files_converted[1];
        assert_eq!(second.source, "main.h");
        assert!(second.warnings.iter().any(|w| w.contains("overwrites the output of main.c")));
    }

    #[tokio::test]
    async fn test_convertProject_shouldSkipHiddenAndMetadata() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src");
        FileManager::write_to_file(src.join("app.java"), "class App {}\n").unwrap();
        FileManager::write_to_file(src.join("__MACOSX").join("._app.java"), "junk").unwrap();
        FileManager::write_to_file(src.join(".git").join("Hook.java"), "class Hook {}\n").unwrap();

        let report = ProjectConverter::rules_only()
            .convert_project(&src, &dir.path().join("out"), ConversionType::JavaToPython, false)
            .await
            .unwrap();

        assert_eq!(report.files_converted.len(), 1);
        assert!(!src.join("__MACOSX").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_convertProject_withUndeletableMetadata_shouldWarnAndContinue() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let src = dir.path().join("src");
        let locked = src.join("locked");
        FileManager::write_to_file(src.join("main.c"), "int main() { return 0; }\n").unwrap();
        FileManager::write_to_file(locked.join("._main.c"), "junk").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o555)).unwrap();

        // Permission bits do not bind a privileged user
        if fs::write(locked.join("write_check"), "").is_ok() {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let report = ProjectConverter::rules_only()
            .convert_project(&src, &dir.path().join("out"), ConversionType::CToPython, false)
            .await;
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        let report = report.unwrap();
        assert_eq!(report.success_count(), 1);
        assert!(report.warnings.iter().any(|w| w.contains("Archiver metadata could not be removed")));
    }

    #[tokio::test]
    async fn test_convertProject_withAiRequestedButMissing_shouldWarn() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src");
        FileManager::write_to_file(src.join("x.py"), "print(1)\n").unwrap();

        let report = ProjectConverter::rules_only()
            .convert_project(&src, &dir.path().join("out"), ConversionType::PythonToJava, true)
            .await
            .unwrap();

        assert!(!report.ai_used);
        assert!(report.warnings.iter().any(|w| w.contains("no model is configured")));
    }

    #[tokio::test]
    async fn test_convertProject_withMissingSource_shouldFail() {
        let dir = tempdir().unwrap();
        let result = ProjectConverter::rules_only()
            .convert_project(&dir.path().join("nope"), &dir.path().join("out"), ConversionType::CToPython, false)
            .await;
        assert!(result.is_err());
    }
}
