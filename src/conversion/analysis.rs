/*!
 * Project analysis run before and after a conversion.
 *
 * Both trees are measured the same way: per-file line counts, a keyword based
 * complexity score, extracted functions, classes and imports, and the deepest
 * block nesting. A regex scan looks for common vulnerability patterns and turns
 * what it finds into a risk score. Comparing the source tree with the
 * converted tree gives the recommendations and security notes shown next to
 * the per-file results.
 */

use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::path::Path;

use super::{ConversionType, Language};
use crate::file_utils::FileManager;

/// Complexity above which a project is flagged as hard to convert
pub const HIGH_COMPLEXITY_THRESHOLD: u64 = 100;
/// Risk scores never exceed this value
pub const MAX_RISK_SCORE: u32 = 100;

/// Severity of a security finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    // @returns: Contribution of one finding to a risk score
    pub fn weight(&self) -> u32 {
        match self {
            Self::Low => 1,
            Self::Medium => 3,
            Self::High => 7,
            Self::Critical => 10,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        };
        write!(f, "{}", name)
    }
}

/// Kind of vulnerability a pattern looks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VulnerabilityKind {
    SqlInjection,
    Xss,
    PathTraversal,
    CommandInjection,
    WeakCrypto,
}

impl VulnerabilityKind {
    pub fn severity(&self) -> Severity {
        match self {
            Self::SqlInjection | Self::CommandInjection => Severity::Critical,
            Self::Xss | Self::PathTraversal => Severity::High,
            Self::WeakCrypto => Severity::Medium,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::SqlInjection => "SQL injection vulnerability detected",
            Self::Xss => "Cross-site scripting vulnerability detected",
            Self::PathTraversal => "Path traversal vulnerability detected",
            Self::CommandInjection => "Command injection vulnerability detected",
            Self::WeakCrypto => "Weak cryptographic algorithm detected",
        }
    }

    pub fn mitigation(&self) -> &'static str {
        match self {
            Self::SqlInjection => "Use parameterized queries or ORM",
            Self::Xss => "Sanitize user input and use proper output encoding",
            Self::PathTraversal => "Validate and sanitize file paths",
            Self::CommandInjection => "Avoid executing user input as commands",
            Self::WeakCrypto => "Use strong cryptographic algorithms (SHA-256, bcrypt)",
        }
    }
}

/// One match of a vulnerability pattern
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityFinding {
    /// Path relative to the scanned root, `/` separated
    pub file: String,
    pub kind: VulnerabilityKind,
    pub severity: Severity,
    /// 1-based
    pub line: usize,
    /// 1-based, in characters
    pub column: usize,
    /// Matched text
    pub code: String,
    pub description: String,
    pub mitigation: String,
}

/// Vulnerability scan of one tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityScan {
    pub files_scanned: usize,
    pub findings: Vec<SecurityFinding>,
    /// Mean of the per-file scores, 0 to 100
    pub risk_score: u32,
}

/// Size and shape of one tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectMetrics {
    pub files_analyzed: usize,
    pub total_lines: usize,
    pub total_complexity: u64,
    pub functions: usize,
    pub classes: usize,
    /// Distinct imported modules, sorted
    pub imports: Vec<String>,
    pub max_nesting_depth: usize,
    pub has_main: bool,
    pub has_tests: bool,
    pub has_libraries: bool,
    pub uses_lambdas: bool,
    pub uses_async: bool,
}

/// Analysis attached to a conversion report
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectAnalysis {
    pub source: ProjectMetrics,
    pub target: ProjectMetrics,
    pub source_security: SecurityScan,
    pub target_security: SecurityScan,
    pub recommendations: Vec<String>,
    /// Changes in vulnerability count and risk between the two trees
    #[serde(default)]
    pub security_improvements: Vec<String>,
}

/// Measurements of a single file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileMetrics {
    pub lines: usize,
    pub complexity: u64,
    pub functions: Vec<String>,
    pub classes: Vec<String>,
    pub imports: Vec<String>,
    pub nesting_depth: usize,
    pub has_main: bool,
    pub uses_lambdas: bool,
    pub uses_async: bool,
}

/// Extraction patterns of one language
struct LanguagePatterns {
    functions: Regex,
    classes: Regex,
    imports: Regex,
    main: Option<Regex>,
    lambda: Option<Regex>,
    asynchronous: Regex,
}

static PYTHON: Lazy<LanguagePatterns> = Lazy::new(|| LanguagePatterns {
    functions: Regex::new(r"(?m)^\s*(?:async\s+)?def\s+(\w+)\s*\(").unwrap(),
    classes: Regex::new(r"(?m)^\s*class\s+(\w+)").unwrap(),
    imports: Regex::new(r"(?m)^\s*(?:from\s+([\w.]+)\s+import\b|import\s+([\w.]+))").unwrap(),
    main: Some(Regex::new(r#"__name__\s*==\s*['"]__main__['"]"#).unwrap()),
    lambda: Some(Regex::new(r"\blambda\b[^:\n]*:").unwrap()),
    asynchronous: Regex::new(r"\basync\s+def\b|\bawait\b").unwrap(),
});

static JAVASCRIPT: Lazy<LanguagePatterns> = Lazy::new(|| LanguagePatterns {
    functions: Regex::new(
        r"\bfunction\s*\*?\s*(\w+)\s*\(|\b(?:const|let|var)\s+(\w+)\s*=\s*(?:async\s*)?(?:function\b|\([^)]*\)\s*=>|\w+\s*=>)",
    )
    .unwrap(),
    classes: Regex::new(r"\bclass\s+(\w+)").unwrap(),
    imports: Regex::new(r#"(?m)^\s*import\s+(?:[^'";]*?\s+from\s+)?['"]([^'"]+)['"]|\brequire\s*\(\s*['"]([^'"]+)['"]\s*\)"#)
        .unwrap(),
    main: Some(Regex::new(r"\brequire\.main\s*===?\s*module\b").unwrap()),
    lambda: Some(Regex::new(r"=>").unwrap()),
    asynchronous: Regex::new(r"\basync\b|\bawait\b|\.then\s*\(").unwrap(),
});

static JAVA: Lazy<LanguagePatterns> = Lazy::new(|| LanguagePatterns {
    functions: Regex::new(
        r"(?m)^\s*(?:(?:public|private|protected|static|final|abstract|synchronized)\s+)*[\w<>\[\],.?]+\s+(\w+)\s*\([^)]*\)\s*(?:throws\s+[\w.,\s]+)?\{",
    )
    .unwrap(),
    classes: Regex::new(r"\b(?:class|interface|enum)\s+(\w+)").unwrap(),
    imports: Regex::new(r"(?m)^\s*import\s+(?:static\s+)?([\w.]+(?:\.\*)?)\s*;").unwrap(),
    main: Some(Regex::new(r"\bpublic\s+static\s+void\s+main\s*\(").unwrap()),
    lambda: Some(Regex::new(r"\)\s*->|\w\s*->").unwrap()),
    asynchronous: Regex::new(r"\bCompletableFuture\b|\bExecutorService\b").unwrap(),
});

static C: Lazy<LanguagePatterns> = Lazy::new(|| LanguagePatterns {
    functions: Regex::new(r"(?m)^[\w \t*]*?\b(\w+)\s*\([^;{)]*\)\s*\{").unwrap(),
    classes: Regex::new(r"\bstruct\s+(\w+)\s*\{").unwrap(),
    imports: Regex::new(r#"(?m)^\s*#\s*include\s*[<"]([^>"]+)[>"]"#).unwrap(),
    main: Some(Regex::new(r"\bint\s+main\s*\(").unwrap()),
    lambda: None,
    asynchronous: Regex::new(r"\bpthread_create\s*\(").unwrap(),
});

/// Words a function pattern can catch that are control flow, not names
const CONTROL_WORDS: &[&str] = &["if", "for", "while", "switch", "catch", "return", "sizeof", "new", "else"];

/// Keyword weights for the complexity score
static COMPLEXITY_KEYWORDS: Lazy<Vec<(Regex, u64)>> = Lazy::new(|| {
    [
        ("if", 1),
        ("for", 2),
        ("while", 2),
        ("try", 1),
        ("except", 1),
        ("catch", 1),
        ("switch", 2),
        ("case", 1),
    ]
    .iter()
    .map(|(word, weight)| (Regex::new(&format!(r"\b{}\b", word)).unwrap(), *weight))
    .collect()
});

/// Each function definition adds this much complexity
const FUNCTION_WEIGHT: u64 = 3;

static VULNERABILITY_PATTERNS: Lazy<Vec<(VulnerabilityKind, Regex)>> = Lazy::new(|| {
    use VulnerabilityKind::*;
    [
        (SqlInjection, r#"(?i)\b(?:cursor\.)?execute\s*\(\s*['"][^'"]*['"]\s*\+"#),
        (SqlInjection, r#"(?i)\bquery\s*\(\s*['"][^'"]*['"]\s*\+"#),
        (Xss, r"(?i)\binnerHTML\s*="),
        (Xss, r"(?i)\bdocument\.write\s*\("),
        (Xss, r"(?i)\beval\s*\("),
        (Xss, r#"(?i)\bsetTimeout\s*\(\s*['"][^'"]*['"]\s*\+"#),
        (PathTraversal, r#"(?i)\bopen\s*\(\s*['"][^'"]*\.\./"#),
        (PathTraversal, r#"(?i)\breadFile(?:Sync)?\s*\(\s*['"][^'"]*\.\./"#),
        (CommandInjection, r"(?i)\bos\.system\s*\("),
        (CommandInjection, r"(?i)\bsubprocess\.call\s*\("),
        (CommandInjection, r"(?i)\bchild_process\.exec\s*\("),
        (CommandInjection, r"(?i)\bexec\s*\("),
        (CommandInjection, r"(?i)\bRuntime\.getRuntime\(\)\.exec\s*\("),
        (WeakCrypto, r"(?i)\bmd5\s*\("),
        (WeakCrypto, r"(?i)\bsha1\s*\("),
        (WeakCrypto, r"(?i)\bbase64\.encode\s*\("),
        (WeakCrypto, r#"(?i)\bcreateHash\s*\(\s*['"]md5['"]"#),
        (WeakCrypto, r#"(?i)MessageDigest\.getInstance\s*\(\s*"(?:MD5|SHA-?1)""#),
    ]
    .iter()
    .map(|(kind, pattern)| (*kind, Regex::new(pattern).unwrap()))
    .collect()
});

fn patterns_for(language: Language) -> &'static LanguagePatterns {
    match language {
        Language::Python => &PYTHON,
        Language::JavaScript | Language::TypeScript => &JAVASCRIPT,
        Language::Java => &JAVA,
        Language::C => &C,
    }
}

/// First non-empty capture group of every match
fn captured_names(regex: &Regex, code: &str) -> Vec<String> {
    regex
        .captures_iter(code)
        .filter_map(|caps| caps.iter().skip(1).flatten().next().map(|m| m.as_str().to_string()))
        .collect()
}

/// Deepest block nesting: braces for C-like languages, indentation for Python
fn nesting_depth(code: &str, language: Language) -> usize {
    if language == Language::Python {
        return code
            .lines()
            .filter(|l| !l.trim().is_empty() && !l.trim_start().starts_with('#'))
            .map(|l| {
                let tabs = l.chars().take_while(|c| *c == '\t').count();
                if tabs > 0 {
                    tabs
                } else {
                    (l.len() - l.trim_start_matches(' ').len()) / 4
                }
            })
            .max()
            .unwrap_or(0);
    }

    let mut depth: usize = 0;
    let mut deepest = 0;
    for c in code.chars() {
        match c {
            '{' => {
                depth += 1;
                deepest = deepest.max(depth);
            }
            '}' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    deepest
}

/// Measure one file
pub fn analyze_code(code: &str, language: Language) -> FileMetrics {
    let patterns = patterns_for(language);

    let functions: Vec<String> = captured_names(&patterns.functions, code)
        .into_iter()
        .filter(|name| !CONTROL_WORDS.contains(&name.as_str()))
        .collect();
    let classes = captured_names(&patterns.classes, code);
    let imports = captured_names(&patterns.imports, code);

    let keyword_score: u64 = COMPLEXITY_KEYWORDS
        .iter()
        .map(|(regex, weight)| regex.find_iter(code).count() as u64 * weight)
        .sum();

    FileMetrics {
        lines: code.lines().count(),
        complexity: keyword_score + functions.len() as u64 * FUNCTION_WEIGHT,
        has_main: patterns.main.as_ref().is_some_and(|re| re.is_match(code)),
        uses_lambdas: patterns.lambda.as_ref().is_some_and(|re| re.is_match(code)),
        uses_async: patterns.asynchronous.is_match(code),
        nesting_depth: nesting_depth(code, language),
        functions,
        classes,
        imports,
    }
}

/// Find vulnerability patterns in one file
///
/// A line reports each kind at most once, so overlapping patterns such as
/// `child_process.exec(` and `exec(` count as one finding.
pub fn scan_code(code: &str, file: &str) -> Vec<SecurityFinding> {
    let mut seen: HashSet<(VulnerabilityKind, usize)> = HashSet::new();
    let mut findings = Vec::new();

    for (kind, regex) in VULNERABILITY_PATTERNS.iter() {
        for found in regex.find_iter(code) {
            let before = &code[..found.start()];
            let line = before.matches('\n').count() + 1;
            let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
            let column = code[line_start..found.start()].chars().count() + 1;

            if !seen.insert((*kind, line)) {
                continue;
            }

            findings.push(SecurityFinding {
                file: file.to_string(),
                kind: *kind,
                severity: kind.severity(),
                line,
                column,
                code: found.as_str().to_string(),
                description: kind.description().to_string(),
                mitigation: kind.mitigation().to_string(),
            });
        }
    }

    findings.sort_by(|a, b| (a.line, a.column).cmp(&(b.line, b.column)));
    findings
}

// @returns: Weighted severity sum, capped
pub fn risk_score(findings: &[SecurityFinding]) -> u32 {
    findings
        .iter()
        .map(|f| f.severity.weight())
        .sum::<u32>()
        .min(MAX_RISK_SCORE)
}

fn looks_like_test(relative: &str) -> bool {
    let lower = relative.to_lowercase();
    ["test", "spec"].iter().any(|marker| lower.contains(marker))
}

/// Metrics and security scan of every file under `root` with one of `extensions`
///
/// Unreadable files are logged and left out; a missing root yields empty results.
pub fn analyze_tree(root: &Path, extensions: &[&str], language: Language) -> (ProjectMetrics, SecurityScan) {
    let mut metrics = ProjectMetrics::default();
    let mut scan = SecurityScan::default();

    if !FileManager::dir_exists(root) {
        return (metrics, scan);
    }

    let files = match FileManager::find_source_files(root, extensions) {
        Ok(files) => files,
        Err(e) => {
            warn!("Could not list {:?} for analysis: {:#}", root, e);
            return (metrics, scan);
        }
    };

    let mut imports = BTreeSet::new();
    let mut score_sum: u64 = 0;

    for path in files {
        let relative = FileManager::relative_slash_path(&path, root)
            .unwrap_or_else(|_| path.to_string_lossy().to_string());
        let code = match FileManager::read_source(&path) {
            Ok(code) => code,
            Err(e) => {
                warn!("Skipping {} in analysis: {:#}", relative, e);
                continue;
            }
        };

        let file = analyze_code(&code, language);
        metrics.files_analyzed += 1;
        metrics.total_lines += file.lines;
        metrics.total_complexity += file.complexity;
        metrics.functions += file.functions.len();
        metrics.classes += file.classes.len();
        metrics.max_nesting_depth = metrics.max_nesting_depth.max(file.nesting_depth);
        metrics.has_main |= file.has_main;
        metrics.has_libraries |= !file.functions.is_empty() || !file.classes.is_empty();
        metrics.has_tests |= looks_like_test(&relative);
        metrics.uses_lambdas |= file.uses_lambdas;
        metrics.uses_async |= file.uses_async;
        imports.extend(file.imports);

        let findings = scan_code(&code, &relative);
        score_sum += u64::from(risk_score(&findings));
        scan.files_scanned += 1;
        scan.findings.extend(findings);
    }

    metrics.imports = imports.into_iter().collect();
    if scan.files_scanned > 0 {
        let mean = score_sum / scan.files_scanned as u64;
        scan.risk_score = mean.min(u64::from(MAX_RISK_SCORE)) as u32;
    }

    debug!(
        "Analyzed {} file(s) under {:?}: complexity {}, {} finding(s)",
        metrics.files_analyzed,
        root,
        metrics.total_complexity,
        scan.findings.len()
    );

    (metrics, scan)
}

/// Advice derived from the source project
pub fn recommendations(source: &ProjectMetrics, source_security: &SecurityScan) -> Vec<String> {
    let mut advice = Vec::new();

    if source.total_complexity > HIGH_COMPLEXITY_THRESHOLD {
        advice.push("High complexity detected - consider breaking down into smaller modules".to_string());
    }
    if !source.has_tests {
        advice.push("No test files found - recommend adding unit tests after conversion".to_string());
    }
    if source.has_libraries {
        advice.push("Library code detected - ensure proper dependency mapping".to_string());
    }
    if source.uses_lambdas {
        advice.push("Lambda functions detected - may need special handling in target language".to_string());
    }
    if source.uses_async {
        advice.push("Async code detected - ensure proper async/await conversion".to_string());
    }
    if !source_security.findings.is_empty() {
        advice.push(format!(
            "{} potential vulnerabilit{} in the source - check the converted code fixes rather than copies {}",
            source_security.findings.len(),
            if source_security.findings.len() == 1 { "y" } else { "ies" },
            if source_security.findings.len() == 1 { "it" } else { "them" }
        ));
    }

    advice
}

/// How the converted tree compares with the source on security
pub fn security_improvements(source: &SecurityScan, target: &SecurityScan) -> Vec<String> {
    let mut notes = Vec::new();

    if target.findings.len() < source.findings.len() {
        notes.push(format!(
            "Reduced vulnerabilities from {} to {}",
            source.findings.len(),
            target.findings.len()
        ));
    }
    if target.risk_score < source.risk_score {
        notes.push(format!(
            "Reduced risk score from {} to {}",
            source.risk_score, target.risk_score
        ));
    }

    notes
}

/// Analyze both sides of a finished conversion
pub fn analyze_conversion(conversion_type: ConversionType, source_dir: &Path, target_dir: &Path) -> ProjectAnalysis {
    let (source, source_security) = analyze_tree(
        source_dir,
        conversion_type.source_extensions(),
        conversion_type.source_language(),
    );
    let (target, target_security) = analyze_tree(
        target_dir,
        &[conversion_type.target_extension()],
        conversion_type.target_language(),
    );

    ProjectAnalysis {
        recommendations: recommendations(&source, &source_security),
        security_improvements: security_improvements(&source_security, &target_security),
        source,
        target,
        source_security,
        target_security,
    }
}
