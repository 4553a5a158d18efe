/*!
 * Post-conversion sanity checks.
 *
 * Checks never reject a file. They produce warnings that travel with the
 * per-file record so the user knows where to look first:
 * - empty output
 * - unbalanced `()`, `[]` and `{}` outside of string literals and comments
 * - source-language idioms left behind by the rules (e.g. `printf(` in Python)
 */

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use super::{ConversionType, Language};

/// Result of checking one converted file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputCheck {
    /// Human readable findings
    pub warnings: Vec<String>,
    /// Whether the output contains anything besides whitespace
    pub output_non_empty: bool,
    /// Whether brackets, parentheses and braces pair up
    pub delimiters_balanced: bool,
}

impl OutputCheck {
    pub fn passed(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Leftover idioms per target language
static PYTHON_LEFTOVERS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    vec![
        (Regex::new(r"\bprintf\s*\(").unwrap(), "printf("),
        (Regex::new(r"\bconsole\.log\s*\(").unwrap(), "console.log("),
        (Regex::new(r"\bSystem\.out\.print").unwrap(), "System.out.print"),
        (Regex::new(r"(?m)^\s*function\s+\w+\s*\(").unwrap(), "function"),
    ]
});

static JAVASCRIPT_LEFTOVERS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    vec![
        (Regex::new(r"\bSystem\.out\.print").unwrap(), "System.out.print"),
        (Regex::new(r"(?m)^\s*def\s+\w+\s*\(").unwrap(), "def"),
        (Regex::new(r"(?m)^\s*print\s*\(").unwrap(), "print("),
    ]
});

static JAVA_LEFTOVERS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    vec![
        (Regex::new(r"\bconsole\.log\s*\(").unwrap(), "console.log("),
        (Regex::new(r"(?m)^\s*def\s+\w+\s*\(").unwrap(), "def"),
        (Regex::new(r"(?m)^\s*print\s*\(").unwrap(), "print("),
        (Regex::new(r"(?m)^\s*function\s+\w+\s*\(").unwrap(), "function"),
    ]
});

/// Check converted code for the target language of a conversion
pub fn check_output(conversion_type: ConversionType, code: &str) -> OutputCheck {
    let target = conversion_type.target_language();
    let mut warnings = Vec::new();

    let output_non_empty = !code.trim().is_empty();
    if !output_non_empty {
        warnings.push("Converted output is empty".to_string());
    }

    let delimiters_balanced = delimiters_balanced(code, target.line_comment());
    if !delimiters_balanced {
        warnings.push("Unbalanced brackets, parentheses or braces in converted output".to_string());
    }

    let leftovers = match target {
        Language::Python => &*PYTHON_LEFTOVERS,
        Language::JavaScript => &*JAVASCRIPT_LEFTOVERS,
        Language::Java => &*JAVA_LEFTOVERS,
        Language::C | Language::TypeScript => return OutputCheck {
            warnings,
            output_non_empty,
            delimiters_balanced,
        },
    };

    let code_only = strip_comment_lines(code, target.line_comment());
    for (regex, idiom) in leftovers {
        if regex.is_match(&code_only) {
            warnings.push(format!(
                "Unconverted {} construct left in output: {}",
                conversion_type.source_language().display_name(),
                idiom
            ));
        }
    }

    if !warnings.is_empty() {
        debug!("Output check for {}: {} warning(s)", conversion_type, warnings.len());
    }

    OutputCheck {
        warnings,
        output_non_empty,
        delimiters_balanced,
    }
}

fn strip_comment_lines(code: &str, comment: &str) -> String {
    code.lines()
        .filter(|line| !line.trim_start().starts_with(comment))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Whether every opening delimiter is closed by the matching one, ignoring
/// string literals and line comments
pub fn delimiters_balanced(code: &str, line_comment: &str) -> bool {
    let mut stack: Vec<char> = Vec::new();
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let comment_start = line_comment.chars().next().unwrap_or('#');
    let comment_len = line_comment.chars().count();
    let chars: Vec<char> = code.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];

        if let Some(open) = quote {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == open || (ch == '\n' && open != '`') {
                quote = None;
            }
            i += 1;
            continue;
        }

        if ch == comment_start
            && chars[i..].iter().take(comment_len).copied().eq(line_comment.chars())
        {
            while i < chars.len() && chars[i] != '\n' {
                i += 1;
            }
            continue;
        }

        match ch {
            '"' | '\'' | '`' => quote = Some(ch),
            '(' | '[' | '{' => stack.push(ch),
            ')' | ']' | '}' => {
                let expected = match ch {
                    ')' => '(',
                    ']' => '[',
                    _ => '{',
                };
                if stack.pop() != Some(expected) {
                    return false;
                }
            }
            _ => {}
        }
        i += 1;
    }

    stack.is_empty()
}
