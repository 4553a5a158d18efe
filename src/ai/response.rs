/*!
 * Cleanup of raw model answers.
 */

use once_cell::sync::Lazy;
use regex::Regex;

/// First fenced block; an unterminated fence runs to the end of the answer
static FENCED_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```[A-Za-z0-9_+#.-]*[ \t]*\r?\n(.*?)(?:```|\z)").unwrap()
});

/// Echo of the prompt's closing label, e.g. `Python Code:`
static LEADING_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:Python|JavaScript|TypeScript|Java|C) Code:[ \t]*\r?\n").unwrap()
});

/// Extract the code from a model answer
///
/// Returns the content of the first markdown code fence when there is one,
/// otherwise the answer without an echoed `<Language> Code:` label. The result
/// is empty or ends with exactly one newline.
pub fn extract_code(raw: &str) -> String {
    let code = match FENCED_BLOCK.captures(raw) {
        Some(caps) => caps.get(1).map_or("", |m| m.as_str()).to_string(),
        None => LEADING_LABEL.replace(raw, "").into_owned(),
    };

    let trimmed = code.trim_end();
    let trimmed = trimmed.trim_start_matches(['\n', '\r']);
    if trimmed.trim().is_empty() {
        String::new()
    } else {
        format!("{}\n", trimmed)
    }
}
