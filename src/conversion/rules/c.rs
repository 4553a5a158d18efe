/*!
 * C to Python rules.
 */

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::{RuleSet, rule};
use crate::conversion::Language;

static PREPROCESSOR: Lazy<RuleSet> = Lazy::new(|| {
    vec![
        rule(r#"(?m)^[ \t]*#include\s*<[^>\n]+>[ \t]*\n?"#, ""),
        rule(r#"(?m)^[ \t]*#include\s*"[^"\n]+"[ \t]*\n?"#, ""),
        rule(r"(?m)^[ \t]*#ifndef\s+\w+[ \t]*\n?", ""),
        rule(r"(?m)^[ \t]*#define\s+\w+[ \t]*\n", ""),
        rule(r"(?m)^([ \t]*)#define\s+(\w+)[ \t]+(.+)$", "${1}${2} = ${3}"),
        rule(r"(?m)^[ \t]*#endif.*\n?", ""),
    ]
});

static MAIN_FUNCTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"int\s+main\s*\([^)]*\)\s*\{").unwrap());

static FUNCTION_DEFINITION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?m)^([ \t]*)(?:static\s+)?(?:unsigned\s+|signed\s+|const\s+)*(?:int|void|float|double|char|long|short|bool)[\s*]+(\w+)\s*\(([^)]*)\)\s*\{",
    )
    .unwrap()
});

static DECLARATIONS: Lazy<RuleSet> = Lazy::new(|| {
    vec![
        rule(r"\bint\s+(\w+)\s*;", "${1} = 0"),
        rule(r"\bfloat\s+(\w+)\s*;", "${1} = 0.0"),
        rule(r#"\bchar\s+(\w+)\s*;"#, r#"${1} = """#),
        rule(r"\bdouble\s+(\w+)\s*;", "${1} = 0.0"),
        rule(r"\b(?:int|float|double|long|short|char)\s+(\w+)\s*=\s*([^;\n]+);", "${1} = ${2}"),
    ]
});

static IO_CALLS: Lazy<RuleSet> = Lazy::new(|| {
    vec![
        rule(r#"printf\s*\(\s*"([^"]*)"\s*\)\s*;"#, r#"print("${1}")"#),
        rule(
            r#"printf\s*\(\s*"([^"]*)"\s*,\s*([^;\n]+?)\s*\)\s*;"#,
            r#"print("${1}" % (${2}))"#,
        ),
        rule(
            r#"scanf\s*\(\s*"([^"]*)"\s*,\s*&(\w+)\s*\)\s*;"#,
            r#"${2} = input("${1}: ")"#,
        ),
    ]
});

static COUNTED_FOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"for\s*\(\s*(?:int\s+)?(?P<var>\w+)\s*=\s*(?P<start>[^;]+?)\s*;\s*(?P<cond>\w+)\s*<\s*(?P<end>[^;]+?)\s*;\s*(?P<step>\w+)\s*\+\+\s*\)\s*\{?",
    )
    .unwrap()
});

static CONTROL_FLOW: Lazy<RuleSet> = Lazy::new(|| {
    vec![
        rule(r"while\s*\(([^)]+)\)\s*\{", "while ${1}:"),
        rule(r"\}?[ \t]*else\s+if\s*\(([^)]+)\)\s*\{", "elif ${1}:"),
        rule(r"\bif\s*\(([^)]+)\)\s*\{", "if ${1}:"),
        rule(r"\}?[ \t]*else\s*\{", "else:"),
        rule(r"switch\s*\(([^)]+)\)\s*\{", "# switch ${1}:"),
        rule(r"\bcase\s+([^:\n]+):", "# case ${1}:"),
        rule(r"\bbreak\s*;", "# break"),
        rule(r"\bdefault\s*:", "# default:"),
    ]
});

static LINE_COMMENTS: Lazy<RuleSet> = Lazy::new(|| {
    vec![
        rule(r"(?m)^([ \t]*)//[ \t]?", "${1}# "),
        rule(r"(?m);[ \t]*//[ \t]?(.*)$", "  # ${1}"),
    ]
});

pub(super) fn to_python(source: &str, file_name: &str) -> String {
    let code = super::block_comments_to_hash(source);
    let code = super::apply_rules(&code, &LINE_COMMENTS);
    let code = super::apply_rules(&code, &PREPROCESSOR);
    let code = MAIN_FUNCTION.replace_all(&code, r#"if __name__ == "__main__":"#);
    let code = FUNCTION_DEFINITION.replace_all(&code, |caps: &Captures| {
        format!(
            "{}def {}({}):",
            &caps[1],
            &caps[2],
            super::strip_param_types(&caps[3])
        )
    });
    let code = super::rewrite_counted_loops(&code, &COUNTED_FOR, |var, start, end| {
        format!("for {} in range({}, {}):", var, start, end)
    });
    let code = super::apply_rules(&code, &DECLARATIONS);
    let code = super::apply_rules(&code, &IO_CALLS);
    let code = super::apply_rules(&code, &CONTROL_FLOW);
    let code = super::logical_to_python(&code);
    let code = super::literals_to_python(&code);
    let code = super::strip_block_punctuation(&code);

    format!(
        "{}{}",
        super::header(Language::C, Language::Python, file_name),
        code.trim_start_matches('\n')
    )
}
