/*!
 * Python to JavaScript and Python to Java rules.
 *
 * Python blocks are delimited by indentation, so both targets get their
 * closing braces from `close_indented_blocks` after the block headers have
 * been rewritten to end in `{`.
 */

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::HashSet;

use super::{RuleSet, rule};
use crate::conversion::Language;
use crate::errors::ConversionError;

static RANGE_FOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"for\s+(\w+)\s+in\s+range\s*\(((?:[^()]|\([^()]*\))*)\)\s*:").unwrap()
});

static ASSIGNMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^([ \t]*)(\w+)\s*=([^=#\n][^#\n]*)$").unwrap());

static SHEBANG_AND_ENCODING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^#!.*\n|^#.*coding[:=].*\n").unwrap());

static COMMENTS_TO_SLASHES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^([ \t]*)#[ \t]?").unwrap());

static JS_BLOCKS: Lazy<RuleSet> = Lazy::new(|| {
    vec![
        rule(r"\bprint\s*\(", "console.log("),
        rule(r"(?m)^([ \t]*)class\s+(\w+)\s*\(\s*(\w+)\s*\)\s*:", "${1}class ${2} extends ${3} {"),
        rule(r"(?m)^([ \t]*)class\s+(\w+)\s*(?:\(\s*\))?\s*:", "${1}class ${2} {"),
        rule(r"\belif\s+([^:\n]+):", "} else if (${1}) {"),
        rule(r"\bif\s+([^:\n]+):", "if (${1}) {"),
        rule(r"\belse\s*:", "} else {"),
        rule(r"for\s+(\w+)\s+in\s+([^:\n]+):", "for (const ${1} of ${2}) {"),
        rule(r"\bwhile\s+([^:\n]+):", "while (${1}) {"),
        rule(r"\btry\s*:", "try {"),
        rule(r"\bexcept\s+[\w.]+\s+as\s+(\w+)\s*:", "} catch (${1}) {"),
        rule(r"\bexcept\b[^:\n]*:", "} catch (error) {"),
        rule(r"\bfinally\s*:", "} finally {"),
        rule(r"(?m)^([ \t]*)pass[ \t]*$", "${1}// pass"),
        rule(r"\bself\.", "this."),
        rule(r"\s+and\s+", " && "),
        rule(r"\s+or\s+", " || "),
        rule(r"\s+is\s+not\s+", " !== "),
        rule(r"\s+is\s+", " === "),
        rule(r"\bnot\s+", "!"),
        rule(r"\blen\(([^()]+)\)", "${1}.length"),
    ]
});

static JAVA_BLOCKS: Lazy<RuleSet> = Lazy::new(|| {
    vec![
        rule(r"\bprint\s*\(", "System.out.println("),
        rule(r"\belif\s+([^:\n]+):", "} else if (${1}) {"),
        rule(r"\bif\s+([^:\n]+):", "if (${1}) {"),
        rule(r"\belse\s*:", "} else {"),
        rule(r"for\s+(\w+)\s+in\s+([^:\n]+):", "for (Object ${1} : ${2}) {"),
        rule(r"\bwhile\s+([^:\n]+):", "while (${1}) {"),
        rule(r"\btry\s*:", "try {"),
        rule(r"\bexcept\b[^:\n]*:", "} catch (Exception e) {"),
        rule(r"\bfinally\s*:", "} finally {"),
        rule(r"\bself\.", "this."),
        rule(r"\s+and\s+", " && "),
        rule(r"\s+or\s+", " || "),
        rule(r"\s+is\s+not\s+", " != "),
        rule(r"\s+is\s+", " == "),
        rule(r"\bnot\s+", "!"),
        rule(r"((?:=|\(|,|\breturn)\s*)\[([^\[\]\n]*)\]", "${1}new Object[]{${2}}"),
    ]
});

static MAIN_GUARD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?m)^if\s+__name__\s*==\s*["']__main__["']\s*:"#).unwrap());

static DEF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^([ \t]*)(async\s+)?def\s+(\w+)\s*\(([^)]*)\)\s*(?:->\s*[^:]+)?:").unwrap()
});

static JAVA_CLASS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^([ \t]*)class\s+(\w+)\s*(?:\(\s*(\w*)\s*\))?\s*:").unwrap()
});

/// Python `range` arguments as JavaScript or Java loop bounds
fn range_bounds(args: &str) -> Option<(String, String, Option<String>)> {
    let parts = super::split_top_level(args);
    match parts.as_slice() {
        [end] => Some(("0".to_string(), end.clone(), None)),
        [start, end] => Some((start.clone(), end.clone(), None)),
        [start, end, step] => Some((start.clone(), end.clone(), Some(step.clone()))),
        _ => None,
    }
}

fn has_self(params: &str) -> bool {
    params.split(',').any(|p| p.trim() == "self")
}

/// Python parameters as JavaScript parameters: `self` dropped, `*args` spread
fn jsify_params(params: &str) -> String {
    super::split_top_level(params)
        .iter()
        .filter_map(|p| {
            let p = p.split(':').next()?.trim();
            match p {
                "" | "self" | "cls" => None,
                p if p.starts_with('*') => Some(format!("...{}", p.trim_start_matches('*'))),
                p => Some(p.to_string()),
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn counted_loop(var: &str, args: &str, decl: &str) -> Option<String> {
    let (start, end, step) = range_bounds(args)?;
    let increment = match step {
        Some(step) => format!("{} += {}", var, step),
        None => format!("{}++", var),
    };
    Some(format!(
        "for ({} {} = {}; {} < {}; {}) {{",
        decl, var, start, var, end, increment
    ))
}

/// Strips the docstring blocks and `"""` lines a target language cannot hold
fn drop_docstrings(source: &str) -> String {
    let mut out = Vec::new();
    let mut in_docstring = false;

    for line in source.lines() {
        let trimmed = line.trim();
        let delimiter = if trimmed.starts_with("\"\"\"") {
            Some("\"\"\"")
        } else if trimmed.starts_with("'''") {
            Some("'''")
        } else {
            None
        };

        if in_docstring {
            if trimmed.contains("\"\"\"") || trimmed.contains("'''") {
                in_docstring = false;
            }
            continue;
        }

        if let Some(delimiter) = delimiter {
            if trimmed.matches(delimiter).count() < 2 {
                in_docstring = true;
            }
            continue;
        }

        out.push(line);
    }

    out.join("\n")
}

/// Declares a name the first time it is assigned, plain assignment afterwards
fn declare_assignments(code: &str, keyword: &str, terminator: &str) -> String {
    let mut declared: HashSet<String> = HashSet::new();
    ASSIGNMENT
        .replace_all(code, |caps: &Captures| {
            let indent = &caps[1];
            let name = &caps[2];
            let value = caps[3].trim();
            if declared.insert(name.to_string()) {
                format!("{}{} {} = {}{}", indent, keyword, name, value, terminator)
            } else {
                format!("{}{} = {}{}", indent, name, value, terminator)
            }
        })
        .into_owned()
}

pub(super) fn to_javascript(source: &str, file_name: &str) -> String {
    let code = SHEBANG_AND_ENCODING.replace_all(source, "");
    let code = drop_docstrings(&code);
    let code = COMMENTS_TO_SLASHES.replace_all(&code, "${1}// ");
    let code = DEF.replace_all(&code, |caps: &Captures| {
        let prefix = if caps.get(2).is_some() { "async " } else { "" };
        let params = jsify_params(&caps[4]);
        if has_self(&caps[4]) {
            let name = if &caps[3] == "__init__" { "constructor" } else { &caps[3] };
            format!("{}{}{}({}) {{", &caps[1], prefix, name, params)
        } else {
            format!("{}{}function {}({}) {{", &caps[1], prefix, &caps[3], params)
        }
    });
    let code = RANGE_FOR.replace_all(&code, |caps: &Captures| {
        counted_loop(&caps[1], &caps[2], "let").unwrap_or_else(|| caps[0].to_string())
    });
    let code = super::apply_rules(&code, &JS_BLOCKS);
    let code = declare_assignments(&code, "let", ";");
    let code = super::single_to_double_quotes(&code);
    let code = super::literals_from_python(&code);
    let code = super::close_indented_blocks(&code);

    format!(
        "{}{}",
        super::header(Language::Python, Language::JavaScript, file_name),
        code.trim_start_matches('\n')
    )
}

/// Appends `;` to statement lines that do not open or close a block
fn terminate_statements(code: &str) -> String {
    code.lines()
        .map(|line| {
            let trimmed = line.trim_end();
            let bare = trimmed.trim_start();
            if bare.is_empty()
                || bare.starts_with("//")
                || bare.starts_with('@')
                || trimmed.ends_with('{')
                || trimmed.ends_with('}')
                || trimmed.ends_with(';')
                || trimmed.ends_with(':')
                || trimmed.ends_with(',')
            {
                trimmed.to_string()
            } else {
                format!("{};", trimmed)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub(super) fn to_java(source: &str, file_name: &str) -> Result<String, ConversionError> {
    let class_name = super::java_class_name(file_name)?;

    let code = SHEBANG_AND_ENCODING.replace_all(source, "");
    let code = drop_docstrings(&code);
    let code = COMMENTS_TO_SLASHES.replace_all(&code, "${1}// ");
    let code = MAIN_GUARD.replace_all(&code, "public static void main(String[] args) {");
    let code = JAVA_CLASS.replace_all(&code, |caps: &Captures| match caps.get(3) {
        Some(base) if !base.as_str().is_empty() && base.as_str() != "object" => format!(
            "{}static class {} extends {} {{",
            &caps[1],
            &caps[2],
            base.as_str()
        ),
        _ => format!("{}static class {} {{", &caps[1], &caps[2]),
    });
    let code = DEF.replace_all(&code, |caps: &Captures| {
        let params = super::javaize_params(&caps[4]);
        match &caps[3] {
            "__init__" => format!("{}public {}({}) {{", &caps[1], class_name, params),
            name if has_self(&caps[4]) => {
                format!("{}public Object {}({}) {{", &caps[1], name, params)
            }
            name => format!("{}public static Object {}({}) {{", &caps[1], name, params),
        }
    });
    let code = RANGE_FOR.replace_all(&code, |caps: &Captures| {
        counted_loop(&caps[1], &caps[2], "int").unwrap_or_else(|| caps[0].to_string())
    });
    let code = super::apply_rules(&code, &JAVA_BLOCKS);
    let code = declare_assignments(&code, "Object", "");
    let code = super::single_to_double_quotes(&code);
    let code = super::literals_from_python(&code);
    let code = PASS_LINE.replace_all(&code, "${1}// pass");
    let code = terminate_statements(&code);
    let code = super::close_indented_blocks(&code);

    Ok(format!(
        "{}import java.util.*;\nimport java.io.*;\n\npublic class {} {{\n\n{}\n}}\n",
        super::header(Language::Python, Language::Java, file_name),
        class_name,
        super::indent_lines(code.trim_matches('\n'), 4)
    ))
}

static PASS_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^([ \t]*)pass[ \t]*$").unwrap());
