/*!
 * Rule-based conversion.
 *
 * Each language pair is an ordered table of regex substitutions applied to the
 * whole file, followed by a few line-oriented passes (block punctuation,
 * indentation-driven braces). The output is deterministic: the same source and
 * conversion type always yield the same bytes.
 */

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::path::Path;

use super::{ConversionType, Language};
use crate::errors::ConversionError;

mod c;
mod java;
mod javascript;
mod python;

/// Ordered substitution table
pub(crate) type RuleSet = Vec<(Regex, &'static str)>;

/// Builds one table entry. Patterns are literals, so failure is a programming error.
pub(crate) fn rule(pattern: &str, replacement: &'static str) -> (Regex, &'static str) {
    (Regex::new(pattern).unwrap(), replacement)
}

/// Applies every rule of a table, in order, to the whole text
pub(crate) fn apply_rules(code: &str, rules: &[(Regex, &'static str)]) -> String {
    rules.iter().fold(code.to_string(), |acc, (regex, replacement)| {
        regex.replace_all(&acc, *replacement).into_owned()
    })
}

static TRAILING_SEMICOLON: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m);[ \t]*$").unwrap());
static TRAILING_OPEN_BRACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)[ \t]*\{[ \t]*$").unwrap());
static LONE_CLOSE_BRACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[ \t]*\}[ \t]*;?[ \t]*$").unwrap());

static LITERALS_TO_PYTHON: Lazy<RuleSet> = Lazy::new(|| {
    vec![
        rule(r"\btrue\b", "True"),
        rule(r"\bfalse\b", "False"),
        rule(r"\bnull\b", "None"),
    ]
});

static LITERALS_FROM_PYTHON: Lazy<RuleSet> = Lazy::new(|| {
    vec![
        rule(r"\bTrue\b", "true"),
        rule(r"\bFalse\b", "false"),
        rule(r"\bNone\b", "null"),
    ]
});

static LOGICAL_TO_PYTHON: Lazy<RuleSet> = Lazy::new(|| {
    vec![
        rule(r"\s*&&\s*", " and "),
        rule(r"\s*\|\|\s*", " or "),
        rule(r"(^|[^\w!])!([A-Za-z_(])", "${1}not ${2}"),
    ]
});

static BLOCK_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)/\*+(.*?)\*+/").unwrap());

static DOUBLE_QUOTED: Lazy<Regex> = Lazy::new(|| Regex::new(r#""([^"'\n\\]*)""#).unwrap());
static SINGLE_QUOTED: Lazy<Regex> = Lazy::new(|| Regex::new(r#"'([^'"\n\\]*)'"#).unwrap());

/// Convert a file with the rule table of the given conversion type
pub fn convert(
    conversion_type: ConversionType,
    source: &str,
    file_name: &str,
) -> Result<String, ConversionError> {
    if source.contains('\0') {
        return Err(ConversionError::BinaryContent(file_name.to_string()));
    }

    let converted = match conversion_type {
        ConversionType::CToPython => c::to_python(source, file_name),
        ConversionType::PythonToJavascript => python::to_javascript(source, file_name),
        ConversionType::PythonToJava => python::to_java(source, file_name)?,
        ConversionType::JavaToPython => java::to_python(source, file_name),
        ConversionType::JavaToJavascript => java::to_javascript(source, file_name),
        ConversionType::JavascriptToPython => {
            javascript::to_python(source, file_name, Language::JavaScript)
        }
        ConversionType::TypescriptToPython => javascript::typescript_to_python(source, file_name),
        ConversionType::JavascriptToJava => javascript::to_java(source, file_name)?,
    };

    Ok(converted)
}

/// Two-line banner placed on top of every converted file
pub(crate) fn header(source: Language, target: Language, file_name: &str) -> String {
    let comment = target.line_comment();
    format!(
        "{} Converted from {}: {}\n{} Note: This is an automated conversion and may require manual adjustments\n\n",
        comment,
        source.display_name(),
        file_name,
        comment
    )
}

/// Removes statement semicolons and block braces for Python output
pub(crate) fn strip_block_punctuation(code: &str) -> String {
    let code = TRAILING_OPEN_BRACE.replace_all(code, "");
    let code = LONE_CLOSE_BRACE.replace_all(&code, "");
    TRAILING_SEMICOLON.replace_all(&code, "").into_owned()
}

/// Applies `rewrite` to the code between quoted literals, copying the literals as they are.
///
/// Literals end at the matching unescaped quote or at the end of their line.
pub(crate) fn outside_literals<F>(code: &str, rewrite: F) -> String
where
    F: Fn(&str) -> String,
{
    let mut out = String::with_capacity(code.len());
    let mut segment_start = 0;
    let mut chars = code.char_indices().peekable();

    while let Some((start, quote)) = chars.next() {
        if quote != '"' && quote != '\'' {
            continue;
        }
        out.push_str(&rewrite(&code[segment_start..start]));

        let mut end = code.len();
        let mut escaped = false;
        while let Some(&(i, ch)) = chars.peek() {
            if ch == '\n' {
                end = i;
                break;
            }
            chars.next();
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == quote {
                end = i + ch.len_utf8();
                break;
            }
        }

        out.push_str(&code[start..end]);
        segment_start = end;
    }

    out.push_str(&rewrite(&code[segment_start..]));
    out
}

pub(crate) fn literals_to_python(code: &str) -> String {
    outside_literals(code, |segment| apply_rules(segment, &LITERALS_TO_PYTHON))
}

pub(crate) fn literals_from_python(code: &str) -> String {
    outside_literals(code, |segment| apply_rules(segment, &LITERALS_FROM_PYTHON))
}

pub(crate) fn logical_to_python(code: &str) -> String {
    outside_literals(code, |segment| apply_rules(segment, &LOGICAL_TO_PYTHON))
}

/// Rewrites `/* ... */` blocks as `#` line comments
pub(crate) fn block_comments_to_hash(code: &str) -> String {
    BLOCK_COMMENT
        .replace_all(code, |caps: &Captures| {
            caps[1]
                .lines()
                .map(|line| line.trim().trim_start_matches('*').trim())
                .filter(|line| !line.is_empty())
                .map(|line| format!("# {}", line))
                .collect::<Vec<_>>()
                .join("\n")
        })
        .into_owned()
}

/// `"text"` to `'text'` for simple literals without escapes or nested quotes
pub(crate) fn double_to_single_quotes(code: &str) -> String {
    DOUBLE_QUOTED.replace_all(code, "'${1}'").into_owned()
}

/// `'text'` to `"text"` for simple literals without escapes or nested quotes
pub(crate) fn single_to_double_quotes(code: &str) -> String {
    SINGLE_QUOTED.replace_all(code, "\"${1}\"").into_owned()
}

/// Rewrites counted `for` headers whose declaration, condition and increment
/// all name the same variable. Other loops are left untouched.
///
/// The pattern must define the named groups `var`, `start`, `cond`, `end` and `step`.
pub(crate) fn rewrite_counted_loops<F>(code: &str, pattern: &Regex, render: F) -> String
where
    F: Fn(&str, &str, &str) -> String,
{
    pattern
        .replace_all(code, |caps: &Captures| {
            let var = &caps["var"];
            if &caps["cond"] == var && &caps["step"] == var {
                render(var, caps["start"].trim(), caps["end"].trim())
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

/// Splits on commas that are not nested inside brackets or generics
pub(crate) fn split_top_level(args: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut current = String::new();

    for ch in args.chars() {
        match ch {
            '(' | '[' | '{' | '<' => {
                depth += 1;
                current.push(ch);
            }
            ')' | ']' | '}' | '>' => {
                depth -= 1;
                current.push(ch);
            }
            ',' if depth <= 0 => {
                parts.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }

    if !current.trim().is_empty() {
        parts.push(current.trim().to_string());
    }

    parts
}

/// Drops C/Java style type information from a parameter list: `int a, char *b` becomes `a, b`
pub(crate) fn strip_param_types(params: &str) -> String {
    split_top_level(params)
        .iter()
        .filter(|p| !p.is_empty() && p.as_str() != "void")
        .filter_map(|p| {
            let name = p
                .rsplit(|c: char| c.is_whitespace() || c == '*' || c == '&' || c == '.')
                .find(|s| !s.is_empty())?;
            Some(name.trim_end_matches("[]").to_string())
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Python or JavaScript parameters as `Object`-typed Java parameters
pub(crate) fn javaize_params(params: &str) -> String {
    split_top_level(params)
        .iter()
        .filter_map(|p| {
            let name = p.split(['=', ':']).next()?.trim();
            match name {
                "" | "self" | "cls" => None,
                n if n.starts_with("**") => {
                    Some(format!("Map<String, Object> {}", n.trim_start_matches('*')))
                }
                n if n.starts_with('*') || n.starts_with("...") => Some(format!(
                    "Object... {}",
                    n.trim_start_matches(['*', '.'])
                )),
                n => Some(format!("Object {}", n)),
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Derives a Java class name from a file name: `my_calc.py` becomes `Mycalc`
pub(crate) fn java_class_name(file_name: &str) -> Result<String, ConversionError> {
    let stem = Path::new(file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();

    let mut name = String::new();
    let mut previous_alpha = false;
    for ch in stem.chars().filter(|c| c.is_ascii_alphanumeric()) {
        if ch.is_ascii_alphabetic() {
            if previous_alpha {
                name.push(ch.to_ascii_lowercase());
            } else {
                name.push(ch.to_ascii_uppercase());
            }
            previous_alpha = true;
        } else {
            name.push(ch);
            previous_alpha = false;
        }
    }

    match name.chars().next() {
        Some(first) if first.is_ascii_alphabetic() => Ok(name),
        _ => Err(ConversionError::InvalidClassName(file_name.to_string())),
    }
}

/// Adds closing braces to brace-opened blocks based on indentation.
///
/// Every line ending in `{` opens a block at its indentation; the block is closed
/// before the next non-blank line indented at the same level or less. A line
/// starting with `}` at the block's level (e.g. `} else {`) closes it itself.
pub(crate) fn close_indented_blocks(code: &str) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut pending_blank: Vec<String> = Vec::new();
    let mut stack: Vec<usize> = Vec::new();

    for line in code.lines() {
        let trimmed = line.trim_start();
        if trimmed.is_empty() {
            pending_blank.push(line.to_string());
            continue;
        }

        let indent = line.len() - trimmed.len();
        while let Some(&top) = stack.last() {
            if indent > top {
                break;
            }
            stack.pop();
            if indent == top && trimmed.starts_with('}') {
                break;
            }
            out.push(format!("{}}}", " ".repeat(top)));
        }

        out.append(&mut pending_blank);
        out.push(line.to_string());
        if trimmed.ends_with('{') {
            stack.push(indent);
        }
    }

    while let Some(top) = stack.pop() {
        out.push(format!("{}}}", " ".repeat(top)));
    }
    out.append(&mut pending_blank);

    let mut result = out.join("\n");
    if code.ends_with('\n') {
        result.push('\n');
    }
    result
}

/// Indents every non-blank line by `width` spaces
pub(crate) fn indent_lines(code: &str, width: usize) -> String {
    let pad = " ".repeat(width);
    code.lines()
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                format!("{}{}", pad, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
