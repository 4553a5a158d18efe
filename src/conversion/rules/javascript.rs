/*!
 * JavaScript to Python, TypeScript to Python and JavaScript to Java rules.
 *
 * TypeScript sources are first reduced to plain JavaScript by dropping type
 * annotations, interfaces and type aliases, then go through the JavaScript
 * to Python table.
 */

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::{RuleSet, rule};
use crate::conversion::Language;
use crate::errors::ConversionError;

/// Identifiers followed by `(` that are not method declarations
const CALL_KEYWORDS: &[&str] = &[
    "if", "for", "while", "switch", "catch", "function", "return", "elif", "def", "with",
];

/// A single TypeScript type: `string`, `Array<number>`, `User[]`, `Promise<Map<string, T>>`
const TS_TYPE: &str = r"[A-Za-z_][\w.]*(?:<[^<>()=;\n]*(?:<[^<>()=;\n]*>)?[^<>()=;\n]*>)?(?:\[\])*";

static IMPORTS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?m)^([ \t]*)((?:import\s[^;\n]*|(?:const|let|var)\s+[\w{}\s,]+=\s*require\([^)\n]*\));?)[ \t]*$"#,
    )
    .unwrap()
});

static EXPORTS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^([ \t]*)export\s+(?:default\s+)?").unwrap());

static MODULE_EXPORTS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*module\.exports\s*=.*\n?").unwrap());

static TEMPLATE_LITERAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"`([^`]*)`").unwrap());
static TEMPLATE_SLOT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$\{([^}]*)\}").unwrap());

static FUNCTION_DECL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^([ \t]*)(async\s+)?function\s*\*?\s*(\w+)\s*\(([^)]*)\)\s*\{").unwrap()
});

static ARROW_DECL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^([ \t]*)(?:const|let|var)\s+(\w+)\s*=\s*(async\s*)?\(([^)]*)\)\s*=>\s*\{")
        .unwrap()
});

static METHOD_DECL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^([ \t]*)(static\s+)?(async\s+)?(\w+)\s*\(([^)]*)\)\s*\{").unwrap()
});

static CLASS_DECL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^([ \t]*)class\s+(\w+)(?:\s+extends\s+([\w.]+))?\s*\{").unwrap()
});

static COUNTED_FOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"for\s*\(\s*(?:let|var)\s+(?P<var>\w+)\s*=\s*(?P<start>[^;]+?)\s*;\s*(?P<cond>\w+)\s*<\s*(?P<end>[^;]+?)\s*;\s*(?P<step>\w+)\s*\+\+\s*\)\s*\{",
    )
    .unwrap()
});

static DECLARATIONS: Lazy<RuleSet> = Lazy::new(|| {
    vec![
        rule(r"(?m)^([ \t]*)(?:const|let|var)\s+(\w+)\s*=\s*([^;\n]+);?[ \t]*$", "${1}${2} = ${3}"),
        rule(r"(?m)^([ \t]*)(?:let|var)\s+(\w+)\s*;?[ \t]*$", "${1}${2} = None"),
    ]
});

static PYTHON_STATEMENTS: Lazy<RuleSet> = Lazy::new(|| {
    vec![
        rule(r"console\.(?:log|info|warn|error|debug)\s*\(", "print("),
        rule(r"for\s*\(\s*(?:const|let|var)\s+(\w+)\s+of\s+([^)]+)\)\s*\{", "for ${1} in ${2}:"),
        rule(r"for\s*\(\s*(?:const|let|var)\s+(\w+)\s+in\s+([^)]+)\)\s*\{", "for ${1} in ${2}:"),
        rule(r"\}?[ \t]*else\s+if\s*\((.+)\)\s*\{", "elif ${1}:"),
        rule(r"\bif\s*\((.+)\)\s*\{", "if ${1}:"),
        rule(r"\}?[ \t]*else\s*\{", "else:"),
        rule(r"\bwhile\s*\((.+)\)\s*\{", "while ${1}:"),
        rule(r"\btry\s*\{", "try:"),
        rule(r"\}?[ \t]*catch\s*\(\s*(\w+)\s*\)\s*\{", "except Exception as ${1}:"),
        rule(r"\}?[ \t]*catch\s*\{", "except Exception:"),
        rule(r"\}?[ \t]*finally\s*\{", "finally:"),
        rule(r"\bthrow\s+new\s+\w*Error\s*\(", "raise Exception("),
        rule(r"\bthis\.", "self."),
        rule(r"(\w+)\s*\+\+", "${1} += 1"),
        rule(r"(\w+)\s*--", "${1} -= 1"),
        rule(r"\s*===\s*", " == "),
        rule(r"\s*!==\s*", " != "),
        rule(r"\bundefined\b", "None"),
        rule(r"\bnew\s+(\w+)\s*\(", "${1}("),
        rule(r"\.length\b", ".__len__()"),
        rule(r"\.push\(", ".append("),
    ]
});

static LINE_COMMENTS: Lazy<RuleSet> = Lazy::new(|| {
    vec![
        rule(r"(?m)^([ \t]*)//[ \t]?", "${1}# "),
        rule(r"(?m);[ \t]*//[ \t]?(.*)$", "  # ${1}"),
    ]
});

static TS_DECLARATIONS: Lazy<RuleSet> = Lazy::new(|| {
    vec![
        rule(
            r"(?ms)^([ \t]*)(?:export\s+)?(?:declare\s+)?interface\s+(\w+)[^{]*\{.*?^[ \t]*\}[ \t]*\n?",
            "${1}// interface ${2} omitted\n",
        ),
        rule(
            r"(?m)^([ \t]*)(?:export\s+)?type\s+(\w+)(?:<[^>]*>)?\s*=[^;]*;[ \t]*\n?",
            "${1}// type ${2} omitted\n",
        ),
        rule(
            r"(?ms)^([ \t]*)(?:export\s+)?(?:const\s+)?enum\s+(\w+)\s*\{.*?\}[ \t]*\n?",
            "${1}// enum ${2} omitted\n",
        ),
        rule(r"\b(?:public|private|protected|readonly)\s+", ""),
        rule(r"\bimplements\s+[\w\s,<>]+?\s*\{", "{"),
    ]
});

static TS_ANNOTATIONS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        // Parameter and declaration annotations: `(a: string`, `, b?: T[]`, `let x: number`
        Regex::new(&format!(
            r"((?:\(|,|\b(?:let|const|var))\s*\.{{0,3}}\w+)\??\s*:\s*{ty}(?:\s*\|\s*{ty})*",
            ty = TS_TYPE
        ))
        .unwrap(),
        // Return type annotations: `): Promise<void> {` or `): number =>`
        Regex::new(&format!(
            r"\)\s*:\s*{ty}(?:\s*\|\s*{ty})*\s*(\{{|=>)",
            ty = TS_TYPE
        ))
        .unwrap(),
        // Class field annotations: `  name: string;`
        Regex::new(&format!(r"(?m)^([ \t]*\w+)\??\s*:\s*{ty}(?:\s*\|\s*{ty})*\s*([=;])", ty = TS_TYPE))
            .unwrap(),
    ]
});

static TS_CASTS: Lazy<RuleSet> = Lazy::new(|| {
    vec![
        rule(r"\s+as\s+[\w.]+(?:<[^<>\n]*>)?(?:\[\])*", ""),
        rule(r"(\w)<[\w\s,\[\]]+>\s*\(", "${1}("),
        rule(r"(\w)!([.;,)\]])", "${1}${2}"),
    ]
});

static JAVA_STATEMENTS: Lazy<RuleSet> = Lazy::new(|| {
    vec![
        rule(r"console\.(?:log|info|debug)\s*\(", "System.out.println("),
        rule(r"console\.(?:warn|error)\s*\(", "System.err.println("),
        rule(r"for\s*\(\s*(?:const|let|var)\s+(\w+)\s+of\s+([^)]+)\)", "for (Object ${1} : ${2})"),
        rule(r"for\s*\(\s*(?:let|var)\s+(\w+)\s*=", "for (int ${1} ="),
        rule(r"(?m)^([ \t]*)(?:const|let|var)\s+(\w+)\s*=\s*([^;\n]+?);?[ \t]*$", "${1}Object ${2} = ${3};"),
        rule(r"(?m)^([ \t]*)(?:let|var)\s+(\w+)\s*;?[ \t]*$", "${1}Object ${2};"),
        rule(r"catch\s*\(\s*(\w+)\s*\)", "catch (Exception ${1})"),
        rule(r"\bthrow\s+new\s+\w*Error\s*\(", "throw new RuntimeException("),
        rule(r"\s*===\s*", " == "),
        rule(r"\s*!==\s*", " != "),
        rule(r"\bundefined\b", "null"),
        rule(r"\.length\b", ".length()"),
    ]
});

fn template_to_fstring(code: &str) -> String {
    TEMPLATE_LITERAL
        .replace_all(code, |caps: &Captures| {
            let body = TEMPLATE_SLOT.replace_all(&caps[1], "{${1}}");
            format!("f\"{}\"", body.replace('"', "\\\""))
        })
        .into_owned()
}

fn template_to_concat(code: &str) -> String {
    TEMPLATE_LITERAL
        .replace_all(code, |caps: &Captures| {
            let body = &caps[1];
            let mut parts: Vec<String> = Vec::new();
            let mut last = 0;
            for slot in TEMPLATE_SLOT.captures_iter(body) {
                let (Some(whole), Some(expr)) = (slot.get(0), slot.get(1)) else {
                    continue;
                };
                if whole.start() > last {
                    parts.push(format!("\"{}\"", &body[last..whole.start()]));
                }
                parts.push(format!("({})", expr.as_str().trim()));
                last = whole.end();
            }
            if last < body.len() || parts.is_empty() {
                parts.push(format!("\"{}\"", &body[last..]));
            }
            parts.join(" + ")
        })
        .into_owned()
}

/// JavaScript parameters as Python parameters: `...rest` becomes `*rest`, `b = 2` becomes `b=2`
fn python_params(params: &str, instance: bool) -> String {
    let mut names: Vec<String> = super::split_top_level(params)
        .iter()
        .filter(|p| !p.is_empty())
        .map(|p| {
            let p = p.replace(" = ", "=");
            match p.strip_prefix("...") {
                Some(rest) => format!("*{}", rest),
                None => p,
            }
        })
        .collect();
    if instance {
        names.insert(0, "self".to_string());
    }
    names.join(", ")
}

fn comment_imports(code: &str, comment: &str) -> String {
    IMPORTS
        .replace_all(code, |caps: &Captures| {
            format!("{}{} import: {}", &caps[1], comment, caps[2].trim_end_matches(';'))
        })
        .into_owned()
}

pub(super) fn to_python(source: &str, file_name: &str, source_language: Language) -> String {
    let code = comment_imports(source, "//");
    let code = MODULE_EXPORTS.replace_all(&code, "");
    let code = EXPORTS.replace_all(&code, "${1}");
    let code = super::block_comments_to_hash(&code);
    let code = super::apply_rules(&code, &LINE_COMMENTS);
    let code = template_to_fstring(&code);
    let code = CLASS_DECL.replace_all(&code, |caps: &Captures| match caps.get(3) {
        Some(base) => format!("{}class {}({}):", &caps[1], &caps[2], base.as_str()),
        None => format!("{}class {}:", &caps[1], &caps[2]),
    });
    let code = FUNCTION_DECL.replace_all(&code, |caps: &Captures| {
        let prefix = if caps.get(2).is_some() { "async " } else { "" };
        format!(
            "{}{}def {}({}):",
            &caps[1],
            prefix,
            &caps[3],
            python_params(&caps[4], false)
        )
    });
    let code = ARROW_DECL.replace_all(&code, |caps: &Captures| {
        let prefix = if caps.get(3).is_some() { "async " } else { "" };
        format!(
            "{}{}def {}({}):",
            &caps[1],
            prefix,
            &caps[2],
            python_params(&caps[4], false)
        )
    });
    let code = super::rewrite_counted_loops(&code, &COUNTED_FOR, |var, start, end| {
        format!("for {} in range({}, {}):", var, start, end)
    });
    let code = super::apply_rules(&code, &PYTHON_STATEMENTS);
    let code = METHOD_DECL.replace_all(&code, |caps: &Captures| {
        let name = &caps[4];
        if CALL_KEYWORDS.contains(&name) {
            return caps[0].to_string();
        }
        let is_static = caps.get(2).is_some();
        let prefix = if caps.get(3).is_some() { "async " } else { "" };
        let name = if name == "constructor" { "__init__" } else { name };
        let decorator = if is_static {
            format!("{}@staticmethod\n", &caps[1])
        } else {
            String::new()
        };
        format!(
            "{}{}{}def {}({}):",
            decorator,
            &caps[1],
            prefix,
            name,
            python_params(&caps[5], !is_static)
        )
    });
    let code = super::apply_rules(&code, &DECLARATIONS);
    let code = super::logical_to_python(&code);
    let code = super::literals_to_python(&code);
    let code = super::double_to_single_quotes(&code);
    let code = super::strip_block_punctuation(&code);

    format!(
        "{}{}",
        super::header(source_language, Language::Python, file_name),
        code.trim_start_matches('\n')
    )
}

/// Reduces TypeScript to JavaScript by removing type-only syntax
pub(super) fn strip_typescript(source: &str) -> String {
    let code = super::apply_rules(source, &TS_DECLARATIONS);
    let code = TS_ANNOTATIONS[0].replace_all(&code, "${1}");
    let code = TS_ANNOTATIONS[1].replace_all(&code, ") ${1}");
    let code = TS_ANNOTATIONS[2].replace_all(&code, |caps: &Captures| match &caps[2] {
        "=" => format!("{} =", &caps[1]),
        _ => format!("{};", &caps[1]),
    });
    super::apply_rules(&code, &TS_CASTS)
}

pub(super) fn typescript_to_python(source: &str, file_name: &str) -> String {
    to_python(&strip_typescript(source), file_name, Language::TypeScript)
}

pub(super) fn to_java(source: &str, file_name: &str) -> Result<String, ConversionError> {
    let class_name = super::java_class_name(file_name)?;

    let code = comment_imports(source, "//");
    let code = MODULE_EXPORTS.replace_all(&code, "");
    let code = EXPORTS.replace_all(&code, "${1}");
    let code = template_to_concat(&code);
    let code = FUNCTION_DECL.replace_all(&code, |caps: &Captures| {
        format!(
            "{}public static Object {}({}) {{",
            &caps[1],
            &caps[3],
            super::javaize_params(&caps[4])
        )
    });
    let code = ARROW_DECL.replace_all(&code, |caps: &Captures| {
        format!(
            "{}public static Object {}({}) {{",
            &caps[1],
            &caps[2],
            super::javaize_params(&caps[4])
        )
    });
    let code = super::apply_rules(&code, &JAVA_STATEMENTS);
    let code = super::single_to_double_quotes(&code);

    Ok(format!(
        "{}import java.util.*;\nimport java.io.*;\n\npublic class {} {{\n\n{}\n}}\n",
        super::header(Language::JavaScript, Language::Java, file_name),
        class_name,
        super::indent_lines(code.trim_matches('\n'), 4)
    ))
}
