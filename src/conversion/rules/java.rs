/*!
 * Java to Python and Java to JavaScript rules.
 */

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::{RuleSet, rule};
use crate::conversion::Language;

/// Words that may precede an identifier without being a type
const NON_TYPES: &[&str] = &[
    "return", "break", "continue", "throw", "new", "else", "case", "goto", "yield", "package",
    "import",
];

static IMPORTS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*(?:import|package)\s+[\w.*]+\s*;[ \t]*\n?").unwrap());

static CLASS_DECL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?:(?:public|private|protected|static|final|abstract)\s+)*class\s+(\w+)(?:\s*<[^>]*>)?(?:\s+extends\s+(\w+))?(?:\s+implements\s+[\w\s,<>]+?)?\s*\{",
    )
    .unwrap()
});

static MAIN_METHOD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"public\s+static\s+void\s+main\s*\(\s*(?:final\s+)?String\s*(?:\[\]\s*\w+|\w+\s*\[\]|\.\.\.\s*\w+)\s*\)\s*(?:throws\s+[\w\s,.]+)?\{").unwrap()
});

static METHOD_DECL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?m)^([ \t]*)((?:(?:public|private|protected|static|final|abstract|synchronized)\s+)+)(?:<[^>]*>\s*)?[\w.]+(?:<[^>]*>)?(?:\[\])*\s+(\w+)\s*\(([^)]*)\)\s*(?:throws\s+[\w\s,.]+)?\{",
    )
    .unwrap()
});

static CONSTRUCTOR_DECL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^([ \t]*)(?:public|private|protected)\s+(\w+)\s*\(([^)]*)\)\s*(?:throws\s+[\w\s,.]+)?\{").unwrap()
});

static FIELD_DECL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?m)^([ \t]*)(?:(?:public|private|protected|static|final|transient|volatile)\s+)+[\w.]+(?:<[^>]*>)?(?:\[\])*\s+(\w+)\s*(=\s*[^;\n]+)?;",
    )
    .unwrap()
});

static LOCAL_WITH_VALUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^([ \t]*)(?:final\s+)?([\w.]+)(?:<[^>\n]*>)?(?:\[\])*\s+(\w+)\s*=\s*([^;\n]+);")
        .unwrap()
});

static LOCAL_WITHOUT_VALUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^([ \t]*)(?:final\s+)?([\w.]+)(?:<[^>\n]*>)?(?:\[\])*\s+(\w+)\s*;").unwrap()
});

static COUNTED_FOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"for\s*\(\s*(?:int|long|short)\s+(?P<var>\w+)\s*=\s*(?P<start>[^;]+?)\s*;\s*(?P<cond>\w+)\s*<\s*(?P<end>[^;]+?)\s*;\s*(?P<step>\w+)\s*\+\+\s*\)\s*\{",
    )
    .unwrap()
});

static FOR_EACH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"for\s*\(\s*(?:final\s+)?[\w.]+(?:<[^>]*>)?(?:\[\])*\s+(\w+)\s*:\s*([^)]+)\)\s*\{").unwrap()
});

static LINE_COMMENTS: Lazy<RuleSet> = Lazy::new(|| {
    vec![
        rule(r"(?m)^([ \t]*)//[ \t]?", "${1}# "),
        rule(r"(?m);[ \t]*//[ \t]?(.*)$", "  # ${1}"),
        rule(r"(?m)^[ \t]*@\w+(?:\([^)\n]*\))?[ \t]*\n", ""),
    ]
});

static PYTHON_STATEMENTS: Lazy<RuleSet> = Lazy::new(|| {
    vec![
        rule(r"System\.out\.println\s*\(\s*\)", "print()"),
        rule(r"System\.out\.println\s*\(", "print("),
        rule(r"System\.out\.print\s*\(([^;\n]*)\)", r#"print(${1}, end="")"#),
        rule(r"System\.err\.println\s*\(([^;\n]*)\)", "print(${1}, file=sys.stderr)"),
        rule(r"\}?[ \t]*else\s+if\s*\((.+)\)\s*\{", "elif ${1}:"),
        rule(r"\bif\s*\((.+)\)\s*\{", "if ${1}:"),
        rule(r"\}?[ \t]*else\s*\{", "else:"),
        rule(r"\bwhile\s*\((.+)\)\s*\{", "while ${1}:"),
        rule(r"\btry\s*\{", "try:"),
        rule(r"\}?[ \t]*catch\s*\(\s*[\w.|\s]+?\s+(\w+)\s*\)\s*\{", "except Exception as ${1}:"),
        rule(r"\}?[ \t]*finally\s*\{", "finally:"),
        rule(r"\bthrow\s+new\s+\w*Exception\s*\(", "raise Exception("),
        rule(r"\bthis\.", "self."),
        rule(r"(\w+)\s*\+\+\s*;", "${1} += 1;"),
        rule(r"(\w+)\s*--\s*;", "${1} -= 1;"),
        rule(r"\bnew\s+(\w+)\s*\(", "${1}("),
        rule(r"\.length\(\)", ".__len__()"),
        rule(r"\.equals\(([^()]*)\)", " == ${1}"),
    ]
});

static JS_STATEMENTS: Lazy<RuleSet> = Lazy::new(|| {
    vec![
        rule(r"System\.out\.println\s*\(", "console.log("),
        rule(r"System\.out\.print\s*\(", "process.stdout.write("),
        rule(r"System\.err\.println\s*\(", "console.error("),
        rule(r"(?m)^([ \t]*)@\w+(?:\([^)\n]*\))?[ \t]*\n", ""),
        rule(r"catch\s*\(\s*[\w.|\s]+?\s+(\w+)\s*\)", "catch (${1})"),
        rule(r"\bthrow\s+new\s+\w*Exception\s*\(", "throw new Error("),
        rule(r"\.equals\(([^()]*)\)", " === ${1}"),
        rule(r"\.length\(\)", ".length"),
        rule(r"\bString\.valueOf\(", "String("),
        rule(r"\b(?:Integer|Long)\.parseInt\(", "parseInt("),
        rule(r"\bDouble\.parseDouble\(", "parseFloat("),
    ]
});

fn is_type_word(word: &str) -> bool {
    !NON_TYPES.contains(&word)
}

fn python_params(params: &str, instance: bool) -> String {
    let names = super::strip_param_types(params);
    match (instance, names.is_empty()) {
        (true, true) => "self".to_string(),
        (true, false) => format!("self, {}", names),
        (false, _) => names,
    }
}

pub(super) fn to_python(source: &str, file_name: &str) -> String {
    let code = IMPORTS.replace_all(source, "");
    let code = super::block_comments_to_hash(&code);
    let code = super::apply_rules(&code, &LINE_COMMENTS);
    let code = CLASS_DECL.replace_all(&code, |caps: &Captures| match caps.get(2) {
        Some(base) => format!("class {}({}):", &caps[1], base.as_str()),
        None => format!("class {}:", &caps[1]),
    });
    let code = MAIN_METHOD.replace_all(&code, "if __name__ == '__main__':");
    let code = METHOD_DECL.replace_all(&code, |caps: &Captures| {
        let is_static = caps[2].split_whitespace().any(|m| m == "static");
        let decorator = if is_static {
            format!("{}@staticmethod\n", &caps[1])
        } else {
            String::new()
        };
        format!(
            "{}{}def {}({}):",
            decorator,
            &caps[1],
            &caps[3],
            python_params(&caps[4], !is_static)
        )
    });
    let code = CONSTRUCTOR_DECL.replace_all(&code, |caps: &Captures| {
        format!("{}def __init__({}):", &caps[1], python_params(&caps[3], true))
    });
    let code = FIELD_DECL.replace_all(&code, |caps: &Captures| match caps.get(3) {
        Some(value) => format!("{}{} {}", &caps[1], &caps[2], value.as_str().trim()),
        None => format!("{}{} = None", &caps[1], &caps[2]),
    });
    let code = super::rewrite_counted_loops(&code, &COUNTED_FOR, |var, start, end| {
        format!("for {} in range({}, {}):", var, start, end)
    });
    let code = FOR_EACH.replace_all(&code, "for ${1} in ${2}:");
    let code = LOCAL_WITH_VALUE.replace_all(&code, |caps: &Captures| {
        if is_type_word(&caps[2]) {
            format!("{}{} = {}", &caps[1], &caps[3], caps[4].trim())
        } else {
            caps[0].to_string()
        }
    });
    let code = LOCAL_WITHOUT_VALUE.replace_all(&code, |caps: &Captures| {
        if is_type_word(&caps[2]) {
            format!("{}{} = None", &caps[1], &caps[3])
        } else {
            caps[0].to_string()
        }
    });
    let code = super::apply_rules(&code, &PYTHON_STATEMENTS);
    let code = super::logical_to_python(&code);
    let code = super::literals_to_python(&code);
    let code = super::double_to_single_quotes(&code);
    let code = super::strip_block_punctuation(&code);

    format!(
        "{}{}",
        super::header(Language::Java, Language::Python, file_name),
        code.trim_start_matches('\n')
    )
}

pub(super) fn to_javascript(source: &str, file_name: &str) -> String {
    let code = IMPORTS.replace_all(source, "");
    let mut main_class: Option<String> = None;
    let code = CLASS_DECL.replace_all(&code, |caps: &Captures| {
        if main_class.is_none() {
            main_class = Some(caps[1].to_string());
        }
        match caps.get(2) {
            Some(base) => format!("class {} extends {} {{", &caps[1], base.as_str()),
            None => format!("class {} {{", &caps[1]),
        }
    });
    let has_main = MAIN_METHOD.is_match(&code);
    let code = MAIN_METHOD.replace_all(&code, "static main(args) {");
    let code = METHOD_DECL.replace_all(&code, |caps: &Captures| {
        let is_static = caps[2].split_whitespace().any(|m| m == "static");
        format!(
            "{}{}{}({}) {{",
            &caps[1],
            if is_static { "static " } else { "" },
            &caps[3],
            super::strip_param_types(&caps[4])
        )
    });
    let code = CONSTRUCTOR_DECL.replace_all(&code, |caps: &Captures| {
        format!("{}constructor({}) {{", &caps[1], super::strip_param_types(&caps[3]))
    });
    let code = FIELD_DECL.replace_all(&code, |caps: &Captures| match caps.get(3) {
        Some(value) => format!("{}{} {};", &caps[1], &caps[2], value.as_str().trim()),
        None => format!("{}{};", &caps[1], &caps[2]),
    });
    let code = super::rewrite_counted_loops(&code, &COUNTED_FOR, |var, start, end| {
        format!("for (let {} = {}; {} < {}; {}++) {{", var, start, var, end, var)
    });
    let code = FOR_EACH.replace_all(&code, "for (const ${1} of ${2}) {");
    let code = LOCAL_WITH_VALUE.replace_all(&code, |caps: &Captures| {
        if is_type_word(&caps[2]) {
            format!("{}let {} = {};", &caps[1], &caps[3], caps[4].trim())
        } else {
            caps[0].to_string()
        }
    });
    let code = LOCAL_WITHOUT_VALUE.replace_all(&code, |caps: &Captures| {
        if is_type_word(&caps[2]) {
            format!("{}let {};", &caps[1], &caps[3])
        } else {
            caps[0].to_string()
        }
    });
    let code = super::apply_rules(&code, &JS_STATEMENTS);

    let mut out = format!(
        "{}{}",
        super::header(Language::Java, Language::JavaScript, file_name),
        code.trim_start_matches('\n')
    );
    if let (true, Some(class)) = (has_main, main_class) {
        if !out.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(&format!("\n{}.main(process.argv.slice(2));\n", class));
    }
    out
}
