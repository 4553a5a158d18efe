/*!
 * Tests for conversion types and the rule engine
 */

use codeconv::conversion::rules;
use codeconv::conversion::validation::check_output;
use codeconv::conversion::ConversionType;
use codeconv::errors::ConversionError;

#[test]
fn test_conversionType_parse_shouldAcceptEveryWireName() {
    for conversion_type in ConversionType::ALL {
        let parsed: ConversionType = conversion_type.as_str().parse().unwrap();
        assert_eq!(parsed, conversion_type);
    }
}

#[test]
fn test_conversionType_parse_withUnknownName_shouldReturnUnsupportedType() {
    let err = "cobol_to_rust".parse::<ConversionType>().unwrap_err();
    assert!(matches!(err, ConversionError::UnsupportedType(_)));
}

#[test]
fn test_conversionType_extensions_shouldMatchLanguagePair() {
    assert!(ConversionType::CToPython.accepts_extension("h"));
    assert!(ConversionType::CToPython.accepts_extension("C"));
    assert!(!ConversionType::CToPython.accepts_extension("py"));
    assert!(ConversionType::JavascriptToJava.accepts_extension("tsx"));
    assert_eq!(ConversionType::PythonToJava.target_extension(), "java");
    assert_eq!(ConversionType::JavaToJavascript.target_extension(), "js");
    assert_eq!(ConversionType::TypescriptToPython.target_extension(), "py");
}

#[test]
fn test_conversionType_label_shouldShowBothLanguages() {
    assert_eq!(ConversionType::CToPython.label(), "C → Python");
    assert_eq!(ConversionType::TypescriptToPython.label(), "TypeScript → Python");
}

#[test]
fn test_convert_everyType_shouldStartWithHeaderComment() {
    let samples = [
        (ConversionType::CToPython, "int x = 1;\n", "main.c", "# Converted from C: main.c"),
        (ConversionType::PythonToJavascript, "x = 1\n", "app.py", "// Converted from Python: app.py"),
        (ConversionType::PythonToJava, "x = 1\n", "app.py", "// Converted from Python: app.py"),
        (ConversionType::JavaToPython, "int x = 1;\n", "App.java", "# Converted from Java: App.java"),
        (ConversionType::JavascriptToPython, "let x = 1;\n", "app.js", "# Converted from JavaScript: app.js"),
        (ConversionType::TypescriptToPython, "let x: number = 1;\n", "app.ts", "# Converted from TypeScript: app.ts"),
        (ConversionType::JavaToJavascript, "int x = 1;\n", "App.java", "// Converted from Java: App.java"),
        (ConversionType::JavascriptToJava, "let x = 1;\n", "app.js", "// Converted from JavaScript: app.js"),
    ];

    for (conversion_type, source, file_name, header) in samples {
        let out = rules::convert(conversion_type, source, file_name).unwrap();
        assert!(
            out.starts_with(header),
            "{} output should start with {:?}, got {:?}",
            conversion_type,
            header,
            out
        );
        assert!(out.contains("may require manual adjustments"));
    }
}

#[test]
fn test_convert_cToPython_shouldProducePythonShape() {
    let source = "#include <stdio.h>\n\nint main() {\n    for (i = 0; i < 3; i++) {\n        printf(\"%d\\n\", i);\n    }\n    return 0;\n}\n";
    let out = rules::convert(ConversionType::CToPython, source, "main.c").unwrap();
    assert!(!out.contains("#include"));
    assert!(out.contains("for i in range(0, 3):"));
    assert!(out.contains("if __name__ == \"__main__\":"));
    let check = check_output(ConversionType::CToPython, &out);
    assert!(check.output_non_empty);
    assert!(check.delimiters_balanced);
}

#[test]
fn test_convert_javascriptToJava_shouldKeepBodyInsideClass() {
    let source = "function add(a, b) {\n    return a + b;\n}\nconsole.log(add(1, 2));\n";
    let out = rules::convert(ConversionType::JavascriptToJava, source, "math_utils.js").unwrap();
    assert!(out.contains("public class"));
    assert!(out.contains("return a + b;"));
    assert_eq!(out.matches('{').count(), out.matches('}').count());
}

#[test]
fn test_convert_withNulByte_shouldReportBinaryContent() {
    let err = rules::convert(ConversionType::CToPython, "int\0x;", "blob.c").unwrap_err();
    assert!(matches!(err, ConversionError::BinaryContent(name) if name == "blob.c"));
}

#[test]
fn test_convert_toJavaWithDigitFileName_shouldFail() {
    let err = rules::convert(ConversionType::PythonToJava, "x = 1\n", "1st.py").unwrap_err();
    assert!(matches!(err, ConversionError::InvalidClassName(_)));
}

#[test]
fn test_checkOutput_withEmptyCode_shouldWarn() {
    let check = check_output(ConversionType::JavaToJavascript, "   \n");
    assert!(!check.output_non_empty);
    assert!(!check.passed());
    assert!(!check.warnings.is_empty());
}
