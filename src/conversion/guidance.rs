/*!
 * Next-steps guidance attached to conversion reports.
 */

use serde::{Deserialize, Serialize};

use super::ConversionType;

/// Grouped checklists for reviewing a converted project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailedGuidance {
    pub review_code: Vec<String>,
    pub test_project: Vec<String>,
    pub security_considerations: Vec<String>,
}

/// Advice returned with every successful upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextSteps {
    pub what_to_do: Vec<String>,
    pub important_notes: Vec<String>,
    pub detailed_guidance: DetailedGuidance,
    pub conversion_specific_notes: Vec<String>,
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn conversion_notes(conversion_type: ConversionType) -> [&'static str; 4] {
    match conversion_type {
        ConversionType::CToPython => [
            "Review memory management (C pointers converted to Python references)",
            "Check for C-specific optimizations that may need Python equivalents",
            "Verify that C structs are properly converted to Python classes",
            "Review any platform-specific code that may not work in Python",
        ],
        ConversionType::PythonToJavascript => [
            "Review Python-specific libraries that may not have JS equivalents",
            "Check for Python list comprehensions converted to JavaScript",
            "Verify that Python exceptions are properly converted to JavaScript error handling",
            "Review any Python-specific syntax that may need manual adjustment",
        ],
        ConversionType::PythonToJava => [
            "Review Python dynamic typing converted to Java static typing",
            "Check for Python list comprehensions converted to Java streams",
            "Verify that Python exceptions are properly converted to Java exceptions",
            "Review any Python-specific libraries that may need Java equivalents",
        ],
        ConversionType::JavaToPython => [
            "Review Java static typing converted to Python dynamic typing",
            "Check for Java interfaces and abstract classes converted to Python",
            "Verify that Java exceptions are properly converted to Python exceptions",
            "Review any Java-specific libraries that may need Python equivalents",
        ],
        ConversionType::JavascriptToPython => [
            "Review JavaScript async/await converted to Python async/await",
            "Check for JavaScript promises converted to Python asyncio",
            "Verify that JavaScript objects are properly converted to Python dictionaries",
            "Review any JavaScript-specific libraries that may need Python equivalents",
        ],
        ConversionType::TypescriptToPython => [
            "Review TypeScript type annotations removed for Python dynamic typing",
            "Check for TypeScript interfaces converted to Python classes or type hints",
            "Verify that TypeScript enums are properly converted to Python enums",
            "Review any TypeScript-specific features that may need Python equivalents",
        ],
        ConversionType::JavaToJavascript => [
            "Review Java static typing converted to JavaScript dynamic typing",
            "Check for Java interfaces and abstract classes converted to JavaScript",
            "Verify that Java exceptions are properly converted to JavaScript error handling",
            "Review any Java-specific libraries that may need JavaScript equivalents",
        ],
        ConversionType::JavascriptToJava => [
            "Review JavaScript dynamic typing converted to Java static typing",
            "Check for JavaScript async/await converted to Java CompletableFuture",
            "Verify that JavaScript objects are properly converted to Java classes",
            "Review any JavaScript-specific libraries that may need Java equivalents",
        ],
    }
}

/// Build the guidance for a finished conversion
pub fn next_steps(conversion_type: ConversionType, ai_used: bool, error_count: usize) -> NextSteps {
    let mut conversion_specific_notes = owned(&conversion_notes(conversion_type));

    if ai_used {
        conversion_specific_notes.push(
            "AI-enhanced conversion may include additional optimizations and improvements"
                .to_string(),
        );
    }

    if error_count > 0 {
        conversion_specific_notes.push(format!(
            "Manual review required for {} files that had conversion errors",
            error_count
        ));
    }

    NextSteps {
        what_to_do: owned(&[
            "Download the converted project",
            "Review the converted code",
            "Test the converted project",
            "Make manual adjustments if needed",
        ]),
        important_notes: owned(&[
            "This is an automated conversion",
            "Manual review is recommended",
            "Test thoroughly before production use",
            "Check for security implications",
        ]),
        detailed_guidance: DetailedGuidance {
            review_code: owned(&[
                "Check for syntax errors in the target language",
                "Verify that all functions and logic are preserved",
                "Review variable names and data types",
                "Ensure proper error handling and exceptions",
                "Check for language-specific best practices",
            ]),
            test_project: owned(&[
                "Run the converted code with sample inputs",
                "Compare output with the original program",
                "Test edge cases and error conditions",
                "Check for memory leaks or performance issues",
                "Verify all dependencies are properly included",
            ]),
            security_considerations: owned(&[
                "Review input validation and sanitization",
                "Check for potential injection vulnerabilities",
                "Verify secure handling of sensitive data",
                "Ensure proper authentication and authorization",
                "Review file and network access permissions",
            ]),
        },
        conversion_specific_notes,
    }
}
