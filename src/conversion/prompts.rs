/*!
 * Prompt templates for AI-assisted conversion.
 *
 * Every conversion type has one user prompt with a `{source_code}` placeholder.
 * The system prompt comes from configuration and may use `{source_language}`
 * and `{target_language}`.
 */

use super::ConversionType;

/// User prompt template for one conversion type
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    /// The template string with placeholders
    template: &'static str,
}

impl PromptTemplate {
    pub const C_TO_PYTHON: &'static str = r#"Convert the following C code to Python.
Maintain the same functionality and logic, but use Python syntax and idioms.
Remove C-specific elements like includes, semicolons, and braces.
Convert printf to print, scanf to input, and adjust variable declarations.

C Code:
{source_code}

Python Code:"#;

    pub const PYTHON_TO_JAVASCRIPT: &'static str = r#"Convert the following Python code to JavaScript.
Maintain the same functionality and logic, but use JavaScript syntax and idioms.
Convert print to console.log, function definitions to JavaScript style,
and adjust variable declarations and control structures.

Python Code:
{source_code}

JavaScript Code:"#;

    pub const PYTHON_TO_JAVA: &'static str = r#"Convert the following Python code to Java.
Maintain the same functionality and logic, but use Java syntax and idioms.
Convert print to System.out.println, function definitions to Java methods,
add proper class structure, and adjust variable declarations and control structures.

Python Code:
{source_code}

Java Code:"#;

    pub const JAVA_TO_PYTHON: &'static str = r#"Convert the following Java code to Python.
Maintain the same functionality and logic, but use Python syntax and idioms.
Convert System.out.println to print, Java methods to Python functions,
remove type declarations, and adjust control structures to Python style.
Handle Java-specific features like interfaces, abstract classes, and generics appropriately.

Java Code:
{source_code}

Python Code:"#;

    pub const JAVASCRIPT_TO_PYTHON: &'static str = r#"Convert the following JavaScript code to Python.
Maintain the same functionality and logic, but use Python syntax and idioms.
Convert console.log to print, JavaScript functions to Python functions,
adjust variable declarations, and convert JavaScript-specific features to Python equivalents.
Handle async/await, promises, and JavaScript objects appropriately.

JavaScript Code:
{source_code}

Python Code:"#;

    pub const TYPESCRIPT_TO_PYTHON: &'static str = r#"Convert the following TypeScript code to Python.
Maintain the same functionality and logic, but use Python syntax and idioms.
Convert console.log to print, TypeScript interfaces to Python classes or type hints,
remove type annotations, and adjust control structures to Python style.
Handle TypeScript-specific features like enums, generics, and decorators appropriately.

TypeScript Code:
{source_code}

Python Code:"#;

    pub const JAVA_TO_JAVASCRIPT: &'static str = r#"Convert the following Java code to JavaScript.
Maintain the same functionality and logic, but use JavaScript syntax and idioms.
Convert System.out.println to console.log, Java methods to JavaScript functions,
remove type declarations, and adjust control structures to JavaScript style.
Handle Java-specific features like interfaces, abstract classes, and generics appropriately.

Java Code:
{source_code}

JavaScript Code:"#;

    pub const JAVASCRIPT_TO_JAVA: &'static str = r#"Convert the following JavaScript code to Java.
Maintain the same functionality and logic, but use Java syntax and idioms.
Convert console.log to System.out.println, JavaScript functions to Java methods,
add proper class structure, and adjust variable declarations and control structures.
Handle JavaScript-specific features like async/await, promises, and objects appropriately.

JavaScript Code:
{source_code}

Java Code:"#;

    /// Template used for a conversion type
    pub fn for_conversion(conversion_type: ConversionType) -> Self {
        let template = match conversion_type {
            ConversionType::CToPython => Self::C_TO_PYTHON,
            ConversionType::PythonToJavascript => Self::PYTHON_TO_JAVASCRIPT,
            ConversionType::PythonToJava => Self::PYTHON_TO_JAVA,
            ConversionType::JavaToPython => Self::JAVA_TO_PYTHON,
            ConversionType::JavascriptToPython => Self::JAVASCRIPT_TO_PYTHON,
            ConversionType::TypescriptToPython => Self::TYPESCRIPT_TO_PYTHON,
            ConversionType::JavaToJavascript => Self::JAVA_TO_JAVASCRIPT,
            ConversionType::JavascriptToJava => Self::JAVASCRIPT_TO_JAVA,
        };
        Self { template }
    }

    /// Render the template with the file's source code
    pub fn render(&self, source_code: &str) -> String {
        self.template.replace("{source_code}", source_code)
    }
}

/// Fill the language placeholders of a configured system prompt
pub fn render_system_prompt(template: &str, conversion_type: ConversionType) -> String {
    template
        .replace(
            "{source_language}",
            conversion_type.source_language().display_name(),
        )
        .replace(
            "{target_language}",
            conversion_type.target_language().display_name(),
        )
}
