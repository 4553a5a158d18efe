/*!
 * Target-language project manifests.
 *
 * After the sources are converted the output directory gets the minimal
 * files a developer expects for the target ecosystem: a dependency list and
 * a README for Python, `package.json` for JavaScript, `pom.xml` for Java.
 */

use anyhow::{Context, Result};
use log::debug;
use serde_json::json;
use std::path::Path;

use super::{ConversionType, Language};
use crate::file_utils::FileManager;

const REQUIREMENTS_TXT: &str =
    "# Python dependencies for converted project\n# Add your project dependencies here\n";

fn python_readme(source: &str) -> String {
    format!(
        r#"# Python Project (Converted from {source})

This project was automatically converted from {source} to Python.

## Setup
```bash
pip install -r requirements.txt
```

## Usage
Run the main script:
```bash
python main.py
```

## Notes
- This is an automated conversion and may require manual adjustments
- Review the converted code for Python-specific optimizations
- Consider using Python libraries for better performance
"#
    )
}

fn javascript_readme(source: &str) -> String {
    format!(
        r#"# JavaScript Project (Converted from {source})

This project was automatically converted from {source} to JavaScript.

## Setup
```bash
npm install
```

## Usage
Run the main script:
```bash
npm start
```

## Notes
- This is an automated conversion and may require manual adjustments
- Review the converted code for JavaScript-specific optimizations
- Consider using modern JavaScript features (ES6+) for better code
"#
    )
}

fn java_readme(source: &str) -> String {
    format!(
        r#"# Java Project (Converted from {source})

This project was automatically converted from {source} to Java.

## Setup
```bash
# Using Maven
mvn compile
mvn exec:java -Dexec.mainClass="Main"

# Using Java directly
javac *.java
java Main
```

## Notes
- This is an automated conversion and may require manual adjustments
- Review the converted code for Java-specific optimizations
- Consider using Java libraries and frameworks for better functionality
- Add proper exception handling and type safety
"#
    )
}

fn package_json(source: &str) -> Result<String> {
    let manifest = json!({
        "name": "converted-project",
        "version": "1.0.0",
        "description": format!("JavaScript project converted from {}", source),
        "main": "index.js",
        "scripts": {
            "start": "node index.js",
            "test": "echo \"Error: no test specified\" && exit 1"
        },
        "keywords": [],
        "author": "",
        "license": "ISC"
    });
    serde_json::to_string_pretty(&manifest).context("Failed to serialize package.json")
}

fn pom_xml(source: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<project xmlns="http://maven.apache.org/POM/4.0.0"
         xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
         xsi:schemaLocation="http://maven.apache.org/POM/4.0.0
         http://maven.apache.org/xsd/maven-4.0.0.xsd">
    <modelVersion>4.0.0</modelVersion>

    <groupId>com.converted</groupId>
    <artifactId>converted-project</artifactId>
    <version>1.0.0</version>
    <packaging>jar</packaging>

    <name>Converted Project</name>
    <description>Java project converted from {source}</description>

    <properties>
        <maven.compiler.source>11</maven.compiler.source>
        <maven.compiler.target>11</maven.compiler.target>
        <project.build.sourceEncoding>UTF-8</project.build.sourceEncoding>
    </properties>

    <dependencies>
        <!-- Add your dependencies here -->
    </dependencies>

    <build>
        <plugins>
            <plugin>
                <groupId>org.apache.maven.plugins</groupId>
                <artifactId>maven-compiler-plugin</artifactId>
                <version>3.8.1</version>
                <configuration>
                    <source>11</source>
                    <target>11</target>
                </configuration>
            </plugin>
        </plugins>
    </build>
</project>
"#
    )
}

/// Write the manifests of the conversion's target language into `target_dir`
///
/// # Returns
/// * `Result<Vec<String>>` - File names written, in a fixed order
pub fn write_manifests(target_dir: &Path, conversion_type: ConversionType) -> Result<Vec<String>> {
    let source = conversion_type.source_language().display_name();

    let files: Vec<(&str, String)> = match conversion_type.target_language() {
        Language::Python => vec![
            ("requirements.txt", REQUIREMENTS_TXT.to_string()),
            ("README.md", python_readme(source)),
        ],
        Language::JavaScript => vec![
            ("package.json", package_json(source)?),
            ("README.md", javascript_readme(source)),
        ],
        Language::Java => vec![
            ("pom.xml", pom_xml(source)),
            ("README.md", java_readme(source)),
        ],
        Language::C | Language::TypeScript => Vec::new(),
    };

    let mut written = Vec::with_capacity(files.len());
    for (name, content) in files {
        FileManager::write_to_file(target_dir.join(name), &content)
            .with_context(|| format!("Failed to write manifest {}", name))?;
        debug!("Wrote manifest {}", name);
        written.push(name.to_string());
    }

    Ok(written)
}
