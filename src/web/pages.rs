/*!
 * Server-rendered HTML pages.
 */

use crate::conversion::analysis::{ProjectAnalysis, ProjectMetrics};
use crate::conversion::guidance::NextSteps;
use crate::conversion::ConversionType;
use crate::database::models::{HistoryRecord, UserRecord};
use crate::session::ConversionSession;

const STYLE: &str = r#"
body { font-family: sans-serif; max-width: 960px; margin: 2rem auto; padding: 0 1rem; color: #222; }
nav { display: flex; gap: 1rem; border-bottom: 1px solid #ddd; padding-bottom: .5rem; margin-bottom: 1.5rem; }
nav .user { margin-left: auto; }
table { border-collapse: collapse; width: 100%; }
th, td { border: 1px solid #ddd; padding: .4rem .6rem; text-align: left; vertical-align: top; }
.success { color: #1a7f37; }
.error { color: #cf222e; }
.notice { background: #eef6ee; padding: .5rem; }
.alert { background: #fdecea; padding: .5rem; }
pre { background: #f6f8fa; padding: .5rem; overflow-x: auto; max-height: 20rem; }
"#;

/// Escape text for HTML element content and attribute values
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn layout(title: &str, user: Option<&UserRecord>, body: &str) -> String {
    let account = match user {
        Some(user) => format!(
            r#"<span class="user">{}</span><a href="/history">History</a><a href="/logout">Log out</a>"#,
            escape_html(&user.username)
        ),
        None => r#"<span class="user"></span><a href="/login">Log in</a><a href="/register">Register</a>"#.to_string(),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title} - codeconv</title>
<style>{STYLE}</style>
</head>
<body>
<nav><a href="/"><strong>codeconv</strong></a>{account}</nav>
{body}
</body>
</html>
"#,
        title = escape_html(title),
        account = account,
        body = body,
    )
}

fn list(items: &[String]) -> String {
    if items.is_empty() {
        return String::new();
    }
    let entries: String = items
        .iter()
        .map(|item| format!("<li>{}</li>", escape_html(item)))
        .collect();
    format!("<ul>{}</ul>", entries)
}

/// Upload form
pub fn index_page(user: Option<&UserRecord>) -> String {
    let options: String = ConversionType::ALL
        .iter()
        .map(|ct| {
            let selected = if *ct == ConversionType::CToPython { " selected" } else { "" };
            format!(r#"<option value="{}"{}>{}</option>"#, ct.as_str(), selected, escape_html(&ct.label()))
        })
        .collect();

    let body = format!(
        r#"<h1>Convert a project</h1>
<p>Upload a zip archive of your project and pick the conversion.</p>
<form id="upload-form" action="/upload" method="post" enctype="multipart/form-data">
<p><label>Project archive <input type="file" name="project_file" accept=".zip" required></label></p>
<p><label>Conversion <select name="conversion_type">{options}</select></label></p>
<p><label>Converter <select name="use_ai">
<option value="true" selected>AI model, rules as fallback</option>
<option value="false">Rules only</option>
</select></label></p>
<p><button type="submit">Convert</button></p>
</form>
<p id="status"></p>
<script>
document.getElementById('upload-form').addEventListener('submit', async (event) => {{
  event.preventDefault();
  const status = document.getElementById('status');
  status.textContent = 'Converting...';
  const response = await fetch('/upload', {{ method: 'POST', body: new FormData(event.target) }});
  const data = await response.json().catch(() => ({{ success: false, error: response.statusText }}));
  if (data.success) {{
    window.location = '/results/' + data.session_id;
  }} else {{
    status.textContent = 'Conversion failed: ' + data.error;
    status.className = 'alert';
  }}
}});
</script>
"#,
        options = options,
    );

    layout("Convert", user, &body)
}

fn next_steps_section(steps: &NextSteps) -> String {
    format!(
        r#"<h2>Next steps</h2>
{what}
<h3>Important notes</h3>
{notes}
<h3>Review the code</h3>
{review}
<h3>Test the project</h3>
{test}
<h3>Security</h3>
{security}
<h3>About this conversion</h3>
{specific}
"#,
        what = list(&steps.what_to_do),
        notes = list(&steps.important_notes),
        review = list(&steps.detailed_guidance.review_code),
        test = list(&steps.detailed_guidance.test_project),
        security = list(&steps.detailed_guidance.security_considerations),
        specific = list(&steps.conversion_specific_notes),
    )
}

fn metrics_row(side: &str, metrics: &ProjectMetrics, risk_score: u32, findings: usize) -> String {
    format!(
        "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
        side,
        metrics.files_analyzed,
        metrics.total_lines,
        metrics.total_complexity,
        metrics.functions,
        metrics.max_nesting_depth,
        findings,
        risk_score,
    )
}

fn analysis_section(analysis: &ProjectAnalysis) -> String {
    let findings: Vec<String> = analysis
        .source_security
        .findings
        .iter()
        .chain(&analysis.target_security.findings)
        .map(|f| {
            format!(
                "{}:{}:{} [{}] {} ({}). {}",
                f.file, f.line, f.column, f.severity, f.description, f.code, f.mitigation
            )
        })
        .collect();

    let security = if findings.is_empty() {
        "<p>No vulnerability patterns found.</p>".to_string()
    } else {
        list(&findings)
    };

    format!(
        r#"<h2>Project analysis</h2>
<table>
<tr><th></th><th>Files</th><th>Lines</th><th>Complexity</th><th>Functions</th><th>Nesting</th><th>Findings</th><th>Risk score</th></tr>
{source}
{target}
</table>
<h3>Recommendations</h3>
{recommendations}
<h3>Security scan</h3>
{security}
{improvements}
"#,
        source = metrics_row(
            "Source",
            &analysis.source,
            analysis.source_security.risk_score,
            analysis.source_security.findings.len()
        ),
        target = metrics_row(
            "Converted",
            &analysis.target,
            analysis.target_security.risk_score,
            analysis.target_security.findings.len()
        ),
        recommendations = list(&analysis.recommendations),
        security = security,
        improvements = list(&analysis.security_improvements),
    )
}

/// Results of one conversion session
pub fn results_page(session: &ConversionSession, user: Option<&UserRecord>) -> String {
    let report = &session.report;

    let rows: String = report
        .files_converted
        .iter()
        .map(|record| {
            let source = match &record.model {
                Some(model) => format!("AI ({})", escape_html(model)),
                None => "rules".to_string(),
            };
            format!(
                r#"<tr><td>{}</td><td>{}</td><td class="{status}">{status}</td><td>{}</td><td>{}</td></tr>"#,
                escape_html(&record.source),
                escape_html(&record.target),
                source,
                list(&record.warnings),
                status = record.status,
            )
        })
        .collect();

    let errors = if report.errors.is_empty() {
        String::new()
    } else {
        let items: Vec<String> = report
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.file, e.error))
            .collect();
        format!(r#"<h2 class="error">Errors</h2>{}"#, list(&items))
    };

    let warnings = if report.warnings.is_empty() {
        String::new()
    } else {
        format!("<h2>Warnings</h2>{}", list(&report.warnings))
    };

    let manifests = if report.manifests.is_empty() {
        String::new()
    } else {
        format!("<h2>Generated project files</h2>{}", list(&report.manifests))
    };

    let next_steps = report
        .next_steps
        .as_ref()
        .map(next_steps_section)
        .unwrap_or_default();

    let analysis = report
        .analysis
        .as_ref()
        .map(analysis_section)
        .unwrap_or_default();

    let body = format!(
        r#"<h1>{label}</h1>
<p>Session <code>{id}</code>, {created}. {successes} converted, {failures} failed. AI {ai}.</p>
<p><a href="/download/{id}">Download converted project</a></p>
<table>
<tr><th>Source</th><th>Target</th><th>Status</th><th>Converted by</th><th>Warnings</th></tr>
{rows}
</table>
{errors}{warnings}{manifests}{analysis}{next_steps}"#,
        label = escape_html(&session.conversion_type.label()),
        id = escape_html(&session.id),
        created = escape_html(&session.created_at),
        successes = session.success_count(),
        failures = session.error_count(),
        ai = if session.ai_used { "enabled" } else { "disabled" },
        rows = rows,
        errors = errors,
        warnings = warnings,
        manifests = manifests,
        analysis = analysis,
        next_steps = next_steps,
    );

    layout("Results", user, &body)
}

pub fn login_page(error: Option<&str>, notice: Option<&str>) -> String {
    let mut body = String::from("<h1>Log in</h1>");
    if let Some(notice) = notice {
        body.push_str(&format!(r#"<p class="notice">{}</p>"#, escape_html(notice)));
    }
    if let Some(error) = error {
        body.push_str(&format!(r#"<p class="alert">{}</p>"#, escape_html(error)));
    }
    body.push_str(
        r#"<form action="/login" method="post">
<p><label>Username <input name="username" required></label></p>
<p><label>Password <input type="password" name="password" required></label></p>
<p><button type="submit">Log in</button></p>
</form>
<p>No account yet? <a href="/register">Register</a></p>"#,
    );
    layout("Log in", None, &body)
}

pub fn register_page(error: Option<&str>) -> String {
    let mut body = String::from("<h1>Register</h1>");
    if let Some(error) = error {
        body.push_str(&format!(r#"<p class="alert">{}</p>"#, escape_html(error)));
    }
    body.push_str(
        r#"<form action="/register" method="post">
<p><label>Username <input name="username" required></label></p>
<p><label>Email <input type="email" name="email" required></label></p>
<p><label>Password <input type="password" name="password" required></label></p>
<p><button type="submit">Register</button></p>
</form>"#,
    );
    layout("Register", None, &body)
}

/// Conversion history of a logged-in user
pub fn history_page(user: &UserRecord, entries: &[HistoryRecord]) -> String {
    let content = if entries.is_empty() {
        "<p>No conversions yet.</p>".to_string()
    } else {
        entries
            .iter()
            .map(|entry| {
                let session_link = entry
                    .session_id
                    .as_deref()
                    .map(|id| format!(r#" <a href="/results/{0}">session</a>"#, escape_html(id)))
                    .unwrap_or_default();
                let by = match &entry.model {
                    Some(model) => format!("AI ({})", escape_html(model)),
                    None => "rules".to_string(),
                };
                format!(
                    r#"<details>
<summary>{created}: {source} ({from}) to {target} ({to}), {ms} ms, by {by}{link}</summary>
<p>Output non-empty: {non_empty}. Delimiters balanced: {balanced}.</p>
<pre>{source_code}</pre>
<pre>{target_code}</pre>
</details>"#,
                    created = escape_html(&entry.created_at),
                    source = escape_html(&entry.source_path),
                    from = escape_html(&entry.source_language),
                    target = escape_html(&entry.target_path),
                    to = escape_html(&entry.target_language),
                    ms = entry.conversion_time_ms,
                    by = by,
                    link = session_link,
                    non_empty = entry.output_non_empty,
                    balanced = entry.delimiters_balanced,
                    source_code = escape_html(&entry.source_code),
                    target_code = escape_html(&entry.target_code),
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    let body = format!("<h1>Conversion history</h1>\n{}", content);
    layout("History", Some(user), &body)
}

pub fn not_found_page(message: &str) -> String {
    let body = format!(
        r#"<h1>Not found</h1><p class="alert">{}</p><p><a href="/">Back to the upload form</a></p>"#,
        escape_html(message)
    );
    layout("Not found", None, &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversion::analysis::{risk_score, scan_code, SecurityScan};
    use crate::conversion::ConversionReport;

    #[test]
    fn test_escapeHtml_shouldEscapeMarkup() {
        assert_eq!(escape_html(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }

    #[test]
    fn test_indexPage_shouldOfferEveryConversionType() {
        let page = index_page(None);
        for ct in ConversionType::ALL {
            assert!(page.contains(ct.as_str()));
        }
        assert!(page.contains(r#"name="project_file""#));
    }

    #[test]
    fn test_resultsPage_withAnalysis_shouldShowRiskAndFindings() {
        let findings = scan_code("el.innerHTML = '<b>' + name;\n", "ui.js");
        let analysis = ProjectAnalysis {
            source: ProjectMetrics {
                files_analyzed: 1,
                total_complexity: 42,
                ..Default::default()
            },
            source_security: SecurityScan {
                files_scanned: 1,
                risk_score: risk_score(&findings),
                findings,
            },
            recommendations: vec!["No test files found - recommend adding unit tests after conversion".to_string()],
            security_improvements: vec!["Reduced risk score from 7 to 0".to_string()],
            ..Default::default()
        };
        let session = ConversionSession {
            id: "abc".to_string(),
            user_id: None,
            conversion_type: ConversionType::JavascriptToPython,
            source_dir: "/src".to_string(),
            target_dir: "/out".to_string(),
            archive_path: None,
            ai_used: false,
            created_at: "2024-01-01 00:00:00".to_string(),
            report: ConversionReport {
                conversion_type: ConversionType::JavascriptToPython,
                source_dir: "/src".to_string(),
                target_dir: "/out".to_string(),
                files_converted: vec![],
                errors: vec![],
                warnings: vec![],
                manifests: vec![],
                ai_used: false,
                next_steps: None,
                analysis: Some(analysis),
            },
        };

        let page = results_page(&session, None);

        assert!(page.contains("<h2>Project analysis</h2>"));
        assert!(page.contains("<td>Source</td><td>1</td><td>0</td><td>42</td>"));
        assert!(page.contains("<td>1</td><td>7</td></tr>"));
        assert!(page.contains("ui.js:1:4 [high] Cross-site scripting vulnerability detected"));
        assert!(page.contains("Reduced risk score from 7 to 0"));
        assert!(page.contains("No test files found"));
    }

    #[test]
    fn test_loginPage_shouldEscapeError() {
        let page = login_page(Some("<bad>"), None);
        assert!(page.contains("&lt;bad&gt;"));
    }
}
