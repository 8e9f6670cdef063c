//! HTML result page generator.
//!
//! Produces a self-contained HTML file with all CSS inlined.

use anyhow::Result;
use std::path::Path;

use exam_engine_core::model::Exam;
use exam_engine_core::record::ExamRecord;
use exam_engine_core::timer::format_time;

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Generate the result page for an archived attempt.
///
/// With the exam definition at hand, the detail table shows each prompt and
/// marks graded answers right or wrong; without it, only the raw answers are
/// listed.
pub fn generate_html(record: &ExamRecord, exam: Option<&Exam>) -> String {
    let mut html = String::new();
    let (headline, answered) = record.score.summary(&record.title, record.question_count);

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>Results — {}</title>\n",
        html_escape(&record.title)
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str(&format!("<h1>{}</h1>\n", html_escape(&record.title)));
    if !record.description.is_empty() {
        html.push_str(&format!(
            "<p class=\"meta\">{}</p>\n",
            html_escape(&record.description)
        ));
    }
    html.push_str(&format!(
        "<p class=\"meta\">{} | {} of {} used | {}</p>\n",
        record.status,
        format_time(record.time_used_secs),
        format_time(record.time_limit_secs),
        record.completed_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</header>\n");

    // Score card
    html.push_str("<section class=\"score\">\n");
    html.push_str(&format!(
        "<div class=\"percentage {}\">{}%</div>\n",
        score_class(record.score.percentage),
        record.score.percentage
    ));
    html.push_str(&format!("<p>{}</p>\n", html_escape(&headline)));
    html.push_str(&format!("<p class=\"meta\">{answered}</p>\n"));
    html.push_str(&format!(
        "<p class=\"meta\">{} of {} graded questions correct</p>\n",
        record.score.correct_count, record.score.total_graded
    ));
    html.push_str("</section>\n");

    // Answers
    html.push_str("<section class=\"answers\">\n");
    html.push_str("<h2>Answers</h2>\n");
    html.push_str("<table>\n");
    match exam {
        Some(exam) => {
            html.push_str("<thead><tr><th>#</th><th>Question</th><th>Answer</th><th>Result</th></tr></thead>\n<tbody>\n");
            for (i, q) in exam.questions.iter().enumerate() {
                let answer = record.answers.get(&q.id);
                let (class, verdict) = match (&q.correct_answer, answer) {
                    _ if !q.is_gradable() => ("", "not graded"),
                    (_, None) => ("fail", "unanswered"),
                    (Some(expected), Some(given)) if expected == given => ("pass", "correct"),
                    _ => ("fail", "incorrect"),
                };
                html.push_str(&format!(
                    "<tr class=\"{}\"><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                    class,
                    i + 1,
                    html_escape(&q.prompt),
                    answer.map(|a| html_escape(a)).unwrap_or_else(|| "-".into()),
                    verdict
                ));
            }
        }
        None => {
            html.push_str("<thead><tr><th>Question id</th><th>Answer</th></tr></thead>\n<tbody>\n");
            for (id, answer) in &record.answers {
                html.push_str(&format!(
                    "<tr><td>{}</td><td>{}</td></tr>\n",
                    html_escape(id),
                    html_escape(answer)
                ));
            }
        }
    }
    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    // Raw JSON
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(&html_escape(
        &serde_json::to_string_pretty(record).unwrap_or_default(),
    ));
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write the result page to a file.
pub fn write_html_report(record: &ExamRecord, exam: Option<&Exam>, path: &Path) -> Result<()> {
    let html = generate_html(record, exam);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)?;
    Ok(())
}

fn score_class(percentage: u32) -> &'static str {
    if percentage >= 80 {
        "high"
    } else if percentage >= 50 {
        "mid"
    } else {
        "low"
    }
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --pass: #dcfce7; --fail: #fde2e2; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --pass: #064e3b; --fail: #7f1d1d; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0 auto; max-width: 48rem; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: #6b7280; }
.score { text-align: center; margin: 2rem 0; }
.percentage { font-size: 4rem; font-weight: bold; }
.high { color: #22c55e; }
.mid { color: #eab308; }
.low { color: #ef4444; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); }
.pass { background: var(--pass); }
.fail { background: var(--fail); }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
"#;
