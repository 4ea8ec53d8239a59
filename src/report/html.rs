use crate::snapshot::Health;

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

pub fn progress_width(percent: f64) -> f64 {
    if percent.is_nan() {
        return 0.0;
    }
    percent.clamp(0.0, 100.0)
}

pub fn status_class(health: Health) -> String {
    format!("status-{}", health.as_str())
}

pub fn progress_bar(percent: f64, health: Health) -> String {
    format!(
        r#"<div class="progress-bar"><div class="progress-fill progress-{}" style="width: {:.1}%"></div></div>"#,
        health.as_str(),
        progress_width(percent)
    )
}

pub fn section_title(title: &str) -> String {
    format!(r#"<h2 class="section-title">{}</h2>"#, escape(title))
}

pub fn placeholder(text: &str) -> String {
    format!(r#"<p class="placeholder">{}</p>"#, escape(text))
}

pub fn unavailable(group: &str, error: &str) -> String {
    format!(
        r#"<div class="alert alert-danger"><strong>{} metrics unavailable:</strong> {}</div>"#,
        escape(group),
        escape(error)
    )
}

// `<table>` with a header row. Cells are inserted as-is, callers escape them.
pub fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 4);
    lines.push(r#"<table class="table">"#.to_string());
    let head: String = headers
        .iter()
        .map(|h| format!("<th>{}</th>", escape(h)))
        .collect();
    lines.push(format!("<thead><tr>{head}</tr></thead>"));
    lines.push("<tbody>".to_string());
    for row in rows {
        let cells: String = row.iter().map(|c| format!("<td>{c}</td>")).collect();
        lines.push(format!("<tr>{cells}</tr>"));
    }
    lines.push("</tbody></table>".to_string());
    lines.join("\n")
}

pub fn card(title: &str, body: &str) -> String {
    format!(
        "<div class=\"metric-card\">\n<h3>{}</h3>\n{}\n</div>",
        escape(title),
        body
    )
}

pub fn grid(cards: &[String]) -> String {
    format!("<div class=\"metrics-grid\">\n{}\n</div>", cards.join("\n"))
}
