use chrono::{DateTime, Utc};

const RULE_WIDTH: usize = 60;

pub fn header(text: &str) {
    println!("{}", render_header(text));
}

pub fn success(text: impl AsRef<str>) {
    println!("[OK] {}", text.as_ref());
}

pub fn info(text: impl AsRef<str>) {
    println!("[INFO] {}", text.as_ref());
}

pub fn warn(text: impl AsRef<str>) {
    println!("  [WARN] {}", text.as_ref());
}

pub fn error(text: impl AsRef<str>) {
    eprintln!("[ERROR] {}", text.as_ref());
}

pub fn table(headers: &[&str], rows: &[Vec<String>]) {
    print!("{}", render_table(headers, rows));
}

pub fn render_header(text: &str) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    format!("\n{rule}\n  {text}\n{rule}\n")
}

/// Left-aligned columns separated by ` | `, with a `-+-` rule under the
/// header. Widths are measured in characters.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(widths.len()) {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let pad = |cell: &str, width: usize| {
        let len = cell.chars().count();
        format!("{}{}", cell, " ".repeat(width.saturating_sub(len)))
    };

    let mut out = String::new();
    let header_line: Vec<String> = headers
        .iter()
        .zip(&widths)
        .map(|(h, w)| pad(h, *w))
        .collect();
    out.push_str(header_line.join(" | ").trim_end());
    out.push('\n');

    let separator: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&separator.join("-+-"));
    out.push('\n');

    for row in rows {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, w)| pad(cell, *w))
            .collect();
        out.push_str(line.join(" | ").trim_end());
        out.push('\n');
    }
    out
}

pub fn timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// First `max` characters of `text`.
pub fn truncate(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

pub fn or_dash(value: Option<&str>) -> String {
    value.unwrap_or("-").to_string()
}
