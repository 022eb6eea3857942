use chrono::{DateTime, Datelike, Utc};
use terminal_size::{terminal_size, Width};

use crate::confessions::{Confession, ConfessionPage};

const FALLBACK_WIDTH: usize = 80;
const MIN_WIDTH: usize = 20;

/// Short relative age of `at` as seen from `now`.
pub fn format_relative(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = (now - at).num_minutes();
    let hours = minutes.div_euclid(60);
    let days = hours.div_euclid(24);

    if minutes < 1 {
        return "Just now".to_string();
    }
    if minutes < 60 {
        return format!("{minutes}m ago");
    }
    if hours < 24 {
        return format!("{hours}h ago");
    }
    if days == 1 {
        return "Yesterday".to_string();
    }
    if days < 7 {
        return format!("{days}d ago");
    }
    if days < 14 {
        return "1w ago".to_string();
    }
    if at.year() != now.year() {
        at.format("%b %-d, %Y").to_string()
    } else {
        at.format("%b %-d").to_string()
    }
}

pub fn terminal_width() -> usize {
    match terminal_size() {
        Some((Width(w), _)) => (w as usize).saturating_sub(4).max(MIN_WIDTH),
        None => FALLBACK_WIDTH,
    }
}

/// Greedy word wrap. Words longer than `width` are split.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    for para in text.lines() {
        let mut line = String::new();
        let mut len = 0usize;
        for word in para.split_whitespace() {
            let mut chars: Vec<char> = word.chars().collect();
            while chars.len() > width {
                if len > 0 {
                    lines.push(std::mem::take(&mut line));
                    len = 0;
                }
                let rest = chars.split_off(width);
                lines.push(chars.into_iter().collect());
                chars = rest;
            }
            let wlen = chars.len();
            if len > 0 && len + 1 + wlen > width {
                lines.push(std::mem::take(&mut line));
                len = 0;
            }
            if len > 0 {
                line.push(' ');
                len += 1;
            }
            line.extend(chars);
            len += wlen;
        }
        lines.push(line);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// One confession as a block of lines: header, wrapped text, blank separator.
pub fn render_confession(c: &Confession, now: DateTime<Utc>, width: usize) -> String {
    let mut header = format!("#{}  {}", c.id, format_relative(c.created_at, now));
    if c.is_edited() {
        header.push_str("  (edited)");
    }
    let mut out = header;
    out.push('\n');
    for line in wrap_text(&c.text, width.saturating_sub(2)) {
        out.push_str("  ");
        out.push_str(&line);
        out.push('\n');
    }
    out
}

pub fn render_page(page: &ConfessionPage, now: DateTime<Utc>, width: usize) -> String {
    if page.confessions.is_empty() {
        return if page.total_items == 0 {
            "No confessions yet.\n".to_string()
        } else {
            format!("Nothing on page {} (last page is {}).\n", page.page, page.total_pages)
        };
    }
    let mut out = String::new();
    for c in &page.confessions {
        out.push_str(&render_confession(c, now, width));
        out.push('\n');
    }
    out.push_str(&format!(
        "page {} of {}, {} confession{}\n",
        page.page,
        page.total_pages,
        page.total_items,
        if page.total_items == 1 { "" } else { "s" }
    ));
    out
}
