//! Two-column note list layout (name | modified), ANSI aware.

/// Render rows of `(name, modified)` already colored. The name column
/// shrinks to fit `max_width` when given.
pub fn render_list(
    headers: (&str, &str),
    rows: &[(String, String)],
    max_width: Option<usize>,
) -> String {
    let time_width = rows
        .iter()
        .map(|(_, t)| display_len(t))
        .chain(std::iter::once(display_len(headers.1)))
        .max()
        .unwrap_or(0);
    let mut name_width = rows
        .iter()
        .map(|(n, _)| display_len(n))
        .chain(std::iter::once(display_len(headers.0)))
        .max()
        .unwrap_or(0);
    if let Some(max) = max_width {
        let budget = max.saturating_sub(time_width + 3).max(display_len(headers.0));
        name_width = name_width.min(budget);
    }

    let mut out = format_row(headers.0, headers.1, name_width);
    out.push('\n');
    out.push_str(&"=".repeat(name_width + 3 + time_width));
    for (name, time) in rows {
        out.push('\n');
        out.push_str(&format_row(name, time, name_width));
    }
    out
}

fn format_row(name: &str, time: &str, name_width: usize) -> String {
    let name = if display_len(name) > name_width {
        truncate_with_ellipsis(&strip_ansi(name), name_width)
    } else {
        name.to_string()
    };
    let padding = name_width.saturating_sub(display_len(&name));
    format!("{name}{} | {time}", " ".repeat(padding))
}

/// Truncate text to a width, appending an ellipsis when needed.
pub fn truncate_with_ellipsis(text: &str, max_width: usize) -> String {
    if max_width == 0 {
        return String::new();
    }
    if text.chars().count() <= max_width {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_width - 1).collect();
    out.push('…');
    out
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::new();
    let mut chars = s.chars();
    while let Some(ch) = chars.next() {
        if ch == '\x1b' {
            for next in chars.by_ref() {
                if next == 'm' {
                    break;
                }
            }
            continue;
        }
        out.push(ch);
    }
    out
}

/// Visible length, ignoring ANSI escape sequences.
pub fn display_len(s: &str) -> usize {
    strip_ansi(s).chars().count()
}
