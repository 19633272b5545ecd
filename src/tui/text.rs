//! Shared text formatting helpers used by the live log.

use crate::tui::settings::TRUNCATION_SUFFIX;

/// Count visible character width (single-cell approximation).
pub fn visible_width(s: &str) -> usize {
    s.chars().count()
}

/// Fit `s` into exactly `width` cells: truncate with `...` or pad with spaces.
pub fn fit_to_width(s: &str, width: usize) -> String {
    let flat: String = s.chars().map(|c| if c == '\n' { ' ' } else { c }).collect();
    let len = visible_width(&flat);
    if len > width {
        let suffix_len = visible_width(TRUNCATION_SUFFIX);
        if width <= suffix_len {
            return flat.chars().take(width).collect();
        }
        let mut out: String = flat.chars().take(width - suffix_len).collect();
        out.push_str(TRUNCATION_SUFFIX);
        return out;
    }
    let mut out = flat;
    out.extend(std::iter::repeat(' ').take(width - len));
    out
}

/// Soft-wrap `text` so no line exceeds `max_width` cells.
///
/// Breaks on whitespace when possible and hard-wraps longer words.
pub fn wrap_soft(text: &str, max_width: usize) -> Vec<String> {
    let max_width = max_width.max(1);
    let mut out = Vec::new();
    for line in text.lines() {
        if line.is_empty() {
            out.push(String::new());
            continue;
        }
        let mut current = String::new();
        for word in line.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            loop {
                let current_len = visible_width(&current);
                let needed = if current.is_empty() {
                    word.len()
                } else {
                    current_len + 1 + word.len()
                };
                if needed <= max_width {
                    if !current.is_empty() {
                        current.push(' ');
                    }
                    current.extend(word.iter());
                    break;
                }
                if !current.is_empty() {
                    out.push(std::mem::take(&mut current));
                    continue;
                }
                let rest = word.split_off(max_width);
                out.push(word.into_iter().collect());
                word = rest;
            }
        }
        out.push(current);
    }
    out
}

/// Prefix the first line with `prefix` and indent the rest to line up under it.
pub fn indent_lines(lines: &[String], prefix: &str) -> Vec<String> {
    let spaces = " ".repeat(visible_width(prefix));
    lines
        .iter()
        .enumerate()
        .map(|(idx, line)| {
            if idx == 0 {
                format!("{prefix}{line}")
            } else {
                format!("{spaces}{line}")
            }
        })
        .collect()
}
