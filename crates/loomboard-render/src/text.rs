//! Estimate-based text layout.
//!
//! Real glyph measurement belongs to the host's text stack; the scene only
//! needs line breaks that agree with the core's sizing estimates, so both
//! use the same average-width factors.

use loomboard_core::block::{CHAR_WIDTH_FACTOR, LINE_HEIGHT_FACTOR};

/// Interior padding between a block edge and its text, world units.
pub const TEXT_PADDING: f64 = 8.0;

/// Vertical advance per wrapped line.
pub fn line_height(font_size: f64) -> f64 {
    font_size * LINE_HEIGHT_FACTOR
}

/// Greedy word wrap against an estimated average character width.
///
/// Explicit newlines always break; words longer than a full line are hard
/// broken. Always returns at least one (possibly empty) line.
pub fn wrap_text(text: &str, max_width: f64, font_size: f64) -> Vec<String> {
    let char_width = font_size * CHAR_WIDTH_FACTOR;
    let max_chars = if char_width > 0.0 {
        ((max_width / char_width).floor() as usize).max(1)
    } else {
        1
    };

    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        wrap_paragraph(paragraph, max_chars, &mut lines);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

fn wrap_paragraph(paragraph: &str, max_chars: usize, lines: &mut Vec<String>) {
    if paragraph.trim().is_empty() {
        lines.push(String::new());
        return;
    }

    let mut current = String::new();
    for word in paragraph.split_whitespace() {
        let word_len = word.chars().count();
        if current.is_empty() {
            if word_len <= max_chars {
                current.push_str(word);
            } else {
                hard_break(word, max_chars, lines, &mut current);
            }
        } else if current.chars().count() + 1 + word_len <= max_chars {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            if word_len <= max_chars {
                current.push_str(word);
            } else {
                hard_break(word, max_chars, lines, &mut current);
            }
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
}

/// Split an over-long word into full lines, leaving the tail as the new
/// current line.
fn hard_break(word: &str, max_chars: usize, lines: &mut Vec<String>, current: &mut String) {
    let chars: Vec<char> = word.chars().collect();
    let mut start = 0;
    while chars.len() - start > max_chars {
        lines.push(chars[start..start + max_chars].iter().collect());
        start += max_chars;
    }
    *current = chars[start..].iter().collect();
}
