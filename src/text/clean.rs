//! Cleanup of rendered page text before chunking

use regex::Regex;

/// Regex-based cleaner for text rendered out of PDF pages.
///
/// Collapses blank-line runs and horizontal whitespace, drops standalone
/// page-number lines and control characters, normalizes bullets, and fixes
/// missing spaces after sentence punctuation.
pub struct TextCleaner {
    blank_lines: Regex,
    horizontal_space: Regex,
    number_line: Regex,
    control_chars: Regex,
    bullet: Regex,
    sentence_gap: Regex,
}

impl TextCleaner {
    pub fn new() -> Self {
        Self {
            blank_lines: Regex::new(r"\n\s*\n\s*\n+").expect("static pattern"),
            horizontal_space: Regex::new(r"[ \t]+").expect("static pattern"),
            number_line: Regex::new(r"\n\d+\n").expect("static pattern"),
            control_chars: Regex::new(r"[\x00-\x08\x0B\x0C\x0E-\x1F\x7F\u{80}-\u{9F}]")
                .expect("static pattern"),
            bullet: Regex::new(r"\u{2022}\s*").expect("static pattern"),
            sentence_gap: Regex::new(r"([.!?])\s*([A-Z])").expect("static pattern"),
        }
    }

    /// Clean one page of extracted text.
    pub fn clean(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }

        let text = self.blank_lines.replace_all(text, "\n\n");
        let text = self.horizontal_space.replace_all(&text, " ");
        let text = self.number_line.replace_all(&text, "\n");
        let text = self.control_chars.replace_all(&text, "");
        let text = self.bullet.replace_all(&text, "\u{2022} ");
        let text = self.sentence_gap.replace_all(&text, "$1 $2");

        text.trim().to_string()
    }
}

impl Default for TextCleaner {
    fn default() -> Self {
        Self::new()
    }
}
