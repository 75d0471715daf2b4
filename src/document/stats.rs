//! Text statistics for the status bar
//!
//! Word, character, paragraph, and line counts over the document body
//! (front matter excluded by the caller).

/// Aggregate counts for a piece of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextStats {
    /// Whitespace-separated words
    pub words: usize,
    /// Characters (Unicode scalar values, not bytes)
    pub chars: usize,
    /// Non-empty blocks separated by blank lines
    pub paragraphs: usize,
    /// Total lines
    pub lines: usize,
}

impl TextStats {
    /// Compute statistics for `text`.
    pub fn of(text: &str) -> Self {
        if text.trim().is_empty() {
            return Self::default();
        }

        let words = text.split_whitespace().count();
        let chars = text.chars().count();
        let paragraphs = text
            .split("\n\n")
            .filter(|p| !p.trim().is_empty())
            .count();
        let lines = text.lines().count();

        Self {
            words,
            chars,
            paragraphs,
            lines,
        }
    }

    /// Rough reading time in minutes, floored at one minute.
    pub fn read_time_minutes(&self) -> u32 {
        // 200 wpm is the usual prose estimate
        ((self.words as u32).div_ceil(200)).max(1)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text() {
        let stats = TextStats::of("");
        assert_eq!(stats, TextStats::default());
        assert_eq!(TextStats::of("   \n\n  "), TextStats::default());
    }

    #[test]
    fn test_basic_counts() {
        let stats = TextStats::of("# Title\n\nHello brave new world.\n");
        assert_eq!(stats.words, 6);
        assert_eq!(stats.paragraphs, 2);
        assert_eq!(stats.lines, 3);
    }

    #[test]
    fn test_char_count_is_scalar_values() {
        let stats = TextStats::of("æøå");
        assert_eq!(stats.chars, 3);
    }

    #[test]
    fn test_read_time_minimum_one_minute() {
        assert_eq!(TextStats::of("just a few words").read_time_minutes(), 1);
    }
}
