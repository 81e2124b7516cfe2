//! Inline flow: whitespace collapsing and word wrap.
//!
//! [CSS Text Level 3 § 4.1.1 Phase I: Collapsing and Transformation](https://www.w3.org/TR/css-text-3/#white-space-phase-1)
//!
//! "Any sequence of collapsible spaces and tabs immediately preceding or
//! following a segment break is removed." ... "Every collapsible tab is
//! converted to a collapsible space." ... "Any collapsible space immediately
//! following another collapsible space is collapsed to have zero advance
//! width."
//!
//! [§ 5 Line Breaking and Word Boundaries](https://www.w3.org/TR/css-text-3/#line-breaking)
//!
//! "When inline-level content is laid out into lines, it is broken across
//! line boxes. Such breaks are called line breaks."
//!
//! Text arrives one leaf at a time. Each whitespace-separated word is
//! appended with a single space in front of it; after each word the current
//! line is folded while it is wider than the target width.

use crate::breaking::{LineBreakRules, find_break};
use crate::buffer::TextBuffer;
use crate::metrics::text_width;
use crate::state::{FlowKind, FoldMode, RenderState};

/// Writes text into a buffer according to the render state.
pub struct InlineFlow<'a> {
    buf: &'a mut TextBuffer,
    state: &'a mut RenderState,
    rules: &'a dyn LineBreakRules,
}

impl<'a> InlineFlow<'a> {
    /// Borrow the pieces a flow needs.
    pub fn new(buf: &'a mut TextBuffer, state: &'a mut RenderState, rules: &'a dyn LineBreakRules) -> Self {
        Self { buf, state, rules }
    }

    /// Append one text leaf.
    pub fn insert(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let blank = text.chars().all(char::is_whitespace);
        if self.state.kind == FlowKind::Image && !blank && !self.buf.at_line_start() {
            self.buf.newline();
        }

        if self.state.fold == FoldMode::Verbatim {
            self.insert_verbatim(text);
        } else {
            self.insert_wrapped(text);
        }

        if !blank {
            self.state.kind = FlowKind::Text;
        }
    }

    fn insert_wrapped(&mut self, text: &str) {
        let mut space_before = text.starts_with(char::is_whitespace);
        for word in text.split_whitespace() {
            self.place_word(word, space_before);
            space_before = true;
        }
        if text.ends_with(char::is_whitespace) {
            self.push_space();
        }
    }

    fn insert_verbatim(&mut self, text: &str) {
        for (i, segment) in text.split('\n').enumerate() {
            if i > 0 {
                self.buf.push('\n');
            }
            if segment.is_empty() {
                continue;
            }
            self.indent();
            self.buf.push_str(segment);
        }
    }

    /// Write the indentation if nothing is on the current line yet.
    fn indent(&mut self) {
        if self.state.indentation > 0 && self.buf.current_line().is_empty() {
            self.buf.push_str(&" ".repeat(self.state.indentation));
        }
    }

    /// One space, unless at the start of a line or after another space.
    fn push_space(&mut self) {
        if self.buf.at_line_start()
            || self.buf.column() <= self.state.indentation
            || self.buf.last_char() == Some(' ')
        {
            return;
        }
        self.buf.push(' ');
    }

    fn place_word(&mut self, word: &str, space_before: bool) {
        self.indent();
        if space_before {
            self.push_space();
        }
        if word.chars().next().is_some_and(|first| self.space_unwanted_before(first)) {
            self.drop_trailing_space();
        }
        self.buf.push_str(word);
        self.fold_line();
    }

    /// Whether the space just written should go again because of the
    /// characters on either side of it.
    fn space_unwanted_before(&self, next: char) -> bool {
        let line = self.buf.current_line();
        let Some(before_space) = line.strip_suffix(' ') else {
            return false;
        };
        if text_width(before_space) <= self.state.indentation {
            return false;
        }
        let Some(prev) = before_space.chars().next_back() else {
            return false;
        };
        let rules = self.rules;
        (rules.needs_no_space(prev) && rules.needs_no_space(next))
            || (rules.is_breakable(prev) && rules.must_not_end_line(prev))
            || (rules.is_breakable(next) && rules.must_not_start_line(next))
    }

    fn drop_trailing_space(&mut self) {
        let len = self.buf.len();
        self.buf.splice(len - 1, 1, "");
    }

    /// Split the current line until it fits or has no break point left.
    fn fold_line(&mut self) {
        loop {
            let width = self.buf.column();
            if width <= self.state.width {
                return;
            }
            let line_start = self.buf.line_start();
            let line = self.buf.current_line();
            let chars: Vec<char> = line.chars().collect();
            let Some(k) = find_break(&chars, self.state.indentation, self.state.width, self.rules) else {
                return;
            };

            let split = line.char_indices().nth(k).map_or(line.len(), |(i, _)| i);
            let left_end = line[..split].trim_end_matches(' ').len();
            let right_start = split + (line[split..].len() - line[split..].trim_start_matches(' ').len());
            let continuation = format!("\n{}", " ".repeat(self.state.indentation));

            if right_start == line.len() {
                self.buf.trim_trailing_spaces();
                return;
            }
            self.buf
                .splice(line_start + left_end, right_start - left_end, &continuation);
            if self.buf.column() >= width {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breaking::KinsokuTable;

    fn flow(width: usize, leaves: &[&str]) -> String {
        let mut buf = TextBuffer::new();
        let mut state = RenderState::new(width);
        let rules = KinsokuTable::new();
        for leaf in leaves {
            InlineFlow::new(&mut buf, &mut state, &rules).insert(leaf);
        }
        buf.finish().0
    }

    #[test]
    fn test_collapses_whitespace_runs() {
        assert_eq!(flow(80, &["a  \n\t b", "  c "]), "a b c");
    }

    #[test]
    fn test_adjacent_leaves_without_whitespace_stay_glued() {
        assert_eq!(flow(80, &["foo", "bar", " baz"]), "foobar baz");
    }

    #[test]
    fn test_wraps_at_width() {
        assert_eq!(flow(10, &["The quick brown fox jumps"]), "The quick\nbrown fox\njumps");
    }

    #[test]
    fn test_overflow_keeps_long_word_whole() {
        assert_eq!(flow(4, &["a abcdefgh b"]), "a\nabcdefgh\nb");
    }

    #[test]
    fn test_no_space_between_ideographs_across_leaves() {
        assert_eq!(flow(80, &["日本", " 語"]), "日本語");
    }

    #[test]
    fn test_refolding_is_stable() {
        let once = flow(12, &["one two three four five six seven"]);
        let twice = flow(12, &[once.as_str()]);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_text_after_image_starts_new_line() {
        let mut buf = TextBuffer::new();
        let mut state = RenderState::new(80);
        let rules = KinsokuTable::new();
        InlineFlow::new(&mut buf, &mut state, &rules).insert("[img]");
        state.kind = FlowKind::Image;
        InlineFlow::new(&mut buf, &mut state, &rules).insert(" caption");
        assert_eq!(buf.finish().0, "[img]\ncaption");
    }

    #[test]
    fn test_verbatim_keeps_spacing() {
        let mut buf = TextBuffer::new();
        let mut state = RenderState::new(5);
        state.fold = FoldMode::Verbatim;
        let rules = KinsokuTable::new();
        InlineFlow::new(&mut buf, &mut state, &rules).insert("a   b   c\n  d");
        assert_eq!(buf.finish().0, "a   b   c\n  d");
    }
}
