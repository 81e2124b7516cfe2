//! Character classification for line breaking.
//!
//! [UAX #14 Unicode Line Breaking Algorithm](https://www.unicode.org/reports/tr14/)
//!
//! "Line breaking, also known as word wrapping, is the process of breaking a
//! section of text into lines such that it will fit in the available width
//! of a page, window or other display area."
//!
//! The flow engine does not implement UAX #14. It asks a [`LineBreakRules`]
//! four questions about single characters and searches for break points
//! with them. The stock table, [`KinsokuTable`], knows the CJK ranges and
//! the Japanese kinsoku shori sets; a locale module can supply its own.

use std::collections::BTreeSet;

use crate::metrics::char_width;

/// How far past the first kinsoku rejection the break search keeps looking.
pub const KINSOKU_SCAN_LIMIT: usize = 4;

/// Per-character line breaking classification.
pub trait LineBreakRules: Send + Sync {
    /// A line may be split before or after this character without a space.
    fn is_breakable(&self, c: char) -> bool;

    /// Two adjacent characters of this class are written without a space
    /// between them.
    fn needs_no_space(&self, c: char) -> bool;

    /// The character must not begin a line (closing brackets, small kana,
    /// full stops).
    fn must_not_start_line(&self, c: char) -> bool;

    /// The character must not end a line (opening brackets).
    fn must_not_end_line(&self, c: char) -> bool;
}

/// Characters that may not begin a line.
const NO_START: &str = "!),.:;?]}¢°’”‰′″℃、。々〉》」』】〕〗〙〛ぁぃぅぇぉっゃゅょゎゕゖ゛゜ゝゞァィゥェォッャュョヮヵヶ・ーヽヾ！％），．：；？］｝｡｣､･ｧｨｩｪｫｬｭｮｯｰﾞﾟ";

/// Characters that may not end a line.
const NO_END: &str = "([{£¥‘“〈《「『【〔〖〘〚＄（［｛｢￡￥";

/// Scripts written without inter-word spaces.
fn is_cjk(c: char) -> bool {
    matches!(c,
        '\u{2E80}'..='\u{2FDF}'     // radicals
        | '\u{3000}'..='\u{303F}'   // CJK symbols and punctuation
        | '\u{3040}'..='\u{30FF}'   // hiragana, katakana
        | '\u{31F0}'..='\u{31FF}'
        | '\u{3400}'..='\u{4DBF}'   // extension A
        | '\u{4E00}'..='\u{9FFF}'   // unified ideographs
        | '\u{F900}'..='\u{FAFF}'
        | '\u{FF00}'..='\u{FFEF}'   // half- and full-width forms
        | '\u{20000}'..='\u{2FFFF}')
}

/// The default classification: CJK characters are breakable and space-free,
/// kinsoku punctuation restricts where they may break.
#[derive(Debug, Clone, Default)]
pub struct KinsokuTable {
    extra_no_start: BTreeSet<char>,
    extra_no_end: BTreeSet<char>,
}

impl KinsokuTable {
    /// The stock table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add characters that must not begin a line.
    #[must_use]
    pub fn with_no_start_chars(mut self, chars: &str) -> Self {
        self.extra_no_start.extend(chars.chars());
        self
    }

    /// Add characters that must not end a line.
    #[must_use]
    pub fn with_no_end_chars(mut self, chars: &str) -> Self {
        self.extra_no_end.extend(chars.chars());
        self
    }
}

impl LineBreakRules for KinsokuTable {
    fn is_breakable(&self, c: char) -> bool {
        is_cjk(c)
    }

    fn needs_no_space(&self, c: char) -> bool {
        is_cjk(c)
    }

    fn must_not_start_line(&self, c: char) -> bool {
        NO_START.contains(c) || self.extra_no_start.contains(&c)
    }

    fn must_not_end_line(&self, c: char) -> bool {
        NO_END.contains(c) || self.extra_no_end.contains(&c)
    }
}

/// What the search thinks of splitting between `chars[k - 1]` and `chars[k]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Candidate {
    Legal,
    /// Breakable, but a kinsoku character would start or end a line.
    Kinsoku,
    Never,
}

fn classify(chars: &[char], k: usize, rules: &dyn LineBreakRules) -> Candidate {
    let (before, after) = (chars[k - 1], chars[k]);
    if before == ' ' || after == ' ' {
        return Candidate::Legal;
    }
    if !rules.is_breakable(before) && !rules.is_breakable(after) {
        return Candidate::Never;
    }
    if rules.must_not_start_line(after) || rules.must_not_end_line(before) {
        Candidate::Kinsoku
    } else {
        Candidate::Legal
    }
}

/// Find where to split a line that is wider than `width` columns.
///
/// `chars` is the whole line, starting with `indentation` columns of
/// prefix (indent spaces or a list marker) that never take a break. The
/// result `k` means "the first line is `chars[..k]`". Search order:
///
/// 1. backward from the last position that fits, taking the first legal
///    point;
/// 2. once a kinsoku rejection is seen, only [`KINSOKU_SCAN_LIMIT`] more
///    positions backward, then the same distance forward of the rejection,
///    then the rejected point itself;
/// 3. with no candidate at all, forward past the limit to the first legal
///    point (the first line overflows).
///
/// `None` means the line has no break point and must overflow.
#[must_use]
pub fn find_break(
    chars: &[char],
    indentation: usize,
    width: usize,
    rules: &dyn LineBreakRules,
) -> Option<usize> {
    let len = chars.len();
    if len < 2 {
        return None;
    }

    // cols[k] = columns taken by chars[..k]
    let mut cols = Vec::with_capacity(len + 1);
    cols.push(0);
    for &c in chars {
        cols.push(cols[cols.len() - 1] + char_width(c));
    }

    let prefix = cols.iter().position(|&col| col >= indentation).unwrap_or(len);
    let fit = cols.iter().rposition(|&col| col <= width).unwrap_or(0);
    let has_content = |k: usize| chars[prefix.min(k)..k].iter().any(|&c| c != ' ');
    let usable = |k: usize| k > prefix && k < len && has_content(k);

    let mut fallback = None;
    let mut scan_left: Option<usize> = None;
    let mut k = fit.min(len - 1);
    while k > prefix {
        if let Some(left) = scan_left {
            if left == 0 {
                break;
            }
            scan_left = Some(left - 1);
        }
        if usable(k) {
            match classify(chars, k, rules) {
                Candidate::Legal => return Some(k),
                Candidate::Kinsoku if fallback.is_none() => {
                    fallback = Some(k);
                    scan_left = Some(KINSOKU_SCAN_LIMIT);
                }
                _ => {}
            }
        }
        k -= 1;
    }

    if let Some(rejected) = fallback {
        let last = (rejected + KINSOKU_SCAN_LIMIT).min(len - 1);
        return (rejected + 1..=last)
            .find(|&k| usable(k) && classify(chars, k, rules) == Candidate::Legal)
            .or(Some(rejected));
    }

    (fit.max(prefix) + 1..len).find(|&k| usable(k) && classify(chars, k, rules) == Candidate::Legal)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(line: &str, indentation: usize, width: usize) -> Option<(String, String)> {
        let chars: Vec<char> = line.chars().collect();
        find_break(&chars, indentation, width, &KinsokuTable::new()).map(|k| {
            (
                chars[..k].iter().collect::<String>(),
                chars[k..].iter().collect::<String>(),
            )
        })
    }

    #[test]
    fn test_breaks_at_last_fitting_space() {
        let (left, right) = split("The quick brown", 0, 10).unwrap();
        assert_eq!(left.trim_end(), "The quick");
        assert_eq!(right.trim_start(), "brown");
    }

    #[test]
    fn test_unbreakable_word_overflows() {
        assert_eq!(split("Supercalifragilistic", 0, 5), None);
    }

    #[test]
    fn test_long_first_word_breaks_after_it() {
        let (left, right) = split("Supercalifragilistic word", 0, 5).unwrap();
        assert_eq!(left.trim_end(), "Supercalifragilistic");
        assert_eq!(right.trim_start(), "word");
    }

    #[test]
    fn test_prefix_is_not_a_break_point() {
        assert_eq!(split("* Supercalifragilistic", 2, 5), None);
    }

    #[test]
    fn test_cjk_breaks_between_ideographs() {
        // each ideograph is two columns wide
        let (left, right) = split("日本語の文章", 0, 6).unwrap();
        assert_eq!(left, "日本語");
        assert_eq!(right, "の文章");
    }

    #[test]
    fn test_kinsoku_keeps_full_stop_on_line() {
        // "。" may not start a line, so the break moves back one ideograph
        let (left, right) = split("日本語。文章", 0, 6).unwrap();
        assert_eq!(left, "日本");
        assert_eq!(right, "語。文章");
    }

    #[test]
    fn test_kinsoku_keeps_opening_bracket_with_next() {
        let (left, right) = split("日本「語」", 0, 6).unwrap();
        assert_eq!(left, "日本");
        assert_eq!(right, "「語」");
    }

    #[test]
    fn test_extra_rules_are_consulted() {
        let rules = KinsokuTable::new().with_no_start_chars("語");
        assert!(rules.must_not_start_line('語'));
        assert!(!KinsokuTable::new().must_not_start_line('語'));
    }
}
