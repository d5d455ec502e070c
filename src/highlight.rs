//! Term highlighting for the document viewer.
//!
//! Match spans for every term are collected against the original text
//! first, merged, and only then rendered in a single pass. Sequentially
//! substituting one term at a time would re-scan text that already
//! contains markers and double-wrap overlapping matches.

/// Emphasis marker wrapped around matched spans.
const MARK: &str = "**";

/// Wrap every case-insensitive occurrence of each term in emphasis markers.
///
/// Terms are matched as literal substrings. Overlapping and adjacent
/// spans are merged into one marked region. An empty term list returns
/// the body unchanged.
pub fn render(body: &str, terms: &[String]) -> String {
    let spans = merge_spans(collect_spans(body, terms));
    if spans.is_empty() {
        return body.to_string();
    }

    let mut out = String::with_capacity(body.len() + spans.len() * MARK.len() * 2);
    let mut cursor = 0;
    for (start, end) in spans {
        out.push_str(&body[cursor..start]);
        out.push_str(MARK);
        out.push_str(&body[start..end]);
        out.push_str(MARK);
        cursor = end;
    }
    out.push_str(&body[cursor..]);
    out
}

/// All match spans, as byte ranges into `body`, unmerged.
fn collect_spans(body: &str, terms: &[String]) -> Vec<(usize, usize)> {
    let lowered = body.to_lowercase();
    let mut spans = Vec::new();

    for term in terms {
        let term = term.to_lowercase();
        if term.is_empty() {
            continue;
        }
        let mut from = 0;
        while let Some(pos) = lowered[from..].find(&term) {
            let start = from + pos;
            let end = start + term.len();
            // Offsets come from the lowercased text; clamp to character
            // boundaries of the original in case folding changed widths.
            spans.push((
                floor_boundary(body, start),
                ceil_boundary(body, end),
            ));
            from = end;
        }
    }
    spans
}

/// Merge overlapping or adjacent spans into maximal regions.
fn merge_spans(mut spans: Vec<(usize, usize)>) -> Vec<(usize, usize)> {
    if spans.is_empty() {
        return spans;
    }
    spans.sort_unstable();

    let mut merged: Vec<(usize, usize)> = Vec::with_capacity(spans.len());
    for (start, end) in spans {
        match merged.last_mut() {
            Some(last) if start <= last.1 => last.1 = last.1.max(end),
            _ => merged.push((start, end)),
        }
    }
    merged
}

fn floor_boundary(s: &str, mut i: usize) -> usize {
    if i > s.len() {
        return s.len();
    }
    while i > 0 && !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

fn ceil_boundary(s: &str, mut i: usize) -> usize {
    if i >= s.len() {
        return s.len();
    }
    while i < s.len() && !s.is_char_boundary(i) {
        i += 1;
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_single_term_wrapped() {
        let out = render("hello world", &terms(&["world"]));
        assert_eq!(out, "hello **world**");
    }

    #[test]
    fn test_unmarked_text_unchanged() {
        let out = render("hello world, hello again", &terms(&["hello"]));
        assert_eq!(out, "**hello** world, **hello** again");
    }

    #[test]
    fn test_case_insensitive_match_preserves_original_case() {
        let out = render("Hello WORLD", &terms(&["world", "hello"]));
        assert_eq!(out, "**Hello** **WORLD**");
    }

    #[test]
    fn test_no_terms_returns_body_unchanged() {
        let body = "nothing to mark here";
        assert_eq!(render(body, &[]), body);
    }

    #[test]
    fn test_absent_term_returns_body_unchanged() {
        let body = "nothing to mark here";
        assert_eq!(render(body, &terms(&["zzz"])), body);
    }

    #[test]
    fn test_overlapping_terms_merge_into_one_span() {
        // "flight" and "light" overlap inside "flights"
        let out = render("the flights left", &terms(&["flight", "light"]));
        assert_eq!(out, "the **flight**s left");
    }

    #[test]
    fn test_adjacent_spans_merge() {
        let out = render("foobar", &terms(&["foo", "bar"]));
        assert_eq!(out, "**foobar**");
    }

    #[test]
    fn test_never_double_wraps() {
        let out = render("aaa", &terms(&["a", "aa"]));
        assert_eq!(out, "**aaa**");
        assert_eq!(out.matches(MARK).count(), 2);
    }

    #[test]
    fn test_marker_characters_in_body_are_literal() {
        // a body already containing asterisks must not confuse matching
        let out = render("a **bold** statement", &terms(&["bold"]));
        assert_eq!(out, "a ****bold**** statement");
    }

    #[test]
    fn test_multibyte_text_is_safe() {
        let out = render("naïve café test", &terms(&["café"]));
        assert_eq!(out, "naïve **café** test");
    }
}
