use crate::reflow::DisplayLine;

/// A located occurrence of the query: display line index plus character
/// offset of the occurrence start within that line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchMatch {
    pub line: usize,
    pub offset: usize,
}

/// Case-sensitive substring index over the display buffer.
///
/// Matches are ordered top-to-bottom, left-to-right. Buffer growth only
/// ever appends to the match list, so the user's current match keeps its
/// referent while new content streams in.
#[derive(Debug, Default)]
pub struct SearchIndex {
    query: String,
    matches: Vec<SearchMatch>,
    cursor: Option<usize>,
}

/// Records every occurrence start position, including overlapping ones
/// ("barbar" with query "bar" at a line of "barbarbar" yields 3).
fn scan_line(line: &str, query: &str, line_index: usize, out: &mut Vec<SearchMatch>) {
    let chars: Vec<char> = line.chars().collect();
    let needle: Vec<char> = query.chars().collect();
    if needle.is_empty() || chars.len() < needle.len() {
        return;
    }
    for start in 0..=(chars.len() - needle.len()) {
        if chars[start..start + needle.len()] == needle[..] {
            out.push(SearchMatch {
                line: line_index,
                offset: start,
            });
        }
    }
}

impl SearchIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the query and rescans the whole buffer. Clearing the match
    /// list and resetting the cursor happen together, so the cursor can
    /// never dangle into a stale list.
    pub fn set_query(&mut self, query: &str, lines: &[DisplayLine]) {
        self.query = query.to_string();
        self.matches.clear();
        self.cursor = None;
        if self.query.is_empty() {
            return;
        }
        for (i, line) in lines.iter().enumerate() {
            scan_line(&line.text, &self.query, i, &mut self.matches);
        }
    }

    /// Scans only newly appended lines and extends the match list. The
    /// cursor and all earlier entries are left untouched.
    pub fn on_buffer_extended(&mut self, start_index: usize, new_lines: &[DisplayLine]) {
        if self.query.is_empty() {
            return;
        }
        for (i, line) in new_lines.iter().enumerate() {
            scan_line(&line.text, &self.query, start_index + i, &mut self.matches);
        }
    }

    /// Drops all matches and the cursor (e.g. buffer discarded for a width
    /// change or run switch); the query is kept for the rescan.
    pub fn clear_matches(&mut self) {
        self.matches.clear();
        self.cursor = None;
    }

    /// Advances the cursor, wrapping from the last match to the first.
    pub fn next(&mut self) {
        if self.matches.is_empty() {
            return;
        }
        self.cursor = Some(match self.cursor {
            None => 0,
            Some(i) => (i + 1) % self.matches.len(),
        });
    }

    /// Retreats the cursor, wrapping from the first match to the last.
    pub fn previous(&mut self) {
        if self.matches.is_empty() {
            return;
        }
        self.cursor = Some(match self.cursor {
            None | Some(0) => self.matches.len() - 1,
            Some(i) => i - 1,
        });
    }

    pub fn current(&self) -> Option<&SearchMatch> {
        self.cursor.and_then(|i| self.matches.get(i))
    }

    pub fn cursor_index(&self) -> Option<usize> {
        self.cursor
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn matches(&self) -> &[SearchMatch] {
        &self.matches
    }

    pub fn match_count(&self) -> usize {
        self.matches.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn lines(texts: &[&str]) -> Vec<DisplayLine> {
        texts
            .iter()
            .map(|t| DisplayLine {
                text: (*t).to_string(),
                chunk_index: 0,
                segment: 0,
            })
            .collect()
    }

    fn pairs(index: &SearchIndex) -> Vec<(usize, usize)> {
        index.matches().iter().map(|m| (m.line, m.offset)).collect()
    }

    #[test]
    fn matches_ordered_top_to_bottom_left_to_right() {
        let buf = lines(&["foo bar", "barbar"]);
        let mut index = SearchIndex::new();
        index.set_query("bar", &buf);
        assert_eq!(pairs(&index), vec![(0, 4), (1, 0), (1, 3)]);
    }

    #[test]
    fn overlapping_occurrences_all_recorded() {
        let buf = lines(&["aaaa"]);
        let mut index = SearchIndex::new();
        index.set_query("aa", &buf);
        assert_eq!(pairs(&index), vec![(0, 0), (0, 1), (0, 2)]);
    }

    #[test]
    fn empty_query_clears_matches_and_cursor() {
        let buf = lines(&["bar"]);
        let mut index = SearchIndex::new();
        index.set_query("bar", &buf);
        index.next();
        assert!(index.current().is_some());
        index.set_query("", &buf);
        assert_eq!(index.match_count(), 0);
        assert_eq!(index.current(), None);
    }

    #[test]
    fn search_is_case_sensitive() {
        let buf = lines(&["Bar bar"]);
        let mut index = SearchIndex::new();
        index.set_query("bar", &buf);
        assert_eq!(pairs(&index), vec![(0, 4)]);
    }

    #[test]
    fn next_from_null_goes_to_first() {
        let buf = lines(&["foo bar", "barbar"]);
        let mut index = SearchIndex::new();
        index.set_query("bar", &buf);
        index.next();
        assert_eq!(index.cursor_index(), Some(0));
    }

    #[test]
    fn next_wraps_around() {
        let buf = lines(&["foo bar", "barbar"]);
        let mut index = SearchIndex::new();
        index.set_query("bar", &buf);
        index.next();
        index.next();
        index.next();
        assert_eq!(index.cursor_index(), Some(2));
        index.next();
        assert_eq!(index.cursor_index(), Some(0));
    }

    #[test]
    fn previous_from_first_wraps_to_last() {
        let buf = lines(&["foo bar", "barbar"]);
        let mut index = SearchIndex::new();
        index.set_query("bar", &buf);
        index.next();
        assert_eq!(index.cursor_index(), Some(0));
        index.previous();
        assert_eq!(index.cursor_index(), Some(2));
    }

    #[test]
    fn previous_from_null_goes_to_last() {
        let buf = lines(&["bar bar"]);
        let mut index = SearchIndex::new();
        index.set_query("bar", &buf);
        index.previous();
        assert_eq!(index.cursor_index(), Some(1));
    }

    #[test]
    fn navigation_noop_with_zero_matches() {
        let mut index = SearchIndex::new();
        index.set_query("bar", &lines(&["nothing here"]));
        index.next();
        index.previous();
        assert_eq!(index.current(), None);
    }

    #[test]
    fn buffer_extension_appends_without_moving_cursor() {
        let buf = lines(&["bar one"]);
        let mut index = SearchIndex::new();
        index.set_query("bar", &buf);
        index.next();
        let referent = *index.current().unwrap();

        let extra = lines(&["two bar", "bar three"]);
        index.on_buffer_extended(buf.len(), &extra);
        assert_eq!(pairs(&index), vec![(0, 0), (1, 4), (2, 0)]);
        assert_eq!(index.cursor_index(), Some(0));
        assert_eq!(*index.current().unwrap(), referent);
    }

    #[test]
    fn extension_with_empty_query_is_noop() {
        let mut index = SearchIndex::new();
        index.on_buffer_extended(0, &lines(&["bar"]));
        assert_eq!(index.match_count(), 0);
    }

    #[test]
    fn clear_matches_resets_cursor_atomically() {
        let buf = lines(&["bar"]);
        let mut index = SearchIndex::new();
        index.set_query("bar", &buf);
        index.next();
        index.clear_matches();
        assert_eq!(index.cursor_index(), None);
        assert_eq!(index.match_count(), 0);
        // Query survives for the rescan after a buffer rebuild.
        assert_eq!(index.query(), "bar");
    }

    #[test]
    fn multibyte_offsets_are_char_based() {
        let buf = lines(&["ααbar"]);
        let mut index = SearchIndex::new();
        index.set_query("bar", &buf);
        assert_eq!(pairs(&index), vec![(0, 2)]);
    }
}
