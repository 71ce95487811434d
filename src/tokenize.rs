//! Word extraction.
//!
//! A token is a maximal run of characters bounded by whitespace, hyphens
//! (ASCII `-` plus the Unicode hyphen block U+2010..U+2015), and `/`, trimmed
//! so that it starts and ends on a word character. Hyphens and slashes split
//! compounds ("twenty-one" is two tokens), while interior punctuation
//! survives ("don't" is one token). The trim means "(hello)" tokenizes to
//! "hello" with its offset pointing at the `h`.
//!
//! The same definition is used everywhere a word boundary matters: index
//! construction, query parsing, partial-exact verification, and highlight
//! measurement. Keeping a single definition is what makes stored offsets
//! line up across all of them.

/// Characters that terminate a token.
#[inline]
pub fn is_separator(c: char) -> bool {
    c.is_whitespace() || c == '-' || c == '/' || ('\u{2010}'..='\u{2015}').contains(&c)
}

/// Word characters for boundary trimming, mirroring a regex `\w`.
#[inline]
fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Lazy iterator over `(byte_offset, token)` pairs.
///
/// Restartable and finite: construct a fresh one per scan, no shared cursor
/// state anywhere.
pub struct Tokens<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Tokens<'a> {
    pub fn new(text: &'a str) -> Self {
        Tokens { text, pos: 0 }
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = (usize, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        let bytes = self.text;
        while self.pos < bytes.len() {
            // Find the next separator-free run.
            let run_start = self.pos;
            let rest = &bytes[run_start..];
            let run_len = rest
                .char_indices()
                .find(|&(_, c)| is_separator(c))
                .map_or(rest.len(), |(i, _)| i);

            // Advance past the run and the separator that ended it.
            let run = &rest[..run_len];
            self.pos = run_start + run_len;
            if let Some(c) = bytes[self.pos..].chars().next() {
                self.pos += c.len_utf8();
            }

            if run.is_empty() {
                continue;
            }

            // Trim to the first and last word characters, like `\b...\b`.
            let start = run.char_indices().find(|&(_, c)| is_word_char(c));
            let Some((start, _)) = start else { continue };
            let end = run
                .char_indices()
                .rev()
                .find(|&(_, c)| is_word_char(c))
                .map(|(i, c)| i + c.len_utf8())
                .unwrap_or(start);

            if start < end {
                return Some((run_start + start, &run[start..end]));
            }
        }
        None
    }
}

/// Convenience wrapper for a full scan.
pub fn tokenize(text: &str) -> Tokens<'_> {
    Tokens::new(text)
}

/// Length in bytes of the first token found at or after `pos`.
///
/// Pure: position comes in explicitly and nothing is mutated, so it is safe
/// to call from any shard or thread. Returns `None` when no token remains
/// (or `pos` is not a character boundary).
pub fn match_word_at(text: &str, pos: usize) -> Option<usize> {
    let tail = text.get(pos..)?;
    tokenize(tail).next().map(|(_, token)| token.len())
}

/// Strip everything but ASCII alphanumerics, the comparison form used by
/// partial-exact matching.
pub fn strip_non_word(term: &str) -> String {
    term.chars().filter(char::is_ascii_alphanumeric).collect()
}
