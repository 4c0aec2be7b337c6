//! Delimiter lexer for the block grammar.
//!
//! Block delimiters are HTML comments of the form
//!
//! ```text
//! <!-- wp:namespace/name {"json":"attrs"} -->    opener
//! <!-- wp:namespace/name {"json":"attrs"} /-->   void (self-closing)
//! <!-- /wp:namespace/name -->                    closer
//! ```
//!
//! The lexer only finds delimiters; everything between them is left to the
//! parser. Attribute payloads are returned raw so the parser can report
//! malformed JSON against the right span.
//!
//! A payload runs from its `{` to the first `-->` after it. The block editor
//! escapes `--` inside attribute JSON, so a payload never contains `-->`.

use crate::types::Span;

const COMMENT_OPEN: &str = "<!--";
const COMMENT_CLOSE: &str = "-->";
const DEFAULT_NAMESPACE: &str = "core";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelimiterKind {
    Opener,
    Closer,
    Void,
}

/// One block delimiter found in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delimiter<'a> {
    pub kind: DelimiterKind,
    /// Fully-qualified name, `core/` prepended when the namespace is omitted.
    pub name: String,
    /// The `{...}` payload, exactly as written.
    pub raw_attrs: Option<&'a str>,
    pub span: Span,
}

/// Whether `input` contains at least one opener or void delimiter.
pub fn has_block_opener(input: &str) -> bool {
    Lexer::new(input).any(|d| d.kind != DelimiterKind::Closer)
}

/// Iterator over every delimiter in a string, in order.
///
/// Lexing is linear in the input length: the search for a payload's `-->`
/// is remembered, so a run of unterminated payloads shares one scan.
pub struct Lexer<'a> {
    input: &'a str,
    cursor: usize,
    /// Last `-->` search as `(searched_from, result)`.
    terminator: Option<(usize, Option<Terminator>)>,
}

/// A `-->` and the point a payload ending right before it would close at.
#[derive(Debug, Clone, Copy)]
struct Terminator {
    start: usize,
    /// Just past the last byte before `-->` that is neither whitespace nor
    /// the void marker `/`.
    payload_end: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer {
            input,
            cursor: 0,
            terminator: None,
        }
    }

    /// Find the first delimiter starting at or after the cursor.
    fn next_delimiter(&mut self) -> Option<Delimiter<'a>> {
        let input = self.input;
        let mut search = self.cursor;
        while search < input.len() {
            let pos = search + input[search..].find(COMMENT_OPEN)?;
            if let Some(delimiter) = self.delimiter_at(pos) {
                return Some(delimiter);
            }
            search = pos + 1;
        }
        None
    }

    /// Try to read a delimiter that starts exactly at `start` (which must
    /// point at `<!--`).
    fn delimiter_at(&mut self, start: usize) -> Option<Delimiter<'a>> {
        let input = self.input;
        let bytes = input.as_bytes();
        let mut pos = start + COMMENT_OPEN.len();

        // At least one whitespace character after `<!--`.
        let ws = skip_whitespace(bytes, pos);
        if ws == pos {
            return None;
        }
        pos = ws;

        let is_closer = bytes.get(pos) == Some(&b'/');
        if is_closer {
            pos += 1;
        }

        if !input[pos..].starts_with("wp:") {
            return None;
        }
        pos += 3;

        let first_end = name_segment_end(bytes, pos)?;
        let first = &input[pos..first_end];
        pos = first_end;
        let name = if bytes.get(pos) == Some(&b'/') {
            let second_end = name_segment_end(bytes, pos + 1)?;
            let name = format!("{first}/{}", &input[pos + 1..second_end]);
            pos = second_end;
            name
        } else {
            format!("{DEFAULT_NAMESPACE}/{first}")
        };

        // The name must be followed by whitespace.
        let ws = skip_whitespace(bytes, pos);
        if ws == pos {
            return None;
        }
        pos = ws;

        let mut raw_attrs = None;
        if bytes.get(pos) == Some(&b'{') {
            let attrs_end = self.attrs_end(pos)?;
            raw_attrs = Some(&input[pos..attrs_end]);
            pos = skip_whitespace(bytes, attrs_end);
        }

        let (is_void, end) = comment_end(input, pos)?;
        let kind = if is_void {
            DelimiterKind::Void
        } else if is_closer {
            DelimiterKind::Closer
        } else {
            DelimiterKind::Opener
        };

        Some(Delimiter {
            kind,
            name,
            raw_attrs,
            span: Span::new(start, end),
        })
    }

    /// End of the attribute payload whose `{` is at `open`: the `}` that
    /// precedes the next `-->`, allowing whitespace and a void `/` between.
    fn attrs_end(&mut self, open: usize) -> Option<usize> {
        let close = self.terminator_after(open + 1)?.payload_end;
        (close > open + 1 && self.input.as_bytes()[close - 1] == b'}').then_some(close)
    }

    /// The first `-->` at or after `from`.
    fn terminator_after(&mut self, from: usize) -> Option<Terminator> {
        if let Some((searched_from, found)) = self.terminator {
            if from >= searched_from && found.is_none_or(|t| from <= t.start) {
                return found;
            }
        }

        let bytes = self.input.as_bytes();
        let found = self.input[from..].find(COMMENT_CLOSE).map(|rel| {
            let start = from + rel;
            let mut payload_end = start;
            if payload_end > from && bytes[payload_end - 1] == b'/' {
                payload_end -= 1;
            }
            while payload_end > from && bytes[payload_end - 1].is_ascii_whitespace() {
                payload_end -= 1;
            }
            Terminator { start, payload_end }
        });
        self.terminator = Some((from, found));
        found
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Delimiter<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let delimiter = self.next_delimiter()?;
        self.cursor = delimiter.span.end;
        Some(delimiter)
    }
}

/// End of a `[a-z][a-z0-9_-]*` name segment starting at `pos`.
fn name_segment_end(bytes: &[u8], pos: usize) -> Option<usize> {
    if !bytes.get(pos)?.is_ascii_lowercase() {
        return None;
    }
    let len = bytes[pos..]
        .iter()
        .take_while(|&&b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_' || b == b'-')
        .count();
    Some(pos + len)
}

fn skip_whitespace(bytes: &[u8], pos: usize) -> usize {
    pos + bytes[pos.min(bytes.len())..]
        .iter()
        .take_while(|b| b.is_ascii_whitespace())
        .count()
}

/// Match `-->` or `/-->` at `pos`. Returns `(is_void, end)`.
fn comment_end(input: &str, pos: usize) -> Option<(bool, usize)> {
    let rest = &input[pos..];
    if rest.starts_with(COMMENT_CLOSE) {
        Some((false, pos + COMMENT_CLOSE.len()))
    } else if rest.starts_with("/-->") {
        Some((true, pos + 4))
    } else {
        None
    }
}
