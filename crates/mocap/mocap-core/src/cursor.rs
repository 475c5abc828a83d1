//! Line cursor shared by the ASF and AMC parsers.
//!
//! A [`Cursor`] is a `Copy` value: every step consumes it and hands back the
//! advanced cursor next to whatever was read, so a failed step never leaves a
//! half-advanced position behind.

use crate::config::Delimiter;
use crate::error::MocapError;

const COMMENT_PREFIX: char = '#';

/// One significant line, split into fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Line<'a> {
    /// 0-based index into the input.
    pub index: usize,
    pub raw: &'a str,
    pub fields: Vec<&'a str>,
}

impl<'a> Line<'a> {
    /// First field, or `""` for a line without fields.
    pub fn keyword(&self) -> &'a str {
        self.fields.first().copied().unwrap_or("")
    }

    pub fn is(&self, keyword: &str) -> bool {
        self.keyword() == keyword
    }

    /// Fields after the keyword.
    pub fn args(&self) -> &[&'a str] {
        self.fields.get(1..).unwrap_or(&[])
    }

    /// Argument `i` (0-based, after the keyword) or a syntax error naming `what`.
    pub fn arg(&self, i: usize, what: &str) -> Result<&'a str, MocapError> {
        self.args()
            .get(i)
            .copied()
            .ok_or_else(|| MocapError::syntax(self.index, what, self.raw.trim()))
    }

    /// Parse a single token of this line as a float.
    pub fn number(&self, token: &str) -> Result<f64, MocapError> {
        token
            .parse::<f64>()
            .map_err(|_| MocapError::syntax(self.index, "a number", token))
    }

    /// Parse every token of `tokens` as floats.
    pub fn numbers(&self, tokens: &[&str]) -> Result<Vec<f64>, MocapError> {
        tokens.iter().map(|t| self.number(t)).collect()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    lines: &'a [&'a str],
    pos: usize,
    delimiter: Delimiter,
}

fn is_ignored(raw: &str) -> bool {
    let trimmed = raw.trim();
    trimmed.is_empty() || trimmed.starts_with(COMMENT_PREFIX)
}

impl<'a> Cursor<'a> {
    pub fn new(lines: &'a [&'a str], delimiter: Delimiter) -> Self {
        Self {
            lines,
            pos: 0,
            delimiter,
        }
    }

    /// Index of the next unread line.
    pub fn position(&self) -> usize {
        self.pos
    }

    fn skip_ignored(mut self) -> Self {
        while self.pos < self.lines.len() && is_ignored(self.lines[self.pos]) {
            self.pos += 1;
        }
        self
    }

    /// True once only blank or comment lines remain.
    pub fn is_at_end(&self) -> bool {
        self.skip_ignored().pos >= self.lines.len()
    }

    fn line_at(&self, index: usize) -> Line<'a> {
        let raw = self.lines[index];
        Line {
            index,
            raw,
            fields: self.delimiter.split(raw),
        }
    }

    /// Next significant line without consuming it.
    pub fn peek(&self) -> Option<Line<'a>> {
        let at = self.skip_ignored();
        (at.pos < at.lines.len()).then(|| at.line_at(at.pos))
    }

    /// Consume the next significant line; `expected` describes it for the
    /// end-of-input error.
    pub fn next_line(self, expected: &str) -> Result<(Line<'a>, Cursor<'a>), MocapError> {
        let at = self.skip_ignored();
        if at.pos >= at.lines.len() {
            return Err(MocapError::syntax(at.lines.len(), expected, "end of input"));
        }
        let line = at.line_at(at.pos);
        Ok((line, Cursor { pos: at.pos + 1, ..at }))
    }

    /// Consume the next significant line and require its first field to be `keyword`.
    pub fn expect(self, keyword: &str) -> Result<(Line<'a>, Cursor<'a>), MocapError> {
        let expected = format!("'{keyword}'");
        let (line, next) = self.next_line(&expected)?;
        if !line.is(keyword) {
            return Err(MocapError::syntax(line.index, expected, line.keyword()));
        }
        Ok((line, next))
    }

    /// Consume the next raw line verbatim, comments and blanks included.
    pub fn next_raw(self) -> Option<(usize, &'a str, Cursor<'a>)> {
        let raw = *self.lines.get(self.pos)?;
        let next = Cursor {
            pos: self.pos + 1,
            ..self
        };
        Some((self.pos, raw, next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INPUT: [&str; 5] = ["# header", ":version\t1.10", "", "\t\tname\tlfemur", ":end"];

    #[test]
    fn skips_comments_and_blank_lines() {
        let cursor = Cursor::new(&INPUT, Delimiter::Tab);
        let (line, cursor) = cursor.expect(":version").unwrap();
        assert_eq!(line.index, 1);
        assert_eq!(line.args(), &["1.10"]);
        let (line, _) = cursor.expect("name").unwrap();
        assert_eq!(line.index, 3);
        assert_eq!(line.arg(0, "joint name").unwrap(), "lfemur");
    }

    #[test]
    fn cursor_is_unchanged_after_a_failed_step() {
        let cursor = Cursor::new(&INPUT, Delimiter::Tab);
        let err = cursor.expect(":name").unwrap_err();
        assert_eq!(err, MocapError::syntax(1, "':name'", ":version"));
        // The earlier cursor value is still usable.
        assert!(cursor.expect(":version").is_ok());
    }

    #[test]
    fn end_of_input_reports_line_count() {
        let cursor = Cursor::new(&INPUT[..2], Delimiter::Tab);
        let (_, cursor) = cursor.expect(":version").unwrap();
        assert!(cursor.is_at_end());
        let err = cursor.expect(":name").unwrap_err();
        assert_eq!(err, MocapError::syntax(2, "':name'", "end of input"));
    }

    #[test]
    fn numbers_accept_infinity() {
        let cursor = Cursor::new(&INPUT, Delimiter::Tab);
        let line = cursor.peek().unwrap();
        assert_eq!(
            line.numbers(&["-inf", "inf", "2.5"]).unwrap(),
            vec![f64::NEG_INFINITY, f64::INFINITY, 2.5]
        );
        assert!(line.number("abc").is_err());
    }
}
