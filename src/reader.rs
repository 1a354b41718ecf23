use std::io::{self, BufRead};

use crate::entry::{resolve_pattern, Entry};
use crate::error::SyntaxError;
use crate::filter::Filter;
use crate::input_format::ReadPattern;

/// Composes a read pattern and a filter over a line-oriented input stream.
///
/// The reader owns its stream and line counter and is not reentrant; the
/// compiled pattern and filter it holds are immutable.
pub struct Reader<R> {
    inner: R,
    lineno: usize,
    pattern: ReadPattern,
    filter: Filter,
}

impl<R: BufRead> Reader<R> {
    /// Empty pattern and filter strings select the default layout and the
    /// accept-everything predicate. Malformed ones fail here, before any
    /// line is read.
    pub fn new(input: R, pattern: &str, filter: &str) -> Result<Self, SyntaxError> {
        Ok(Reader {
            inner: input,
            lineno: 0,
            pattern: ReadPattern::compile(resolve_pattern(pattern))?,
            filter: Filter::compile(filter)?,
        })
    }

    /// Returns the next accepted entry, or `None` at end of input.
    ///
    /// Every source line consumes a line number; lines that do not match the
    /// pattern are discarded as noise, and lines rejected by the filter are
    /// dropped the same way. I/O failures terminate iteration.
    pub fn read(&mut self) -> io::Result<Option<Entry>> {
        let mut line = String::new();
        loop {
            line.clear();
            if self.inner.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            self.lineno += 1;
            let text = line.trim_end_matches(['\n', '\r']);
            if text.is_empty() {
                continue;
            }
            let Ok(mut entry) = self.pattern.parse_line(text) else {
                continue;
            };
            if !self.filter.eval(&entry) {
                continue;
            }
            entry.line = text.to_string();
            entry.line_number = self.lineno;
            return Ok(Some(entry));
        }
    }

    /// Reads every remaining accepted entry, in input order.
    pub fn read_all(&mut self) -> io::Result<Vec<Entry>> {
        let mut entries = Vec::new();
        while let Some(entry) = self.read()? {
            entries.push(entry);
        }
        Ok(entries)
    }
}
