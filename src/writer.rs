use std::io::{self, Write};

use crate::entry::{resolve_pattern, Entry};
use crate::error::SyntaxError;
use crate::output_format::WritePattern;

/// Sink for accepted entries.
pub trait EntryWriter {
    fn write(&mut self, entry: &Entry) -> io::Result<()>;
}

/// Renders entries through a write pattern, one line each, flushing after
/// every write.
pub struct TextWriter<W> {
    inner: W,
    pattern: WritePattern,
    buf: String,
}

impl<W: Write> TextWriter<W> {
    pub fn new(out: W, pattern: &str) -> Result<Self, SyntaxError> {
        Self::with_colors(out, pattern, true)
    }

    pub fn with_colors(out: W, pattern: &str, use_colors: bool) -> Result<Self, SyntaxError> {
        Ok(TextWriter {
            inner: out,
            pattern: WritePattern::compile_with_colors(resolve_pattern(pattern), use_colors)?,
            buf: String::new(),
        })
    }
}

impl<W: Write> EntryWriter for TextWriter<W> {
    fn write(&mut self, entry: &Entry) -> io::Result<()> {
        self.buf.clear();
        self.pattern.render(entry, &mut self.buf);
        self.buf.push('\n');
        self.inner.write_all(self.buf.as_bytes())?;
        self.inner.flush()
    }
}

/// Encodes entries as JSON, one object per write, newline-delimited.
pub struct JsonWriter<W> {
    inner: W,
    compact: bool,
}

impl<W: Write> JsonWriter<W> {
    pub fn new(out: W, compact: bool) -> Self {
        JsonWriter { inner: out, compact }
    }
}

impl<W: Write> EntryWriter for JsonWriter<W> {
    fn write(&mut self, entry: &Entry) -> io::Result<()> {
        if self.compact {
            serde_json::to_writer(&mut self.inner, entry)?;
        } else {
            serde_json::to_writer_pretty(&mut self.inner, entry)?;
        }
        self.inner.write_all(b"\n")?;
        self.inner.flush()
    }
}
