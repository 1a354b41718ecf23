//! Write-pattern compiler: turns a rendering string into a line renderer.
//!
//! Directives take the form `%[width][[fg[,bg]]]spec`, e.g. `%10[red]m`.
//! Specifiers mirror the read side's fields (`%t %n %p %u %g %h %l %m`) plus
//! `%#` for the raw source line, `%d` for the source line number and
//! `%w[(selector)]` for word captures. `%%` renders one percent sign; any
//! other character passes through.

use std::fmt::Write as _;

use crate::colors;
use crate::entry::Entry;
use crate::error::SyntaxError;
use crate::scanner::Scanner;
use crate::timefmt::parse_time_format;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrintOp {
    Literal(String),
    /// Native time format produced by the template translator.
    Time(String),
    Process,
    Pid,
    User,
    Group,
    Host,
    Level,
    Message,
    /// Raw source line (`%#`).
    Line,
    /// 1-based source line number (`%d`).
    Lino,
    Word(Option<WordSel>),
}

/// Selector for `%w`: a named capture, or a positional index into the
/// captured words. Bare `%w` selects nothing and renders empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WordSel {
    Named(String),
    Index(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PrintStep {
    width: usize,
    fore: &'static str,
    back: &'static str,
    op: PrintOp,
}

/// A compiled write pattern. Rendering is side-effect only: malformed
/// patterns fail at compile time, unset fields render empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WritePattern {
    steps: Vec<PrintStep>,
}

impl WritePattern {
    pub fn compile(pattern: &str) -> Result<Self, SyntaxError> {
        Self::compile_with_colors(pattern, true)
    }

    /// With colors disabled, color directives still parse and validate but
    /// compile to nothing, leaving the text content untouched.
    pub fn compile_with_colors(pattern: &str, use_colors: bool) -> Result<Self, SyntaxError> {
        if pattern.is_empty() {
            return Err(SyntaxError::EmptyPattern);
        }
        let mut sc = Scanner::new(pattern);
        let mut steps = Vec::new();
        let mut lit = String::new();
        while let Some(c) = sc.read() {
            if c != '%' {
                lit.push(c);
                continue;
            }
            if sc.peek() == Some('%') {
                sc.read();
                lit.push('%');
                continue;
            }
            if !lit.is_empty() {
                steps.push(PrintStep::literal(std::mem::take(&mut lit)));
            }
            steps.push(parse_directive(&mut sc, use_colors)?);
        }
        if !lit.is_empty() {
            steps.push(PrintStep::literal(lit));
        }
        Ok(WritePattern { steps })
    }

    /// Renders the entry into the sink, in directive order.
    pub fn render(&self, entry: &Entry, out: &mut String) {
        for step in &self.steps {
            step.render(entry, out);
        }
    }

    pub fn render_line(&self, entry: &Entry) -> String {
        let mut out = String::new();
        self.render(entry, &mut out);
        out
    }
}

fn parse_directive(sc: &mut Scanner, use_colors: bool) -> Result<PrintStep, SyntaxError> {
    let mut width = 0;
    let mut fore = "";
    let mut back = "";

    let mut c = sc.read().ok_or(SyntaxError::UnexpectedEnd)?;
    if c.is_ascii_digit() {
        let _ = sc.unread();
        width = sc.read_number().parse().unwrap_or(0);
        c = sc.read().ok_or(SyntaxError::UnexpectedEnd)?;
    }
    if c == '[' {
        let (fg, bg) = parse_color_names(sc)?;
        fore = colors::foreground(&fg).ok_or(SyntaxError::UnknownColor(fg))?;
        if let Some(bg) = bg {
            back = colors::background(&bg).ok_or(SyntaxError::UnknownColor(bg))?;
        }
        if !use_colors {
            fore = "";
            back = "";
        }
        c = sc.read().ok_or(SyntaxError::UnexpectedEnd)?;
    }

    let op = match c {
        't' => PrintOp::Time(parse_time_format(sc)?),
        'n' => PrintOp::Process,
        'p' => PrintOp::Pid,
        'u' => PrintOp::User,
        'g' => PrintOp::Group,
        'h' => PrintOp::Host,
        'l' => PrintOp::Level,
        'm' => PrintOp::Message,
        '#' => PrintOp::Line,
        'd' => PrintOp::Lino,
        'w' => PrintOp::Word(parse_word_selector(sc)?),
        other => return Err(SyntaxError::UnknownWriteSpecifier(other)),
    };
    Ok(PrintStep { width, fore, back, op })
}

fn parse_color_names(sc: &mut Scanner) -> Result<(String, Option<String>), SyntaxError> {
    let fg = sc.read_until(|c| c != ',' && c != ']');
    match sc.read() {
        Some(']') => Ok((fg, None)),
        Some(',') => {
            let bg = sc.read_until(|c| c != ']');
            match sc.read() {
                Some(']') => Ok((fg, Some(bg))),
                _ => Err(SyntaxError::Missing(']')),
            }
        }
        _ => Err(SyntaxError::Missing(']')),
    }
}

fn parse_word_selector(sc: &mut Scanner) -> Result<Option<WordSel>, SyntaxError> {
    if sc.peek() != Some('(') {
        return Ok(None);
    }
    sc.read();
    let name = sc.read_until(|c| c != ')');
    match sc.read() {
        Some(')') => {}
        _ => return Err(SyntaxError::Missing(')')),
    }
    if name.is_empty() {
        return Ok(None);
    }
    match name.parse() {
        Ok(index) => Ok(Some(WordSel::Index(index))),
        Err(_) => Ok(Some(WordSel::Named(name))),
    }
}

impl PrintStep {
    fn literal(text: String) -> Self {
        PrintStep {
            width: 0,
            fore: "",
            back: "",
            op: PrintOp::Literal(text),
        }
    }

    fn render(&self, entry: &Entry, out: &mut String) {
        out.push_str(self.fore);
        out.push_str(self.back);
        if self.width > 0 {
            let mut tmp = String::new();
            self.op.render(entry, &mut tmp);
            let count = tmp.chars().count();
            if count < self.width {
                tmp.extend(std::iter::repeat(' ').take(self.width - count));
            } else if count > self.width {
                tmp = tmp.chars().take(self.width).collect();
            }
            out.push_str(&tmp);
        } else {
            self.op.render(entry, out);
        }
        if !self.fore.is_empty() || !self.back.is_empty() {
            out.push_str(colors::RESET);
        }
    }
}

impl PrintOp {
    fn render(&self, entry: &Entry, out: &mut String) {
        match self {
            PrintOp::Literal(text) => out.push_str(text),
            PrintOp::Time(format) => {
                if let Some(when) = entry.timestamp {
                    let _ = write!(out, "{}", when.format(format));
                }
            }
            PrintOp::Process => out.push_str(&entry.process),
            PrintOp::Pid => {
                if let Some(pid) = entry.pid {
                    let _ = write!(out, "{pid}");
                }
            }
            PrintOp::User => out.push_str(&entry.user),
            PrintOp::Group => out.push_str(&entry.group),
            PrintOp::Host => out.push_str(&entry.host),
            PrintOp::Level => out.push_str(&entry.level),
            PrintOp::Message => out.push_str(&entry.message),
            PrintOp::Line => out.push_str(&entry.line),
            PrintOp::Lino => {
                let _ = write!(out, "{}", entry.line_number);
            }
            PrintOp::Word(None) => {}
            PrintOp::Word(Some(WordSel::Named(name))) => {
                if let Some(word) = entry.named.get(name) {
                    out.push_str(word);
                }
            }
            PrintOp::Word(Some(WordSel::Index(index))) => {
                if let Some(word) = entry.words.get(*index) {
                    out.push_str(word);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample() -> Entry {
        let mut e = Entry::new();
        e.line = "raw input line".into();
        e.line_number = 7;
        e.pid = Some(4211);
        e.process = "sshd".into();
        e.user = "root".into();
        e.level = "warn".into();
        e.message = "session opened".into();
        e.host = "web01".into();
        e.timestamp = NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(10, 20, 30);
        e.words = vec!["alpha".into(), "beta".into()];
        e.named.insert("verb".into(), "login".into());
        e
    }

    fn strip_ansi(text: &str) -> String {
        let mut out = String::new();
        let mut chars = text.chars();
        while let Some(c) = chars.next() {
            if c == '\x1b' {
                for esc in chars.by_ref() {
                    if esc == 'm' {
                        break;
                    }
                }
                continue;
            }
            out.push(c);
        }
        out
    }

    #[test]
    fn test_compile_rejects_empty() {
        assert_eq!(WritePattern::compile(""), Err(SyntaxError::EmptyPattern));
    }

    #[test]
    fn test_compile_rejects_unknown_specifier() {
        assert_eq!(
            WritePattern::compile("%q"),
            Err(SyntaxError::UnknownWriteSpecifier('q'))
        );
    }

    #[test]
    fn test_compile_rejects_unknown_color() {
        assert_eq!(
            WritePattern::compile("%[crimson]m"),
            Err(SyntaxError::UnknownColor("crimson".into()))
        );
    }

    #[test]
    fn test_compile_rejects_unclosed_color() {
        assert_eq!(
            WritePattern::compile("%[red m"),
            Err(SyntaxError::Missing(']'))
        );
    }

    #[test]
    fn test_render_fields_and_literals() {
        let pattern = WritePattern::compile("%n[%p]: %m").unwrap();
        assert_eq!(pattern.render_line(&sample()), "sshd[4211]: session opened");
    }

    #[test]
    fn test_render_percent_escape() {
        let pattern = WritePattern::compile("%l at 100%%").unwrap();
        assert_eq!(pattern.render_line(&sample()), "warn at 100%");
    }

    #[test]
    fn test_render_time_with_template() {
        let pattern = WritePattern::compile("%t(dd/mm/yyyy HH:MM)").unwrap();
        assert_eq!(pattern.render_line(&sample()), "05/03/2024 10:20");
    }

    #[test]
    fn test_render_unset_fields_are_empty() {
        let pattern = WritePattern::compile("<%t><%p><%g>").unwrap();
        assert_eq!(pattern.render_line(&Entry::new()), "<><><>");
    }

    #[test]
    fn test_render_line_and_lino() {
        let pattern = WritePattern::compile("%d: %#").unwrap();
        assert_eq!(pattern.render_line(&sample()), "7: raw input line");
    }

    #[test]
    fn test_width_pads_short_content() {
        let pattern = WritePattern::compile("%10l|").unwrap();
        assert_eq!(pattern.render_line(&sample()), "warn      |");
    }

    #[test]
    fn test_width_truncates_long_content() {
        let pattern = WritePattern::compile("%7m|").unwrap();
        assert_eq!(pattern.render_line(&sample()), "session|");
    }

    #[test]
    fn test_color_wraps_field_with_reset() {
        let pattern = WritePattern::compile("%[red]l").unwrap();
        assert_eq!(pattern.render_line(&sample()), "\x1b[31mwarn\x1b[0m");
    }

    #[test]
    fn test_color_with_background() {
        let pattern = WritePattern::compile("%[red,white]l").unwrap();
        assert_eq!(
            pattern.render_line(&sample()),
            "\x1b[31m\x1b[47mwarn\x1b[0m"
        );
    }

    #[test]
    fn test_color_and_width_leave_content_intact() {
        let entry = sample();
        let plain = WritePattern::compile("%m").unwrap().render_line(&entry);
        let fancy = WritePattern::compile("%20[red]m")
            .unwrap()
            .render_line(&entry);
        assert_eq!(strip_ansi(&fancy).trim_end(), plain);
    }

    #[test]
    fn test_colors_disabled_compile_to_plain_text() {
        let pattern = WritePattern::compile_with_colors("%[red]l", false).unwrap();
        assert_eq!(pattern.render_line(&sample()), "warn");
    }

    #[test]
    fn test_colors_disabled_still_validate_names() {
        assert_eq!(
            WritePattern::compile_with_colors("%[mauve]l", false),
            Err(SyntaxError::UnknownColor("mauve".into()))
        );
    }

    #[test]
    fn test_word_selectors() {
        let entry = sample();
        assert_eq!(
            WritePattern::compile("%w(verb)").unwrap().render_line(&entry),
            "login"
        );
        assert_eq!(
            WritePattern::compile("%w(1)").unwrap().render_line(&entry),
            "beta"
        );
        // bare %w selects nothing
        assert_eq!(
            WritePattern::compile("<%w>").unwrap().render_line(&entry),
            "<>"
        );
    }
}
