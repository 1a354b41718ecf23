//! Read-pattern compiler: turns a line-layout string into a line parser.
//!
//! Specifiers:
//! - `%t[(template)]` time, optional symbolic template
//! - `%n` process, `%p` pid, `%u` user, `%g` group, `%l` level
//! - `%h[(components)]` host, optional component sub-grammar
//! - `%m` message (quoted literal, or the rest of the line)
//! - `%w[(name)]` word capture, optionally named
//! - `%b` run of blanks, discarded
//! - `%%` one literal percent sign; any other character matches itself

use crate::entry::Entry;
use crate::error::{MatchError, SyntaxError};
use crate::scanner::{is_blank, is_quote, Scanner};
use crate::timefmt::{parse_time_format, parse_with_format};

/// One compiled extractor. A pattern compiles to an ordered list of these,
/// run left to right against the line scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOp {
    Literal(String),
    /// Native time format produced by the template translator.
    Time(String),
    Process,
    Pid,
    User,
    Group,
    Level,
    Message,
    /// `None` reads a bare alpha run; `Some` runs the component sub-grammar.
    Host(Option<Vec<HostOp>>),
    /// Word capture, recorded under the given name when one is present.
    Word(Option<String>),
    Blank,
}

/// One step of the `%h(...)` sub-grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostOp {
    Component(HostComponent),
    /// Literal separator, matched exactly and kept in the joined host value.
    Sep(char),
}

/// Address-component kinds accepted inside `%h(...)`. Every kind currently
/// reads an alpha run; the split by kind is the seam for per-kind validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostComponent {
    Hostname,
    Fqdn,
    Ip4,
    Ip6,
    Port,
    Mask,
}

impl HostComponent {
    fn from_name(name: &str) -> Result<Self, SyntaxError> {
        match name {
            "hostname" => Ok(HostComponent::Hostname),
            "fqdn" => Ok(HostComponent::Fqdn),
            "ip4" => Ok(HostComponent::Ip4),
            "ip6" => Ok(HostComponent::Ip6),
            "port" => Ok(HostComponent::Port),
            "mask" => Ok(HostComponent::Mask),
            _ => Err(SyntaxError::UnknownHostComponent(name.to_string())),
        }
    }

    fn read(&self, sc: &mut Scanner) -> String {
        sc.read_alpha()
    }
}

/// A compiled read pattern. Immutable once compiled; safe to apply from many
/// threads as long as each call gets its own entry and scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadPattern {
    ops: Vec<ReadOp>,
}

impl ReadPattern {
    pub fn compile(pattern: &str) -> Result<Self, SyntaxError> {
        if pattern.is_empty() {
            return Err(SyntaxError::EmptyPattern);
        }
        let mut sc = Scanner::new(pattern);
        let mut ops = Vec::new();
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
                ops.push(ReadOp::Literal(std::mem::take(&mut lit)));
            }
            ops.push(parse_specifier(&mut sc)?);
        }
        if !lit.is_empty() {
            ops.push(ReadOp::Literal(lit));
        }
        Ok(ReadPattern { ops })
    }

    /// Runs the extractors in pattern order, short-circuiting on the first
    /// mismatch. The entry is left partially filled on failure; callers
    /// discard it.
    pub fn apply(&self, entry: &mut Entry, sc: &mut Scanner) -> Result<(), MatchError> {
        for op in &self.ops {
            op.apply(entry, sc)?;
        }
        Ok(())
    }

    /// Parses one line into a fresh entry.
    pub fn parse_line(&self, line: &str) -> Result<Entry, MatchError> {
        let mut entry = Entry::new();
        let mut sc = Scanner::new(line);
        self.apply(&mut entry, &mut sc)?;
        Ok(entry)
    }
}

fn parse_specifier(sc: &mut Scanner) -> Result<ReadOp, SyntaxError> {
    match sc.read() {
        Some('t') => Ok(ReadOp::Time(parse_time_format(sc)?)),
        Some('b') => Ok(ReadOp::Blank),
        Some('n') => Ok(ReadOp::Process),
        Some('p') => Ok(ReadOp::Pid),
        Some('u') => Ok(ReadOp::User),
        Some('g') => Ok(ReadOp::Group),
        Some('h') => Ok(ReadOp::Host(parse_host_format(sc)?)),
        Some('l') => Ok(ReadOp::Level),
        Some('m') => Ok(ReadOp::Message),
        Some('w') => Ok(ReadOp::Word(parse_capture_name(sc)?)),
        Some(other) => Err(SyntaxError::UnknownReadSpecifier(other)),
        None => Err(SyntaxError::UnexpectedEnd),
    }
}

fn parse_capture_name(sc: &mut Scanner) -> Result<Option<String>, SyntaxError> {
    if sc.peek() != Some('(') {
        return Ok(None);
    }
    sc.read();
    let name = sc.read_until(|c| c != ')');
    match sc.read() {
        Some(')') => Ok((!name.is_empty()).then_some(name)),
        _ => Err(SyntaxError::Missing(')')),
    }
}

fn parse_host_format(sc: &mut Scanner) -> Result<Option<Vec<HostOp>>, SyntaxError> {
    if sc.peek() != Some('(') {
        return Ok(None);
    }
    sc.read();
    let mut ops = Vec::new();
    loop {
        match sc.peek() {
            None => return Err(SyntaxError::Missing(')')),
            Some(')') => {
                sc.read();
                break;
            }
            Some(c) if c.is_ascii_alphanumeric() => {
                let name = sc.read_until(|c| c.is_ascii_alphanumeric());
                ops.push(HostOp::Component(HostComponent::from_name(&name)?));
            }
            Some(c) => {
                sc.read();
                ops.push(HostOp::Sep(c));
            }
        }
    }
    Ok(Some(ops))
}

impl ReadOp {
    fn apply(&self, entry: &mut Entry, sc: &mut Scanner) -> Result<(), MatchError> {
        match self {
            ReadOp::Literal(text) => {
                for want in text.chars() {
                    match sc.read() {
                        Some(got) if got == want => {}
                        Some(got) => return Err(MatchError::Mismatch { want, got }),
                        None => return Err(MatchError::EndOfLine),
                    }
                }
            }
            ReadOp::Time(format) => {
                let text = read_time_text(sc, format);
                match parse_with_format(&text, format) {
                    Some(when) => entry.timestamp = Some(when),
                    None => return Err(MatchError::Time(text)),
                }
            }
            ReadOp::Process => entry.process = sc.read_literal(),
            ReadOp::Pid => {
                let text = sc.read_literal();
                match text.parse() {
                    Ok(pid) => entry.pid = Some(pid),
                    Err(_) => return Err(MatchError::Number(text)),
                }
            }
            ReadOp::User => entry.user = sc.read_literal(),
            ReadOp::Group => entry.group = sc.read_literal(),
            ReadOp::Level => entry.level = sc.read_literal(),
            ReadOp::Message => {
                entry.message = match sc.peek() {
                    Some(c) if is_quote(c) => sc.read_literal(),
                    _ => sc.read_rest(),
                };
            }
            ReadOp::Host(None) => entry.host = sc.read_alpha(),
            ReadOp::Host(Some(ops)) => entry.host = apply_host(ops, sc)?,
            ReadOp::Word(name) => {
                let word = sc.read_literal();
                if let Some(name) = name {
                    entry.named.insert(name.clone(), word.clone());
                }
                entry.words.push(word);
            }
            ReadOp::Blank => {
                sc.read_blank();
            }
        }
        Ok(())
    }
}

/// A time value may span several whitespace-separated parts; the translated
/// format's space count says how many. Parts are re-joined with single
/// spaces, which also normalizes syslog's double-space day padding.
fn read_time_text(sc: &mut Scanner, format: &str) -> String {
    let parts = format.matches(' ').count();
    let mut text = String::new();
    for i in 0..=parts {
        text.push_str(&sc.read_until(|c| !is_blank(c)));
        if i < parts {
            sc.read_blank();
            text.push(' ');
        }
    }
    text
}

fn apply_host(ops: &[HostOp], sc: &mut Scanner) -> Result<String, MatchError> {
    let mut host = String::new();
    for op in ops {
        match op {
            HostOp::Component(component) => host.push_str(&component.read(sc)),
            HostOp::Sep(want) => match sc.read() {
                Some(got) if got == *want => host.push(got),
                Some(got) => return Err(MatchError::Mismatch { want: *want, got }),
                None => return Err(MatchError::EndOfLine),
            },
        }
    }
    Ok(host)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::DEFAULT_PATTERN;
    use chrono::NaiveDate;

    #[test]
    fn test_compile_rejects_empty() {
        assert_eq!(ReadPattern::compile(""), Err(SyntaxError::EmptyPattern));
    }

    #[test]
    fn test_compile_rejects_unknown_specifier() {
        assert_eq!(
            ReadPattern::compile("%z"),
            Err(SyntaxError::UnknownReadSpecifier('z'))
        );
    }

    #[test]
    fn test_compile_rejects_trailing_percent() {
        assert_eq!(ReadPattern::compile("abc%"), Err(SyntaxError::UnexpectedEnd));
    }

    #[test]
    fn test_compile_rejects_unterminated_time_template() {
        assert_eq!(
            ReadPattern::compile("%t(yyyy-mm-dd"),
            Err(SyntaxError::Missing(')'))
        );
    }

    #[test]
    fn test_percent_escape_matches_one_percent() {
        let pattern = ReadPattern::compile("100%% %l").unwrap();
        let entry = pattern.parse_line("100% done").unwrap();
        assert_eq!(entry.level, "done");
    }

    #[test]
    fn test_parse_default_syslog_layout() {
        let pattern = ReadPattern::compile(DEFAULT_PATTERN).unwrap();
        let entry = pattern
            .parse_line("Jun 14 15:16:01 root sshd[4211]: Accepted password for root")
            .unwrap();
        assert_eq!(
            entry.timestamp,
            NaiveDate::from_ymd_opt(1970, 6, 14)
                .unwrap()
                .and_hms_opt(15, 16, 1)
        );
        assert_eq!(entry.user, "root");
        assert_eq!(entry.process, "sshd");
        assert_eq!(entry.pid, Some(4211));
        assert_eq!(entry.message, "Accepted password for root");
    }

    #[test]
    fn test_literal_mismatch_is_recoverable() {
        let pattern = ReadPattern::compile("%u: %m").unwrap();
        let err = pattern.parse_line("root; broken").unwrap_err();
        assert_eq!(err, MatchError::Mismatch { want: ':', got: ';' });
    }

    #[test]
    fn test_non_numeric_pid_is_recoverable() {
        let pattern = ReadPattern::compile("%n[%p]").unwrap();
        let err = pattern.parse_line("sshd[oops]").unwrap_err();
        assert_eq!(err, MatchError::Number("oops".into()));
    }

    #[test]
    fn test_unparseable_time_is_recoverable() {
        let pattern = ReadPattern::compile("%t(yyyy-mm-dd) %m").unwrap();
        assert!(matches!(
            pattern.parse_line("yesterday it broke").unwrap_err(),
            MatchError::Time(_)
        ));
    }

    #[test]
    fn test_word_captures_positional_and_named() {
        let pattern = ReadPattern::compile("%w %w(verb) %w").unwrap();
        let entry = pattern.parse_line("alice login ok").unwrap();
        assert_eq!(entry.words, vec!["alice", "login", "ok"]);
        assert_eq!(entry.named.get("verb").map(String::as_str), Some("login"));
        assert_eq!(entry.named.len(), 1);
    }

    #[test]
    fn test_quoted_values_read_verbatim() {
        let pattern = ReadPattern::compile("%u said %m").unwrap();
        let entry = pattern.parse_line("'alice b' said 'hi there'").unwrap();
        assert_eq!(entry.user, "alice b");
        assert_eq!(entry.message, "hi there");
    }

    #[test]
    fn test_message_consumes_rest_of_line() {
        let pattern = ReadPattern::compile("%l: %m").unwrap();
        let entry = pattern.parse_line("warn: disk 87% full, check /var").unwrap();
        assert_eq!(entry.message, "disk 87% full, check /var");
    }

    #[test]
    fn test_blank_discards_whitespace_run() {
        let pattern = ReadPattern::compile("%u%b%l").unwrap();
        let entry = pattern.parse_line("root   \twarn").unwrap();
        assert_eq!(entry.user, "root");
        assert_eq!(entry.level, "warn");
    }

    #[test]
    fn test_bare_host_reads_alpha_run() {
        let pattern = ReadPattern::compile("%h %m").unwrap();
        let entry = pattern.parse_line("web01.example.com boot ok").unwrap();
        assert_eq!(entry.host, "web01.example.com");
    }

    #[test]
    fn test_host_subgrammar_joins_components() {
        let pattern = ReadPattern::compile("%h(ip4:port) %m").unwrap();
        let entry = pattern.parse_line("10.0.0.7:8080 connected").unwrap();
        assert_eq!(entry.host, "10.0.0.7:8080");
    }

    #[test]
    fn test_host_subgrammar_separator_mismatch() {
        let pattern = ReadPattern::compile("%h(ip4:port)").unwrap();
        assert_eq!(
            pattern.parse_line("10.0.0.7/8080").unwrap_err(),
            MatchError::Mismatch { want: ':', got: '/' }
        );
    }

    #[test]
    fn test_host_subgrammar_rejects_unknown_component() {
        assert_eq!(
            ReadPattern::compile("%h(ipv9)"),
            Err(SyntaxError::UnknownHostComponent("ipv9".into()))
        );
    }

    #[test]
    fn test_host_subgrammar_unterminated() {
        assert_eq!(
            ReadPattern::compile("%h(ip4:port"),
            Err(SyntaxError::Missing(')'))
        );
    }

    #[test]
    fn test_time_iso_template() {
        let pattern = ReadPattern::compile("%t(yyyy-mm-ddTHH:MM:ss) %m").unwrap();
        let entry = pattern.parse_line("2024-03-05T10:20:30 started").unwrap();
        assert_eq!(
            entry.timestamp,
            NaiveDate::from_ymd_opt(2024, 3, 5)
                .unwrap()
                .and_hms_opt(10, 20, 30)
        );
        assert_eq!(entry.message, "started");
    }

    #[test]
    fn test_syslog_single_digit_day() {
        let pattern = ReadPattern::compile("%t(mmm d HH:MM:ss) %m").unwrap();
        // syslog pads single-digit days with a second space
        let entry = pattern.parse_line("Jun  2 03:04:05 rotated logs").unwrap();
        assert_eq!(
            entry.timestamp,
            NaiveDate::from_ymd_opt(1970, 6, 2)
                .unwrap()
                .and_hms_opt(3, 4, 5)
        );
    }
}
