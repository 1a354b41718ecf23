//! Filter-expression compiler: a small boolean query language over entry
//! fields, in function-call syntax:
//!
//! ```text
//! all(eq(level, error), between(pid, 100, 200))
//! any(like(message, timeout), not(eq(user, root)))
//! ```
//!
//! Combinators `all`/`any`/`not`, comparisons `eq ne lt le gt ge`,
//! `like` (substring), `in` (membership) and `between` (inclusive range).
//! Fields: `hostname|host, level, user, group, pid, process, message, time`.

use std::cmp::Ordering;

use chrono::NaiveDateTime;

use crate::entry::Entry;
use crate::error::SyntaxError;
use crate::scanner::Scanner;
use crate::timefmt::parse_time;

/// A compiled filter expression. Evaluation never errors: a value that does
/// not convert to the field's type makes the enclosing comparison false.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// The empty expression accepts everything.
    True,
    All(Vec<Filter>),
    Any(Vec<Filter>),
    Not(Box<Filter>),
    Cmp {
        op: CmpOp,
        field: Field,
        value: String,
    },
    Like {
        field: Field,
        value: String,
    },
    /// Values are sorted at compile time and binary-searched at evaluation.
    In {
        field: Field,
        values: Vec<String>,
    },
    Between {
        field: Field,
        lo: String,
        hi: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CmpOp {
    fn matches(&self, ordering: Ordering) -> bool {
        match self {
            CmpOp::Eq => ordering == Ordering::Equal,
            CmpOp::Ne => ordering != Ordering::Equal,
            CmpOp::Lt => ordering == Ordering::Less,
            CmpOp::Le => ordering != Ordering::Greater,
            CmpOp::Gt => ordering == Ordering::Greater,
            CmpOp::Ge => ordering != Ordering::Less,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Host,
    Level,
    User,
    Group,
    Pid,
    Process,
    Message,
    Time,
}

impl Field {
    fn from_name(name: &str) -> Result<Self, SyntaxError> {
        match name {
            "hostname" | "host" => Ok(Field::Host),
            "level" => Ok(Field::Level),
            "user" => Ok(Field::User),
            "group" => Ok(Field::Group),
            "pid" => Ok(Field::Pid),
            "process" => Ok(Field::Process),
            "message" => Ok(Field::Message),
            "time" => Ok(Field::Time),
            _ => Err(SyntaxError::UnknownField(name.to_string())),
        }
    }

    fn value<'a>(&self, entry: &'a Entry) -> FieldValue<'a> {
        match self {
            Field::Host => FieldValue::Str(&entry.host),
            Field::Level => FieldValue::Str(&entry.level),
            Field::User => FieldValue::Str(&entry.user),
            Field::Group => FieldValue::Str(&entry.group),
            Field::Pid => FieldValue::Int(entry.pid),
            Field::Process => FieldValue::Str(&entry.process),
            Field::Message => FieldValue::Str(&entry.message),
            Field::Time => FieldValue::Time(entry.timestamp),
        }
    }
}

/// A field's typed value: pid compares as integer, time as a parsed
/// timestamp, everything else as string.
enum FieldValue<'a> {
    Int(Option<i64>),
    Str(&'a str),
    Time(Option<NaiveDateTime>),
}

impl FieldValue<'_> {
    /// Typed comparison against a literal; `None` when either side fails to
    /// convert (unset field, non-numeric integer, unparseable time).
    fn compare(&self, literal: &str) -> Option<Ordering> {
        match self {
            FieldValue::Int(Some(v)) => literal.parse::<i64>().ok().map(|n| v.cmp(&n)),
            FieldValue::Str(s) => Some((*s).cmp(literal)),
            FieldValue::Time(Some(t)) => parse_time(literal).map(|w| t.cmp(&w)),
            FieldValue::Int(None) | FieldValue::Time(None) => None,
        }
    }

    /// String representation used by `like` and `in`.
    fn text(&self) -> Option<String> {
        match self {
            FieldValue::Int(Some(v)) => Some(v.to_string()),
            FieldValue::Str(s) => Some((*s).to_string()),
            FieldValue::Time(Some(t)) => Some(t.format("%Y-%m-%d %H:%M:%S").to_string()),
            FieldValue::Int(None) | FieldValue::Time(None) => None,
        }
    }
}

impl Filter {
    /// Compiles a filter expression; the empty string accepts every entry.
    pub fn compile(expr: &str) -> Result<Self, SyntaxError> {
        if expr.is_empty() {
            return Ok(Filter::True);
        }
        let mut sc = Scanner::new(expr);
        let filter = parse_function(&mut sc)?;
        sc.read_blank();
        if let Some(c) = sc.read() {
            return Err(SyntaxError::Unexpected(c));
        }
        Ok(filter)
    }

    pub fn eval(&self, entry: &Entry) -> bool {
        match self {
            Filter::True => true,
            Filter::All(filters) => filters.iter().all(|f| f.eval(entry)),
            Filter::Any(filters) => filters.iter().any(|f| f.eval(entry)),
            Filter::Not(filter) => !filter.eval(entry),
            Filter::Cmp { op, field, value } => match field.value(entry).compare(value) {
                Some(ordering) => op.matches(ordering),
                None => false,
            },
            Filter::Like { field, value } => field
                .value(entry)
                .text()
                .is_some_and(|text| text.contains(value.as_str())),
            Filter::In { field, values } => field
                .value(entry)
                .text()
                .is_some_and(|text| values.binary_search(&text).is_ok()),
            Filter::Between { field, lo, hi } => {
                let value = field.value(entry);
                match (value.compare(lo), value.compare(hi)) {
                    // inclusive, whichever bound is textually first
                    (Some(a), Some(b)) => {
                        (a != Ordering::Less && b != Ordering::Greater)
                            || (b != Ordering::Less && a != Ordering::Greater)
                    }
                    _ => false,
                }
            }
        }
    }
}

fn parse_function(sc: &mut Scanner) -> Result<Filter, SyntaxError> {
    let name = sc.read_text();
    match name.as_str() {
        "all" => Ok(Filter::All(parse_variadic(sc)?)),
        "any" => Ok(Filter::Any(parse_variadic(sc)?)),
        "not" => Ok(Filter::Not(Box::new(parse_unary(sc)?))),
        "eq" => parse_cmp(sc, CmpOp::Eq),
        "ne" => parse_cmp(sc, CmpOp::Ne),
        "lt" => parse_cmp(sc, CmpOp::Lt),
        "le" => parse_cmp(sc, CmpOp::Le),
        "gt" => parse_cmp(sc, CmpOp::Gt),
        "ge" => parse_cmp(sc, CmpOp::Ge),
        "like" => {
            let (field, value) = parse_field_value(sc)?;
            Ok(Filter::Like { field, value })
        }
        "in" => {
            let (field, mut values) = parse_field_list(sc)?;
            values.sort();
            Ok(Filter::In { field, values })
        }
        "between" => {
            let (field, values) = parse_field_list(sc)?;
            let [lo, hi]: [String; 2] = values
                .try_into()
                .map_err(|values: Vec<String>| SyntaxError::BetweenArity(values.len()))?;
            Ok(Filter::Between { field, lo, hi })
        }
        _ => Err(SyntaxError::UnknownFunction(name)),
    }
}

fn parse_cmp(sc: &mut Scanner, op: CmpOp) -> Result<Filter, SyntaxError> {
    let (field, value) = parse_field_value(sc)?;
    Ok(Filter::Cmp { op, field, value })
}

fn parse_field(sc: &mut Scanner) -> Result<Field, SyntaxError> {
    Field::from_name(&sc.read_text())
}

fn parse_field_value(sc: &mut Scanner) -> Result<(Field, String), SyntaxError> {
    expect(sc, '(')?;
    sc.read_blank();
    let field = parse_field(sc)?;
    sc.read_blank();
    expect(sc, ',')?;
    sc.read_blank();
    let value = sc.read_literal();
    sc.read_blank();
    expect(sc, ')')?;
    Ok((field, value))
}

fn parse_field_list(sc: &mut Scanner) -> Result<(Field, Vec<String>), SyntaxError> {
    expect(sc, '(')?;
    sc.read_blank();
    let field = parse_field(sc)?;
    sc.read_blank();
    expect(sc, ',')?;
    let mut values = Vec::new();
    loop {
        sc.read_blank();
        values.push(sc.read_literal());
        sc.read_blank();
        match sc.read() {
            Some(',') => {
                sc.read_blank();
                if sc.peek() == Some(')') {
                    return Err(SyntaxError::Unexpected(','));
                }
            }
            Some(')') => break,
            Some(c) => return Err(SyntaxError::Unexpected(c)),
            None => return Err(SyntaxError::Missing(')')),
        }
    }
    Ok((field, values))
}

fn parse_variadic(sc: &mut Scanner) -> Result<Vec<Filter>, SyntaxError> {
    expect(sc, '(')?;
    let mut filters = Vec::new();
    loop {
        sc.read_blank();
        filters.push(parse_function(sc)?);
        sc.read_blank();
        match sc.read() {
            Some(',') => {
                sc.read_blank();
                if sc.peek() == Some(')') {
                    return Err(SyntaxError::Unexpected(','));
                }
            }
            Some(')') => break,
            Some(c) => return Err(SyntaxError::Unexpected(c)),
            None => return Err(SyntaxError::Missing(')')),
        }
    }
    Ok(filters)
}

fn parse_unary(sc: &mut Scanner) -> Result<Filter, SyntaxError> {
    expect(sc, '(')?;
    sc.read_blank();
    let filter = parse_function(sc)?;
    sc.read_blank();
    expect(sc, ')')?;
    Ok(filter)
}

fn expect(sc: &mut Scanner, want: char) -> Result<(), SyntaxError> {
    match sc.read() {
        Some(c) if c == want => Ok(()),
        _ => Err(SyntaxError::Missing(want)),
    }
}
