/// Compile-time failures: the pattern or filter expression text itself is
/// malformed. Fatal — no compiled artifact is produced.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyntaxError {
    #[error("empty pattern not allowed")]
    EmptyPattern,

    #[error("unsupported read specifier %{0}")]
    UnknownReadSpecifier(char),

    #[error("unsupported write specifier %{0}")]
    UnknownWriteSpecifier(char),

    #[error("unknown host component '{0}'")]
    UnknownHostComponent(String),

    #[error("unknown color '{0}'")]
    UnknownColor(String),

    #[error("function '{0}' not recognized")]
    UnknownFunction(String),

    #[error("field '{0}' not recognized")]
    UnknownField(String),

    #[error("between expects exactly two values, got {0}")]
    BetweenArity(usize),

    #[error("missing '{0}'")]
    Missing(char),

    #[error("unexpected character '{0}'")]
    Unexpected(char),

    #[error("unexpected end of pattern")]
    UnexpectedEnd,
}

/// Run-time, per-line failure: an input line does not satisfy the compiled
/// read pattern. Recoverable — the reader discards the line and moves on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatchError {
    #[error("characters mismatched: want '{want}', got '{got}'")]
    Mismatch { want: char, got: char },

    #[error("unexpected end of line")]
    EndOfLine,

    #[error("invalid number '{0}'")]
    Number(String),

    #[error("unparseable time '{0}'")]
    Time(String),
}
