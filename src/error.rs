use ariadne::{Color, Fmt, Label, Report, ReportKind, Source};
use std::fmt;
use std::ops::Range;

/// Location of a token or node: character offsets into the source plus the
/// 1-based line the location starts on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
}

impl Span {
    pub fn new(start: usize, end: usize, line: usize) -> Self {
        Self { start, end, line }
    }

    pub fn single(pos: usize, line: usize) -> Self {
        Self {
            start: pos,
            end: pos + 1,
            line,
        }
    }

    /// Span covering both `self` and `other`.
    pub fn to(&self, other: &Span) -> Self {
        Self {
            start: self.start,
            end: other.end,
            line: self.line,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeErrorKind {
    UndefinedName,
    Redefinition,
    InvalidApplication,
    /// A builtin dispatched on arguments it has no rule for. The typed
    /// argument slots in `ast::Builtin` leave no such state to reach.
    UnsupportedOperation,
    DivisionByZero,
    IntegerOverflow,
    PassLimitExceeded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    LexError,
    ParseError,
    RuntimeError(RuntimeErrorKind),
}

#[derive(Debug, Clone)]
pub struct LambError {
    pub kind: ErrorKind,
    pub span: Option<Span>,
    pub message: String,
    pub help: Option<String>,
}

impl LambError {
    pub fn new(kind: ErrorKind, span: Option<Span>, message: String) -> Self {
        Self {
            kind,
            span,
            message,
            help: None,
        }
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Attaches a location to an error raised without one.
    pub fn or_span(mut self, span: &Span) -> Self {
        if self.span.is_none() {
            self.span = Some(span.clone());
        }
        self
    }

    pub fn lex_error(span: Span, message: String) -> Self {
        Self::new(ErrorKind::LexError, Some(span), message)
    }

    pub fn parse_error(span: Span, message: String) -> Self {
        Self::new(ErrorKind::ParseError, Some(span), message)
    }

    pub fn parse_error_with_help(span: Span, message: String, help: &str) -> Self {
        Self::parse_error(span, message).with_help(help)
    }

    pub fn runtime_error(kind: RuntimeErrorKind, span: Option<Span>, message: String) -> Self {
        Self::new(ErrorKind::RuntimeError(kind), span, message)
    }

    pub fn undefined_name(name: &str, span: Option<Span>) -> Self {
        Self::runtime_error(
            RuntimeErrorKind::UndefinedName,
            span,
            format!("Undefined name '{}'", name),
        )
        .with_help("Names must be bound by an assignment, a record, or an enclosing λ before use.")
    }

    pub fn redefinition(name: &str) -> Self {
        Self::runtime_error(
            RuntimeErrorKind::Redefinition,
            None,
            format!("Redefinition of already defined name '{}'", name),
        )
        .with_help("A name can only be bound once per scope. Use a record to shadow it: [x = 2] expr")
    }

    pub fn runtime_kind(&self) -> Option<RuntimeErrorKind> {
        match self.kind {
            ErrorKind::RuntimeError(kind) => Some(kind),
            _ => None,
        }
    }

    pub fn line(&self) -> Option<usize> {
        self.span.as_ref().map(|span| span.line)
    }

    pub fn report(&self, source: &str, filename: Option<&str>) {
        let filename = filename.unwrap_or("<input>");

        let color = match self.kind {
            ErrorKind::LexError => Color::Red,
            ErrorKind::ParseError => Color::Yellow,
            ErrorKind::RuntimeError(_) => Color::Magenta,
        };

        let kind_str = match self.kind {
            ErrorKind::LexError => "Lexical Error",
            ErrorKind::ParseError => "Parse Error",
            ErrorKind::RuntimeError(_) => "Runtime Error",
        };

        let offset = self.span.as_ref().map_or(0, |span| span.start);
        let mut report_builder =
            Report::<(&str, Range<usize>)>::build(ReportKind::Error, filename, offset)
            .with_message(format!("{}: {}", kind_str.fg(color), self.message));

        if let Some(ref span) = self.span {
            report_builder = report_builder.with_label(
                Label::new((filename, span.start..span.end))
                    .with_message(&self.message)
                    .with_color(color),
            );
        }

        if let Some(ref help_text) = self.help {
            report_builder =
                report_builder.with_note(format!("{}: {}", "help".fg(Color::Cyan), help_text));
        }

        if let Err(error) = report_builder
            .finish()
            .eprint((filename, Source::from(source)))
        {
            eprintln!("{} (failed to render diagnostic: {})", self, error);
        }
    }
}

impl fmt::Display for LambError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.span {
            Some(ref span) => write!(f, "{} at line {}", self.message, span.line),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for LambError {}
