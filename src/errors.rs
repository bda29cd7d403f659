//! The two error surfaces: `AnalysisMessage` for the analyzer's
//! accumulated, non-fatal diagnostics, and `EvalError` for the evaluator's
//! fatal runtime errors.

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::ast::Span;
use crate::types::{type_string, Type};

/// One analyzer diagnostic. Analyzer errors/warnings are *data*: they are
/// collected into `AnalysisResult` rather than returned as `Result::Err`
/// (analysis never halts on error).
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisMessage {
    pub text: String,
    pub span: Option<Span>,
}

impl AnalysisMessage {
    pub fn new(text: impl Into<String>, span: Option<Span>) -> Self {
        Self {
            text: text.into(),
            span,
        }
    }

    /// Promotes this message to a `miette::Report` a host can render with
    /// full source context. This crate never opens or caches source files
    /// itself (that is the host's/CLI's job); it just hands back the hook.
    pub fn to_miette(&self, file_name: &str, source: &str) -> miette::Report {
        let offset = self.span.map(|s| line_col_to_offset(source, s)).unwrap_or(0);
        miette::Report::new(RenderedMessage {
            message: self.text.clone(),
            src: NamedSource::new(file_name, source.to_string()),
            span: SourceSpan::new(offset.into(), 0),
        })
    }
}

impl std::fmt::Display for AnalysisMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.span {
            Some(span) => write!(f, "{} ({span})", self.text),
            None => write!(f, "{}", self.text),
        }
    }
}

fn line_col_to_offset(source: &str, span: Span) -> usize {
    let mut offset = 0usize;
    for (idx, line) in source.split_inclusive('\n').enumerate() {
        if idx as u32 + 1 == span.line {
            return offset + (span.column.saturating_sub(1)) as usize;
        }
        offset += line.len();
    }
    offset
}

#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(uguisu::analysis))]
struct RenderedMessage {
    message: String,
    #[source_code]
    src: NamedSource<String>,
    #[label("here")]
    span: SourceSpan,
}

// ---------------------------------------------------------------------
// Analyzer message constructors — one per diagnostic kind.
// ---------------------------------------------------------------------

pub fn duplicate_declaration(name: &str, span: Span) -> AnalysisMessage {
    AnalysisMessage::new(format!("'{name}' is already declared."), Some(span))
}

pub fn unknown_identifier(name: &str, span: Span) -> AnalysisMessage {
    AnalysisMessage::new(format!("unknown identifier '{name}'."), Some(span))
}

pub fn unknown_field(struct_name: &str, field: &str, span: Span) -> AnalysisMessage {
    AnalysisMessage::new(
        format!("struct '{struct_name}' has no field '{field}'."),
        Some(span),
    )
}

pub fn unknown_type_name(name: &str, span: Span) -> AnalysisMessage {
    AnalysisMessage::new(format!("unknown type '{name}'."), Some(span))
}

pub fn invalid_type_name(name: &str, span: Span) -> AnalysisMessage {
    AnalysisMessage::new(format!("'{name}' is not a type."), Some(span))
}

pub fn invalid_assign_target(span: Span) -> AnalysisMessage {
    AnalysisMessage::new("invalid assignment target.", Some(span))
}

pub fn parameter_type_missing(name: &str, span: Span) -> AnalysisMessage {
    AnalysisMessage::new(format!("parameter '{name}' has no type."), Some(span))
}

pub fn argument_count_mismatch(expected: usize, actual: usize, span: Span) -> AnalysisMessage {
    AnalysisMessage::new(
        format!("expected {expected} argument(s), found {actual}."),
        Some(span),
    )
}

pub fn type_mismatch(expected: &Type, actual: &Type, span: Span) -> AnalysisMessage {
    AnalysisMessage::new(
        format!(
            "type mismatched. expected '{}', found '{}'",
            type_string(expected),
            type_string(actual)
        ),
        Some(span),
    )
}

pub fn use_before_assign(span: Span) -> AnalysisMessage {
    AnalysisMessage::new("variable is not assigned yet.", Some(span))
}

pub fn void_as_expression(span: Span) -> AnalysisMessage {
    AnalysisMessage::new("'void' cannot be used as a value.", Some(span))
}

pub fn break_outside_loop(span: Span) -> AnalysisMessage {
    AnalysisMessage::new("invalid break statement.", Some(span))
}

pub fn duplicate_struct_field(name: &str, span: Span) -> AnalysisMessage {
    AnalysisMessage::new(format!("field '{name}' is already supplied."), Some(span))
}

pub fn missing_struct_field(struct_name: &str, field: &str, span: Span) -> AnalysisMessage {
    AnalysisMessage::new(
        format!("struct '{struct_name}' is missing field '{field}'."),
        Some(span),
    )
}

pub fn invalid_char_literal(text: &str, span: Span) -> AnalysisMessage {
    AnalysisMessage::new(
        format!("'{text}' is not a single character."),
        Some(span),
    )
}

pub fn invalid_callee(span: Span) -> AnalysisMessage {
    AnalysisMessage::new("expression is not callable.", Some(span))
}

pub fn struct_not_callable(name: &str, span: Span) -> AnalysisMessage {
    AnalysisMessage::new(format!("struct '{name}' is not callable."), Some(span))
}

pub fn struct_equality_unsupported(span: Span) -> AnalysisMessage {
    AnalysisMessage::new("structs are not equatable.", Some(span))
}

pub fn exported_not_supported_warning(span: Span) -> AnalysisMessage {
    AnalysisMessage::new("exported function is not supported yet", Some(span))
}

pub fn array_element_type_unchecked_warning() -> AnalysisMessage {
    AnalysisMessage::new(
        "type checking of array elements is not supported yet",
        None,
    )
}

// ---------------------------------------------------------------------
// Evaluator errors — fatal, returned via `Result`.
// ---------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum EvalError {
    #[error("'{name}' is not defined (at {span})")]
    #[diagnostic(code(uguisu::eval::undefined))]
    NotDefined { name: String, span: Span },

    #[error("variable is not assigned yet (at {span})")]
    #[diagnostic(code(uguisu::eval::unassigned))]
    NotAssigned { span: Span },

    #[error("expected {expected} argument(s), found {actual} (at {span})")]
    #[diagnostic(code(uguisu::eval::arity))]
    ArityMismatch {
        expected: usize,
        actual: usize,
        span: Span,
    },

    #[error("type mismatch: expected '{expected}', found '{actual}' (at {span})")]
    #[diagnostic(code(uguisu::eval::type_mismatch))]
    TypeMismatch {
        expected: String,
        actual: String,
        span: Span,
    },

    #[error("arithmetic on non-number value (at {span})")]
    #[diagnostic(code(uguisu::eval::arithmetic))]
    NotANumber { span: Span },

    #[error("unsupported assignment target (at {span})")]
    #[diagnostic(code(uguisu::eval::assign_target))]
    UnsupportedAssignTarget { span: Span },

    #[error("attempted to pop the root environment frame")]
    #[diagnostic(code(uguisu::eval::left_root_frame))]
    LeftRootFrame,

    #[error("entry point 'main' is missing")]
    #[diagnostic(code(uguisu::eval::no_entry_point))]
    MissingEntryPoint,

    #[error("entry point 'main' is not a function")]
    #[diagnostic(code(uguisu::eval::invalid_entry_point))]
    EntryPointNotAFunction,

    #[error("recursion limit exceeded (at {span})")]
    #[diagnostic(code(uguisu::eval::recursion_limit))]
    RecursionLimit { span: Span },

    #[error("host did not provide stdin")]
    #[diagnostic(code(uguisu::eval::no_stdin))]
    StdinMissing,

    /// Catch-all for built-in-function failures that are not one of the
    /// named kinds above (e.g. a failed `number.assertEq`, an out-of-range
    /// `array.removeAt`); mirrors a plain "runtime error: {message}".
    #[error("{message}")]
    #[diagnostic(code(uguisu::eval::general))]
    General { message: String },
}
