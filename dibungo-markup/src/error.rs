use thiserror::Error;

pub type MarkupResult<T> = Result<T, MarkupError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarkupError {
    #[error("Parse error at line {line}, column {column}: {message}")]
    ParseError {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("Empty document: no markup found")]
    EmptyDocument,

    #[error("Maximum nesting depth ({max_depth}) exceeded")]
    MaxNestingDepthExceeded { max_depth: usize },
}

impl MarkupError {
    /// Builds a `ParseError` for a byte offset into `input`.
    pub(crate) fn at(input: &str, offset: usize, message: impl Into<String>) -> Self {
        let (line, column) = line_column(input, offset);
        MarkupError::ParseError {
            line,
            column,
            message: message.into(),
        }
    }
}

/// 1-based line and column of a byte offset.
fn line_column(input: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(input.len());
    let before = &input[..offset];
    let line = before.matches('\n').count() + 1;
    let column = match before.rfind('\n') {
        Some(nl) => before[nl + 1..].chars().count() + 1,
        None => before.chars().count() + 1,
    };
    (line, column)
}
