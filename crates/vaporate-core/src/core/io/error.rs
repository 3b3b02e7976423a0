use std::io;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse { line: usize, kind: ParseErrorKind },
    #[error("Inconsistent data: {0}")]
    Inconsistency(String),
    #[error("Missing required record: {0}")]
    MissingRecord(String),
}

#[derive(Debug, Error)]
pub enum ParseErrorKind {
    #[error("Invalid integer for {field} (value: '{value}')")]
    InvalidInt { field: &'static str, value: String },
    #[error("Invalid float for {field} (value: '{value}')")]
    InvalidFloat { field: &'static str, value: String },
    #[error("Expected at least {expected} columns, found {found}")]
    TooFewColumns { expected: usize, found: usize },
    #[error("Malformed species legend entry '{0}' (expected ID=LABEL)")]
    InvalidLegendEntry(String),
    #[error("Unexpected record: '{0}'")]
    UnexpectedRecord(String),
}

pub(crate) fn parse_int<T: FromStr>(
    token: &str,
    line: usize,
    field: &'static str,
) -> Result<T, FormatError> {
    token.parse().map_err(|_| FormatError::Parse {
        line,
        kind: ParseErrorKind::InvalidInt {
            field,
            value: token.to_string(),
        },
    })
}

pub(crate) fn parse_float(token: &str, line: usize, field: &'static str) -> Result<f64, FormatError> {
    token.parse().map_err(|_| FormatError::Parse {
        line,
        kind: ParseErrorKind::InvalidFloat {
            field,
            value: token.to_string(),
        },
    })
}

pub(crate) fn require_columns(
    tokens: &[&str],
    expected: usize,
    line: usize,
) -> Result<(), FormatError> {
    if tokens.len() < expected {
        return Err(FormatError::Parse {
            line,
            kind: ParseErrorKind::TooFewColumns {
                expected,
                found: tokens.len(),
            },
        });
    }
    Ok(())
}
