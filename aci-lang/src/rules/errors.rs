use std::fmt::Formatter;
use thiserror::Error;

use crate::rules::keywords::Operator;
use crate::rules::parser::ParserError;
use crate::rules::Result;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error("Lexical error when scanning `{0}`")]
    LexError(String),
    #[error("Parser Error when parsing `{0}`")]
    ParseError(String),
    #[error("Unknown keyword `{0}`")]
    UnknownKeyword(String),
    #[error("Operator `{operator}` is not permitted for keyword `{keyword}`")]
    OperatorNotPermitted { keyword: String, operator: Operator },
    #[error("Invalid `{keyword}` value: {reason}")]
    InvalidValue { keyword: String, reason: String },
    #[error("Unknown right `{0}`")]
    UnknownRight(String),
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error(transparent)]
    Errors(#[from] Errors),
}

impl Error {
    pub(crate) fn invalid_value(keyword: impl std::fmt::Display, reason: impl Into<String>) -> Self {
        Error::InvalidValue {
            keyword: keyword.to_string(),
            reason: reason.into(),
        }
    }

    /// True for failures raised while turning text into tokens or trees, as
    /// opposed to semantic checks on an already built tree.
    pub fn is_syntax(&self) -> bool {
        matches!(self, Error::LexError(_) | Error::ParseError(_))
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub struct Errors(pub Vec<Error>);

impl Errors {
    /// Folds collected findings into a single result: none is `Ok`, one is
    /// returned as is, several are aggregated.
    pub(crate) fn into_result(mut errors: Vec<Error>) -> Result<()> {
        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(Error::Errors(Errors(errors))),
        }
    }
}

impl std::fmt::Display for Errors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let vec = self
            .0
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<String>>();
        f.write_str(&vec.join("; "))
    }
}

impl<'a> From<nom::Err<ParserError<'a>>> for Error {
    fn from(err: nom::Err<ParserError<'a>>) -> Self {
        let msg = match err {
            nom::Err::Failure(e) | nom::Err::Error(e) => format!("{e}"),
            nom::Err::Incomplete(_) => "More bytes required for parsing".to_string(),
        };
        Error::LexError(msg)
    }
}
