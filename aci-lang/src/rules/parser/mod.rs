//!
//! Scanners for the two textual sub-languages of an Access Control Instruction.
//!
//! The grammar accepted across the crate, informally in ABNF form
//!
//! ```ABNF
//!  instruction         = [target_rule] "(" "version 3.0;" *WSP "acl" *WSP DQUOTE acl DQUOTE ";"
//!                        1*pbr_item ")"
//!  target_rule         = 0*9 ( "(" target_keyword *WSP ("=" / "!=") *WSP
//!                              quoted *( *WSP "||" *WSP quoted ) *WSP ")" )
//!  pbr_item            = permission 1*WSP bind_rule *WSP ";"
//!  permission          = ("allow" / "deny") "(" right *("," right) ")"
//!  bind_rule           = operand *( 1*WSP ("AND" / "AND NOT" / "OR") 1*WSP operand )
//!  operand             = "(" bind_rule ")" / bind_keyword *WSP cmp *WSP (quoted / bare)
//!  cmp                 = "<=" / ">=" / "!=" / "=" / "<" / ">"
//!  quoted              = DQUOTE <any char, \" escapes a quote> DQUOTE
//! ```
//!
//! Mixing `AND` and `OR` at one nesting level is rejected; parentheses are the
//! only way to combine the two.
//!
use std::fmt::Formatter;

use nom::error::{ContextError, ErrorKind, ParseError};
use nom_locate::LocatedSpan;
use serde::{Deserialize, Serialize};

pub(crate) mod bind_scanner;
pub(crate) mod target_scanner;

pub(crate) type Span<'a> = LocatedSpan<&'a str, &'a str>;

pub(crate) fn from_str2(in_str: &str) -> Span {
    Span::new_extra(in_str, "")
}

pub(crate) type IResult<'a, I, O> = nom::IResult<I, O, ParserError<'a>>;

#[derive(Clone, PartialEq, Debug)]
pub(crate) struct ParserError<'a> {
    pub(crate) context: String,
    pub(crate) span: Span<'a>,
    pub(crate) kind: ErrorKind,
}

impl<'a> ParseError<Span<'a>> for ParserError<'a> {
    fn from_error_kind(input: Span<'a>, kind: ErrorKind) -> Self {
        ParserError {
            context: "".to_string(),
            span: input,
            kind,
        }
    }

    fn append(_input: Span<'a>, _kind: ErrorKind, other: Self) -> Self {
        other
    }
}

impl<'a> ContextError<Span<'a>> for ParserError<'a> {
    fn add_context(_input: Span<'a>, ctx: &'static str, other: Self) -> Self {
        let context = if other.context.is_empty() {
            ctx.to_string()
        } else {
            format!("{}/{}", ctx, other.context)
        };

        ParserError {
            context,
            span: other.span,
            kind: other.kind,
        }
    }
}

impl<'a> std::fmt::Display for ParserError<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let message = format!(
            "Error scanning at line {} at column {}, when handling {}, fragment {}",
            self.span.location_line(),
            self.span.get_utf8_column(),
            self.context,
            *self.span.fragment()
        );
        f.write_str(&message)?;
        Ok(())
    }
}

/// Knobs for the text parsers.
///
/// Bind Rules recurse once per parenthesis level; `max_nesting_depth` bounds
/// that recursion so adversarial input cannot exhaust the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseOptions {
    pub max_nesting_depth: usize,
}

pub const DEFAULT_MAX_NESTING_DEPTH: usize = 64;

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
        }
    }
}

impl ParseOptions {
    pub fn with_max_nesting_depth(mut self, depth: usize) -> Self {
        self.max_nesting_depth = depth;
        self
    }
}

//
// Splits `input` on `delim` wherever it is not inside a double quoted run.
// A backslash escapes the character that follows it both inside and outside
// quotes. Segments are returned untrimmed.
//
pub(crate) fn split_unquoted(input: &str, delim: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut in_quote = false;
    let mut escaped = false;
    let mut start = 0;
    for (idx, ch) in input.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            '"' => in_quote = !in_quote,
            c if c == delim && !in_quote => {
                parts.push(&input[start..idx]);
                start = idx + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&input[start..]);
    parts
}

//
// Position of the first `"` in `input` that is not preceded by a backslash.
//
pub(crate) fn find_unescaped_quote(input: &str) -> Option<usize> {
    let mut escaped = false;
    for (idx, ch) in input.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            '"' => return Some(idx),
            _ => {}
        }
    }
    None
}
