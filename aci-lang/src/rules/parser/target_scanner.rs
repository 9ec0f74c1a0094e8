use log::trace;
use nom::branch::alt;
use nom::bytes::complete::{tag, take_while1};
use nom::character::complete::{char, multispace0};
use nom::combinator::{all_consuming, map, value};
use nom::error::context;
use nom::multi::many0;
use nom::sequence::{preceded, terminated};

use crate::rules::keywords::Operator;
use crate::rules::parser::bind_scanner::quoted;
use crate::rules::parser::{from_str2, IResult, Span};
use crate::rules::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TargetToken {
    Open,
    Close,
    Operator(Operator),
    Pipe,
    Keyword(String),
    Value(String),
}

fn open(input: Span) -> IResult<Span, TargetToken> {
    value(TargetToken::Open, char('('))(input)
}

fn close(input: Span) -> IResult<Span, TargetToken> {
    value(TargetToken::Close, char(')'))(input)
}

fn operator(input: Span) -> IResult<Span, TargetToken> {
    alt((
        value(TargetToken::Operator(Operator::Ne), tag("!=")),
        value(TargetToken::Operator(Operator::Eq), tag("=")),
    ))(input)
}

fn pipe(input: Span) -> IResult<Span, TargetToken> {
    value(TargetToken::Pipe, tag("||"))(input)
}

fn keyword(input: Span) -> IResult<Span, TargetToken> {
    map(
        take_while1(|c: char| c.is_ascii_alphabetic() || c == '_'),
        |s: Span| TargetToken::Keyword((*s.fragment()).to_string()),
    )(input)
}

fn token(input: Span) -> IResult<Span, TargetToken> {
    preceded(
        multispace0,
        alt((
            open,
            close,
            operator,
            pipe,
            map(quoted, TargetToken::Value),
            keyword,
        )),
    )(input)
}

///
/// Splits Target Rule text into tokens. Only parentheses, `=`, `!=`, `||`,
/// quoted values and keyword runs are recognized; anything else is a
/// lexical error.
///
pub(crate) fn tokenize(text: &str) -> Result<Vec<TargetToken>> {
    let span = from_str2(text);
    let (_rest, tokens) =
        context("target rule", all_consuming(terminated(many0(token), multispace0)))(span)?;
    trace!("target rule tokens {:?}", tokens);
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::errors::Error;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn scans_multi_valued_clause() {
        let tokens = tokenize(r#"(targetcontrol = "1.2.3.4" || "5.6.7.8")"#).unwrap();
        assert_eq!(
            tokens,
            vec![
                TargetToken::Open,
                TargetToken::Keyword("targetcontrol".to_string()),
                TargetToken::Operator(Operator::Eq),
                TargetToken::Value("1.2.3.4".to_string()),
                TargetToken::Pipe,
                TargetToken::Value("5.6.7.8".to_string()),
                TargetToken::Close,
            ]
        );
    }

    #[test]
    fn scans_adjacent_clauses_without_whitespace() {
        let tokens =
            tokenize(r#"(targetattr!="userPassword")(target_to="ldap:///dc=example")"#).unwrap();
        assert_eq!(tokens.len(), 10);
        assert_eq!(tokens[2], TargetToken::Operator(Operator::Ne));
        assert_eq!(tokens[6], TargetToken::Keyword("target_to".to_string()));
    }

    #[test]
    fn parentheses_inside_quotes_are_values() {
        let tokens = tokenize(r#"(targetfilter = "(&(cn=a)(sn=b))")"#).unwrap();
        assert_eq!(tokens[3], TargetToken::Value("(&(cn=a)(sn=b))".to_string()));
    }

    #[rstest]
    #[case(r#"(targetscope >= "base")"#)]
    #[case(r#"(targetattr = *)"#)]
    #[case(r#"(target3 = "x")"#)]
    #[case(r#"(targetattr = "cn)"#)]
    #[case(r#"(targetattr = "cn" | "sn")"#)]
    fn lexical_errors(#[case] text: &str) {
        assert!(matches!(tokenize(text), Err(Error::LexError(_))), "{text}");
    }

    #[test]
    fn lexical_errors_carry_location_and_context() {
        assert_eq!(
            tokenize(r#"(targetattr = *)"#).unwrap_err(),
            Error::LexError(
                "Error scanning at line 1 at column 15, when handling target rule, fragment *)"
                    .to_string()
            )
        );
    }
}
