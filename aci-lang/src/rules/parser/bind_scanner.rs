use log::trace;
use nom::branch::alt;
use nom::bytes::complete::{tag, take_while, take_while1};
use nom::character::complete::{char, multispace0};
use nom::combinator::{all_consuming, cut, map, value};
use nom::error::context;
use nom::multi::many0;
use nom::sequence::{preceded, terminated};
use nom::Slice;

use crate::rules::errors::Error;
use crate::rules::keywords::Operator;
use crate::rules::parser::{from_str2, IResult, ParserError, Span};
use crate::rules::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenKind {
    And,
    Or,
    Not,
    AndNot,
    Open,
    Close,
    Operator(Operator),
    Value { quoted: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token {
    pub(crate) kind: TokenKind,
    pub(crate) text: String,
}

impl Token {
    fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Token {
            kind,
            text: text.into(),
        }
    }

    pub(crate) fn is_boolean(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::And | TokenKind::Or | TokenKind::Not | TokenKind::AndNot
        )
    }
}

fn is_bare_char(c: char) -> bool {
    !(c.is_whitespace() || matches!(c, '(' | ')' | '"' | '=' | '!' | '<' | '>'))
}

fn open(input: Span) -> IResult<Span, Token> {
    value(Token::new(TokenKind::Open, "("), char('('))(input)
}

fn close(input: Span) -> IResult<Span, Token> {
    value(Token::new(TokenKind::Close, ")"), char(')'))(input)
}

fn operator(input: Span) -> IResult<Span, Token> {
    map(
        alt((
            tag("<="),
            tag(">="),
            tag("!="),
            tag("="),
            tag("<"),
            tag(">"),
        )),
        |s: Span| {
            let op = Operator::SCAN_ORDER
                .iter()
                .copied()
                .find(|op| op.symbol() == *s.fragment())
                .unwrap_or(Operator::Eq);
            Token::new(TokenKind::Operator(op), *s.fragment())
        },
    )(input)
}

//
// A double quoted run up to the next unescaped quote. The text between the
// quotes is kept verbatim, escapes included.
//
pub(crate) fn quoted(input: Span) -> IResult<Span, String> {
    let (input, _begin) = char('"')(input)?;
    let mut span = input;
    let mut consumed = 0;
    loop {
        let (remainder, upto) = take_while(|c| c != '"')(span)?;
        let frag = *upto.fragment();
        consumed += frag.len();
        let backslashes = frag.len() - frag.trim_end_matches('\\').len();
        if backslashes % 2 == 1 {
            if remainder.is_empty() {
                return Err(nom::Err::Failure(ParserError {
                    context: String::from("unterminated quoted value"),
                    kind: nom::error::ErrorKind::Char,
                    span: input,
                }));
            }
            consumed += 1;
            span = remainder.slice(1..);
            continue;
        }
        let (remainder, _end) = cut(char('"'))(remainder).map_err(|_: nom::Err<ParserError>| {
            nom::Err::Failure(ParserError {
                context: String::from("unterminated quoted value"),
                kind: nom::error::ErrorKind::Char,
                span: input,
            })
        })?;
        let text = input.fragment()[..consumed].to_string();
        return Ok((remainder, text));
    }
}

fn quoted_value(input: Span) -> IResult<Span, Token> {
    map(quoted, |text| Token::new(TokenKind::Value { quoted: true }, text))(input)
}

fn bare(input: Span) -> IResult<Span, Token> {
    map(take_while1(is_bare_char), |s: Span| {
        let text = *s.fragment();
        let kind = match text.to_ascii_uppercase().as_str() {
            "AND" => TokenKind::And,
            "OR" => TokenKind::Or,
            "NOT" => TokenKind::Not,
            _ => TokenKind::Value { quoted: false },
        };
        Token::new(kind, text)
    })(input)
}

fn token(input: Span) -> IResult<Span, Token> {
    preceded(
        multispace0,
        alt((open, close, operator, quoted_value, bare)),
    )(input)
}

//
// `AND` directly followed by `NOT` becomes a single `AND NOT` token.
//
fn merge_and_not(tokens: Vec<Token>) -> Vec<Token> {
    let mut merged: Vec<Token> = Vec::with_capacity(tokens.len());
    for token in tokens {
        if token.kind == TokenKind::Not {
            if let Some(last) = merged.last_mut().filter(|t| t.kind == TokenKind::And) {
                last.kind = TokenKind::AndNot;
                last.text = format!("{} {}", last.text, token.text);
                continue;
            }
        }
        merged.push(token);
    }
    merged
}

///
/// Splits Bind Rule text into tokens. Whitespace only separates tokens;
/// `AND`/`OR`/`NOT` are recognized case-insensitively outside quotes.
///
pub(crate) fn tokenize(text: &str) -> Result<Vec<Token>> {
    let span = from_str2(text);
    let (_rest, tokens) =
        context("bind rule", all_consuming(terminated(many0(token), multispace0)))(span)?;
    let tokens = merge_and_not(tokens);
    if let Some(empty) = tokens.iter().find(|t| t.text.is_empty()) {
        return Err(Error::LexError(format!(
            "empty {:?} token in `{}`",
            empty.kind,
            text.trim()
        )));
    }
    trace!("bind rule tokens {:?}", tokens);
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn kinds(text: &str) -> Vec<TokenKind> {
        tokenize(text).unwrap().into_iter().map(|t| t.kind).collect()
    }

    const BARE: TokenKind = TokenKind::Value { quoted: false };
    const QUOTED: TokenKind = TokenKind::Value { quoted: true };

    #[test]
    fn quoted_values_keep_whitespace() {
        let tokens = tokenize(r#"authmethod = "SASL  EXTERNAL""#).unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::new(BARE, "authmethod"),
                Token::new(TokenKind::Operator(Operator::Eq), "="),
                Token::new(QUOTED, "SASL  EXTERNAL"),
            ]
        );
    }

    #[test]
    fn operators_need_no_surrounding_whitespace() {
        assert_eq!(
            kinds(r#"(ssf>="71")"#),
            vec![
                TokenKind::Open,
                BARE,
                TokenKind::Operator(Operator::Ge),
                QUOTED,
                TokenKind::Close
            ]
        );
        assert_eq!(
            kinds("timeofday<1200"),
            vec![BARE, TokenKind::Operator(Operator::Lt), BARE]
        );
    }

    #[test]
    fn and_not_is_merged() {
        let tokens = tokenize(r#"userdn = "x" and  NOT ( userdn = "y" )"#).unwrap();
        assert_eq!(tokens[3].kind, TokenKind::AndNot);
        assert_eq!(tokens[3].text, "and NOT");
        assert_eq!(tokens.len(), 9);
        assert!(tokens.iter().all(|t| t.kind != TokenKind::Not));
    }

    #[test]
    fn boolean_words_inside_quotes_are_values() {
        assert_eq!(
            kinds(r#"userdn = "ldap:///cn=AND OR NOT""#),
            vec![BARE, TokenKind::Operator(Operator::Eq), QUOTED]
        );
    }

    #[test]
    fn escaped_quotes_stay_inside_the_value() {
        let tokens = tokenize(r#"userdn = "cn=say \"hi\",dc=example""#).unwrap();
        assert_eq!(tokens[2].text, r#"cn=say \"hi\",dc=example"#);
    }

    #[test]
    fn standalone_not_is_kept() {
        assert_eq!(
            kinds("NOT ip = x"),
            vec![TokenKind::Not, BARE, TokenKind::Operator(Operator::Eq), BARE]
        );
    }

    #[rstest]
    #[case(r#"userdn = "unterminated"#)]
    #[case(r#"userdn = """#)]
    #[case("ssf ! 3")]
    #[case(r#"userdn = "a\""#)]
    fn lexical_errors(#[case] text: &str) {
        let err = tokenize(text).unwrap_err();
        assert!(matches!(err, Error::LexError(_)), "{text}: {err}");
    }

    #[test]
    fn lexical_errors_carry_location_and_context() {
        assert_eq!(
            tokenize("ssf ! 3").unwrap_err(),
            Error::LexError(
                "Error scanning at line 1 at column 5, when handling bind rule, fragment ! 3"
                    .to_string()
            )
        );
        let err = tokenize(r#"userdn = "open"#).unwrap_err().to_string();
        assert!(err.contains("bind rule/unterminated quoted value"), "{err}");
    }
}
