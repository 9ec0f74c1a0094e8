//!
//! Bind Rules: Boolean expressions over requester context predicates.
//!
//! A rule is a tree of [`BindRule`] nodes. `AND` and `OR` never share a
//! nesting level, and `NOT` only appears as a non-first operand of an `AND`
//! (the `AND NOT` form). Operator legality and value shape are checked by
//! [`BindRule::valid`] rather than while parsing, so a parsed tree can be
//! inspected even when it would be refused by a directory server.
//!
use std::convert::TryFrom;
use std::fmt::Formatter;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::rules::errors::{Error, Errors};
use crate::rules::keywords::{BindKeyword, Operator};
use crate::rules::parser::bind_scanner::{tokenize, Token, TokenKind};
use crate::rules::parser::ParseOptions;
use crate::rules::values::{marshal_bind, Expression};
use crate::rules::Result;

#[derive(Eq, PartialEq, Debug, Clone, Hash, Serialize, Deserialize)]
pub struct BindRuleItem {
    pub keyword: BindKeyword,
    pub operator: Operator,
    pub expression: Expression,
    pub parenthesized: bool,
}

impl BindRuleItem {
    pub fn new(keyword: BindKeyword, operator: Operator, expression: Expression) -> Self {
        BindRuleItem {
            keyword,
            operator,
            expression,
            parenthesized: false,
        }
    }

    pub fn valid(&self) -> Result<()> {
        let mut errors = vec![];
        self.collect_errors(&mut errors);
        Errors::into_result(errors)
    }

    fn collect_errors(&self, errors: &mut Vec<Error>) {
        if !self.keyword.permits(self.operator) {
            errors.push(Error::OperatorNotPermitted {
                keyword: self.keyword.to_string(),
                operator: self.operator,
            });
        }
        if !self.expression.fits_bind(self.keyword) {
            errors.push(Error::invalid_value(
                self.keyword,
                format!("`{}` is not a {} value", self.expression, self.keyword),
            ));
        } else if self.expression.is_empty() {
            errors.push(Error::invalid_value(self.keyword, "empty value"));
        }
    }
}

impl std::fmt::Display for BindRuleItem {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} \"{}\"", self.keyword, self.operator, self.expression)
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Hash, Serialize, Deserialize)]
pub enum BindRule {
    Item(BindRuleItem),
    And {
        operands: Vec<BindRule>,
        parenthesized: bool,
    },
    Or {
        operands: Vec<BindRule>,
        parenthesized: bool,
    },
    Not(Box<BindRule>),
}

impl BindRule {
    pub fn parse(text: &str) -> Result<BindRule> {
        BindRule::parse_with(text, &ParseOptions::default())
    }

    pub fn parse_with(text: &str, options: &ParseOptions) -> Result<BindRule> {
        let tokens = tokenize(text)?;
        if tokens.len() < 3 {
            return Err(Error::ParseError(format!(
                "a bind rule needs at least 3 tokens, found {} in `{}`",
                tokens.len(),
                text.trim()
            )));
        }
        let mut parser = BindRuleParser {
            tokens: &tokens,
            position: 0,
            max_depth: options.max_nesting_depth,
        };
        let rule = parser.expression(0)?;
        if let Some(extra) = parser.peek() {
            return Err(Error::ParseError(format!(
                "unbalanced parentheses, unexpected `{}` in `{}`",
                extra.text,
                text.trim()
            )));
        }
        Ok(rule)
    }

    pub fn item(keyword: BindKeyword, operator: Operator, expression: Expression) -> BindRule {
        BindRule::Item(BindRuleItem::new(keyword, operator, expression))
    }

    pub fn and(operands: impl IntoIterator<Item = BindRule>) -> BindRule {
        BindRule::And {
            operands: operands.into_iter().collect(),
            parenthesized: false,
        }
    }

    pub fn or(operands: impl IntoIterator<Item = BindRule>) -> BindRule {
        BindRule::Or {
            operands: operands.into_iter().collect(),
            parenthesized: false,
        }
    }

    pub fn not(inner: BindRule) -> Result<BindRule> {
        if let BindRule::Not(_) = inner {
            return Err(Error::ValidationError(
                "NOT cannot wrap another NOT".to_string(),
            ));
        }
        Ok(BindRule::Not(Box::new(inner)))
    }

    /// Marks the node as written inside parentheses. A `Not` passes the mark
    /// on to the rule it wraps.
    pub fn paren(self) -> BindRule {
        match self {
            BindRule::Item(mut item) => {
                item.parenthesized = true;
                BindRule::Item(item)
            }
            BindRule::And { operands, .. } => BindRule::And {
                operands,
                parenthesized: true,
            },
            BindRule::Or { operands, .. } => BindRule::Or {
                operands,
                parenthesized: true,
            },
            BindRule::Not(inner) => BindRule::Not(Box::new(inner.paren())),
        }
    }

    pub fn is_parenthesized(&self) -> bool {
        match self {
            BindRule::Item(item) => item.parenthesized,
            BindRule::And { parenthesized, .. } | BindRule::Or { parenthesized, .. } => {
                *parenthesized
            }
            BindRule::Not(_) => false,
        }
    }

    /// Appends an operand to an `And` or `Or` node.
    pub fn push(&mut self, rule: BindRule) -> Result<&mut Self> {
        match self {
            BindRule::And { operands, .. } | BindRule::Or { operands, .. } => operands.push(rule),
            BindRule::Item(_) | BindRule::Not(_) => {
                return Err(Error::ValidationError(format!(
                    "cannot add an operand to `{self}`"
                )))
            }
        }
        Ok(self)
    }

    pub fn operands(&self) -> &[BindRule] {
        match self {
            BindRule::And { operands, .. } | BindRule::Or { operands, .. } => operands,
            BindRule::Item(_) | BindRule::Not(_) => &[],
        }
    }

    /// Every item in the tree, left to right.
    pub fn items(&self) -> Vec<&BindRuleItem> {
        let mut items = vec![];
        self.collect_items(&mut items);
        items
    }

    fn collect_items<'r>(&'r self, items: &mut Vec<&'r BindRuleItem>) {
        match self {
            BindRule::Item(item) => items.push(item),
            BindRule::And { operands, .. } | BindRule::Or { operands, .. } => {
                for operand in operands {
                    operand.collect_items(items);
                }
            }
            BindRule::Not(inner) => inner.collect_items(items),
        }
    }

    ///
    /// Runs the checks deferred by the parser and the builders: operator
    /// legality and value shape for every item, non-empty `And`/`Or`, and
    /// `Not` placement. All findings are reported together.
    ///
    pub fn valid(&self) -> Result<()> {
        let mut errors = vec![];
        if let BindRule::Not(_) = self {
            errors.push(Error::ValidationError(
                "NOT must follow AND, it cannot stand alone".to_string(),
            ));
        }
        self.collect_errors(&mut errors);
        Errors::into_result(errors)
    }

    fn collect_errors(&self, errors: &mut Vec<Error>) {
        match self {
            BindRule::Item(item) => item.collect_errors(errors),
            BindRule::And { operands, .. } => {
                if operands.is_empty() {
                    errors.push(Error::ValidationError("AND has no operands".to_string()));
                }
                if let Some(BindRule::Not(_)) = operands.first() {
                    errors.push(Error::ValidationError(
                        "the first operand of AND cannot be negated".to_string(),
                    ));
                }
                operands.iter().for_each(|o| o.collect_errors(errors));
            }
            BindRule::Or { operands, .. } => {
                if operands.is_empty() {
                    errors.push(Error::ValidationError("OR has no operands".to_string()));
                }
                if operands.iter().any(|o| matches!(o, BindRule::Not(_))) {
                    errors.push(Error::ValidationError(
                        "NOT can only be combined with AND".to_string(),
                    ));
                }
                operands.iter().for_each(|o| o.collect_errors(errors));
            }
            BindRule::Not(inner) => {
                if let BindRule::Not(_) = **inner {
                    errors.push(Error::ValidationError(
                        "NOT cannot wrap another NOT".to_string(),
                    ));
                }
                inner.collect_errors(errors);
            }
        }
    }
}

impl<'a> TryFrom<&'a str> for BindRule {
    type Error = Error;

    fn try_from(value: &'a str) -> std::result::Result<Self, Self::Error> {
        BindRule::parse(value)
    }
}

//
// An `And`/`Or` nested under another node is always written inside
// parentheses, whether or not it was built with `paren()`.
//
fn operand_text(operand: &BindRule) -> String {
    match operand {
        BindRule::And { .. } | BindRule::Or { .. } if !operand.is_parenthesized() => {
            format!("({operand})")
        }
        _ => operand.to_string(),
    }
}

impl std::fmt::Display for BindRule {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let body = match self {
            BindRule::Item(item) => item.to_string(),
            BindRule::And { operands, .. } => {
                let mut body = String::new();
                for (idx, operand) in operands.iter().enumerate() {
                    match operand {
                        BindRule::Not(inner) if idx > 0 => {
                            body.push_str(" AND NOT ");
                            body.push_str(&operand_text(inner));
                        }
                        other => {
                            if idx > 0 {
                                body.push_str(" AND ");
                            }
                            body.push_str(&operand_text(other));
                        }
                    }
                }
                body
            }
            BindRule::Or { operands, .. } => operands
                .iter()
                .map(operand_text)
                .collect::<Vec<String>>()
                .join(" OR "),
            BindRule::Not(inner) => format!("NOT {}", operand_text(inner)),
        };
        if self.is_parenthesized() {
            write!(f, "({body})")
        } else {
            f.write_str(&body)
        }
    }
}

struct BindRuleParser<'t> {
    tokens: &'t [Token],
    position: usize,
    max_depth: usize,
}

impl<'t> BindRuleParser<'t> {
    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.position)
    }

    fn advance(&mut self) -> Option<&'t Token> {
        let token = self.tokens.get(self.position);
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    //
    // operand *( boolean operand ), stopping at `)` or end of input
    //
    fn expression(&mut self, depth: usize) -> Result<BindRule> {
        let mut operands = vec![self.operand(depth)?];
        let mut connectives = vec![];
        while let Some(token) = self.peek() {
            match token.kind {
                TokenKind::Close => break,
                TokenKind::And | TokenKind::Or | TokenKind::AndNot => {
                    self.position += 1;
                    let operand = self.operand(depth)?;
                    operands.push(if token.kind == TokenKind::AndNot {
                        BindRule::Not(Box::new(operand))
                    } else {
                        operand
                    });
                    connectives.push(token.kind);
                }
                TokenKind::Not => {
                    return Err(Error::ParseError(
                        "NOT must be preceded by AND".to_string(),
                    ))
                }
                _ => {
                    return Err(Error::ParseError(format!(
                        "expected AND, AND NOT or OR before `{}`",
                        token.text
                    )))
                }
            }
        }
        combine(operands, connectives)
    }

    fn operand(&mut self, depth: usize) -> Result<BindRule> {
        let token = match self.peek() {
            Some(token) => token,
            None => {
                return Err(Error::ParseError(
                    "expected a bind rule operand, found end of input".to_string(),
                ))
            }
        };
        match token.kind {
            TokenKind::Open => {
                if depth >= self.max_depth {
                    return Err(Error::ParseError(format!(
                        "parentheses nested deeper than {} levels",
                        self.max_depth
                    )));
                }
                self.position += 1;
                let inner = self.expression(depth + 1)?;
                match self.advance() {
                    Some(close) if close.kind == TokenKind::Close => Ok(inner.paren()),
                    _ => Err(Error::ParseError(
                        "unbalanced parentheses, missing `)`".to_string(),
                    )),
                }
            }
            TokenKind::Value { .. } => self.item(),
            _ => Err(Error::ParseError(format!(
                "expected a bind rule operand, found `{}`",
                token.text
            ))),
        }
    }

    fn item(&mut self) -> Result<BindRule> {
        let start = self.position;
        while let Some(token) = self.peek() {
            if token.is_boolean() || matches!(token.kind, TokenKind::Open | TokenKind::Close) {
                break;
            }
            self.position += 1;
        }
        leaf(&self.tokens[start..self.position])
    }
}

fn joined(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(|t| t.text.as_str())
        .collect::<Vec<&str>>()
        .join(" ")
}

//
// keyword, the rightmost comparison operator, then the value
//
fn leaf(tokens: &[Token]) -> Result<BindRule> {
    let (split, operator) = tokens
        .iter()
        .enumerate()
        .rev()
        .find_map(|(idx, t)| match t.kind {
            TokenKind::Operator(op) => Some((idx, op)),
            _ => None,
        })
        .ok_or_else(|| {
            Error::ParseError(format!("no comparison operator in `{}`", joined(tokens)))
        })?;
    let value = joined(&tokens[split + 1..]);
    let keyword = match &tokens[..split] {
        [keyword] if !value.is_empty() => keyword,
        _ => {
            return Err(Error::ParseError(format!(
                "expected `keyword {operator} value`, found `{}`",
                joined(tokens)
            )))
        }
    };
    let keyword = BindKeyword::lookup(&keyword.text)?;
    let expression = marshal_bind(keyword, &value)?;
    if !keyword.permits(operator) {
        debug!("keeping `{keyword} {operator}` for later validation");
    }
    Ok(BindRule::item(keyword, operator, expression))
}

fn combine(mut operands: Vec<BindRule>, connectives: Vec<TokenKind>) -> Result<BindRule> {
    if connectives.is_empty() {
        return operands.pop().ok_or_else(|| {
            Error::ParseError("expected a bind rule operand".to_string())
        });
    }
    if connectives.iter().all(|c| *c == TokenKind::Or) {
        return Ok(BindRule::or(operands));
    }
    if connectives
        .iter()
        .all(|c| matches!(c, TokenKind::And | TokenKind::AndNot))
    {
        return Ok(BindRule::and(operands));
    }
    Err(Error::ParseError(
        "AND and OR cannot be mixed at one nesting level without parentheses".to_string(),
    ))
}

#[cfg(test)]
#[path = "bind_rule_tests.rs"]
mod bind_rule_tests;
