//!
//! Target Rules: the fixed, non-Boolean clauses naming what an instruction
//! governs.
//!
use std::convert::TryFrom;
use std::fmt::Formatter;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::rules::errors::{Error, Errors};
use crate::rules::keywords::{Operator, TargetKeyword};
use crate::rules::parser::target_scanner::{tokenize, TargetToken};
use crate::rules::values::{marshal_target, Expression};
use crate::rules::Result;

#[derive(Eq, PartialEq, Debug, Clone, Hash, Serialize, Deserialize)]
pub struct TargetRuleItem {
    pub keyword: TargetKeyword,
    pub operator: Operator,
    pub expression: Expression,
}

impl TargetRuleItem {
    pub fn new(keyword: TargetKeyword, operator: Operator, expression: Expression) -> Self {
        TargetRuleItem {
            keyword,
            operator,
            expression,
        }
    }

    pub fn valid(&self) -> Result<()> {
        let mut errors = vec![];
        if !self.keyword.permits(self.operator) {
            errors.push(Error::OperatorNotPermitted {
                keyword: self.keyword.to_string(),
                operator: self.operator,
            });
        }
        if !self.expression.fits_target(self.keyword) {
            errors.push(Error::invalid_value(
                self.keyword,
                format!("`{}` is not a {} value", self.expression, self.keyword),
            ));
        } else if self.expression.is_empty() {
            errors.push(Error::invalid_value(self.keyword, "empty value"));
        }
        Errors::into_result(errors)
    }
}

impl std::fmt::Display for TargetRuleItem {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let values = if self.keyword.quotes_each_value() {
            self.expression
                .split_values()
                .iter()
                .map(|v| format!("\"{v}\""))
                .collect::<Vec<String>>()
                .join(" || ")
        } else {
            format!("\"{}\"", self.expression)
        };
        write!(f, "({} {} {})", self.keyword, self.operator, values)
    }
}

///
/// Ordered clauses, at most one per keyword.
///
#[derive(Eq, PartialEq, Debug, Clone, Default, Hash, Serialize, Deserialize)]
pub struct TargetRule {
    items: Vec<TargetRuleItem>,
}

impl TargetRule {
    pub const MAX_ITEMS: usize = 9;

    pub fn new() -> Self {
        TargetRule::default()
    }

    pub fn parse(text: &str) -> Result<TargetRule> {
        let tokens = tokenize(text)?;
        let mut rule = TargetRule::new();
        let mut window = tokens.as_slice();
        while !window.is_empty() {
            let (item, rest) = clause(window)?;
            rule.push(item);
            window = rest;
        }
        Ok(rule)
    }

    /// Appends `item` unless its keyword is already present or the rule is
    /// full; either way the item is dropped without error.
    pub fn push(&mut self, item: TargetRuleItem) -> &mut Self {
        if self.contains(item.keyword) {
            debug!("dropping duplicate target keyword `{}`", item.keyword);
        } else if self.items.len() >= Self::MAX_ITEMS {
            debug!(
                "dropping `{}`, target rule already holds {} clauses",
                item.keyword,
                Self::MAX_ITEMS
            );
        } else {
            self.items.push(item);
        }
        self
    }

    pub fn contains(&self, keyword: TargetKeyword) -> bool {
        self.items.iter().any(|i| i.keyword == keyword)
    }

    pub fn get(&self, keyword: TargetKeyword) -> Option<&TargetRuleItem> {
        self.items.iter().find(|i| i.keyword == keyword)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TargetRuleItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn valid(&self) -> Result<()> {
        let mut errors = vec![];
        if self.items.len() > Self::MAX_ITEMS {
            errors.push(Error::ValidationError(format!(
                "a target rule holds at most {} clauses, found {}",
                Self::MAX_ITEMS,
                self.items.len()
            )));
        }
        for item in &self.items {
            if let Err(e) = item.valid() {
                errors.push(e);
            }
        }
        Errors::into_result(errors)
    }
}

impl<'a> TryFrom<&'a str> for TargetRule {
    type Error = Error;

    fn try_from(value: &'a str) -> std::result::Result<Self, Self::Error> {
        TargetRule::parse(value)
    }
}

impl std::fmt::Display for TargetRule {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for item in &self.items {
            write!(f, "{item}")?;
        }
        Ok(())
    }
}

//
// ( keyword operator value *( || value ) )
//
fn clause(tokens: &[TargetToken]) -> Result<(TargetRuleItem, &[TargetToken])> {
    let keyword = match tokens {
        [TargetToken::Open, TargetToken::Keyword(keyword), ..] => TargetKeyword::lookup(keyword)?,
        _ => {
            return Err(Error::ParseError(format!(
                "expected `(<keyword>` to open a target clause, found {:?}",
                tokens.first()
            )))
        }
    };
    let operator = match tokens.get(2) {
        Some(TargetToken::Operator(op)) => *op,
        other => {
            return Err(Error::ParseError(format!(
                "expected `=` or `!=` after `{keyword}`, found {other:?}"
            )))
        }
    };
    let mut values = vec![];
    let mut idx = 3;
    loop {
        match tokens.get(idx) {
            Some(TargetToken::Value(v)) => values.push(v.clone()),
            other => {
                return Err(Error::ParseError(format!(
                    "expected a quoted value for `{keyword}`, found {other:?}"
                )))
            }
        }
        idx += 1;
        match tokens.get(idx) {
            Some(TargetToken::Pipe) => idx += 1,
            Some(TargetToken::Close) => break,
            other => {
                return Err(Error::ParseError(format!(
                    "expected `||` or `)` in `{keyword}` clause, found {other:?}"
                )))
            }
        }
    }
    let expression = marshal_target(keyword, &values)?;
    Ok((
        TargetRuleItem::new(keyword, operator, expression),
        &tokens[idx + 1..],
    ))
}
