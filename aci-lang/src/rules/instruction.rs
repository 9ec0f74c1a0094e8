//!
//! Complete Access Control Instructions.
//!
//! ```text
//! [target rule] (version 3.0; acl "<label>"; <permission> <bind rule>; ...)
//! ```
//!
use std::convert::TryFrom;
use std::fmt::Formatter;

use log::trace;
use serde::{Deserialize, Serialize};

use crate::rules::bind_rule::BindRule;
use crate::rules::errors::{Error, Errors};
use crate::rules::parser::{find_unescaped_quote, split_unquoted, ParseOptions};
use crate::rules::permission::Permission;
use crate::rules::target_rule::TargetRule;
use crate::rules::Result;

pub const VERSION_MARKER: &str = "version 3.0;";

#[derive(Eq, PartialEq, Debug, Clone, Hash, Serialize, Deserialize)]
pub struct PermissionBindRuleItem {
    pub permission: Permission,
    pub bind_rule: BindRule,
}

impl PermissionBindRuleItem {
    pub fn new(permission: Permission, bind_rule: BindRule) -> Self {
        PermissionBindRuleItem {
            permission,
            bind_rule,
        }
    }

    /// `allow(<rights>) <bind rule>` without the terminating `;`.
    pub fn parse_with(text: &str, options: &ParseOptions) -> Result<Self> {
        let text = text.trim();
        let close = text.find(')').ok_or_else(|| {
            Error::ParseError(format!("expected a permission at the start of `{text}`"))
        })?;
        let permission = Permission::parse(&text[..=close])?;
        let bind_rule = BindRule::parse_with(&text[close + 1..], options)?;
        Ok(PermissionBindRuleItem {
            permission,
            bind_rule,
        })
    }

    pub fn valid(&self) -> Result<()> {
        let mut errors = vec![];
        if let Err(e) = self.permission.valid() {
            errors.push(e);
        }
        if let Err(e) = self.bind_rule.valid() {
            errors.push(e);
        }
        Errors::into_result(errors)
    }
}

impl std::fmt::Display for PermissionBindRuleItem {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {};", self.permission, self.bind_rule)
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Hash, Serialize, Deserialize)]
pub struct PermissionBindRule {
    items: Vec<PermissionBindRuleItem>,
}

impl PermissionBindRule {
    pub fn new() -> Self {
        PermissionBindRule::default()
    }

    pub fn parse(text: &str) -> Result<Self> {
        PermissionBindRule::parse_with(text, &ParseOptions::default())
    }

    /// A `;` delimited run of permission and bind rule pairs. Semicolons
    /// inside quoted values do not split.
    pub fn parse_with(text: &str, options: &ParseOptions) -> Result<Self> {
        let mut pbr = PermissionBindRule::new();
        for segment in split_unquoted(text, ';')
            .into_iter()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            trace!("permission bind rule segment `{segment}`");
            pbr.push(PermissionBindRuleItem::parse_with(segment, options)?);
        }
        if pbr.is_empty() {
            return Err(Error::ParseError(format!(
                "no permission and bind rule found in `{}`",
                text.trim()
            )));
        }
        Ok(pbr)
    }

    pub fn push(&mut self, item: PermissionBindRuleItem) -> &mut Self {
        self.items.push(item);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &PermissionBindRuleItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn valid(&self) -> Result<()> {
        if self.items.is_empty() {
            return Err(Error::ValidationError(
                "at least one permission and bind rule is required".to_string(),
            ));
        }
        let errors = self
            .items
            .iter()
            .filter_map(|item| item.valid().err())
            .collect::<Vec<Error>>();
        Errors::into_result(errors)
    }
}

impl std::fmt::Display for PermissionBindRule {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let items = self
            .items
            .iter()
            .map(PermissionBindRuleItem::to_string)
            .collect::<Vec<String>>();
        f.write_str(&items.join(" "))
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Hash, Serialize, Deserialize)]
pub struct Instruction {
    pub target_rule: Option<TargetRule>,
    pub acl: String,
    pub permission_bind_rule: PermissionBindRule,
}

impl Instruction {
    pub fn new(acl: impl Into<String>) -> Self {
        Instruction {
            target_rule: None,
            acl: acl.into(),
            permission_bind_rule: PermissionBindRule::new(),
        }
    }

    pub fn parse(text: &str) -> Result<Instruction> {
        Instruction::parse_with(text, &ParseOptions::default())
    }

    pub fn parse_with(text: &str, options: &ParseOptions) -> Result<Instruction> {
        let text = text.trim();
        let marker = text
            .to_ascii_lowercase()
            .find(VERSION_MARKER)
            .ok_or_else(|| Error::ParseError(format!("`{VERSION_MARKER}` not found in `{text}`")))?;

        let head = text[..marker].trim_end().strip_suffix('(').ok_or_else(|| {
            Error::ParseError(format!("expected `(` before `{VERSION_MARKER}`"))
        })?;
        let target_rule = match head.trim() {
            "" => None,
            targets => Some(TargetRule::parse(targets)?),
        };

        let rest = text[marker + VERSION_MARKER.len()..].trim_start();
        let rest = match rest.get(..3) {
            Some(acl) if acl.eq_ignore_ascii_case("acl") => &rest[3..],
            _ => {
                return Err(Error::ParseError(format!(
                    "expected `acl` after `{VERSION_MARKER}`"
                )))
            }
        };
        let open = find_unescaped_quote(rest)
            .filter(|open| rest[..*open].trim().is_empty())
            .ok_or_else(|| Error::ParseError("expected a quoted acl label".to_string()))?;
        let label = &rest[open + 1..];
        let close = find_unescaped_quote(label)
            .ok_or_else(|| Error::ParseError("unterminated acl label".to_string()))?;
        let acl = &label[..close];
        if acl.trim().is_empty() {
            return Err(Error::ValidationError("acl label is empty".to_string()));
        }

        let body = label[close + 1..].trim_start().strip_prefix(';').ok_or_else(|| {
            Error::ParseError(format!("expected `;` after acl \"{acl}\""))
        })?;
        let body = body.trim_end().strip_suffix(')').ok_or_else(|| {
            Error::ParseError(format!("instruction `{acl}` is missing its closing `)`"))
        })?;
        let permission_bind_rule = PermissionBindRule::parse_with(body, options)?;

        Ok(Instruction {
            target_rule,
            acl: acl.to_string(),
            permission_bind_rule,
        })
    }

    pub fn set_target_rule(&mut self, target_rule: TargetRule) -> &mut Self {
        self.target_rule = if target_rule.is_empty() {
            None
        } else {
            Some(target_rule)
        };
        self
    }

    pub fn set_acl(&mut self, acl: impl Into<String>) -> &mut Self {
        self.acl = acl.into();
        self
    }

    pub fn set_permission_bind_rule(&mut self, pbr: PermissionBindRule) -> &mut Self {
        self.permission_bind_rule = pbr;
        self
    }

    pub fn push(&mut self, item: PermissionBindRuleItem) -> &mut Self {
        self.permission_bind_rule.push(item);
        self
    }

    pub fn valid(&self) -> Result<()> {
        let mut errors = vec![];
        if self.acl.trim().is_empty() {
            errors.push(Error::ValidationError("acl label is empty".to_string()));
        } else if find_unescaped_quote(&self.acl).is_some() {
            errors.push(Error::ValidationError(format!(
                "acl label `{}` holds an unescaped quote",
                self.acl
            )));
        }
        if let Some(Err(e)) = self.target_rule.as_ref().map(TargetRule::valid) {
            errors.push(e);
        }
        if let Err(e) = self.permission_bind_rule.valid() {
            errors.push(e);
        }
        Errors::into_result(errors)
    }
}

impl<'a> TryFrom<&'a str> for Instruction {
    type Error = Error;

    fn try_from(value: &'a str) -> std::result::Result<Self, Self::Error> {
        Instruction::parse(value)
    }
}

impl std::str::FromStr for Instruction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Instruction::parse(s)
    }
}

impl std::fmt::Display for Instruction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if let Some(target_rule) = &self.target_rule {
            write!(f, "{target_rule}")?;
        }
        write!(
            f,
            "({VERSION_MARKER} acl \"{}\"; {})",
            self.acl, self.permission_bind_rule
        )
    }
}

#[cfg(test)]
#[path = "instruction_tests.rs"]
mod instruction_tests;
