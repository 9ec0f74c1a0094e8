use std::collections::HashMap;
use std::fmt::Formatter;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use crate::rules::errors::Error;
use crate::rules::Result;

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum Operator {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Operator {
    /// Spellings in the order a right-to-left scan must try them so that the
    /// two character operators are never mistaken for their one character
    /// prefixes.
    pub const SCAN_ORDER: [Operator; 6] = [
        Operator::Le,
        Operator::Ge,
        Operator::Ne,
        Operator::Eq,
        Operator::Lt,
        Operator::Gt,
    ];

    pub const ALL: [Operator; 6] = [
        Operator::Eq,
        Operator::Ne,
        Operator::Lt,
        Operator::Le,
        Operator::Gt,
        Operator::Ge,
    ];

    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
        }
    }

    pub fn parse(text: &str) -> Result<Operator> {
        Operator::ALL
            .iter()
            .find(|op| op.symbol() == text.trim())
            .copied()
            .ok_or_else(|| Error::ParseError(format!("unrecognized comparison operator {text}")))
    }

    /// The operator matching exactly the complement of this one.
    pub fn negate(&self) -> Operator {
        match self {
            Operator::Eq => Operator::Ne,
            Operator::Ne => Operator::Eq,
            Operator::Lt => Operator::Ge,
            Operator::Ge => Operator::Lt,
            Operator::Gt => Operator::Le,
            Operator::Le => Operator::Gt,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Operator::Eq => "Equal To",
            Operator::Ne => "Not Equal To",
            Operator::Lt => "Less Than",
            Operator::Le => "Less Than Or Equal",
            Operator::Gt => "Greater Than",
            Operator::Ge => "Greater Than Or Equal",
        }
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

const EQUALITY_ONLY: &[Operator] = &[Operator::Eq];
const EQUALITY: &[Operator] = &[Operator::Eq, Operator::Ne];
const ORDERED: &[Operator] = &Operator::ALL;

///
/// Keywords usable on the left hand side of a Bind Rule item
///
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum BindKeyword {
    UserDn,
    RoleDn,
    GroupDn,
    UserAttr,
    GroupAttr,
    Ip,
    Dns,
    DayOfWeek,
    TimeOfDay,
    AuthMethod,
    Ssf,
}

///
/// Keywords usable inside a Target Rule clause
///
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum TargetKeyword {
    Target,
    TargetTo,
    TargetFrom,
    TargetAttr,
    TargetControl,
    TargetScope,
    TargetFilter,
    TargetAttrFilters,
    ExtOp,
}

lazy_static! {
    static ref BIND_KEYWORDS: HashMap<&'static str, BindKeyword> = BindKeyword::ALL
        .iter()
        .map(|kw| (kw.name(), *kw))
        .collect();
    static ref TARGET_KEYWORDS: HashMap<&'static str, TargetKeyword> = TargetKeyword::ALL
        .iter()
        .map(|kw| (kw.name(), *kw))
        .collect();
}

impl BindKeyword {
    pub const ALL: [BindKeyword; 11] = [
        BindKeyword::UserDn,
        BindKeyword::RoleDn,
        BindKeyword::GroupDn,
        BindKeyword::UserAttr,
        BindKeyword::GroupAttr,
        BindKeyword::Ip,
        BindKeyword::Dns,
        BindKeyword::DayOfWeek,
        BindKeyword::TimeOfDay,
        BindKeyword::AuthMethod,
        BindKeyword::Ssf,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            BindKeyword::UserDn => "userdn",
            BindKeyword::RoleDn => "roledn",
            BindKeyword::GroupDn => "groupdn",
            BindKeyword::UserAttr => "userattr",
            BindKeyword::GroupAttr => "groupattr",
            BindKeyword::Ip => "ip",
            BindKeyword::Dns => "dns",
            BindKeyword::DayOfWeek => "dayofweek",
            BindKeyword::TimeOfDay => "timeofday",
            BindKeyword::AuthMethod => "authmethod",
            BindKeyword::Ssf => "ssf",
        }
    }

    /// Case-insensitive lookup against the static keyword table.
    pub fn lookup(text: &str) -> Result<BindKeyword> {
        BIND_KEYWORDS
            .get(text.trim().to_ascii_lowercase().as_str())
            .copied()
            .ok_or_else(|| Error::UnknownKeyword(text.trim().to_string()))
    }

    pub fn permitted_operators(&self) -> &'static [Operator] {
        match self {
            BindKeyword::TimeOfDay | BindKeyword::Ssf => ORDERED,
            _ => EQUALITY,
        }
    }

    pub fn permits(&self, operator: Operator) -> bool {
        self.permitted_operators().contains(&operator)
    }

    pub fn is_dn(&self) -> bool {
        matches!(
            self,
            BindKeyword::UserDn | BindKeyword::RoleDn | BindKeyword::GroupDn
        )
    }
}

impl TargetKeyword {
    pub const ALL: [TargetKeyword; 9] = [
        TargetKeyword::Target,
        TargetKeyword::TargetTo,
        TargetKeyword::TargetFrom,
        TargetKeyword::TargetAttr,
        TargetKeyword::TargetControl,
        TargetKeyword::TargetScope,
        TargetKeyword::TargetFilter,
        TargetKeyword::TargetAttrFilters,
        TargetKeyword::ExtOp,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TargetKeyword::Target => "target",
            TargetKeyword::TargetTo => "target_to",
            TargetKeyword::TargetFrom => "target_from",
            TargetKeyword::TargetAttr => "targetattr",
            TargetKeyword::TargetControl => "targetcontrol",
            TargetKeyword::TargetScope => "targetscope",
            TargetKeyword::TargetFilter => "targetfilter",
            TargetKeyword::TargetAttrFilters => "targattrfilters",
            TargetKeyword::ExtOp => "extop",
        }
    }

    pub fn lookup(text: &str) -> Result<TargetKeyword> {
        TARGET_KEYWORDS
            .get(text.trim().to_ascii_lowercase().as_str())
            .copied()
            .ok_or_else(|| Error::UnknownKeyword(text.trim().to_string()))
    }

    pub fn permitted_operators(&self) -> &'static [Operator] {
        match self {
            TargetKeyword::TargetScope => EQUALITY_ONLY,
            _ => EQUALITY,
        }
    }

    pub fn permits(&self, operator: Operator) -> bool {
        self.permitted_operators().contains(&operator)
    }

    pub fn is_dn(&self) -> bool {
        matches!(
            self,
            TargetKeyword::Target | TargetKeyword::TargetTo | TargetKeyword::TargetFrom
        )
    }

    /// Keywords whose values render as separately quoted `||` delimited runs.
    pub(crate) fn quotes_each_value(&self) -> bool {
        self.is_dn() || matches!(self, TargetKeyword::TargetControl | TargetKeyword::ExtOp)
    }
}

impl std::fmt::Display for BindKeyword {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::fmt::Display for TargetKeyword {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
