//!
//! Typed right hand side values for Bind Rule and Target Rule items.
//!
//! Every keyword family owns exactly one [`Expression`] shape. The `marshal_*`
//! functions turn raw text into that shape and name the offending keyword
//! when the text does not fit.
//!
use std::fmt::Formatter;

use serde::{Deserialize, Serialize};

use crate::rules::directory::Filter;
use crate::rules::errors::Error;
use crate::rules::keywords::{BindKeyword, TargetKeyword};
use crate::rules::Result;

pub(crate) mod attr;
pub(crate) mod auth;
pub(crate) mod dn;
pub(crate) mod network;
pub(crate) mod target;
pub(crate) mod temporal;

pub use attr::{
    AttributeBindTypeOrValue, AttributeFilter, AttributeFilterOperations, AttributeList,
    BindType, BindTypeOrValue, InheritanceLevels,
};
pub use auth::{AuthMethod, SecurityStrengthFactor};
pub use dn::{DnItem, DnList, LdapUrl, SpecialDn, LDAP_SCHEME};
pub use network::{FqdnList, IpAddressList};
pub use target::{OidList, SearchScope};
pub use temporal::{Day, DayOfWeek, TimeOfDay};

#[derive(Eq, PartialEq, Debug, Clone, Hash, Serialize, Deserialize)]
pub enum Expression {
    DistinguishedNames(DnList),
    AttributeBind(AttributeBindTypeOrValue),
    DayOfWeek(DayOfWeek),
    TimeOfDay(TimeOfDay),
    IpAddresses(IpAddressList),
    DomainNames(FqdnList),
    SecurityStrength(SecurityStrengthFactor),
    AuthMethod(AuthMethod),
    ObjectIdentifiers(OidList),
    Attributes(AttributeList),
    Scope(SearchScope),
    Filter(Filter),
    AttributeFilters(AttributeFilterOperations),
}

impl Expression {
    /// True when this value has the shape `keyword` interprets.
    pub fn fits_bind(&self, keyword: BindKeyword) -> bool {
        match keyword {
            BindKeyword::UserDn | BindKeyword::RoleDn | BindKeyword::GroupDn => {
                matches!(self, Expression::DistinguishedNames(_))
            }
            BindKeyword::UserAttr | BindKeyword::GroupAttr => {
                matches!(self, Expression::AttributeBind(_))
            }
            BindKeyword::Ip => matches!(self, Expression::IpAddresses(_)),
            BindKeyword::Dns => matches!(self, Expression::DomainNames(_)),
            BindKeyword::DayOfWeek => matches!(self, Expression::DayOfWeek(_)),
            BindKeyword::TimeOfDay => matches!(self, Expression::TimeOfDay(_)),
            BindKeyword::AuthMethod => matches!(self, Expression::AuthMethod(_)),
            BindKeyword::Ssf => matches!(self, Expression::SecurityStrength(_)),
        }
    }

    pub fn fits_target(&self, keyword: TargetKeyword) -> bool {
        match keyword {
            TargetKeyword::Target | TargetKeyword::TargetTo | TargetKeyword::TargetFrom => {
                matches!(self, Expression::DistinguishedNames(l) if !l.has_url())
            }
            TargetKeyword::TargetAttr => matches!(self, Expression::Attributes(_)),
            TargetKeyword::TargetControl | TargetKeyword::ExtOp => {
                matches!(self, Expression::ObjectIdentifiers(_))
            }
            TargetKeyword::TargetScope => matches!(self, Expression::Scope(_)),
            TargetKeyword::TargetFilter => matches!(self, Expression::Filter(_)),
            TargetKeyword::TargetAttrFilters => matches!(self, Expression::AttributeFilters(_)),
        }
    }

    /// Individual values as they appear between quotes in a Target Rule that
    /// quotes each value separately.
    pub(crate) fn split_values(&self) -> Vec<String> {
        match self {
            Expression::DistinguishedNames(list) => {
                list.iter().map(|item| item.to_string()).collect()
            }
            Expression::ObjectIdentifiers(list) => {
                list.iter().map(|oid| oid.to_string()).collect()
            }
            other => vec![other.to_string()],
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Expression::DistinguishedNames(list) => list.is_empty(),
            Expression::DayOfWeek(days) => days.is_empty(),
            Expression::IpAddresses(list) => list.is_empty(),
            Expression::DomainNames(list) => list.is_empty(),
            Expression::ObjectIdentifiers(list) => list.is_empty(),
            Expression::Attributes(list) => list.is_empty(),
            Expression::AttributeFilters(ops) => ops.is_empty(),
            _ => false,
        }
    }
}

impl std::fmt::Display for Expression {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Expression::DistinguishedNames(v) => write!(f, "{v}"),
            Expression::AttributeBind(v) => write!(f, "{v}"),
            Expression::DayOfWeek(v) => write!(f, "{v}"),
            Expression::TimeOfDay(v) => write!(f, "{v}"),
            Expression::IpAddresses(v) => write!(f, "{v}"),
            Expression::DomainNames(v) => write!(f, "{v}"),
            Expression::SecurityStrength(v) => write!(f, "{v}"),
            Expression::AuthMethod(v) => write!(f, "{v}"),
            Expression::ObjectIdentifiers(v) => write!(f, "{v}"),
            Expression::Attributes(v) => write!(f, "{v}"),
            Expression::Scope(v) => write!(f, "{v}"),
            Expression::Filter(v) => write!(f, "{v}"),
            Expression::AttributeFilters(v) => write!(f, "{v}"),
        }
    }
}

///
/// Marshals the unquoted right hand side of a Bind Rule item.
///
pub fn marshal_bind(keyword: BindKeyword, raw: &str) -> Result<Expression> {
    if raw.trim().is_empty() {
        return Err(Error::invalid_value(keyword, "empty value"));
    }
    let expr = match keyword {
        BindKeyword::UserDn | BindKeyword::RoleDn | BindKeyword::GroupDn => {
            Expression::DistinguishedNames(DnList::parse(keyword.name(), raw, true)?)
        }
        BindKeyword::UserAttr | BindKeyword::GroupAttr => {
            Expression::AttributeBind(AttributeBindTypeOrValue::parse(keyword.name(), raw)?)
        }
        BindKeyword::DayOfWeek => Expression::DayOfWeek(DayOfWeek::parse(raw)?),
        BindKeyword::TimeOfDay => Expression::TimeOfDay(TimeOfDay::parse(raw)?),
        BindKeyword::Ssf => Expression::SecurityStrength(SecurityStrengthFactor::parse(raw)?),
        BindKeyword::Ip => Expression::IpAddresses(IpAddressList::parse(raw)?),
        BindKeyword::Dns => Expression::DomainNames(FqdnList::parse(raw)?),
        BindKeyword::AuthMethod => Expression::AuthMethod(AuthMethod::parse(raw)?),
    };
    Ok(expr)
}

///
/// Marshals the quoted values of a Target Rule clause. Multi-valued keywords
/// accept either several `||` delimited quoted values or a single quoted
/// value holding `||` delimited entries.
///
pub fn marshal_target(keyword: TargetKeyword, raw: &[String]) -> Result<Expression> {
    if raw.iter().all(|v| v.trim().is_empty()) {
        return Err(Error::invalid_value(keyword, "empty value"));
    }
    let joined = raw.join(" || ");
    let single = || -> Result<&str> {
        match raw {
            [one] => Ok(one.as_str()),
            _ => Err(Error::invalid_value(
                keyword,
                format!("expected a single value, found {}", raw.len()),
            )),
        }
    };
    let expr = match keyword {
        TargetKeyword::Target | TargetKeyword::TargetTo | TargetKeyword::TargetFrom => {
            Expression::DistinguishedNames(DnList::parse(keyword.name(), &joined, false)?)
        }
        TargetKeyword::TargetAttr => Expression::Attributes(AttributeList::parse(&joined)?),
        TargetKeyword::TargetControl | TargetKeyword::ExtOp => {
            Expression::ObjectIdentifiers(OidList::parse(keyword.name(), &joined)?)
        }
        TargetKeyword::TargetScope => Expression::Scope(SearchScope::parse(single()?)?),
        TargetKeyword::TargetFilter => Expression::Filter(
            Filter::parse(single()?).map_err(|e| Error::invalid_value(keyword, e.to_string()))?,
        ),
        TargetKeyword::TargetAttrFilters => {
            Expression::AttributeFilters(AttributeFilterOperations::parse(single()?)?)
        }
    };
    Ok(expr)
}

//
// Splits on the `||` delimiter used by multi-valued expressions, trimming each
// entry and dropping empty ones.
//
pub(crate) fn split_double_pipe(raw: &str) -> Vec<&str> {
    raw.split("||")
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
#[path = "values_tests.rs"]
mod values_tests;
