//!
//! Directory syntaxes consumed at the edge of the instruction language.
//!
//! Each type is a validated wrapper around its textual form: `parse` accepts
//! or rejects the text and `Display` renders it back unchanged. Only as much
//! of the underlying syntax is checked as the instruction language depends on.
//!
use std::fmt::Formatter;

use nom::branch::alt;
use nom::bytes::complete::{tag, take_while1};
use nom::character::complete::{anychar, char, multispace0, none_of};
use nom::combinator::{all_consuming, recognize, value};
use nom::multi::{many0, many1};
use nom::sequence::{delimited, preceded, tuple};
use serde::{Deserialize, Serialize};

use crate::rules::errors::Error;
use crate::rules::Result;

#[derive(Eq, PartialEq, Debug, Clone, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DistinguishedName(String);

impl DistinguishedName {
    /// Accepts `attr=value` RDNs separated by `,` (and `+` within an RDN).
    /// Backslash escapes are honored; values may not be empty.
    pub fn parse(text: &str) -> Result<Self> {
        Self::parse_inner(text, false)
    }

    /// Same as [`DistinguishedName::parse`] but values may contain `*`
    /// wildcards.
    pub fn parse_pattern(text: &str) -> Result<Self> {
        Self::parse_inner(text, true)
    }

    fn parse_inner(text: &str, wildcards: bool) -> Result<Self> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::invalid_value("dn", "empty distinguished name"));
        }
        for rdn in split_escaped(text, ',') {
            for ava in split_escaped(rdn, '+') {
                let (attr, val) = match ava.split_once('=') {
                    Some(pair) => pair,
                    None => {
                        return Err(Error::invalid_value(
                            "dn",
                            format!("RDN component `{}` is missing `=` in {text}", ava.trim()),
                        ))
                    }
                };
                let attr = attr.trim();
                if !is_attribute_type(attr) {
                    return Err(Error::invalid_value(
                        "dn",
                        format!("bad attribute type `{attr}` in {text}"),
                    ));
                }
                if val.trim().is_empty() {
                    return Err(Error::invalid_value(
                        "dn",
                        format!("empty value for `{attr}` in {text}"),
                    ));
                }
                if !wildcards && has_unescaped(val, '*') {
                    return Err(Error::invalid_value(
                        "dn",
                        format!("wildcard not permitted in {text}"),
                    ));
                }
            }
        }
        Ok(DistinguishedName(text.to_string()))
    }

    pub fn is_pattern(&self) -> bool {
        has_unescaped(&self.0, '*')
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn eq_ignore_case(&self, other: &DistinguishedName) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl std::fmt::Display for DistinguishedName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

///
/// RFC 4515 search filter text. A bare `attr=value` assertion is accepted and
/// wrapped in parentheses.
///
#[derive(Eq, PartialEq, Debug, Clone, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Filter(String);

impl Filter {
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::invalid_value("filter", "empty filter"));
        }
        let text = if text.starts_with('(') {
            text.to_string()
        } else {
            format!("({text})")
        };
        let parsed = all_consuming(delimited(multispace0, filter, multispace0))(text.as_str())
            .map(|_| ())
            .map_err(|e| e.to_string());
        match parsed {
            Ok(()) => Ok(Filter(text)),
            Err(e) => Err(Error::invalid_value(
                "filter",
                format!("malformed filter {text}: {e}"),
            )),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Filter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

//
//  filter      = "(" *WSP filtercomp *WSP ")"
//  filtercomp  = "&" 1*filter / "|" 1*filter / "!" filter / item
//  item        = attr ("~=" / ">=" / "<=" / "=") assertion
//
fn filter(input: &str) -> nom::IResult<&str, ()> {
    delimited(
        char('('),
        preceded(multispace0, filter_comp),
        preceded(multispace0, char(')')),
    )(input)
}

fn filter_comp(input: &str) -> nom::IResult<&str, ()> {
    alt((
        value((), preceded(char('&'), many1(preceded(multispace0, filter)))),
        value((), preceded(char('|'), many1(preceded(multispace0, filter)))),
        value((), preceded(char('!'), preceded(multispace0, filter))),
        filter_item,
    ))(input)
}

fn filter_item(input: &str) -> nom::IResult<&str, ()> {
    value(
        (),
        tuple((
            take_while1(|c: char| c.is_ascii_alphanumeric() || ";.-:_".contains(c)),
            alt((tag("~="), tag(">="), tag("<="), tag("="))),
            assertion_value,
        )),
    )(input)
}

fn assertion_value(input: &str) -> nom::IResult<&str, &str> {
    recognize(many0(alt((
        recognize(preceded(char('\\'), anychar)),
        recognize(none_of("()\\")),
    ))))(input)
}

///
/// Dot separated numeric object identifier, e.g. `1.3.6.1.4.1.42.2.27.9.5.2`
///
#[derive(Eq, PartialEq, Debug, Clone, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NumericOid(String);

impl NumericOid {
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        let arcs = text.split('.').collect::<Vec<&str>>();
        if arcs.len() < 2 {
            return Err(Error::invalid_value(
                "oid",
                format!("`{text}` needs at least two arcs"),
            ));
        }
        for arc in &arcs {
            if arc.is_empty() || !arc.bytes().all(|b| b.is_ascii_digit()) {
                return Err(Error::invalid_value(
                    "oid",
                    format!("`{text}` has a non numeric arc"),
                ));
            }
            if arc.len() > 1 && arc.starts_with('0') {
                return Err(Error::invalid_value(
                    "oid",
                    format!("`{text}` has an arc with a leading zero"),
                ));
            }
        }
        Ok(NumericOid(text.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NumericOid {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

pub(crate) fn is_attribute_type(attr: &str) -> bool {
    let mut chars = attr.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '-')
        }
        Some(c) if c.is_ascii_digit() => NumericOid::parse(attr).is_ok(),
        _ => false,
    }
}

fn has_unescaped(text: &str, needle: char) -> bool {
    let mut escaped = false;
    for ch in text.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        if ch == '\\' {
            escaped = true;
        } else if ch == needle {
            return true;
        }
    }
    false
}

fn split_escaped(text: &str, delim: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut escaped = false;
    let mut start = 0;
    for (idx, ch) in text.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        if ch == '\\' {
            escaped = true;
        } else if ch == delim {
            parts.push(&text[start..idx]);
            start = idx + ch.len_utf8();
        }
    }
    parts.push(&text[start..]);
    parts
}
