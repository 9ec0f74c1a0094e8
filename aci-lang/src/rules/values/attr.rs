use std::fmt::Formatter;

use fancy_regex::Regex;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use crate::rules::bitset::BitSet;
use crate::rules::directory::{Filter, NumericOid};
use crate::rules::errors::Error;
use crate::rules::keywords::TargetKeyword;
use crate::rules::values::split_double_pipe;
use crate::rules::Result;

lazy_static! {
    static ref ATTRIBUTE_DESCRIPTOR: Regex =
        Regex::new(r"^[A-Za-z][A-Za-z0-9-]*(;[A-Za-z0-9-]+)*$").expect("attribute descriptor pattern");
}

pub(crate) fn is_attribute_descriptor(text: &str) -> bool {
    ATTRIBUTE_DESCRIPTOR.is_match(text).unwrap_or(false) || NumericOid::parse(text).is_ok()
}

///
/// Depth levels below a parent entry, `0` (the entry itself) through `9`
///
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InheritanceLevels(BitSet<u16>);

impl InheritanceLevels {
    pub const MAX_LEVEL: u32 = 9;

    pub fn new() -> Self {
        InheritanceLevels::default()
    }

    /// Parses the comma separated digits found between `parent[` and `]`.
    pub fn parse(text: &str) -> Result<InheritanceLevels> {
        let mut levels = InheritanceLevels::new();
        for token in text.split(',').map(str::trim) {
            let level = match token.as_bytes() {
                [digit] if digit.is_ascii_digit() => u32::from(digit - b'0'),
                _ => {
                    return Err(Error::invalid_value(
                        "inheritance",
                        format!("level `{token}` is not a single digit 0-9"),
                    ))
                }
            };
            levels.shift(level);
        }
        if levels.is_empty() {
            return Err(Error::invalid_value("inheritance", "no levels"));
        }
        Ok(levels)
    }

    pub fn shift(&mut self, level: u32) -> &mut Self {
        if level <= Self::MAX_LEVEL {
            self.0.shift(level);
        }
        self
    }

    pub fn unshift(&mut self, level: u32) -> &mut Self {
        self.0.unshift(level);
        self
    }

    pub fn positive(&self, level: u32) -> bool {
        self.0.positive(level)
    }

    pub fn levels(&self) -> Vec<u32> {
        self.0.positions().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_zero()
    }
}

impl std::fmt::Display for InheritanceLevels {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let levels = self
            .levels()
            .iter()
            .map(u32::to_string)
            .collect::<Vec<String>>();
        f.write_str(&levels.join(","))
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum BindType {
    UserDn,
    GroupDn,
    RoleDn,
    SelfDn,
    LdapUrl,
}

impl BindType {
    fn lookup(text: &str) -> Option<BindType> {
        match text.trim().to_ascii_uppercase().as_str() {
            "USERDN" => Some(BindType::UserDn),
            "GROUPDN" => Some(BindType::GroupDn),
            "ROLEDN" => Some(BindType::RoleDn),
            "SELFDN" => Some(BindType::SelfDn),
            "LDAPURL" => Some(BindType::LdapUrl),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            BindType::UserDn => "USERDN",
            BindType::GroupDn => "GROUPDN",
            BindType::RoleDn => "ROLEDN",
            BindType::SelfDn => "SELFDN",
            BindType::LdapUrl => "LDAPURL",
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Hash, Serialize, Deserialize)]
pub enum BindTypeOrValue {
    BindType(BindType),
    Value(String),
}

impl std::fmt::Display for BindTypeOrValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            BindTypeOrValue::BindType(bt) => f.write_str(bt.name()),
            BindTypeOrValue::Value(v) => f.write_str(v),
        }
    }
}

///
/// `userattr`/`groupattr` value: `[parent[<levels>].]<attribute>#<bindtype or value>`
///
#[derive(Eq, PartialEq, Debug, Clone, Hash, Serialize, Deserialize)]
pub struct AttributeBindTypeOrValue {
    pub levels: Option<InheritanceLevels>,
    pub attribute: String,
    pub kind: BindTypeOrValue,
}

impl AttributeBindTypeOrValue {
    pub fn new(attribute: impl Into<String>, kind: BindTypeOrValue) -> Self {
        AttributeBindTypeOrValue {
            levels: None,
            attribute: attribute.into(),
            kind,
        }
    }

    pub fn with_levels(mut self, levels: InheritanceLevels) -> Self {
        self.levels = Some(levels);
        self
    }

    pub(crate) fn parse(keyword: &str, raw: &str) -> Result<AttributeBindTypeOrValue> {
        let raw = raw.trim();
        let inherits = raw
            .get(..7)
            .map_or(false, |prefix| prefix.eq_ignore_ascii_case("parent["));
        let (levels, rest) = if inherits {
            let close = raw.find(']').ok_or_else(|| {
                Error::invalid_value(keyword, format!("unterminated inheritance in `{raw}`"))
            })?;
            let levels = InheritanceLevels::parse(&raw[7..close])
                .map_err(|e| Error::invalid_value(keyword, e.to_string()))?;
            let rest = raw[close + 1..].strip_prefix('.').ok_or_else(|| {
                Error::invalid_value(keyword, format!("expected `.` after inheritance in `{raw}`"))
            })?;
            (Some(levels), rest)
        } else {
            (None, raw)
        };

        let (attribute, value) = rest.split_once('#').ok_or_else(|| {
            Error::invalid_value(keyword, format!("expected `<attribute>#<value>` in `{raw}`"))
        })?;
        let attribute = attribute.trim();
        let value = value.trim();
        if !is_attribute_descriptor(attribute) {
            return Err(Error::invalid_value(
                keyword,
                format!("bad attribute `{attribute}`"),
            ));
        }
        if value.is_empty() {
            return Err(Error::invalid_value(keyword, format!("no value after `#` in `{raw}`")));
        }
        let kind = match BindType::lookup(value) {
            Some(bt) => BindTypeOrValue::BindType(bt),
            None => BindTypeOrValue::Value(value.to_string()),
        };
        if levels.is_some() && !matches!(kind, BindTypeOrValue::BindType(bt) if bt != BindType::LdapUrl)
        {
            return Err(Error::invalid_value(
                keyword,
                format!("inheritance requires a DN bind type in `{raw}`"),
            ));
        }
        Ok(AttributeBindTypeOrValue {
            levels,
            attribute: attribute.to_string(),
            kind,
        })
    }
}

impl std::fmt::Display for AttributeBindTypeOrValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if let Some(levels) = &self.levels {
            write!(f, "parent[{levels}].")?;
        }
        write!(f, "{}#{}", self.attribute, self.kind)
    }
}

///
/// `targetattr` value: either the `*` wildcard or attribute descriptors
///
#[derive(Eq, PartialEq, Debug, Clone, Default, Hash, Serialize, Deserialize)]
pub struct AttributeList {
    all: bool,
    attributes: Vec<String>,
}

impl AttributeList {
    pub fn all() -> Self {
        AttributeList {
            all: true,
            attributes: vec![],
        }
    }

    pub fn new() -> Self {
        AttributeList::default()
    }

    pub(crate) fn parse(raw: &str) -> Result<AttributeList> {
        let keyword = TargetKeyword::TargetAttr;
        let entries = split_double_pipe(raw);
        if entries == ["*"] {
            return Ok(AttributeList::all());
        }
        let mut list = AttributeList::new();
        for entry in entries {
            if entry == "*" {
                return Err(Error::invalid_value(keyword, "`*` cannot be combined with attributes"));
            }
            if !is_attribute_descriptor(entry) {
                return Err(Error::invalid_value(keyword, format!("bad attribute `{entry}`")));
            }
            list.push(entry);
        }
        if list.is_empty() {
            return Err(Error::invalid_value(keyword, format!("no attributes in `{raw}`")));
        }
        Ok(list)
    }

    /// Appends an attribute unless already present (case-insensitive). Has
    /// no effect on the `*` list.
    pub fn push(&mut self, attribute: impl Into<String>) -> &mut Self {
        let attribute = attribute.into();
        if !self.all
            && !self
                .attributes
                .iter()
                .any(|a| a.eq_ignore_ascii_case(&attribute))
        {
            self.attributes.push(attribute);
        }
        self
    }

    pub fn is_all(&self) -> bool {
        self.all
    }

    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    pub fn is_empty(&self) -> bool {
        !self.all && self.attributes.is_empty()
    }
}

impl std::fmt::Display for AttributeList {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.all {
            return f.write_str("*");
        }
        f.write_str(&self.attributes.join(" || "))
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Hash, Serialize, Deserialize)]
pub struct AttributeFilter {
    pub attribute: String,
    pub filter: Filter,
}

impl std::fmt::Display for AttributeFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.attribute, self.filter)
    }
}

///
/// `targattrfilters` value: `add=` and/or `delete=` operations, each a `&&`
/// joined run of `attribute:filter` clauses
///
#[derive(Eq, PartialEq, Debug, Clone, Default, Hash, Serialize, Deserialize)]
pub struct AttributeFilterOperations {
    pub add: Vec<AttributeFilter>,
    pub delete: Vec<AttributeFilter>,
}

impl AttributeFilterOperations {
    pub(crate) fn parse(raw: &str) -> Result<AttributeFilterOperations> {
        let keyword = TargetKeyword::TargetAttrFilters;
        let mut ops = AttributeFilterOperations::default();
        let (mut seen_add, mut seen_delete) = (false, false);
        for segment in split_operations(raw) {
            let segment = segment.trim();
            let (name, clauses) = segment.split_once('=').ok_or_else(|| {
                Error::invalid_value(keyword, format!("expected `add=` or `delete=` in `{segment}`"))
            })?;
            let target = match name.trim().to_ascii_lowercase().as_str() {
                "add" if !seen_add => {
                    seen_add = true;
                    &mut ops.add
                }
                "delete" | "del" if !seen_delete => {
                    seen_delete = true;
                    &mut ops.delete
                }
                other => {
                    return Err(Error::invalid_value(
                        keyword,
                        format!("unexpected or repeated operation `{other}`"),
                    ))
                }
            };
            for clause in split_at_depth_zero(clauses, "&&") {
                let clause = clause.trim();
                let (attribute, filter) = clause.split_once(':').ok_or_else(|| {
                    Error::invalid_value(keyword, format!("expected `attribute:filter` in `{clause}`"))
                })?;
                let attribute = attribute.trim();
                if !is_attribute_descriptor(attribute) {
                    return Err(Error::invalid_value(keyword, format!("bad attribute `{attribute}`")));
                }
                let filter =
                    Filter::parse(filter).map_err(|e| Error::invalid_value(keyword, e.to_string()))?;
                target.push(AttributeFilter {
                    attribute: attribute.to_string(),
                    filter,
                });
            }
        }
        if ops.is_empty() {
            return Err(Error::invalid_value(keyword, format!("no operations in `{raw}`")));
        }
        Ok(ops)
    }

    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.delete.is_empty()
    }
}

impl std::fmt::Display for AttributeFilterOperations {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let join = |clauses: &[AttributeFilter]| {
            clauses
                .iter()
                .map(AttributeFilter::to_string)
                .collect::<Vec<String>>()
                .join(" && ")
        };
        let mut ops = vec![];
        if !self.add.is_empty() {
            ops.push(format!("add={}", join(&self.add)));
        }
        if !self.delete.is_empty() {
            ops.push(format!("delete={}", join(&self.delete)));
        }
        f.write_str(&ops.join(","))
    }
}

//
// Splits `raw` before each `add=`/`del=`/`delete=` that follows a `,` or `;`
// outside of any parenthesized filter.
//
fn split_operations(raw: &str) -> Vec<&str> {
    let mut parts = vec![];
    let mut depth = 0usize;
    let mut start = 0;
    for (idx, ch) in raw.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' | ';' if depth == 0 => {
                let next = raw[idx + 1..].trim_start().to_ascii_lowercase();
                if next.starts_with("add=") || next.starts_with("del=") || next.starts_with("delete=") {
                    parts.push(&raw[start..idx]);
                    start = idx + 1;
                }
            }
            _ => {}
        }
    }
    parts.push(&raw[start..]);
    parts
}

fn split_at_depth_zero<'a>(raw: &'a str, delim: &str) -> Vec<&'a str> {
    let mut parts = vec![];
    let mut depth = 0usize;
    let mut start = 0;
    let mut idx = 0;
    while idx < raw.len() {
        let rest = &raw[idx..];
        if depth == 0 && rest.starts_with(delim) {
            parts.push(&raw[start..idx]);
            idx += delim.len();
            start = idx;
            continue;
        }
        let ch = rest.chars().next().unwrap_or_default();
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ => {}
        }
        idx += ch.len_utf8();
    }
    parts.push(&raw[start..]);
    parts
}
