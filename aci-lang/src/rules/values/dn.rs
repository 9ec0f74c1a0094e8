use std::fmt::Formatter;

use serde::{Deserialize, Serialize};

use crate::rules::directory::{DistinguishedName, Filter};
use crate::rules::errors::Error;
use crate::rules::values::target::SearchScope;
use crate::rules::values::split_double_pipe;
use crate::rules::Result;

pub const LDAP_SCHEME: &str = "ldap:///";

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum SpecialDn {
    Anyone,
    All,
    SelfDn,
    Parent,
}

impl SpecialDn {
    fn lookup(text: &str) -> Option<SpecialDn> {
        match text.to_ascii_lowercase().as_str() {
            "anyone" => Some(SpecialDn::Anyone),
            "all" => Some(SpecialDn::All),
            "self" => Some(SpecialDn::SelfDn),
            "parent" => Some(SpecialDn::Parent),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SpecialDn::Anyone => "anyone",
            SpecialDn::All => "all",
            SpecialDn::SelfDn => "self",
            SpecialDn::Parent => "parent",
        }
    }
}

///
/// An LDAP URL naming a set of entries relative to a base DN:
/// `ldap:///<dn>?<attributes>?<scope>?<filter>`
///
#[derive(Eq, PartialEq, Debug, Clone, Hash, Serialize, Deserialize)]
pub struct LdapUrl {
    pub dn: DistinguishedName,
    pub attributes: Vec<String>,
    pub scope: Option<SearchScope>,
    pub filter: Option<Filter>,
}

impl LdapUrl {
    pub(crate) fn parse(keyword: &str, text: &str) -> Result<LdapUrl> {
        let mut parts = text.splitn(4, '?');
        let dn = parts.next().unwrap_or_default();
        let dn = DistinguishedName::parse_pattern(dn)
            .map_err(|e| Error::invalid_value(keyword, e.to_string()))?;
        let attributes = parts
            .next()
            .map(|a| {
                a.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect::<Vec<String>>()
            })
            .unwrap_or_default();
        let scope = match parts.next().map(str::trim) {
            None | Some("") => None,
            Some(s) => Some(
                SearchScope::parse(s).map_err(|e| Error::invalid_value(keyword, e.to_string()))?,
            ),
        };
        let filter = match parts.next().map(str::trim) {
            None | Some("") => None,
            Some(f) => {
                Some(Filter::parse(f).map_err(|e| Error::invalid_value(keyword, e.to_string()))?)
            }
        };
        Ok(LdapUrl {
            dn,
            attributes,
            scope,
            filter,
        })
    }
}

impl std::fmt::Display for LdapUrl {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut parts = vec![
            self.dn.to_string(),
            self.attributes.join(","),
            self.scope.map_or(String::new(), |s| s.url_name().to_string()),
            self.filter.as_ref().map_or(String::new(), |f| f.to_string()),
        ];
        while parts.len() > 1 && parts.last().map_or(false, String::is_empty) {
            parts.pop();
        }
        f.write_str(&parts.join("?"))
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Hash, Serialize, Deserialize)]
pub enum DnItem {
    Special(SpecialDn),
    Dn(DistinguishedName),
    Url(LdapUrl),
}

impl DnItem {
    fn same(&self, other: &DnItem) -> bool {
        match (self, other) {
            (DnItem::Dn(a), DnItem::Dn(b)) => a.eq_ignore_case(b),
            (a, b) => a.to_string().eq_ignore_ascii_case(&b.to_string()),
        }
    }
}

impl std::fmt::Display for DnItem {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(LDAP_SCHEME)?;
        match self {
            DnItem::Special(s) => f.write_str(s.name()),
            DnItem::Dn(dn) => write!(f, "{dn}"),
            DnItem::Url(url) => write!(f, "{url}"),
        }
    }
}

///
/// Ordered, de-duplicated list of DN values, rendered `||` delimited with the
/// `ldap:///` scheme on each entry.
///
#[derive(Eq, PartialEq, Debug, Clone, Default, Hash, Serialize, Deserialize)]
pub struct DnList {
    items: Vec<DnItem>,
}

impl DnList {
    pub fn new() -> Self {
        DnList::default()
    }

    pub(crate) fn parse(keyword: &str, raw: &str, allow_url: bool) -> Result<DnList> {
        let mut list = DnList::new();
        for entry in split_double_pipe(raw) {
            let stripped = strip_scheme(entry);
            let item = if let Some(special) = SpecialDn::lookup(stripped) {
                DnItem::Special(special)
            } else if stripped.contains('?') {
                if !allow_url {
                    return Err(Error::invalid_value(
                        keyword,
                        format!("LDAP URL `{entry}` is not permitted here"),
                    ));
                }
                DnItem::Url(LdapUrl::parse(keyword, stripped)?)
            } else {
                DnItem::Dn(
                    DistinguishedName::parse_pattern(stripped)
                        .map_err(|e| Error::invalid_value(keyword, e.to_string()))?,
                )
            };
            list.push(item);
        }
        if list.is_empty() {
            return Err(Error::invalid_value(keyword, format!("no DN found in `{raw}`")));
        }
        Ok(list)
    }

    /// Appends `item` unless an equivalent entry is already present.
    pub fn push(&mut self, item: DnItem) -> &mut Self {
        if !self.items.iter().any(|existing| existing.same(&item)) {
            self.items.push(item);
        }
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &DnItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains_special(&self, special: SpecialDn) -> bool {
        self.items
            .iter()
            .any(|item| matches!(item, DnItem::Special(s) if *s == special))
    }

    pub(crate) fn has_url(&self) -> bool {
        self.items.iter().any(|item| matches!(item, DnItem::Url(_)))
    }
}

impl FromIterator<DnItem> for DnList {
    fn from_iter<T: IntoIterator<Item = DnItem>>(iter: T) -> Self {
        let mut list = DnList::new();
        for item in iter {
            list.push(item);
        }
        list
    }
}

impl std::fmt::Display for DnList {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let rendered = self
            .items
            .iter()
            .map(|item| item.to_string())
            .collect::<Vec<String>>();
        f.write_str(&rendered.join(" || "))
    }
}

fn strip_scheme(entry: &str) -> &str {
    match entry.get(..LDAP_SCHEME.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(LDAP_SCHEME) => &entry[LDAP_SCHEME.len()..],
        _ => entry,
    }
}
