use std::fmt::Formatter;

use serde::{Deserialize, Serialize};

use crate::rules::directory::NumericOid;
use crate::rules::errors::Error;
use crate::rules::keywords::TargetKeyword;
use crate::rules::values::split_double_pipe;
use crate::rules::Result;

#[derive(Eq, PartialEq, Debug, Clone, Default, Hash, Serialize, Deserialize)]
pub struct OidList(Vec<NumericOid>);

impl OidList {
    pub fn new() -> Self {
        OidList::default()
    }

    pub(crate) fn parse(keyword: &str, raw: &str) -> Result<OidList> {
        let mut list = OidList::new();
        for entry in split_double_pipe(raw) {
            let oid =
                NumericOid::parse(entry).map_err(|e| Error::invalid_value(keyword, e.to_string()))?;
            list.push(oid);
        }
        if list.is_empty() {
            return Err(Error::invalid_value(keyword, format!("no object identifier in `{raw}`")));
        }
        Ok(list)
    }

    pub fn push(&mut self, oid: NumericOid) -> &mut Self {
        if !self.0.contains(&oid) {
            self.0.push(oid);
        }
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &NumericOid> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for OidList {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let oids = self.0.iter().map(NumericOid::to_string).collect::<Vec<String>>();
        f.write_str(&oids.join(" || "))
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum SearchScope {
    Base,
    OneLevel,
    Subtree,
    Subordinate,
}

impl SearchScope {
    /// Accepts both the `targetscope` spellings and the short LDAP URL ones.
    pub fn parse(raw: &str) -> Result<SearchScope> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "base" => Ok(SearchScope::Base),
            "onelevel" | "one" => Ok(SearchScope::OneLevel),
            "subtree" | "sub" => Ok(SearchScope::Subtree),
            "subordinate" | "children" => Ok(SearchScope::Subordinate),
            other => Err(Error::invalid_value(
                TargetKeyword::TargetScope,
                format!("unknown scope `{other}`"),
            )),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SearchScope::Base => "base",
            SearchScope::OneLevel => "onelevel",
            SearchScope::Subtree => "subtree",
            SearchScope::Subordinate => "subordinate",
        }
    }

    pub(crate) fn url_name(&self) -> &'static str {
        match self {
            SearchScope::Base => "base",
            SearchScope::OneLevel => "one",
            SearchScope::Subtree => "sub",
            SearchScope::Subordinate => "subordinate",
        }
    }
}

impl std::fmt::Display for SearchScope {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
