use std::fmt::Formatter;

use fancy_regex::Regex;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use crate::rules::errors::Error;
use crate::rules::keywords::BindKeyword;
use crate::rules::Result;

lazy_static! {
    static ref FQDN_LABEL: Regex =
        Regex::new(r"^(\*|[A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?)$").expect("fqdn label pattern");
}

const MAX_FQDN_LENGTH: usize = 253;

//
// Permissive character classes; the value is an address or address pattern,
// not necessarily a well formed literal.
//
fn is_ipv4_pattern(addr: &str) -> bool {
    addr.chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | '*' | '/'))
        && addr.chars().any(|c| c.is_ascii_digit() || c == '*')
}

fn is_ipv6_pattern(addr: &str) -> bool {
    addr.contains(':')
        && addr
            .chars()
            .all(|c| c.is_ascii_hexdigit() || matches!(c, ':' | '.' | '*' | '/'))
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Hash, Serialize, Deserialize)]
pub struct IpAddressList(Vec<String>);

impl IpAddressList {
    pub fn new() -> Self {
        IpAddressList::default()
    }

    pub fn parse(raw: &str) -> Result<IpAddressList> {
        let mut list = IpAddressList::new();
        for addr in raw.split(',').map(str::trim).filter(|a| !a.is_empty()) {
            if !(is_ipv4_pattern(addr) || is_ipv6_pattern(addr)) {
                return Err(Error::invalid_value(
                    BindKeyword::Ip,
                    format!("`{addr}` is not an IPv4 or IPv6 address pattern"),
                ));
            }
            list.push(addr);
        }
        if list.is_empty() {
            return Err(Error::invalid_value(BindKeyword::Ip, format!("no address in `{raw}`")));
        }
        Ok(list)
    }

    pub fn push(&mut self, addr: impl Into<String>) -> &mut Self {
        let addr = addr.into();
        if !self.0.iter().any(|a| a.eq_ignore_ascii_case(&addr)) {
            self.0.push(addr);
        }
        self
    }

    pub fn addresses(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for IpAddressList {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0.join(","))
    }
}

///
/// Fully qualified domain names, wildcard labels allowed
///
#[derive(Eq, PartialEq, Debug, Clone, Default, Hash, Serialize, Deserialize)]
pub struct FqdnList(Vec<String>);

impl FqdnList {
    pub fn new() -> Self {
        FqdnList::default()
    }

    pub fn parse(raw: &str) -> Result<FqdnList> {
        let mut list = FqdnList::new();
        for name in raw.split(',').map(str::trim).filter(|n| !n.is_empty()) {
            validate_fqdn(name)?;
            list.push(name);
        }
        if list.is_empty() {
            return Err(Error::invalid_value(BindKeyword::Dns, format!("no domain in `{raw}`")));
        }
        Ok(list)
    }

    pub fn push(&mut self, name: impl Into<String>) -> &mut Self {
        let name = name.into();
        if !self.0.iter().any(|n| n.eq_ignore_ascii_case(&name)) {
            self.0.push(name);
        }
        self
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for FqdnList {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0.join(","))
    }
}

fn validate_fqdn(name: &str) -> Result<()> {
    if name.len() > MAX_FQDN_LENGTH {
        return Err(Error::invalid_value(
            BindKeyword::Dns,
            format!("`{name}` is longer than {MAX_FQDN_LENGTH} characters"),
        ));
    }
    let labels = name.split('.').collect::<Vec<&str>>();
    if labels.len() < 2 {
        return Err(Error::invalid_value(
            BindKeyword::Dns,
            format!("`{name}` needs at least two labels"),
        ));
    }
    match labels
        .iter()
        .find(|label| !FQDN_LABEL.is_match(label).unwrap_or(false))
    {
        Some(bad) => Err(Error::invalid_value(
            BindKeyword::Dns,
            format!("bad label `{bad}` in `{name}`"),
        )),
        None => Ok(()),
    }
}
