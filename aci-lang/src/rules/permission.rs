use std::collections::HashMap;
use std::convert::TryFrom;
use std::fmt::Formatter;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use crate::rules::bitset::BitSet;
use crate::rules::errors::Error;
use crate::rules::Result;

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum Disposition {
    Allow,
    Deny,
}

impl Disposition {
    pub fn name(&self) -> &'static str {
        match self {
            Disposition::Allow => "allow",
            Disposition::Deny => "deny",
        }
    }
}

impl std::fmt::Display for Disposition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

///
/// A single privilege. The discriminant is the bit position in [`Rights`].
///
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum Right {
    Read,
    Write,
    Add,
    Delete,
    Search,
    Compare,
    SelfWrite,
    Proxy,
    Import,
    Export,
}

impl Right {
    pub const ALL: [Right; 10] = [
        Right::Read,
        Right::Write,
        Right::Add,
        Right::Delete,
        Right::Search,
        Right::Compare,
        Right::SelfWrite,
        Right::Proxy,
        Right::Import,
        Right::Export,
    ];

    pub fn bit(&self) -> u32 {
        *self as u32
    }

    pub fn name(&self) -> &'static str {
        match self {
            Right::Read => "read",
            Right::Write => "write",
            Right::Add => "add",
            Right::Delete => "delete",
            Right::Search => "search",
            Right::Compare => "compare",
            Right::SelfWrite => "selfwrite",
            Right::Proxy => "proxy",
            Right::Import => "import",
            Right::Export => "export",
        }
    }
}

impl std::fmt::Display for Right {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

lazy_static! {
    static ref RIGHT_NAMES: HashMap<&'static str, Rights> = {
        let mut names = Right::ALL
            .iter()
            .map(|r| (r.name(), Rights::from(*r)))
            .collect::<HashMap<&'static str, Rights>>();
        names.insert("all", Rights::all());
        names.insert("none", Rights::none());
        names
    };
}

///
/// Set of privileges, bit `n` standing for the [`Right`] with discriminant
/// `n`. `all` covers every right except `proxy`.
///
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rights(BitSet<u16>);

impl Rights {
    pub const ALL_BITS: u16 = 895;
    pub const FULL_BITS: u16 = 1023;

    pub fn none() -> Rights {
        Rights::default()
    }

    pub fn all() -> Rights {
        Rights(BitSet::from_bits(Self::ALL_BITS))
    }

    pub fn bits(&self) -> u16 {
        self.0.bits()
    }

    /// Resolves a comma separated run of right names, e.g. `read,search`.
    pub fn parse(names: &str) -> Result<Rights> {
        let mut rights = Rights::none();
        for name in names.split(',').map(str::trim) {
            let named = RIGHT_NAMES
                .get(name.to_ascii_lowercase().as_str())
                .ok_or_else(|| Error::UnknownRight(name.to_string()))?;
            rights = rights | *named;
        }
        Ok(rights)
    }

    pub fn shift(&mut self, right: Right) -> &mut Self {
        self.0.shift(right.bit());
        self
    }

    pub fn unshift(&mut self, right: Right) -> &mut Self {
        self.0.unshift(right.bit());
        self
    }

    pub fn positive(&self, right: Right) -> bool {
        self.0.positive(right.bit())
    }

    pub fn rights(&self) -> Vec<Right> {
        Right::ALL.iter().copied().filter(|r| self.positive(*r)).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_zero()
    }
}

impl From<Right> for Rights {
    fn from(right: Right) -> Self {
        let mut rights = Rights::none();
        rights.shift(right);
        rights
    }
}

impl FromIterator<Right> for Rights {
    fn from_iter<T: IntoIterator<Item = Right>>(iter: T) -> Self {
        let mut rights = Rights::none();
        for right in iter {
            rights.shift(right);
        }
        rights
    }
}

impl std::ops::BitOr for Rights {
    type Output = Rights;

    fn bitor(self, rhs: Self) -> Self::Output {
        Rights(BitSet::from_bits(self.bits() | rhs.bits()))
    }
}

impl std::fmt::Display for Rights {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.bits() {
            0 => f.write_str("none"),
            Self::ALL_BITS => f.write_str("all"),
            Self::FULL_BITS => f.write_str("all,proxy"),
            _ => {
                let names = self.rights().iter().map(Right::name).collect::<Vec<&str>>();
                f.write_str(&names.join(","))
            }
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Serialize, Deserialize)]
pub struct Permission {
    pub disposition: Disposition,
    pub rights: Rights,
}

impl Permission {
    pub fn allow(rights: impl Into<Rights>) -> Permission {
        Permission {
            disposition: Disposition::Allow,
            rights: rights.into(),
        }
    }

    pub fn deny(rights: impl Into<Rights>) -> Permission {
        Permission {
            disposition: Disposition::Deny,
            rights: rights.into(),
        }
    }

    /// `allow(<rights>)` or `deny(<rights>)`; surrounding whitespace is
    /// ignored, the disposition is case-insensitive.
    pub fn parse(text: &str) -> Result<Permission> {
        let text = text.trim();
        if text.len() < 9 || !text.ends_with(')') {
            return Err(Error::ParseError(format!(
                "`{text}` is not a permission, expected allow(<rights>) or deny(<rights>)"
            )));
        }
        let open = text.find('(').ok_or_else(|| {
            Error::ParseError(format!("`{text}` is missing `(` after the disposition"))
        })?;
        let disposition = match text[..open].trim().to_ascii_lowercase().as_str() {
            "allow" => Disposition::Allow,
            "deny" => Disposition::Deny,
            other => {
                return Err(Error::ParseError(format!(
                    "unknown disposition `{other}` in `{text}`"
                )))
            }
        };
        let rights = Rights::parse(&text[open + 1..text.len() - 1])?;
        Ok(Permission {
            disposition,
            rights,
        })
    }

    pub fn valid(&self) -> Result<()> {
        if self.rights.bits() & !Rights::FULL_BITS != 0 {
            return Err(Error::ValidationError(format!(
                "rights bits {:#b} name no known privilege",
                self.rights.bits()
            )));
        }
        Ok(())
    }
}

impl<'a> TryFrom<&'a str> for Permission {
    type Error = Error;

    fn try_from(value: &'a str) -> std::result::Result<Self, Self::Error> {
        Permission::parse(value)
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.disposition, self.rights)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn counts_distinct_privileges() {
        let allow = Permission::parse("allow(read,search,compare)").unwrap();
        assert_eq!(allow.disposition, Disposition::Allow);
        assert_eq!(allow.rights.len(), 3);

        let deny = Permission::parse("deny(write,proxy)").unwrap();
        assert_eq!(deny.disposition, Disposition::Deny);
        assert_eq!(deny.rights.len(), 2);
        assert!(deny.rights.positive(Right::Proxy));
    }

    #[rstest]
    #[case("allow(read,write)", "allow(read,write)")]
    #[case("allow (write, read, read)", "allow(read,write)")]
    #[case("DENY(all)", "deny(all)")]
    #[case("allow(none)", "allow(none)")]
    #[case("allow(all,proxy)", "allow(all,proxy)")]
    #[case("allow(proxy,export,import,selfwrite)", "allow(selfwrite,proxy,import,export)")]
    #[case(
        "deny(read,write,add,delete,search,compare,selfwrite,import,export)",
        "deny(all)"
    )]
    fn renders_canonically(#[case] text: &str, #[case] rendered: &str) {
        assert_eq!(Permission::parse(text).unwrap().to_string(), rendered);
    }

    #[test]
    fn all_excludes_proxy() {
        let all = Rights::all();
        assert_eq!(all.bits(), 895);
        assert!(!all.positive(Right::Proxy));
        assert_eq!((all | Rights::from(Right::Proxy)).bits(), 1023);
        assert_eq!(Rights::none().bits(), 0);
    }

    #[rstest]
    #[case("allow")]
    #[case("allow()")]
    #[case("allow(read")]
    #[case("permit(read)")]
    #[case("allowread)")]
    fn rejects_malformed_permissions(#[case] text: &str) {
        assert!(matches!(Permission::parse(text), Err(Error::ParseError(_))), "{text}");
    }

    #[test]
    fn rejects_unknown_rights() {
        assert_eq!(
            Permission::parse("allow(read,modify)"),
            Err(Error::UnknownRight("modify".to_string()))
        );
    }

    #[test]
    fn shift_and_unshift_are_inverse() {
        let mut rights = Rights::from_iter([Right::Read, Right::Search]);
        let before = rights;
        rights.shift(Right::Export).unshift(Right::Export);
        assert_eq!(rights, before);
        assert_eq!(Permission::allow(rights).to_string(), "allow(read,search)");
        assert_eq!(Permission::deny(Right::Add).to_string(), "deny(add)");
        assert!(Permission::allow(rights).valid().is_ok());
    }
}
