use std::fmt::Formatter;
use std::num::IntErrorKind;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::rules::errors::Error;
use crate::rules::keywords::BindKeyword;
use crate::rules::Result;

///
/// Security strength factor 0-256. Stored as `value - 1` in a byte when
/// present; absence means 0.
///
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default, Hash, Serialize, Deserialize)]
pub struct SecurityStrengthFactor(Option<u8>);

impl SecurityStrengthFactor {
    pub const MAX: u16 = 256;

    /// Clamps values above 256 down to 256; zero or negative clears it.
    pub fn new(value: i64) -> SecurityStrengthFactor {
        if value <= 0 {
            return SecurityStrengthFactor(None);
        }
        let clamped = value.min(i64::from(Self::MAX));
        if clamped != value {
            debug!("ssf {value} clamped to {clamped}");
        }
        SecurityStrengthFactor(Some((clamped - 1) as u8))
    }

    pub fn parse(raw: &str) -> Result<SecurityStrengthFactor> {
        let raw = raw.trim();
        match raw.to_ascii_lowercase().as_str() {
            "full" | "max" => return Ok(SecurityStrengthFactor::new(i64::from(Self::MAX))),
            "none" | "off" => return Ok(SecurityStrengthFactor(None)),
            _ => {}
        }
        match raw.parse::<i64>() {
            Ok(value) => Ok(SecurityStrengthFactor::new(value)),
            Err(e) => match e.kind() {
                IntErrorKind::PosOverflow => {
                    Ok(SecurityStrengthFactor::new(i64::from(Self::MAX)))
                }
                IntErrorKind::NegOverflow => Ok(SecurityStrengthFactor(None)),
                _ => Err(Error::invalid_value(
                    BindKeyword::Ssf,
                    format!("`{raw}` is not a number 0-256"),
                )),
            },
        }
    }

    pub fn value(&self) -> u16 {
        self.0.map_or(0, |v| u16::from(v) + 1)
    }

    pub fn set(&mut self, value: i64) -> &mut Self {
        *self = SecurityStrengthFactor::new(value);
        self
    }
}

impl std::fmt::Display for SecurityStrengthFactor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value())
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum AuthMethod {
    None,
    Simple,
    Ssl,
    Sasl,
    SaslExternal,
    SaslDigestMd5,
    SaslGssapi,
}

impl AuthMethod {
    pub const ALL: [AuthMethod; 7] = [
        AuthMethod::None,
        AuthMethod::Simple,
        AuthMethod::Ssl,
        AuthMethod::Sasl,
        AuthMethod::SaslExternal,
        AuthMethod::SaslDigestMd5,
        AuthMethod::SaslGssapi,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            AuthMethod::None => "NONE",
            AuthMethod::Simple => "SIMPLE",
            AuthMethod::Ssl => "SSL",
            AuthMethod::Sasl => "SASL",
            AuthMethod::SaslExternal => "SASL EXTERNAL",
            AuthMethod::SaslDigestMd5 => "SASL DIGEST-MD5",
            AuthMethod::SaslGssapi => "SASL GSSAPI",
        }
    }

    /// Case-insensitive; runs of whitespace between `SASL` and the mechanism
    /// are collapsed.
    pub fn parse(raw: &str) -> Result<AuthMethod> {
        let normalized = raw.split_whitespace().collect::<Vec<&str>>().join(" ");
        AuthMethod::ALL
            .iter()
            .find(|m| m.name().eq_ignore_ascii_case(&normalized))
            .copied()
            .ok_or_else(|| {
                Error::invalid_value(
                    BindKeyword::AuthMethod,
                    format!("unknown authentication method `{}`", raw.trim()),
                )
            })
    }
}

impl std::fmt::Display for AuthMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
