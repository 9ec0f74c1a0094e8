pub(crate) mod bind_rule;
pub(crate) mod bitset;
pub(crate) mod directory;
pub(crate) mod errors;
pub(crate) mod instruction;
pub(crate) mod keywords;
pub(crate) mod parser;
pub(crate) mod permission;
pub(crate) mod target_rule;
pub(crate) mod values;

use errors::Error;

pub type Result<R> = std::result::Result<R, Error>;
