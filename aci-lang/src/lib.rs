// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//!
//! Parsing, validation and canonical rendering of directory server Access
//! Control Instructions.
//!
//! ```
//! use aci_lang::Instruction;
//!
//! let aci = Instruction::parse(
//!     r#"(targetattr="cn")(version 3.0; acl "read cn"; allow(read) userdn="ldap:///anyone";)"#,
//! )
//! .unwrap();
//! assert!(aci.valid().is_ok());
//! assert_eq!(
//!     aci.to_string(),
//!     r#"(targetattr = "cn")(version 3.0; acl "read cn"; allow(read) userdn = "ldap:///anyone";)"#
//! );
//! ```
//!
mod rules;

pub use rules::bind_rule::{BindRule, BindRuleItem};
pub use rules::bitset::{BitSet, Width};
pub use rules::directory::{DistinguishedName, Filter, NumericOid};
pub use rules::errors::{Error, Errors};
pub use rules::instruction::{
    Instruction, PermissionBindRule, PermissionBindRuleItem, VERSION_MARKER,
};
pub use rules::keywords::{BindKeyword, Operator, TargetKeyword};
pub use rules::parser::{ParseOptions, DEFAULT_MAX_NESTING_DEPTH};
pub use rules::permission::{Disposition, Permission, Right, Rights};
pub use rules::target_rule::{TargetRule, TargetRuleItem};
pub use rules::values::{marshal_bind, marshal_target, Expression};
pub use rules::Result;

pub mod values {
    pub use crate::rules::values::{
        AttributeBindTypeOrValue, AttributeFilter, AttributeFilterOperations, AttributeList,
        AuthMethod, BindType, BindTypeOrValue, Day, DayOfWeek, DnItem, DnList, FqdnList,
        InheritanceLevels, IpAddressList, LdapUrl, OidList, SearchScope, SecurityStrengthFactor,
        SpecialDn, TimeOfDay, LDAP_SCHEME,
    };
}
