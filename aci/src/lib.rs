// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

pub mod command;
pub mod commands;
pub mod errors;
pub mod settings;
pub mod utils;

pub use errors::{Error, Result};

///
/// Parses and validates one instruction, returning its canonical text.
///
pub fn canonicalize(text: &str) -> Result<String> {
    let aci = aci_lang::Instruction::parse(text)?;
    aci.valid()?;
    Ok(aci.to_string())
}
