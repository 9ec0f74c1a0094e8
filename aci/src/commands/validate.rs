use std::fmt::Formatter;
use std::io::Write;

use aci_lang::Instruction;
use clap::{Arg, ArgAction, ArgMatches};
use colored::*;
use log::info;

use crate::command::Command;
use crate::commands::{
    common_args, read_input, settings, ERROR_STATUS_CODE, FAILURE_STATUS_CODE, SHOW_CANONICAL,
    SUCCESS_STATUS_CODE, VALIDATE,
};
use crate::errors::Result;
use crate::utils::logical_lines;
use crate::utils::reader::Reader;
use crate::utils::writer::Writer;

#[derive(Debug, Clone, PartialEq, Copy)]
pub(crate) enum Status {
    PASS,
    FAIL,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::PASS => write!(f, "{}", "PASS".green()),
            Status::FAIL => write!(f, "{}", "FAIL".red()),
        }
    }
}

#[derive(Clone, Copy, Eq, PartialEq)]
pub struct Validate {}

#[allow(clippy::new_without_default)]
impl Validate {
    pub fn new() -> Self {
        Validate {}
    }
}

impl Command for Validate {
    fn name(&self) -> &'static str {
        VALIDATE
    }

    fn command(&self) -> clap::Command {
        common_args(clap::Command::new(VALIDATE).about(
            "Parses and validates every instruction in the file, reporting PASS or FAIL for each.",
        ))
        .arg(
            Arg::new(SHOW_CANONICAL.0)
                .long(SHOW_CANONICAL.0)
                .short(SHOW_CANONICAL.1)
                .action(ArgAction::SetTrue)
                .help("Print the canonical form under each passing instruction"),
        )
    }

    fn execute(&self, app: &ArgMatches, writer: &mut Writer, reader: &mut Reader) -> Result<i32> {
        let options = settings(app)?.parse_options();
        let show_canonical = app.get_flag(SHOW_CANONICAL.0);
        let content = read_input(app, reader)?;

        let mut parse_errors = 0;
        let mut failures = 0;
        for line in logical_lines(&content) {
            let aci = match Instruction::parse_with(&line.text, &options) {
                Ok(aci) => aci,
                Err(e) => {
                    parse_errors += 1;
                    writeln!(writer, "{}: {}", line.line_num, Status::FAIL)?;
                    writeln!(writer, "    {e}")?;
                    continue;
                }
            };
            match aci.valid() {
                Ok(()) => {
                    writeln!(writer, "{}: acl \"{}\" {}", line.line_num, aci.acl, Status::PASS)?;
                    if show_canonical {
                        writeln!(writer, "    {aci}")?;
                    }
                }
                Err(e) => {
                    failures += 1;
                    writeln!(writer, "{}: acl \"{}\" {}", line.line_num, aci.acl, Status::FAIL)?;
                    writeln!(writer, "    {e}")?;
                }
            }
        }
        info!("{parse_errors} instructions failed to parse, {failures} failed validation");

        Ok(if parse_errors > 0 {
            ERROR_STATUS_CODE
        } else if failures > 0 {
            FAILURE_STATUS_CODE
        } else {
            SUCCESS_STATUS_CODE
        })
    }
}
