use std::io::Write;

use aci_lang::Instruction;
use clap::{Arg, ArgAction, ArgMatches};

use crate::command::Command;
use crate::commands::{
    common_args, read_input, settings, ERROR_STATUS_CODE, FORMAT, OUTPUT, SUCCESS_STATUS_CODE,
};
use crate::errors::Result;
use crate::utils::logical_lines;
use crate::utils::reader::Reader;
use crate::utils::writer::Writer;

#[derive(Clone, Copy, Eq, PartialEq)]
pub struct Format {}

#[allow(clippy::new_without_default)]
impl Format {
    pub fn new() -> Self {
        Format {}
    }
}

impl Command for Format {
    fn name(&self) -> &'static str {
        FORMAT
    }

    fn command(&self) -> clap::Command {
        common_args(
            clap::Command::new(FORMAT)
                .about("Rewrites every instruction in the file in canonical form, one per line."),
        )
        .arg(
            Arg::new(OUTPUT.0)
                .long(OUTPUT.0)
                .short(OUTPUT.1)
                .help("Write to output file")
                .action(ArgAction::Set)
                .required(false),
        )
    }

    fn execute(&self, app: &ArgMatches, writer: &mut Writer, reader: &mut Reader) -> Result<i32> {
        let options = settings(app)?.parse_options();
        let content = read_input(app, reader)?;

        let mut canonical = vec![];
        for line in logical_lines(&content) {
            match Instruction::parse_with(&line.text, &options) {
                Ok(aci) => canonical.push(aci.to_string()),
                Err(e) => {
                    writer.write_err(format!(
                        "Parsing error handling instruction at line {}, Error = {e}",
                        line.line_num
                    ))?;
                    return Ok(ERROR_STATUS_CODE);
                }
            }
        }
        for aci in canonical {
            writeln!(writer, "{aci}")?;
        }
        Ok(SUCCESS_STATUS_CODE)
    }
}
