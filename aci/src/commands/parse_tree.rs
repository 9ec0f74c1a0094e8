use aci_lang::Instruction;
use clap::{Arg, ArgAction, ArgMatches};
use log::debug;

use crate::command::Command;
use crate::commands::{
    common_args, read_input, settings, ERROR_STATUS_CODE, OUTPUT, PARSE_TREE, PRINT_JSON,
    PRINT_YAML, SUCCESS_STATUS_CODE,
};
use crate::errors::Result;
use crate::settings::OutputFormat;
use crate::utils::logical_lines;
use crate::utils::reader::Reader;
use crate::utils::writer::Writer;

#[derive(Clone, Copy, Eq, PartialEq)]
pub struct ParseTree {}

#[allow(clippy::new_without_default)]
impl ParseTree {
    pub fn new() -> Self {
        ParseTree {}
    }
}

impl Command for ParseTree {
    fn name(&self) -> &'static str {
        PARSE_TREE
    }

    fn command(&self) -> clap::Command {
        common_args(
            clap::Command::new(PARSE_TREE)
                .about("Prints out the parse tree for the instructions defined in the file."),
        )
        .arg(
            Arg::new(OUTPUT.0)
                .long(OUTPUT.0)
                .short(OUTPUT.1)
                .help("Write to output file")
                .action(ArgAction::Set)
                .required(false),
        )
        .arg(
            Arg::new(PRINT_JSON.0)
                .long(PRINT_JSON.0)
                .short(PRINT_JSON.1)
                .action(ArgAction::SetTrue)
                .conflicts_with(PRINT_YAML.0)
                .help("Print output in JSON format"),
        )
        .arg(
            Arg::new(PRINT_YAML.0)
                .long(PRINT_YAML.0)
                .short(PRINT_YAML.1)
                .action(ArgAction::SetTrue)
                .required(false)
                .help("Print output in YAML format"),
        )
    }

    fn execute(&self, app: &ArgMatches, writer: &mut Writer, reader: &mut Reader) -> Result<i32> {
        let settings = settings(app)?;
        let options = settings.parse_options();
        let format = if app.get_flag(PRINT_JSON.0) {
            OutputFormat::Json
        } else if app.get_flag(PRINT_YAML.0) {
            OutputFormat::Yaml
        } else {
            settings.output
        };

        let content = read_input(app, reader)?;
        let mut instructions = vec![];
        let mut failed = false;
        for line in logical_lines(&content) {
            match Instruction::parse_with(&line.text, &options) {
                Ok(aci) => instructions.push(aci),
                Err(e) => {
                    failed = true;
                    writer.write_err(format!(
                        "Parsing error handling instruction at line {}, Error = {e}",
                        line.line_num
                    ))?;
                }
            }
        }
        if failed {
            return Ok(ERROR_STATUS_CODE);
        }
        debug!("parsed {} instructions", instructions.len());

        match format {
            // YAML tags cannot nest (NOT wraps an AND/OR), emit the plain JSON tree shape
            OutputFormat::Yaml => {
                serde_yaml::to_writer(&mut *writer, &serde_json::to_value(&instructions)?)?
            }
            OutputFormat::Json => serde_json::to_writer(&mut *writer, &instructions)?,
        }

        Ok(SUCCESS_STATUS_CODE)
    }
}
