pub mod format;
pub mod parse_tree;
pub mod validate;

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use clap::{Arg, ArgAction, ArgMatches};

use crate::errors::Result;
use crate::settings::Settings;
use crate::utils::reader::Reader;

//
// Constants
//
// Application metadata
pub const APP_NAME: &str = "aci";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
// Commands
pub const PARSE_TREE: &str = "parse-tree";
pub const VALIDATE: &str = "validate";
pub const FORMAT: &str = "format";
// Arguments shared by every command
pub const RULES: (&str, char) = ("rules", 'r');
pub const CONFIG: (&str, char) = ("config", 'c');
pub const VERBOSE: (&str, char) = ("verbose", 'v');
// Arguments for parse-tree, format
pub const OUTPUT: (&str, char) = ("output", 'o');
// Arguments for parse-tree
pub const PRINT_JSON: (&str, char) = ("print-json", 'p');
pub const PRINT_YAML: (&str, char) = ("print-yaml", 'y');
// Arguments for validate
pub const SHOW_CANONICAL: (&str, char) = ("show-canonical", 's');

pub const SUCCESS_STATUS_CODE: i32 = 0;
pub const ERROR_STATUS_CODE: i32 = 5;
pub const FAILURE_STATUS_CODE: i32 = 19;

pub(crate) fn common_args(command: clap::Command) -> clap::Command {
    command
        .arg(
            Arg::new(RULES.0)
                .long(RULES.0)
                .short(RULES.1)
                .help("File holding one instruction per logical line, reads stdin when absent")
                .action(ArgAction::Set)
                .required(false),
        )
        .arg(
            Arg::new(CONFIG.0)
                .long(CONFIG.0)
                .short(CONFIG.1)
                .help("TOML settings file")
                .action(ArgAction::Set)
                .required(false),
        )
        .arg(
            Arg::new(VERBOSE.0)
                .long(VERBOSE.0)
                .short(VERBOSE.1)
                .help("Raise the log level, repeat for more detail")
                .action(ArgAction::Count),
        )
}

/// Settings for a command invocation, honoring `--config`.
pub fn settings(args: &ArgMatches) -> Result<Settings> {
    Settings::load(args.get_one::<String>(CONFIG.0).map(Path::new))
}

pub(crate) fn read_input(args: &ArgMatches, reader: &mut Reader) -> Result<String> {
    match args.get_one::<String>(RULES.0) {
        Some(file) => {
            let mut content = String::new();
            BufReader::new(File::open(file)?).read_to_string(&mut content)?;
            Ok(content)
        }
        None => Ok(reader.read_all()?),
    }
}
