use std::collections::HashMap;
use std::fs::File;
use std::process::exit;

use aci::commands::{
    self, APP_NAME, APP_VERSION, ERROR_STATUS_CODE, FORMAT, OUTPUT, PARSE_TREE, VERBOSE,
};
use aci::errors::Error;
use aci::utils::get_aci_commands;
use aci::utils::reader::{ReadBuffer, Reader};
use aci::utils::writer::WriteBuffer::{File as WBFile, Stderr, Stdout};
use aci::utils::writer::Writer;
use clap::ArgMatches;

fn init_logging(args: &ArgMatches) -> Result<(), Error> {
    let settings = commands::settings(args)?;
    let verbose = args.get_count(VERBOSE.0);
    if let Some(level) = settings.verbosity(verbose)?.to_level() {
        simple_logger::init_with_level(level)
            .map_err(|e| Error::IllegalArguments(format!("unable to initialize logging {e}")))?;
    }
    Ok(())
}

fn main() -> Result<(), Error> {
    let mut app = clap::Command::new(APP_NAME)
        .version(APP_VERSION)
        .about(
            r#"
  Parses, validates and canonically formats directory server Access Control
  Instructions (ACIs). Each input file holds one instruction per logical line;
  LDIF folded lines, `aci:` attribute prefixes and `#` comments are accepted."#,
        )
        .arg_required_else_help(true);

    let commands = get_aci_commands();
    let mappings = commands.iter().map(|s| (s.name(), s)).fold(
        HashMap::with_capacity(commands.len()),
        |mut map, entry| {
            map.insert(entry.0, entry.1.as_ref());
            map
        },
    );

    for each in &commands {
        app = app.subcommand(each.command());
    }

    let help = app.render_usage();
    let app = app.get_matches();

    match app.subcommand() {
        Some((name, value)) => {
            if let Some(command) = mappings.get(name) {
                let mut output_writer: Writer = if [PARSE_TREE, FORMAT].contains(&command.name()) {
                    match value.get_one::<String>(OUTPUT.0) {
                        Some(file) => {
                            Writer::new(WBFile(File::create(file)?), Stderr(std::io::stderr()))
                        }
                        None => Writer::new(Stdout(std::io::stdout()), Stderr(std::io::stderr())),
                    }
                } else {
                    Writer::new(Stdout(std::io::stdout()), Stderr(std::io::stderr()))
                };

                if let Err(e) = init_logging(value) {
                    output_writer.write_err(format!("Error occurred {e}"))?;
                    exit(ERROR_STATUS_CODE);
                }

                match (*command).execute(
                    value,
                    &mut output_writer,
                    &mut Reader::new(ReadBuffer::Stdin(std::io::stdin())),
                ) {
                    Err(e) => {
                        output_writer.write_err(format!("Error occurred {e}"))?;
                        exit(ERROR_STATUS_CODE);
                    }
                    Ok(code) => exit(code),
                }
            } else {
                println!("{help}");
            }
        }
        None => {
            println!("{help}");
        }
    }

    Ok(())
}
