// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::PathBuf;

use aci::commands::{ERROR_STATUS_CODE, FAILURE_STATUS_CODE, SUCCESS_STATUS_CODE};
use aci::utils;
use aci::utils::reader::Reader;
use aci::utils::writer::Writer;

#[non_exhaustive]
pub struct StatusCode;

const ACI_TEST_APP_NAME: &str = "aci-test";

#[allow(dead_code)]
impl StatusCode {
    pub const SUCCESS: i32 = SUCCESS_STATUS_CODE;
    pub const INTERNAL_FAILURE: i32 = -1;
    pub const PREPROCESSOR_ERROR: i32 = -3;
    pub const PARSING_ERROR: i32 = ERROR_STATUS_CODE;
    pub const VALIDATION_ERROR: i32 = FAILURE_STATUS_CODE;
}

pub fn read_from_resource_file(path: &str) -> String {
    let mut resource = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    resource.push(path);
    let mut content = String::new();
    let mut reader = BufReader::new(File::open(resource.as_path()).unwrap());
    reader.read_to_string(&mut content).unwrap();

    content
}

pub fn get_full_path_for_resource_file(path: &str) -> String {
    let mut resource = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    resource.push(path);
    resource.display().to_string()
}

#[allow(dead_code)]
pub fn compare_write_buffer_with_file(
    expected_output_relative_file_path: &str,
    actual_output_writer: Writer,
) {
    let expected_output = read_from_resource_file(expected_output_relative_file_path);
    let actual_output = actual_output_writer.stripped().unwrap();
    pretty_assertions::assert_eq!(expected_output, actual_output)
}

#[allow(dead_code)]
pub fn compare_write_buffer_with_string(expected_output: &str, actual_output_writer: Writer) {
    let actual_output = actual_output_writer.stripped().unwrap();
    pretty_assertions::assert_eq!(expected_output, actual_output)
}

pub trait CommandTestRunner {
    fn build_args(&self) -> Vec<String>;

    fn run(&self, writer: &mut Writer, reader: &mut Reader) -> i32 {
        let mut app = clap::Command::new(ACI_TEST_APP_NAME);

        let command_options = self
            .build_args()
            .into_iter()
            .fold(vec![String::from(ACI_TEST_APP_NAME)], |mut res, arg| {
                res.push(arg);
                res
            });

        let commands = utils::get_aci_commands();

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

        let app = app.get_matches_from(command_options);

        match app.subcommand() {
            Some((name, value)) => match mappings.get(name) {
                Some(command) => match (*command).execute(value, writer, reader) {
                    Err(e) => {
                        writer
                            .write_err(format!("Error occurred {e}"))
                            .expect("failed to write to stderr");

                        StatusCode::INTERNAL_FAILURE
                    }
                    Ok(code) => code,
                },
                None => StatusCode::PREPROCESSOR_ERROR,
            },
            None => StatusCode::PREPROCESSOR_ERROR,
        }
    }
}

#[macro_export]
macro_rules! assert_output_from_file_eq {
    ($expected_output_relative_file_path: expr, $actual_output_writer: expr) => {
        $crate::utils::compare_write_buffer_with_file(
            $expected_output_relative_file_path,
            $actual_output_writer,
        )
    };
}

#[macro_export]
macro_rules! assert_output_from_str_eq {
    ($expected_output: expr, $actual_output_writer: expr) => {
        $crate::utils::compare_write_buffer_with_string($expected_output, $actual_output_writer)
    };
}

#[allow(dead_code)]
pub fn resource(file: &str) -> String {
    get_full_path_for_resource_file(&format!("resources/{file}"))
}
