//!
//! Layered settings: built-in defaults, an optional TOML file, then `ACI_`
//! environment variables. Command line flags are applied by the caller.
//!
use std::path::Path;

use aci_lang::{ParseOptions, DEFAULT_MAX_NESTING_DEPTH};
use log::LevelFilter;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

pub const ENV_PREFIX: &str = "ACI";

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Yaml,
    Json,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub max_nesting_depth: usize,
    pub log_level: String,
    pub output: OutputFormat,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
            log_level: "warn".to_string(),
            output: OutputFormat::Yaml,
        }
    }
}

impl Settings {
    pub fn load(file: Option<&Path>) -> Result<Settings> {
        let mut builder =
            config::Config::builder().add_source(config::Config::try_from(&Settings::default())?);
        if let Some(file) = file {
            if !file.exists() {
                return Err(Error::IllegalArguments(format!(
                    "configuration file {} does not exist",
                    file.display()
                )));
            }
            builder = builder.add_source(
                config::File::from(file)
                    .required(true)
                    .format(config::FileFormat::Toml),
            );
        }
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .try_parsing(true),
        );
        let settings = builder.build()?.try_deserialize::<Settings>()?;
        settings.level_filter()?;
        Ok(settings)
    }

    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions::default().with_max_nesting_depth(self.max_nesting_depth)
    }

    pub fn level_filter(&self) -> Result<LevelFilter> {
        self.log_level.parse::<LevelFilter>().map_err(|_| {
            Error::IllegalArguments(format!("unknown log level `{}`", self.log_level))
        })
    }

    /// Each `--verbose` raises the configured level by one step.
    pub fn verbosity(&self, verbose: u8) -> Result<LevelFilter> {
        let configured = self.level_filter()?;
        let levels = LevelFilter::iter().collect::<Vec<LevelFilter>>();
        let position = levels.iter().position(|l| *l == configured).unwrap_or(0);
        Ok(levels[(position + verbose as usize).min(levels.len() - 1)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn defaults_without_a_file() {
        let settings = Settings::load(None).unwrap();
        assert_eq!(settings.max_nesting_depth, DEFAULT_MAX_NESTING_DEPTH);
        assert_eq!(settings.output, OutputFormat::Yaml);
        assert_eq!(settings.level_filter().unwrap(), LevelFilter::Warn);
    }

    #[test]
    fn file_values_override_defaults() {
        let path = std::env::temp_dir().join(format!("aci-settings-{}.toml", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "max_nesting_depth = 8\noutput = \"json\"").unwrap();
        drop(file);

        let settings = Settings::load(Some(&path)).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(settings.max_nesting_depth, 8);
        assert_eq!(settings.output, OutputFormat::Json);
        assert_eq!(settings.log_level, "warn");
        assert_eq!(settings.parse_options().max_nesting_depth, 8);
    }

    #[test]
    fn missing_file_is_rejected() {
        let missing = Path::new("/definitely/not/here/aci.toml");
        assert!(matches!(
            Settings::load(Some(missing)),
            Err(Error::IllegalArguments(_))
        ));
    }

    #[test]
    fn verbosity_steps_up_from_configured_level() {
        let settings = Settings::default();
        assert_eq!(settings.verbosity(0).unwrap(), LevelFilter::Warn);
        assert_eq!(settings.verbosity(1).unwrap(), LevelFilter::Info);
        assert_eq!(settings.verbosity(2).unwrap(), LevelFilter::Debug);
        assert_eq!(settings.verbosity(9).unwrap(), LevelFilter::Trace);
    }
}
