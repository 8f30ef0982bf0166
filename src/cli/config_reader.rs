use std::fs;

use log::debug;
use serde::{Deserialize, Serialize};
use snafu::prelude::*;

use d21_voting::DEFAULT_RETRY_LIMIT;

use crate::cli::{CliResult, OpeningFileSnafu, ParsingJsonSnafu, UnknownOutputFormatSnafu};

pub const DEFAULT_LEDGER_PATH: &str = "d21-ledger.json";

/// The content of the optional configuration file. Every key may be omitted.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct CliConfig {
    #[serde(rename = "ledgerPath")]
    pub ledger_path: Option<String>,
    #[serde(rename = "retryLimit")]
    pub retry_limit: Option<u32>,
    #[serde(rename = "outputFormat")]
    pub output_format: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum OutputFormat {
    Text,
    Json,
}

/// The settings of a run, once the flags and the configuration file are merged.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Settings {
    pub ledger_path: String,
    pub retry_limit: u32,
    pub output_format: OutputFormat,
}

pub fn read_config(path: &str) -> CliResult<CliConfig> {
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    let config: CliConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })?;
    debug!("read_config: {:?}", config);
    Ok(config)
}

fn parse_output_format(format: &str) -> CliResult<OutputFormat> {
    match format {
        "text" => Ok(OutputFormat::Text),
        "json" => Ok(OutputFormat::Json),
        _ => UnknownOutputFormatSnafu { format }.fail(),
    }
}

/// Flags win over the file, and the file wins over the defaults.
pub fn resolve_settings(
    config: &CliConfig,
    ledger_flag: Option<&str>,
    json_flag: bool,
) -> CliResult<Settings> {
    let ledger_path = ledger_flag
        .map(|s| s.to_string())
        .or_else(|| config.ledger_path.clone())
        .unwrap_or_else(|| DEFAULT_LEDGER_PATH.to_string());
    let output_format = if json_flag {
        OutputFormat::Json
    } else {
        match &config.output_format {
            Some(f) => parse_output_format(f)?,
            None => OutputFormat::Text,
        }
    };
    Ok(Settings {
        ledger_path,
        retry_limit: config.retry_limit.unwrap_or(DEFAULT_RETRY_LIMIT),
        output_format,
    })
}
