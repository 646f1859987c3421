//! Output configuration commands

use std::fs;

use anyhow::{Context, Result};
use colored::*;

use crate::commands::connect;
use crate::config_file;
use crate::error::CliError;
use crate::output;

/// Execute get-output-config command
pub fn get(target: &str, json: bool, timeout_ms: Option<u64>) -> Result<()> {
    let mut client = connect(target, timeout_ms)?;
    client.go_to_config().map_err(CliError::from)?;
    let config = client.get_output_configuration().map_err(CliError::from)?;
    output::print_output_configuration(&config, json);
    Ok(())
}

/// Execute set-output-config command
pub fn set(target: &str, path: &str, json: bool, timeout_ms: Option<u64>) -> Result<()> {
    let text = fs::read_to_string(path)
        .map_err(CliError::from)
        .with_context(|| format!("reading {path}"))?;
    let config = config_file::parse(&text)?;
    if !json {
        println!("{}", "Setting output configuration:".bold());
        println!();
    }
    output::print_output_configuration(&config, json);

    let mut client = connect(target, timeout_ms)?;
    client.go_to_config().map_err(CliError::from)?;
    client
        .set_output_configuration(&config)
        .map_err(CliError::from)?;
    Ok(())
}
