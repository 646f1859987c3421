//! Device identity command

use anyhow::Result;

use crate::commands::connect;
use crate::error::CliError;
use crate::output;

/// Execute device-info command
pub fn execute(target: &str, json: bool, timeout_ms: Option<u64>) -> Result<()> {
    let mut client = connect(target, timeout_ms)?;
    client.go_to_config().map_err(CliError::from)?;
    let device_id = client.get_device_id().map_err(CliError::from)?;
    let product_code = client.get_product_code().map_err(CliError::from)?;
    let hardware_version = client.get_hardware_version().map_err(CliError::from)?;
    output::print_device_info(device_id, &product_code, hardware_version, json);
    Ok(())
}
