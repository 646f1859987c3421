//! Output formatting for CLI responses

use anyhow::Error;
use colored::*;
use mtlink_protocol::{
    DecodeError, DeviceId, Frame, HardwareVersion, OutputConfiguration, ProductCode, Sample,
};
use serde::Serialize;
use serde_json::json;

use crate::config_file;

/// Print error in JSON format
pub fn print_error_json(error: &Error) {
    let error_json = json!({
        "success": false,
        "error": {
            "message": error.to_string(),
        }
    });
    print_json(&error_json);
}

/// Print error in human-readable format
pub fn print_error_human(error: &Error) {
    eprintln!("{} {}", "Error:".red().bold(), error);

    let mut source = error.source();
    while let Some(err) = source {
        eprintln!("  {} {}", "Caused by:".yellow(), err);
        source = err.source();
    }
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string(value) {
        Ok(s) => println!("{s}"),
        Err(e) => eprintln!("Failed to format output as JSON: {e}"),
    }
}

/// Print the decoded samples of one MTData2 frame, one JSON object per frame.
pub fn print_samples(samples: &[Sample], error: Option<&DecodeError>, json: bool) {
    if json {
        print_json(&json!({
            "samples": samples,
            "error": error.map(ToString::to_string),
        }));
        return;
    }
    for sample in samples {
        println!("{}", sample.measurement);
    }
    if let Some(err) = error {
        println!("  {} {}", "Undecodable:".yellow(), err);
    }
    println!();
}

/// Print a raw frame from a capture
pub fn print_frame(index: usize, frame: &Frame, json: bool) {
    if json {
        print_json(&json!({
            "index": index,
            "mid": frame.identifier().to_string(),
            "length": frame.length(),
            "extended": frame.is_extended(),
        }));
    } else {
        println!("{} {}", format!("#{index}").dimmed(), frame.identifier().to_string().bold());
    }
}

pub fn print_output_configuration(config: &OutputConfiguration, json: bool) {
    if json {
        print_json(&config_file::to_entries(config));
    } else if config.is_empty() {
        println!("{}", "No outputs configured".yellow());
    } else {
        println!("{config}");
    }
}

pub fn print_device_info(
    device_id: DeviceId,
    product_code: &ProductCode,
    hardware_version: HardwareVersion,
    json: bool,
) {
    if json {
        print_json(&json!({
            "success": true,
            "device": {
                "device_id": device_id.to_string(),
                "product_code": product_code.as_str(),
                "hardware_version": hardware_version.to_string(),
            }
        }));
    } else {
        println!("{}", "Device:".bold());
        println!("  Device ID:        {device_id}");
        println!("  Product code:     {product_code}");
        println!("  Hardware version: {hardware_version}");
    }
}
