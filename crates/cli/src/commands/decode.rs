//! Offline decoding of captured byte streams

use std::fs::File;
use std::io::BufReader;

use anyhow::Result;
use mtlink_protocol::{Frame, FrameScanner, MessageId};
use tracing::warn;

use crate::commands::read::print_frame_samples;
use crate::error::CliError;
use crate::output;

/// Execute decode command
///
/// Frames that fail validation are reported and skipped so one corrupt
/// record does not end the walk.
pub fn execute(path: &str, json: bool) -> Result<()> {
    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => CliError::DeviceNotFound(path.to_string()),
        _ => CliError::IoError(e),
    })?;
    let scanner = FrameScanner::new(BufReader::new(file));

    for (index, token) in scanner.enumerate() {
        let token = token.map_err(CliError::from)?;
        let frame = match Frame::parse(token) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(index, error = %e, "skipping invalid frame");
                continue;
            }
        };
        output::print_frame(index, &frame, json);
        if frame.identifier() == MessageId::MT_DATA2 {
            print_frame_samples(&frame, json);
        }
    }
    Ok(())
}
