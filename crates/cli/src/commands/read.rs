//! Streaming measurement output

use anyhow::Result;
use mtlink_client::{ClientError, measurements};
use mtlink_protocol::{Frame, MessageId, Sample};
use tracing::info;

use crate::commands::connect;
use crate::error::CliError;
use crate::output;

/// Execute read command
pub fn execute(
    target: &str,
    count: Option<usize>,
    json: bool,
    timeout_ms: Option<u64>,
) -> Result<()> {
    let mut client = connect(target, timeout_ms)?;
    let first = client.go_to_measurement().map_err(CliError::from)?;

    let mut printed = 0;
    let mut next = Some(first);
    while count.is_none_or(|limit| printed < limit) {
        let frame = match next.take() {
            Some(frame) => frame,
            None => match client.receive() {
                Ok(frame) => frame,
                Err(ClientError::EndOfStream { .. }) => {
                    info!(frames = printed, "device closed the stream");
                    break;
                }
                Err(e) => return Err(CliError::from(e).into()),
            },
        };
        if frame.identifier() != MessageId::MT_DATA2 || frame.length() == 0 {
            continue;
        }
        print_frame_samples(&frame, json);
        printed += 1;
    }
    Ok(())
}

pub(crate) fn print_frame_samples(frame: &Frame, json: bool) {
    let mut samples: Vec<Sample> = Vec::new();
    let mut error = None;
    for item in measurements(frame) {
        match item {
            Ok(sample) => samples.push(sample),
            Err(e) => error = Some(e),
        }
    }
    output::print_samples(&samples, error.as_ref(), json);
}
