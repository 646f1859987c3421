//! Device-side protocol loop.

use std::fmt;
use std::io::{Read, Write};

use mtlink_protocol::{
    CanBaudRate, CanConfiguration, CanOutputConfiguration, DataKind, DeviceId, ErrorCode, Frame,
    FrameScanner, HardwareVersion, Measurement, MessageId, OutputConfiguration, ProductCode,
};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::error::{EmulatorError, EmulatorResult};

/// Whether the emulated device is accepting configuration or streaming.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Mode {
    #[default]
    Config,
    Measurement,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Config => f.write_str("config"),
            Mode::Measurement => f.write_str("measurement"),
        }
    }
}

/// Answers to the identity requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceIdentity {
    pub device_id: DeviceId,
    pub product_code: ProductCode,
    pub hardware_version: HardwareVersion,
}

impl Default for DeviceIdentity {
    fn default() -> Self {
        Self {
            device_id: DeviceId(0x0370_0001),
            product_code: ProductCode("MTi-670-2A5G4".to_string()),
            hardware_version: HardwareVersion { major: 2, minor: 0 },
        }
    }
}

#[derive(Debug, Default)]
struct DeviceState {
    mode: Mode,
    last_identifier: Option<MessageId>,
    output_configuration: OutputConfiguration,
    can_output_configuration: CanOutputConfiguration,
    can_configuration: Option<CanConfiguration>,
}

/// Emulated device behind a reader/writer pair.
///
/// All methods take `&self`: one thread can run [`Emulator::receive`] while
/// another calls [`Emulator::transmit`].
pub struct Emulator<R, W> {
    scanner: Mutex<FrameScanner<R>>,
    writer: Mutex<W>,
    state: Mutex<DeviceState>,
    identity: DeviceIdentity,
}

impl<R: Read, W: Write> Emulator<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self::with_identity(reader, writer, DeviceIdentity::default())
    }

    pub fn with_identity(reader: R, writer: W, identity: DeviceIdentity) -> Self {
        Self {
            scanner: Mutex::new(FrameScanner::new(reader)),
            writer: Mutex::new(writer),
            state: Mutex::new(DeviceState::default()),
            identity,
        }
    }

    /// Serves requests until the host closes the link.
    ///
    /// # Errors
    ///
    /// Stops on the first invalid frame, undecodable configuration payload or
    /// transport failure.
    pub fn receive(&self) -> EmulatorResult<()> {
        loop {
            let token = self.scanner.lock().next_frame()?;
            let Some(token) = token else {
                info!("host closed the link");
                return Ok(());
            };
            let request = Frame::parse(token)?;
            let reply = self.handle(&request)?;
            self.write(&reply)?;
        }
    }

    fn handle(&self, request: &Frame) -> EmulatorResult<Frame> {
        let identifier = request.identifier();
        let payload = request.payload();
        debug!(mid = %identifier, len = payload.len(), "request");

        let reply = match identifier {
            MessageId::GOTO_CONFIG => {
                self.enter(Mode::Config, identifier);
                Frame::empty(MessageId::GOTO_CONFIG_ACK)
            }
            MessageId::GOTO_MEASUREMENT => {
                self.enter(Mode::Measurement, MessageId::MT_DATA2);
                Frame::empty(MessageId::MT_DATA2)
            }
            MessageId::SET_OUTPUT_CONFIGURATION if !payload.is_empty() => {
                let config = OutputConfiguration::decode(payload)?;
                let mut state = self.state.lock();
                state.output_configuration = config;
                state.last_identifier = Some(identifier);
                Frame::empty(MessageId::OUTPUT_CONFIGURATION_ACK)
            }
            MessageId::REQ_OUTPUT_CONFIGURATION => {
                let encoded = self.state.lock().output_configuration.encode();
                Frame::new(MessageId::OUTPUT_CONFIGURATION_ACK, &encoded)?
            }
            MessageId::SET_CAN_OUTPUT_CONFIG if !payload.is_empty() => {
                let config = CanOutputConfiguration::decode(payload)?;
                let mut state = self.state.lock();
                state.can_output_configuration = config;
                state.last_identifier = Some(identifier);
                Frame::empty(MessageId::CAN_OUTPUT_CONFIG_ACK)
            }
            MessageId::REQ_CAN_OUTPUT_CONFIG => {
                let encoded = self.state.lock().can_output_configuration.encode()?;
                Frame::new(MessageId::CAN_OUTPUT_CONFIG_ACK, &encoded)?
            }
            MessageId::SET_CAN_CONFIG if !payload.is_empty() => {
                let config = CanConfiguration::decode(payload)?;
                let mut state = self.state.lock();
                state.can_configuration = Some(config);
                state.last_identifier = Some(identifier);
                Frame::empty(MessageId::CAN_CONFIG_ACK)
            }
            MessageId::REQ_CAN_CONFIG => {
                let config = self.state.lock().can_configuration.unwrap_or(CanConfiguration {
                    enabled: false,
                    baud_rate: CanBaudRate::Kbps250,
                });
                Frame::new(MessageId::CAN_CONFIG_ACK, &config.encode())?
            }
            MessageId::REQ_DID => Frame::new(MessageId::DEVICE_ID, &self.identity.device_id.encode())?,
            MessageId::REQ_PRODUCT_CODE => Frame::new(
                MessageId::PRODUCT_CODE,
                self.identity.product_code.as_str().as_bytes(),
            )?,
            MessageId::REQ_HARDWARE_VERSION => Frame::new(
                MessageId::HARDWARE_VERSION,
                &self.identity.hardware_version.encode(),
            )?,
            _ => {
                warn!(mid = %identifier, "unsupported request");
                Frame::error(ErrorCode::InvalidMessage)
            }
        };
        Ok(reply)
    }

    fn enter(&self, mode: Mode, identifier: MessageId) {
        let mut state = self.state.lock();
        if state.mode != mode {
            info!(from = %state.mode, to = %mode, "device mode changed");
        }
        state.mode = mode;
        state.last_identifier = Some(identifier);
    }

    fn write(&self, frame: &Frame) -> EmulatorResult<()> {
        let mut writer = self.writer.lock();
        writer.write_all(frame.as_bytes())?;
        writer.flush()?;
        debug!(frame = %frame, "reply");
        Ok(())
    }

    /// Sends a device-originated frame. Only allowed while streaming.
    ///
    /// # Errors
    ///
    /// [`EmulatorError::NotInMeasurementMode`] outside measurement mode; the
    /// frame is also validated before it is written.
    pub fn transmit(&self, frame: &Frame) -> EmulatorResult<()> {
        if self.mode() != Mode::Measurement {
            return Err(EmulatorError::NotInMeasurementMode);
        }
        mtlink_protocol::validate(frame.as_bytes())?;
        self.write(frame)
    }

    /// Encodes `measurement` as one sub-packet using the identifier configured
    /// for `kind`. When the configuration lists a kind twice the last entry wins.
    ///
    /// # Errors
    ///
    /// [`EmulatorError::NotInOutputConfiguration`] when `kind` is not configured.
    pub fn marshal_message(
        &self,
        measurement: &Measurement,
        kind: DataKind,
    ) -> EmulatorResult<Vec<u8>> {
        let identifier = self
            .state
            .lock()
            .output_configuration
            .iter()
            .rev()
            .find(|setting| setting.identifier.kind == kind)
            .map(|setting| setting.identifier)
            .ok_or(EmulatorError::NotInOutputConfiguration(kind))?;
        Ok(measurement.encode_packet(identifier)?)
    }

    pub fn set_output_configuration(&self, config: OutputConfiguration) {
        self.state.lock().output_configuration = config;
    }

    pub fn output_configuration(&self) -> OutputConfiguration {
        self.state.lock().output_configuration.clone()
    }

    pub fn can_output_configuration(&self) -> CanOutputConfiguration {
        self.state.lock().can_output_configuration.clone()
    }

    pub fn can_configuration(&self) -> Option<CanConfiguration> {
        self.state.lock().can_configuration
    }

    /// Switches to streaming without a `GotoMeasurement` request.
    pub fn set_send_mode(&self) {
        self.enter(Mode::Measurement, MessageId::MT_DATA2);
    }

    pub fn mode(&self) -> Mode {
        self.state.lock().mode
    }

    /// Identifier of the last state-changing request, `MTData2` once streaming.
    pub fn last_identifier(&self) -> Option<MessageId> {
        self.state.lock().last_identifier
    }

    pub fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }
}

impl<R, W> fmt::Debug for Emulator<R, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emulator")
            .field("state", &*self.state.lock())
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}
