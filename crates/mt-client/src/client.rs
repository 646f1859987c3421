//! Request/acknowledge session with one device.

use std::fmt;
use std::time::{Duration, Instant};

use mtlink_protocol::{
    CanConfiguration, CanOutputConfiguration, DeviceId, Frame, FrameScanner, HardwareVersion,
    Measurements, MessageId, OutputConfiguration, ProductCode,
};
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::transport::Transport;

/// Device mode as last observed by the client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// Nothing confirmed yet, or the last exchange failed.
    #[default]
    Unknown,
    Config,
    Measurement,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Unknown => "unknown",
            SessionState::Config => "config",
            SessionState::Measurement => "measurement",
        };
        f.write_str(name)
    }
}

/// Blocking client over any [`Transport`].
///
/// Every operation writes one request and waits for its reply. Frames with
/// other identifiers that arrive in between, such as streamed `MTData2`, are
/// skipped. An `Error` frame ends the wait with [`ClientError::Device`].
pub struct Client<T: Transport> {
    scanner: FrameScanner<T>,
    state: SessionState,
    config: ClientConfig,
}

impl<T: Transport> Client<T> {
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, ClientConfig::default())
    }

    pub fn with_config(transport: T, config: ClientConfig) -> Self {
        Self {
            scanner: FrameScanner::new(transport),
            state: SessionState::Unknown,
            config,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn get_ref(&self) -> &T {
        self.scanner.get_ref()
    }

    pub fn into_inner(self) -> T {
        self.scanner.into_inner()
    }

    /// Writes one frame without waiting for a reply.
    pub fn send(&mut self, frame: &Frame) -> ClientResult<()> {
        let deadline = self.config.deadline();
        self.write_frame("send", frame, deadline)
    }

    /// Reads the next valid frame, whatever its identifier.
    pub fn receive(&mut self) -> ClientResult<Frame> {
        let deadline = self.config.deadline();
        self.read_frame("receive", deadline)
    }

    pub fn go_to_config(&mut self) -> ClientResult<()> {
        let request = Frame::empty(MessageId::GOTO_CONFIG);
        self.exchange("go to config", &request, MessageId::GOTO_CONFIG_ACK)?;
        self.transition(SessionState::Config);
        Ok(())
    }

    /// Starts streaming and returns the first `MTData2` frame.
    pub fn go_to_measurement(&mut self) -> ClientResult<Frame> {
        let request = Frame::empty(MessageId::GOTO_MEASUREMENT);
        let first = self.exchange("go to measurement", &request, MessageId::MT_DATA2)?;
        self.transition(SessionState::Measurement);
        Ok(first)
    }

    pub fn set_output_configuration(&mut self, config: &OutputConfiguration) -> ClientResult<()> {
        let request = Frame::new(MessageId::SET_OUTPUT_CONFIGURATION, &config.encode())?;
        self.exchange(
            "set output configuration",
            &request,
            MessageId::OUTPUT_CONFIGURATION_ACK,
        )?;
        Ok(())
    }

    pub fn get_output_configuration(&mut self) -> ClientResult<OutputConfiguration> {
        let request = Frame::empty(MessageId::REQ_OUTPUT_CONFIGURATION);
        let reply = self.exchange(
            "get output configuration",
            &request,
            MessageId::OUTPUT_CONFIGURATION_ACK,
        )?;
        Ok(OutputConfiguration::decode(reply.payload())?)
    }

    pub fn get_device_id(&mut self) -> ClientResult<DeviceId> {
        let request = Frame::empty(MessageId::REQ_DID);
        let reply = self.exchange("get device id", &request, MessageId::DEVICE_ID)?;
        Ok(DeviceId::decode(reply.payload())?)
    }

    pub fn get_product_code(&mut self) -> ClientResult<ProductCode> {
        let request = Frame::empty(MessageId::REQ_PRODUCT_CODE);
        let reply = self.exchange("get product code", &request, MessageId::PRODUCT_CODE)?;
        Ok(ProductCode::decode(reply.payload()))
    }

    pub fn get_hardware_version(&mut self) -> ClientResult<HardwareVersion> {
        let request = Frame::empty(MessageId::REQ_HARDWARE_VERSION);
        let reply = self.exchange(
            "get hardware version",
            &request,
            MessageId::HARDWARE_VERSION,
        )?;
        Ok(HardwareVersion::decode(reply.payload())?)
    }

    pub fn set_can_output_configuration(
        &mut self,
        config: &CanOutputConfiguration,
    ) -> ClientResult<()> {
        let request = Frame::new(MessageId::SET_CAN_OUTPUT_CONFIG, &config.encode()?)?;
        self.exchange(
            "set can output configuration",
            &request,
            MessageId::CAN_OUTPUT_CONFIG_ACK,
        )?;
        Ok(())
    }

    pub fn get_can_output_configuration(&mut self) -> ClientResult<CanOutputConfiguration> {
        let request = Frame::empty(MessageId::REQ_CAN_OUTPUT_CONFIG);
        let reply = self.exchange(
            "get can output configuration",
            &request,
            MessageId::CAN_OUTPUT_CONFIG_ACK,
        )?;
        Ok(CanOutputConfiguration::decode(reply.payload())?)
    }

    pub fn set_can_configuration(&mut self, config: &CanConfiguration) -> ClientResult<()> {
        let request = Frame::new(MessageId::SET_CAN_CONFIG, &config.encode())?;
        self.exchange(
            "set can configuration",
            &request,
            MessageId::CAN_CONFIG_ACK,
        )?;
        Ok(())
    }

    pub fn get_can_configuration(&mut self) -> ClientResult<CanConfiguration> {
        let request = Frame::empty(MessageId::REQ_CAN_CONFIG);
        let reply = self.exchange(
            "get can configuration",
            &request,
            MessageId::CAN_CONFIG_ACK,
        )?;
        Ok(CanConfiguration::decode(reply.payload())?)
    }

    fn exchange(
        &mut self,
        op: &'static str,
        request: &Frame,
        expected: MessageId,
    ) -> ClientResult<Frame> {
        let deadline = self.config.deadline();
        let result = self
            .write_frame(op, request, deadline)
            .and_then(|()| self.await_frame(op, expected, deadline));
        if let Err(e) = &result {
            warn!(op, error = %e, "exchange failed");
            self.transition(SessionState::Unknown);
        }
        result
    }

    fn await_frame(
        &mut self,
        op: &'static str,
        expected: MessageId,
        deadline: Option<Instant>,
    ) -> ClientResult<Frame> {
        loop {
            let frame = self.read_frame(op, deadline)?;
            if frame.identifier() == expected {
                return Ok(frame);
            }
            if let Some(code) = frame.error_code() {
                return Err(ClientError::Device { op, code });
            }
            debug!(op, %expected, received = %frame.identifier(), "ignoring frame");
        }
    }

    fn write_frame(
        &mut self,
        op: &'static str,
        frame: &Frame,
        deadline: Option<Instant>,
    ) -> ClientResult<()> {
        let timeout = remaining(op, deadline)?;
        let transport = self.scanner.get_mut();
        transport
            .set_write_timeout(timeout)
            .map_err(|e| ClientError::from_io(op, e))?;
        transport
            .write_all(frame.as_bytes())
            .and_then(|()| transport.flush())
            .map_err(|e| ClientError::from_io(op, e))?;
        debug!(op, frame = %frame, "sent");
        Ok(())
    }

    fn read_frame(&mut self, op: &'static str, deadline: Option<Instant>) -> ClientResult<Frame> {
        let timeout = remaining(op, deadline)?;
        self.scanner
            .get_mut()
            .set_read_timeout(timeout)
            .map_err(|e| ClientError::from_io(op, e))?;
        let token = self
            .scanner
            .next_frame()
            .map_err(|e| ClientError::from_io(op, e))?
            .ok_or(ClientError::EndOfStream { op })?;
        Ok(Frame::parse(token)?)
    }

    fn transition(&mut self, next: SessionState) {
        if self.state != next {
            info!(from = %self.state, to = %next, "session state changed");
            self.state = next;
        }
    }
}

/// Walks the measurements of an `MTData2` frame. Other frames yield nothing.
pub fn measurements(frame: &Frame) -> Measurements<'_> {
    if frame.identifier() == MessageId::MT_DATA2 {
        Measurements::new(frame.payload())
    } else {
        Measurements::new(&[])
    }
}

/// Time left before `deadline`, or `DeadlineExceeded` once it has passed.
fn remaining(op: &'static str, deadline: Option<Instant>) -> ClientResult<Option<Duration>> {
    let Some(deadline) = deadline else {
        return Ok(None);
    };
    match deadline.checked_duration_since(Instant::now()) {
        Some(left) if !left.is_zero() => Ok(Some(left)),
        _ => Err(ClientError::DeadlineExceeded { op }),
    }
}

impl<T: Transport> fmt::Debug for Client<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("state", &self.state)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mock::MockPort;
    use mtlink_protocol::{
        CanBaudRate, DataIdentifier, DataKind, ErrorCode, FrameError, OutputFrequency,
        OutputSetting,
    };

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    fn ack(identifier: MessageId, payload: &[u8]) -> Result<Frame, Box<dyn std::error::Error>> {
        Ok(Frame::new(identifier, payload)?)
    }

    fn sample_config() -> Result<OutputConfiguration, Box<dyn std::error::Error>> {
        Ok(OutputConfiguration::new(vec![
            OutputSetting::new(
                DataIdentifier::of(DataKind::PacketCounter),
                OutputFrequency::MAX,
            ),
            OutputSetting::new(
                DataIdentifier::of(DataKind::Quaternion),
                OutputFrequency::hz(100),
            ),
        ])?)
    }

    #[test]
    fn test_go_to_config_writes_request_and_tracks_state() -> TestResult {
        let port = MockPort::new();
        port.queue_read(ack(MessageId::GOTO_CONFIG_ACK, &[])?.as_bytes());
        let mut client = Client::new(port.clone());
        assert_eq!(client.state(), SessionState::Unknown);

        client.go_to_config()?;

        assert_eq!(client.state(), SessionState::Config);
        assert_eq!(
            port.get_write_history(),
            vec![vec![0xFA, 0xFF, 0x30, 0x00, 0xD1]]
        );
        Ok(())
    }

    #[test]
    fn test_streamed_frames_are_skipped_while_waiting() -> TestResult {
        let port = MockPort::new();
        port.queue_read(ack(MessageId::MT_DATA2, &[0x10, 0x20, 0x02, 0x00, 0x01])?.as_bytes());
        port.queue_read(&[0x00, 0x13, 0x37]);
        port.queue_read(ack(MessageId::GOTO_CONFIG_ACK, &[])?.as_bytes());
        let mut client = Client::new(port);

        client.go_to_config()?;
        assert_eq!(client.state(), SessionState::Config);
        Ok(())
    }

    #[test]
    fn test_device_error_aborts_wait() -> TestResult {
        let port = MockPort::new();
        port.queue_read(Frame::error(ErrorCode::InvalidMessage).as_bytes());
        let mut client = Client::new(port);

        let err = client
            .set_output_configuration(&sample_config()?)
            .err()
            .ok_or("expected a device error")?;
        assert_eq!(err.device_code(), Some(ErrorCode::InvalidMessage));
        assert_eq!(client.state(), SessionState::Unknown);
        Ok(())
    }

    #[test]
    fn test_set_output_configuration_payload() -> TestResult {
        let port = MockPort::new();
        port.queue_read(ack(MessageId::OUTPUT_CONFIGURATION_ACK, &[])?.as_bytes());
        let mut client = Client::new(port.clone());

        let config = sample_config()?;
        client.set_output_configuration(&config)?;

        let expected = Frame::new(MessageId::SET_OUTPUT_CONFIGURATION, &config.encode())?;
        assert_eq!(port.get_write_history(), vec![expected.into_bytes()]);
        Ok(())
    }

    #[test]
    fn test_get_output_configuration_decodes_reply() -> TestResult {
        let config = sample_config()?;
        let port = MockPort::new();
        port.queue_read(ack(MessageId::OUTPUT_CONFIGURATION_ACK, &config.encode())?.as_bytes());
        let mut client = Client::new(port.clone());

        assert_eq!(client.get_output_configuration()?, config);
        assert_eq!(
            port.get_write_history(),
            vec![vec![0xFA, 0xFF, 0xC0, 0x00, 0x41]]
        );
        Ok(())
    }

    #[test]
    fn test_go_to_measurement_returns_first_data_frame() -> TestResult {
        let data = ack(MessageId::MT_DATA2, &[0x10, 0x20, 0x02, 0xAB, 0xCD])?;
        let port = MockPort::new();
        port.queue_read(ack(MessageId::GOTO_MEASUREMENT_ACK, &[])?.as_bytes());
        port.queue_read(data.as_bytes());
        let mut client = Client::new(port);

        let first = client.go_to_measurement()?;
        assert_eq!(first, data);
        assert_eq!(client.state(), SessionState::Measurement);

        let samples: Vec<_> = measurements(&first).collect();
        assert_eq!(samples.len(), 1);
        Ok(())
    }

    #[test]
    fn test_measurements_of_other_frames_are_empty() {
        let frame = Frame::empty(MessageId::GOTO_CONFIG_ACK);
        assert_eq!(measurements(&frame).count(), 0);
    }

    #[test]
    fn test_device_identity_queries() -> TestResult {
        let port = MockPort::new();
        port.queue_read(ack(MessageId::DEVICE_ID, &[0x03, 0x70, 0x03, 0xF8])?.as_bytes());
        port.queue_read(ack(MessageId::PRODUCT_CODE, b"MTi-630 ")?.as_bytes());
        port.queue_read(ack(MessageId::HARDWARE_VERSION, &[2, 0])?.as_bytes());
        let mut client = Client::new(port);

        assert_eq!(client.get_device_id()?, DeviceId(0x0370_03F8));
        assert_eq!(client.get_product_code()?.as_str(), "MTi-630");
        assert_eq!(
            client.get_hardware_version()?,
            HardwareVersion { major: 2, minor: 0 }
        );
        Ok(())
    }

    #[test]
    fn test_can_configuration_round_trip_through_device() -> TestResult {
        let config = CanConfiguration {
            enabled: true,
            baud_rate: CanBaudRate::Kbps500,
        };
        let port = MockPort::new();
        port.queue_read(ack(MessageId::CAN_CONFIG_ACK, &[])?.as_bytes());
        port.queue_read(ack(MessageId::CAN_CONFIG_ACK, &config.encode())?.as_bytes());
        let mut client = Client::new(port.clone());

        client.set_can_configuration(&config)?;
        assert_eq!(client.get_can_configuration()?, config);

        let history = port.get_write_history();
        assert_eq!(
            history.first().map(Vec::as_slice),
            Some(&[0xFA, 0xFF, 0xE6, 0x04, 0x00, 0x00, 0x01, 0x0A, 0x0C][..])
        );
        Ok(())
    }

    #[test]
    fn test_end_of_stream_while_waiting() {
        let mut client = Client::new(MockPort::new());
        let err = client.go_to_config().err();
        assert!(matches!(
            err,
            Some(ClientError::EndOfStream { op: "go to config" })
        ));
        assert_eq!(client.state(), SessionState::Unknown);
    }

    #[test]
    fn test_stalled_transport_reports_deadline() {
        let port = MockPort::new();
        port.stall();
        let config = ClientConfig::new().with_timeout(Duration::from_millis(200));
        let mut client = Client::with_config(port.clone(), config);

        let err = client.go_to_config().err();
        assert!(matches!(err, Some(ClientError::DeadlineExceeded { .. })));
        let timeouts = port.read_timeouts();
        assert_eq!(timeouts.len(), 1);
        assert!(
            timeouts
                .first()
                .copied()
                .flatten()
                .is_some_and(|t| t <= Duration::from_millis(200))
        );
    }

    #[test]
    fn test_corrupt_reply_is_frame_error() {
        let port = MockPort::new();
        port.queue_read(&[0xFA, 0xFF, 0x31, 0x00, 0x00]);
        let mut client = Client::new(port);

        let err = client.go_to_config().err();
        assert!(matches!(
            err,
            Some(ClientError::Frame(FrameError::ChecksumMismatch { .. }))
        ));
    }

    #[test]
    fn test_transport_failure_keeps_source() {
        let port = MockPort::new();
        port.disconnect();
        let mut client = Client::new(port);

        let err = client.go_to_config().err();
        assert!(matches!(
            err,
            Some(ClientError::Transport {
                op: "go to config",
                ..
            })
        ));
    }

    #[test]
    fn test_receive_does_not_change_state() -> TestResult {
        let port = MockPort::new();
        port.queue_read(Frame::error(ErrorCode::InvalidPeriod).as_bytes());
        let mut client = Client::new(port);

        let frame = client.receive()?;
        assert!(frame.is_error());
        assert_eq!(client.state(), SessionState::Unknown);
        Ok(())
    }

    #[test]
    fn test_remaining_budget() {
        assert!(matches!(remaining("op", None), Ok(None)));
        let past = Instant::now();
        assert!(matches!(
            remaining("op", Some(past)),
            Err(ClientError::DeadlineExceeded { op: "op" })
        ));
        let future = Instant::now() + Duration::from_secs(5);
        assert!(matches!(remaining("op", Some(future)), Ok(Some(_))));
    }
}
