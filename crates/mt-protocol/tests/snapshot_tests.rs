//! Snapshot tests for wire bytes and text renderings.

use insta::assert_snapshot;
use mtlink_protocol as mt;
use mt::{
    CanConfiguration, CanBaudRate, CanDataId, CanOutputConfiguration, CanOutputSetting,
    CoordinateSystem, DataIdentifier, DataKind, ErrorCode, Frame, Measurement, MessageId,
    OutputConfiguration, OutputFrequency, OutputSetting, Precision,
};

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn output_config() -> Result<OutputConfiguration, mt::EncodeError> {
    OutputConfiguration::new(vec![
        OutputSetting::new(
            DataIdentifier::of(DataKind::PacketCounter),
            OutputFrequency::MAX,
        ),
        OutputSetting::new(
            DataIdentifier::new(
                DataKind::EulerAngles,
                CoordinateSystem::NorthEastDown,
                Precision::Float32,
            ),
            OutputFrequency::hz(100),
        ),
        OutputSetting::new(
            DataIdentifier::new(
                DataKind::Acceleration,
                CoordinateSystem::EastNorthUp,
                Precision::Fp1632,
            ),
            OutputFrequency(0),
        ),
    ])
}

#[test]
fn test_snapshot_goto_config() {
    assert_snapshot!(format!("{:?}", Frame::empty(MessageId::GOTO_CONFIG)), @"Frame(faff3000d1)");
}

#[test]
fn test_snapshot_goto_measurement() {
    assert_snapshot!(format!("{:?}", Frame::empty(MessageId::GOTO_MEASUREMENT)), @"Frame(faff1000f1)");
}

#[test]
fn test_snapshot_req_output_configuration() {
    assert_snapshot!(
        format!("{:?}", Frame::empty(MessageId::REQ_OUTPUT_CONFIGURATION)),
        @"Frame(faffc00041)"
    );
}

#[test]
fn test_snapshot_error_frame() {
    let frame = Frame::error(ErrorCode::InvalidMessage);
    assert_snapshot!(format!("{frame:?} {frame}"), @"Frame(faff420104ba) Error(InvalidMessage)");
}

#[test]
fn test_snapshot_set_output_configuration() -> TestResult {
    let config = output_config()?;
    let frame = Frame::new(MessageId::SET_OUTPUT_CONFIGURATION, &config.encode())?;
    assert_snapshot!(format!("{frame:?}"), @"Frame(faffc00c1020ffff2034006440220000ed)");
    Ok(())
}

#[test]
fn test_snapshot_output_configuration_text() -> TestResult {
    assert_snapshot!(output_config()?.to_string(), @r"
    PacketCounter: Max
    EulerAngles(NorthEastDown,Float32): 100 Hz
    Acceleration(Fp1632): Max
    ");
    Ok(())
}

#[test]
fn test_snapshot_mtdata2_display() -> TestResult {
    let payload = Measurement::PacketCounter(0xABCD).encode_packet(DataIdentifier::of(DataKind::PacketCounter))?;
    let frame = Frame::new(MessageId::MT_DATA2, &payload)?;
    assert_snapshot!(format!("{frame} {frame:?}"), @"MTData2(102002abcd) Frame(faff3605102002abcd1c)");
    Ok(())
}

#[test]
fn test_snapshot_can_output_configuration() -> TestResult {
    let config = CanOutputConfiguration::new(vec![CanOutputSetting {
        data_id: CanDataId::EULER_ANGLES,
        extended_id: true,
        id_mask: 0x1234_5678,
        frequency: 100,
    }]);
    let frame = Frame::new(MessageId::SET_CAN_OUTPUT_CONFIG, &config.encode()?)?;
    assert_snapshot!(format!("{frame:?}"), @"Frame(faffe808220112345678006476)");
    assert_snapshot!(config.to_string(), @"EulerAngles: 100 Hz, 29 bit ids, mask 0x12345678");
    Ok(())
}

#[test]
fn test_snapshot_can_configuration() -> TestResult {
    let config = CanConfiguration {
        enabled: true,
        baud_rate: CanBaudRate::Kbps500,
    };
    let frame = Frame::new(MessageId::SET_CAN_CONFIG, &config.encode())?;
    assert_snapshot!(format!("{frame:?}"), @"Frame(faffe6040000010a0c)");
    assert_snapshot!(config.to_string(), @"Enabled: true, BaudRate: 500000 bps");
    Ok(())
}

#[test]
fn test_snapshot_device_id_reply() -> TestResult {
    let frame = Frame::new(MessageId::DEVICE_ID, &mt::DeviceId(0x0370_03F8).encode())?;
    assert_snapshot!(format!("{frame:?}"), @"Frame(faff0104037003f88e)");
    Ok(())
}

#[test]
fn test_snapshot_identifier_display() {
    let rendered: Vec<String> = [0x201B_u16, 0x4022, 0x1020, 0xE020, 0x8843]
        .into_iter()
        .map(|raw| DataIdentifier::from_u16(raw).to_string())
        .collect();
    assert_snapshot!(rendered.join("\n"), @r"
    Quaternion(NorthWestUp,Float64)
    Acceleration(Fp1632)
    PacketCounter
    StatusWord
    Unknown(0x8840)
    ");
}

#[test]
fn test_snapshot_measurement_display() -> TestResult {
    let payload = [
        0x10, 0x10, 0x0C, 0x29, 0xFA, 0xC3, 0xE0, 0x07, 0xE2, 0x08, 0x09, 0x0D, 0x3B, 0x04, 0xF7,
        0x20, 0x33, 0x18, 0x3F, 0xB6, 0x81, 0x2E, 0x60, 0x00, 0x00, 0x00, 0x40, 0x15, 0x3A, 0x60,
        0x80, 0x00, 0x00, 0x00, 0xC0, 0x06, 0x41, 0x85, 0xA0, 0x00, 0x00, 0x00, 0x50, 0x43, 0x10,
        0x40, 0x45, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x40, 0x2A, 0xBD, 0x70, 0xA3, 0xD7, 0x0A,
        0x3D, 0xE0, 0x20, 0x04, 0x01, 0x80, 0x00, 0x47,
    ];
    let lines = mt::Measurements::new(&payload)
        .map(|sample| sample.map(|s| s.measurement.to_string()))
        .collect::<Result<Vec<_>, _>>()?;
    assert_snapshot!(lines.join("\n"), @r"
    UtcTime: 2018-08-09T13:59:04.7043Z
    EulerAngles: (0.08790864795446396, 5.307008743286133, -2.7819931507110596)
    LatLon: (42, 13.37)
    StatusWord: 00000001100000000000000001000111
    ");
    Ok(())
}
