//! End-to-end tests for the acquisition lifecycle using a mock transport.

use std::time::Duration;

use tokio::sync::mpsc;
use ut32x_driver::protocol::{Channel, Command, MeasurementRecord, Unit, PACKET_SIZE};
use ut32x_driver::{
    pump_completions, AcquisitionConfig, ChannelFeed, Device, DeviceStatus, DriverError,
    FeedEvent, TransferAction, TransportError, UsbTransport,
};

#[derive(Debug, Default)]
struct MockTransport {
    submits: usize,
    releases: usize,
    writes: Vec<Vec<u8>>,
    fail_submit_after: Option<usize>,
    fail_writes_after: Option<usize>,
}

impl UsbTransport for MockTransport {
    fn submit_transfer(&mut self) -> Result<(), TransportError> {
        if self.fail_submit_after.is_some_and(|n| self.submits >= n) {
            return Err(TransportError::Disconnected);
        }
        self.submits += 1;
        Ok(())
    }

    fn release_transfer(&mut self) {
        self.releases += 1;
    }

    fn write_out(&mut self, data: &[u8], _timeout: Duration) -> Result<usize, TransportError> {
        if self.fail_writes_after.is_some_and(|n| self.writes.len() >= n) {
            return Err(TransportError::Timeout);
        }
        self.writes.push(data.to_vec());
        Ok(data.len())
    }
}

fn build_packet(temp: &[u8; 4], unit: u8, channel: u8) -> [u8; PACKET_SIZE] {
    let mut pkt = [b' '; PACKET_SIZE];
    pkt[0] = 0x02;
    pkt[1..5].copy_from_slice(temp);
    pkt[5] = unit;
    pkt[8] = b'0';
    pkt[13] = channel;
    pkt[16] = b'1';
    pkt[17..].copy_from_slice(b"\r\n");
    pkt
}

/// Encode a byte stream as CH9325 reports of up to 7 payload bytes
fn to_reports(bytes: &[u8]) -> Vec<Vec<u8>> {
    bytes
        .chunks(7)
        .map(|piece| {
            let mut report = vec![0u8; 8];
            report[0] = 0xF0 | piece.len() as u8;
            report[1..=piece.len()].copy_from_slice(piece);
            report
        })
        .collect()
}

fn started(config: AcquisitionConfig) -> Device<MockTransport, Vec<MeasurementRecord>> {
    let mut device = Device::new(
        config,
        MockTransport::default(),
        Vec::<MeasurementRecord>::new(),
    );
    device.start().unwrap();
    device
}

#[test]
fn test_start_sends_live_command() {
    let device = started(AcquisitionConfig::default());
    assert_eq!(device.status(), DeviceStatus::Acquiring);
    assert_eq!(
        device.transport().writes,
        vec![Command::GetLive.to_bytes().to_vec()]
    );
    assert_eq!(device.transport().submits, 1);
}

#[test]
fn test_start_memory_source() {
    let config = AcquisitionConfig::from_json(r#"{"data_source": "memory"}"#).unwrap();
    let device = started(config);
    assert_eq!(device.transport().writes, vec![vec![0x01, 0x07]]);
}

#[test]
fn test_start_twice_is_busy() {
    let mut device = started(AcquisitionConfig::default());
    assert!(matches!(device.start(), Err(DriverError::Busy)));
}

#[test]
fn test_start_command_failure() {
    let transport = MockTransport {
        fail_writes_after: Some(0),
        ..Default::default()
    };
    let mut device = Device::new(
        AcquisitionConfig::default(),
        transport,
        Vec::<MeasurementRecord>::new(),
    );
    assert!(matches!(
        device.start(),
        Err(DriverError::Transport(TransportError::Timeout))
    ));
    assert_eq!(device.status(), DeviceStatus::Idle);
    assert_eq!(device.transport().submits, 0);
}

#[test]
fn test_packet_decoded_from_reports() {
    let mut device = started(AcquisitionConfig::default());

    for report in to_reports(&build_packet(b"0256", b'1', b'0')) {
        assert_eq!(
            device.on_transfer_complete(&report),
            TransferAction::Resubmitted
        );
    }

    let record = device.feed()[0];
    assert_eq!(record.temperature.value(), 25.6);
    assert_eq!(record.unit, Unit::Celsius);
    assert_eq!(record.channel, Channel::T1);
    assert_eq!(device.counters().frames, 1);
    assert_eq!(device.limits().samples_read(), 1);
    assert_eq!(device.transport().submits, 4);
}

#[test]
fn test_short_transfer_ignored_but_rearmed() {
    let mut device = started(AcquisitionConfig::default());

    assert_eq!(
        device.on_transfer_complete(&[0xF2, b'\r', b'\n']),
        TransferAction::Resubmitted
    );
    assert_eq!(device.counters().frames, 0);
    assert_eq!(device.transport().submits, 2);
}

#[test]
fn test_limit_counts_empty_memory_slots() {
    let config = AcquisitionConfig {
        limit_samples: Some(2),
        ..Default::default()
    };
    let (feed, mut rx) = ChannelFeed::new();
    let mut device = Device::new(config, MockTransport::default(), feed);
    device.start().unwrap();

    // Reports never straddle packets
    let mut reports = to_reports(&build_packet(b";;;;", b'1', b'0'));
    reports.extend(to_reports(&build_packet(b"0010", b'1', b'1')));
    let mut actions = Vec::new();
    for report in reports {
        actions.push(device.on_transfer_complete(&report));
    }

    assert_eq!(actions.last(), Some(&TransferAction::Released));
    assert_eq!(device.status(), DeviceStatus::Stopping);
    assert_eq!(device.transport().releases, 1);

    assert!(device.handle_events());
    assert_eq!(device.status(), DeviceStatus::Idle);
    assert_eq!(
        device.transport().writes.last(),
        Some(&Command::Stop.to_bytes().to_vec())
    );

    match rx.try_recv().unwrap() {
        FeedEvent::Measurement(record) => assert_eq!(record.channel, Channel::T2),
        other => panic!("unexpected event {:?}", other),
    }
    assert_eq!(rx.try_recv().unwrap(), FeedEvent::End);
}

#[test]
fn test_resubmit_failure_stops() {
    let transport = MockTransport {
        fail_submit_after: Some(1),
        ..Default::default()
    };
    let mut device = Device::new(
        AcquisitionConfig::default(),
        transport,
        Vec::<MeasurementRecord>::new(),
    );
    device.start().unwrap();

    let report = [0xF1, b'x', 0, 0, 0, 0, 0, 0];
    assert_eq!(device.on_transfer_complete(&report), TransferAction::Released);
    assert_eq!(device.status(), DeviceStatus::Stopping);
    assert_eq!(device.transport().releases, 1);
    assert!(device.handle_events());
    assert!(!device.handle_events());
}

#[test]
fn test_abort_after_release_does_not_release_again() {
    let config = AcquisitionConfig {
        limit_samples: Some(1),
        ..Default::default()
    };
    let mut device = started(config);

    let mut last = None;
    for report in to_reports(&build_packet(b"0256", b'1', b'0')) {
        last = Some(device.on_transfer_complete(&report));
    }
    assert_eq!(last, Some(TransferAction::Released));
    assert!(!device.transfer_armed());
    assert_eq!(device.transport().releases, 1);

    device.abort();
    assert_eq!(device.transport().releases, 1);
    assert_eq!(device.status(), DeviceStatus::Idle);
}

#[test]
fn test_abort_releases_armed_transfer() {
    let mut device = started(AcquisitionConfig::default());
    assert!(device.transfer_armed());

    device.request_stop();
    device.abort();
    assert!(!device.transfer_armed());
    assert_eq!(device.transport().releases, 1);
    assert_eq!(device.status(), DeviceStatus::Idle);
}

#[test]
fn test_stop_command_failure_is_not_fatal() {
    let transport = MockTransport {
        fail_writes_after: Some(1),
        ..Default::default()
    };
    let mut device = Device::new(
        AcquisitionConfig::default(),
        transport,
        Vec::<MeasurementRecord>::new(),
    );
    device.start().unwrap();
    device.request_stop();

    assert!(device.handle_events());
    assert_eq!(device.status(), DeviceStatus::Idle);
    assert_eq!(device.transport().writes.len(), 1);
}

#[test]
fn test_requested_stop_finishes_current_report() {
    let mut device = started(AcquisitionConfig::default());
    let reports = to_reports(&build_packet(b";075", b'3', b'3'));

    device.on_transfer_complete(&reports[0]);
    device.on_transfer_complete(&reports[1]);
    device.request_stop();
    assert_eq!(
        device.on_transfer_complete(&reports[2]),
        TransferAction::Released
    );

    let record = device.feed()[0];
    assert_eq!(record.temperature.value(), -7.5);
    assert_eq!(record.unit, Unit::Kelvin);
    assert!(record.relative);
}

#[tokio::test]
async fn test_pump_until_limit() {
    let config = AcquisitionConfig {
        limit_samples: Some(1),
        ..Default::default()
    };
    let mut device = Device::new(
        config,
        MockTransport::default(),
        Vec::<MeasurementRecord>::new(),
    );
    device.start().unwrap();

    let (tx, rx) = mpsc::channel(16);
    let mut reports = to_reports(&build_packet(b"0256", b'1', b'0'));
    reports.extend(to_reports(&build_packet(b"0257", b'1', b'0')));
    for report in reports {
        tx.send(report).await.unwrap();
    }

    let counters = pump_completions(&mut device, rx).await;
    assert_eq!(counters.frames, 1);
    assert_eq!(device.feed().len(), 1);
    assert_eq!(device.status(), DeviceStatus::Idle);
    assert_eq!(device.transport().releases, 1);
}

#[tokio::test]
async fn test_pump_aborts_when_sender_closes() {
    let mut device = started(AcquisitionConfig::default());

    let (tx, rx) = mpsc::channel(4);
    tx.send(vec![0xF3, b'a', b'b', b'c', 0, 0, 0, 0]).await.unwrap();
    drop(tx);

    let counters = pump_completions(&mut device, rx).await;
    assert_eq!(counters.frames, 0);
    assert_eq!(device.status(), DeviceStatus::Idle);
    assert_eq!(device.transport().releases, 1);
    assert_eq!(device.transport().writes.last(), Some(&vec![0x01, 0x02]));
}
