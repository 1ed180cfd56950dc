mod common;

use ddc_monitor::scan::{probe, scan, scan_all, scan_with};
use ddc_monitor::{ErrorCode, ErrorKind, Fault, VcpQueryResult, VcpValue};
use common::{handle, MockHost, Reply};

#[test]
fn reports_only_supported_codes_in_order() {
    let host = MockHost::supporting(&[(0xd6, 1, 5), (0x12, 70, 100), (0x10, 50, 100)]);
    let probe = host.probe();
    let report = scan(&mut handle(host)).unwrap();

    assert_eq!(report.codes(), vec![0x10, 0x12, 0xd6]);
    assert_eq!(report.get(0x12), Some(VcpValue::new(70, 100)));
    assert_eq!(report.get(0x14), None);
    assert!(report.is_complete());
    assert_eq!(probe.gets(), 256);

    let order = probe.get_order.lock().unwrap().clone();
    assert_eq!(order, (0..=0xffu8).collect::<Vec<_>>());
}

#[test]
fn per_code_failures_never_abort() {
    let mut host = MockHost::supporting(&[(0x10, 50, 100)]);
    for code in 0x20..0x40 {
        host.replies.insert(code, Reply::Fault(Fault::NoReply("NAK".into())));
    }
    for code in 0x40..0x60 {
        host.replies.insert(code, Reply::Fault(Fault::Reply(ErrorCode::InvalidChecksum)));
    }
    host.replies.insert(0xff, Reply::Fault(Fault::Reply(ErrorCode::NullMessage)));

    let report = scan(&mut handle(host)).unwrap();
    assert_eq!(report.codes(), vec![0x10]);
}

#[test]
fn device_loss_aborts() {
    let mut host = MockHost::supporting(&[(0x10, 50, 100), (0x90, 1, 2)]);
    host.unplug_at = Some(0x80);
    let probe = host.probe();

    let e = scan(&mut handle(host)).unwrap_err();
    assert_eq!(e.kind(), ErrorKind::DeviceLost);
    assert_eq!(probe.gets(), 0x81);
}

#[test]
fn scan_can_be_stopped_between_codes() {
    let host = MockHost::supporting(&[(0x10, 50, 100), (0x12, 70, 100)]);
    let probe = host.probe();
    let report = scan_with(&mut handle(host), |code| code <= 0x10).unwrap();

    assert_eq!(report.codes(), vec![0x10]);
    assert!(!report.is_complete());
    assert_eq!(probe.gets(), 0x11);
}

#[test]
fn probe_separates_outcomes() {
    let host = MockHost::supporting(&[(0x10, 50, 100)])
        .reply(0x12, Reply::Fault(Fault::NoReply("EIO".into())))
        .reply(0x14, Reply::Fault(Fault::Reply(ErrorCode::InvalidLength)));
    let mut monitor = handle(host);

    assert_eq!(probe(&mut monitor, 0x10).unwrap(), VcpQueryResult::Supported(VcpValue::new(50, 100)));
    assert_eq!(probe(&mut monitor, 0x16).unwrap(), VcpQueryResult::Unsupported);
    assert!(matches!(probe(&mut monitor, 0x12).unwrap(), VcpQueryResult::Timeout(..)));
    assert!(matches!(probe(&mut monitor, 0x14).unwrap(), VcpQueryResult::ProtocolError(..)));

    monitor.release().unwrap();
    assert_eq!(probe(&mut monitor, 0x10).unwrap_err().kind(), ErrorKind::UseAfterRelease);
}

#[test]
fn monitors_scan_independently() {
    let mut lost = MockHost::supporting(&[(0x10, 1, 2)]);
    lost.unplug_at = Some(0x00);
    let mut monitors = vec![
        handle(MockHost::supporting(&[(0x10, 50, 100)])),
        handle(lost),
        handle(MockHost::supporting(&[(0x12, 70, 100), (0x60, 15, 18)])),
    ];

    let results = scan_all(&mut monitors);
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].as_ref().unwrap().codes(), vec![0x10]);
    assert_eq!(results[1].as_ref().unwrap_err().kind(), ErrorKind::DeviceLost);
    assert_eq!(results[2].as_ref().unwrap().codes(), vec![0x12, 0x60]);
}
