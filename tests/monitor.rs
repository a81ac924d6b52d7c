use netprobe::monitor::{
    detect_default_iface, parse_counters, Monitor, MonitorConfig, RollingWindow,
};
use netprobe::NetprobeError;
use std::time::Duration;
use tokio_test::block_on;
use tokio_util::sync::CancellationToken;

const FIXTURE: &str = "\
Inter-|   Receive                                                |  Transmit
 face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed
    lo: 1713716    16    0    0    0     0          0         0  1713716    16    0    0    0     0       0          0
  eth0: 5000 50 0 0 0 0 0 0 7000 70 0 0 0 0 0 0
";

#[test]
fn test_parses_interface_counters() {
    let eth0 = parse_counters(FIXTURE, "eth0").unwrap();
    assert_eq!(eth0.rx_bytes, 5000);
    assert_eq!(eth0.tx_bytes, 7000);

    let lo = parse_counters(FIXTURE, "lo").unwrap();
    assert_eq!(lo.rx_bytes, 1713716);
    assert_eq!(lo.tx_bytes, 1713716);
}

#[test]
fn test_missing_interface_errors() {
    let err = parse_counters(FIXTURE, "nope0").unwrap_err();
    assert!(matches!(err, NetprobeError::Os(_)));
}

#[test]
fn test_malformed_line_errors() {
    let fixture = "h1\nh2\n  eth0: 5000 50 0\n";
    assert!(parse_counters(fixture, "eth0").is_err());
}

#[test]
fn test_detects_first_non_loopback() {
    assert_eq!(detect_default_iface(FIXTURE), Some("eth0".to_string()));

    let lo_only = "\
Inter-|   Receive                                                |  Transmit
 face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed
    lo: 1 1 0 0 0 0 0 0 1 1 0 0 0 0 0 0
";
    assert_eq!(detect_default_iface(lo_only), None);
}

#[test]
fn test_rolling_window_mean() {
    let mut window = RollingWindow::new(3);
    assert_eq!(window.mean(), 0.0);

    window.push(2.0);
    assert_eq!(window.mean(), 2.0);

    window.push(4.0);
    window.push(6.0);
    assert_eq!(window.mean(), 4.0);

    // A fourth push evicts the oldest value
    window.push(8.0);
    assert_eq!(window.mean(), 6.0);
}

#[test]
fn test_zero_interval_rejected() {
    let config = MonitorConfig {
        iface: Some("lo".to_string()),
        interval: Duration::ZERO,
        samples: 1,
    };
    let err = block_on(Monitor::new(config).run(CancellationToken::new())).unwrap_err();
    assert!(matches!(err, NetprobeError::InvalidRange(_)));
}

#[test]
fn test_loopback_monitor_collects_samples() {
    if std::fs::read_to_string("/proc/net/dev").is_err() {
        eprintln!("skipping: /proc/net/dev not readable");
        return;
    }

    let config = MonitorConfig {
        iface: Some("lo".to_string()),
        interval: Duration::from_millis(10),
        samples: 3,
    };
    let samples = block_on(Monitor::new(config).run(CancellationToken::new())).unwrap();

    assert_eq!(samples.len(), 3);
    for sample in &samples {
        assert_eq!(sample.iface, "lo");
        assert!(sample.rx_bps >= 0.0);
        assert!(sample.tx_bps >= 0.0);
        assert!(sample.rx_avg_bps >= 0.0);
        assert!(sample.tx_avg_bps >= 0.0);
    }
}

#[test]
fn test_cancellation_returns_partial_series() {
    if std::fs::read_to_string("/proc/net/dev").is_err() {
        eprintln!("skipping: /proc/net/dev not readable");
        return;
    }

    let config = MonitorConfig {
        iface: Some("lo".to_string()),
        interval: Duration::from_millis(50),
        samples: 100,
    };
    let cancel = CancellationToken::new();
    cancel.cancel();

    let samples = block_on(Monitor::new(config).run(cancel)).unwrap();
    assert!(samples.is_empty());
}
