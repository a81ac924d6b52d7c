use chrono::Utc;
use netprobe::monitor::IfaceSample;
use netprobe::output::{MonitorReport, ScanReport, TraceReport};
use netprobe::scanner::{PortResult, PortState};
use netprobe::traceroute::Hop;

fn scan_fixture() -> ScanReport {
    ScanReport::new(vec![
        PortResult {
            port: 80,
            state: PortState::Open,
            latency_ms: Some(12),
        },
        PortResult {
            port: 81,
            state: PortState::Filtered,
            latency_ms: None,
        },
    ])
}

fn trace_fixture() -> TraceReport {
    TraceReport::new(vec![
        Hop {
            hop: 1,
            ip: "192.168.1.1".to_string(),
            host: "gateway.lan".to_string(),
            rtt_ms: Some(3),
            timed_out: false,
            icmp_type: 11,
        },
        Hop::unanswered(2),
    ])
}

fn monitor_fixture() -> MonitorReport {
    MonitorReport::new(vec![IfaceSample {
        iface: "eth0".to_string(),
        rx_bytes: 5000,
        tx_bytes: 7000,
        rx_bps: 1234.5,
        tx_bps: 678.9,
        rx_avg_bps: 1000.0,
        tx_avg_bps: 500.0,
        sampled_at: Utc::now(),
    }])
}

#[test]
fn test_scan_csv_schema() {
    // Missing latency leaves the trailing field empty
    assert_eq!(
        scan_fixture().to_csv(),
        "port,state,latency_ms\n80,open,12\n81,filtered,\n"
    );
}

#[test]
fn test_scan_json_schema() {
    let v = serde_json::to_value(scan_fixture()).unwrap();
    assert_eq!(v["type"], "scan");
    assert_eq!(v["results"][0]["port"], 80);
    assert_eq!(v["results"][0]["state"], "open");
    assert_eq!(v["results"][0]["latency_ms"], 12);
    assert!(v["results"][1]["latency_ms"].is_null());
}

#[test]
fn test_trace_csv_schema() {
    // A timed-out hop renders rtt as '-'
    assert_eq!(
        trace_fixture().to_csv(),
        "hop,ip,host,rtt_ms,timeout\n1,192.168.1.1,gateway.lan,3,false\n2,*,?,-,true\n"
    );
}

#[test]
fn test_trace_json_schema() {
    let v = serde_json::to_value(trace_fixture()).unwrap();
    assert_eq!(v["type"], "trace");
    assert_eq!(v["hops"][0]["hop"], 1);
    assert_eq!(v["hops"][0]["ip"], "192.168.1.1");
    assert_eq!(v["hops"][0]["rtt_ms"], 3);
    assert_eq!(v["hops"][0]["timeout"], false);
    assert!(v["hops"][1]["rtt_ms"].is_null());
    assert_eq!(v["hops"][1]["timeout"], true);

    // The raw ICMP type never leaks into reports
    assert!(v["hops"][0].get("icmp_type").is_none());
}

#[test]
fn test_monitor_csv_schema() {
    // Rates carry two decimals
    assert_eq!(
        monitor_fixture().to_csv(),
        "iface,rx_bytes,tx_bytes,rx_bps,tx_bps,rx_avg_bps,tx_avg_bps\n\
         eth0,5000,7000,1234.50,678.90,1000.00,500.00\n"
    );
}

#[test]
fn test_monitor_json_schema() {
    let v = serde_json::to_value(monitor_fixture()).unwrap();
    assert_eq!(v["type"], "monitor");
    assert_eq!(v["samples"][0]["iface"], "eth0");
    assert_eq!(v["samples"][0]["rx_bytes"], 5000);
    assert_eq!(v["samples"][0]["tx_bytes"], 7000);
    assert!(v["samples"][0].get("sampled_at").is_none());
}

#[test]
fn test_monitor_json_rates_round_to_two_decimals() {
    // JSON carries the same two-decimal rates as the CSV columns
    let report = MonitorReport::new(vec![IfaceSample {
        iface: "eth0".to_string(),
        rx_bytes: 1,
        tx_bytes: 2,
        rx_bps: 1234.5678,
        tx_bps: 0.005,
        rx_avg_bps: 999.999,
        tx_avg_bps: 500.0,
        sampled_at: Utc::now(),
    }]);
    let v = serde_json::to_value(report).unwrap();
    assert_eq!(v["samples"][0]["rx_bps"], 1234.57);
    assert_eq!(v["samples"][0]["tx_bps"], 0.01);
    assert_eq!(v["samples"][0]["rx_avg_bps"], 1000.0);
    assert_eq!(v["samples"][0]["tx_avg_bps"], 500.0);
}
