use clap::Parser;
use netprobe::cli::{parse_range, Cli, Command};
use netprobe::net::Target;
use netprobe::output::OutputFormat;
use std::time::Duration;

#[test]
fn test_scan_defaults() {
    // Scan with nothing but a target picks up the stock range and timeout
    let args = vec!["netprobe", "scan", "--target", "192.168.1.1"];
    let cli = Cli::parse_from(args);

    match &cli.command {
        Command::Scan {
            target,
            ports,
            timeout,
        } => {
            assert_eq!(target, "192.168.1.1");
            assert_eq!(ports, "1-1024");
            assert_eq!(*timeout, 1000);
        }
        other => panic!("expected scan subcommand, got {:?}", other),
    }
    assert!(!cli.json);
    assert!(!cli.csv);
    assert_eq!(cli.output, None);

    let config = cli.to_scan_config().unwrap();
    assert_eq!(config.target, Target::parse("192.168.1.1").unwrap());
    assert_eq!(config.ports_from, 1);
    assert_eq!(config.ports_to, 1024);
    assert_eq!(config.timeout, Duration::from_millis(1000));
}

#[test]
fn test_trace_defaults() {
    let args = vec!["netprobe", "trace", "--target", "8.8.8.8"];
    let cli = Cli::parse_from(args);

    let config = cli.to_trace_config().unwrap();
    assert_eq!(config.ttl_start, 1);
    assert_eq!(config.ttl_max, 30);
    assert_eq!(config.timeout, Duration::from_millis(1000));
    assert!(config.resolve_hostnames);
}

#[test]
fn test_trace_no_rdns() {
    let args = vec!["netprobe", "trace", "--target", "8.8.8.8", "--no-rdns"];
    let cli = Cli::parse_from(args);

    let config = cli.to_trace_config().unwrap();
    assert!(!config.resolve_hostnames);
}

#[test]
fn test_monitor_defaults() {
    let args = vec!["netprobe", "monitor"];
    let cli = Cli::parse_from(args);

    let config = cli.to_monitor_config().unwrap();
    assert_eq!(config.iface, None);
    assert_eq!(config.interval, Duration::from_millis(100));
    assert_eq!(config.samples, 10);
}

#[test]
fn test_range_parsing() {
    assert_eq!(parse_range("80-443").unwrap(), (80, 443));
    assert_eq!(parse_range("1-1").unwrap(), (1, 1));
    assert_eq!(parse_range(" 5 - 9 ").unwrap(), (5, 9));

    // No separator, junk on either side, or an inverted range all fail
    assert!(parse_range("80443").is_err());
    assert!(parse_range("a-443").is_err());
    assert!(parse_range("80-x").is_err());
    assert!(parse_range("443-80").is_err());
}

#[test]
fn test_scan_range_bounds() {
    let args = vec!["netprobe", "scan", "--target", "h", "--ports", "0-10"];
    assert!(Cli::parse_from(args).to_scan_config().is_err());

    let args = vec!["netprobe", "scan", "--target", "h", "--ports", "1-70000"];
    assert!(Cli::parse_from(args).to_scan_config().is_err());

    let args = vec!["netprobe", "scan", "--target", "h", "--timeout", "0"];
    assert!(Cli::parse_from(args).to_scan_config().is_err());
}

#[test]
fn test_trace_ttl_bounds() {
    let args = vec!["netprobe", "trace", "--target", "h", "--ttl", "0-5"];
    assert!(Cli::parse_from(args).to_trace_config().is_err());

    let args = vec!["netprobe", "trace", "--target", "h", "--ttl", "1-300"];
    assert!(Cli::parse_from(args).to_trace_config().is_err());
}

#[test]
fn test_monitor_bounds() {
    let args = vec!["netprobe", "monitor", "--interval", "0"];
    assert!(Cli::parse_from(args).to_monitor_config().is_err());

    let args = vec!["netprobe", "monitor", "--samples", "0"];
    assert!(Cli::parse_from(args).to_monitor_config().is_err());

    let args = vec!["netprobe", "monitor", "--iface", ""];
    assert!(Cli::parse_from(args).to_monitor_config().is_err());
}

#[test]
fn test_format_flags() {
    let args = vec!["netprobe", "scan", "--target", "h", "--json"];
    assert_eq!(Cli::parse_from(args).format(), OutputFormat::Json);

    let args = vec!["netprobe", "scan", "--target", "h", "--csv"];
    assert_eq!(Cli::parse_from(args).format(), OutputFormat::Csv);

    let args = vec!["netprobe", "scan", "--target", "h"];
    assert_eq!(Cli::parse_from(args).format(), OutputFormat::Table);

    // JSON and CSV are mutually exclusive
    let args = vec!["netprobe", "scan", "--target", "h", "--json", "--csv"];
    assert!(Cli::try_parse_from(args).is_err());
}
