//! CLI parse tests.

use super::{Cli, CliCommand};
use clap::Parser;

pub(super) fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(args).unwrap()
}

#[test]
fn cli_parse_fetch() {
    match parse(&["rebound", "fetch", "/hello"]).command {
        CliCommand::Fetch {
            path,
            base_url,
            max_attempts,
            deadline,
        } => {
            assert_eq!(path, "/hello");
            assert!(base_url.is_none());
            assert!(max_attempts.is_none());
            assert!(deadline.is_none());
        }
        _ => panic!("expected Fetch"),
    }
}

#[test]
fn cli_parse_fetch_overrides() {
    match parse(&[
        "rebound",
        "fetch",
        "hello",
        "--base-url",
        "http://127.0.0.1:8080",
        "--max-attempts",
        "3",
        "--deadline",
        "10",
    ])
    .command
    {
        CliCommand::Fetch {
            base_url,
            max_attempts,
            deadline,
            ..
        } => {
            assert_eq!(base_url.as_deref(), Some("http://127.0.0.1:8080"));
            assert_eq!(max_attempts, Some(3));
            assert_eq!(deadline, Some(10));
        }
        _ => panic!("expected Fetch with overrides"),
    }
}

#[test]
fn cli_parse_classify() {
    match parse(&["rebound", "classify", "429"]).command {
        CliCommand::Classify { status } => assert_eq!(status, 429),
        _ => panic!("expected Classify"),
    }
}

#[test]
fn cli_parse_classify_rejects_non_numeric() {
    assert!(Cli::try_parse_from(["rebound", "classify", "abc"]).is_err());
}

#[test]
fn cli_parse_policy_with_global_config() {
    let cli = parse(&["rebound", "policy", "--config", "/tmp/rebound.toml"]);
    assert!(matches!(cli.command, CliCommand::Policy));
    assert_eq!(
        cli.config.as_deref(),
        Some(std::path::Path::new("/tmp/rebound.toml"))
    );
}
