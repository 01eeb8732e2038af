//! Tests for the deploy and plan subcommands.

use super::parse;
use crate::cli::CliCommand;
use std::path::PathBuf;

#[test]
fn cli_parse_deploy_defaults() {
    match parse(&["slipway", "deploy"]) {
        CliCommand::Deploy {
            root,
            archive,
            no_wait,
        } => {
            assert!(root.is_none());
            assert!(!archive);
            assert!(!no_wait);
        }
        _ => panic!("expected Deploy"),
    }
}

#[test]
fn cli_parse_deploy_root_and_archive() {
    match parse(&["slipway", "deploy", "--root", "/srv/app", "--archive"]) {
        CliCommand::Deploy { root, archive, .. } => {
            assert_eq!(root, Some(PathBuf::from("/srv/app")));
            assert!(archive);
        }
        _ => panic!("expected Deploy with --root and --archive"),
    }
}

#[test]
fn cli_parse_deploy_no_wait() {
    match parse(&["slipway", "deploy", "--no-wait"]) {
        CliCommand::Deploy { no_wait, .. } => assert!(no_wait),
        _ => panic!("expected Deploy with --no-wait"),
    }
}

#[test]
fn cli_parse_plan() {
    match parse(&["slipway", "plan"]) {
        CliCommand::Plan { root } => assert!(root.is_none()),
        _ => panic!("expected Plan"),
    }
}

#[test]
fn cli_parse_plan_root() {
    match parse(&["slipway", "plan", "--root", "demo"]) {
        CliCommand::Plan { root } => assert_eq!(root, Some(PathBuf::from("demo"))),
        _ => panic!("expected Plan with --root"),
    }
}
