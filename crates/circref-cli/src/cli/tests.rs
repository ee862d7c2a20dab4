#![allow(clippy::expect_used)]
#![allow(clippy::panic)]
#![allow(clippy::wildcard_enum_match_arm)]

use clap::CommandFactory;

use super::*;

const FIXTURE: &str = "bprd.json";

/// The root help output must contain all top-level subcommand names.
#[test]
fn test_root_help_lists_all_subcommands() {
    let mut cmd = Cli::command();
    let help = format!("{}", cmd.render_help());
    for name in ["build", "inspect", "cycles", "filter", "reset-filters"] {
        assert!(
            help.contains(name),
            "root help should mention subcommand '{name}'"
        );
    }
}

/// The root help output must describe every global flag.
#[test]
fn test_root_help_lists_global_flags() {
    let mut cmd = Cli::command();
    let help = format!("{}", cmd.render_help());
    for flag in [
        "--format",
        "--quiet",
        "--verbose",
        "--max-file-size",
        "--state-file",
        "--help",
        "--version",
    ] {
        assert!(
            help.contains(flag),
            "root help should mention flag '{flag}'"
        );
    }
}

/// `circref filter --help` must mention every override.
#[test]
fn test_filter_help() {
    let mut cmd = Cli::command();
    let sub = cmd
        .find_subcommand_mut("filter")
        .expect("filter subcommand should exist");
    let help = format!("{}", sub.render_help());
    for flag in [
        "--primary",
        "--cache",
        "--max-depth",
        "--department",
        "--year-min",
        "--year-max",
        "--search",
        "--cycles-only",
        "--labels",
        "--hide-isolated",
        "--show-isolated",
    ] {
        assert!(help.contains(flag), "filter help should mention '{flag}'");
    }
}

#[test]
fn test_cli_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn test_sources_are_required() {
    let result = Cli::try_parse_from(["circref", "build"]);
    assert!(result.is_err(), "build without sources should be rejected");
}

#[test]
fn test_cache_alone_is_a_source() {
    let cli = Cli::try_parse_from(["circref", "inspect", "--cache", "cache.json"])
        .expect("should parse --cache alone");
    match cli.command {
        Command::Inspect { sources } => {
            assert!(sources.primary.is_empty());
            assert_eq!(
                sources.cache.as_deref(),
                Some(std::path::Path::new("cache.json"))
            );
        }
        _ => panic!("expected Inspect subcommand"),
    }
}

#[test]
fn test_primary_is_repeatable_and_ordered() {
    let cli = Cli::try_parse_from([
        "circref",
        "build",
        "--primary",
        "bprd.json",
        "--primary",
        "acd.json",
    ])
    .expect("should parse repeated --primary");
    match cli.command {
        Command::Build { sources } => {
            assert_eq!(
                sources.primary,
                [PathBuf::from("bprd.json"), PathBuf::from("acd.json")]
            );
            assert_eq!(sources.max_depth, DEFAULT_MAX_DEPTH);
        }
        _ => panic!("expected Build subcommand"),
    }
}

#[test]
fn test_max_depth_override() {
    let cli = Cli::try_parse_from(["circref", "build", "--primary", FIXTURE, "--max-depth", "3"])
        .expect("should parse --max-depth");
    match cli.command {
        Command::Build { sources } => assert_eq!(sources.max_depth, 3),
        _ => panic!("expected Build subcommand"),
    }
}

#[test]
fn test_cycles_node_flag() {
    let cli = Cli::try_parse_from([
        "circref",
        "cycles",
        "--primary",
        FIXTURE,
        "--node",
        "BPRD Circular No. 01",
    ])
    .expect("should parse --node");
    match cli.command {
        Command::Cycles { node, .. } => {
            assert_eq!(node.as_deref(), Some("BPRD Circular No. 01"));
        }
        _ => panic!("expected Cycles subcommand"),
    }
}

#[test]
fn test_department_codes_are_case_insensitive() {
    let cli = Cli::try_parse_from([
        "circref",
        "filter",
        "--primary",
        FIXTURE,
        "--department",
        "acd",
        "--department",
        "BPRD",
    ])
    .expect("should parse departments");
    match cli.command {
        Command::Filter { overrides, .. } => {
            assert_eq!(overrides.department, [Department::Acd, Department::Bprd]);
        }
        _ => panic!("expected Filter subcommand"),
    }
}

#[test]
fn test_unknown_department_is_rejected() {
    let result = Cli::try_parse_from([
        "circref",
        "filter",
        "--primary",
        FIXTURE,
        "--department",
        "XYZ",
    ]);
    assert!(result.is_err());
}

#[test]
fn test_conflicting_toggles_are_rejected() {
    for (on, off) in [
        ("--cycles-only", "--all-documents"),
        ("--labels", "--no-labels"),
        ("--hide-isolated", "--show-isolated"),
    ] {
        let result = Cli::try_parse_from(["circref", "filter", "--primary", FIXTURE, on, off]);
        assert!(result.is_err(), "{on} and {off} should conflict");
    }
}

#[test]
fn test_quiet_verbose_conflict() {
    let result = Cli::try_parse_from(["circref", "--quiet", "--verbose", "reset-filters"]);
    assert!(result.is_err(), "--quiet and --verbose should conflict");
}

#[test]
fn test_max_file_size_cli_override() {
    let cli = Cli::try_parse_from(["circref", "--max-file-size", "1048576", "reset-filters"])
        .expect("should parse --max-file-size");
    assert_eq!(cli.max_file_size, 1_048_576);
}

#[test]
fn test_state_file_flag_is_global() {
    let cli = Cli::try_parse_from(["circref", "reset-filters", "--state-file", "/tmp/s.json"])
        .expect("should parse --state-file after the subcommand");
    assert_eq!(cli.state_file, PathBuf::from("/tmp/s.json"));
}

#[test]
fn test_format_flag_json() {
    let cli = Cli::try_parse_from(["circref", "--format", "json", "reset-filters"])
        .expect("should parse --format json");
    assert!(matches!(cli.format, OutputFormat::Json));
}

#[test]
fn test_negative_year_is_accepted() {
    let cli = Cli::try_parse_from([
        "circref",
        "filter",
        "--primary",
        FIXTURE,
        "--year-min",
        "-5",
    ])
    .expect("should parse a negative year");
    match cli.command {
        Command::Filter { overrides, .. } => assert_eq!(overrides.year_min, Some(-5)),
        _ => panic!("expected Filter subcommand"),
    }
}
