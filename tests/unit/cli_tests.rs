//! Unit tests for CLI argument parsing and validation

use clap::Parser;
use scout::cli::{Cli, Commands, OutputFormat};
use std::path::PathBuf;

#[test]
fn test_cli_init_defaults() {
    let cli = Cli::try_parse_from(["scout", "init"]).unwrap();
    match cli.command {
        Commands::Init { force, store } => {
            assert!(!force);
            assert_eq!(store, "archive");
        }
        _ => panic!("Expected Init command"),
    }
}

#[test]
fn test_cli_init_with_duckdb_store() {
    let cli = Cli::try_parse_from(["scout", "init", "--force", "--store", "duckdb"]).unwrap();
    match cli.command {
        Commands::Init { force, store } => {
            assert!(force);
            assert_eq!(store, "duckdb");
        }
        _ => panic!("Expected Init command"),
    }
}

#[test]
fn test_cli_add_target() {
    let cli = Cli::try_parse_from([
        "scout",
        "add-target",
        "--name",
        "NYC Open Data",
        "--domain",
        "data.cityofnewyork.us",
        "--link",
        "https://opendata.cityofnewyork.us",
        "--slack-url",
        "https://hooks.slack.com/services/T000/B000/XXXX",
    ])
    .unwrap();

    match cli.command {
        Commands::AddTarget {
            name,
            domain,
            link,
            slack_url,
            locale,
        } => {
            assert_eq!(name, "NYC Open Data");
            assert_eq!(domain, "data.cityofnewyork.us");
            assert_eq!(link, "https://opendata.cityofnewyork.us");
            assert!(slack_url.unwrap().starts_with("https://hooks.slack.com/"));
            assert_eq!(locale, "en");
        }
        _ => panic!("Expected AddTarget command"),
    }
}

#[test]
fn test_cli_add_target_requires_domain() {
    let result = Cli::try_parse_from(["scout", "add-target", "--name", "NYC", "--link", "https://x"]);
    assert!(result.is_err());
}

#[test]
fn test_cli_run_options() {
    let cli = Cli::try_parse_from([
        "scout",
        "run",
        "--target",
        "data.example.org",
        "--dry-run",
        "--seed",
        "42",
        "--quiet",
    ])
    .unwrap();

    match cli.command {
        Commands::Run {
            target,
            dry_run,
            seed,
            quiet,
        } => {
            assert_eq!(target.as_deref(), Some("data.example.org"));
            assert!(dry_run);
            assert_eq!(seed, Some(42));
            assert!(quiet);
        }
        _ => panic!("Expected Run command"),
    }
}

#[test]
fn test_cli_diff_defaults() {
    let cli = Cli::try_parse_from(["scout", "diff", "old.json", "new.json"]).unwrap();
    match cli.command {
        Commands::Diff {
            old,
            new,
            domain,
            link,
            label,
            max_visible,
            seed,
        } => {
            assert_eq!(old, PathBuf::from("old.json"));
            assert_eq!(new, PathBuf::from("new.json"));
            assert_eq!(domain, "catalog.local");
            assert!(link.is_none());
            assert_eq!(label, "catalog");
            assert_eq!(max_visible, 5);
            assert!(seed.is_none());
        }
        _ => panic!("Expected Diff command"),
    }
}

#[test]
fn test_cli_diff_rejects_zero_max_visible() {
    let result = Cli::try_parse_from(["scout", "diff", "a.json", "b.json", "--max-visible", "0"]);
    assert!(result.is_err());
}

#[test]
fn test_cli_global_flags() {
    let cli = Cli::try_parse_from(["scout", "list", "--verbose", "--workspace", "/tmp/watch"]).unwrap();
    assert!(cli.verbose);
    assert_eq!(cli.workspace, Some(PathBuf::from("/tmp/watch")));
    match cli.command {
        Commands::List { format } => assert_eq!(format, "pretty"),
        _ => panic!("Expected List command"),
    }
}

#[test]
fn test_cli_show_and_export() {
    let cli = Cli::try_parse_from(["scout", "show", "NYC", "--format", "json"]).unwrap();
    match cli.command {
        Commands::Show { target, format } => {
            assert_eq!(target, "NYC");
            assert!(matches!(OutputFormat::parse(&format), Ok(OutputFormat::Json)));
        }
        _ => panic!("Expected Show command"),
    }

    let cli = Cli::try_parse_from(["scout", "export", "NYC", "--output", "nyc.json"]).unwrap();
    match cli.command {
        Commands::Export { target, output } => {
            assert_eq!(target, "NYC");
            assert_eq!(output, Some(PathBuf::from("nyc.json")));
        }
        _ => panic!("Expected Export command"),
    }
}

#[test]
fn test_cli_unknown_command() {
    assert!(Cli::try_parse_from(["scout", "snapshot"]).is_err());
}
