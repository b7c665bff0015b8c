use clap::Parser;
use index_patterns::cli::{Cli, Commands};
use std::path::PathBuf;

#[test]
fn test_parse_request() {
    let cli = Cli::try_parse_from([
        "index-patterns",
        "request",
        "POST",
        "/api/index_patterns/index_pattern",
        "--body",
        r#"{"index_pattern":{"title":"logs-*"}}"#,
        "--json",
    ])
    .unwrap();

    assert!(cli.json);
    match cli.command {
        Commands::Request(args) => {
            assert_eq!(args.method, "POST");
            assert_eq!(args.path, "/api/index_patterns/index_pattern");
            assert!(args.body.unwrap().contains("logs-*"));
            assert!(args.user.is_none());
        }
        other => panic!("Wrong command: {other:?}"),
    }
}

#[test]
fn test_parse_global_config() {
    let cli = Cli::try_parse_from(["index-patterns", "--config", "custom.yaml", "describe"]).unwrap();
    assert_eq!(cli.config, Some(PathBuf::from("custom.yaml")));
    assert!(matches!(cli.command, Commands::Describe(_)));
}

#[test]
fn test_parse_init_defaults() {
    let cli = Cli::try_parse_from(["index-patterns", "init"]).unwrap();
    match cli.command {
        Commands::Init(args) => {
            assert!(!args.force);
            assert_eq!(args.path, PathBuf::from("."));
        }
        other => panic!("Wrong command: {other:?}"),
    }
}

#[test]
fn test_parse_run_and_usage() {
    let cli = Cli::try_parse_from(["index-patterns", "run", "requests.yaml", "--fail-fast"]).unwrap();
    assert!(matches!(cli.command, Commands::Run(args) if args.fail_fast));

    let cli = Cli::try_parse_from(["index-patterns", "usage", "--seed", "seed.yaml"]).unwrap();
    assert!(matches!(cli.command, Commands::Usage(args) if args.seed.is_some()));
}

#[test]
fn test_request_requires_path() {
    assert!(Cli::try_parse_from(["index-patterns", "request", "GET"]).is_err());
}
