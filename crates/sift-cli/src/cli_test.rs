use super::*;

#[test]
fn test_parse_run_with_full_refresh() {
    let cli = Cli::try_parse_from(["sift", "run", "--full-refresh"]).unwrap();
    match cli.command {
        Commands::Run(args) => assert!(args.full_refresh),
        other => panic!("unexpected command: {:?}", other),
    }
}

#[test]
fn test_global_defaults() {
    let cli = Cli::try_parse_from(["sift", "ingest"]).unwrap();
    assert_eq!(cli.global.project_dir, ".");
    assert!(!cli.global.verbose);
    assert!(cli.global.config.is_none());
    assert!(cli.global.target.is_none());
}

#[test]
fn test_global_args_after_subcommand() {
    let cli = Cli::try_parse_from(["sift", "transform", "-p", "/data/project", "-v"]).unwrap();
    assert_eq!(cli.global.project_dir, "/data/project");
    assert!(cli.global.verbose);
}

#[test]
fn test_validate_stage_parsing() {
    let cli = Cli::try_parse_from(["sift", "validate", "--stage", "raw"]).unwrap();
    match cli.command {
        Commands::Validate(args) => assert_eq!(args.stage, StageArg::Raw),
        other => panic!("unexpected command: {:?}", other),
    }
}

#[test]
fn test_validate_stage_defaults_to_both() {
    let cli = Cli::try_parse_from(["sift", "validate"]).unwrap();
    match cli.command {
        Commands::Validate(args) => assert_eq!(args.stage, StageArg::Both),
        other => panic!("unexpected command: {:?}", other),
    }
}

#[test]
fn test_ingest_sources_filter() {
    let cli = Cli::try_parse_from(["sift", "ingest", "--sources", "customers,sentiment"]).unwrap();
    match cli.command {
        Commands::Ingest(args) => {
            assert_eq!(args.sources.as_deref(), Some("customers,sentiment"))
        }
        other => panic!("unexpected command: {:?}", other),
    }
}

#[test]
fn test_unknown_subcommand_rejected() {
    assert!(Cli::try_parse_from(["sift", "teleport"]).is_err());
}
