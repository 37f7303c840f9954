use clap::Parser;
use labeval_cli::{Cli, Commands};
use labeval_eval::outcome::MatchPolicy;
use std::path::PathBuf;

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("labeval").chain(args.iter().copied())).unwrap()
}

#[test]
fn test_run_defaults() {
    let cli = parse(&["run"]);
    let Commands::Run(args) = cli.command else { panic!("expected run") };

    assert_eq!(args.policy, MatchPolicy::Single);
    assert_eq!(args.timeout_secs, None);
    assert_eq!(args.delay_ms, 0);
    assert_eq!(args.text_column, "texto");
    assert_eq!(args.label_column, "codigo_assunto");
    assert_eq!(args.label_delimiter, '|');
    assert_eq!(args.request_field, "texto");
    assert_eq!(args.code_field, "codigo");
    assert_eq!(args.truncate, 50);
    assert_eq!(args.measurement, "classificacao_api");
    assert!(args.dataset.is_none());
    assert!(cli.otlp_endpoint.is_none());
}

#[test]
fn test_run_overrides() {
    let cli = parse(&[
        "run",
        "--policy",
        "multi-label",
        "--dataset",
        "data/multi.csv",
        "--classifier-url",
        "http://localhost:8000/classify",
        "--timeout-secs",
        "5",
        "--delay-ms",
        "250",
        "--limit",
        "10",
        "--label-delimiter",
        ";",
        "--response-field",
        "predictions",
        "--truncate",
        "0",
        "--otlp-endpoint",
        "http://localhost:4317",
    ]);
    let Commands::Run(args) = cli.command else { panic!("expected run") };

    assert_eq!(args.policy, MatchPolicy::Multi);
    assert_eq!(args.dataset, Some(PathBuf::from("data/multi.csv")));
    assert_eq!(args.classifier_url.as_deref(), Some("http://localhost:8000/classify"));
    assert_eq!(args.timeout_secs, Some(5));
    assert_eq!(args.delay_ms, 250);
    assert_eq!(args.limit, Some(10));
    assert_eq!(args.label_delimiter, ';');
    assert_eq!(args.response_field.as_deref(), Some("predictions"));
    assert_eq!(args.truncate, 0);
    assert_eq!(cli.otlp_endpoint.as_deref(), Some("http://localhost:4317"));
}

#[test]
fn test_unknown_policy_is_rejected() {
    let result = Cli::try_parse_from(["labeval", "run", "--policy", "fuzzy"]);
    assert!(result.is_err());
}

#[test]
fn test_check_sink() {
    let cli = parse(&["check-sink", "--measurement", "diagnostico"]);
    let Commands::CheckSink(args) = cli.command else { panic!("expected check-sink") };
    assert_eq!(args.measurement, "diagnostico");
}
