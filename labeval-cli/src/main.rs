use clap::Parser;
use labeval_cli::{Cli, Commands, check_sink, run_evaluation};
use labeval_eval::EvalSettings;
use labeval_telemetry::{LogFormat, init_with_format, init_with_otlp, shutdown_telemetry};
use std::process::ExitCode;

const SERVICE_NAME: &str = "labeval";

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let init = match &cli.otlp_endpoint {
        Some(endpoint) => init_with_otlp(SERVICE_NAME, endpoint),
        None => {
            let format = if cli.json_logs { LogFormat::Json } else { LogFormat::Text };
            init_with_format(SERVICE_NAME, format)
        }
    };
    if let Err(e) = init {
        eprintln!("Warning: logging not initialized: {e}");
    }

    let settings = EvalSettings::from_env();
    let result = match &cli.command {
        Commands::Run(args) => run_evaluation(args, &settings).await.map(|status| {
            if let labeval_cli::RunStatus::TelemetryIncomplete(reason) = &status {
                tracing::warn!(%reason, "metrics were not published");
            }
            status.exit_code()
        }),
        Commands::CheckSink(args) => check_sink(args, &settings).await.map(|()| 0),
    };

    shutdown_telemetry();

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(1)
        }
    }
}
