use std::error::Error;
use std::process::ExitCode;

use clap::Parser;
use cognito_probe::parameters::{OutputFormat, ProbeArgs};
use cognito_probe::pipeline::{build_stages, run};
use tracing::error;

#[derive(Parser, Debug)]
#[command(name = "cognito-api-probe", version, about)]
struct Cli {
    #[command(flatten)]
    args: ProbeArgs,
}

fn main() -> Result<ExitCode, Box<dyn Error>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.args.log_level)
        .with_writer(std::io::stderr)
        .init();

    let output_format = cli.args.output_format;
    let config = cli.args.into_config()?;
    let (authenticate, fetch) = build_stages(&config)?;

    let report = run(&authenticate, &fetch);

    match output_format {
        OutputFormat::Plain => print!("{}", report.to_plain()),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report.to_json())?),
    }

    match report.outcome() {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            error!("{e}");
            Ok(ExitCode::FAILURE)
        }
    }
}
