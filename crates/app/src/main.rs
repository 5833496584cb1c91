use std::process::ExitCode;

use forms::{FormRecord, SubmitOutcome};

use crate::error::{AppError, Result};

mod check;
mod error;
mod settings;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let (args, settings) = settings::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "formcheck={level},forms={level}",
            level = settings.level
        ))
        .with_writer(std::io::stderr)
        .init();

    let record = read_record(&args.input)?;
    let mut stdout = std::io::stdout().lock();
    match check::run(args.form, &settings, record, &mut stdout).await? {
        SubmitOutcome::Submitted => Ok(ExitCode::SUCCESS),
        SubmitOutcome::Invalid => Ok(ExitCode::FAILURE),
    }
}

fn read_record(input: &str) -> Result<FormRecord> {
    let raw = if input == "-" {
        std::io::read_to_string(std::io::stdin()).map_err(|err| AppError::input("stdin", err))?
    } else {
        std::fs::read_to_string(input).map_err(|err| AppError::input(input, err))?
    };
    Ok(serde_json::from_str(&raw)?)
}
