use crate::app::{run_ingest, run_render, RunReport};
use crate::config::Config;
use crate::error::Result;
use crate::marketplace::HttpPageExtractor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Ingest,
    Render,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("ingest") => Some(Command::Ingest),
        Some("render") => Some(Command::Render),
        _ => None,
    }
}

/// Exit code: 0 when every entity succeeded, 1 when any failed or the run
/// could not start, 2 on usage error.
pub async fn run_with_args(args: &[String]) -> i32 {
    let Some(command) = parse_command(args) else {
        eprintln!("usage: card-ledger <ingest|render> [config.json]");
        return 2;
    };

    let config = match load_config(args.get(2)) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("config error: {err}");
            return 1;
        }
    };

    let report = match command {
        Command::Ingest => handle_ingest(&config).await,
        Command::Render => Ok(run_render(&config)),
    };

    match report {
        Ok(report) if report.is_success() => 0,
        Ok(_) => 1,
        Err(err) => {
            eprintln!("{err}");
            1
        }
    }
}

fn load_config(path: Option<&String>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path),
        None => Config::from_env(),
    }
}

async fn handle_ingest(config: &Config) -> Result<RunReport> {
    let extractor = HttpPageExtractor::new(&config.marketplace)?;
    run_ingest(config, &extractor).await
}
