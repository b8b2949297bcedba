use std::collections::HashMap;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::error;

mod logging;
mod run;

/// Deliver local files or query results to an SFTP server
#[derive(Debug, Parser)]
#[command(name = "sluice", version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the delivery pipeline once
    Run {
        /// Path to the configuration file
        #[arg(short, long, env = "SLUICE_CONFIG", default_value = "conf.toml")]
        file: PathBuf,

        /// k=v list of parameters to pass to the configuration file
        /// e.g. sluice run -f conf.toml -p key1=value1 -p key2=value2
        #[arg(short, long, value_parser = parse_key_val::<String, String>)]
        params: Option<Vec<(String, String)>>,

        /// Local file receiving the query result (query mode)
        #[arg(short, long, env = "SLUICE_OUTPUT", default_value = "output.csv")]
        output: PathBuf,

        /// File the run log is appended to
        #[arg(long, env = "SLUICE_LOG_FILE", default_value = "transmission_log.log")]
        log_file: PathBuf,

        /// Logging level (error, warn, info, debug, trace)
        #[arg(long, env = "SLUICE_LOG_LEVEL", default_value = "debug")]
        log_level: String,
    },

    /// Check a configuration file without running anything
    Validate {
        /// Path to the configuration file
        #[arg(short, long, env = "SLUICE_CONFIG", default_value = "conf.toml")]
        file: PathBuf,

        /// k=v list of parameters to pass to the configuration file
        #[arg(short, long, value_parser = parse_key_val::<String, String>)]
        params: Option<Vec<(String, String)>>,
    },
}

fn parse_key_val<T, U>(s: &str) -> Result<(T, U), Box<dyn Error + Send + Sync + 'static>>
where
    T: std::str::FromStr,
    T::Err: Error + Send + Sync + 'static,
    U: std::str::FromStr,
    U::Err: Error + Send + Sync + 'static,
{
    let pos = s
        .find('=')
        .ok_or_else(|| format!("invalid KEY=value: no `=` found in `{s}`"))?;
    Ok((s[..pos].parse()?, s[pos + 1..].parse()?))
}

/// Exit code when the configuration could not be loaded
const CONFIG_ERROR: u8 = 2;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    match args.command {
        Commands::Run {
            file,
            params,
            output,
            log_file,
            log_level,
        } => {
            let params = HashMap::from_iter(params.unwrap_or_default());

            // the sink lives exactly as long as the run
            let _guard = match logging::init(&log_file, &log_level) {
                Ok(guard) => guard,
                Err(e) => {
                    eprintln!("Failed to open log file {}: {e}", log_file.display());
                    return ExitCode::FAILURE;
                }
            };

            match run::run_local(&file, params, output).await {
                Ok(outcome) if outcome.is_success() => ExitCode::SUCCESS,
                Ok(_) => ExitCode::FAILURE,
                Err(e) => {
                    error!("Configuration error: {e}");
                    eprintln!("{:?}", miette::Report::new(e));
                    ExitCode::from(CONFIG_ERROR)
                }
            }
        }
        Commands::Validate { file, params } => {
            let params = HashMap::from_iter(params.unwrap_or_default());

            match run::validate(&file, params) {
                Ok(summary) => {
                    println!("{summary}");
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!("{:?}", miette::Report::new(e));
                    ExitCode::from(CONFIG_ERROR)
                }
            }
        }
    }
}
