//! Faifa CLI
//!
//! Computes Thai commercial electricity bills from JSON requests.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use faifa_billing::{rates::RateRecord, BillRequest, BillingConfig, BillingService, RateTable};
use faifa_common::{Provider, VERSION};

#[derive(Parser)]
#[command(name = "faifa")]
#[command(author, version, about = "Thai commercial electricity bill calculator")]
#[command(
    long_about = "Compute itemized MEA/PEA electricity bills for customer types 2-5.\n\
    \nExamples:\n  \
    faifa calculate --request bill.json\n  \
    cat bill.json | faifa calculate\n  \
    faifa rates --provider pea\n  \
    faifa check-rates rates.json"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute a bill from a JSON request
    Calculate {
        /// Request file; read from stdin when omitted
        #[arg(long, short)]
        request: Option<PathBuf>,

        /// Pretty-print the bill
        #[arg(long)]
        pretty: bool,
    },

    /// List the loaded rate table
    Rates {
        /// Only show one utility (mea, pea)
        #[arg(long)]
        provider: Option<Provider>,

        /// Print the rows as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate a JSON rate table without computing anything
    CheckRates {
        /// Rate table file
        file: PathBuf,
    },
}

fn read_request(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read request from {}", path.display())),
        None => {
            let mut body = String::new();
            std::io::stdin()
                .read_to_string(&mut body)
                .context("Failed to read request from stdin")?;
            Ok(body)
        }
    }
}

fn describe(record: &RateRecord) -> String {
    let entry = &record.entry;
    let demand = entry
        .demand
        .as_ref()
        .map(|d| d.kind())
        .unwrap_or("none");
    format!(
        "{:<28} service {:>8}  energy {:<12} demand {}",
        record.key.to_string(),
        entry.service_charge,
        entry.energy.kind(),
        demand
    )
}

fn main() -> Result<()> {
    // --help and --version exit here, before any configuration is read
    let cli = Cli::parse();
    let config = BillingConfig::load()?;

    // Initialize tracing
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Calculate { request, pretty } => {
            info!("Faifa v{}", VERSION);
            let service = BillingService::from_config(&config)?;

            let body = read_request(request.as_ref())?;
            let request = BillRequest::from_json(&body)?;
            let bill = service.calculate(&request)?;

            let output = if pretty {
                serde_json::to_string_pretty(&bill)?
            } else {
                serde_json::to_string(&bill)?
            };
            println!("{}", output);
        }

        Commands::Rates { provider, json } => {
            let service = BillingService::from_config(&config)?;
            let records: Vec<RateRecord> = service
                .rates()
                .to_records()
                .into_iter()
                .filter(|r| provider.map_or(true, |p| r.key.provider == p))
                .collect();

            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else {
                for record in &records {
                    println!("{}", describe(record));
                }
            }
        }

        Commands::CheckRates { file } => {
            let table = RateTable::from_path(&file)?;
            println!("{}: {} rate entries OK", file.display(), table.len());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{error::ErrorKind, CommandFactory};

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_help_and_version_need_no_config() {
        let help = Cli::try_parse_from(["faifa", "--help"]).err().unwrap();
        assert_eq!(help.kind(), ErrorKind::DisplayHelp);

        let version = Cli::try_parse_from(["faifa", "--version"]).err().unwrap();
        assert_eq!(version.kind(), ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_parses_calculate() {
        let cli = Cli::try_parse_from(["faifa", "calculate", "-r", "bill.json", "--pretty"]).unwrap();
        let Commands::Calculate { request, pretty } = cli.command else {
            panic!("expected calculate");
        };
        assert_eq!(request, Some(PathBuf::from("bill.json")));
        assert!(pretty);
    }
}
