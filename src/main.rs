use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use pecan::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Serve the conversion handler over HTTP
    Serve {
        /// Address to listen on, overrides the configured one
        #[arg(short, long)]
        listen: Option<String>,
    },
    /// Convert a USD amount once and print the result
    Convert {
        /// Amount in USD
        #[arg(allow_hyphen_values = true)]
        usd_amount: String,

        /// Print the raw handler response instead of a table
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => pecan::cli::setup::setup(),
        Some(Commands::Serve { listen }) => {
            pecan::run_command(pecan::AppCommand::Serve { listen }, cli.config_path.as_deref())
                .await
        }
        Some(Commands::Convert { usd_amount, json }) => {
            pecan::run_command(
                pecan::AppCommand::Convert {
                    usd_amount,
                    as_json: json,
                },
                cli.config_path.as_deref(),
            )
            .await
        }
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
