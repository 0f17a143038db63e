use clap::{Parser, Subcommand};

mod commands;

use commands::{ReportArgs, ServeArgs, TablesArgs};

#[derive(Parser)]
#[command(name = "predictoor-stats")]
#[command(about = "Accuracy and profit dashboard for Predictoor prediction exports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the interactive dashboard and JSON API
    Serve(ServeArgs),
    /// Print a table for a date range, optionally exporting it as CSV
    Report(ReportArgs),
    /// List registered tables and their columns
    Tables(TablesArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so report output can be piped.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Serve(args) => commands::run_serve(args).await?,
        Commands::Report(args) => commands::run_report(args).await?,
        Commands::Tables(args) => commands::run_tables(&args)?,
    }

    Ok(())
}
