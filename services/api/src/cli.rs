use crate::report::{run_analyze, run_datasets, run_export, AnalyzeArgs, DatasetsArgs, ExportArgs};
use crate::server;
use agro_potential::error::AppError;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "Agro Potential Portal",
    about = "Score agribusiness potential for municipalities and serve the portal API",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Print the potential analysis for a set of municipalities
    Analyze(AnalyzeArgs),
    /// Write the commercial CSV sheets for a set of municipalities
    Export(ExportArgs),
    /// Summarize the datasets found in the data directory
    Datasets(DatasetsArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Override the configured dataset directory
    #[arg(long)]
    pub(crate) data_dir: Option<std::path::PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Analyze(args) => run_analyze(args),
        Command::Export(args) => run_export(args),
        Command::Datasets(args) => run_datasets(args),
    }
}
