use crate::assess::{run_assess, run_batch, run_weights, AssessArgs, BatchArgs, WeightsArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use loan_risk::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Loan Risk Assessor",
    about = "Score loan applications for default risk from the command line or over HTTP",
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
    /// Assess a single application given as feature assignments
    Assess(AssessArgs),
    /// Assess every application in a CSV file
    Batch(BatchArgs),
    /// Print the model's weight table and thresholds
    Weights(WeightsArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// JSON model file to load instead of APP_MODEL_PATH or the built-in table
    #[arg(long)]
    pub(crate) model: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Assess(args) => run_assess(args),
        Command::Batch(args) => run_batch(args),
        Command::Weights(args) => run_weights(args),
    }
}
