use crate::report::{run_questions, run_score, ScoreArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use lhi::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "lhi-api",
    about = "Serve and score the relationship health index questionnaire",
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
    /// Score a JSON answer file offline and print the report
    Score(ScoreArgs),
    /// Print the questionnaire items grouped by dimension
    Questions,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Score(args) => run_score(args),
        Command::Questions => run_questions(),
    }
}
