use crate::demo::{run_demo, run_intake, run_session_login, DemoArgs, IntakeArgs, SessionLoginArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use seguro_defeso::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Seguro-Defeso Office",
    about = "Run the Seguro-Defeso document intake and case tracking service",
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
    /// Classify local files into the intake form and optionally score them
    Intake(IntakeArgs),
    /// Seed sample cases and print a filtered, sorted page of the case list
    Demo(DemoArgs),
    /// Sign in against the configured session API and print the operator
    SessionLogin(SessionLoginArgs),
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
        Command::Intake(args) => run_intake(args).await,
        Command::Demo(args) => run_demo(args).await,
        Command::SessionLogin(args) => run_session_login(args).await,
    }
}
