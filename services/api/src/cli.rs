use crate::demo::{run_demo, run_dsc_analyze, run_tensile_analyze, CurveFileArgs, DemoArgs, DscFileArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use labspace::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Lab Common Space",
    about = "Run the materials lab data-management service from the command line",
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
    /// Analyze tensile-test exports
    Tensile {
        #[command(subcommand)]
        command: TensileCommand,
    },
    /// Analyze DSC exports
    Dsc {
        #[command(subcommand)]
        command: DscCommand,
    },
    /// Run the material-selection pipeline over a seeded demo catalog
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum TensileCommand {
    /// Parse a raw export and print the curve metrics
    Analyze(CurveFileArgs),
}

#[derive(Subcommand, Debug)]
enum DscCommand {
    /// Parse a raw export and print the thermal events per segment
    Analyze(DscFileArgs),
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
        Command::Tensile {
            command: TensileCommand::Analyze(args),
        } => run_tensile_analyze(args),
        Command::Dsc {
            command: DscCommand::Analyze(args),
        } => run_dsc_analyze(args),
        Command::Demo(args) => run_demo(args),
    }
}
