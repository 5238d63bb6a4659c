use crate::prelude::*;
use clap::Parser;

mod config;
mod error;
mod generate;
mod github;
mod llm;
mod prelude;
mod server;
mod storage;
mod workflow;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Generate a unified diff for a public GitHub repository from a change request"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,

    #[clap(flatten)]
    settings: config::Settings,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Whether to display additional information.
    #[clap(long, env = "ANYTOOL_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Serve the HTTP API
    Serve(crate::server::ServeOptions),

    /// Generate a diff once and print it
    Generate(crate::generate::GenerateOptions),
}

fn init_logging(global: &Global) {
    let default_filter = if global.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine; the environment may already be populated.
    let _ = dotenvy::dotenv();
    color_eyre::install()?;

    let app = App::parse();
    init_logging(&app.global);

    let state = workflow::AppState::new(app.settings)?;

    match app.command {
        SubCommands::Serve(options) => crate::server::run(options, state).await,
        SubCommands::Generate(options) => crate::generate::run(options, state).await,
    }
    .map_err(|err: color_eyre::eyre::Report| eyre!(err))
}
