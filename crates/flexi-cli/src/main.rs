use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use flexi_cli::{Command, Environment, TerminalUi, bootstrap, commands, logging};

#[derive(Parser)]
#[command(name = "flexi")]
#[command(about = "FlexiLance - freelance marketplace client", long_about = None)]
struct Cli {
    /// Also write logs to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use this directory instead of the platform config directory
    #[arg(long, global = true, value_name = "DIR")]
    config_dir: Option<PathBuf>,

    /// Keep the session in memory and write no files
    #[arg(long, global = true)]
    ephemeral: bool,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let env = Environment {
        config_dir: cli.config_dir,
        ephemeral: cli.ephemeral,
    };

    let config = env.load_config()?;
    let _log_guard = logging::init(env.logs_dir()?.as_deref(), &config.log_level, cli.verbose)?;

    let ui = Arc::new(TerminalUi::stdout());
    let app = bootstrap::build(&env, &config, &ui, cli.command.start_page())?;

    if commands::run(&app, &ui, cli.command).await? {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
