use anyhow::Result;
use clap::Parser;

mod app;
mod config;
mod handle;
mod logging;
mod store;
mod ui;

use app::App;
use config::Config;

#[derive(Parser)]
#[command(name = "modalflow")]
#[command(about = "Multi-step modal flow demo wizard")]
#[command(version)]
pub struct Cli {
    /// Config file path
    #[arg(short, long)]
    config: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref())?;
    let logging_handle = logging::init_logging(&config, true, cli.debug)?;

    if let Some(path) = &logging_handle.log_file_path {
        tracing::info!(path = %path.display(), "logging to file");
    }

    let outcome = App::new(config).run()?;

    match outcome {
        Some(data) => {
            println!("Onboarding complete:");
            println!("{}", serde_json::to_string_pretty(&data)?);
        }
        None => println!("Onboarding cancelled."),
    }

    Ok(())
}
