mod cli;
mod output;

use clap::Parser;
use color_eyre::eyre::Result;
use tracing_subscriber::EnvFilter;

use cli::{Cli, LifecycleCommand};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = cli.provider.to_config()?;
    let synchronizer = config.configure().await?;

    let (rendered, failed) = match cli.command {
        LifecycleCommand::Create(args) => {
            let outcome = synchronizer.create(args.load()?).await;
            (output::render(&outcome, cli.output)?, outcome.has_error())
        }
        LifecycleCommand::Read(args) => {
            let outcome = synchronizer.read(args.load()?).await;
            (output::render(&outcome, cli.output)?, outcome.has_error())
        }
        LifecycleCommand::Update(args) => {
            let outcome = synchronizer.update(args.load()?).await;
            (output::render(&outcome, cli.output)?, outcome.has_error())
        }
        LifecycleCommand::Delete(args) => {
            let outcome = synchronizer.delete(&args.load()?).await;
            (output::render(&outcome, cli.output)?, outcome.has_error())
        }
        LifecycleCommand::Import(args) => {
            let outcome = synchronizer.import(&args.id);
            (output::render(&outcome, cli.output)?, outcome.has_error())
        }
    };

    println!("{}", rendered);

    if failed {
        tracing::debug!("lifecycle operation reported errors");
        std::process::exit(1);
    }

    Ok(())
}
