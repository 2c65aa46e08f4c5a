//! Scripted duel runner.
mod duel;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use skirmish_content::ContentFactory;

use duel::Duel;

/// Run a scripted duel through the collision resolver
#[derive(Parser)]
#[command(name = "skirmish")]
#[command(
    about = "Runs a scripted duel and prints both duelists after every collision",
    long_about = None
)]
#[command(version)]
struct Cli {
    /// Data directory holding config.toml, actions.ron and duel.ron (embedded data if omitted)
    #[arg(long)]
    data: Option<PathBuf>,

    /// Number of collisions to run
    #[arg(long, default_value_t = 6)]
    rounds: u32,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let content = match &cli.data {
        Some(dir) => ContentFactory::new(dir),
        None => ContentFactory::embedded(),
    };

    let config = content.load_config()?;
    let factory = content.action_factory()?;
    let spec = content.load_duel()?;
    tracing::info!(
        templates = factory.registry().len(),
        queue_capacity = config.queue_capacity,
        "content loaded"
    );

    let mut duel = Duel::setup(config, &spec, &factory)?;
    println!("{}", duel.status_line(0));
    for round in 1..=cli.rounds {
        duel.round()?;
        println!("{}", duel.status_line(round));
        if let Some(winner) = duel.winner() {
            println!("{winner} wins after {round} rounds");
            return Ok(());
        }
    }
    println!("no winner after {} rounds", cli.rounds);
    Ok(())
}
