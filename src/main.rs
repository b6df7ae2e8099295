use anyhow::Context;
use clap::Parser;
use log::info;

use reporter::cli::Cli;
use reporter::config::Config;
use reporter::scheduler::{Collaborators, Reporter, Scheduler, SchedulerSettings};
use reporter::services::{BoardPublisher, DryRunPublisher, HttpAttachmentFetcher, Publisher};
use reporter::sources;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    Config::load_dotenv();
    let cli = Cli::parse();
    reporter::logging::init();

    // Load configuration
    let config = Config::load(&cli.config)
        .with_context(|| format!("Exception while parsing config file {}", cli.config.display()))?;

    let user_agent = &config.general.user_agent;
    let (source, enricher) = sources::build(&config)?;

    let publisher: Box<dyn Publisher> = if cli.dry_run {
        info!("Dry run: threads will be logged, not posted");
        Box::new(DryRunPublisher)
    } else {
        Box::new(BoardPublisher::new(&config.destination, user_agent)?)
    };

    let scheduler = Scheduler::new(
        Collaborators {
            source,
            enricher,
            fetcher: Box::new(HttpAttachmentFetcher::new(user_agent)?),
            publisher,
        },
        SchedulerSettings::from_config(&config),
    )?;

    let reporter = Reporter::spawn(scheduler).context("Unable to start the scheduler")?;
    reporter.join()?;

    Ok(())
}
