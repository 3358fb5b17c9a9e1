mod cli;

use clap::Parser;
use nekos_dl::{Event, Runner, TagMap, logging};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    if let Err(err) = logging::init_logging(logging::default_directive(cli.verbose)) {
        eprintln!("nekos-dl: {err}");
    }

    if let Err(err) = run(cli).await {
        eprintln!("nekos-dl error: {err}");
        std::process::exit(1);
    }
}

async fn run(cli: cli::Cli) -> nekos_dl::Result<()> {
    let config = cli.config();

    let tags = TagMap::load(&config.tags_file).await?;
    if tags.is_empty() {
        tracing::warn!(path = %config.tags_file.display(), "Tag file lists no tags");
    }

    let runner = Arc::new(Runner::new(&tags, &config).await?);

    let mut events = runner.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(Event::Downloaded { path, .. }) => println!("Downloaded - {}", path.display()),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Download notices dropped");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    nekos_dl::run_with_shutdown(runner, cli.loops).await;

    Ok(())
}
