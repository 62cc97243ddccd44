use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use yt_scribe::cli::{Cli, Commands, ConsoleReporter};
use yt_scribe::config::Config;
use yt_scribe::extractors::youtube::YoutubeExtractor;
use yt_scribe::history::History;
use yt_scribe::utils;
use yt_scribe::BatchRunner;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let default_filter = if cli.verbose { "yt_scribe=debug" } else { "yt_scribe=warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = Config::load(cli.config.as_deref()).await?;

    match cli.command {
        Commands::Download { url, output } => {
            // Check for required external dependencies (non-fatal)
            let missing_deps = utils::check_dependencies(&config.tools.yt_dlp_path).await;
            if !missing_deps.is_empty() {
                eprintln!("⚠️  Dependency check warnings:");
                for dep in missing_deps {
                    eprintln!("   • {}", dep);
                }
                eprintln!("   (Continuing anyway - tools may be available)");
            }

            let request = config.batch_request(&url, output.into())?;
            let history = match History::load(&config.history_path(), config.history.limit) {
                Ok(history) => Some(history),
                Err(e) => {
                    tracing::warn!("Download history disabled: {:#}", e);
                    None
                }
            };

            let cancel = CancellationToken::new();
            let ctrl_c_token = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    eprintln!("Cancelling download...");
                    ctrl_c_token.cancel();
                }
            });

            let provider = Arc::new(YoutubeExtractor::with_binary(config.tools.yt_dlp_path.clone()));
            let runner = BatchRunner::new(provider);
            let mut reporter = ConsoleReporter::new(history, cli.quiet);

            tracing::info!("Starting batch for URL: {}", request.source_url);
            let started = std::time::Instant::now();
            let summary = runner.run_batch(&request, &cancel, &mut reporter).await;
            reporter.finish();

            if let Some(reason) = &summary.aborted {
                anyhow::bail!("Nothing downloaded: {}", reason);
            }

            println!(
                "Done in {}: {} saved, {} skipped, {} failed{}",
                utils::format_duration(started.elapsed().as_secs_f64()),
                summary.succeeded,
                summary.skipped,
                summary.failed,
                if summary.cancelled {
                    format!(" ({} not started)", summary.total - summary.processed())
                } else {
                    String::new()
                }
            );
        }
        Commands::Config { show, output } => {
            if config.update_defaults(output.into())? {
                config.save().await?;
                println!("Saved defaults to: {}", config.path.display());
            } else if !show {
                println!("Nothing to change. Edit the config file or pass options:");
                println!("  {}", config.path.display());
            }

            if show {
                config.display();
            }
        }
        Commands::History { clear } => {
            let mut history = History::load(&config.history_path(), config.history.limit)?;

            if clear {
                history.clear();
                history.save()?;
                println!("Recent downloads cleared.");
            } else if history.entries().is_empty() {
                println!("No recent downloads.");
            } else {
                println!("Recent downloads:");
                for entry in history.entries() {
                    println!(
                        "  • {}  {}  ({})",
                        utils::truncate_title(&entry.title, 50),
                        entry.url,
                        entry.file_path.display()
                    );
                }
            }
        }
    }

    Ok(())
}
