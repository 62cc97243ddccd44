use console::style;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::batch::{BatchNotice, BatchReporter, OutcomeStatus, ProcessingOutcome};
use crate::history::{History, HistoryEntry};

/// Prints batch events to the terminal and records successful downloads
pub struct ConsoleReporter {
    progress: ProgressBar,
    history: Option<History>,
}

impl ConsoleReporter {
    pub fn new(history: Option<History>, quiet: bool) -> Self {
        let progress = if quiet {
            ProgressBar::with_draw_target(None, ProgressDrawTarget::hidden())
        } else {
            ProgressBar::new(0)
        };

        if let Ok(bar_style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            progress.set_style(bar_style.progress_chars("=>-"));
        }

        Self { progress, history }
    }

    /// Print a line to stdout without tearing the progress bar
    fn line(&self, message: String) {
        self.progress.suspend(|| println!("{}", message));
    }

    /// Stop the progress bar and hand back the (possibly updated) history
    pub fn finish(self) -> Option<History> {
        self.progress.finish_and_clear();
        self.history
    }
}

impl BatchReporter for ConsoleReporter {
    fn on_notice(&mut self, notice: &BatchNotice) {
        match notice {
            BatchNotice::InvalidUrl(url) => self.line(format!(
                "{} Invalid URL '{}'. Please enter a valid YouTube video or playlist URL.",
                style("✗").red(),
                url
            )),
            BatchNotice::ExpandingPlaylist(url) => {
                self.progress.set_message("Expanding playlist...");
                self.line(format!("Processing playlist: {}", url));
            }
            BatchNotice::Started { total } => {
                self.progress.set_length(*total as u64);
                self.progress.set_position(0);
            }
            BatchNotice::Processing { index, total, url } => {
                self.progress
                    .set_message(format!("video {}/{}", index, total));
                tracing::debug!("Processing video {}/{}: {}", index, total, url);
            }
            BatchNotice::Cancelled { completed, total } => self.line(format!(
                "{} Download cancelled by user after {}/{} video(s).",
                style("!").yellow(),
                completed,
                total
            )),
            BatchNotice::Failed(reason) => {
                self.line(format!("{} An error occurred: {}", style("✗").red(), reason))
            }
        }
    }

    fn on_outcome(&mut self, outcome: &ProcessingOutcome) {
        match &outcome.status {
            OutcomeStatus::Success { path } => {
                self.line(format!(
                    "{} {} -> {}",
                    style("✓").green(),
                    outcome.video.title,
                    path.display()
                ));

                if let (Some(history), Some(entry)) =
                    (self.history.as_mut(), HistoryEntry::from_outcome(outcome))
                {
                    history.record(entry);
                    if let Err(e) = history.save() {
                        tracing::warn!("Could not update download history: {:#}", e);
                    }
                }
            }
            OutcomeStatus::Skipped { path } => self.line(format!(
                "{} Skipped: {} ({} already exists)",
                style("-").dim(),
                outcome.video.title,
                path.display()
            )),
            OutcomeStatus::Failed { reason } => self.line(format!(
                "{} Could not process {}: {}",
                style("✗").red(),
                outcome.video.url,
                reason
            )),
        }
    }

    fn on_progress(&mut self, index: usize, _total: usize) {
        self.progress.set_position(index as u64);
    }
}
