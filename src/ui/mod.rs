//! Terminal progress reporting.
//!
//! Progress is drawn on stderr so stdout stays clean for CSV output.

use std::io::IsTerminal;
use std::time::Duration;

/// Check if stderr is a terminal.
pub fn stderr_is_terminal() -> bool {
    std::io::stderr().is_terminal()
}

/// Progress bar for per-identifier detail fetches
#[derive(Clone)]
pub struct FetchProgress {
    pb: indicatif::ProgressBar,
}

impl FetchProgress {
    /// Create a bar of `len` steps; a disabled bar draws nothing.
    pub fn new(len: u64, enabled: bool) -> Self {
        if !enabled {
            return Self::hidden();
        }

        let pb = indicatif::ProgressBar::new(len);
        let style = indicatif::ProgressStyle::with_template(
            "{spinner:.cyan} {msg}: {bar:40.cyan/blue} {pos}/{len} ({percent}%)",
        )
        .unwrap_or_else(|_| indicatif::ProgressStyle::default_bar())
        .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
        .progress_chars("█▓▒░ ");
        pb.set_style(style);
        pb.set_message("Fetching papers");
        pb.enable_steady_tick(Duration::from_millis(100));

        Self { pb }
    }

    /// A bar that never draws
    pub fn hidden() -> Self {
        Self {
            pb: indicatif::ProgressBar::hidden(),
        }
    }

    /// Advance by one fetched identifier
    pub fn inc(&self) {
        self.pb.inc(1);
    }

    /// Current position
    pub fn position(&self) -> u64 {
        self.pb.position()
    }

    /// Remove the bar from the terminal
    pub fn finish(&self) {
        self.pb.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_progress_still_counts() {
        let progress = FetchProgress::new(3, false);
        progress.inc();
        progress.inc();
        assert_eq!(progress.position(), 2);
        progress.finish();
    }
}
