use std::io::IsTerminal;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Controls whether long-running steps draw a spinner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Spinner on stderr.
    Interactive,
    /// Nothing drawn (piped stderr, or verbose logging owns the terminal).
    Plain,
}

impl OutputMode {
    /// Spinners only when stderr is a terminal and tracing is not writing to it.
    pub fn detect(verbose: bool) -> Self {
        if !verbose && std::io::stderr().is_terminal() {
            OutputMode::Interactive
        } else {
            OutputMode::Plain
        }
    }
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

/// A single spinner for a blocking step. Cleared on drop.
pub struct Spinner {
    bar: ProgressBar,
}

impl Spinner {
    pub fn start(mode: OutputMode, message: impl Into<String>) -> Self {
        let bar = match mode {
            OutputMode::Interactive => {
                let bar = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr());
                bar.set_style(spinner_style());
                bar.enable_steady_tick(Duration::from_millis(100));
                bar
            }
            OutputMode::Plain => ProgressBar::hidden(),
        };
        bar.set_message(message.into());
        Self { bar }
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        self.bar.finish_and_clear();
    }
}
