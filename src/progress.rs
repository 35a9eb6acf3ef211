//! Spinners for the slow steps of a dashboard run.

use crate::statistics::Period;
use anyhow::Result;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::future::Future;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

const BRAILLE_TICKS: &str = "⠁⠂⠄⡀⢀⠠⠐⠈ ";
const ASCII_TICKS: &str = "|/-\\ ";
const STAGE_COUNT: u8 = 2;

/// A pipeline step, with what it is working on.
#[derive(Debug, Clone, Copy)]
pub enum Stage<'a> {
    Fetch { source: &'a str, period: Period },
    Render { output: &'a Path },
}

impl Stage<'_> {
    const fn position(&self) -> u8 {
        match self {
            Self::Fetch { .. } => 1,
            Self::Render { .. } => 2,
        }
    }

    fn message(&self) -> String {
        let step = format!("[{}/{STAGE_COUNT}]", self.position());
        let (action, subject) = match self {
            Self::Fetch { source, period } => {
                ("Fetching", format!("{period} statistics from {source}"))
            }
            Self::Render { output } => ("Rendering", format!("dashboard to {}", output.display())),
        };
        format!(
            "{} {} {}",
            step.bright_yellow().bold(),
            action.bright_cyan().bold(),
            subject.bright_white()
        )
    }
}

fn outcome(succeeded: bool, elapsed: Duration) -> String {
    let seconds = format!("({:.1}s)", elapsed.as_secs_f64());
    if succeeded {
        format!("{} {}", "done".bright_green().bold(), seconds.bright_black())
    } else {
        format!("{} {}", "failed".bright_red().bold(), seconds.bright_black())
    }
}

/// Draws stage spinners on stderr, or nothing when disabled.
pub struct ProgressState {
    enabled: bool,
    style: ProgressStyle,
}

impl ProgressState {
    pub(crate) fn new(enabled: bool) -> Self {
        let ticks = if ascii_terminal() { ASCII_TICKS } else { BRAILLE_TICKS };
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars(ticks);
        Self { enabled, style }
    }

    fn spinner(&self, message: String) -> ProgressBar {
        let target = if self.enabled {
            ProgressDrawTarget::stderr_with_hz(15)
        } else {
            ProgressDrawTarget::hidden()
        };
        let bar = ProgressBar::with_draw_target(None, target);
        bar.set_style(self.style.clone());
        bar.set_message(message);
        bar.enable_steady_tick(Duration::from_millis(100));
        bar
    }

    /// Runs `work` under a spinner for `stage` and leaves a done/failed line
    /// with the elapsed time.
    pub async fn track<T>(
        &self,
        stage: Stage<'_>,
        work: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        let message = stage.message();
        let bar = self.spinner(message.clone());
        let result = work.await;
        let elapsed = bar.elapsed();
        debug!(?stage, ok = result.is_ok(), elapsed_ms = elapsed.as_millis(), "stage finished");
        bar.finish_with_message(format!("{message} {}", outcome(result.is_ok(), elapsed)));
        result
    }
}

fn ascii_terminal() -> bool {
    std::env::var("TERM").is_ok_and(|term| term.eq_ignore_ascii_case("dumb"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_messages_name_their_subject() {
        colored::control::set_override(false);
        let fetch = Stage::Fetch {
            source: "stats.json",
            period: Period::Week,
        };
        assert_eq!(fetch.message(), "[1/2] Fetching week statistics from stats.json");
        let render = Stage::Render {
            output: Path::new("out/dashboard.html"),
        };
        assert_eq!(render.message(), "[2/2] Rendering dashboard to out/dashboard.html");
    }

    #[test]
    fn outcome_reports_elapsed_time() {
        colored::control::set_override(false);
        assert_eq!(outcome(true, Duration::from_millis(1240)), "done (1.2s)");
        assert_eq!(outcome(false, Duration::from_millis(80)), "failed (0.1s)");
    }

    #[tokio::test]
    async fn track_passes_result_through() {
        let progress = ProgressState::new(false);
        let stage = Stage::Render {
            output: Path::new("dashboard.html"),
        };
        let value = progress.track(stage, async { Ok(7) }).await.unwrap();
        assert_eq!(value, 7);

        let failed: Result<()> = progress
            .track(stage, async { Err(anyhow::anyhow!("boom")) })
            .await;
        assert!(failed.is_err());
    }
}
