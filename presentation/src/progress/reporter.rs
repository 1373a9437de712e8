//! Progress reporting for query runs

use std::sync::Mutex;
use std::time::Duration;

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use lab_application::RunProgress;
use lab_domain::NormalizedAnswer;
use lab_domain::util::preview;

/// Spinner per query, with backoff notices while rate-limited
pub struct ProgressReporter {
    spinner: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            spinner: Mutex::new(None),
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold.cyan} {msg} {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn finish(&self, message: String) {
        if let Ok(mut guard) = self.spinner.lock()
            && let Some(pb) = guard.take()
        {
            pb.finish_with_message(message);
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl RunProgress for ProgressReporter {
    fn on_query_start(&self, index: usize, total: usize, query: &str) {
        let pb = ProgressBar::new_spinner();
        pb.set_style(Self::spinner_style());
        pb.set_prefix(format!("[{}/{}]", index, total));
        pb.set_message(preview(query, 60));
        pb.enable_steady_tick(Duration::from_millis(100));

        if let Ok(mut guard) = self.spinner.lock()
            && let Some(previous) = guard.replace(pb)
        {
            previous.finish_and_clear();
        }
    }

    fn on_backoff(&self, attempt: u32, max_attempts: u32, delay: Duration) {
        let message = backoff_message(attempt, max_attempts, delay);
        let shown = match self.spinner.lock() {
            Ok(guard) => guard
                .as_ref()
                .map(|pb| pb.set_message(message.yellow().to_string()))
                .is_some(),
            Err(_) => false,
        };
        if !shown {
            eprintln!("{}", message.yellow());
        }
    }

    fn on_answer(&self, _index: usize, answer: &NormalizedAnswer) {
        self.finish(format!("{} {}", "v".green(), preview(&answer.text, 60)));
    }

    fn on_query_failed(&self, _index: usize, error: &str) {
        self.finish(format!("{} {}", "x".red(), preview(error, 80)));
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl RunProgress for SimpleProgress {
    fn on_query_start(&self, index: usize, total: usize, query: &str) {
        println!("{} [{}/{}] {}", "->".cyan(), index, total, query.bold());
    }

    fn on_backoff(&self, attempt: u32, max_attempts: u32, delay: Duration) {
        println!("  {}", backoff_message(attempt, max_attempts, delay).yellow());
    }

    fn on_answer(&self, _index: usize, _answer: &NormalizedAnswer) {
        println!("  {} answered", "v".green());
    }

    fn on_query_failed(&self, _index: usize, error: &str) {
        println!("  {} {}", "x".red(), error);
    }
}

/// `Rate limited (attempt 1/3), retrying in 2.0s`
pub fn backoff_message(attempt: u32, max_attempts: u32, delay: Duration) -> String {
    format!(
        "Rate limited (attempt {}/{}), retrying in {:.1}s",
        attempt,
        max_attempts,
        delay.as_secs_f64()
    )
}
