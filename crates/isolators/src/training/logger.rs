//! Verbosity-gated training logs.
//!
//! Messages are emitted as `tracing` events under the `isolators` target;
//! [`TrainingLogger`] only forwards what its [`Verbosity`] allows, so a
//! silent configuration stays silent whatever subscriber is installed.

use std::time::{Duration, Instant};

/// Verbosity level for training and scoring output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    /// No output.
    #[default]
    Silent,
    /// Warnings only.
    Warning,
    /// Stage summaries.
    Info,
    /// Per-tile details.
    Debug,
}

/// Logger for training and scoring progress.
#[derive(Debug, Clone)]
pub struct TrainingLogger {
    verbosity: Verbosity,
    started: Instant,
}

impl TrainingLogger {
    /// Create a logger; the stage clock starts now.
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            started: Instant::now(),
        }
    }

    /// Whether messages at `level` are emitted.
    #[inline]
    pub fn enabled(&self, level: Verbosity) -> bool {
        level != Verbosity::Silent && self.verbosity >= level
    }

    /// Time since the logger was created or last restarted.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Restart the stage clock.
    pub fn restart(&mut self) {
        self.started = Instant::now();
    }

    pub fn warn(&self, message: &str) {
        if self.enabled(Verbosity::Warning) {
            tracing::warn!(target: "isolators", "{message}");
        }
    }

    pub fn info(&self, message: &str) {
        if self.enabled(Verbosity::Info) {
            tracing::info!(target: "isolators", "{message}");
        }
    }

    pub fn debug(&self, message: &str) {
        if self.enabled(Verbosity::Debug) {
            tracing::debug!(target: "isolators", "{message}");
        }
    }

    /// Log the end of a stage with its elapsed time, then restart the clock.
    pub fn stage_done(&mut self, stage: &str) {
        if self.enabled(Verbosity::Info) {
            let elapsed = self.elapsed();
            tracing::info!(
                target: "isolators",
                stage,
                elapsed_ms = elapsed.as_secs_f64() * 1e3,
                "{stage} done in {:.3}s",
                elapsed.as_secs_f64()
            );
        }
        self.restart();
    }
}
