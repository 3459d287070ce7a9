//! Turns the backend's chatty progress stream into log lines.
//!
//! Backends re-announce unchanged progress many times per second. The
//! [`ProgressCoalescer`] remembers the last state it emitted and drops any
//! update that matches it on phase, percentage and sub-operation.
use crate::logger::{self, Level, Logger};
use crate::media::ProcessPhase;
use std::sync::{Arc, Mutex};

/// Banner logged ahead of the detail of any reported failure.
pub const ERROR_BANNER: &str = "An error occurred!";

/// A single progress report.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProgressState {
    pub phase: ProcessPhase,
    pub is_indeterminate: bool,
    /// `-1` until the first report arrives.
    pub percentage: i32,
    pub sub_operation: String,
}

impl ProgressState {
    /// Compares on phase, percentage and sub-operation; `is_indeterminate`
    /// does not participate.
    pub fn same_report(&self, phase: ProcessPhase, percentage: i32, sub_operation: &str) -> bool {
        self.phase == phase && self.percentage == percentage && self.sub_operation == sub_operation
    }
}

impl Default for ProgressState {
    fn default() -> Self {
        Self {
            phase: ProcessPhase::default(),
            is_indeterminate: false,
            percentage: -1,
            sub_operation: String::new(),
        }
    }
}

/// Formats a non-error progress line: `[Phase] [Progress: N%] text`, with the
/// percentage omitted for indeterminate progress.
pub fn format_progress(
    phase: ProcessPhase,
    is_indeterminate: bool,
    percentage: i32,
    sub_operation: &str,
) -> String {
    if is_indeterminate {
        format!("[{phase}] {sub_operation}")
    } else {
        format!("[{phase}] [Progress: {percentage}%] {sub_operation}")
    }
}

/// Deduplicating progress sink, safe to call from any thread.
pub struct ProgressCoalescer {
    logger: Arc<Logger>,
    last: Mutex<ProgressState>,
    pause_on_error: bool,
}

impl ProgressCoalescer {
    pub fn new(logger: Arc<Logger>) -> Self {
        Self {
            logger,
            last: Mutex::new(ProgressState::default()),
            pause_on_error: false,
        }
    }

    /// Waits for Enter after logging an `Error` phase.
    pub fn pause_on_error(mut self, pause: bool) -> Self {
        self.pause_on_error = pause;
        self
    }

    /// Handles one report from the backend.
    ///
    /// Returns `true` when the report was logged, `false` when it repeated the
    /// last emitted state.
    pub fn report(
        &self,
        phase: ProcessPhase,
        is_indeterminate: bool,
        percentage: i32,
        sub_operation: &str,
    ) -> bool {
        // Held across logging so a concurrent report cannot overtake this one.
        let mut last = self.last.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if last.same_report(phase, percentage, sub_operation) {
            return false;
        }

        *last = ProgressState {
            phase,
            is_indeterminate,
            percentage,
            sub_operation: sub_operation.to_string(),
        };

        if phase.is_error() {
            self.logger.log(ERROR_BANNER, Level::Error, false);
            self.logger.log(sub_operation, Level::Error, false);
            if self.pause_on_error {
                logger::wait_for_acknowledgement();
            }
        } else {
            let line = format_progress(phase, is_indeterminate, percentage, sub_operation);
            self.logger.log(&line, Level::Information, false);
        }
        true
    }

    /// The last state that produced output.
    pub fn last_emitted(&self) -> ProgressState {
        self.last.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).clone()
    }
}
