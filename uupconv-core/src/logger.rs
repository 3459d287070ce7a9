//! Leveled, thread-safe console output.
//!
//! A [`Logger`] owns its output sink behind a single mutex. Selecting the
//! colour, formatting the record and writing it all happen while that lock is
//! held, so records written from the backend's reader thread and from the
//! orchestrating thread never interleave and never leave the terminal in a
//! coloured state.
use chrono::Local;
use console::{Style, Term};
use std::fmt;
use std::io::{self, Write};
use std::sync::{Mutex, MutexGuard};

/// Severity of a log record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Information,
    Warning,
    Error,
}

impl Level {
    /// The fixed-width label printed between the timestamp and the message.
    pub fn label(self) -> &'static str {
        match self {
            Level::Information => "Information",
            Level::Warning => "  Warning  ",
            Level::Error => "   Error   ",
        }
    }

    fn style(self) -> Style {
        match self {
            Level::Information => Style::new().white(),
            Level::Warning => Style::new().yellow(),
            Level::Error => Style::new().red(),
        }
    }
}

struct Sink {
    writer: Box<dyn Write + Send>,
    colored: bool,
}

/// Serialized console writer shared between the orchestrator and the
/// progress coalescer.
pub struct Logger {
    sink: Mutex<Sink>,
}

impl Logger {
    /// A logger writing to standard output, coloured when stdout supports it.
    pub fn stdout() -> Self {
        Self {
            sink: Mutex::new(Sink {
                writer: Box::new(io::stdout()),
                colored: console::colors_enabled(),
            }),
        }
    }

    /// A logger writing plain text to an arbitrary sink.
    pub fn with_writer<W>(writer: W) -> Self
    where
        W: Write + Send + 'static,
    {
        Self {
            sink: Mutex::new(Sink {
                writer: Box::new(writer),
                colored: false,
            }),
        }
    }

    /// Writes a newline-terminated record at `Information` level.
    pub fn info(&self, message: &str) {
        self.log(message, Level::Information, false);
    }

    pub fn warn(&self, message: &str) {
        self.log(message, Level::Warning, false);
    }

    pub fn error(&self, message: &str) {
        self.log(message, Level::Error, false);
    }

    /// Writes one record.
    ///
    /// When `inline` is set the record overwrites the current terminal line
    /// (`\r` prefix, no trailing newline). An empty message writes a bare
    /// newline regardless of level.
    pub fn log(&self, message: &str, level: Level, inline: bool) {
        let mut sink = self.lock();

        // Output is best effort: a closed stdout must not abort the conversion.
        let _ = if message.is_empty() {
            writeln!(sink.writer)
        } else {
            let record = format_record(&Local::now().format("[%H:%M:%S]"), level, message);
            let record = if sink.colored {
                level.style().force_styling(true).apply_to(record).to_string()
            } else {
                record
            };

            if inline {
                write!(sink.writer, "\r{record}")
            } else {
                writeln!(sink.writer, "{record}")
            }
        };
        let _ = sink.writer.flush();
    }

    fn lock(&self) -> MutexGuard<'_, Sink> {
        // A writer that panicked mid-record must not silence the rest of the run.
        self.sink.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn format_record(timestamp: &dyn fmt::Display, level: Level, message: &str) -> String {
    format!("{timestamp}[{}] {message}", level.label())
}

/// Blocks until the user presses Enter.
///
/// Used for the developer pause after an error; never called unless the
/// pause was explicitly requested.
pub fn wait_for_acknowledgement() {
    let term = Term::stdout();
    let _ = term.write_line("Press Enter to continue...");
    let _ = term.read_line();
}
