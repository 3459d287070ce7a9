//! Error taxonomy for a conversion run.
//!
//! Each error keeps its underlying cause reachable through
//! [`std::error::Error::source`], so a failure is a linked list of typed
//! causes. [`error_chain`] flattens that list for reporting.
use std::error::Error as StdError;
use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Boxed cause carried by errors that wrap an arbitrary failure.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// The host operating system could not be classified.
#[derive(Debug, Error)]
pub enum EnvironmentError {
    #[error("Cannot determine operating system! (reported as `{os}`)")]
    UnknownPlatform { os: String },
}

/// The elevated helper executable could not be located.
#[derive(Debug, Error)]
pub enum CompanionError {
    #[error("Could not find: {}", attempted.display())]
    NotFound {
        /// The last candidate that was checked.
        attempted: PathBuf,
    },
    #[error("Could not determine the location of the running executable")]
    CurrentExe {
        #[source]
        source: io::Error,
    },
}

/// Failures raised by a media creation backend.
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("The media creation backend `{program}` could not be found")]
    BackendUnavailable {
        program: String,
        #[source]
        source: which::Error,
    },
    #[error("Failed to start the media creation backend `{}`", program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to read progress from the media creation backend")]
    Progress {
        #[source]
        source: io::Error,
    },
    #[error("The media creation backend exited unsuccessfully ({status})")]
    BackendExited {
        status: ExitStatus,
        #[source]
        source: Option<BackendDiagnostic>,
    },
    #[error("{message}")]
    Failed {
        message: String,
        #[source]
        source: Option<BoxError>,
    },
}

impl ConversionError {
    /// A failure with a plain message and no further cause.
    pub fn msg(message: impl Into<String>) -> Self {
        ConversionError::Failed {
            message: message.into(),
            source: None,
        }
    }

    /// A failure with a plain message caused by `source`.
    pub fn with_source(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        ConversionError::Failed {
            message: message.into(),
            source: Some(source.into()),
        }
    }
}

/// Last diagnostic line a failed backend wrote to stderr.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct BackendDiagnostic(pub String);

/// Failures that abort [`crate::run`] outright instead of being reported as
/// an outcome.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("host environment detection failed")]
    Environment(#[from] EnvironmentError),
}

/// Flattens an error and its causes, outermost first.
pub fn error_chain<'a>(error: &'a (dyn StdError + 'static)) -> Vec<&'a (dyn StdError + 'static)> {
    let mut chain = Vec::new();
    let mut current = Some(error);
    while let Some(err) = current {
        chain.push(err);
        current = err.source();
    }
    chain
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_runs_outermost_to_innermost() {
        let inner = io::Error::new(io::ErrorKind::NotFound, "install.wim missing");
        let middle = ConversionError::with_source("could not apply image", inner);
        let outer = ConversionError::with_source("media creation failed", middle);

        let messages: Vec<String> = error_chain(&outer).iter().map(|e| e.to_string()).collect();

        assert_eq!(
            messages,
            ["media creation failed", "could not apply image", "install.wim missing"]
        );
    }

    #[test]
    fn single_error_is_a_chain_of_one() {
        let err = ConversionError::msg("boom");
        assert_eq!(error_chain(&err).len(), 1);
    }

    #[test]
    fn not_found_names_the_attempted_path() {
        let err = CompanionError::NotFound {
            attempted: PathBuf::from("/opt/uup/helper.exe"),
        };
        assert_eq!(err.to_string(), "Could not find: /opt/uup/helper.exe");
    }
}
