//! Drives one conversion from raw command-line tokens to a finished ISO.
//!
//! The orchestrator prints the banner, validates the arguments, inspects the
//! host to decide which warnings apply, makes sure the elevated helper is
//! present when it will be needed, then hands the request to a
//! [`MediaCreator`] with a [`ProgressCoalescer`] wired in as its callback.
//! Every failure is terminal and is reported through the [`Logger`].
use crate::companion;
use crate::error::{CompanionError, ConversionError, EnvironmentError, RunError, error_chain};
use crate::logger::{self, Logger};
use crate::media::{CompressionType, MediaCreator, MediaRequest};
use crate::platform::{self, PlatformFamily, PlatformInfo};
use crate::progress::{ERROR_BANNER, ProgressCoalescer};
use std::path::PathBuf;
use std::sync::Arc;

const BANNER: [&str; 7] = [
    concat!(
        "uupconv ",
        env!("CARGO_PKG_VERSION"),
        " - Converts an UUP file set to an usable ISO file"
    ),
    "Copyright (c) Gustave Monce and Contributors",
    "https://github.com/gus33000/UUPMediaCreator",
    "",
    "This program comes with ABSOLUTELY NO WARRANTY.",
    "This is free software, and you are welcome to redistribute it under certain conditions.",
    "",
];

pub const USAGE: &str =
    "Usage: uupconv <UUP File set path> <Destination ISO file> <Language Code> [Edition]";

const UPDATES_WARNING: &str = concat!(
    "WARNING: This tool does NOT currently integrate updates into the finished media file. ",
    "Any UUP set with updates (KBXXXXX).MSU/.CAB will not have the update integrated."
);
const NOT_ELEVATED_WARNING: &str = concat!(
    "WARNING: This tool is NOT currently running under Windows as administrator. ",
    "The resulting image will be less clean/proper compared to Microsoft original."
);
const ALL_EDITIONS_WARNING: &str = concat!(
    "WARNING: You are attempting to create an ISO media with potentially all editions ",
    "available. Due to the tool not running under Windows as administrator, this request ",
    "might not be fulfilled."
);

/// Positional arguments of one invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InvocationArguments {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub language_code: String,
    pub edition: Option<String>,
}

impl InvocationArguments {
    /// Reads `<source> <destination> <language> [edition]`.
    ///
    /// Returns `None` when fewer than three tokens were given. Tokens past the
    /// fourth are ignored.
    pub fn from_tokens(tokens: &[String]) -> Option<Self> {
        match tokens {
            [source, destination, language_code, rest @ ..] => Some(Self {
                source: PathBuf::from(source),
                destination: PathBuf::from(destination),
                language_code: language_code.clone(),
                edition: rest.first().cloned(),
            }),
            _ => None,
        }
    }
}

/// How a run ended. Environment failures are returned as [`RunError`]
/// instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// Too few arguments; usage was printed.
    Usage,
    Completed,
    /// The UUP set path does not resolve to an existing location.
    InvalidSource,
    /// Running elevated but the DISM broker is missing.
    CompanionMissing,
    ConversionFailed,
}

impl RunOutcome {
    pub fn is_success(self) -> bool {
        matches!(self, RunOutcome::Usage | RunOutcome::Completed)
    }
}

/// Host queries the orchestrator depends on.
pub trait Host {
    fn platform(&self) -> Result<PlatformInfo, EnvironmentError>;

    fn os_description(&self) -> Option<String> {
        None
    }

    fn find_companion(&self) -> Result<PathBuf, CompanionError>;
}

/// The real host: compile-time OS, process token and executable location.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemHost;

impl Host for SystemHost {
    fn platform(&self) -> Result<PlatformInfo, EnvironmentError> {
        PlatformInfo::detect()
    }

    fn os_description(&self) -> Option<String> {
        platform::os_description()
    }

    fn find_companion(&self) -> Result<PathBuf, CompanionError> {
        companion::find_companion()
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct RunOptions {
    /// Wait for Enter after an error is reported.
    pub pause_on_error: bool,
}

/// One conversion run wired to its collaborators.
pub struct Orchestrator<'a> {
    logger: Arc<Logger>,
    host: &'a dyn Host,
    creator: &'a dyn MediaCreator,
    options: RunOptions,
}

impl<'a> Orchestrator<'a> {
    pub fn new(logger: Arc<Logger>, host: &'a dyn Host, creator: &'a dyn MediaCreator) -> Self {
        Self {
            logger,
            host,
            creator,
            options: RunOptions::default(),
        }
    }

    pub fn options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    /// Runs a conversion for the positional `tokens` (program name excluded).
    ///
    /// # Errors
    ///
    /// [`RunError::Environment`] when the host OS cannot be classified. All
    /// other failures are logged and reported through [`RunOutcome`].
    pub fn run(&self, tokens: &[String]) -> Result<RunOutcome, RunError> {
        for line in BANNER {
            self.logger.info(line);
        }

        let Some(args) = InvocationArguments::from_tokens(tokens) else {
            self.logger.info(USAGE);
            return Ok(RunOutcome::Usage);
        };

        let source = match std::fs::canonicalize(&args.source) {
            Ok(source) => source,
            Err(err) => {
                self.logger.error(&format!(
                    "Could not resolve UUP set path: {} ({err})",
                    args.source.display()
                ));
                return Ok(RunOutcome::InvalidSource);
            }
        };

        let platform = self.host.platform()?;
        self.log_host(platform.family);
        if let Some(advisory) = platform.family.iso_tool_advisory() {
            self.logger.warn(&format!("WARNING: {advisory}"));
        }
        self.logger.warn(UPDATES_WARNING);

        if !platform.is_elevated {
            self.logger.warn(NOT_ELEVATED_WARNING);
            if args.edition.as_deref().is_none_or(str::is_empty) {
                self.logger.warn(ALL_EDITIONS_WARNING);
            }
        } else {
            match self.host.find_companion() {
                Ok(helper) => self
                    .logger
                    .info(&format!("Using DISM broker at {}", helper.display())),
                Err(err) => {
                    for cause in error_chain(&err) {
                        self.logger.error(&format!("ERROR: {cause}"));
                    }
                    return Ok(RunOutcome::CompanionMissing);
                }
            }
        }

        let request = MediaRequest {
            destination: args.destination,
            source,
            edition: args.edition,
            language_code: args.language_code,
            integrate_updates: false,
            compression: CompressionType::Lzx,
        };
        Ok(self.convert(&request))
    }

    fn log_host(&self, family: PlatformFamily) {
        match self.host.os_description() {
            Some(description) => self
                .logger
                .info(&format!("Running on {family} ({description})")),
            None => self.logger.info(&format!("Running on {family}")),
        }
    }

    fn convert(&self, request: &MediaRequest) -> RunOutcome {
        let coalescer = ProgressCoalescer::new(Arc::clone(&self.logger))
            .pause_on_error(self.options.pause_on_error);
        let callback = |phase, is_indeterminate, percentage, sub_operation: &str| {
            coalescer.report(phase, is_indeterminate, percentage, sub_operation);
        };

        match self.creator.create_iso_media(request, &callback) {
            Ok(()) if coalescer.last_emitted().phase.is_error() => RunOutcome::ConversionFailed,
            Ok(()) => {
                self.logger.info(&format!(
                    "Successfully created {}",
                    request.destination.display()
                ));
                RunOutcome::Completed
            }
            Err(err) => {
                self.report_failure(&err);
                RunOutcome::ConversionFailed
            }
        }
    }

    fn report_failure(&self, err: &ConversionError) {
        self.logger.error(ERROR_BANNER);
        for cause in error_chain(err) {
            self.logger.error(&cause.to_string());
        }
        if self.options.pause_on_error {
            logger::wait_for_acknowledgement();
        }
    }
}

/// Runs one conversion against the real host.
pub fn run(
    tokens: &[String],
    creator: &dyn MediaCreator,
    logger: Arc<Logger>,
    options: RunOptions,
) -> Result<RunOutcome, RunError> {
    Orchestrator::new(logger, &SystemHost, creator)
        .options(options)
        .run(tokens)
}
