//! A [`MediaCreator`] that delegates to an external backend executable.
//!
//! The backend is looked up on `PATH` when a conversion starts. It receives
//! the request as command-line options and streams progress on stdout, one
//! tab-separated record per line:
//!
//! ```text
//! progress\t<Phase>\t<0|1>\t<percent>\t<sub-operation>
//! ```
//!
//! The second field is the indeterminate flag. Anything else on stdout is
//! ignored. Records are parsed on a reader thread and handed to the progress
//! callback from that thread.
use crate::error::{BackendDiagnostic, ConversionError};
use crate::media::{MediaCreator, MediaRequest, ProcessPhase, ProgressCallback};
use std::ffi::OsString;
use std::io::{self, BufRead, BufReader, Read};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;

/// Program name searched on `PATH` by default.
pub const DEFAULT_BACKEND: &str = "uup-media-creator";

const RECORD_TAG: &str = "progress";

/// One parsed progress record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProgressRecord {
    pub phase: ProcessPhase,
    pub is_indeterminate: bool,
    pub percentage: i32,
    pub sub_operation: String,
}

/// Parses a stdout line, returning `None` for anything that is not a
/// well-formed progress record.
pub fn parse_progress_line(line: &str) -> Option<ProgressRecord> {
    let line = line.trim_end_matches(['\r', '\n']);
    let mut fields = line.splitn(5, '\t');
    if fields.next()? != RECORD_TAG {
        return None;
    }

    let phase = fields.next()?.parse().ok()?;
    let is_indeterminate = match fields.next()? {
        "0" => false,
        "1" => true,
        _ => return None,
    };
    let percentage = fields.next()?.parse().ok()?;
    let sub_operation = fields.next().unwrap_or_default().to_string();

    Some(ProgressRecord {
        phase,
        is_indeterminate,
        percentage,
        sub_operation,
    })
}

/// Runs the media creation backend as a child process.
#[derive(Clone, Debug)]
pub struct CommandMediaCreator {
    program: OsString,
}

impl Default for CommandMediaCreator {
    fn default() -> Self {
        Self::new(DEFAULT_BACKEND)
    }
}

impl CommandMediaCreator {
    /// Uses `program`, resolved through `PATH` unless it is already a path.
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Command-line options describing `request`.
    pub fn arguments(request: &MediaRequest) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "--destination".into(),
            request.destination.clone().into(),
            "--source".into(),
            request.source.clone().into(),
            "--language".into(),
            request.language_code.clone().into(),
        ];
        if let Some(edition) = &request.edition {
            args.push("--edition".into());
            args.push(edition.into());
        }
        args.push("--compression".into());
        args.push(request.compression.as_arg().into());
        if request.integrate_updates {
            args.push("--integrate-updates".into());
        }
        args
    }

    fn resolve_program(&self) -> Result<PathBuf, ConversionError> {
        which::which(&self.program).map_err(|source| ConversionError::BackendUnavailable {
            program: self.program.to_string_lossy().into_owned(),
            source,
        })
    }
}

impl MediaCreator for CommandMediaCreator {
    fn create_iso_media(
        &self,
        request: &MediaRequest,
        progress: &ProgressCallback<'_>,
    ) -> Result<(), ConversionError> {
        let program = self.resolve_program()?;

        let mut child = Command::new(&program)
            .args(Self::arguments(request))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ConversionError::Spawn {
                program: program.clone(),
                source,
            })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let (forwarded, diagnostic) = thread::scope(|scope| {
            let reader = scope.spawn(move || match stdout {
                Some(stdout) => forward_progress(stdout, progress),
                None => Ok(()),
            });
            let diagnostic = stderr.map(last_diagnostic_line).unwrap_or_default();
            let forwarded = reader
                .join()
                .unwrap_or_else(|_| Err(io::Error::other("progress reader panicked")));
            (forwarded, diagnostic)
        });

        let status = child
            .wait()
            .map_err(|source| ConversionError::Spawn { program, source })?;

        if !status.success() {
            return Err(ConversionError::BackendExited {
                status,
                source: diagnostic.map(BackendDiagnostic),
            });
        }
        forwarded.map_err(|source| ConversionError::Progress { source })
    }
}

fn forward_progress(stdout: impl Read, progress: &ProgressCallback<'_>) -> io::Result<()> {
    for_each_line(stdout, |line| {
        if let Some(record) = parse_progress_line(line) {
            progress(
                record.phase,
                record.is_indeterminate,
                record.percentage,
                &record.sub_operation,
            );
        }
    })
}

fn last_diagnostic_line(stderr: impl Read) -> Option<String> {
    let mut last = None;
    // A read error ends the diagnostic early; the exit status still decides failure.
    let _ = for_each_line(stderr, |line| {
        let line = line.trim();
        if !line.is_empty() {
            last = Some(line.to_string());
        }
    });
    last
}

/// Feeds every `\n`-terminated line to `f`. Bytes that are not valid UTF-8
/// are replaced rather than ending the stream.
fn for_each_line(reader: impl Read, mut f: impl FnMut(&str)) -> io::Result<()> {
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(());
        }
        f(&String::from_utf8_lossy(&buf));
    }
}
