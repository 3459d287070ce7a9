//! The contract between the converter and a media creation backend.
//!
//! A backend turns a UUP file set into an ISO image. It is a long-running,
//! blocking call that reports progress through a [`ProgressCallback`], which
//! it may invoke from any thread.
use crate::error::ConversionError;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

/// Named stages of the media creation pipeline, in pipeline order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProcessPhase {
    #[default]
    ReadingMetadata,
    PreparingFiles,
    CreatingWindowsInstaller,
    ApplyingImage,
    IntegratingWinRE,
    CapturingImage,
    CreatingISO,
    Done,
    /// Terminal failure reported through the callback instead of a return value.
    Error,
}

impl ProcessPhase {
    pub const ALL: [ProcessPhase; 9] = [
        ProcessPhase::ReadingMetadata,
        ProcessPhase::PreparingFiles,
        ProcessPhase::CreatingWindowsInstaller,
        ProcessPhase::ApplyingImage,
        ProcessPhase::IntegratingWinRE,
        ProcessPhase::CapturingImage,
        ProcessPhase::CreatingISO,
        ProcessPhase::Done,
        ProcessPhase::Error,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ProcessPhase::ReadingMetadata => "ReadingMetadata",
            ProcessPhase::PreparingFiles => "PreparingFiles",
            ProcessPhase::CreatingWindowsInstaller => "CreatingWindowsInstaller",
            ProcessPhase::ApplyingImage => "ApplyingImage",
            ProcessPhase::IntegratingWinRE => "IntegratingWinRE",
            ProcessPhase::CapturingImage => "CapturingImage",
            ProcessPhase::CreatingISO => "CreatingISO",
            ProcessPhase::Done => "Done",
            ProcessPhase::Error => "Error",
        }
    }

    pub fn is_error(self) -> bool {
        self == ProcessPhase::Error
    }
}

impl fmt::Display for ProcessPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A phase name that is not part of the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown process phase `{0}`")]
pub struct UnknownPhase(pub String);

impl FromStr for ProcessPhase {
    type Err = UnknownPhase;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|phase| phase.name() == s)
            .ok_or_else(|| UnknownPhase(s.to_string()))
    }
}

/// WIM compression used for the install image.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CompressionType {
    Xpress,
    #[default]
    Lzx,
    Lzms,
}

impl CompressionType {
    pub fn as_arg(self) -> &'static str {
        match self {
            CompressionType::Xpress => "xpress",
            CompressionType::Lzx => "lzx",
            CompressionType::Lzms => "lzms",
        }
    }
}

/// Callback receiving `(phase, is_indeterminate, percentage, sub_operation)`.
///
/// The callback may borrow from the caller for `'a`.
pub type ProgressCallback<'a> = dyn Fn(ProcessPhase, bool, i32, &str) + Send + Sync + 'a;

/// Everything a backend needs to build one ISO image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MediaRequest {
    pub destination: PathBuf,
    pub source: PathBuf,
    /// `None` asks for every edition the set can produce.
    pub edition: Option<String>,
    pub language_code: String,
    /// Integrate separately delivered update packages. The converter always
    /// passes `false`.
    pub integrate_updates: bool,
    pub compression: CompressionType,
}

/// A media creation backend.
pub trait MediaCreator {
    /// Builds the ISO described by `request`, blocking until done.
    ///
    /// An `Error` phase delivered through `progress` does not end the call by
    /// itself; the backend is expected to fail the call afterwards.
    fn create_iso_media(
        &self,
        request: &MediaRequest,
        progress: &ProgressCallback<'_>,
    ) -> Result<(), ConversionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reading_metadata_is_the_first_phase() {
        assert_eq!(ProcessPhase::default(), ProcessPhase::ReadingMetadata);
        assert!(ProcessPhase::ALL.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn phase_names_parse_back() {
        for phase in ProcessPhase::ALL {
            assert_eq!(phase.to_string().parse::<ProcessPhase>(), Ok(phase));
        }
        assert_eq!(
            "Unpacking".parse::<ProcessPhase>(),
            Err(UnknownPhase("Unpacking".to_string()))
        );
    }

    struct Replay(Vec<(ProcessPhase, i32)>);

    impl MediaCreator for Replay {
        fn create_iso_media(
            &self,
            _request: &MediaRequest,
            progress: &ProgressCallback<'_>,
        ) -> Result<(), ConversionError> {
            for (phase, percentage) in &self.0 {
                progress(*phase, false, *percentage, "step");
            }
            Ok(())
        }
    }

    #[test]
    fn callback_may_borrow_local_state() {
        let request = MediaRequest {
            destination: PathBuf::from("out.iso"),
            source: PathBuf::from("uup"),
            edition: None,
            language_code: "en-us".to_string(),
            integrate_updates: false,
            compression: CompressionType::Lzx,
        };
        let seen = std::sync::Mutex::new(Vec::new());
        let callback = |phase, _, percentage, _: &str| {
            seen.lock().unwrap().push((phase, percentage));
        };

        Replay(vec![(ProcessPhase::ApplyingImage, 5), (ProcessPhase::Done, 100)])
            .create_iso_media(&request, &callback)
            .unwrap();

        assert_eq!(
            seen.into_inner().unwrap(),
            [(ProcessPhase::ApplyingImage, 5), (ProcessPhase::Done, 100)]
        );
    }

    #[test]
    fn unknown_phase_names_the_input() {
        let err = "Unpacking".parse::<ProcessPhase>().unwrap_err();
        assert_eq!(err.to_string(), "unknown process phase `Unpacking`");
    }

    #[test]
    fn lzx_is_the_default_compression() {
        assert_eq!(CompressionType::default().as_arg(), "lzx");
    }
}
