//! Shared test doubles: a capturing log sink, a scripted host and a scripted
//! media creation backend.
#![allow(dead_code)]

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use uupconv_core::error::{CompanionError, ConversionError, EnvironmentError};
use uupconv_core::logger::Logger;
use uupconv_core::media::{MediaCreator, MediaRequest, ProcessPhase, ProgressCallback};
use uupconv_core::platform::{PlatformFamily, PlatformInfo};
use uupconv_core::run::Host;

/// A `Write` sink whose contents can be inspected after the fact.
#[derive(Clone, Default)]
pub struct Capture(Arc<Mutex<Vec<u8>>>);

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Capture {
    pub fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }

    pub fn lines(&self) -> Vec<String> {
        self.text().lines().map(str::to_string).collect()
    }

    /// Messages of all records logged at `label` (e.g. `"   Error   "`).
    pub fn messages_at(&self, label: &str) -> Vec<String> {
        let tag = format!("[{label}] ");
        self.lines()
            .iter()
            .filter_map(|line| line.find(&tag).map(|at| line[at + tag.len()..].to_string()))
            .collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.messages_at("   Error   ")
    }

    pub fn warnings(&self) -> Vec<String> {
        self.messages_at("  Warning  ")
    }

    pub fn infos(&self) -> Vec<String> {
        self.messages_at("Information")
    }
}

pub fn capturing_logger() -> (Arc<Logger>, Capture) {
    let capture = Capture::default();
    (Arc::new(Logger::with_writer(capture.clone())), capture)
}

/// Host double that records how often it was consulted.
pub struct ScriptedHost {
    pub platform: Result<PlatformInfo, String>,
    pub companion: Option<PathBuf>,
    pub platform_calls: AtomicUsize,
    pub companion_calls: AtomicUsize,
}

impl ScriptedHost {
    pub fn new(family: PlatformFamily, is_elevated: bool) -> Self {
        Self {
            platform: Ok(PlatformInfo { family, is_elevated }),
            companion: None,
            platform_calls: AtomicUsize::new(0),
            companion_calls: AtomicUsize::new(0),
        }
    }

    pub fn unknown_platform(os: &str) -> Self {
        Self {
            platform: Err(os.to_string()),
            ..Self::new(PlatformFamily::Linux, false)
        }
    }

    pub fn with_companion(mut self, path: impl Into<PathBuf>) -> Self {
        self.companion = Some(path.into());
        self
    }

    pub fn platform_calls(&self) -> usize {
        self.platform_calls.load(Ordering::SeqCst)
    }

    pub fn companion_calls(&self) -> usize {
        self.companion_calls.load(Ordering::SeqCst)
    }
}

impl Host for ScriptedHost {
    fn platform(&self) -> Result<PlatformInfo, EnvironmentError> {
        self.platform_calls.fetch_add(1, Ordering::SeqCst);
        self.platform
            .clone()
            .map_err(|os| EnvironmentError::UnknownPlatform { os })
    }

    fn find_companion(&self) -> Result<PathBuf, CompanionError> {
        self.companion_calls.fetch_add(1, Ordering::SeqCst);
        self.companion.clone().ok_or_else(|| CompanionError::NotFound {
            attempted: PathBuf::from("/opt/uup/UUPMediaConverterDismBroker.exe"),
        })
    }
}

pub type Report = (ProcessPhase, bool, i32, &'static str);

/// Backend double that replays progress from a worker thread, then returns
/// the scripted result.
pub struct ScriptedCreator {
    pub reports: Vec<Report>,
    pub failure: Mutex<Option<ConversionError>>,
    pub requests: Mutex<Vec<MediaRequest>>,
}

impl ScriptedCreator {
    pub fn succeeding(reports: Vec<Report>) -> Self {
        Self {
            reports,
            failure: Mutex::new(None),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(reports: Vec<Report>, failure: ConversionError) -> Self {
        Self {
            failure: Mutex::new(Some(failure)),
            ..Self::succeeding(reports)
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> MediaRequest {
        self.requests.lock().unwrap().last().cloned().unwrap()
    }
}

impl MediaCreator for ScriptedCreator {
    fn create_iso_media(
        &self,
        request: &MediaRequest,
        progress: &ProgressCallback<'_>,
    ) -> Result<(), ConversionError> {
        self.requests.lock().unwrap().push(request.clone());
        thread::scope(|scope| {
            scope.spawn(|| {
                for (phase, indeterminate, percentage, text) in &self.reports {
                    progress(*phase, *indeterminate, *percentage, text);
                }
            });
        });
        match self.failure.lock().unwrap().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
