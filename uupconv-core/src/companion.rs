//! Locates the elevated DISM broker that the media creation backend spawns
//! when running as administrator.
//!
//! Depending on how the tools were packaged the broker sits next to the
//! converter, in a subdirectory next to it, or in a subdirectory one level
//! up. The candidates are checked in a fixed order and the first one that
//! exists wins.
use crate::error::CompanionError;
use std::path::{Path, PathBuf};

/// Directory the broker is shipped in, relative to an install root.
pub const HELPER_SUBDIR: &str = "UUPMediaConverterDismBroker";

/// File name of the broker executable. The broker is a Windows binary, so the
/// name carries `.exe` on every host and never collides with [`HELPER_SUBDIR`].
pub const HELPER_FILE_NAME: &str = "UUPMediaConverterDismBroker.exe";

/// Candidate broker locations derived from the converter's own directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompanionLocator {
    own_dir: PathBuf,
    parent_dir: PathBuf,
}

impl CompanionLocator {
    /// Builds a locator around the directory containing `executable`.
    ///
    /// A path without a parent yields an empty directory, so candidates fall
    /// back to being relative to the working directory.
    pub fn from_executable(executable: &Path) -> Self {
        let own_dir = parent_or_empty(executable);
        let parent_dir = parent_or_empty(&own_dir);
        Self { own_dir, parent_dir }
    }

    /// Builds a locator for the currently running executable.
    pub fn for_current_exe() -> Result<Self, CompanionError> {
        let exe = std::env::current_exe().map_err(|source| CompanionError::CurrentExe { source })?;
        Ok(Self::from_executable(&exe))
    }

    pub fn own_dir(&self) -> &Path {
        &self.own_dir
    }

    pub fn parent_dir(&self) -> &Path {
        &self.parent_dir
    }

    /// The three candidate locations, in search order.
    pub fn candidates(&self) -> [PathBuf; 3] {
        [
            self.parent_dir.join(HELPER_SUBDIR).join(HELPER_FILE_NAME),
            self.own_dir.join(HELPER_SUBDIR).join(HELPER_FILE_NAME),
            self.own_dir.join(HELPER_FILE_NAME),
        ]
    }

    /// Returns the first candidate present on disk.
    ///
    /// # Errors
    ///
    /// [`CompanionError::NotFound`] carrying the last candidate checked.
    pub fn resolve(&self) -> Result<PathBuf, CompanionError> {
        let [first, second, last] = self.candidates();
        [first, second, last.clone()]
            .into_iter()
            .find(|candidate| candidate.is_file())
            .ok_or(CompanionError::NotFound { attempted: last })
    }
}

fn parent_or_empty(path: &Path) -> PathBuf {
    path.parent().map(Path::to_path_buf).unwrap_or_default()
}

/// Finds the broker relative to the running executable.
pub fn find_companion() -> Result<PathBuf, CompanionError> {
    CompanionLocator::for_current_exe()?.resolve()
}
