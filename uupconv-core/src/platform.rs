//! Host operating system and privilege detection.
//!
//! The family is classified from the compile-time OS identifier. Privilege
//! elevation is a Windows-only concept here: the platform-specific submodule
//! answers the administrator query on Windows, and every other family is
//! treated as never elevated.

#[cfg(windows)]
mod windows;
#[cfg(windows)]
use self::windows as imp;

#[cfg(not(windows))]
mod other;
#[cfg(not(windows))]
use self::other as imp;

use crate::error::EnvironmentError;
use std::fmt;

/// Operating system families the converter knows how to run on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlatformFamily {
    Windows,
    Linux,
    MacOs,
    FreeBsd,
}

/// Identifiers tested in order; the first match wins.
const KNOWN_PLATFORMS: [(&str, PlatformFamily); 4] = [
    ("macos", PlatformFamily::MacOs),
    ("linux", PlatformFamily::Linux),
    ("windows", PlatformFamily::Windows),
    ("freebsd", PlatformFamily::FreeBsd),
];

impl PlatformFamily {
    /// Classifies an OS identifier as reported by [`std::env::consts::OS`].
    ///
    /// There is no fallback family: an identifier outside the known set is an
    /// error.
    pub fn from_os_identifier(os: &str) -> Result<Self, EnvironmentError> {
        KNOWN_PLATFORMS
            .iter()
            .find(|(id, _)| *id == os)
            .map(|(_, family)| *family)
            .ok_or_else(|| EnvironmentError::UnknownPlatform { os: os.to_string() })
    }

    /// Classifies the platform this binary was built for.
    pub fn current() -> Result<Self, EnvironmentError> {
        Self::from_os_identifier(std::env::consts::OS)
    }

    /// Advisory about the host tool needed to author the final ISO, if any.
    pub fn iso_tool_advisory(self) -> Option<&'static str> {
        match self {
            PlatformFamily::MacOs => {
                Some("For successful ISO creation, please install cdrtools via brew")
            }
            PlatformFamily::Linux => {
                Some("For successful ISO creation, please install genisoimage")
            }
            PlatformFamily::Windows | PlatformFamily::FreeBsd => None,
        }
    }
}

impl fmt::Display for PlatformFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PlatformFamily::Windows => "Windows",
            PlatformFamily::Linux => "Linux",
            PlatformFamily::MacOs => "macOS",
            PlatformFamily::FreeBsd => "FreeBSD",
        })
    }
}

/// Result of probing the host once at startup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlatformInfo {
    pub family: PlatformFamily,
    pub is_elevated: bool,
}

impl PlatformInfo {
    /// Detects the running host.
    pub fn detect() -> Result<Self, EnvironmentError> {
        let family = PlatformFamily::current()?;
        Ok(Self::for_family(family, imp::is_process_elevated))
    }

    /// Builds the platform info for `family`, consulting `elevation_query`
    /// only on Windows.
    pub fn for_family(family: PlatformFamily, elevation_query: impl FnOnce() -> bool) -> Self {
        let is_elevated = match family {
            PlatformFamily::Windows => elevation_query(),
            PlatformFamily::Linux | PlatformFamily::MacOs | PlatformFamily::FreeBsd => false,
        };
        Self { family, is_elevated }
    }
}

/// Human-readable OS name and version, when the host reports one.
pub fn os_description() -> Option<String> {
    sysinfo::System::long_os_version()
}
