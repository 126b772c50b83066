//! Session launch parameters.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Screen orientation requested for the session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Orientation {
    /// Whatever the host window does by default
    #[default]
    HostDefault,
    /// Follow the device sensor in all directions
    AutoRotate,
    /// Portrait, either way up
    LockedPortrait,
    /// Landscape, either way up
    LockedLandscape,
}

impl Orientation {
    /// Map a numeric launch code (0..=3). Unknown codes fall back to the
    /// host default.
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => Self::AutoRotate,
            2 => Self::LockedPortrait,
            3 => Self::LockedLandscape,
            _ => Self::HostDefault,
        }
    }
}

impl FromStr for Orientation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "0" | "default" | "host-default" => Ok(Self::HostDefault),
            "1" | "auto" | "auto-rotate" => Ok(Self::AutoRotate),
            "2" | "portrait" | "locked-portrait" => Ok(Self::LockedPortrait),
            "3" | "landscape" | "locked-landscape" => Ok(Self::LockedLandscape),
            other => Err(format!("unknown orientation: {}", other)),
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HostDefault => write!(f, "host-default"),
            Self::AutoRotate => write!(f, "auto-rotate"),
            Self::LockedPortrait => write!(f, "locked-portrait"),
            Self::LockedLandscape => write!(f, "locked-landscape"),
        }
    }
}

/// Parameters fixed at session creation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchParams {
    /// Directory holding the manifest, packaged module and resources
    pub module_root: PathBuf,

    /// Requested orientation
    #[serde(default)]
    pub orientation: Orientation,
}

impl LaunchParams {
    /// Launch a module with the host's default orientation.
    pub fn new(module_root: impl Into<PathBuf>) -> Self {
        Self {
            module_root: module_root.into(),
            orientation: Orientation::HostDefault,
        }
    }

    /// Override the orientation.
    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orientation_codes() {
        assert_eq!(Orientation::from_code(0), Orientation::HostDefault);
        assert_eq!(Orientation::from_code(1), Orientation::AutoRotate);
        assert_eq!(Orientation::from_code(2), Orientation::LockedPortrait);
        assert_eq!(Orientation::from_code(3), Orientation::LockedLandscape);
        assert_eq!(Orientation::from_code(42), Orientation::HostDefault);
    }

    #[test]
    fn test_orientation_parse() {
        assert_eq!("auto".parse::<Orientation>(), Ok(Orientation::AutoRotate));
        assert_eq!(
            "Locked-Landscape".parse::<Orientation>(),
            Ok(Orientation::LockedLandscape)
        );
        assert_eq!("2".parse::<Orientation>(), Ok(Orientation::LockedPortrait));
        assert!("sideways".parse::<Orientation>().is_err());
    }
}
