//! The three overlay demos

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::bounds::NormalizePolicy;
use crate::error::ConfigError;

/// Which overlay is running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Demo {
    /// Helmet glTF rigidly following the face transform
    Helmet,
    /// Holographic computer rotated and zoomed by one hand, with virtual keys
    #[default]
    Computer,
    /// Procedural wireframe city yawed by the hand, dual-hand keyboard trigger
    City,
}

impl Demo {
    pub const ALL: [Demo; 3] = [Demo::Helmet, Demo::Computer, Demo::City];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Helmet => "helmet",
            Self::Computer => "computer",
            Self::City => "city",
        }
    }

    /// Normalization for the demo's glTF asset; the city is generated in place
    pub fn normalize_policy(&self) -> Option<NormalizePolicy> {
        match self {
            Self::Helmet => Some(NormalizePolicy::helmet()),
            Self::Computer => Some(NormalizePolicy::computer()),
            Self::City => None,
        }
    }

    /// Face landmarker for the helmet, hand landmarker otherwise
    pub fn tracks_face(&self) -> bool {
        matches!(self, Self::Helmet)
    }

    /// Maximum hands requested from the hand landmarker
    pub fn num_hands(&self) -> Option<u32> {
        match self {
            Self::Helmet => None,
            Self::Computer => Some(1),
            Self::City => Some(2),
        }
    }

    /// Whether the time/date HUD is shown
    pub fn shows_clock(&self) -> bool {
        !matches!(self, Self::Helmet)
    }
}

impl fmt::Display for Demo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Demo {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Demo::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "demo".to_string(),
                message: format!("unknown demo '{}', expected helmet, computer or city", s),
            })
    }
}
