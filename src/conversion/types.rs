use std::fmt;

use crate::conversion::time::ResolvedTime;

/// Assembled TCX document, built and dropped within a single conversion.
#[derive(Debug, Clone)]
pub struct TrainingCenterDatabase {
    pub activity: Activity,
    pub author: Author,
}

/// The one activity a conversion produces.
#[derive(Debug, Clone)]
pub struct Activity {
    pub sport: &'static str,
    pub id: ResolvedTime,
    pub laps: Vec<Lap>,
    pub creator: Option<Creator>,
}

/// A lap with its aggregate statistics and its windowed trackpoints. Fields
/// that were absent in the input stay `None` and are never rendered.
#[derive(Debug, Clone)]
pub struct Lap {
    pub start_time: ResolvedTime,
    pub total_time_seconds: Option<f64>,
    pub distance_meters: Option<f64>,
    pub maximum_speed: Option<f64>,
    pub calories: Option<f64>,
    pub intensity: Option<&'static str>,
    pub cadence: Option<f64>,
    pub trigger_method: &'static str,
    pub track: Vec<Trackpoint>,
}

/// One timestamped sample inside a lap's track.
#[derive(Debug, Clone)]
pub struct Trackpoint {
    pub time: ResolvedTime,
    pub position: Option<Position>,
    pub altitude_meters: Option<f64>,
    pub distance_meters: Option<f64>,
    pub heart_rate_bpm: Option<f64>,
    pub cadence: Option<f64>,
    pub speed: Option<f64>,
}

/// A coordinate pair in degrees. Only ever built when both halves were
/// present in the input.
#[derive(Debug, Clone, Copy)]
pub struct Position {
    pub latitude_degrees: f64,
    pub longitude_degrees: f64,
}

/// Recording device identity, synthesized from the first device_info
/// message.
#[derive(Debug, Clone)]
pub struct Creator {
    pub name: Option<String>,
    pub unit_id: Option<i64>,
    pub product_id: Option<i64>,
    pub version_major: String,
    pub version_minor: String,
}

/// Static identity of this tool, constant per build.
#[derive(Debug, Clone, Copy)]
pub struct Author {
    pub name: &'static str,
    pub lang_id: &'static str,
    pub version_major: &'static str,
    pub version_minor: &'static str,
}

impl Author {
    pub fn fixed() -> Self {
        Self {
            name: "Fit2Tcx",
            lang_id: "en",
            version_major: env!("CARGO_PKG_VERSION_MAJOR"),
            version_minor: env!("CARGO_PKG_VERSION_MINOR"),
        }
    }
}

#[derive(Debug)]
pub enum ConvertError {
    /// Malformed or unsupported FIT bytes; carries the parser's message
    /// verbatim.
    ParseError(String),
    /// Structurally valid input with no session message; nothing to convert.
    NoSessionData,
    /// A timestamp could not be resolved to an absolute instant.
    MissingTimeInformation(String),
    /// The XML writer failed; boundary failure, not a conversion semantic.
    Serialize(String),
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConvertError::ParseError(msg) => write!(f, "Failed to decode FIT file: {msg}"),
            ConvertError::NoSessionData => write!(f, "FIT file contains no session data"),
            ConvertError::MissingTimeInformation(msg) => {
                write!(f, "Missing time information: {msg}")
            }
            ConvertError::Serialize(msg) => write!(f, "Failed to serialize TCX document: {msg}"),
        }
    }
}

impl std::error::Error for ConvertError {}
