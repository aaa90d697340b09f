use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const EARTH_RADIUS_MILES: f64 = 3959.0;
pub const FEET_PER_METER: f64 = 3.28084;
pub const MPH_PER_MPS: f64 = 2.23694;
pub const CALORIES_PER_MILE: f64 = 100.0;
pub const SECONDS_PER_HOUR: f64 = 3600.0;

/// A single GPS sample as reported by the location provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationPoint {
    pub latitude: f64,
    pub longitude: f64,
    /// Meters above sea level.
    #[serde(default)]
    pub altitude: Option<f64>,
    pub timestamp: DateTime<Utc>,
    /// Horizontal accuracy in meters. Informational only.
    #[serde(default)]
    pub accuracy: Option<f64>,
    /// Instantaneous speed in meters per second.
    #[serde(default)]
    pub speed: Option<f64>,
}

impl LocationPoint {
    pub fn new(latitude: f64, longitude: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            latitude,
            longitude,
            altitude: None,
            timestamp,
            accuracy: None,
            speed: None,
        }
    }

    pub fn with_altitude(mut self, altitude: f64) -> Self {
        self.altitude = Some(altitude);
        self
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = Some(speed);
        self
    }

    /// Finite coordinates inside the WGS84 lat/lon ranges.
    pub fn has_valid_position(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityStats {
    /// Miles.
    pub distance: f64,
    /// Active seconds, supplied by the caller.
    pub duration: f64,
    /// Feet.
    pub elevation_gain: f64,
    /// Feet.
    pub elevation_loss: f64,
    /// Mph.
    pub max_speed: f64,
    /// Mph.
    pub avg_speed: f64,
    pub calories: u64,
    /// Consecutive pairs that both carried altitude.
    pub elevation_segments: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Gpx,
    Fit,
}

impl FileFormat {
    pub fn from_filename(filename: &str) -> Option<Self> {
        let ext = filename.rsplit('.').next()?.to_lowercase();
        match ext.as_str() {
            "gpx" => Some(FileFormat::Gpx),
            "fit" => Some(FileFormat::Fit),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FileFormat::Gpx => "gpx",
            FileFormat::Fit => "fit",
        }
    }
}

/// Points read from an imported track file.
#[derive(Debug, Clone)]
pub struct ParsedTrack {
    pub points: Vec<LocationPoint>,
    pub file_format: FileFormat,
}

impl ParsedTrack {
    /// Seconds between the first and last sample.
    pub fn recorded_seconds(&self) -> f64 {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => {
                let millis = (last.timestamp - first.timestamp).num_milliseconds().max(0);
                millis as f64 / 1000.0
            }
            _ => 0.0,
        }
    }
}

/// A completed activity kept for history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub stats: ActivityStats,
    pub points: Vec<LocationPoint>,
    pub completed_at: DateTime<Utc>,
}
