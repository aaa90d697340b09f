use crate::error::ParseError;
use crate::pipeline::parse::Parser;
use crate::types::track::{FileFormat, LocationPoint, ParsedTrack};
use chrono::DateTime;
use fitparser::profile::MesgNum;
use fitparser::Value;

pub struct FitParser;

impl Parser for FitParser {
    fn parse(&self, bytes: &[u8]) -> Result<ParsedTrack, ParseError> {
        let data = fitparser::from_bytes(bytes)
            .map_err(|e| ParseError::InvalidFit(format!("Failed to parse FIT file: {}", e)))?;

        let mut points = Vec::new();
        let mut skipped = 0usize;

        for record in data {
            if record.kind() != MesgNum::Record {
                continue;
            }

            let mut lat = None;
            let mut lon = None;
            let mut altitude = None;
            let mut timestamp = None;
            let mut speed = None;

            for field in record.fields() {
                match field.name() {
                    "position_lat" => {
                        if let Value::SInt32(val) = field.value() {
                            lat = Some(semicircles_to_degrees(*val));
                        }
                    }
                    "position_long" => {
                        if let Value::SInt32(val) = field.value() {
                            lon = Some(semicircles_to_degrees(*val));
                        }
                    }
                    "altitude" | "enhanced_altitude" => {
                        if let Some(val) = as_f64(field.value()) {
                            altitude = Some(val);
                        }
                    }
                    "speed" | "enhanced_speed" => {
                        if let Some(val) = as_f64(field.value()) {
                            speed = Some(val);
                        }
                    }
                    "timestamp" => {
                        if let Value::Timestamp(val) = field.value() {
                            timestamp = DateTime::from_timestamp(val.timestamp(), 0);
                        }
                    }
                    _ => {}
                }
            }

            let (Some(latitude), Some(longitude), Some(timestamp)) = (lat, lon, timestamp) else {
                skipped += 1;
                continue;
            };

            let point = LocationPoint {
                latitude,
                longitude,
                altitude: altitude.filter(|v| v.is_finite()),
                timestamp,
                accuracy: None,
                speed: speed.filter(|v| v.is_finite()),
            };

            if point.has_valid_position() {
                points.push(point);
            } else {
                skipped += 1;
            }
        }

        if skipped > 0 {
            tracing::debug!("Skipped {} FIT records without a valid position or time", skipped);
        }

        if points.is_empty() {
            return Err(ParseError::EmptyFile);
        }

        Ok(ParsedTrack {
            points,
            file_format: FileFormat::Fit,
        })
    }
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Float64(v) => Some(*v),
        Value::Float32(v) => Some(*v as f64),
        Value::UInt16(v) => Some(*v as f64),
        Value::UInt32(v) => Some(*v as f64),
        _ => None,
    }
}

fn semicircles_to_degrees(semicircles: i32) -> f64 {
    (semicircles as f64) * (180.0 / 2_147_483_648.0)
}
