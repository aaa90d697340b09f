use crate::error::ParseError;
use crate::pipeline::parse::Parser;
use crate::types::track::{FileFormat, LocationPoint, ParsedTrack};
use chrono::{DateTime, Utc};
use quick_xml::events::Event;
use quick_xml::Reader;

pub struct GpxParser;

#[derive(Default)]
struct PendingPoint {
    lat: f64,
    lon: f64,
    altitude: Option<f64>,
    time: Option<DateTime<Utc>>,
    speed: Option<f64>,
}

impl PendingPoint {
    fn finish(self) -> Option<LocationPoint> {
        let timestamp = self.time?;
        let point = LocationPoint {
            latitude: self.lat,
            longitude: self.lon,
            altitude: self.altitude.filter(|v| v.is_finite()),
            timestamp,
            accuracy: None,
            speed: self.speed.filter(|v| v.is_finite()),
        };
        point.has_valid_position().then_some(point)
    }
}

impl Parser for GpxParser {
    fn parse(&self, bytes: &[u8]) -> Result<ParsedTrack, ParseError> {
        let mut reader = Reader::from_reader(bytes);
        reader.trim_text(true);

        let mut points = Vec::new();
        let mut skipped = 0usize;
        let mut in_trkpt = false;
        let mut current_point: Option<PendingPoint> = None;
        let mut current_element = String::new();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                    let name = e.name();
                    let name_str = std::str::from_utf8(name.as_ref())
                        .map_err(|e| ParseError::InvalidGpx(e.to_string()))?;

                    if name_str == "trkpt" {
                        in_trkpt = true;
                        let mut lat = None;
                        let mut lon = None;

                        for attr in e.attributes() {
                            let attr = attr.map_err(|e| ParseError::InvalidGpx(e.to_string()))?;
                            let key = std::str::from_utf8(attr.key.as_ref())
                                .map_err(|e| ParseError::InvalidGpx(e.to_string()))?;
                            let value = std::str::from_utf8(&attr.value)
                                .map_err(|e| ParseError::InvalidGpx(e.to_string()))?;

                            match key {
                                "lat" => lat = value.trim().parse().ok(),
                                "lon" => lon = value.trim().parse().ok(),
                                _ => {}
                            }
                        }

                        current_point = match (lat, lon) {
                            (Some(lat), Some(lon)) => Some(PendingPoint {
                                lat,
                                lon,
                                ..PendingPoint::default()
                            }),
                            _ => {
                                skipped += 1;
                                None
                            }
                        };
                    } else if in_trkpt {
                        current_element = name_str.to_string();
                    }
                }
                Ok(Event::Text(e)) => {
                    if in_trkpt {
                        if let Some(point) = current_point.as_mut() {
                            let text = e
                                .unescape()
                                .map_err(|e| ParseError::InvalidGpx(e.to_string()))?;

                            match current_element.as_str() {
                                "ele" => point.altitude = text.parse().ok(),
                                "time" => point.time = text.parse::<DateTime<Utc>>().ok(),
                                "speed" | "gpxtpx:speed" => point.speed = text.parse().ok(),
                                _ => {}
                            }
                        }
                    }
                }
                Ok(Event::End(e)) => {
                    let name = e.name();
                    let name_str = std::str::from_utf8(name.as_ref())
                        .map_err(|e| ParseError::InvalidGpx(e.to_string()))?;

                    if name_str == "trkpt" {
                        if let Some(pending) = current_point.take() {
                            match pending.finish() {
                                Some(point) => points.push(point),
                                None => skipped += 1,
                            }
                        }
                        in_trkpt = false;
                    }
                    current_element.clear();
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(ParseError::InvalidGpx(e.to_string())),
                _ => {}
            }
            buf.clear();
        }

        if skipped > 0 {
            tracing::debug!("Skipped {} GPX track points without a valid position or time", skipped);
        }

        if points.is_empty() {
            return Err(ParseError::EmptyFile);
        }

        Ok(ParsedTrack {
            points,
            file_format: FileFormat::Gpx,
        })
    }
}
