mod fit;
mod gpx;

use crate::error::ParseError;
use crate::types::track::{FileFormat, ParsedTrack};

pub trait Parser {
    fn parse(&self, bytes: &[u8]) -> Result<ParsedTrack, ParseError>;
}

pub fn parse(bytes: &[u8], format: FileFormat) -> Result<ParsedTrack, ParseError> {
    let mut parsed = match format {
        FileFormat::Gpx => gpx::GpxParser.parse(bytes)?,
        FileFormat::Fit => fit::FitParser.parse(bytes)?,
    };

    // Devices occasionally write samples out of order; stats assume time order.
    parsed.points.sort_by_key(|p| p.timestamp);

    Ok(parsed)
}
