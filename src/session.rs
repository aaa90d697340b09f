use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::SessionError;
use crate::pipeline::stats::compute_stats;
use crate::types::track::{ActivityStats, LocationPoint};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Paused,
    Stopped,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SessionStatus::Active => "active",
            SessionStatus::Paused => "paused",
            SessionStatus::Stopped => "stopped",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionAction {
    Record,
    Pause,
    Resume,
    Stop,
}

impl fmt::Display for SessionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SessionAction::Record => "record a point on",
            SessionAction::Pause => "pause",
            SessionAction::Resume => "resume",
            SessionAction::Stop => "stop",
        })
    }
}

/// One live activity: the only writer of its point buffer.
///
/// Active time is accumulated per active segment instead of shifting a start
/// timestamp, so pauses never leak into the duration handed to
/// [`compute_stats`].
#[derive(Debug, Clone)]
pub struct TrackingSession {
    status: SessionStatus,
    points: Vec<LocationPoint>,
    started_at: DateTime<Utc>,
    segment_started_at: Option<DateTime<Utc>>,
    active_millis: i64,
}

impl TrackingSession {
    pub fn start(at: DateTime<Utc>) -> Self {
        Self {
            status: SessionStatus::Active,
            points: Vec::new(),
            started_at: at,
            segment_started_at: Some(at),
            active_millis: 0,
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn points(&self) -> &[LocationPoint] {
        &self.points
    }

    pub fn record(&mut self, point: LocationPoint) -> Result<(), SessionError> {
        self.record_all(vec![point]).map(|_| ())
    }

    /// Appends a batch in order. Every point is checked first, so a rejected
    /// point leaves the buffer untouched.
    pub fn record_all(&mut self, points: Vec<LocationPoint>) -> Result<usize, SessionError> {
        self.require(SessionStatus::Active, SessionAction::Record)?;

        let mut last = self.points.last().map(|p| p.timestamp);
        for point in &points {
            if !point.has_valid_position() {
                return Err(SessionError::InvalidPoint {
                    latitude: point.latitude,
                    longitude: point.longitude,
                });
            }
            if let Some(last) = last {
                if point.timestamp < last {
                    return Err(SessionError::OutOfOrder {
                        last: last.to_rfc3339(),
                        got: point.timestamp.to_rfc3339(),
                    });
                }
            }
            last = Some(point.timestamp);
        }

        let count = points.len();
        self.points.extend(points);
        Ok(count)
    }

    pub fn pause(&mut self, at: DateTime<Utc>) -> Result<(), SessionError> {
        self.require(SessionStatus::Active, SessionAction::Pause)?;
        self.close_segment(at);
        self.status = SessionStatus::Paused;
        Ok(())
    }

    pub fn resume(&mut self, at: DateTime<Utc>) -> Result<(), SessionError> {
        self.require(SessionStatus::Paused, SessionAction::Resume)?;
        self.segment_started_at = Some(at);
        self.status = SessionStatus::Active;
        Ok(())
    }

    /// Ends the session and returns the final summary.
    pub fn stop(&mut self, at: DateTime<Utc>) -> Result<ActivityStats, SessionError> {
        if self.status == SessionStatus::Stopped {
            return Err(SessionError::InvalidTransition {
                from: self.status,
                action: SessionAction::Stop,
            });
        }
        self.close_segment(at);
        self.status = SessionStatus::Stopped;
        Ok(compute_stats(&self.points, self.active_seconds(at)))
    }

    /// Seconds spent active so far, including the open segment.
    pub fn active_seconds(&self, now: DateTime<Utc>) -> f64 {
        let open = self
            .segment_started_at
            .map(|start| elapsed_millis(start, now))
            .unwrap_or(0);
        (self.active_millis + open) as f64 / 1000.0
    }

    pub fn live_stats(&self, now: DateTime<Utc>) -> ActivityStats {
        compute_stats(&self.points, self.active_seconds(now))
    }

    /// Hands the buffer to the caller once the session has stopped.
    pub fn into_points(self) -> Vec<LocationPoint> {
        self.points
    }

    fn close_segment(&mut self, at: DateTime<Utc>) {
        if let Some(start) = self.segment_started_at.take() {
            self.active_millis += elapsed_millis(start, at);
        }
    }

    fn require(&self, expected: SessionStatus, action: SessionAction) -> Result<(), SessionError> {
        if self.status == expected {
            Ok(())
        } else {
            Err(SessionError::InvalidTransition {
                from: self.status,
                action,
            })
        }
    }
}

// Clock skew backwards counts as no time.
fn elapsed_millis(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    (to - from).num_milliseconds().max(0)
}
