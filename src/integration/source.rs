//! Trait for detection-and-tracking backends.

use crate::ledger::FrameDetections;
use crate::vision::FrameImage;

/// Trait for detection-and-tracking backends.
///
/// Implement this trait to feed any detector plus multi-object tracker into the
/// analyzer. Identities must stay stable across frames for the whole video.
///
/// # Example
///
/// ```ignore
/// use pitchtrack::{FrameDetections, FrameImage, TrackSource};
///
/// struct MyTracker {
///     // Your model and tracker here
/// }
///
/// impl TrackSource for MyTracker {
///     type Error = std::io::Error;
///
///     fn detect_and_track(&mut self, frame: &FrameImage) -> Result<FrameDetections, Self::Error> {
///         // Run inference and association, return boxes keyed by track ID
///         Ok(FrameDetections::default())
///     }
/// }
/// ```
pub trait TrackSource {
    /// Error type for backend failures.
    type Error;

    /// Detect and associate objects in one frame.
    ///
    /// Called once per frame, in frame order.
    fn detect_and_track(&mut self, frame: &FrameImage) -> Result<FrameDetections, Self::Error>;
}

/// Replays tracker output recorded by an earlier run, one entry per frame.
#[derive(Debug, Clone, Default)]
pub struct RecordedSource {
    frames: std::vec::IntoIter<FrameDetections>,
}

impl RecordedSource {
    pub fn new(frames: Vec<FrameDetections>) -> Self {
        Self {
            frames: frames.into_iter(),
        }
    }

    /// Load recorded tracker output from a JSON array of frame records.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(Self::new(serde_json::from_str(json)?))
    }
}

impl TrackSource for RecordedSource {
    type Error = String;

    fn detect_and_track(&mut self, _frame: &FrameImage) -> Result<FrameDetections, Self::Error> {
        self.frames
            .next()
            .ok_or_else(|| "recording has fewer frames than the video".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Rect;
    use ndarray::Array3;

    #[test]
    fn test_recorded_source_replays_in_order() {
        let json = r#"[
            {"players": {"3": {"x1": 0.0, "y1": 0.0, "x2": 10.0, "y2": 20.0}}},
            {"ball": {"1": {"x1": 5.0, "y1": 5.0, "x2": 7.0, "y2": 7.0}}}
        ]"#;
        let mut source = RecordedSource::from_json(json).unwrap();
        let frame = Array3::zeros((4, 4, 3));

        let first = source.detect_and_track(&frame).unwrap();
        assert_eq!(first.players[&3], Rect::from_tlbr(0.0, 0.0, 10.0, 20.0));
        let second = source.detect_and_track(&frame).unwrap();
        assert!(second.players.is_empty());
        assert_eq!(second.ball.len(), 1);
        assert!(source.detect_and_track(&frame).is_err());
    }
}
