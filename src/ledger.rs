//! Track Ledger: the frame-indexed store every pipeline stage reads and augments.

mod frame;
mod rect;
mod track;

pub use frame::{BALL_ID, FrameDetections, FrameTracks, ObjectId, TrackMap};
pub use rect::Rect;
pub use track::{ObjectClass, Rgb, Team, Track};

use serde::{Deserialize, Serialize};

/// Ordered sequence of frame records. Frame index is the primary axis and is never
/// reordered; stages mutate tracks in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackLedger {
    frames: Vec<FrameTracks>,
}

impl TrackLedger {
    pub fn new(frames: Vec<FrameTracks>) -> Self {
        Self { frames }
    }

    /// Build a ledger from raw per-frame tracker output.
    pub fn from_detections(detections: &[FrameDetections]) -> Self {
        Self::new(detections.iter().map(FrameTracks::from_detections).collect())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    #[inline]
    pub fn frames(&self) -> &[FrameTracks] {
        &self.frames
    }

    #[inline]
    pub fn frames_mut(&mut self) -> &mut [FrameTracks] {
        &mut self.frames
    }

    pub fn frame(&self, index: usize) -> Option<&FrameTracks> {
        self.frames.get(index)
    }

    pub fn frame_mut(&mut self, index: usize) -> Option<&mut FrameTracks> {
        self.frames.get_mut(index)
    }

    /// Track of `id` in class `class` at frame `index`.
    pub fn track(&self, index: usize, class: ObjectClass, id: ObjectId) -> Option<&Track> {
        self.frames.get(index)?.class(class).get(&id)
    }

    /// The per-frame map for one class, in frame order.
    pub fn class_iter(&self, class: ObjectClass) -> impl Iterator<Item = &TrackMap> {
        self.frames.iter().map(move |frame| frame.class(class))
    }

    /// Every distinct ID seen for `class`, ascending.
    pub fn object_ids(&self, class: ObjectClass) -> Vec<ObjectId> {
        let mut ids: Vec<ObjectId> = self
            .class_iter(class)
            .flat_map(|tracks| tracks.keys().copied())
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    pub fn into_frames(self) -> Vec<FrameTracks> {
        self.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detections(players: &[(ObjectId, Rect)], ball: Option<Rect>) -> FrameDetections {
        let mut det = FrameDetections::default();
        det.players.extend(players.iter().copied());
        if let Some(ball) = ball {
            det.ball.insert(BALL_ID, ball);
        }
        det
    }

    #[test]
    fn test_from_detections() {
        let box_a = Rect::from_tlbr(0.0, 0.0, 10.0, 20.0);
        let ledger = TrackLedger::from_detections(&[
            detections(&[(3, box_a)], Some(Rect::from_tlbr(4.0, 4.0, 6.0, 6.0))),
            detections(&[(7, box_a), (3, box_a)], None),
        ]);

        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.object_ids(ObjectClass::Player), vec![3, 7]);
        assert!(ledger.frame(0).unwrap().ball().is_some());
        assert!(ledger.frame(1).unwrap().ball().is_none());

        let track = ledger.track(1, ObjectClass::Player, 7).unwrap();
        assert_eq!(track.position.x, 5.0);
        assert_eq!(track.position.y, 20.0);
        assert!(track.position_adjusted.is_none());
    }

    #[test]
    fn test_frame_len_counts_all_classes() {
        let mut det = detections(&[(1, Rect::default())], Some(Rect::default()));
        det.referees.insert(9, Rect::default());
        let frame = FrameTracks::from_detections(&det);
        assert_eq!(frame.len(), 3);
        assert!(!frame.is_empty());
    }
}
