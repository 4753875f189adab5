use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ledger::rect::Rect;
use crate::ledger::track::{ObjectClass, Track};

/// Object ID assigned by the upstream tracker.
pub type ObjectId = u32;

/// ID under which the (single) ball is stored.
pub const BALL_ID: ObjectId = 1;

/// Tracks of one class in one frame, ordered by object ID.
pub type TrackMap = BTreeMap<ObjectId, Track>;

/// Raw tracker output for one frame: per class, object ID to bounding box.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameDetections {
    #[serde(default)]
    pub players: BTreeMap<ObjectId, Rect>,
    #[serde(default)]
    pub referees: BTreeMap<ObjectId, Rect>,
    #[serde(default)]
    pub ball: BTreeMap<ObjectId, Rect>,
}

impl FrameDetections {
    pub fn class(&self, class: ObjectClass) -> &BTreeMap<ObjectId, Rect> {
        match class {
            ObjectClass::Player => &self.players,
            ObjectClass::Referee => &self.referees,
            ObjectClass::Ball => &self.ball,
        }
    }

    pub fn class_mut(&mut self, class: ObjectClass) -> &mut BTreeMap<ObjectId, Rect> {
        match class {
            ObjectClass::Player => &mut self.players,
            ObjectClass::Referee => &mut self.referees,
            ObjectClass::Ball => &mut self.ball,
        }
    }
}

/// All tracks of one frame, split by object class.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameTracks {
    #[serde(default)]
    pub players: TrackMap,
    #[serde(default)]
    pub referees: TrackMap,
    #[serde(default)]
    pub ball: TrackMap,
}

impl FrameTracks {
    /// Build tracks from raw detections, deriving each object's anchor point.
    pub fn from_detections(detections: &FrameDetections) -> Self {
        let convert = |class: ObjectClass| -> TrackMap {
            detections
                .class(class)
                .iter()
                .map(|(&id, &bbox)| (id, Track::new(class, bbox)))
                .collect()
        };

        Self {
            players: convert(ObjectClass::Player),
            referees: convert(ObjectClass::Referee),
            ball: convert(ObjectClass::Ball),
        }
    }

    pub fn class(&self, class: ObjectClass) -> &TrackMap {
        match class {
            ObjectClass::Player => &self.players,
            ObjectClass::Referee => &self.referees,
            ObjectClass::Ball => &self.ball,
        }
    }

    pub fn class_mut(&mut self, class: ObjectClass) -> &mut TrackMap {
        match class {
            ObjectClass::Player => &mut self.players,
            ObjectClass::Referee => &mut self.referees,
            ObjectClass::Ball => &mut self.ball,
        }
    }

    /// The ball track, if the frame has one.
    pub fn ball(&self) -> Option<&Track> {
        self.ball.get(&BALL_ID).or_else(|| self.ball.values().next())
    }

    /// Every track in the frame regardless of class.
    pub fn tracks_mut(&mut self) -> impl Iterator<Item = &mut Track> {
        self.players
            .values_mut()
            .chain(self.referees.values_mut())
            .chain(self.ball.values_mut())
    }

    pub fn len(&self) -> usize {
        self.players.len() + self.referees.len() + self.ball.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
