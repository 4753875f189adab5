//! Per-object, per-frame track record and the small value types it carries.

use std::fmt;

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::ledger::rect::Rect;

/// Object classes reported by the upstream tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectClass {
    Player,
    Referee,
    Ball,
}

impl ObjectClass {
    /// Point that stands for the whole object in position-based stages.
    pub fn anchor(&self, bbox: &Rect) -> Point2<f32> {
        match self {
            ObjectClass::Player | ObjectClass::Referee => bbox.foot(),
            ObjectClass::Ball => bbox.center(),
        }
    }
}

/// One of the two sides on the pitch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Team {
    One,
    Two,
}

impl Team {
    /// Numeric label used in the possession series and persisted records.
    #[inline]
    pub fn label(self) -> u8 {
        match self {
            Team::One => 1,
            Team::Two => 2,
        }
    }

    /// Map a cluster index (0 or 1) to a team, in cluster insertion order.
    #[inline]
    pub fn from_cluster(index: usize) -> Self {
        if index == 0 { Team::One } else { Team::Two }
    }

    pub const ALL: [Team; 2] = [Team::One, Team::Two];
}

impl From<Team> for u8 {
    fn from(team: Team) -> u8 {
        team.label()
    }
}

impl TryFrom<u8> for Team {
    type Error = String;

    fn try_from(label: u8) -> Result<Self, Self::Error> {
        match label {
            1 => Ok(Team::One),
            2 => Ok(Team::Two),
            other => Err(format!("invalid team label {other}")),
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "team {}", self.label())
    }
}

/// RGB color with floating-point channels in `[0, 255]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn from_slice(channels: &[f32]) -> Self {
        match channels {
            [r, g, b, ..] => Self::new(*r, *g, *b),
            _ => Self::default(),
        }
    }

    /// Euclidean distance in RGB space.
    pub fn distance(&self, other: &Rgb) -> f32 {
        let (dr, dg, db) = (self.r - other.r, self.g - other.g, self.b - other.b);
        (dr * dr + dg * dg + db * db).sqrt()
    }

    /// Channels rounded and clamped to bytes.
    pub fn to_u8(&self) -> [u8; 3] {
        let q = |c: f32| c.round().clamp(0.0, 255.0) as u8;
        [q(self.r), q(self.g), q(self.b)]
    }
}

/// State of one tracked object in one frame.
///
/// Every field past `position` is filled in by a pipeline stage; `None` means the
/// stage has not run or had nothing to contribute for this frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Pixel bounding box as reported by the tracker
    pub bbox: Rect,
    /// Representative pixel point (foot for people, center for the ball)
    pub position: Point2<f32>,
    /// `position` with the cumulative camera displacement removed
    pub position_adjusted: Option<Point2<f32>>,
    /// Pitch coordinates in meters; `None` outside the calibrated area
    pub position_transformed: Option<Point2<f32>>,
    /// Windowed speed estimate in km/h
    pub speed: Option<f32>,
    /// Cumulative distance in meters up to this frame
    pub distance: Option<f32>,
    pub team: Option<Team>,
    pub team_color: Option<Rgb>,
    #[serde(default)]
    pub has_ball: bool,
}

impl Track {
    /// Create a fresh track for an object of `class` observed at `bbox`.
    pub fn new(class: ObjectClass, bbox: Rect) -> Self {
        Self {
            bbox,
            position: class.anchor(&bbox),
            position_adjusted: None,
            position_transformed: None,
            speed: None,
            distance: None,
            team: None,
            team_color: None,
            has_ball: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchor_per_class() {
        let bbox = Rect::from_tlbr(0.0, 0.0, 10.0, 20.0);
        assert_eq!(Track::new(ObjectClass::Player, bbox).position, Point2::new(5.0, 20.0));
        assert_eq!(Track::new(ObjectClass::Referee, bbox).position, Point2::new(5.0, 20.0));
        assert_eq!(Track::new(ObjectClass::Ball, bbox).position, Point2::new(5.0, 10.0));
    }

    #[test]
    fn test_team_labels() {
        assert_eq!(Team::One.label(), 1);
        assert_eq!(Team::try_from(2), Ok(Team::Two));
        assert!(Team::try_from(0).is_err());
        assert_eq!(Team::from_cluster(0), Team::One);
        assert_eq!(Team::from_cluster(1), Team::Two);
        assert_eq!(serde_json::to_string(&Team::Two).unwrap(), "2");
    }

    #[test]
    fn test_rgb_distance_and_quantize() {
        let a = Rgb::new(0.0, 0.0, 0.0);
        let b = Rgb::new(3.0, 4.0, 0.0);
        assert_eq!(a.distance(&b), 5.0);
        assert_eq!(Rgb::new(254.6, -3.0, 300.0).to_u8(), [255, 0, 255]);
    }
}
