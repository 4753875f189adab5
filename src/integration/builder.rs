//! Builder for creating FrameDetections from various box formats.

use crate::ledger::{BALL_ID, FrameDetections, ObjectClass, ObjectId, Rect};

/// Box formats accepted by [`FrameDetectionsBuilder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoxFormat {
    /// (x1, y1, x2, y2)
    #[default]
    Tlbr,
    /// (center_x, center_y, width, height)
    Xywh,
    /// (left, top, width, height)
    Tlwh,
}

impl BoxFormat {
    pub fn to_rect(self, b: [f32; 4]) -> Rect {
        match self {
            Self::Tlbr => Rect::from_tlbr(b[0], b[1], b[2], b[3]),
            Self::Xywh => Rect::from_xywh(b[0], b[1], b[2], b[3]),
            Self::Tlwh => Rect::from_tlwh(b[0], b[1], b[2], b[3]),
        }
    }
}

/// Builder for one frame of tracker output.
///
/// ```ignore
/// let frame = FrameDetectionsBuilder::new()
///     .format(BoxFormat::Xywh)
///     .player(7, [120.0, 300.0, 40.0, 90.0])
///     .ball([130.0, 345.0, 8.0, 8.0])
///     .build();
/// ```
#[derive(Debug, Clone, Default)]
pub struct FrameDetectionsBuilder {
    format: BoxFormat,
    detections: FrameDetections,
}

impl FrameDetectionsBuilder {
    /// Create a new builder; boxes default to TLBR.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the format of every box added after this call.
    pub fn format(mut self, format: BoxFormat) -> Self {
        self.format = format;
        self
    }

    /// Add an object of `class` under `id`. A repeated ID replaces the earlier box.
    pub fn object(mut self, class: ObjectClass, id: ObjectId, bbox: [f32; 4]) -> Self {
        self.detections
            .class_mut(class)
            .insert(id, self.format.to_rect(bbox));
        self
    }

    pub fn player(self, id: ObjectId, bbox: [f32; 4]) -> Self {
        self.object(ObjectClass::Player, id, bbox)
    }

    pub fn referee(self, id: ObjectId, bbox: [f32; 4]) -> Self {
        self.object(ObjectClass::Referee, id, bbox)
    }

    /// Set the ball box under [`BALL_ID`].
    pub fn ball(self, bbox: [f32; 4]) -> Self {
        self.object(ObjectClass::Ball, BALL_ID, bbox)
    }

    /// Build the final `FrameDetections`.
    pub fn build(self) -> FrameDetections {
        self.detections
    }
}
