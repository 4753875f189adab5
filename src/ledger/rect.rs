use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Axis-aligned pixel bounding box.
///
/// Stored as TLBR (x1, y1, x2, y2), the format the upstream tracker emits.
/// Conversions from the other two common formats are provided:
/// - TLWH: Top-Left X, Top-Left Y, Width, Height
/// - XYWH: Center X, Center Y, Width, Height
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl Rect {
    /// Create a Rect from TLBR format.
    #[inline]
    pub fn from_tlbr(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Create a Rect from top-left coordinates and dimensions (TLWH format).
    #[inline]
    pub fn from_tlwh(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::from_tlbr(x, y, x + width, y + height)
    }

    /// Create a Rect from center coordinates and dimensions (XYWH format).
    #[inline]
    pub fn from_xywh(cx: f32, cy: f32, width: f32, height: f32) -> Self {
        Self::from_tlbr(
            cx - width / 2.0,
            cy - height / 2.0,
            cx + width / 2.0,
            cy + height / 2.0,
        )
    }

    #[inline]
    pub fn to_tlbr(&self) -> [f32; 4] {
        [self.x1, self.y1, self.x2, self.y2]
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }

    /// Center point of the box.
    #[inline]
    pub fn center(&self) -> Point2<f32> {
        Point2::new((self.x1 + self.x2) / 2.0, (self.y1 + self.y2) / 2.0)
    }

    /// Midpoint of the bottom edge, where a standing person touches the ground.
    #[inline]
    pub fn foot(&self) -> Point2<f32> {
        Point2::new((self.x1 + self.x2) / 2.0, self.y2)
    }

    #[inline]
    pub fn bottom_left(&self) -> Point2<f32> {
        Point2::new(self.x1, self.y2)
    }

    #[inline]
    pub fn bottom_right(&self) -> Point2<f32> {
        Point2::new(self.x2, self.y2)
    }

    /// Upper half of the box, where the jersey is.
    pub fn upper_half(&self) -> Rect {
        Rect::from_tlbr(self.x1, self.y1, self.x2, self.y1 + self.height() / 2.0)
    }

    /// Coordinate-wise linear blend: `t = 0` yields `self`, `t = 1` yields `other`.
    pub fn lerp(&self, other: &Rect, t: f32) -> Rect {
        let mix = |a: f32, b: f32| a + (b - a) * t;
        Rect::from_tlbr(
            mix(self.x1, other.x1),
            mix(self.y1, other.y1),
            mix(self.x2, other.x2),
            mix(self.y2, other.y2),
        )
    }
}
