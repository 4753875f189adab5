use ndarray::{Array2, Array3, s};

use crate::ledger::Rect;

/// Decoded RGB video frame, shape `(height, width, 3)`.
pub type FrameImage = Array3<u8>;

/// Single-channel float image, row-major `(height, width)`.
#[derive(Debug, Clone)]
pub struct GrayImage {
    data: Array2<f32>,
}

impl GrayImage {
    pub fn new(data: Array2<f32>) -> Self {
        Self { data }
    }

    /// Convert an RGB frame with ITU-R BT.601 luma weights.
    pub fn from_rgb(frame: &FrameImage) -> Self {
        let (height, width, _) = frame.dim();
        let data = Array2::from_shape_fn((height, width), |(y, x)| {
            0.299 * frame[[y, x, 0]] as f32
                + 0.587 * frame[[y, x, 1]] as f32
                + 0.114 * frame[[y, x, 2]] as f32
        });
        Self { data }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.data.nrows()
    }

    /// Pixel value with coordinates clamped to the border.
    #[inline]
    pub fn get(&self, x: isize, y: isize) -> f32 {
        if self.data.is_empty() {
            return 0.0;
        }
        let cx = x.clamp(0, self.width() as isize - 1) as usize;
        let cy = y.clamp(0, self.height() as isize - 1) as usize;
        self.data[[cy, cx]]
    }

    /// Bilinear sample at a sub-pixel position, clamped to the border.
    pub fn sample(&self, x: f32, y: f32) -> f32 {
        let x0 = x.floor();
        let y0 = y.floor();
        let fx = x - x0;
        let fy = y - y0;
        let (ix, iy) = (x0 as isize, y0 as isize);

        let top = self.get(ix, iy) * (1.0 - fx) + self.get(ix + 1, iy) * fx;
        let bottom = self.get(ix, iy + 1) * (1.0 - fx) + self.get(ix + 1, iy + 1) * fx;
        top * (1.0 - fy) + bottom * fy
    }

    /// Central-difference gradient at an integer pixel.
    #[inline]
    pub fn gradient(&self, x: isize, y: isize) -> (f32, f32) {
        (
            0.5 * (self.get(x + 1, y) - self.get(x - 1, y)),
            0.5 * (self.get(x, y + 1) - self.get(x, y - 1)),
        )
    }

    /// Half-resolution image by 2x2 box averaging.
    pub fn downsample(&self) -> GrayImage {
        let width = (self.width() / 2).max(1);
        let height = (self.height() / 2).max(1);
        let data = Array2::from_shape_fn((height, width), |(y, x)| {
            let (sx, sy) = (2 * x as isize, 2 * y as isize);
            0.25 * (self.get(sx, sy)
                + self.get(sx + 1, sy)
                + self.get(sx, sy + 1)
                + self.get(sx + 1, sy + 1))
        });
        GrayImage { data }
    }
}

/// Coarse-to-fine image pyramid; level 0 is full resolution.
#[derive(Debug, Clone)]
pub struct Pyramid {
    pub levels: Vec<GrayImage>,
}

impl Pyramid {
    pub fn build(base: GrayImage, num_levels: usize) -> Self {
        let mut levels = vec![base];
        while levels.len() < num_levels.max(1) {
            let last = &levels[levels.len() - 1];
            if last.width() < 16 || last.height() < 16 {
                break;
            }
            let next = last.downsample();
            levels.push(next);
        }
        Self { levels }
    }

    #[inline]
    pub fn num_levels(&self) -> usize {
        self.levels.len()
    }
}

/// RGB pixels inside `rect` as an `(n, 3)` float matrix.
///
/// The rectangle is truncated to integer pixels and clamped to the frame; an
/// out-of-frame or degenerate rectangle yields zero rows.
pub fn crop_pixels(frame: &FrameImage, rect: &Rect) -> Array2<f32> {
    let (height, width, _) = frame.dim();
    let clamp = |v: f32, max: usize| (v.max(0.0) as usize).min(max);

    let (x1, x2) = (clamp(rect.x1, width), clamp(rect.x2, width));
    let (y1, y2) = (clamp(rect.y1, height), clamp(rect.y2, height));
    if x2 <= x1 || y2 <= y1 {
        return Array2::zeros((0, 3));
    }

    let region = frame.slice(s![y1..y2, x1..x2, ..]);
    let rows = (y2 - y1) * (x2 - x1);
    let pixels: Vec<f32> = region.iter().map(|&v| v as f32).collect();
    Array2::from_shape_vec((rows, 3), pixels).unwrap_or_else(|_| Array2::zeros((0, 3)))
}
