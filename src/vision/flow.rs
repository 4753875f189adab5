//! Pyramidal Lucas-Kanade sparse optical flow.

use nalgebra::{Point2, Vector2};

use crate::vision::image::{GrayImage, Pyramid};

/// Outcome of a single Lucas-Kanade solve at one pyramid level.
enum LkStep {
    Converged(Vector2<f32>),
    MaxIter(Vector2<f32>),
    Singular,
}

/// Sparse point tracker between two frames.
///
/// Each point is tracked coarse-to-fine; the displacement found at a level seeds the
/// next finer level, doubled.
#[derive(Debug, Clone)]
pub struct LucasKanade {
    /// Patch side in pixels at full resolution
    pub window_size: usize,
    pub max_iterations: usize,
    /// Convergence threshold in pixels
    pub epsilon: f32,
}

impl LucasKanade {
    pub fn new(window_size: usize, max_iterations: usize, epsilon: f32) -> Self {
        Self {
            window_size,
            max_iterations,
            epsilon,
        }
    }

    /// Track `points` from `prev` into `curr`.
    ///
    /// Returns one entry per input point: the new position, or `None` if the patch was
    /// textureless or the point left the image.
    pub fn track(
        &self,
        prev: &Pyramid,
        curr: &Pyramid,
        points: &[Point2<f32>],
    ) -> Vec<Option<Point2<f32>>> {
        let levels = prev.num_levels().min(curr.num_levels());
        points
            .iter()
            .map(|point| self.track_point(prev, curr, *point, levels))
            .collect()
    }

    fn track_point(
        &self,
        prev: &Pyramid,
        curr: &Pyramid,
        point: Point2<f32>,
        levels: usize,
    ) -> Option<Point2<f32>> {
        if levels == 0 {
            return None;
        }
        let mut guess = Vector2::zeros();

        for level in (0..levels).rev() {
            let scale = 1.0 / (1u32 << level) as f32;
            let at = point * scale;
            match self.solve(&prev.levels[level], &curr.levels[level], at, guess) {
                LkStep::Converged(d) | LkStep::MaxIter(d) => guess = d,
                LkStep::Singular => return None,
            }
            if level > 0 {
                guess *= 2.0;
            }
        }

        let tracked = point + guess;
        let base = &curr.levels[0];
        let inside = tracked.x >= 0.0
            && tracked.y >= 0.0
            && tracked.x < base.width() as f32
            && tracked.y < base.height() as f32;
        inside.then_some(tracked)
    }

    /// Forward-additive Gauss-Newton iterations at one level.
    fn solve(
        &self,
        prev: &GrayImage,
        curr: &GrayImage,
        at: Point2<f32>,
        mut d: Vector2<f32>,
    ) -> LkStep {
        let half = (self.window_size / 2) as isize;

        for _ in 0..self.max_iterations {
            let (mut h00, mut h01, mut h11) = (0.0f32, 0.0f32, 0.0f32);
            let (mut b0, mut b1) = (0.0f32, 0.0f32);

            for py in -half..=half {
                for px in -half..=half {
                    let (tx, ty) = (at.x + px as f32, at.y + py as f32);
                    let (wx, wy) = (tx + d.x, ty + d.y);

                    let err = prev.sample(tx, ty) - curr.sample(wx, wy);
                    let gx = 0.5 * (curr.sample(wx + 1.0, wy) - curr.sample(wx - 1.0, wy));
                    let gy = 0.5 * (curr.sample(wx, wy + 1.0) - curr.sample(wx, wy - 1.0));

                    h00 += gx * gx;
                    h01 += gx * gy;
                    h11 += gy * gy;
                    b0 += gx * err;
                    b1 += gy * err;
                }
            }

            let det = h00 * h11 - h01 * h01;
            if det.abs() < 1e-6 {
                return LkStep::Singular;
            }
            let step = Vector2::new(h11 * b0 - h01 * b1, h00 * b1 - h01 * b0) / det;
            d += step;

            if step.norm_squared() < self.epsilon * self.epsilon {
                return LkStep::Converged(d);
            }
        }

        LkStep::MaxIter(d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    /// Smooth blob pattern, shifted by `(sx, sy)`.
    fn blobs(sx: f32, sy: f32) -> GrayImage {
        GrayImage::new(Array2::from_shape_fn((64, 64), |(y, x)| {
            let (fx, fy) = (x as f32 - sx, y as f32 - sy);
            128.0 + 60.0 * (fx * 0.35).sin() * (fy * 0.3).cos()
        }))
    }

    #[test]
    fn test_stationary_points() {
        let prev = Pyramid::build(blobs(0.0, 0.0), 1);
        let curr = Pyramid::build(blobs(0.0, 0.0), 1);
        let lk = LucasKanade::new(15, 10, 0.03);
        let tracked = lk.track(&prev, &curr, &[Point2::new(32.0, 32.0)]);
        let p = tracked[0].expect("tracked");
        assert!((p.x - 32.0).abs() < 0.1);
        assert!((p.y - 32.0).abs() < 0.1);
    }

    #[test]
    fn test_translated_points() {
        let prev = Pyramid::build(blobs(0.0, 0.0), 2);
        let curr = Pyramid::build(blobs(2.0, -1.0), 2);
        let lk = LucasKanade::new(15, 20, 0.01);
        let tracked = lk.track(&prev, &curr, &[Point2::new(30.0, 30.0), Point2::new(36.0, 28.0)]);
        for (orig, new) in [(30.0, 30.0), (36.0, 28.0)].iter().zip(tracked) {
            let p = new.expect("tracked");
            assert!((p.x - orig.0 - 2.0).abs() < 0.5, "dx off: {}", p.x - orig.0);
            assert!((p.y - orig.1 + 1.0).abs() < 0.5, "dy off: {}", p.y - orig.1);
        }
    }

    #[test]
    fn test_flat_patch_is_lost() {
        let flat = Pyramid::build(GrayImage::new(Array2::from_elem((32, 32), 50.0)), 1);
        let lk = LucasKanade::new(7, 10, 0.03);
        assert_eq!(lk.track(&flat, &flat, &[Point2::new(16.0, 16.0)]), vec![None]);
    }
}
