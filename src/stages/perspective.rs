//! Pixel to pitch perspective mapping.

use nalgebra::{Matrix3, Point2, SMatrix, SVector, Vector3};
use tracing::info;

use crate::config::PerspectiveConfig;
use crate::error::{Error, Result};
use crate::ledger::TrackLedger;

/// Maps adjusted pixel positions inside the calibrated quadrilateral to pitch meters.
///
/// The homography is solved once from the four reference corners and reused for the
/// whole video; a moving or zooming camera is not recalibrated.
#[derive(Debug, Clone)]
pub struct PerspectiveTransformer {
    homography: Matrix3<f64>,
    quad: [Point2<f64>; 4],
}

impl PerspectiveTransformer {
    pub fn new(config: &PerspectiveConfig) -> Result<Self> {
        let (length, width) = (config.court_length as f64, config.court_width as f64);
        if !(length > 0.0 && width > 0.0) {
            return Err(Error::degenerate(format!(
                "court dimensions must be positive, got {length} x {width}"
            )));
        }

        let quad = config
            .pixel_corners
            .map(|[x, y]| Point2::new(x as f64, y as f64));
        let targets = [
            Point2::new(0.0, width),
            Point2::new(0.0, 0.0),
            Point2::new(length, 0.0),
            Point2::new(length, width),
        ];

        for i in 0..4 {
            let (a, b, c) = (quad[i], quad[(i + 1) % 4], quad[(i + 2) % 4]);
            let cross = (b - a).perp(&(c - a));
            if cross.abs() < 1e-6 {
                return Err(Error::degenerate(format!(
                    "reference corners {i}, {}, {} are collinear",
                    (i + 1) % 4,
                    (i + 2) % 4
                )));
            }
        }

        let homography = solve_homography(&quad, &targets)
            .ok_or_else(|| Error::degenerate("homography system is singular"))?;
        info!(?homography, "perspective calibrated");

        Ok(Self { homography, quad })
    }

    pub fn homography(&self) -> &Matrix3<f64> {
        &self.homography
    }

    /// Whether `point` lies inside the reference quadrilateral (edges included).
    pub fn contains(&self, point: Point2<f32>) -> bool {
        point_in_polygon(&self.quad, Point2::new(point.x as f64, point.y as f64))
    }

    /// Pitch coordinates of `point`, or `None` if it is off the calibrated area.
    pub fn project(&self, point: Point2<f32>) -> Option<Point2<f32>> {
        if !self.contains(point) {
            return None;
        }
        let p = self.homography * Vector3::new(point.x as f64, point.y as f64, 1.0);
        if p.z.abs() < f64::EPSILON {
            return None;
        }
        Some(Point2::new((p.x / p.z) as f32, (p.y / p.z) as f32))
    }

    /// Fill `position_transformed` for every track with an adjusted position.
    pub fn transform_ledger(&self, ledger: &mut TrackLedger) {
        let mut projected = 0usize;
        let mut outside = 0usize;
        for frame in ledger.frames_mut() {
            for track in frame.tracks_mut() {
                track.position_transformed = track.position_adjusted.and_then(|p| self.project(p));
                match track.position_transformed {
                    Some(_) => projected += 1,
                    None => outside += 1,
                }
            }
        }
        info!(projected, outside, "positions mapped to pitch");
    }
}

/// Direct linear transform over four correspondences with `h33` fixed to 1.
fn solve_homography(src: &[Point2<f64>; 4], dst: &[Point2<f64>; 4]) -> Option<Matrix3<f64>> {
    let mut a = SMatrix::<f64, 8, 8>::zeros();
    let mut b = SVector::<f64, 8>::zeros();

    for (i, (s, d)) in src.iter().zip(dst.iter()).enumerate() {
        let (x, y, u, v) = (s.x, s.y, d.x, d.y);
        let r = 2 * i;
        a.row_mut(r)
            .copy_from_slice(&[x, y, 1.0, 0.0, 0.0, 0.0, -u * x, -u * y]);
        a.row_mut(r + 1)
            .copy_from_slice(&[0.0, 0.0, 0.0, x, y, 1.0, -v * x, -v * y]);
        b[r] = u;
        b[r + 1] = v;
    }

    let h = a.lu().solve(&b)?;
    if h.iter().any(|v| !v.is_finite()) {
        return None;
    }
    Some(Matrix3::new(h[0], h[1], h[2], h[3], h[4], h[5], h[6], h[7], 1.0))
}

fn point_in_polygon(poly: &[Point2<f64>], p: Point2<f64>) -> bool {
    let n = poly.len();
    for i in 0..n {
        if on_segment(poly[i], poly[(i + 1) % n], p) {
            return true;
        }
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (pi, pj) = (poly[i], poly[j]);
        if (pi.y > p.y) != (pj.y > p.y) {
            let x_cross = pj.x + (p.y - pj.y) * (pi.x - pj.x) / (pi.y - pj.y);
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

fn on_segment(a: Point2<f64>, b: Point2<f64>, p: Point2<f64>) -> bool {
    let ab = b - a;
    let ap = p - a;
    let len_sq = ab.norm_squared();
    if len_sq == 0.0 {
        return ap.norm() < 1e-6;
    }
    let t = ap.dot(&ab) / len_sq;
    if !(0.0..=1.0).contains(&t) {
        return false;
    }
    (ap - ab * t).norm() < 1e-6
}
