//! Shi-Tomasi corner detection restricted to vertical column bands.

use nalgebra::Point2;
use ndarray::Array2;

use crate::vision::image::GrayImage;

#[derive(Debug, Clone)]
pub struct CornerParams {
    pub max_corners: usize,
    pub quality_level: f32,
    pub min_distance: f32,
    pub block_size: usize,
}

/// Minimum eigenvalue of the structure tensor summed over a `block_size` window.
fn min_eigen_response(image: &GrayImage, x: isize, y: isize, radius: isize) -> f32 {
    let (mut sxx, mut sxy, mut syy) = (0.0f32, 0.0f32, 0.0f32);
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let (gx, gy) = image.gradient(x + dx, y + dy);
            sxx += gx * gx;
            sxy += gx * gy;
            syy += gy * gy;
        }
    }
    let half_trace = 0.5 * (sxx + syy);
    let half_diff = 0.5 * (sxx - syy);
    half_trace - (half_diff * half_diff + sxy * sxy).sqrt()
}

/// Find strong, well-separated corners whose x coordinate falls in one of `columns`
/// (`[start, end)` pixel ranges).
///
/// Corners are returned strongest first. A corner must be a 3x3 local maximum of the
/// response and exceed `quality_level` times the strongest response found.
pub fn good_features_to_track(
    image: &GrayImage,
    columns: &[[u32; 2]],
    params: &CornerParams,
) -> Vec<Point2<f32>> {
    let (width, height) = (image.width(), image.height());
    let radius = (params.block_size / 2).max(1) as isize;
    let border = radius + 1;
    if width as isize <= 2 * border || height as isize <= 2 * border {
        return Vec::new();
    }

    let mut response = Array2::<f32>::zeros((height, width));
    let mut strongest = 0.0f32;
    let x_range = border as usize..width - border as usize;
    let y_range = border as usize..height - border as usize;

    for &[start, end] in columns {
        let start = (start as usize).max(x_range.start);
        let end = (end as usize).min(x_range.end);
        for y in y_range.clone() {
            for x in start..end {
                let r = min_eigen_response(image, x as isize, y as isize, radius);
                response[[y, x]] = r;
                strongest = strongest.max(r);
            }
        }
    }

    if strongest <= 0.0 {
        return Vec::new();
    }
    let threshold = params.quality_level * strongest;

    let mut candidates = Vec::new();
    for ((y, x), &r) in response.indexed_iter() {
        if r <= 0.0 || r < threshold {
            continue;
        }
        let is_peak = (y.saturating_sub(1)..=(y + 1).min(height - 1)).all(|ny| {
            (x.saturating_sub(1)..=(x + 1).min(width - 1)).all(|nx| response[[ny, nx]] <= r)
        });
        if is_peak {
            candidates.push((r, Point2::new(x as f32, y as f32)));
        }
    }
    candidates.sort_by(|a, b| b.0.total_cmp(&a.0));

    let min_dist_sq = params.min_distance * params.min_distance;
    let mut corners: Vec<Point2<f32>> = Vec::new();
    for (_, point) in candidates {
        if corners.len() >= params.max_corners {
            break;
        }
        if corners
            .iter()
            .all(|c| (c - point).norm_squared() >= min_dist_sq)
        {
            corners.push(point);
        }
    }
    corners
}
