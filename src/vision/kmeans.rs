//! Deterministic two-cluster k-means.

use ndarray::{Array1, Array2, ArrayView1, Axis};

/// Result of a two-cluster k-means run.
#[derive(Debug, Clone)]
pub struct TwoMeans {
    /// `(2, d)` cluster centers in seed order
    pub centroids: Array2<f32>,
    /// Cluster index for every sample
    pub labels: Vec<usize>,
    pub counts: [usize; 2],
}

impl TwoMeans {
    /// Index of the cluster with fewer members; ties go to cluster 1.
    pub fn minority(&self) -> usize {
        if self.counts[0] < self.counts[1] { 0 } else { 1 }
    }

    /// Index of the centroid nearest to `sample`; ties go to cluster 0.
    pub fn nearest(&self, sample: ArrayView1<f32>) -> usize {
        nearest(&self.centroids, sample)
    }
}

fn sq_dist(a: ArrayView1<f32>, b: ArrayView1<f32>) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}

fn nearest(centroids: &Array2<f32>, sample: ArrayView1<f32>) -> usize {
    let d0 = sq_dist(centroids.row(0), sample);
    let d1 = sq_dist(centroids.row(1), sample);
    if d1 < d0 { 1 } else { 0 }
}

/// Cluster the rows of `samples` into two groups with Lloyd's algorithm.
///
/// Seeds are the first sample and the sample farthest from it, so the same input
/// always yields the same labelling. Returns `None` for an empty sample set.
pub fn two_means(samples: &Array2<f32>, max_iterations: usize) -> Option<TwoMeans> {
    let n = samples.nrows();
    if n == 0 {
        return None;
    }

    let first = samples.row(0);
    let (far_idx, _) = samples
        .outer_iter()
        .enumerate()
        .map(|(i, row)| (i, sq_dist(first, row)))
        .fold((0, 0.0f32), |best, cur| if cur.1 > best.1 { cur } else { best });

    let mut centroids = Array2::zeros((2, samples.ncols()));
    centroids.row_mut(0).assign(&first);
    centroids.row_mut(1).assign(&samples.row(far_idx));

    let mut labels = vec![usize::MAX; n];
    for _ in 0..max_iterations.max(1) {
        let mut changed = false;
        for (i, row) in samples.outer_iter().enumerate() {
            let label = nearest(&centroids, row);
            if labels[i] != label {
                labels[i] = label;
                changed = true;
            }
        }
        if !changed {
            break;
        }

        for k in 0..2 {
            let members: Vec<usize> = (0..n).filter(|&i| labels[i] == k).collect();
            if members.is_empty() {
                continue;
            }
            let mean: Array1<f32> = samples
                .select(Axis(0), &members)
                .mean_axis(Axis(0))
                .unwrap_or_else(|| centroids.row(k).to_owned());
            centroids.row_mut(k).assign(&mean);
        }
    }

    let mut counts = [0usize; 2];
    for &label in &labels {
        counts[label] += 1;
    }

    Some(TwoMeans {
        centroids,
        labels,
        counts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_empty_input() {
        assert!(two_means(&Array2::zeros((0, 3)), 10).is_none());
    }

    #[test]
    fn test_separates_two_groups() {
        let samples = array![
            [250.0, 0.0, 0.0],
            [0.0, 0.0, 240.0],
            [240.0, 10.0, 5.0],
            [10.0, 5.0, 250.0],
            [245.0, 5.0, 0.0],
        ];
        let result = two_means(&samples, 20).unwrap();
        assert_eq!(result.labels, vec![0, 1, 0, 1, 0]);
        assert_eq!(result.counts, [3, 2]);
        assert_eq!(result.minority(), 1);
        assert!((result.centroids[[0, 0]] - 245.0).abs() < 1e-3);
        assert!((result.centroids[[1, 2]] - 245.0).abs() < 1e-3);
    }

    #[test]
    fn test_identical_samples() {
        let samples = Array2::from_elem((4, 3), 7.0);
        let result = two_means(&samples, 10).unwrap();
        assert_eq!(result.counts, [4, 0]);
        assert_eq!(result.minority(), 1);
        assert_eq!(result.centroids.row(1).to_vec(), vec![7.0, 7.0, 7.0]);
    }

    #[test]
    fn test_nearest() {
        let samples = array![[0.0, 0.0, 0.0], [100.0, 100.0, 100.0]];
        let result = two_means(&samples, 5).unwrap();
        assert_eq!(result.nearest(array![90.0, 95.0, 99.0].view()), 1);
        assert_eq!(result.nearest(array![1.0, 2.0, 3.0].view()), 0);
    }
}
