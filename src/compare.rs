//! Distributional distance between intensity profiles.
//!
//! Profiles are compared as empirical distributions of their values with
//! the Wasserstein-1 (earth mover) distance. Candidates of a different
//! length are first resampled to the target length by linear interpolation.

/// Wasserstein-1 distance between two equally weighted sample sets.
///
/// Computed as the integral of the absolute difference between the two
/// empirical CDFs. Returns 0 when either input is empty.
pub fn wasserstein_1d(u: &[f32], v: &[f32]) -> f32 {
    if u.is_empty() || v.is_empty() {
        return 0.0;
    }

    let mut u_sorted = u.to_vec();
    let mut v_sorted = v.to_vec();
    u_sorted.sort_unstable_by(f32::total_cmp);
    v_sorted.sort_unstable_by(f32::total_cmp);

    let mut all: Vec<f32> = Vec::with_capacity(u.len() + v.len());
    all.extend_from_slice(&u_sorted);
    all.extend_from_slice(&v_sorted);
    all.sort_unstable_by(f32::total_cmp);

    // Walk the merged value axis once, tracking both CDFs with cursors.
    let mut distance = 0.0f64;
    let mut ui = 0usize;
    let mut vi = 0usize;
    let nu = u_sorted.len() as f64;
    let nv = v_sorted.len() as f64;
    for pair in all.windows(2) {
        let (value, next) = (pair[0], pair[1]);
        while ui < u_sorted.len() && u_sorted[ui] <= value {
            ui += 1;
        }
        while vi < v_sorted.len() && v_sorted[vi] <= value {
            vi += 1;
        }
        let delta = (next - value) as f64;
        distance += (ui as f64 / nu - vi as f64 / nv).abs() * delta;
    }
    distance as f32
}

/// Resample to `target_len` points by linear interpolation over the index
/// axis, extending the edge slopes past the ends.
pub fn resample_linear(values: &[f32], target_len: usize) -> Vec<f32> {
    if values.is_empty() || target_len == 0 {
        return vec![0.0; target_len];
    }
    if values.len() == 1 {
        return vec![values[0]; target_len];
    }
    if target_len == 1 {
        return vec![values[0]];
    }

    let m = values.len();
    let scale = (m - 1) as f32 / (target_len - 1) as f32;
    (0..target_len)
        .map(|i| {
            let x = i as f32 * scale;
            let j = (x.floor() as usize).min(m - 2);
            let frac = x - j as f32;
            values[j] + (values[j + 1] - values[j]) * frac
        })
        .collect()
}

/// Minimum Wasserstein distance over both edge orientations.
///
/// The candidate is resampled to the target's length; the distance is taken
/// once against the target as-is and once against the target reversed, and
/// the smaller wins (edges may be traversed in either direction).
pub fn oriented_distance(target: &[f32], candidate: &[f32]) -> f32 {
    let resampled = resample_linear(candidate, target.len());
    let forward = wasserstein_1d(target, &resampled);

    let reversed: Vec<f32> = target.iter().rev().copied().collect();
    let backward = wasserstein_1d(&reversed, &resampled);

    forward.min(backward)
}

/// Symmetric pairwise distance matrix with a zero diagonal.
///
/// Profiles must share one length (they come from the same voxel bucket),
/// so no resampling is involved.
pub fn distance_matrix(profiles: &[Vec<f32>]) -> Vec<Vec<f32>> {
    let n = profiles.len();
    let mut matrix = vec![vec![0.0f32; n]; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let d = wasserstein_1d(&profiles[i], &profiles[j]);
            matrix[i][j] = d;
            matrix[j][i] = d;
        }
    }
    matrix
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wasserstein_identical_is_zero() {
        let p = vec![0.0, 0.5, 1.0, 0.5];
        assert_eq!(wasserstein_1d(&p, &p), 0.0);
    }

    #[test]
    fn test_wasserstein_shift() {
        // Point masses at 0 vs at 1: all mass moves distance 1.
        let u = vec![0.0, 0.0];
        let v = vec![1.0, 1.0];
        assert!((wasserstein_1d(&u, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_wasserstein_symmetric() {
        let u = vec![0.1, 0.4, 0.9];
        let v = vec![0.2, 0.3, 1.0];
        let d1 = wasserstein_1d(&u, &v);
        let d2 = wasserstein_1d(&v, &u);
        assert!((d1 - d2).abs() < 1e-7);
        assert!(d1 > 0.0);
    }

    #[test]
    fn test_wasserstein_permutation_invariant() {
        // Sample order carries no information; only the value distribution
        // matters.
        let u = vec![0.9, 0.1, 0.5];
        let shuffled = vec![0.5, 0.9, 0.1];
        assert_eq!(wasserstein_1d(&u, &shuffled), 0.0);
    }

    #[test]
    fn test_wasserstein_unequal_lengths() {
        // {0, 1} vs {0, 0, 1, 1} are the same distribution.
        let u = vec![0.0, 1.0];
        let v = vec![0.0, 0.0, 1.0, 1.0];
        assert!(wasserstein_1d(&u, &v).abs() < 1e-7);
    }

    #[test]
    fn test_resample_identity() {
        let p = vec![0.0, 1.0, 2.0];
        assert_eq!(resample_linear(&p, 3), p);
    }

    #[test]
    fn test_resample_upsamples_linearly() {
        let p = vec![0.0, 2.0];
        assert_eq!(resample_linear(&p, 5), vec![0.0, 0.5, 1.0, 1.5, 2.0]);
    }

    #[test]
    fn test_resample_downsamples_endpoints() {
        let p = vec![0.0, 1.0, 2.0, 3.0, 4.0];
        let r = resample_linear(&p, 3);
        assert_eq!(r, vec![0.0, 2.0, 4.0]);
    }

    #[test]
    fn test_resample_single_value() {
        assert_eq!(resample_linear(&[0.7], 4), vec![0.7; 4]);
    }

    #[test]
    fn test_oriented_distance_reversed_profile_is_zero() {
        let p = vec![0.0, 0.2, 0.8, 1.0];
        let reversed: Vec<f32> = p.iter().rev().copied().collect();
        assert_eq!(oriented_distance(&p, &reversed), 0.0);
    }

    #[test]
    fn test_distance_matrix_symmetric_zero_diagonal() {
        let profiles = vec![
            vec![0.0, 0.5, 1.0],
            vec![1.0, 0.5, 0.0],
            vec![0.2, 0.9, 0.1],
        ];
        let m = distance_matrix(&profiles);
        for i in 0..3 {
            assert_eq!(m[i][i], 0.0);
            for j in 0..3 {
                assert_eq!(m[i][j], m[j][i]);
            }
        }
    }
}
