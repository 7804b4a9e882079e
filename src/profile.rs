//! Per-channel intensity profiles along an edge.

use crate::bucket::VoxelBuckets;
use crate::volume::ChannelVolume;

/// Sum thresholded intensities per bucket position, then max-normalize.
///
/// Values at or below `threshold` contribute nothing. A profile whose raw
/// maximum is zero stays all-zero; otherwise its maximum is exactly 1.0.
pub fn intensity_profile(
    volume: &ChannelVolume,
    buckets: &VoxelBuckets,
    threshold: f32,
) -> Vec<f32> {
    let mut profile = vec![0.0f32; buckets.num_positions()];
    for (i, voxels) in buckets.iter() {
        for &voxel in voxels {
            // Cached buckets are trusted but bounds-checked; a stale entry
            // from a smaller volume must not panic.
            if volume.contains(voxel) {
                profile[i] += volume.thresholded(voxel, threshold);
            }
        }
    }
    normalize_max(&mut profile);
    profile
}

/// Divide by the maximum when it is positive; leave all-zero input alone.
pub(crate) fn normalize_max(values: &mut [f32]) {
    let max = values.iter().fold(0.0f32, |a, &b| a.max(b));
    if max > 0.0 {
        for v in values.iter_mut() {
            *v /= max;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Voxel;

    fn volume_with(values: &[(Voxel, f32)], dims: [usize; 3]) -> ChannelVolume {
        let mut data = vec![0.0f32; dims[0] * dims[1] * dims[2]];
        for &(v, value) in values {
            data[v.z as usize * dims[1] * dims[2] + v.y as usize * dims[2] + v.x as usize] = value;
        }
        ChannelVolume::new(dims, data)
    }

    #[test]
    fn test_profile_sums_and_normalizes() {
        let dims = [2, 2, 4];
        let volume = volume_with(
            &[
                (Voxel::new(0, 0, 0), 2.0),
                (Voxel::new(0, 1, 0), 2.0),
                (Voxel::new(0, 0, 2), 1.0),
            ],
            dims,
        );
        let mut buckets = VoxelBuckets::new(3);
        buckets.push(0, Voxel::new(0, 0, 0));
        buckets.push(0, Voxel::new(0, 1, 0));
        buckets.push(1, Voxel::new(0, 0, 1));
        buckets.push(2, Voxel::new(0, 0, 2));

        let profile = intensity_profile(&volume, &buckets, 0.0);
        // raw sums: [4, 0, 1] -> normalized by 4
        assert_eq!(profile, vec![1.0, 0.0, 0.25]);
    }

    #[test]
    fn test_threshold_zeroes_low_values() {
        let dims = [1, 1, 3];
        let volume = volume_with(
            &[(Voxel::new(0, 0, 0), 0.5), (Voxel::new(0, 0, 1), 3.0)],
            dims,
        );
        let mut buckets = VoxelBuckets::new(2);
        buckets.push(0, Voxel::new(0, 0, 0));
        buckets.push(1, Voxel::new(0, 0, 1));

        let profile = intensity_profile(&volume, &buckets, 1.0);
        assert_eq!(profile, vec![0.0, 1.0]);
    }

    #[test]
    fn test_all_zero_profile_stays_zero() {
        let dims = [1, 1, 2];
        let volume = volume_with(&[], dims);
        let mut buckets = VoxelBuckets::new(2);
        buckets.push(0, Voxel::new(0, 0, 0));
        buckets.push(1, Voxel::new(0, 0, 1));

        let profile = intensity_profile(&volume, &buckets, 0.0);
        assert_eq!(profile, vec![0.0, 0.0]);
    }

    #[test]
    fn test_out_of_bounds_cached_voxels_skipped() {
        let dims = [1, 1, 2];
        let volume = volume_with(&[(Voxel::new(0, 0, 1), 2.0)], dims);
        let mut buckets = VoxelBuckets::new(1);
        buckets.push(0, Voxel::new(0, 0, 1));
        buckets.push(0, Voxel::new(5, 5, 5));

        let profile = intensity_profile(&volume, &buckets, 0.0);
        assert_eq!(profile, vec![1.0]);
    }

    #[test]
    fn test_max_is_exactly_one() {
        let dims = [1, 1, 4];
        let volume = volume_with(
            &[
                (Voxel::new(0, 0, 0), 0.3),
                (Voxel::new(0, 0, 1), 0.7),
                (Voxel::new(0, 0, 2), 0.9),
            ],
            dims,
        );
        let mut buckets = VoxelBuckets::new(3);
        buckets.push(0, Voxel::new(0, 0, 0));
        buckets.push(1, Voxel::new(0, 0, 1));
        buckets.push(2, Voxel::new(0, 0, 2));

        let profile = intensity_profile(&volume, &buckets, 0.0);
        let max = profile.iter().cloned().fold(0.0f32, f32::max);
        assert_eq!(max, 1.0);
    }
}
