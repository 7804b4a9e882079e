//! Angular intensity distributions around graph vertices.
//!
//! For a vertex, every voxel within a given radius is binned by its planar
//! angle (the depth axis is ignored) into 12 fixed sectors. Sector sums of
//! thresholded occupancy are normalized per vertex and rounded up to the
//! nearest tenth.

use crate::types::{Dims, Voxel};
use crate::volume::ChannelVolume;
use glam::Vec3;

/// Number of angular sectors per vertex.
pub const NUM_SECTORS: usize = 12;

/// Sector width in percent of a full turn.
pub const SECTOR_WIDTH: f32 = 100.0 / NUM_SECTORS as f32;

/// Per-vertex polarization results, aligned by index.
#[derive(Debug, Clone, PartialEq)]
pub struct PolarizationOutput {
    /// Vertex coordinates shifted to a volume-centered frame, as
    /// `(x, y, z)` offsets from the volume midpoint.
    pub centers: Vec<[i32; 3]>,
    /// 12-sector normalized histograms.
    pub histograms: Vec<[f32; NUM_SECTORS]>,
    /// Vertex ids rendered as strings.
    pub vertex_ids: Vec<String>,
}

/// All voxels within Euclidean `radius` of `center`, scanned over the
/// clamped bounding box.
pub fn voxels_within_radius(center: Vec3, radius: f32, dims: Dims) -> Vec<Voxel> {
    let c = [center.x, center.y, center.z];
    let mut lo = [0i32; 3];
    let mut hi = [0i32; 3];
    for axis in 0..3 {
        lo[axis] = (c[axis] - radius).floor().max(0.0) as i32;
        hi[axis] = ((c[axis] + radius).ceil() as i32 + 1).min(dims[axis] as i32);
        hi[axis] = hi[axis].max(lo[axis]);
    }

    let mut voxels = Vec::new();
    for z in lo[0]..hi[0] {
        for y in lo[1]..hi[1] {
            for x in lo[2]..hi[2] {
                let voxel = Voxel::new(z, y, x);
                if voxel.distance(center) <= radius {
                    voxels.push(voxel);
                }
            }
        }
    }
    voxels
}

/// Planar angle of each voxel around `center`, as a percentage of a full
/// turn in `[0, 100)`. The depth axis is ignored.
pub fn planar_angles(voxels: &[Voxel], center: Vec3) -> Vec<f32> {
    use std::f32::consts::TAU;
    voxels
        .iter()
        .map(|v| {
            let dy = v.y as f32 - center.y;
            let dx = v.x as f32 - center.x;
            let angle = dy.atan2(dx);
            (angle / TAU + 0.5) * 100.0
        })
        .collect()
}

/// Accumulate thresholded occupancy into the 12 sectors.
///
/// `angles` must align index-for-index with `voxels` (the cached angle
/// assignment has the same enumeration order as a fresh scan).
pub fn sector_histogram(
    voxels: &[Voxel],
    angles: &[f32],
    volume: &ChannelVolume,
    threshold: f32,
) -> [f32; NUM_SECTORS] {
    let mut sectors = [0.0f32; NUM_SECTORS];
    for (voxel, &angle) in voxels.iter().zip(angles) {
        let sector = ((angle / SECTOR_WIDTH) as usize).min(NUM_SECTORS - 1);
        if volume.contains(*voxel) {
            sectors[sector] += volume.occupancy(*voxel, threshold);
        }
    }
    sectors
}

/// Normalize by the per-vertex maximum (1 when all sectors are empty),
/// rounding each sector up to the nearest tenth.
pub fn normalize_sectors(sectors: &mut [f32; NUM_SECTORS]) {
    let max = sectors.iter().fold(0.0f32, |a, &b| a.max(b));
    let denom = if max > 0.0 { max } else { 1.0 };
    for s in sectors.iter_mut() {
        *s = (*s / denom * 10.0).ceil() / 10.0;
    }
}

/// Shift a vertex into the volume-centered frame, axis order reversed to
/// `(x, y, z)`.
pub fn corrected_center(center: Vec3, dims: Dims) -> [i32; 3] {
    [
        (center.z - dims[2] as f32 * 0.5) as i32,
        (center.y - dims[1] as f32 * 0.5) as i32,
        (center.x - dims[0] as f32 * 0.5) as i32,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voxels_within_radius_ball() {
        let center = Vec3::new(2.0, 2.0, 2.0);
        let voxels = voxels_within_radius(center, 1.0, [5, 5, 5]);
        // unit ball on the integer lattice: center + 6 face neighbors
        assert_eq!(voxels.len(), 7);
        for v in &voxels {
            assert!(v.distance(center) <= 1.0);
        }
    }

    #[test]
    fn test_voxels_clamped_at_border() {
        let voxels = voxels_within_radius(Vec3::new(0.0, 0.0, 0.0), 2.0, [3, 3, 3]);
        for v in &voxels {
            assert!(v.z >= 0 && v.y >= 0 && v.x >= 0);
        }
        assert!(!voxels.is_empty());
    }

    #[test]
    fn test_planar_angle_quadrants() {
        let center = Vec3::new(0.0, 4.0, 4.0);
        let voxels = vec![
            Voxel::new(0, 4, 6), // +x: angle 0 -> 50%
            Voxel::new(0, 6, 4), // +y: angle 90 -> 75%
            Voxel::new(0, 4, 2), // -x: angle 180 -> 100 (wraps to sector 11)
            Voxel::new(0, 2, 4), // -y: angle -90 -> 25%
        ];
        let angles = planar_angles(&voxels, center);
        assert!((angles[0] - 50.0).abs() < 1e-4);
        assert!((angles[1] - 75.0).abs() < 1e-4);
        assert!((angles[2] - 100.0).abs() < 1e-4);
        assert!((angles[3] - 25.0).abs() < 1e-4);
    }

    #[test]
    fn test_normalize_rounds_up_to_tenth() {
        let mut sectors = [0.0f32; NUM_SECTORS];
        sectors[0] = 10.0;
        sectors[1] = 8.0;
        sectors[2] = 1.0;
        normalize_sectors(&mut sectors);
        assert_eq!(sectors[0], 1.0);
        assert_eq!(sectors[1], 0.8);
        // 0.1 exactly: 1/10 rounds up to 0.1
        assert_eq!(sectors[2], 0.1);
        assert_eq!(sectors[3], 0.0);
    }

    #[test]
    fn test_normalize_all_empty_stays_zero() {
        let mut sectors = [0.0f32; NUM_SECTORS];
        normalize_sectors(&mut sectors);
        assert_eq!(sectors, [0.0f32; NUM_SECTORS]);
    }

    #[test]
    fn test_corrected_center_reverses_axes() {
        let center = Vec3::new(10.0, 20.0, 30.0);
        let corrected = corrected_center(center, [20, 40, 60]);
        assert_eq!(corrected, [0, 0, 0]);

        let corrected = corrected_center(Vec3::new(0.0, 0.0, 0.0), [20, 40, 60]);
        assert_eq!(corrected, [-30, -20, -10]);
    }
}
