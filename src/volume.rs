//! Dense per-channel intensity volumes.

use crate::types::{Dims, Voxel};

/// A single channel's intensity volume, stored as a flat `f32` array in
/// `(z, y, x)` row-major order: `data[z * dy * dx + y * dx + x]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelVolume {
    dims: Dims,
    data: Vec<f32>,
}

impl ChannelVolume {
    /// Wrap flat data with its dimensions.
    ///
    /// Panics if `data.len()` does not match the dimensions; the store is
    /// responsible for handing out consistent arrays.
    pub fn new(dims: Dims, data: Vec<f32>) -> Self {
        assert_eq!(
            data.len(),
            dims[0] * dims[1] * dims[2],
            "volume data length does not match dims"
        );
        Self { dims, data }
    }

    #[inline]
    pub fn dims(&self) -> Dims {
        self.dims
    }

    /// Whether a voxel lies inside the volume bounds.
    #[inline]
    pub fn contains(&self, v: Voxel) -> bool {
        v.z >= 0
            && v.y >= 0
            && v.x >= 0
            && (v.z as usize) < self.dims[0]
            && (v.y as usize) < self.dims[1]
            && (v.x as usize) < self.dims[2]
    }

    /// Intensity at a voxel. The caller must ensure the voxel is in bounds.
    #[inline]
    pub fn value(&self, v: Voxel) -> f32 {
        let [_, dy, dx] = self.dims;
        self.data[v.z as usize * dy * dx + v.y as usize * dx + v.x as usize]
    }

    /// Thresholded intensity: the raw value if strictly above `threshold`,
    /// zero otherwise.
    #[inline]
    pub fn thresholded(&self, v: Voxel, threshold: f32) -> f32 {
        let raw = self.value(v);
        if raw > threshold {
            raw
        } else {
            0.0
        }
    }

    /// Thresholded occupancy: 1.0 if strictly above `threshold`, else 0.0.
    #[inline]
    pub fn occupancy(&self, v: Voxel, threshold: f32) -> f32 {
        if self.value(v) > threshold {
            1.0
        } else {
            0.0
        }
    }

    #[inline]
    pub fn data(&self) -> &[f32] {
        &self.data
    }
}
