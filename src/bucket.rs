//! Per-position voxel buckets and their persisted encoding.
//!
//! In memory each position along an edge holds a growable voxel list, so
//! assignment can never overflow. The persisted format is a fixed-capacity
//! `i32` array (`radius² × 10` slots per position, unused slots filled with
//! the `-1` sentinel); exceeding that capacity at encode time is a reported
//! error, never a truncation.

use crate::error::EngineError;
use crate::types::{EdgeId, Voxel};

/// Slots per position in the persisted format, as a multiple of `radius²`.
pub const CAPACITY_FACTOR: usize = 10;

/// Sentinel coordinate marking an unused slot in the encoded format.
pub const SLOT_SENTINEL: i32 = -1;

/// Fixed per-position slot count for a given radius.
#[inline]
pub fn bucket_capacity(radius: f32) -> usize {
    ((radius * radius).ceil() as usize) * CAPACITY_FACTOR
}

/// Voxels grouped by their nearest sample position along one edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoxelBuckets {
    positions: Vec<Vec<Voxel>>,
}

impl VoxelBuckets {
    /// Create empty buckets for `num_positions` samples.
    pub fn new(num_positions: usize) -> Self {
        Self {
            positions: vec![Vec::new(); num_positions],
        }
    }

    #[inline]
    pub fn num_positions(&self) -> usize {
        self.positions.len()
    }

    /// Append a voxel to the bucket at `position`.
    #[inline]
    pub fn push(&mut self, position: usize, voxel: Voxel) {
        self.positions[position].push(voxel);
    }

    /// Voxels assigned to one position.
    #[inline]
    pub fn position(&self, index: usize) -> &[Voxel] {
        &self.positions[index]
    }

    /// Iterate `(position, voxels)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[Voxel])> {
        self.positions.iter().enumerate().map(|(i, v)| (i, v.as_slice()))
    }

    /// Total voxel count across all positions.
    pub fn total_voxels(&self) -> usize {
        self.positions.iter().map(|v| v.len()).sum()
    }

    /// Encode into the fixed-capacity persisted layout.
    ///
    /// `edge` and `radius` identify the bucket in the overflow error.
    pub fn encode(&self, edge: EdgeId, radius: f32) -> Result<EncodedBuckets, EngineError> {
        let capacity = bucket_capacity(radius);
        let mut data = vec![SLOT_SENTINEL; self.positions.len() * capacity * 3];
        for (i, voxels) in self.positions.iter().enumerate() {
            if voxels.len() > capacity {
                return Err(EngineError::BucketOverflow {
                    edge,
                    radius,
                    position: i,
                    count: voxels.len(),
                    capacity,
                });
            }
            for (j, v) in voxels.iter().enumerate() {
                let base = (i * capacity + j) * 3;
                data[base] = v.z;
                data[base + 1] = v.y;
                data[base + 2] = v.x;
            }
        }
        Ok(EncodedBuckets {
            num_positions: self.positions.len(),
            capacity,
            data,
        })
    }
}

/// The persisted bucket layout: `num_positions × capacity` slots of three
/// `i32` coordinates each, filled front-to-back per position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedBuckets {
    pub num_positions: usize,
    pub capacity: usize,
    pub data: Vec<i32>,
}

/// Decode the persisted layout back into growable buckets.
///
/// Slots are read until the first sentinel per position; a stored voxel
/// never has a negative coordinate.
pub fn decode(encoded: &EncodedBuckets) -> VoxelBuckets {
    let mut buckets = VoxelBuckets::new(encoded.num_positions);
    for i in 0..encoded.num_positions {
        for j in 0..encoded.capacity {
            let base = (i * encoded.capacity + j) * 3;
            let z = encoded.data[base];
            if z < 0 {
                break;
            }
            buckets.push(i, Voxel::new(z, encoded.data[base + 1], encoded.data[base + 2]));
        }
    }
    buckets
}
