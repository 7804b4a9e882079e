//! Projection of shape voxels onto discrete positions along an edge.
//!
//! Every voxel in the edge's region of interest is assigned to the nearest
//! of `⌈‖v2−v1‖⌉ + 1` evenly spaced sample points via a k-d tree query. The
//! result is memoized in the store keyed by `(edge id, radius)` and served
//! unchanged on subsequent requests.

use crate::bucket::{self, VoxelBuckets};
use crate::error::EngineError;
use crate::shape::{self, ShapeKind};
use crate::store::VolumeStore;
use crate::types::{Dims, EdgeId, Voxel};
use glam::Vec3;
use kiddo::{ImmutableKdTree, SquaredEuclidean};

/// Evenly spaced sample points along `v1 → v2`, endpoints included.
///
/// One sample per unit of arc length, fencepost inclusive: an edge of
/// length 10 yields 11 positions.
pub fn sample_edge(v1: Vec3, v2: Vec3) -> Vec<Vec3> {
    let vec = v2 - v1;
    let steps = vec.length().ceil() as usize;
    let n = steps + 1;
    (0..n)
        .map(|i| v1 + vec * (i as f32 / steps as f32))
        .collect()
}

/// Assign each voxel to the bucket of its nearest sample point.
pub fn assign_voxels(samples: &[Vec3], voxels: &[Voxel]) -> VoxelBuckets {
    let entries: Vec<[f32; 3]> = samples.iter().map(|p| [p.x, p.y, p.z]).collect();
    let tree = ImmutableKdTree::new_from_slice(&entries);

    let mut buckets = VoxelBuckets::new(samples.len());
    for &voxel in voxels {
        let p = voxel.to_vec3();
        let nearest = tree.nearest_one::<SquaredEuclidean>(&[p.x, p.y, p.z]);
        buckets.push(nearest.item as usize, voxel);
    }
    buckets
}

/// Voxelize the edge region and bucket it by position.
pub fn compute_buckets(
    v1: Vec3,
    v2: Vec3,
    radius: f32,
    dims: Dims,
    kind: ShapeKind,
) -> VoxelBuckets {
    let samples = sample_edge(v1, v2);
    let voxels = shape::voxelize(v1, v2, radius, dims, kind);
    assign_voxels(&samples, &voxels)
}

/// Endpoint positions for a 1-based edge id, validated against the store.
pub(crate) fn edge_endpoints<S: VolumeStore + ?Sized>(
    store: &S,
    edge: EdgeId,
) -> Result<(Vec3, Vec3), EngineError> {
    let edges = store.edges()?;
    if edge == 0 || edge as usize > edges.len() {
        return Err(EngineError::EdgeNotFound(edge));
    }
    let [a, b] = edges[edge as usize - 1];
    let vertices = store.vertices()?;
    let v1 = *vertices
        .get(a as usize)
        .ok_or(EngineError::VertexNotFound(a))?;
    let v2 = *vertices
        .get(b as usize)
        .ok_or(EngineError::VertexNotFound(b))?;
    Ok((v1, v2))
}

/// Fetch the cached bucket for `(edge, radius)` or compute it fresh.
///
/// Never writes; persistence is the caller's decision (interactive requests
/// save only on demand, batch precompute commits after the whole batch).
pub fn edge_buckets<S: VolumeStore + ?Sized>(
    store: &S,
    edge: EdgeId,
    radius: f32,
    kind: ShapeKind,
) -> Result<VoxelBuckets, EngineError> {
    if let Some(encoded) = store.read_bucket(edge, radius)? {
        return Ok(bucket::decode(&encoded));
    }

    let (v1, v2) = edge_endpoints(store, edge)?;
    if v1 == v2 {
        return Err(EngineError::DegenerateEdge { edge });
    }
    let dims = store.dims()?;
    Ok(compute_buckets(v1, v2, radius, dims, kind))
}
