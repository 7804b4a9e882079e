//! Batch precomputation of cache entries.
//!
//! The `(id, radius)` units are independent, so computation fans out over
//! the rayon pool with read-only store access; results are committed by a
//! single writer only after every worker has succeeded. A failing worker
//! fails the whole batch with nothing written; no partially populated
//! cache is ever visible.

use crate::bucket::EncodedBuckets;
use crate::error::EngineError;
use crate::polarization;
use crate::project;
use crate::shape::ShapeKind;
use crate::store::VolumeStore;
use crate::types::{EdgeId, VertexId};
use rayon::prelude::*;
use std::time::Instant;

/// Compute and persist voxel buckets for every uncached radius of one edge.
///
/// Returns the number of newly written entries.
pub fn precompute_edge_buckets<S: VolumeStore>(
    store: &S,
    edge: EdgeId,
    radii: &[f32],
    kind: ShapeKind,
) -> Result<usize, EngineError> {
    let mut pending = Vec::new();
    for &radius in radii {
        if store.read_bucket(edge, radius)?.is_none() {
            pending.push(radius);
        }
    }
    if pending.is_empty() {
        return Ok(0);
    }

    let start = Instant::now();
    let computed: Vec<(f32, EncodedBuckets)> = pending
        .par_iter()
        .map(|&radius| {
            let buckets = project::edge_buckets(store, edge, radius, kind)?;
            Ok((radius, buckets.encode(edge, radius)?))
        })
        .collect::<Result<_, EngineError>>()?;

    for (radius, encoded) in &computed {
        store.write_bucket(edge, *radius, encoded)?;
    }
    log::debug!(
        "precomputed {} bucket radii for edge {} in {:.3?}",
        computed.len(),
        edge,
        start.elapsed()
    );
    Ok(computed.len())
}

/// Compute and persist angle assignments for every uncached radius of one
/// vertex. Returns the number of newly written entries.
pub fn precompute_polarization<S: VolumeStore>(
    store: &S,
    vertex: VertexId,
    radii: &[f32],
) -> Result<usize, EngineError> {
    let mut pending = Vec::new();
    for &radius in radii {
        if store.read_angles(vertex, radius)?.is_none() {
            pending.push(radius);
        }
    }
    if pending.is_empty() {
        return Ok(0);
    }

    let dims = store.dims()?;
    let vertices = store.vertices()?;
    let center = *vertices
        .get(vertex as usize)
        .ok_or(EngineError::VertexNotFound(vertex))?;

    let start = Instant::now();
    let computed: Vec<(f32, Vec<f32>)> = pending
        .par_iter()
        .map(|&radius| {
            let voxels = polarization::voxels_within_radius(center, radius, dims);
            let angles = polarization::planar_angles(&voxels, center);
            Ok((radius, angles))
        })
        .collect::<Result<_, EngineError>>()?;

    for (radius, angles) in &computed {
        store.write_angles(vertex, *radius, angles)?;
    }
    log::debug!(
        "precomputed {} angle radii for vertex {} in {:.3?}",
        computed.len(),
        vertex,
        start.elapsed()
    );
    Ok(computed.len())
}
