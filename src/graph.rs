//! Proximity graph construction: Delaunay tessellation pruned by the
//! Gabriel criterion.
//!
//! An edge survives only if the sphere whose diameter is the edge contains
//! no third point. The test runs as a nearest-neighbor query against the
//! full point set: the closest point to the edge midpoint must be at least
//! `half_length × 0.999` away (the slack absorbs floating-point noise from
//! the endpoints themselves, which sit exactly at half length).

use crate::delaunay;
use crate::error::EngineError;
use crate::types::Graph;
use glam::Vec3;
use kiddo::{ImmutableKdTree, SquaredEuclidean};
use rustc_hash::FxHashSet;

/// Tolerance factor for the Gabriel midpoint test.
pub const GABRIEL_TOLERANCE: f32 = 0.999;

/// Build the pruned proximity graph over a point set.
///
/// Fails on fewer than 4 points or a degenerate configuration; no partial
/// graph is ever returned.
pub fn build_graph(points: &[Vec3]) -> Result<Graph, EngineError> {
    let tets = delaunay::tetrahedralize(points)?;
    let edges = delaunay_edges(&tets);
    log::debug!(
        "delaunay: {} tetrahedra, {} unique edges over {} points",
        tets.len(),
        edges.len(),
        points.len()
    );

    let kept = gabriel_filter(points, &edges);
    log::debug!("gabriel filter kept {} of {} edges", kept.len(), edges.len());

    Ok(Graph {
        vertices: points.to_vec(),
        edges: kept,
    })
}

/// Unique undirected vertex adjacencies of a tetrahedron list, each pair
/// sorted ascending, in lexicographic order.
pub(crate) fn delaunay_edges(tets: &[[usize; 4]]) -> Vec<[u32; 2]> {
    let mut set: FxHashSet<[u32; 2]> = FxHashSet::default();
    for tet in tets {
        for i in 0..4 {
            for j in (i + 1)..4 {
                let (a, b) = (tet[i] as u32, tet[j] as u32);
                set.insert(if a < b { [a, b] } else { [b, a] });
            }
        }
    }
    let mut edges: Vec<[u32; 2]> = set.into_iter().collect();
    edges.sort_unstable();
    edges
}

/// Keep the edges passing the Gabriel midpoint test.
pub(crate) fn gabriel_filter(points: &[Vec3], edges: &[[u32; 2]]) -> Vec<[u32; 2]> {
    let entries: Vec<[f32; 3]> = points.iter().map(|p| [p.x, p.y, p.z]).collect();
    let tree = ImmutableKdTree::new_from_slice(&entries);

    edges
        .iter()
        .copied()
        .filter(|&[a, b]| {
            let pa = points[a as usize];
            let pb = points[b as usize];
            let mid = (pa + pb) * 0.5;
            let half = pa.distance(pb) * 0.5;
            let nearest = tree.nearest_one::<SquaredEuclidean>(&[mid.x, mid.y, mid.z]);
            nearest.distance.sqrt() >= half * GABRIEL_TOLERANCE
        })
        .collect()
}
