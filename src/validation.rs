//! Structural validation for proximity graphs.
//!
//! Verifies the invariants a well-formed graph must satisfy: in-range
//! endpoint ids, no self-loops, no duplicate unordered pairs, and the
//! Gabriel midpoint property. Useful for debugging and for catching
//! corrupted graph data read back from a store.

use crate::graph::GABRIEL_TOLERANCE;
use crate::types::Graph;
use rustc_hash::FxHashSet;
use std::fmt;

/// Detailed validation report for a proximity graph.
#[derive(Debug, Clone)]
pub struct GraphReport {
    pub num_vertices: usize,
    pub num_edges: usize,

    /// Edges whose endpoints are the same vertex.
    pub self_loops: usize,
    /// Unordered pairs occurring more than once.
    pub duplicate_edges: usize,
    /// Endpoint ids outside the vertex list.
    pub out_of_range: usize,
    /// Edges whose diameter sphere contains a third point closer than the
    /// tolerance allows.
    pub gabriel_violations: usize,
    /// Vertices on no edge. Not an error (sparse regions can prune all
    /// their edges) but worth surfacing.
    pub isolated_vertices: usize,
}

impl GraphReport {
    /// True when no structural issue was found.
    pub fn is_valid(&self) -> bool {
        self.self_loops == 0
            && self.duplicate_edges == 0
            && self.out_of_range == 0
            && self.gabriel_violations == 0
    }

    /// Format a summary of any issues found.
    pub fn summary(&self) -> String {
        let mut issues = Vec::new();
        if self.self_loops > 0 {
            issues.push(format!("{} self-loops", self.self_loops));
        }
        if self.duplicate_edges > 0 {
            issues.push(format!("{} duplicate edges", self.duplicate_edges));
        }
        if self.out_of_range > 0 {
            issues.push(format!("{} out-of-range endpoints", self.out_of_range));
        }
        if self.gabriel_violations > 0 {
            issues.push(format!("{} gabriel violations", self.gabriel_violations));
        }
        if issues.is_empty() {
            "ok".to_string()
        } else {
            issues.join(", ")
        }
    }
}

impl fmt::Display for GraphReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "GraphReport {{ V={}, E={}, isolated={}, {} }}",
            self.num_vertices,
            self.num_edges,
            self.isolated_vertices,
            self.summary()
        )
    }
}

/// Validate a graph's structure by brute force.
pub fn validate(graph: &Graph) -> GraphReport {
    let num_vertices = graph.num_vertices();
    let num_edges = graph.num_edges();

    let mut self_loops = 0usize;
    let mut duplicate_edges = 0usize;
    let mut out_of_range = 0usize;
    let mut gabriel_violations = 0usize;
    let mut seen: FxHashSet<[u32; 2]> = FxHashSet::default();
    let mut touched = vec![false; num_vertices];

    for &[a, b] in &graph.edges {
        if a == b {
            self_loops += 1;
        }
        let pair = if a < b { [a, b] } else { [b, a] };
        if !seen.insert(pair) {
            duplicate_edges += 1;
        }
        if (a as usize) >= num_vertices || (b as usize) >= num_vertices {
            out_of_range += 1;
            continue;
        }
        touched[a as usize] = true;
        touched[b as usize] = true;

        let pa = graph.vertices[a as usize];
        let pb = graph.vertices[b as usize];
        let mid = (pa + pb) * 0.5;
        let half = pa.distance(pb) * 0.5;
        let blocked = graph
            .vertices
            .iter()
            .any(|p| p.distance(mid) < half * GABRIEL_TOLERANCE);
        if blocked {
            gabriel_violations += 1;
        }
    }

    let isolated_vertices = touched.iter().filter(|&&t| !t).count();

    GraphReport {
        num_vertices,
        num_edges,
        self_loops,
        duplicate_edges,
        out_of_range,
        gabriel_violations,
        isolated_vertices,
    }
}
