//! Error types for the analysis engine.

use crate::types::{EdgeId, VertexId};
use std::fmt;

/// Errors that can occur during graph construction or volume analysis.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Not enough points for a 3D Delaunay tessellation.
    /// Need at least 4 points for a non-degenerate result.
    InsufficientPoints(usize),

    /// The point set is degenerate (e.g. all points coplanar) and no
    /// tessellation exists. No partial graph is returned.
    DegenerateInput { message: String },

    /// An edge with coincident endpoints was requested for voxelization.
    DegenerateEdge { edge: EdgeId },

    /// A voxel bucket position received more voxels than the persisted
    /// format's fixed capacity allows.
    BucketOverflow {
        edge: EdgeId,
        radius: f32,
        position: usize,
        count: usize,
        capacity: usize,
    },

    /// Requested channel is absent from the store.
    ChannelNotFound(String),

    /// Requested edge id is absent from the store.
    EdgeNotFound(EdgeId),

    /// Requested vertex id is absent from the store.
    VertexNotFound(VertexId),

    /// Channel and threshold lists have different lengths.
    ThresholdMismatch { channels: usize, thresholds: usize },

    /// Backing store unreachable or corrupt. Fatal for the current
    /// operation; never retried automatically.
    Store(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::InsufficientPoints(n) => {
                write!(f, "insufficient points: need at least 4, got {}", n)
            }
            EngineError::DegenerateInput { message } => {
                write!(f, "degenerate input: {}", message)
            }
            EngineError::DegenerateEdge { edge } => {
                write!(f, "edge {} has coincident endpoints", edge)
            }
            EngineError::BucketOverflow {
                edge,
                radius,
                position,
                count,
                capacity,
            } => {
                write!(
                    f,
                    "bucket overflow on edge {} (radius {}): position {} holds {} voxels, capacity {}",
                    edge, radius, position, count, capacity
                )
            }
            EngineError::ChannelNotFound(name) => {
                write!(f, "channel not found: {}", name)
            }
            EngineError::EdgeNotFound(id) => {
                write!(f, "edge not found: {}", id)
            }
            EngineError::VertexNotFound(id) => {
                write!(f, "vertex not found: {}", id)
            }
            EngineError::ThresholdMismatch {
                channels,
                thresholds,
            } => {
                write!(
                    f,
                    "threshold count mismatch: {} channels, {} thresholds",
                    channels, thresholds
                )
            }
            EngineError::Store(msg) => {
                write!(f, "store access failed: {}", msg)
            }
        }
    }
}

impl std::error::Error for EngineError {}
