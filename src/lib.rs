//! Graph-anchored intensity analysis for 3D volumetric marker images.
//!
//! This crate quantifies how marker intensity distributes along and around
//! a spatial graph embedded in a volumetric image (e.g. a cell-connectivity
//! graph over multiplexed microscopy data). It covers:
//!
//! - building a pruned proximity graph from 3D points (Delaunay tessellation
//!   filtered to the Gabriel subgraph),
//! - rasterizing a cylinder or bicone region of interest around each edge,
//! - projecting region voxels onto discrete positions along the edge, with
//!   store-backed memoization,
//! - per-channel normalized intensity profiles along edges,
//! - 12-sector angular ("polarization") histograms around vertices,
//! - ranking and clustering of edges or channels by Wasserstein-1 profile
//!   distance.
//!
//! # Example
//!
//! ```
//! use glam::Vec3;
//! use marker_graph::{Engine, MemoryStore, ProfileRequest};
//!
//! // A 5x5x15 volume with one uniform channel and a single graph edge.
//! let store = MemoryStore::new([5, 5, 15]);
//! store.insert_channel("nuclei", vec![1.0; 5 * 5 * 15]);
//! store.set_graph(
//!     &[Vec3::new(2.0, 2.0, 2.0), Vec3::new(2.0, 2.0, 12.0)],
//!     &[[0, 1]],
//! );
//!
//! let engine = Engine::new(store);
//! let request = ProfileRequest::new(2.0, vec!["nuclei".into()], vec![0.0]);
//! let profiles = engine.edge_profiles(1, &request).unwrap();
//!
//! // One profile per channel, max-normalized to 1.0.
//! assert_eq!(profiles.channels.len(), 1);
//! let max = profiles.channels[0].1.iter().cloned().fold(0.0, f32::max);
//! assert_eq!(max, 1.0);
//! ```
//!
//! Coordinates are `(z, y, x)` voxel-index triples throughout; see
//! [`types`] for the conventions.

pub mod bucket;
pub mod cluster;
pub mod compare;
pub mod engine;
pub mod error;
pub mod graph;
pub mod polarization;
pub mod precompute;
pub mod profile;
pub mod project;
pub mod shape;
pub mod store;
pub mod types;
pub mod validation;
pub mod volume;

// Internal tessellation backend
pub(crate) mod delaunay;

pub use bucket::{EncodedBuckets, VoxelBuckets};
pub use cluster::{ClusterGroup, DbscanConfig};
pub use engine::{EdgeProfiles, Engine, ProfileRequest};
pub use error::EngineError;
pub use graph::build_graph;
pub use polarization::PolarizationOutput;
pub use shape::ShapeKind;
pub use store::{MemoryStore, VolumeStore};
pub use types::{Dims, EdgeId, Graph, VertexId, Voxel};
pub use volume::ChannelVolume;
