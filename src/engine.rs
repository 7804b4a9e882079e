//! Engine facade: the operations exposed to the request layer.
//!
//! One engine wraps one backing store. Every operation is self-contained:
//! reads go through the store and nothing is retained between calls, so a
//! thin request layer can hold a single engine per volume.

use crate::cluster::{self, ClusterGroup, DbscanConfig};
use crate::compare;
use crate::error::EngineError;
use crate::graph;
use crate::polarization::{self, PolarizationOutput};
use crate::precompute;
use crate::profile;
use crate::project;
use crate::shape::ShapeKind;
use crate::store::VolumeStore;
use crate::types::{EdgeId, Graph, VertexId};
use crate::validation;
use glam::Vec3;

/// Parameters shared by the profile-producing operations.
///
/// `thresholds` aligns with `channels` by index. With `save` set, a freshly
/// computed voxel bucket is persisted before profiling.
#[derive(Debug, Clone)]
pub struct ProfileRequest {
    pub radius: f32,
    pub channels: Vec<String>,
    pub thresholds: Vec<f32>,
    pub shape: ShapeKind,
    pub save: bool,
}

impl ProfileRequest {
    pub fn new(radius: f32, channels: Vec<String>, thresholds: Vec<f32>) -> Self {
        Self {
            radius,
            channels,
            thresholds,
            shape: ShapeKind::default(),
            save: false,
        }
    }

    fn validate(&self) -> Result<(), EngineError> {
        if self.channels.len() != self.thresholds.len() {
            return Err(EngineError::ThresholdMismatch {
                channels: self.channels.len(),
                thresholds: self.thresholds.len(),
            });
        }
        Ok(())
    }
}

/// Normalized profiles for one edge, in request order.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeProfiles {
    pub edge: EdgeId,
    pub channels: Vec<(String, Vec<f32>)>,
}

/// Analysis engine over a backing volume store.
pub struct Engine<S> {
    store: S,
}

impl<S: VolumeStore> Engine<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Build the proximity graph from a point set and persist it, clearing
    /// the intensity cache group.
    pub fn build_graph_from_points(&self, points: &[Vec3]) -> Result<Graph, EngineError> {
        let graph = graph::build_graph(points)?;
        log::debug!("graph rebuilt: {}", validation::validate(&graph));
        self.store.replace_graph(&graph.vertices, &graph.edges)?;
        Ok(graph)
    }

    /// Add and remove vertex points, then rebuild the graph wholesale.
    ///
    /// Removal matches exact coordinates; the first matching vertex per
    /// requested point is dropped. Unmatched removals are ignored.
    pub fn edit_graph(&self, added: &[Vec3], removed: &[Vec3]) -> Result<Graph, EngineError> {
        let mut points = self.store.vertices()?;
        points.extend_from_slice(added);
        for target in removed {
            if let Some(i) = points.iter().position(|p| p == target) {
                points.remove(i);
            }
        }
        self.build_graph_from_points(&points)
    }

    /// Channel names available in the store.
    pub fn channel_names(&self) -> Result<Vec<String>, EngineError> {
        self.store.channel_names()
    }

    /// Normalized intensity profiles along one edge, one per requested
    /// channel. All channels share a single voxel bucket computation.
    pub fn edge_profiles(
        &self,
        edge: EdgeId,
        request: &ProfileRequest,
    ) -> Result<EdgeProfiles, EngineError> {
        request.validate()?;
        let buckets = project::edge_buckets(&self.store, edge, request.radius, request.shape)?;
        if request.save && self.store.read_bucket(edge, request.radius)?.is_none() {
            let encoded = buckets.encode(edge, request.radius)?;
            self.store.write_bucket(edge, request.radius, &encoded)?;
        }

        let mut channels = Vec::with_capacity(request.channels.len());
        for (name, &threshold) in request.channels.iter().zip(&request.thresholds) {
            let volume = self.store.channel(name)?;
            let profile = profile::intensity_profile(&volume, &buckets, threshold);
            channels.push((name.clone(), profile));
        }
        Ok(EdgeProfiles { edge, channels })
    }

    /// Profiles for every edge in the store, by ascending edge id.
    pub fn all_edge_profiles(
        &self,
        request: &ProfileRequest,
    ) -> Result<Vec<EdgeProfiles>, EngineError> {
        let num_edges = self.store.edges()?.len() as EdgeId;
        (1..=num_edges)
            .map(|edge| self.edge_profiles(edge, request))
            .collect()
    }

    /// Rank candidate edges by profile similarity to a target edge.
    ///
    /// Per candidate, the orientation-minimal Wasserstein distance is summed
    /// across all requested channels; the result is the candidate ids in
    /// ascending total distance, ties keeping input order. `None` candidates
    /// means every edge in the store.
    pub fn rank_edges(
        &self,
        target: EdgeId,
        candidates: Option<&[EdgeId]>,
        request: &ProfileRequest,
    ) -> Result<Vec<EdgeId>, EngineError> {
        request.validate()?;
        let target_profiles = self.edge_profiles(target, request)?;

        let ids: Vec<EdgeId> = match candidates {
            Some(list) => list.to_vec(),
            None => (1..=self.store.edges()?.len() as EdgeId).collect(),
        };

        let mut scored = Vec::with_capacity(ids.len());
        for id in ids {
            let candidate = self.edge_profiles(id, request)?;
            let total: f32 = target_profiles
                .channels
                .iter()
                .zip(&candidate.channels)
                .map(|((_, t), (_, c))| compare::oriented_distance(t, c))
                .sum();
            scored.push((id, total));
        }
        scored.sort_by(|a, b| a.1.total_cmp(&b.1));
        log::debug!(
            "ranked {} candidates against edge {}",
            scored.len(),
            target
        );
        Ok(scored.into_iter().map(|(id, _)| id).collect())
    }

    /// Order one edge's channels by hierarchical clustering of their
    /// pairwise profile distances (dendrogram leaf order).
    pub fn rank_channels(
        &self,
        edge: EdgeId,
        request: &ProfileRequest,
    ) -> Result<Vec<String>, EngineError> {
        let profiles = self.edge_profiles(edge, request)?;
        let arrays: Vec<Vec<f32>> = profiles.channels.iter().map(|(_, p)| p.clone()).collect();
        let matrix = compare::distance_matrix(&arrays);
        let order = cluster::average_linkage_leaf_order(&matrix);
        Ok(order
            .into_iter()
            .map(|i| profiles.channels[i].0.clone())
            .collect())
    }

    /// Group one edge's channels by density clustering of their pairwise
    /// profile distances. `cluster_threshold` is the neighborhood radius.
    pub fn cluster_channels(
        &self,
        edge: EdgeId,
        request: &ProfileRequest,
        cluster_threshold: f32,
    ) -> Result<Vec<ClusterGroup>, EngineError> {
        let profiles = self.edge_profiles(edge, request)?;
        let names: Vec<String> = profiles.channels.iter().map(|(n, _)| n.clone()).collect();
        let arrays: Vec<Vec<f32>> = profiles.channels.iter().map(|(_, p)| p.clone()).collect();
        let matrix = compare::distance_matrix(&arrays);
        let labels = cluster::dbscan_precomputed(
            &matrix,
            &DbscanConfig {
                eps: cluster_threshold,
                min_samples: 1,
            },
        );
        Ok(cluster::group_by_label(&labels, &names))
    }

    /// Angular intensity histograms for the vertices touched by the given
    /// edges (union of endpoints, ascending, deduplicated).
    pub fn vertex_polarization(
        &self,
        edge_ids: &[EdgeId],
        channel: &str,
        radius: f32,
        threshold: f32,
    ) -> Result<PolarizationOutput, EngineError> {
        let edges = self.store.edges()?;
        let mut vertex_ids: Vec<VertexId> = Vec::with_capacity(edge_ids.len() * 2);
        for &id in edge_ids {
            if id == 0 || id as usize > edges.len() {
                return Err(EngineError::EdgeNotFound(id));
            }
            let [a, b] = edges[id as usize - 1];
            vertex_ids.push(a);
            vertex_ids.push(b);
        }
        vertex_ids.sort_unstable();
        vertex_ids.dedup();

        let volume = self.store.channel(channel)?;
        let dims = volume.dims();
        let vertices = self.store.vertices()?;

        let mut output = PolarizationOutput {
            centers: Vec::with_capacity(vertex_ids.len()),
            histograms: Vec::with_capacity(vertex_ids.len()),
            vertex_ids: Vec::with_capacity(vertex_ids.len()),
        };
        for vertex in vertex_ids {
            let center = *vertices
                .get(vertex as usize)
                .ok_or(EngineError::VertexNotFound(vertex))?;
            let voxels = polarization::voxels_within_radius(center, radius, dims);
            let angles = match self.store.read_angles(vertex, radius)? {
                // A cached assignment is only usable if it matches the scan.
                Some(cached) if cached.len() == voxels.len() => cached,
                _ => polarization::planar_angles(&voxels, center),
            };
            let mut histogram =
                polarization::sector_histogram(&voxels, &angles, &volume, threshold);
            polarization::normalize_sectors(&mut histogram);

            output.centers.push(polarization::corrected_center(center, dims));
            output.histograms.push(histogram);
            output.vertex_ids.push(vertex.to_string());
        }
        Ok(output)
    }

    /// Batch-compute voxel buckets for many radii of one edge.
    pub fn precompute_edge_buckets(
        &self,
        edge: EdgeId,
        radii: &[f32],
        kind: ShapeKind,
    ) -> Result<usize, EngineError> {
        precompute::precompute_edge_buckets(&self.store, edge, radii, kind)
    }

    /// Batch-compute angle assignments for many radii of one vertex.
    pub fn precompute_polarization(
        &self,
        vertex: VertexId,
        radii: &[f32],
    ) -> Result<usize, EngineError> {
        precompute::precompute_polarization(&self.store, vertex, radii)
    }

    /// Drop every precomputed cache entry.
    pub fn clear_cache(&self) -> Result<(), EngineError> {
        self.store.clear_precomputed()
    }
}
