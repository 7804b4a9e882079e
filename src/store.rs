//! Backing store abstraction.
//!
//! The engine treats its persistence layer as a hierarchical array store
//! with group semantics: channel volumes and the graph are read through it,
//! and the two precomputation caches are written through it. Implementations
//! must be shareable across the precompute worker pool; the engine never
//! holds store data across operations and leaves writer serialization to
//! the caller.

use crate::bucket::EncodedBuckets;
use crate::error::EngineError;
use crate::types::{Dims, EdgeId, VertexId};
use crate::volume::ChannelVolume;
use glam::Vec3;
use rustc_hash::FxHashMap;
use std::sync::RwLock;

/// Narrow store interface consumed by the engine.
///
/// Cache writes are idempotent: writing an already-present key is a no-op,
/// so a bucket computed twice persists the first result.
pub trait VolumeStore: Send + Sync {
    /// Volume dimensions shared by all channels.
    fn dims(&self) -> Result<Dims, EngineError>;

    /// Channel names in store order.
    fn channel_names(&self) -> Result<Vec<String>, EngineError>;

    /// A channel's intensity volume.
    fn channel(&self, name: &str) -> Result<ChannelVolume, EngineError>;

    /// Vertex coordinate array; index = vertex id.
    fn vertices(&self) -> Result<Vec<Vec3>, EngineError>;

    /// Edge array of vertex-id pairs; 1-based position = edge id.
    fn edges(&self) -> Result<Vec<[u32; 2]>, EngineError>;

    /// Replace the graph wholesale and clear the intensity cache group.
    fn replace_graph(&self, vertices: &[Vec3], edges: &[[u32; 2]]) -> Result<(), EngineError>;

    fn read_bucket(&self, edge: EdgeId, radius: f32)
        -> Result<Option<EncodedBuckets>, EngineError>;

    fn write_bucket(
        &self,
        edge: EdgeId,
        radius: f32,
        bucket: &EncodedBuckets,
    ) -> Result<(), EngineError>;

    fn read_angles(&self, vertex: VertexId, radius: f32)
        -> Result<Option<Vec<f32>>, EngineError>;

    fn write_angles(
        &self,
        vertex: VertexId,
        radius: f32,
        angles: &[f32],
    ) -> Result<(), EngineError>;

    /// Drop both precomputation cache groups.
    fn clear_precomputed(&self) -> Result<(), EngineError>;
}

#[inline]
fn radius_key(radius: f32) -> u32 {
    radius.to_bits()
}

#[derive(Default)]
struct StoreInner {
    dims: Dims,
    channels: Vec<(String, Vec<f32>)>,
    vertices: Vec<Vec3>,
    edges: Vec<[u32; 2]>,
    buckets: FxHashMap<(EdgeId, u32), EncodedBuckets>,
    angles: FxHashMap<(VertexId, u32), Vec<f32>>,
}

/// In-memory reference store.
///
/// Interior mutability mirrors the on-disk stores this abstracts over:
/// reads take a shared lock, cache writes briefly take the exclusive one.
pub struct MemoryStore {
    inner: RwLock<StoreInner>,
}

impl MemoryStore {
    pub fn new(dims: Dims) -> Self {
        Self {
            inner: RwLock::new(StoreInner {
                dims,
                ..StoreInner::default()
            }),
        }
    }

    /// Add a channel volume. Panics if `data` does not match the store
    /// dimensions; replaces any existing channel of the same name.
    pub fn insert_channel(&self, name: &str, data: Vec<f32>) {
        let mut inner = self.inner.write().expect("store lock poisoned");
        assert_eq!(
            data.len(),
            inner.dims[0] * inner.dims[1] * inner.dims[2],
            "channel data length does not match store dims"
        );
        if let Some(entry) = inner.channels.iter_mut().find(|(n, _)| n == name) {
            entry.1 = data;
        } else {
            inner.channels.push((name.to_string(), data));
        }
    }

    /// Set the graph without touching the caches (initial population).
    pub fn set_graph(&self, vertices: &[Vec3], edges: &[[u32; 2]]) {
        let mut inner = self.inner.write().expect("store lock poisoned");
        inner.vertices = vertices.to_vec();
        inner.edges = edges.to_vec();
    }

    /// Number of cached bucket entries (test visibility).
    pub fn cached_buckets(&self) -> usize {
        self.inner.read().expect("store lock poisoned").buckets.len()
    }

    /// Number of cached angle entries (test visibility).
    pub fn cached_angles(&self) -> usize {
        self.inner.read().expect("store lock poisoned").angles.len()
    }
}

impl MemoryStore {
    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, StoreInner>, EngineError> {
        self.inner
            .read()
            .map_err(|_| EngineError::Store("store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, StoreInner>, EngineError> {
        self.inner
            .write()
            .map_err(|_| EngineError::Store("store lock poisoned".to_string()))
    }
}

impl VolumeStore for MemoryStore {
    fn dims(&self) -> Result<Dims, EngineError> {
        Ok(self.read()?.dims)
    }

    fn channel_names(&self) -> Result<Vec<String>, EngineError> {
        Ok(self.read()?.channels.iter().map(|(n, _)| n.clone()).collect())
    }

    fn channel(&self, name: &str) -> Result<ChannelVolume, EngineError> {
        let inner = self.read()?;
        let data = inner
            .channels
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, d)| d.clone())
            .ok_or_else(|| EngineError::ChannelNotFound(name.to_string()))?;
        Ok(ChannelVolume::new(inner.dims, data))
    }

    fn vertices(&self) -> Result<Vec<Vec3>, EngineError> {
        Ok(self.read()?.vertices.clone())
    }

    fn edges(&self) -> Result<Vec<[u32; 2]>, EngineError> {
        Ok(self.read()?.edges.clone())
    }

    fn replace_graph(&self, vertices: &[Vec3], edges: &[[u32; 2]]) -> Result<(), EngineError> {
        let mut inner = self.write()?;
        inner.vertices = vertices.to_vec();
        inner.edges = edges.to_vec();
        inner.buckets.clear();
        Ok(())
    }

    fn read_bucket(
        &self,
        edge: EdgeId,
        radius: f32,
    ) -> Result<Option<EncodedBuckets>, EngineError> {
        Ok(self.read()?.buckets.get(&(edge, radius_key(radius))).cloned())
    }

    fn write_bucket(
        &self,
        edge: EdgeId,
        radius: f32,
        bucket: &EncodedBuckets,
    ) -> Result<(), EngineError> {
        self.write()?
            .buckets
            .entry((edge, radius_key(radius)))
            .or_insert_with(|| bucket.clone());
        Ok(())
    }

    fn read_angles(
        &self,
        vertex: VertexId,
        radius: f32,
    ) -> Result<Option<Vec<f32>>, EngineError> {
        Ok(self.read()?.angles.get(&(vertex, radius_key(radius))).cloned())
    }

    fn write_angles(
        &self,
        vertex: VertexId,
        radius: f32,
        angles: &[f32],
    ) -> Result<(), EngineError> {
        self.write()?
            .angles
            .entry((vertex, radius_key(radius)))
            .or_insert_with(|| angles.to_vec());
        Ok(())
    }

    fn clear_precomputed(&self) -> Result<(), EngineError> {
        let mut inner = self.write()?;
        inner.buckets.clear();
        inner.angles.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bucket::VoxelBuckets;

    fn sample_bucket() -> EncodedBuckets {
        let mut buckets = VoxelBuckets::new(2);
        buckets.push(0, crate::types::Voxel::new(1, 2, 3));
        buckets.encode(1, 1.0).unwrap()
    }

    #[test]
    fn test_channel_lookup() {
        let store = MemoryStore::new([1, 2, 2]);
        store.insert_channel("dna", vec![0.0, 0.5, 1.0, 0.25]);
        let vol = store.channel("dna").unwrap();
        assert_eq!(vol.dims(), [1, 2, 2]);
        assert_eq!(
            store.channel("missing").unwrap_err(),
            EngineError::ChannelNotFound("missing".to_string())
        );
        assert_eq!(store.channel_names().unwrap(), vec!["dna".to_string()]);
    }

    #[test]
    fn test_bucket_write_once() {
        let store = MemoryStore::new([1, 1, 1]);
        let first = sample_bucket();
        store.write_bucket(2, 1.0, &first).unwrap();

        let mut other = VoxelBuckets::new(2);
        other.push(1, crate::types::Voxel::new(9, 9, 9));
        let second = other.encode(2, 1.0).unwrap();
        store.write_bucket(2, 1.0, &second).unwrap();

        // First write wins.
        assert_eq!(store.read_bucket(2, 1.0).unwrap(), Some(first));
    }

    #[test]
    fn test_replace_graph_clears_intensity_cache_only() {
        let store = MemoryStore::new([1, 1, 1]);
        store.write_bucket(1, 1.0, &sample_bucket()).unwrap();
        store.write_angles(0, 1.0, &[1.0, 2.0]).unwrap();

        store
            .replace_graph(&[Vec3::ZERO, Vec3::ONE], &[[0, 1]])
            .unwrap();
        assert_eq!(store.cached_buckets(), 0);
        assert_eq!(store.cached_angles(), 1);

        store.clear_precomputed().unwrap();
        assert_eq!(store.cached_angles(), 0);
    }

    #[test]
    fn test_radius_keys_distinct() {
        let store = MemoryStore::new([1, 1, 1]);
        store.write_bucket(1, 1.0, &sample_bucket()).unwrap();
        assert!(store.read_bucket(1, 2.0).unwrap().is_none());
        assert!(store.read_bucket(1, 1.0).unwrap().is_some());
    }
}
