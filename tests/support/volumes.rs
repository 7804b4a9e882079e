#![allow(dead_code)]

use glam::Vec3;
use marker_graph::{Dims, MemoryStore};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Random points scattered uniformly through a cube of the given extent.
pub fn scattered_points(n: usize, extent: f32, seed: u64) -> Vec<Vec3> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            Vec3::new(
                rng.gen_range(0.0..extent),
                rng.gen_range(0.0..extent),
                rng.gen_range(0.0..extent),
            )
        })
        .collect()
}

/// A volume filled with one constant value.
pub fn uniform_volume(dims: Dims, value: f32) -> Vec<f32> {
    vec![value; dims[0] * dims[1] * dims[2]]
}

/// A volume ramping linearly along the x axis, 0 at x = 0 up to 1 at the
/// far face.
pub fn gradient_volume(dims: Dims) -> Vec<f32> {
    let [dz, dy, dx] = dims;
    let mut data = Vec::with_capacity(dz * dy * dx);
    for _z in 0..dz {
        for _y in 0..dy {
            for x in 0..dx {
                data.push((x + 1) as f32 / dx as f32);
            }
        }
    }
    data
}

/// Seeded random profiles in [0, 1], all of one length.
pub fn random_profiles(count: usize, len: usize, seed: u64) -> Vec<Vec<f32>> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count)
        .map(|_| (0..len).map(|_| rng.gen_range(0.0..1.0)).collect())
        .collect()
}

/// Store with one uniform "marker" channel and a single two-vertex edge.
pub fn edge_store(dims: Dims, v1: Vec3, v2: Vec3) -> MemoryStore {
    let store = MemoryStore::new(dims);
    store.insert_channel("marker", uniform_volume(dims, 1.0));
    store.set_graph(&[v1, v2], &[[0, 1]]);
    store
}
