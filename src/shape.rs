//! Rasterization of tubular regions of interest around graph edges.
//!
//! Both shapes are scanned over a clamped local bounding box rather than the
//! whole volume; the cost per edge is proportional to the region size.

use crate::types::{Dims, Voxel};
use glam::Vec3;

/// Region-of-interest shape around an edge.
///
/// `Bicone` is the default: two cones apex-to-apex at the edge endpoints,
/// opening toward each other with half-angle `atan(radius / half_length)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShapeKind {
    Cylinder,
    #[default]
    Bicone,
}

/// Collect the integer voxel coordinates inside the shape between `v1` and
/// `v2`, clamped to the volume bounds.
///
/// The caller must reject zero-length edges; for coincident endpoints the
/// result is unspecified.
pub fn voxelize(v1: Vec3, v2: Vec3, radius: f32, dims: Dims, kind: ShapeKind) -> Vec<Voxel> {
    match kind {
        ShapeKind::Cylinder => cylinder_voxels(v1, v2, radius, dims),
        ShapeKind::Bicone => bicone_voxels(v1, v2, radius, dims),
    }
}

/// Clamp a `(z, y, x)` interval to `[0, dims)`, truncating to integers.
/// Returns half-open ranges per axis.
fn clamped_box(lo: Vec3, hi: Vec3, dims: Dims) -> [(i32, i32); 3] {
    let lo = [lo.x, lo.y, lo.z];
    let hi = [hi.x, hi.y, hi.z];
    let mut out = [(0i32, 0i32); 3];
    for axis in 0..3 {
        let min = lo[axis].max(0.0) as i32;
        let max = hi[axis].min(dims[axis] as f32) as i32;
        out[axis] = (min, max.max(min));
    }
    out
}

fn cylinder_voxels(v1: Vec3, v2: Vec3, radius: f32, dims: Dims) -> Vec<Voxel> {
    let vec = v2 - v1;
    let dist = vec.length();
    let unit = vec / dist;

    let ranges = clamped_box(v1.min(v2) - radius, v1.max(v2) + radius, dims);
    let mut voxels = Vec::new();
    for z in ranges[0].0..ranges[0].1 {
        for y in ranges[1].0..ranges[1].1 {
            for x in ranges[2].0..ranges[2].1 {
                let voxel = Voxel::new(z, y, x);
                let w = voxel.to_vec3() - v1;
                let t = unit.dot(w);
                if t < 0.0 || t > dist {
                    continue;
                }
                let perpendicular = (w - unit * t).length();
                if perpendicular <= radius {
                    voxels.push(voxel);
                }
            }
        }
    }
    voxels
}

fn bicone_voxels(v1: Vec3, v2: Vec3, radius: f32, dims: Dims) -> Vec<Voxel> {
    let vec = v2 - v1;
    let dist = vec.length();
    let half = dist * 0.5;
    let mid = v1 + vec * 0.5;
    let max_angle = (radius / half).atan();

    let boundary = half.max(radius) + 1.0;
    let ranges = clamped_box(mid - boundary, mid + boundary, dims);

    let unit = vec / dist;
    let mut voxels = Vec::new();
    for z in ranges[0].0..ranges[0].1 {
        for y in ranges[1].0..ranges[1].1 {
            for x in ranges[2].0..ranges[2].1 {
                let voxel = Voxel::new(z, y, x);
                let p = voxel.to_vec3();

                // Voxels coincident with an endpoint are always included.
                let from_v1 = p - v1;
                let from_v2 = p - v2;
                if from_v1.length() == 0.0 || from_v2.length() == 0.0 {
                    voxels.push(voxel);
                    continue;
                }

                let t = unit.dot(from_v1);
                let angle1 = (t / from_v1.length()).clamp(-1.0, 1.0).acos();
                let angle2 = ((dist - t) / from_v2.length()).clamp(-1.0, 1.0).acos();
                if angle1 <= max_angle && angle2 <= max_angle {
                    voxels.push(voxel);
                }
            }
        }
    }
    voxels
}
