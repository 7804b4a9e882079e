//! Incremental 3D Delaunay tessellation (Bowyer–Watson).
//!
//! Internal backend for graph construction. Points are lifted to `f64` for
//! the circumsphere arithmetic; the point counts this crate sees (detected
//! object centroids) keep the brute-force cavity search cheap.

use crate::error::EngineError;
use glam::{DVec3, Vec3};
use rustc_hash::FxHashMap;

/// A tetrahedron with its cached circumsphere.
///
/// `circumsphere` is `None` for degenerate (near-coplanar) tetrahedra;
/// those are treated as having an unbounded circumsphere so they are
/// re-triangulated by the next insertion that touches them.
#[derive(Debug, Clone)]
struct Tet {
    verts: [usize; 4],
    circumsphere: Option<(DVec3, f64)>,
}

impl Tet {
    fn new(verts: [usize; 4], points: &[DVec3]) -> Self {
        let circumsphere = circumsphere(
            points[verts[0]],
            points[verts[1]],
            points[verts[2]],
            points[verts[3]],
        );
        Self { verts, circumsphere }
    }

    fn contains_in_circumsphere(&self, p: DVec3) -> bool {
        match self.circumsphere {
            Some((center, r2)) => p.distance_squared(center) <= r2 * (1.0 + 1e-9),
            None => true,
        }
    }

    fn faces(&self) -> [[usize; 3]; 4] {
        let [a, b, c, d] = self.verts;
        [[a, b, c], [a, b, d], [a, c, d], [b, c, d]]
    }
}

/// Circumcenter and squared radius of the sphere through four points, or
/// `None` if they are (nearly) coplanar.
fn circumsphere(a: DVec3, b: DVec3, c: DVec3, d: DVec3) -> Option<(DVec3, f64)> {
    let ba = b - a;
    let ca = c - a;
    let da = d - a;

    let det = 2.0 * ba.dot(ca.cross(da));
    let scale = ba.length() * ca.length() * da.length();
    if det.abs() <= 1e-12 * scale.max(1e-30) {
        return None;
    }

    let offset = (ba.length_squared() * ca.cross(da)
        + ca.length_squared() * da.cross(ba)
        + da.length_squared() * ba.cross(ca))
        / det;
    Some((a + offset, offset.length_squared()))
}

/// Tessellate a point set into tetrahedra indexed into `points`.
///
/// Errors on fewer than 4 points or on degenerate configurations (e.g. all
/// points coplanar) where no tetrahedron survives.
pub(crate) fn tetrahedralize(points: &[Vec3]) -> Result<Vec<[usize; 4]>, EngineError> {
    let n = points.len();
    if n < 4 {
        return Err(EngineError::InsufficientPoints(n));
    }

    // Lift to f64 and append the enclosing super-tetrahedron.
    let mut lifted: Vec<DVec3> = points
        .iter()
        .map(|p| DVec3::new(p.x as f64, p.y as f64, p.z as f64))
        .collect();

    let min = lifted.iter().copied().fold(lifted[0], DVec3::min);
    let max = lifted.iter().copied().fold(lifted[0], DVec3::max);
    let center = (min + max) * 0.5;
    let span = (max - min).max_element().max(1.0);

    // Far enough out that super-tet circumspheres degenerate toward
    // half-spaces and cannot swallow interior points.
    let s = 1000.0 * span;
    lifted.push(center + DVec3::new(-s, -s, -s));
    lifted.push(center + DVec3::new(4.0 * s, -s, -s));
    lifted.push(center + DVec3::new(-s, 4.0 * s, -s));
    lifted.push(center + DVec3::new(-s, -s, 4.0 * s));

    let mut tets = vec![Tet::new([n, n + 1, n + 2, n + 3], &lifted)];

    for i in 0..n {
        let p = lifted[i];

        // Cavity: tetrahedra whose circumsphere contains the new point.
        let (bad, kept): (Vec<Tet>, Vec<Tet>) = tets
            .into_iter()
            .partition(|t| t.contains_in_circumsphere(p));
        tets = kept;

        // Boundary faces of the cavity appear in exactly one bad tet.
        let mut face_counts: FxHashMap<[usize; 3], usize> = FxHashMap::default();
        for tet in &bad {
            for mut face in tet.faces() {
                face.sort_unstable();
                *face_counts.entry(face).or_insert(0) += 1;
            }
        }

        for (face, count) in face_counts {
            if count == 1 {
                tets.push(Tet::new([face[0], face[1], face[2], i], &lifted));
            }
        }
    }

    // Strip everything still attached to the super-tetrahedron, plus any
    // flat tetrahedron left behind by a degenerate configuration.
    let result: Vec<[usize; 4]> = tets
        .into_iter()
        .filter(|t| t.verts.iter().all(|&v| v < n) && t.circumsphere.is_some())
        .map(|t| t.verts)
        .collect();

    if result.is_empty() {
        return Err(EngineError::DegenerateInput {
            message: "no tetrahedron survives; points may be coplanar".to_string(),
        });
    }
    Ok(result)
}
