//! Clustering over precomputed distance matrices.
//!
//! Two methods drive the channel-comparison operations: average-linkage
//! hierarchical clustering (consumed through its dendrogram leaf order) and
//! density clustering in the DBSCAN style, both working directly on a
//! symmetric distance matrix.

use rustc_hash::FxHashMap;

/// Disjoint-set (union-find) with path compression.
#[derive(Debug)]
pub(crate) struct UnionFind {
    parent: Vec<u32>,
}

impl UnionFind {
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n as u32).collect(),
        }
    }

    pub fn find(&mut self, x: u32) -> u32 {
        let idx = x as usize;
        let p = self.parent[idx];
        if p != x {
            let root = self.find(p);
            self.parent[idx] = root;
        }
        self.parent[idx]
    }

    /// Order-dependent union: the smaller index always becomes the
    /// representative. Returns `true` if `a` and `b` were in different sets.
    pub fn union_keep_min(&mut self, a: u32, b: u32) -> bool {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return false;
        }
        let (min, max) = if ra <= rb { (ra, rb) } else { (rb, ra) };
        self.parent[max as usize] = min;
        true
    }
}

/// Dendrogram leaf order from average-linkage clustering.
///
/// Repeatedly merges the closest pair of clusters, with inter-cluster
/// distance maintained as the size-weighted mean of member distances. Ties
/// take the lexicographically smallest pair. The returned permutation is a
/// left-to-right traversal of the merge tree, earlier-formed branches first.
pub fn average_linkage_leaf_order(matrix: &[Vec<f32>]) -> Vec<usize> {
    let n = matrix.len();
    if n <= 1 {
        return (0..n).collect();
    }

    // Active clusters by node id; leaves are 0..n, merges get fresh ids.
    let mut active: Vec<usize> = (0..n).collect();
    let mut sizes: FxHashMap<usize, usize> = (0..n).map(|i| (i, 1)).collect();
    let mut children: FxHashMap<usize, (usize, usize)> = FxHashMap::default();
    let mut dist: FxHashMap<(usize, usize), f64> = FxHashMap::default();
    for i in 0..n {
        for j in (i + 1)..n {
            dist.insert((i, j), matrix[i][j] as f64);
        }
    }

    let key = |a: usize, b: usize| if a < b { (a, b) } else { (b, a) };
    let mut next_id = n;

    while active.len() > 1 {
        // Closest active pair, smallest ids on ties.
        let mut best = (f64::INFINITY, (0usize, 0usize));
        for (ai, &a) in active.iter().enumerate() {
            for &b in &active[(ai + 1)..] {
                let d = dist[&key(a, b)];
                let pair = key(a, b);
                if d < best.0 || (d == best.0 && pair < best.1) {
                    best = (d, pair);
                }
            }
        }
        let (a, b) = best.1;

        let merged = next_id;
        next_id += 1;
        let size_a = sizes[&a];
        let size_b = sizes[&b];
        for &other in &active {
            if other == a || other == b {
                continue;
            }
            let da = dist[&key(a, other)];
            let db = dist[&key(b, other)];
            let weighted = (da * size_a as f64 + db * size_b as f64) / (size_a + size_b) as f64;
            dist.insert(key(merged, other), weighted);
        }
        sizes.insert(merged, size_a + size_b);
        children.insert(merged, (a, b));
        active.retain(|&c| c != a && c != b);
        active.push(merged);
    }

    // Left-to-right leaf traversal of the merge tree.
    let mut order = Vec::with_capacity(n);
    let mut stack = vec![active[0]];
    while let Some(node) = stack.pop() {
        match children.get(&node) {
            Some(&(left, right)) => {
                stack.push(right);
                stack.push(left);
            }
            None => order.push(node),
        }
    }
    order
}

/// Density clustering configuration.
///
/// With `min_samples` of 1 (the default) every point is a core point and
/// clusters are exactly the connected components of the eps-neighborhood
/// graph; no point can be noise.
#[derive(Debug, Clone, Copy)]
pub struct DbscanConfig {
    /// Maximum distance for two points to be neighbors.
    pub eps: f32,
    /// Neighborhood size (self included) required for a core point.
    pub min_samples: usize,
}

impl Default for DbscanConfig {
    fn default() -> Self {
        Self {
            eps: 0.5,
            min_samples: 1,
        }
    }
}

/// DBSCAN over a precomputed distance matrix.
///
/// Returns one label per point: clusters are numbered from 0 in order of
/// their lowest member index, noise points get -1.
pub fn dbscan_precomputed(matrix: &[Vec<f32>], config: &DbscanConfig) -> Vec<i32> {
    let n = matrix.len();
    if n == 0 {
        return Vec::new();
    }

    let neighbors: Vec<Vec<usize>> = (0..n)
        .map(|i| (0..n).filter(|&j| matrix[i][j] <= config.eps).collect())
        .collect();
    let core: Vec<bool> = neighbors
        .iter()
        .map(|adj| adj.len() >= config.min_samples)
        .collect();

    // Core points within eps of each other share a cluster.
    let mut components = UnionFind::new(n);
    for i in 0..n {
        if !core[i] {
            continue;
        }
        for &j in &neighbors[i] {
            if core[j] {
                components.union_keep_min(i as u32, j as u32);
            }
        }
    }

    let mut labels = vec![-1i32; n];
    let mut root_to_label: FxHashMap<u32, i32> = FxHashMap::default();
    let mut next_label = 0i32;
    for i in 0..n {
        if !core[i] {
            continue;
        }
        let root = components.find(i as u32);
        let label = *root_to_label.entry(root).or_insert_with(|| {
            let l = next_label;
            next_label += 1;
            l
        });
        labels[i] = label;
    }

    // Border points join the cluster of their first core neighbor.
    for i in 0..n {
        if core[i] || labels[i] != -1 {
            continue;
        }
        if let Some(&j) = neighbors[i].iter().find(|&&j| core[j]) {
            labels[i] = labels[j];
        }
    }
    labels
}

/// A named cluster with its member channel names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterGroup {
    /// Numeric label rendered as a string; "-1" is the noise group.
    pub label: String,
    pub members: Vec<String>,
}

/// Group members by label, ascending (noise first when present).
pub fn group_by_label(labels: &[i32], names: &[String]) -> Vec<ClusterGroup> {
    let mut distinct: Vec<i32> = labels.to_vec();
    distinct.sort_unstable();
    distinct.dedup();

    distinct
        .into_iter()
        .map(|label| ClusterGroup {
            label: label.to_string(),
            members: labels
                .iter()
                .zip(names)
                .filter(|(&l, _)| l == label)
                .map(|(_, name)| name.clone())
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix_from(rows: &[&[f32]]) -> Vec<Vec<f32>> {
        rows.iter().map(|r| r.to_vec()).collect()
    }

    #[test]
    fn test_union_find_keep_min() {
        let mut uf = UnionFind::new(4);
        assert!(uf.union_keep_min(2, 3));
        assert!(uf.union_keep_min(3, 1));
        assert!(!uf.union_keep_min(1, 2));
        assert_eq!(uf.find(3), 1);
        assert_eq!(uf.find(0), 0);
    }

    #[test]
    fn test_leaf_order_groups_close_pair() {
        // 0 and 2 are near-identical; 1 is far away. The leaf order must
        // keep 0 and 2 adjacent.
        let m = matrix_from(&[
            &[0.0, 5.0, 0.1],
            &[5.0, 0.0, 5.0],
            &[0.1, 5.0, 0.0],
        ]);
        let order = average_linkage_leaf_order(&m);
        assert_eq!(order.len(), 3);
        let pos = |v: usize| order.iter().position(|&x| x == v).unwrap();
        assert_eq!((pos(0) as i32 - pos(2) as i32).abs(), 1);
    }

    #[test]
    fn test_leaf_order_trivial_sizes() {
        assert_eq!(average_linkage_leaf_order(&[]), Vec::<usize>::new());
        assert_eq!(average_linkage_leaf_order(&[vec![0.0]]), vec![0]);
    }

    #[test]
    fn test_dbscan_connected_components() {
        // chain 0-1, pair 2-3 far from the chain
        let m = matrix_from(&[
            &[0.0, 0.2, 9.0, 9.0],
            &[0.2, 0.0, 9.0, 9.0],
            &[9.0, 9.0, 0.0, 0.3],
            &[9.0, 9.0, 0.3, 0.0],
        ]);
        let labels = dbscan_precomputed(&m, &DbscanConfig {
            eps: 0.5,
            min_samples: 1,
        });
        assert_eq!(labels, vec![0, 0, 1, 1]);
    }

    #[test]
    fn test_dbscan_identical_points_one_cluster() {
        let m = matrix_from(&[
            &[0.0, 0.0, 0.0],
            &[0.0, 0.0, 0.0],
            &[0.0, 0.0, 0.0],
        ]);
        let labels = dbscan_precomputed(&m, &DbscanConfig::default());
        assert_eq!(labels, vec![0, 0, 0]);
    }

    #[test]
    fn test_dbscan_noise_with_higher_min_samples() {
        // 0,1,2 are mutually close; 3 is isolated and cannot be core.
        let m = matrix_from(&[
            &[0.0, 0.1, 0.1, 9.0],
            &[0.1, 0.0, 0.1, 9.0],
            &[0.1, 0.1, 0.0, 9.0],
            &[9.0, 9.0, 9.0, 0.0],
        ]);
        let labels = dbscan_precomputed(&m, &DbscanConfig {
            eps: 0.5,
            min_samples: 2,
        });
        assert_eq!(labels, vec![0, 0, 0, -1]);
    }

    #[test]
    fn test_group_by_label_orders_noise_first() {
        let labels = vec![0, -1, 0, 1];
        let names: Vec<String> = ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect();
        let groups = group_by_label(&labels, &names);
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].label, "-1");
        assert_eq!(groups[0].members, vec!["b"]);
        assert_eq!(groups[1].label, "0");
        assert_eq!(groups[1].members, vec!["a", "c"]);
        assert_eq!(groups[2].label, "1");
        assert_eq!(groups[2].members, vec!["d"]);
    }
}
