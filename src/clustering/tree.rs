// src/clustering/tree.rs - Hierarchical partition tree over author clusters

use crate::utils::stats::mean;
use std::collections::BTreeMap;

/// One level of a nested partition structure. The innermost sets hold the
/// member names of one leaf cluster, the same shape multi-level Louvain
/// emits.
#[derive(Debug, Clone)]
pub enum Partition {
    Leaves(std::collections::BTreeSet<String>),
    Nested(Vec<Partition>),
}

/// Arena-backed tree over a nested partition structure. Branch nodes are
/// numbered by position among their siblings, restarting at zero in each
/// branch; a leaf cluster's id is the dash-joined branch numbers on its
/// path, the root excluded.
#[derive(Debug, Clone)]
pub struct PartitionTree {
    nodes: Vec<TreeNode>,
}

#[derive(Debug, Clone)]
struct TreeNode {
    parent: Option<usize>,
    number: usize,
    members: std::collections::BTreeSet<String>,
}

/// Immutable clustering result: cluster membership and per-member distances
/// to every cluster.
#[derive(Debug, Clone, Default)]
pub struct HierarchyAnalysis {
    /// Cluster id -> sorted member names.
    pub membership: BTreeMap<String, Vec<String>>,
    /// Member name -> cluster id -> mean traversal distance.
    pub distances: BTreeMap<String, BTreeMap<String, f64>>,
}

impl HierarchyAnalysis {
    pub fn distance(&self, member: &str, cluster: &str) -> Option<f64> {
        self.distances.get(member)?.get(cluster).copied()
    }

    pub fn cluster_ids(&self) -> impl Iterator<Item = &str> {
        self.membership.keys().map(|s| s.as_str())
    }
}

/// Traversal distance between two root-excluded branch paths: the number of
/// edges on the walk from one cluster up to the deepest common ancestor and
/// back down to the other.
pub fn path_distance(a: &[usize], b: &[usize]) -> usize {
    let common = a.iter().zip(b.iter()).take_while(|(x, y)| x == y).count();
    a.len() + b.len() - 2 * common
}

impl PartitionTree {
    /// Build the tree from a nested partition structure.
    pub fn parse(parts: &[Partition]) -> Self {
        let mut tree = PartitionTree {
            nodes: vec![TreeNode {
                parent: None,
                number: 0,
                members: Default::default(),
            }],
        };
        tree.parse_level(0, parts);
        tree
    }

    fn parse_level(&mut self, parent: usize, parts: &[Partition]) {
        for (number, part) in parts.iter().enumerate() {
            let idx = self.nodes.len();
            self.nodes.push(TreeNode {
                parent: Some(parent),
                number,
                members: Default::default(),
            });
            match part {
                Partition::Leaves(members) => {
                    self.nodes[idx].members = members.clone();
                }
                Partition::Nested(children) => {
                    self.parse_level(idx, children);
                }
            }
        }
    }

    /// Root-excluded branch path of one node.
    fn path_of(&self, mut idx: usize) -> Vec<usize> {
        let mut path = Vec::new();
        while let Some(parent) = self.nodes[idx].parent {
            path.push(self.nodes[idx].number);
            idx = parent;
        }
        path.reverse();
        path
    }

    /// Leaf-cluster nodes with their paths, in arena order.
    fn clusters(&self) -> Vec<(Vec<usize>, &TreeNode)> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| !n.members.is_empty())
            .map(|(idx, n)| (self.path_of(idx), n))
            .collect()
    }

    /// Every path of every member name. A name appearing in several leaf
    /// clusters carries one path per cluster.
    pub fn node_paths(&self) -> BTreeMap<String, Vec<Vec<usize>>> {
        let mut paths: BTreeMap<String, Vec<Vec<usize>>> = BTreeMap::new();
        for (path, node) in self.clusters() {
            for member in &node.members {
                paths.entry(member.clone()).or_default().push(path.clone());
            }
        }
        paths
    }

    /// Compute cluster membership and all member-to-cluster distances. A
    /// member with multiple paths gets the mean distance over its paths.
    pub fn analyze(&self) -> HierarchyAnalysis {
        let clusters = self.clusters();
        let cluster_paths: Vec<(String, Vec<usize>)> = clusters
            .iter()
            .map(|(path, _)| (join_path(path), path.clone()))
            .collect();

        let mut membership: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (path, node) in &clusters {
            membership
                .entry(join_path(path))
                .or_default()
                .extend(node.members.iter().cloned());
        }

        let member_paths = self.node_paths();
        let mut distances: BTreeMap<String, BTreeMap<String, f64>> = BTreeMap::new();
        for (member, paths) in &member_paths {
            let mut per_cluster = BTreeMap::new();
            for (cluster_id, cluster_path) in &cluster_paths {
                let dists: Vec<f64> = paths
                    .iter()
                    .map(|p| path_distance(p, cluster_path) as f64)
                    .collect();
                per_cluster.insert(cluster_id.clone(), mean(&dists));
            }
            distances.insert(member.clone(), per_cluster);
        }

        HierarchyAnalysis {
            membership,
            distances,
        }
    }
}

fn join_path(path: &[usize]) -> String {
    path.iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn leaves(names: &[&str]) -> Partition {
        Partition::Leaves(names.iter().map(|s| s.to_string()).collect())
    }

    /// Two-level structure with members shared across leaf clusters, pinned
    /// against hand-computed traversal distances.
    fn sample_tree() -> PartitionTree {
        let parts = vec![
            Partition::Nested(vec![
                leaves(&["D1", "D2", "D3"]),
                leaves(&["D4", "D5", "D1"]),
                leaves(&["D6", "D7", "D8"]),
            ]),
            Partition::Nested(vec![
                leaves(&["D9", "D10", "D2"]),
                leaves(&["D9", "D3"]),
                leaves(&["D7"]),
            ]),
            Partition::Nested(vec![leaves(&["D10", "D6", "D4", "D9"])]),
        ];
        PartitionTree::parse(&parts)
    }

    #[test]
    fn test_node_paths() {
        let paths = sample_tree().node_paths();

        let expected: BTreeMap<&str, Vec<Vec<usize>>> = BTreeMap::from([
            ("D1", vec![vec![0, 0], vec![0, 1]]),
            ("D2", vec![vec![0, 0], vec![1, 0]]),
            ("D3", vec![vec![0, 0], vec![1, 1]]),
            ("D4", vec![vec![0, 1], vec![2, 0]]),
            ("D5", vec![vec![0, 1]]),
            ("D6", vec![vec![0, 2], vec![2, 0]]),
            ("D7", vec![vec![0, 2], vec![1, 2]]),
            ("D8", vec![vec![0, 2]]),
            ("D9", vec![vec![1, 0], vec![1, 1], vec![2, 0]]),
            ("D10", vec![vec![1, 0], vec![2, 0]]),
        ]);
        for (name, exp) in expected {
            assert_eq!(paths[name], exp, "paths for {name}");
        }
        assert_eq!(paths.len(), 10);
    }

    #[test]
    fn test_path_distance() {
        assert_eq!(path_distance(&[0, 1], &[0, 1]), 0);
        assert_eq!(path_distance(&[0, 1], &[0, 2]), 2);
        assert_eq!(path_distance(&[0, 1], &[1, 1]), 4);
        // Symmetry.
        assert_eq!(path_distance(&[0, 2], &[0, 1]), 2);
        assert_eq!(path_distance(&[1, 1], &[0, 1]), 4);
    }

    #[test]
    fn test_membership() {
        let analysis = sample_tree().analyze();
        let members = |id: &str| analysis.membership[id].clone();

        assert_eq!(members("0-0"), vec!["D1", "D2", "D3"]);
        assert_eq!(members("0-1"), vec!["D1", "D4", "D5"]);
        assert_eq!(members("0-2"), vec!["D6", "D7", "D8"]);
        assert_eq!(members("1-0"), vec!["D10", "D2", "D9"]);
        assert_eq!(members("1-1"), vec!["D3", "D9"]);
        assert_eq!(members("1-2"), vec!["D7"]);
        assert_eq!(members("2-0"), vec!["D10", "D4", "D6", "D9"]);
        assert_eq!(analysis.membership.len(), 7);
    }

    #[test]
    fn test_distances_full_table() {
        let analysis = sample_tree().analyze();

        let expected: Vec<(&str, [f64; 7])> = vec![
            ("D1", [1.0, 1.0, 2.0, 4.0, 4.0, 4.0, 4.0]),
            ("D2", [2.0, 3.0, 3.0, 2.0, 3.0, 3.0, 4.0]),
            ("D3", [2.0, 3.0, 3.0, 3.0, 2.0, 3.0, 4.0]),
            ("D4", [3.0, 2.0, 3.0, 4.0, 4.0, 4.0, 2.0]),
            ("D5", [2.0, 0.0, 2.0, 4.0, 4.0, 4.0, 4.0]),
            ("D6", [3.0, 3.0, 2.0, 4.0, 4.0, 4.0, 2.0]),
            ("D7", [3.0, 3.0, 2.0, 3.0, 3.0, 2.0, 4.0]),
            ("D8", [2.0, 2.0, 0.0, 4.0, 4.0, 4.0, 4.0]),
            ("D9", [4.0, 4.0, 4.0, 2.0, 2.0, 8.0 / 3.0, 8.0 / 3.0]),
            ("D10", [4.0, 4.0, 4.0, 2.0, 3.0, 3.0, 2.0]),
        ];
        let cluster_ids = ["0-0", "0-1", "0-2", "1-0", "1-1", "1-2", "2-0"];

        for (name, row) in expected {
            for (cluster, exp) in cluster_ids.iter().zip(row.iter()) {
                let got = analysis.distance(name, cluster).unwrap();
                assert!(
                    (got - exp).abs() < 1e-12,
                    "distance {name} -> {cluster}: got {got}, expected {exp}"
                );
            }
        }
    }

    #[test]
    fn test_self_distance_is_zero_for_single_path_members() {
        let analysis = sample_tree().analyze();
        assert_eq!(analysis.distance("D5", "0-1"), Some(0.0));
        assert_eq!(analysis.distance("D8", "0-2"), Some(0.0));
    }

    #[test]
    fn test_sibling_leaves_closer_than_cross_branch() {
        let parts = vec![
            Partition::Nested(vec![leaves(&["D1", "D2"])]),
            Partition::Nested(vec![leaves(&["D3"])]),
        ];
        let analysis = PartitionTree::parse(&parts).analyze();
        let d12 = analysis.distance("D1", "0-0").unwrap();
        let d13 = analysis.distance("D1", "1-0").unwrap();
        assert!(d12 < d13);
    }
}
