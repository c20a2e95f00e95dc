// src/clustering/louvain.rs - Seeded multi-level Louvain community detection

use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::{BTreeSet, HashMap};

use crate::network::builder::AuthorNetwork;

/// Multi-level Louvain over a weighted author network. Returns one
/// partition per aggregation level, coarsest last, each a list of member
/// sets in original node names. The visit order inside the local-moving
/// phase is shuffled with a seeded generator so runs are reproducible.
pub fn louvain_partitions(
    network: &AuthorNetwork,
    resolution: f64,
    seed: u64,
) -> Vec<Vec<BTreeSet<String>>> {
    let names: Vec<String> = network.authors().map(|a| a.to_string()).collect();
    let index: HashMap<&str, usize> = names
        .iter()
        .enumerate()
        .map(|(i, n)| (n.as_str(), i))
        .collect();
    let edges: Vec<(usize, usize, f64)> = network
        .weighted_edges()
        .map(|(a, b, w)| (index[a], index[b], w as f64))
        .collect();
    louvain_levels(names, edges, resolution, seed)
}

/// Core multi-level loop over an index-based weighted edge list.
pub(crate) fn louvain_levels(
    names: Vec<String>,
    mut edges: Vec<(usize, usize, f64)>,
    resolution: f64,
    seed: u64,
) -> Vec<Vec<BTreeSet<String>>> {
    if names.is_empty() {
        return Vec::new();
    }
    let mut rng = StdRng::seed_from_u64(seed);

    // Which original names each current super-node stands for.
    let mut groups: Vec<BTreeSet<String>> = names
        .into_iter()
        .map(|n| BTreeSet::from([n]))
        .collect();
    let mut levels: Vec<Vec<BTreeSet<String>>> = Vec::new();

    loop {
        let node_count = groups.len();
        let (assignment, moved) = one_level(node_count, &edges, resolution, &mut rng);
        if !moved {
            // Nothing improved at this level. Emit the current grouping only
            // when no level exists yet, so an unclusterable graph still
            // yields one partition instead of none.
            if levels.is_empty() {
                levels.push(groups.clone());
            }
            break;
        }

        // Renumber communities densely in first-appearance order.
        let mut renumber: HashMap<usize, usize> = HashMap::new();
        let mut community_of: Vec<usize> = Vec::with_capacity(node_count);
        for &comm in &assignment {
            let next = renumber.len();
            let id = *renumber.entry(comm).or_insert(next);
            community_of.push(id);
        }
        let community_count = renumber.len();

        let mut new_groups: Vec<BTreeSet<String>> = vec![BTreeSet::new(); community_count];
        for (node, &comm) in community_of.iter().enumerate() {
            new_groups[comm].extend(groups[node].iter().cloned());
        }
        levels.push(new_groups.clone());
        debug!(
            "louvain level {}: {} communities over {} nodes",
            levels.len(),
            community_count,
            node_count
        );

        if community_count == node_count {
            break;
        }

        // Aggregate: communities become nodes, parallel edges sum. Intra-
        // community weight becomes a self-loop so later levels keep it.
        let mut aggregated: HashMap<(usize, usize), f64> = HashMap::new();
        for &(a, b, w) in &edges {
            let (ca, cb) = (community_of[a], community_of[b]);
            let key = if ca <= cb { (ca, cb) } else { (cb, ca) };
            *aggregated.entry(key).or_default() += w;
        }
        edges = aggregated
            .into_iter()
            .map(|((a, b), w)| (a, b, w))
            .collect();
        edges.sort_by(|x, y| (x.0, x.1).cmp(&(y.0, y.1)));
        groups = new_groups;
    }

    levels
}

/// One local-moving phase. Returns the community assignment per node and
/// whether any node changed community.
fn one_level(
    node_count: usize,
    edges: &[(usize, usize, f64)],
    resolution: f64,
    rng: &mut StdRng,
) -> (Vec<usize>, bool) {
    // Weighted adjacency; self-loops tracked separately.
    let mut neighbors: Vec<Vec<(usize, f64)>> = vec![Vec::new(); node_count];
    let mut self_loops: Vec<f64> = vec![0.0; node_count];
    let mut total_weight = 0.0;
    for &(a, b, w) in edges {
        total_weight += w;
        if a == b {
            self_loops[a] += w;
        } else {
            neighbors[a].push((b, w));
            neighbors[b].push((a, w));
        }
    }
    if total_weight == 0.0 {
        return ((0..node_count).collect(), false);
    }

    // Weighted degree, self-loops counted twice.
    let mut degree: Vec<f64> = vec![0.0; node_count];
    for (node, adj) in neighbors.iter().enumerate() {
        degree[node] = adj.iter().map(|(_, w)| w).sum::<f64>() + 2.0 * self_loops[node];
    }

    let mut community: Vec<usize> = (0..node_count).collect();
    let mut community_degree: Vec<f64> = degree.clone();
    let two_m = 2.0 * total_weight;

    let mut order: Vec<usize> = (0..node_count).collect();
    let mut moved_any = false;
    loop {
        let mut moved_this_pass = false;
        order.shuffle(rng);

        for &node in &order {
            let current = community[node];

            // Weight from this node to each adjacent community.
            let mut to_community: HashMap<usize, f64> = HashMap::new();
            for &(nb, w) in &neighbors[node] {
                *to_community.entry(community[nb]).or_default() += w;
            }

            // Take the node out of its community while evaluating moves.
            community_degree[current] -= degree[node];

            let mut best = current;
            let mut best_gain = 0.0;
            let base = to_community.get(&current).copied().unwrap_or(0.0)
                - resolution * degree[node] * community_degree[current] / two_m;
            for (&cand, &weight_to) in &to_community {
                if cand == current {
                    continue;
                }
                let gain = weight_to
                    - resolution * degree[node] * community_degree[cand] / two_m
                    - base;
                if gain > best_gain {
                    best_gain = gain;
                    best = cand;
                }
            }

            community_degree[best] += degree[node];
            if best != current {
                community[node] = best;
                moved_this_pass = true;
                moved_any = true;
            }
        }

        if !moved_this_pass {
            break;
        }
    }

    (community, moved_any)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("n{i}")).collect()
    }

    fn flat(levels: &[Vec<BTreeSet<String>>]) -> Vec<BTreeSet<String>> {
        levels.last().cloned().unwrap_or_default()
    }

    #[test]
    fn test_two_cliques_split_into_two_communities() {
        // Two triangles joined by a single weak edge.
        let edges = vec![
            (0, 1, 1.0),
            (1, 2, 1.0),
            (0, 2, 1.0),
            (3, 4, 1.0),
            (4, 5, 1.0),
            (3, 5, 1.0),
            (2, 3, 0.1),
        ];
        let levels = louvain_levels(names(6), edges, 1.0, 7);
        let communities = flat(&levels);

        assert_eq!(communities.len(), 2);
        let expected_a: BTreeSet<String> =
            ["n0", "n1", "n2"].iter().map(|s| s.to_string()).collect();
        let expected_b: BTreeSet<String> =
            ["n3", "n4", "n5"].iter().map(|s| s.to_string()).collect();
        assert!(communities.contains(&expected_a));
        assert!(communities.contains(&expected_b));
    }

    #[test]
    fn test_partitions_cover_all_nodes_at_every_level() {
        let edges = vec![
            (0, 1, 3.0),
            (1, 2, 1.0),
            (2, 3, 3.0),
            (3, 0, 1.0),
            (4, 5, 2.0),
        ];
        let levels = louvain_levels(names(6), edges, 1.0, 42);

        assert!(!levels.is_empty());
        for level in &levels {
            let total: usize = level.iter().map(|c| c.len()).sum();
            assert_eq!(total, 6);
            let union: BTreeSet<&String> = level.iter().flatten().collect();
            assert_eq!(union.len(), 6);
        }
    }

    #[test]
    fn test_seed_makes_runs_reproducible() {
        let edges = vec![
            (0, 1, 1.0),
            (1, 2, 1.0),
            (2, 0, 1.0),
            (2, 3, 1.0),
            (3, 4, 1.0),
            (4, 5, 1.0),
            (5, 3, 1.0),
        ];
        let a = louvain_levels(names(6), edges.clone(), 1.0, 99);
        let b = louvain_levels(names(6), edges, 1.0, 99);
        assert_eq!(a, b);
    }

    #[test]
    fn test_edgeless_graph_is_singletons() {
        let levels = louvain_levels(names(3), Vec::new(), 1.0, 1);
        assert_eq!(levels.len(), 1);
        assert_eq!(levels[0].len(), 3);
    }

    #[test]
    fn test_empty_network_yields_no_levels() {
        let levels = louvain_levels(Vec::new(), Vec::new(), 1.0, 1);
        assert!(levels.is_empty());
    }
}
