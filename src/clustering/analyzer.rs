// src/clustering/analyzer.rs - Community analysis over author and citation networks

use anyhow::{bail, Result};
use log::info;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::clustering::louvain::{louvain_levels, louvain_partitions};
use crate::clustering::tree::{HierarchyAnalysis, Partition, PartitionTree};
use crate::network::builder::AuthorNetwork;
use crate::network::citation::CitationNetwork;

/// Cluster an author network hierarchically: multi-level Louvain feeds the
/// partition tree, which yields cluster membership and per-author distances
/// to every cluster at every level.
pub fn analyze_author_network(
    network: &AuthorNetwork,
    resolution: f64,
    seed: u64,
) -> Result<HierarchyAnalysis> {
    let levels = louvain_partitions(network, resolution, seed);
    if levels.is_empty() {
        bail!("cannot cluster an empty author network");
    }
    info!(
        "clustered {} authors into {} partition levels",
        network.author_count(),
        levels.len()
    );

    let parts: Vec<Partition> = levels
        .into_iter()
        .map(|level| Partition::Nested(level.into_iter().map(Partition::Leaves).collect()))
        .collect();
    Ok(PartitionTree::parse(&parts).analyze())
}

/// Join the external paper->topic assignment with the paper->author index:
/// topic id -> deduplicated, sorted author identities.
pub fn topics_to_authors(
    paper_to_topic: &BTreeMap<String, i64>,
    paper_authors: &BTreeMap<String, Vec<String>>,
) -> BTreeMap<i64, Vec<String>> {
    let mut topics: BTreeMap<i64, BTreeSet<String>> = BTreeMap::new();
    for (uid, &topic) in paper_to_topic {
        if let Some(authors) = paper_authors.get(uid) {
            topics.entry(topic).or_default().extend(authors.iter().cloned());
        }
    }
    topics
        .into_iter()
        .map(|(topic, authors)| (topic, authors.into_iter().collect()))
        .collect()
}

/// Flat module assignment of the citation graph propagated to authors:
/// module id -> sorted author identities of the module's papers. The
/// direction of citations is ignored for the purposes of module detection.
pub fn citation_modules(
    citations: &CitationNetwork,
    paper_authors: &BTreeMap<String, Vec<String>>,
    resolution: f64,
    seed: u64,
) -> BTreeMap<String, Vec<String>> {
    let uids: Vec<String> = citations.papers().map(|p| p.uid.clone()).collect();
    let index: HashMap<&str, usize> = uids
        .iter()
        .enumerate()
        .map(|(i, u)| (u.as_str(), i))
        .collect();
    let edges: Vec<(usize, usize, f64)> = citations
        .citations()
        .map(|(a, b)| (index[a], index[b], 1.0))
        .collect();

    let levels = louvain_levels(uids, edges, resolution, seed);
    let Some(flat) = levels.last() else {
        return BTreeMap::new();
    };

    let mut modules: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (number, papers) in flat.iter().enumerate() {
        let mut authors: BTreeSet<String> = BTreeSet::new();
        for uid in papers {
            if let Some(list) = paper_authors.get(uid) {
                authors.extend(list.iter().cloned());
            }
        }
        if !authors.is_empty() {
            modules.insert(number.to_string(), authors.into_iter().collect());
        }
    }
    modules
}
