// src/network/builder.rs - Weighted co-authorship and co-citation networks

use log::info;
use petgraph::graph::{NodeIndex, UnGraph};
use serde_json::{json, Value};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::models::core::Paper;
use crate::network::citation::CitationNetwork;

/// One author identity in a collaboration network. `is_conference_attendee`
/// starts false and is set by tagging passes: first for roster surface
/// forms, later for selected candidates.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthorNode {
    pub name: String,
    pub is_conference_attendee: bool,
}

/// Weighted undirected author network. Edge weights count co-occurrences:
/// shared papers for co-authorship, citation pairings for co-citation.
#[derive(Debug, Clone, Default)]
pub struct AuthorNetwork {
    graph: UnGraph<AuthorNode, u32>,
    index: HashMap<String, NodeIndex>,
}

/// Author identities per paper uid, deduplicated, byline order preserved
/// per paper.
pub fn paper_author_index(papers: &[Paper]) -> BTreeMap<String, Vec<String>> {
    let mut index: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for paper in papers {
        let entry = index.entry(paper.uid.clone()).or_default();
        for author in &paper.authors {
            if let Some(identity) = author.identity() {
                if !entry.contains(&identity) {
                    entry.push(identity);
                }
            }
        }
    }
    index
}

/// Authored-paper counts per identity, used for production pruning.
pub fn author_production(papers: &[Paper]) -> HashMap<String, usize> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for paper in papers {
        let mut seen: BTreeSet<String> = BTreeSet::new();
        for author in &paper.authors {
            if let Some(identity) = author.identity() {
                if seen.insert(identity.clone()) {
                    *counts.entry(identity).or_default() += 1;
                }
            }
        }
    }
    counts
}

/// Build the co-authorship network: one edge per unordered author pair,
/// weighted by the number of papers they share. Self-pairs are excluded,
/// authors without a WOS-standard identity are skipped per paper.
pub fn co_author_network(papers: &[Paper]) -> AuthorNetwork {
    let mut weights: BTreeMap<(String, String), u32> = BTreeMap::new();
    for paper in papers {
        let authors: Vec<String> = paper
            .authors
            .iter()
            .filter_map(|a| a.identity())
            .collect();
        accumulate_pairs(&mut weights, &authors, &authors);
    }
    let net = AuthorNetwork::from_weights(weights);
    info!(
        "co-authorship network: {} authors, {} edges",
        net.author_count(),
        net.edge_count()
    );
    net
}

/// Build the co-citation network: for every citation edge, every author of
/// the citing paper is paired with every author of the cited paper.
pub fn co_citation_network(
    citations: &CitationNetwork,
    paper_authors: &BTreeMap<String, Vec<String>>,
) -> AuthorNetwork {
    let empty: Vec<String> = Vec::new();
    let mut weights: BTreeMap<(String, String), u32> = BTreeMap::new();
    for (citing, cited) in citations.citations() {
        let citing_authors = paper_authors.get(citing).unwrap_or(&empty);
        let cited_authors = paper_authors.get(cited).unwrap_or(&empty);
        accumulate_pairs(&mut weights, citing_authors, cited_authors);
    }
    let net = AuthorNetwork::from_weights(weights);
    info!(
        "co-citation network: {} authors, {} edges",
        net.author_count(),
        net.edge_count()
    );
    net
}

/// Accumulate weight for every cross pair of the two author lists, keyed by
/// the sorted pair so reverse orderings land on the same edge.
fn accumulate_pairs(
    weights: &mut BTreeMap<(String, String), u32>,
    left: &[String],
    right: &[String],
) {
    for (i, a) in left.iter().enumerate() {
        // When pairing a list against itself, start past the diagonal so
        // each unordered pair is counted once.
        let start = if std::ptr::eq(left, right) { i + 1 } else { 0 };
        for b in &right[start..] {
            if a == b {
                continue;
            }
            let key = if a < b {
                (a.clone(), b.clone())
            } else {
                (b.clone(), a.clone())
            };
            *weights.entry(key).or_default() += 1;
        }
    }
}

impl AuthorNetwork {
    fn from_weights(weights: BTreeMap<(String, String), u32>) -> Self {
        let mut net = AuthorNetwork::default();
        for ((a, b), weight) in weights {
            let a = net.ensure_node(&a);
            let b = net.ensure_node(&b);
            net.graph.add_edge(a, b, weight);
        }
        net
    }

    fn ensure_node(&mut self, name: &str) -> NodeIndex {
        match self.index.get(name) {
            Some(&idx) => idx,
            None => {
                let idx = self.graph.add_node(AuthorNode {
                    name: name.to_string(),
                    is_conference_attendee: false,
                });
                self.index.insert(name.to_string(), idx);
                idx
            }
        }
    }

    pub fn author_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn authors(&self) -> impl Iterator<Item = &str> {
        self.graph
            .node_indices()
            .map(move |idx| self.graph[idx].name.as_str())
    }

    pub fn edge_weight(&self, a: &str, b: &str) -> Option<u32> {
        let a = *self.index.get(a)?;
        let b = *self.index.get(b)?;
        let edge = self.graph.find_edge(a, b)?;
        self.graph.edge_weight(edge).copied()
    }

    /// Weighted edges as (a, b, weight), used by the Louvain pass.
    pub fn weighted_edges(&self) -> impl Iterator<Item = (&str, &str, u32)> {
        self.graph.edge_indices().filter_map(move |e| {
            let (a, b) = self.graph.edge_endpoints(e)?;
            Some((
                self.graph[a].name.as_str(),
                self.graph[b].name.as_str(),
                *self.graph.edge_weight(e)?,
            ))
        })
    }

    /// Flag every node whose name appears in the given set.
    pub fn mark_attendees(&mut self, names: &BTreeSet<String>) -> usize {
        let mut marked = 0;
        for idx in self.graph.node_indices() {
            if names.contains(&self.graph[idx].name) {
                self.graph[idx].is_conference_attendee = true;
                marked += 1;
            }
        }
        marked
    }

    pub fn is_attendee(&self, name: &str) -> Option<bool> {
        self.index
            .get(name)
            .map(|&idx| self.graph[idx].is_conference_attendee)
    }

    /// Drop the least productive authors, keeping the top `keep` fraction.
    /// Nodes are ranked ascending by authored-paper count with the name as
    /// tiebreak; authors absent from the production table count as zero.
    pub fn prune_by_production(&mut self, production: &HashMap<String, usize>, keep: f64) {
        let before = self.graph.node_count();
        let mut ranked: Vec<(usize, &str)> = self
            .graph
            .node_indices()
            .map(|idx| {
                let name = self.graph[idx].name.as_str();
                (production.get(name).copied().unwrap_or(0), name)
            })
            .collect();
        ranked.sort();
        let remove_count = (before as f64 * (1.0 - keep)) as usize;
        let doomed: BTreeSet<String> = ranked
            .iter()
            .take(remove_count)
            .map(|(_, name)| name.to_string())
            .collect();

        let graph = &self.graph;
        let keep_flags: Vec<bool> = graph
            .node_indices()
            .map(|idx| !doomed.contains(&graph[idx].name))
            .collect();
        self.graph.retain_nodes(|_, idx| keep_flags[idx.index()]);
        self.index = self
            .graph
            .node_indices()
            .map(|idx| (self.graph[idx].name.clone(), idx))
            .collect();

        info!(
            "production pruning kept {} of {} authors (keep proportion {})",
            self.graph.node_count(),
            before,
            keep
        );
    }

    /// Node-link JSON rendering with "yes"/"no" attendee tags, the exchange
    /// format for the annotated output graphs.
    pub fn to_node_link_json(&self) -> Value {
        let nodes: Vec<Value> = self
            .graph
            .node_indices()
            .map(|idx| {
                let node = &self.graph[idx];
                json!({
                    "id": node.name,
                    "is_conference_attendee": if node.is_conference_attendee { "yes" } else { "no" },
                })
            })
            .collect();
        let links: Vec<Value> = self
            .graph
            .edge_indices()
            .filter_map(|e| {
                let (a, b) = self.graph.edge_endpoints(e)?;
                Some(json!({
                    "source": self.graph[a].name,
                    "target": self.graph[b].name,
                    "weight": self.graph.edge_weight(e).copied()?,
                }))
            })
            .collect();
        json!({ "directed": false, "nodes": nodes, "links": links })
    }
}
