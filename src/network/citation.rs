// src/network/citation.rs - Directed paper citation network with study-system labels

use log::info;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::{HashMap, HashSet};

use crate::models::core::StudySystem;

/// One paper in the citation network. The study system is assigned by an
/// external classifier and may be absent for records the classifier never
/// saw.
#[derive(Debug, Clone, PartialEq)]
pub struct PaperNode {
    pub uid: String,
    pub study_system: Option<StudySystem>,
}

/// Criteria for thinning the citation network before downstream analysis.
/// One rule is applied per pass, matching how runs are configured.
#[derive(Debug, Clone)]
pub enum PruneRule {
    /// Keep only papers that are among the main search results.
    MainResultsOnly(HashSet<String>),
    /// Drop papers with no outgoing citations.
    RemoveDeadEnds,
    /// Drop papers cited fewer than this many times.
    ThresholdInDegree(usize),
    /// Drop papers the classifier could not assign a study system.
    RemoveNoClass,
}

/// Directed citation graph keyed by paper uid.
#[derive(Debug, Clone, Default)]
pub struct CitationNetwork {
    graph: DiGraph<PaperNode, ()>,
    index: HashMap<String, NodeIndex>,
}

impl CitationNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or update a paper node. A known study system always wins over
    /// an earlier `None` for the same uid.
    pub fn add_paper(&mut self, uid: &str, study_system: Option<StudySystem>) -> NodeIndex {
        match self.index.get(uid) {
            Some(&idx) => {
                if study_system.is_some() {
                    self.graph[idx].study_system = study_system;
                }
                idx
            }
            None => {
                let idx = self.graph.add_node(PaperNode {
                    uid: uid.to_string(),
                    study_system,
                });
                self.index.insert(uid.to_string(), idx);
                idx
            }
        }
    }

    /// Record that `citing` cites `cited`, creating either node on demand.
    /// Parallel citations between the same pair are collapsed.
    pub fn add_citation(&mut self, citing: &str, cited: &str) {
        let a = self.add_paper(citing, None);
        let b = self.add_paper(cited, None);
        if !self.graph.contains_edge(a, b) {
            self.graph.add_edge(a, b, ());
        }
    }

    pub fn contains(&self, uid: &str) -> bool {
        self.index.contains_key(uid)
    }

    pub fn study_system(&self, uid: &str) -> Option<StudySystem> {
        self.index.get(uid).and_then(|&idx| self.graph[idx].study_system)
    }

    pub fn paper_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn citation_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn papers(&self) -> impl Iterator<Item = &PaperNode> {
        self.graph.node_indices().map(move |idx| &self.graph[idx])
    }

    /// All citation edges as (citing uid, cited uid).
    pub fn citations(&self) -> impl Iterator<Item = (&str, &str)> {
        self.graph.edge_indices().filter_map(move |e| {
            let (a, b) = self.graph.edge_endpoints(e)?;
            Some((self.graph[a].uid.as_str(), self.graph[b].uid.as_str()))
        })
    }

    pub fn out_degree(&self, uid: &str) -> Option<usize> {
        self.index
            .get(uid)
            .map(|&idx| self.graph.edges_directed(idx, Direction::Outgoing).count())
    }

    pub fn in_degree(&self, uid: &str) -> Option<usize> {
        self.index
            .get(uid)
            .map(|&idx| self.graph.edges_directed(idx, Direction::Incoming).count())
    }

    /// Apply one prune rule, dropping the matching nodes and every edge
    /// touching them.
    pub fn prune(&mut self, rule: &PruneRule) {
        let before = self.graph.node_count();
        let graph = &self.graph;
        let keep: Vec<bool> = graph
            .node_indices()
            .map(|idx| match rule {
                PruneRule::MainResultsOnly(main) => main.contains(&graph[idx].uid),
                PruneRule::RemoveDeadEnds => {
                    graph.edges_directed(idx, Direction::Outgoing).count() > 0
                }
                PruneRule::ThresholdInDegree(min) => {
                    graph.edges_directed(idx, Direction::Incoming).count() >= *min
                }
                PruneRule::RemoveNoClass => graph[idx].study_system.is_some(),
            })
            .collect();

        self.graph.retain_nodes(|_, idx| keep[idx.index()]);
        self.index = self
            .graph
            .node_indices()
            .map(|idx| (self.graph[idx].uid.clone(), idx))
            .collect();

        info!(
            "citation network pruned from {} to {} papers",
            before,
            self.graph.node_count()
        );
    }
}
