// src/ingest/network.rs - Classified citation network and topic map readers

use anyhow::{Context, Result};
use log::info;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::models::core::StudySystem;
use crate::network::citation::CitationNetwork;

#[derive(Debug, Deserialize)]
struct NodeRecord {
    id: String,
    #[serde(default)]
    study_system: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LinkRecord {
    source: String,
    target: String,
}

#[derive(Debug, Deserialize)]
struct NodeLinkGraph {
    #[serde(default)]
    nodes: Vec<NodeRecord>,
    #[serde(default)]
    links: Vec<LinkRecord>,
}

/// Read a classified citation network from a JSON node-link file. Node ids
/// are paper uids and links point from citing to cited paper. A node with an
/// unknown study-system label is a boundary error.
pub fn read_citation_network(path: &Path) -> Result<CitationNetwork> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read citation network {}", path.display()))?;
    let graph: NodeLinkGraph = serde_json::from_str(&raw)
        .with_context(|| format!("malformed citation network {}", path.display()))?;

    let mut network = CitationNetwork::new();
    for node in &graph.nodes {
        let system = match node.study_system.as_deref() {
            Some(label) => Some(label.parse::<StudySystem>().with_context(|| {
                format!("node '{}' in {}", node.id, path.display())
            })?),
            None => None,
        };
        network.add_paper(&node.id, system);
    }
    for link in &graph.links {
        network.add_citation(&link.source, &link.target);
    }
    info!(
        "read citation network from {}: {} papers, {} citations",
        path.display(),
        network.paper_count(),
        network.citation_count()
    );
    Ok(network)
}

/// Read a paper-to-topic assignment map from a JSON object of uid to topic
/// number.
pub fn read_topic_map(path: &Path) -> Result<BTreeMap<String, i64>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read topic map {}", path.display()))?;
    let topics: BTreeMap<String, i64> = serde_json::from_str(&raw)
        .with_context(|| format!("malformed topic map {}", path.display()))?;
    info!("read {} topic assignments from {}", topics.len(), path.display());
    Ok(topics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_read_citation_network() {
        let path = write_temp(
            "cite_net_basic.json",
            r#"{
                "directed": true,
                "nodes": [
                    {"id": "paper1", "study_system": "Plant"},
                    {"id": "paper2", "study_system": "Animal"},
                    {"id": "paper3"}
                ],
                "links": [
                    {"source": "paper1", "target": "paper2"},
                    {"source": "paper3", "target": "paper2"}
                ]
            }"#,
        );
        let network = read_citation_network(&path).unwrap();
        assert_eq!(network.paper_count(), 3);
        assert_eq!(network.citation_count(), 2);
        assert_eq!(network.study_system("paper1"), Some(StudySystem::Plant));
        assert_eq!(network.study_system("paper3"), None);
    }

    #[test]
    fn test_read_citation_network_rejects_unknown_label() {
        let path = write_temp(
            "cite_net_bad_label.json",
            r#"{"nodes": [{"id": "p1", "study_system": "Mineral"}], "links": []}"#,
        );
        assert!(read_citation_network(&path).is_err());
    }

    #[test]
    fn test_read_topic_map() {
        let path = write_temp(
            "topic_map_basic.json",
            r#"{"paper1": 0, "paper2": 1, "paper3": -1}"#,
        );
        let topics = read_topic_map(&path).unwrap();
        assert_eq!(topics["paper1"], 0);
        assert_eq!(topics["paper3"], -1);
    }
}
