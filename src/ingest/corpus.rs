// src/ingest/corpus.rs - JSONL paper corpus loading and shaping

use anyhow::{Context, Result};
use log::{info, warn};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::models::core::Paper;
use crate::network::citation::CitationNetwork;

/// Read a JSONL corpus, one paper per line. Blank lines are skipped; a
/// malformed line is a hard error carrying its line number.
pub fn read_jsonl(path: &Path) -> Result<Vec<Paper>> {
    let file = File::open(path)
        .with_context(|| format!("failed to open corpus file {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut papers = Vec::new();
    for (number, line) in reader.lines().enumerate() {
        let line = line.with_context(|| {
            format!("failed to read line {} of {}", number + 1, path.display())
        })?;
        if line.trim().is_empty() {
            continue;
        }
        let paper: Paper = serde_json::from_str(&line).with_context(|| {
            format!("malformed paper on line {} of {}", number + 1, path.display())
        })?;
        papers.push(paper);
    }
    info!("read {} papers from {}", papers.len(), path.display());
    Ok(papers)
}

/// Promote every reference to a top-level record alongside the main
/// results. References carry no author data; they flatten to bare records.
pub fn flatten_corpus(papers: &[Paper]) -> Vec<Paper> {
    let mut flattened = Vec::with_capacity(papers.len());
    for paper in papers {
        flattened.push(paper.clone());
        for reference in &paper.references {
            flattened.push(Paper {
                uid: reference.uid.clone(),
                title: reference.title.clone().unwrap_or_default(),
                abstract_text: reference.abstract_text.clone(),
                year: reference.year,
                authors: Vec::new(),
                addresses: Vec::new(),
                references: Vec::new(),
                study_system: None,
                topic: None,
            });
        }
    }
    flattened
}

/// Drop every reference that is not itself a main result and backfill the
/// surviving references with the abstract of their main-result record.
pub fn prune_corpus(papers: &[Paper]) -> Vec<Paper> {
    let abstracts: HashMap<&str, &str> = papers
        .iter()
        .filter_map(|p| Some((p.uid.as_str(), p.abstract_text.as_deref()?)))
        .collect();
    let main_uids: std::collections::HashSet<&str> =
        papers.iter().map(|p| p.uid.as_str()).collect();

    let mut pruned = Vec::with_capacity(papers.len());
    let mut dropped = 0usize;
    for paper in papers {
        let mut paper = paper.clone();
        let before = paper.references.len();
        paper.references.retain(|r| main_uids.contains(r.uid.as_str()));
        dropped += before - paper.references.len();
        for reference in &mut paper.references {
            if let Some(&abstract_text) = abstracts.get(reference.uid.as_str()) {
                reference.abstract_text = Some(abstract_text.to_string());
            }
        }
        pruned.push(paper);
    }
    info!("pruned {} references that are not main results", dropped);
    pruned
}

/// Copy study-system labels from the classified citation network onto the
/// papers. Papers the network does not know are dropped.
pub fn apply_classifications(papers: Vec<Paper>, network: &CitationNetwork) -> Vec<Paper> {
    let before = papers.len();
    let classified: Vec<Paper> = papers
        .into_iter()
        .filter_map(|mut paper| {
            if !network.contains(&paper.uid) {
                return None;
            }
            paper.study_system = network.study_system(&paper.uid);
            Some(paper)
        })
        .collect();
    if classified.len() < before {
        warn!(
            "{} papers were absent from the citation network and dropped",
            before - classified.len()
        );
    }
    classified
}
