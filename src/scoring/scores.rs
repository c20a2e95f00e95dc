// src/scoring/scores.rs - Per-signal candidate scores

use std::collections::{BTreeMap, BTreeSet};

use crate::utils::stats::{mean, percentile};

/// Hierarchical-cluster score for one candidate against one cluster type.
///
/// The candidate's raw distances to every enriched cluster are anchored at
/// their `anchor_percentile` (25 by convention). Distances above the anchor
/// normalize against `max - anchor`, distances below it against the anchor
/// itself, and each cluster scores `1 - |normalized offset|`. Both extremes
/// are penalized: a candidate sitting inside the existing network scores as
/// low as one that is far from it. Any lookup miss scores 0.
pub fn mean_hier_score(
    candidate: &str,
    distances: &BTreeMap<String, BTreeMap<String, f64>>,
    enriched: &[String],
    anchor_percentile: f64,
) -> f64 {
    let Some(candidate_distances) = distances.get(candidate) else {
        return 0.0;
    };
    let mut raw = Vec::with_capacity(enriched.len());
    for cluster in enriched {
        match candidate_distances.get(cluster) {
            Some(&d) => raw.push(d),
            None => return 0.0,
        }
    }
    if raw.is_empty() {
        return 0.0;
    }

    let anchor = percentile(&raw, anchor_percentile);
    let max = raw.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let scores: Vec<f64> = raw
        .iter()
        .map(|&d| {
            let offset = d - anchor;
            let normalized = if offset > 0.0 {
                offset / (max - anchor)
            } else if offset < 0.0 {
                offset / anchor
            } else {
                0.0
            };
            1.0 - normalized.abs()
        })
        .collect();
    mean(&scores)
}

/// Topic presence/absence score: the fraction of the candidate's topics
/// that are NOT enriched in known individuals. No topic associations score
/// 0.
pub fn topic_pa_score(
    candidate: &str,
    topics_to_authors: &BTreeMap<i64, Vec<String>>,
    enriched_topics: &[i64],
) -> f64 {
    let scores: Vec<f64> = topics_to_authors
        .iter()
        .filter(|(_, authors)| authors.iter().any(|a| a == candidate))
        .map(|(topic, _)| {
            if enriched_topics.contains(topic) {
                0.0
            } else {
                1.0
            }
        })
        .collect();
    if scores.is_empty() {
        return 0.0;
    }
    mean(&scores)
}

/// Attendee countries split at the median of their attendance counts.
/// Countries at or above the median are common, the rest are rare.
#[derive(Debug, Clone, Default)]
pub struct GeographySplit {
    pub common: BTreeSet<String>,
    pub rare: BTreeSet<String>,
}

pub fn split_attendee_countries(counts: &BTreeMap<String, usize>) -> GeographySplit {
    if counts.is_empty() {
        return GeographySplit::default();
    }
    let values: Vec<f64> = counts.values().map(|&c| c as f64).collect();
    let median = percentile(&values, 50.0);

    let mut split = GeographySplit::default();
    for (country, &count) in counts {
        if count as f64 >= median {
            split.common.insert(country.clone());
        } else {
            split.rare.insert(country.clone());
        }
    }
    split
}

/// Geography score for a candidate whose most recent affiliation country
/// may be unknown. Common attendee countries score 0, rare ones 0.5,
/// known-but-unrepresented countries 1, and an unknown affiliation falls
/// back to the supplied generic score.
pub fn geography_score(country: Option<&str>, split: &GeographySplit, generic: f64) -> f64 {
    match country {
        Some(c) if split.common.contains(c) => 0.0,
        Some(c) if split.rare.contains(c) => 0.5,
        Some(_) => 1.0,
        None => generic,
    }
}

/// Probability-weighted fallback for candidates with no known affiliation,
/// computed from the corpus-wide country distribution: the weight outside
/// attendee countries scores 1, the weight on rare attendee countries
/// scores 0.5.
pub fn generic_geo_score(corpus_weights: &BTreeMap<String, f64>, split: &GeographySplit) -> f64 {
    let attendee_weight: f64 = corpus_weights
        .iter()
        .filter(|(c, _)| split.common.contains(*c) || split.rare.contains(*c))
        .map(|(_, &w)| w)
        .sum();
    let rare_weight: f64 = corpus_weights
        .iter()
        .filter(|(c, _)| split.rare.contains(*c))
        .map(|(_, &w)| w)
        .sum();
    (1.0 - attendee_weight) + rare_weight * 0.5
}

/// Corpus country distribution: each author's most recent affiliation
/// country, as a fraction of all authors with a known affiliation.
pub fn corpus_country_weights(affiliations: &BTreeMap<String, String>) -> BTreeMap<String, f64> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for country in affiliations.values() {
        *counts.entry(country.clone()).or_default() += 1;
    }
    let total = affiliations.len() as f64;
    counts
        .into_iter()
        .map(|(country, count)| (country, count as f64 / total))
        .collect()
}
