// src/scoring/enrichment.rs - Attendee enrichment per cluster

use anyhow::{bail, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;

use crate::utils::stats::percentile;

/// Fraction of each cluster's members that are known individuals, in [0,1].
/// An empty cluster is malformed boundary data and fails loudly.
pub fn cluster_enrichment<K: Ord + Clone + Display>(
    membership: &BTreeMap<K, Vec<String>>,
    known: &BTreeSet<String>,
) -> Result<BTreeMap<K, f64>> {
    let mut enrichment = BTreeMap::new();
    for (cluster, members) in membership {
        if members.is_empty() {
            bail!("cluster '{cluster}' has no members");
        }
        let known_count = members.iter().filter(|m| known.contains(*m)).count();
        enrichment.insert(cluster.clone(), known_count as f64 / members.len() as f64);
    }
    Ok(enrichment)
}

/// Zero out enrichment values below the given percentile of the enrichment
/// distribution, keeping only the top tail as enriched.
pub fn apply_percentile_threshold<K: Ord>(enrichment: &mut BTreeMap<K, f64>, pct: f64) {
    if enrichment.is_empty() {
        return;
    }
    let values: Vec<f64> = enrichment.values().copied().collect();
    let threshold = percentile(&values, pct);
    for value in enrichment.values_mut() {
        if *value < threshold {
            *value = 0.0;
        }
    }
}

/// Clusters that remain enriched after thresholding.
pub fn enriched_ids<K: Ord + Clone>(enrichment: &BTreeMap<K, f64>) -> Vec<K> {
    enrichment
        .iter()
        .filter(|(_, &v)| v > 0.0)
        .map(|(k, _)| k.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn membership(rows: &[(&str, &[&str])]) -> BTreeMap<String, Vec<String>> {
        rows.iter()
            .map(|(id, members)| {
                (
                    id.to_string(),
                    members.iter().map(|m| m.to_string()).collect(),
                )
            })
            .collect()
    }

    fn known(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_enrichment_is_known_fraction() {
        let membership = membership(&[
            ("0-0", &["a", "b", "c", "d"]),
            ("0-1", &["a", "x"]),
            ("1-0", &["x", "y", "z"]),
        ]);
        let enrichment = cluster_enrichment(&membership, &known(&["a", "b"])).unwrap();

        assert_eq!(enrichment["0-0"], 0.5);
        assert_eq!(enrichment["0-1"], 0.5);
        assert_eq!(enrichment["1-0"], 0.0);
        assert!(enrichment.values().all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn test_empty_cluster_is_an_error() {
        let mut membership = membership(&[("0-0", &["a"])]);
        membership.insert("0-1".to_string(), Vec::new());
        assert!(cluster_enrichment(&membership, &known(&["a"])).is_err());
    }

    #[test]
    fn test_percentile_threshold_zeroes_low_tail() {
        let membership = membership(&[
            ("c1", &["a"]),
            ("c2", &["a", "x"]),
            ("c3", &["a", "x", "y", "z"]),
            ("c4", &["x"]),
        ]);
        let mut enrichment = cluster_enrichment(&membership, &known(&["a"])).unwrap();
        // Values: 1.0, 0.5, 0.25, 0.0. The 75th percentile is 0.625, so
        // only the fully-known cluster survives.
        apply_percentile_threshold(&mut enrichment, 75.0);

        assert_eq!(enriched_ids(&enrichment), vec!["c1".to_string()]);
        assert_eq!(enrichment["c2"], 0.0);
    }

    #[test]
    fn test_enriched_ids_without_threshold() {
        let membership = membership(&[("c1", &["a", "x"]), ("c2", &["x"])]);
        let enrichment = cluster_enrichment(&membership, &known(&["a"])).unwrap();
        assert_eq!(enriched_ids(&enrichment), vec!["c1".to_string()]);
    }
}
