// src/network/dyadic.rs - Citation frequencies between study systems

use itertools::Itertools;
use log::debug;
use std::collections::{BTreeMap, BTreeSet};

use crate::models::core::StudySystem;
use crate::network::citation::CitationNetwork;

/// Frequency at which papers of one study system cite papers of another.
///
/// For every ordered pair `(citing, cited)` of systems present in the
/// network, the value is the fraction of all outgoing citations from
/// `citing`-system papers that land on `cited`-system papers. A system with
/// no outgoing citations yields `None` for its row rather than a NaN.
/// Unclassified papers are left out of the tally.
pub fn dyadic_citation_freqs(
    network: &CitationNetwork,
) -> BTreeMap<(StudySystem, StudySystem), Option<f64>> {
    let systems: BTreeSet<StudySystem> = network
        .papers()
        .filter_map(|p| p.study_system)
        .collect();

    let mut pair_counts: BTreeMap<(StudySystem, StudySystem), u64> = BTreeMap::new();
    let mut totals: BTreeMap<StudySystem, u64> = BTreeMap::new();
    let mut skipped = 0usize;

    for (citing, cited) in network.citations() {
        let (Some(citing_sys), Some(cited_sys)) =
            (network.study_system(citing), network.study_system(cited))
        else {
            skipped += 1;
            continue;
        };
        *totals.entry(citing_sys).or_default() += 1;
        *pair_counts.entry((citing_sys, cited_sys)).or_default() += 1;
    }
    if skipped > 0 {
        debug!("{skipped} citations touched unclassified papers and were skipped");
    }

    let mut freqs = BTreeMap::new();
    for (&citing_sys, &cited_sys) in systems.iter().cartesian_product(&systems) {
        let total = totals.get(&citing_sys).copied().unwrap_or(0);
        let count = pair_counts
            .get(&(citing_sys, cited_sys))
            .copied()
            .unwrap_or(0);
        let freq = if total == 0 {
            None
        } else {
            Some(count as f64 / total as f64)
        };
        freqs.insert((citing_sys, cited_sys), freq);
    }
    freqs
}

#[cfg(test)]
mod tests {
    use super::*;
    use StudySystem::{Animal, Fungi, Microbe, Plant};

    /// Network pinned against the reference frequency table: three plant
    /// papers, five animal, three microbe, and one fungal paper that never
    /// cites anything.
    fn fixture() -> CitationNetwork {
        let mut net = CitationNetwork::new();
        for uid in ["p1", "p2", "p3"] {
            net.add_paper(uid, Some(Plant));
        }
        for uid in ["a1", "a2", "a3", "a4", "a5"] {
            net.add_paper(uid, Some(Animal));
        }
        for uid in ["m1", "m2", "m3"] {
            net.add_paper(uid, Some(Microbe));
        }
        net.add_paper("f1", Some(Fungi));

        for (citing, cited) in [
            ("p1", "p2"),
            ("p1", "p3"),
            ("p1", "a1"),
            ("a1", "a4"),
            ("a1", "a3"),
            ("a1", "a2"),
            ("a2", "a3"),
            ("a2", "p3"),
            ("a2", "m2"),
            ("a2", "m1"),
            ("m1", "m2"),
            ("m2", "a5"),
            ("m2", "m3"),
            ("m2", "p2"),
        ] {
            net.add_citation(citing, cited);
        }
        net
    }

    #[test]
    fn test_dyadic_citation_freqs_fixture() {
        let freqs = dyadic_citation_freqs(&fixture());

        assert_eq!(freqs[&(Plant, Animal)], Some(1.0 / 3.0));
        assert_eq!(freqs[&(Plant, Microbe)], Some(0.0));
        assert_eq!(freqs[&(Plant, Fungi)], Some(0.0));
        assert_eq!(freqs[&(Plant, Plant)], Some(2.0 / 3.0));
        assert_eq!(freqs[&(Animal, Plant)], Some(1.0 / 7.0));
        assert_eq!(freqs[&(Animal, Microbe)], Some(2.0 / 7.0));
        assert_eq!(freqs[&(Animal, Fungi)], Some(0.0));
        assert_eq!(freqs[&(Animal, Animal)], Some(4.0 / 7.0));
        assert_eq!(freqs[&(Microbe, Plant)], Some(0.25));
        assert_eq!(freqs[&(Microbe, Animal)], Some(0.25));
        assert_eq!(freqs[&(Microbe, Fungi)], Some(0.0));
        assert_eq!(freqs[&(Microbe, Microbe)], Some(0.5));
        // Fungal papers cite nothing, so their row is undefined.
        for cited in [Plant, Animal, Microbe, Fungi] {
            assert_eq!(freqs[&(Fungi, cited)], None);
        }
        assert_eq!(freqs.len(), 16);
    }

    #[test]
    fn test_unclassified_papers_are_skipped() {
        let mut net = CitationNetwork::new();
        net.add_paper("p1", Some(Plant));
        net.add_paper("x1", None);
        net.add_citation("p1", "x1");

        let freqs = dyadic_citation_freqs(&net);
        assert_eq!(freqs[&(Plant, Plant)], None);
        assert_eq!(freqs.len(), 1);
    }
}
