// src/scoring/recommend.rs - Composite candidate scoring and ranking

use anyhow::Result;
use log::info;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use crate::clustering::tree::HierarchyAnalysis;
use crate::scoring::enrichment::{apply_percentile_threshold, cluster_enrichment, enriched_ids};
use crate::scoring::scores::{
    corpus_country_weights, generic_geo_score, geography_score, mean_hier_score,
    split_attendee_countries, topic_pa_score, GeographySplit,
};
use crate::utils::stats::mean;

const DEFAULT_ANCHOR_PERCENTILE: f64 = 25.0;

/// How many ranked candidates to keep.
#[derive(Debug, Clone, Copy)]
pub enum Cutoff {
    /// Top K candidates.
    Count(usize),
    /// Top fraction of the ranked list, 0 to 1.
    Proportion(f64),
}

impl Cutoff {
    /// Number of candidates the cutoff keeps, never more than the list
    /// holds even for out-of-range proportions.
    pub fn take(&self, ranked_len: usize) -> usize {
        match *self {
            Cutoff::Count(k) => k.min(ranked_len),
            Cutoff::Proportion(p) => ((ranked_len as f64 * p) as usize).min(ranked_len),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScoringConfig {
    /// Percentile anchoring the hierarchical-distance penalty.
    pub anchor_percentile: f64,
    /// Optional enrichment percentile threshold; clusters below it are
    /// treated as unenriched. Small conferences leave this unset.
    pub enrichment_percentile: Option<f64>,
    pub cutoff: Cutoff,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            anchor_percentile: DEFAULT_ANCHOR_PERCENTILE,
            enrichment_percentile: None,
            cutoff: Cutoff::Proportion(0.1),
        }
    }
}

/// Per-candidate score breakdown. Signals that could not be computed for a
/// run (no topic data, no geographic data) are absent rather than zero.
#[derive(Debug, Clone)]
pub struct CandidateScore {
    pub name: String,
    pub co_citation: Option<f64>,
    pub co_author: Option<f64>,
    pub topic: Option<f64>,
    pub geography: Option<f64>,
    pub composite: f64,
}

/// All inputs the scorer consumes, assembled by the pipeline after
/// matching, network construction, and clustering.
#[derive(Debug, Clone)]
pub struct RecommendationEngine {
    /// Hierarchical clustering of the co-citation network.
    pub co_citation: HierarchyAnalysis,
    /// Hierarchical clustering of the co-authorship network.
    pub co_author: HierarchyAnalysis,
    /// Topic id -> authors, when an external topic assignment was supplied.
    pub topics: Option<BTreeMap<i64, Vec<String>>>,
    /// Author identity -> most recent affiliation country (ISO alpha-3).
    pub affiliations: Option<BTreeMap<String, String>>,
    /// Attendance counts per country from the registration roster.
    pub attendee_countries: Option<BTreeMap<String, usize>>,
    /// Every surface form of every roster individual. Candidates carrying
    /// one of these names are roster members and are excluded.
    pub known_forms: BTreeSet<String>,
    pub config: ScoringConfig,
}

impl RecommendationEngine {
    /// Score and rank every candidate author: descending composite score,
    /// name as tiebreak. Roster members are excluded from the ranking.
    pub fn recommend(&self) -> Result<Vec<CandidateScore>> {
        let enriched_cocite = self.enriched_clusters(&self.co_citation)?;
        let enriched_coauthor = self.enriched_clusters(&self.co_author)?;

        let enriched_topics: Option<Vec<i64>> = match &self.topics {
            Some(topics) => {
                let mut enrichment = cluster_enrichment(topics, &self.known_forms)?;
                if let Some(pct) = self.config.enrichment_percentile {
                    apply_percentile_threshold(&mut enrichment, pct);
                }
                Some(enriched_ids(&enrichment))
            }
            None => None,
        };

        let geography = self.geography_context();

        let mut scores: Vec<CandidateScore> = self
            .candidates()
            .into_iter()
            .map(|name| {
                self.score_candidate(
                    name,
                    &enriched_cocite,
                    &enriched_coauthor,
                    enriched_topics.as_deref(),
                    geography.as_ref(),
                )
            })
            .collect();

        scores.sort_by(|a, b| {
            b.composite
                .partial_cmp(&a.composite)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.name.cmp(&b.name))
        });
        info!(
            "scored {} candidates ({} roster forms excluded)",
            scores.len(),
            self.known_forms.len()
        );
        Ok(scores)
    }

    /// Apply the configured cutoff to a ranked list.
    pub fn select<'a>(&self, ranked: &'a [CandidateScore]) -> &'a [CandidateScore] {
        &ranked[..self.config.cutoff.take(ranked.len())]
    }

    /// Composite score for any author name. Roster members always score 0.
    pub fn composite_for(&self, name: &str, ranked: &[CandidateScore]) -> f64 {
        if self.known_forms.contains(name) {
            return 0.0;
        }
        ranked
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.composite)
            .unwrap_or(0.0)
    }

    /// Candidate universe: every author either network knows about, minus
    /// roster members.
    fn candidates(&self) -> Vec<&str> {
        let mut names: BTreeSet<&str> = self
            .co_citation
            .distances
            .keys()
            .chain(self.co_author.distances.keys())
            .map(|s| s.as_str())
            .collect();
        names.retain(|name| !self.known_forms.contains(*name));
        names.into_iter().collect()
    }

    fn enriched_clusters(&self, analysis: &HierarchyAnalysis) -> Result<Vec<String>> {
        let mut enrichment = cluster_enrichment(&analysis.membership, &self.known_forms)?;
        if let Some(pct) = self.config.enrichment_percentile {
            apply_percentile_threshold(&mut enrichment, pct);
        }
        Ok(enriched_ids(&enrichment))
    }

    fn geography_context(&self) -> Option<GeographyContext> {
        let attendee_countries = self.attendee_countries.as_ref()?;
        let affiliations = self.affiliations.as_ref()?;
        let split = split_attendee_countries(attendee_countries);
        let generic = generic_geo_score(&corpus_country_weights(affiliations), &split);
        Some(GeographyContext { split, generic })
    }

    fn score_candidate(
        &self,
        name: &str,
        enriched_cocite: &[String],
        enriched_coauthor: &[String],
        enriched_topics: Option<&[i64]>,
        geography: Option<&GeographyContext>,
    ) -> CandidateScore {
        let anchor = self.config.anchor_percentile;
        let co_citation =
            mean_hier_score(name, &self.co_citation.distances, enriched_cocite, anchor);
        let co_author =
            mean_hier_score(name, &self.co_author.distances, enriched_coauthor, anchor);

        let mut signals = vec![co_citation, co_author];

        // The topic signal only counts when both network signals exist,
        // otherwise topic overlap dominates sparse runs.
        let topic = match (&self.topics, enriched_topics) {
            (Some(topics), Some(enriched)) => {
                let t = topic_pa_score(name, topics, enriched);
                signals.push(t);
                Some(t)
            }
            _ => None,
        };

        let geography_signal = geography.map(|ctx| {
            let country = self
                .affiliations
                .as_ref()
                .and_then(|a| a.get(name))
                .map(|c| c.as_str());
            let g = geography_score(country, &ctx.split, ctx.generic);
            signals.push(g);
            g
        });

        CandidateScore {
            name: name.to_string(),
            co_citation: Some(co_citation),
            co_author: Some(co_author),
            topic,
            geography: geography_signal,
            composite: mean(&signals),
        }
    }
}

struct GeographyContext {
    split: GeographySplit,
    generic: f64,
}
