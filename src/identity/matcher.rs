// src/identity/matcher.rs - Attribute corpus papers to roster individuals

use log::{debug, info, warn};
use std::collections::BTreeMap;
use strsim::jaro_winkler;

use crate::models::core::{Paper, PaperAuthor};
use crate::models::identity::{CanonicalKey, NameLookup, RosterExpansion};
use crate::utils::progress::ProgressConfig;
use crate::utils::text::remove_periods;

/// Similarity floor for reporting a near-miss between an unmatched byline
/// and a known surface form.
const NEAR_MISS_SIMILARITY: f64 = 0.95;

/// An author byline that hit a collided surface form. The paper is not
/// attributed to anyone; all owners of the form are reported for manual
/// review.
#[derive(Debug, Clone, PartialEq)]
pub struct AmbiguousMatch {
    pub paper_uid: String,
    pub byline: String,
    pub candidates: Vec<CanonicalKey>,
}

/// An unmatched byline that is nearly identical to a known surface form,
/// usually a typo or an uncurated spelling worth adding to the table.
#[derive(Debug, Clone, PartialEq)]
pub struct NearMiss {
    pub paper_uid: String,
    pub byline: String,
    pub closest_form: String,
    pub similarity: f64,
}

/// Result of one attribution pass over the corpus.
#[derive(Debug, Clone, Default)]
pub struct MatchOutcome {
    /// Paper uids per roster individual, corpus order. Every roster key is
    /// present, individuals with no attributed papers map to an empty list.
    pub author_papers: BTreeMap<CanonicalKey, Vec<String>>,
    pub ambiguous: Vec<AmbiguousMatch>,
    pub near_misses: Vec<NearMiss>,
    /// Author entries carrying no WOS-standard name at all.
    pub missing_wos_standard: usize,
}

impl MatchOutcome {
    pub fn attributed_paper_count(&self) -> usize {
        self.author_papers.values().map(|v| v.len()).sum()
    }

    pub fn matched_people(&self) -> usize {
        self.author_papers.values().filter(|v| !v.is_empty()).count()
    }
}

/// Walk every author byline of every paper and attribute papers to roster
/// individuals through the surface-form lookup.
///
/// Both the free-text `full_name` and the `wos_standard` rendering are
/// tried, each first as written (lowercased) and then with periods removed.
/// The first candidate that resolves wins; a byline whose only hits are
/// collided forms is recorded as ambiguous instead of attributed.
pub fn find_author_papers(
    papers: &[Paper],
    expansion: &RosterExpansion,
    lookup: &NameLookup,
    progress: &ProgressConfig,
) -> MatchOutcome {
    let mut outcome = MatchOutcome::default();
    for key in expansion.keys() {
        outcome.author_papers.insert(key.clone(), Vec::new());
    }

    let bar = progress.create_bar(papers.len() as u64, "Matching roster names");
    for paper in papers {
        for author in &paper.authors {
            if author.wos_standard.is_none() {
                outcome.missing_wos_standard += 1;
            }
            match_byline(paper, author_candidates(author), lookup, &mut outcome);
        }
        if let Some(bar) = &bar {
            bar.inc(1);
        }
    }
    if let Some(bar) = &bar {
        bar.finish_with_message("Roster matching complete");
    }

    info!(
        "attributed {} papers across {} of {} roster individuals ({} ambiguous bylines, {} author entries without wos_standard)",
        outcome.attributed_paper_count(),
        outcome.matched_people(),
        outcome.author_papers.len(),
        outcome.ambiguous.len(),
        outcome.missing_wos_standard,
    );
    outcome
}

/// Candidate strings for one byline, in matching priority order.
fn author_candidates(author: &PaperAuthor) -> Vec<String> {
    let mut candidates = Vec::with_capacity(2);
    let full = author.full_name.trim().to_lowercase();
    if !full.is_empty() {
        candidates.push(full);
    }
    if let Some(wos) = author.identity() {
        if !candidates.contains(&wos) {
            candidates.push(wos);
        }
    }
    candidates
}

fn match_byline(
    paper: &Paper,
    candidates: Vec<String>,
    lookup: &NameLookup,
    outcome: &mut MatchOutcome,
) {
    let mut collided: Option<String> = None;

    for candidate in &candidates {
        for form in [candidate.clone(), remove_periods(candidate)] {
            if let Some(key) = lookup.resolve(&form) {
                let papers = outcome
                    .author_papers
                    .get_mut(key)
                    .expect("lookup keys come from the expanded roster");
                if !papers.contains(&paper.uid) {
                    papers.push(paper.uid.clone());
                }
                return;
            }
            if collided.is_none() && lookup.collision_candidates(&form).is_some() {
                collided = Some(form);
            }
        }
    }

    if let Some(form) = collided {
        let candidates = lookup
            .collision_candidates(&form)
            .unwrap_or_default()
            .to_vec();
        warn!(
            "byline '{}' on {} is ambiguous between {:?}",
            form, paper.uid, candidates
        );
        outcome.ambiguous.push(AmbiguousMatch {
            paper_uid: paper.uid.clone(),
            byline: form,
            candidates,
        });
        return;
    }

    record_near_miss(paper, &candidates, lookup, outcome);
}

/// Compare an unmatched byline against every known form and keep the best
/// scorer when it clears the similarity floor. Similarity ties resolve to
/// the lexicographically greatest form, independent of table iteration
/// order. Quadratic in the worst case but bylines rarely miss and the form
/// table is small.
fn record_near_miss(
    paper: &Paper,
    candidates: &[String],
    lookup: &NameLookup,
    outcome: &mut MatchOutcome,
) {
    for candidate in candidates {
        let mut best: Option<(f64, &String)> = None;
        for (form, _) in lookup.iter_forms() {
            let similarity = jaro_winkler(candidate, form);
            if similarity < NEAR_MISS_SIMILARITY {
                continue;
            }
            let better = match best {
                None => true,
                Some((s, f)) => similarity > s || (similarity == s && form.as_str() > f.as_str()),
            };
            if better {
                best = Some((similarity, form));
            }
        }
        if let Some((similarity, form)) = best {
            debug!(
                "byline '{}' on {} nearly matches form '{}' ({:.3})",
                candidate, paper.uid, form, similarity
            );
            outcome.near_misses.push(NearMiss {
                paper_uid: paper.uid.clone(),
                byline: candidate.clone(),
                closest_form: form.clone(),
                similarity,
            });
            return;
        }
    }
}
