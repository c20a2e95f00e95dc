// src/main.rs
use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::Parser;
use log::{info, warn};
use std::{
    collections::{BTreeSet, HashMap},
    fs,
    path::PathBuf,
    time::{Duration, Instant},
};
use uuid::Uuid;

use recommend_lib::{
    clustering::analyzer::{analyze_author_network, topics_to_authors},
    identity::{
        alt_names::expand_roster,
        geography::most_recent_affiliations,
        matcher::find_author_papers,
        surface_forms::build_lookup,
    },
    ingest::{
        corpus::{apply_classifications, read_jsonl},
        network::{read_citation_network, read_topic_map},
        tables::{attendee_country_counts, read_alt_names, read_roster, roster_alt_rows},
    },
    network::{
        builder::{author_production, co_author_network, co_citation_network, paper_author_index},
        citation::PruneRule,
        dyadic::dyadic_citation_freqs,
    },
    scoring::recommend::{Cutoff, RecommendationEngine, ScoringConfig},
    utils::progress::ProgressConfig,
};

/// Generate conference invite recommendations from bibliometric signals.
#[derive(Parser, Debug)]
#[command(name = "recommend", version, about)]
struct Args {
    /// JSONL dataset with papers, authors and institutions
    corpus: PathBuf,

    /// Classified citation network as a JSON node-link file
    citation_network: PathBuf,

    /// Attendee roster CSV: Surname, First_name, Affiliation, Country
    attendees: PathBuf,

    /// Alternative publication names CSV: Registration_surname,
    /// Registration_first_name, Alternative_name_1..., Maiden_name
    alt_names: PathBuf,

    /// Directory to save output
    outpath: PathBuf,

    /// String to prepend to output file names
    outprefix: String,

    /// Paper-to-topic assignment JSON; enables the topic signal
    #[arg(long)]
    topic_map: Option<PathBuf>,

    /// Proportion of top candidates to return
    #[arg(long, default_value_t = 0.1)]
    cutoff: f64,

    /// Fixed number of top candidates to return, overrides --cutoff
    #[arg(long)]
    cutoff_count: Option<usize>,

    /// Percentile (0-100) below which cluster enrichment is zeroed. Small
    /// conferences should leave this unset
    #[arg(long)]
    enrich_threshold: Option<f64>,

    /// Proportion (0-1) of most productive authors to keep in the networks
    #[arg(long)]
    prod_threshold: Option<f64>,

    /// Drop unclassified papers from the citation network before analysis
    #[arg(long)]
    remove_noclass: bool,

    /// Louvain resolution
    #[arg(long, default_value_t = 1.0)]
    resolution: f64,

    /// Louvain shuffle seed
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Save cluster-to-author maps alongside the candidate list
    #[arg(long)]
    save_clusters: bool,
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let args = Args::parse();
    if args.cutoff_count.is_none() && !(args.cutoff > 0.0 && args.cutoff <= 1.0) {
        bail!("--cutoff must be a proportion in (0, 1], got {}", args.cutoff);
    }
    let run_id = Uuid::new_v4();
    let started = Utc::now();
    info!("Starting recommendation run {} at {}", run_id, started);

    let start_time = Instant::now();
    let mut phase_times: HashMap<String, Duration> = HashMap::new();
    let selected = run_pipeline(&args, &mut phase_times)?;

    let mut phases: Vec<(&String, &Duration)> = phase_times.iter().collect();
    phases.sort_by_key(|(_, d)| std::cmp::Reverse(**d));
    for (phase, duration) in phases {
        info!("phase {}: {:.2?}", phase, duration);
    }
    info!(
        "Run {} complete in {:.2?}: {} candidates selected",
        run_id,
        start_time.elapsed(),
        selected
    );
    Ok(())
}

fn run_pipeline(args: &Args, phase_times: &mut HashMap<String, Duration>) -> Result<usize> {
    let progress = ProgressConfig::from_env();

    // Phase 1: inputs.
    let phase_start = Instant::now();
    let papers = read_jsonl(&args.corpus)?;
    let mut citations = read_citation_network(&args.citation_network)?;
    if args.remove_noclass {
        citations.prune(&PruneRule::RemoveNoClass);
    }
    let papers = apply_classifications(papers, &citations);
    let roster = read_roster(&args.attendees)?;
    let alt_rows = read_alt_names(&args.alt_names)?;
    let topic_map = match &args.topic_map {
        Some(path) => Some(read_topic_map(path)?),
        None => None,
    };
    phase_times.insert("load_inputs".to_string(), phase_start.elapsed());

    for ((citing, cited), freq) in dyadic_citation_freqs(&citations) {
        match freq {
            Some(f) => info!("dyadic citation frequency {citing} -> {cited}: {f:.4}"),
            None => info!("dyadic citation frequency {citing} -> {cited}: no outgoing citations"),
        }
    }

    // Phase 2: identity resolution.
    let phase_start = Instant::now();
    let merged_rows = roster_alt_rows(&roster, alt_rows);
    let expansion = expand_roster(&merged_rows)?;
    let lookup = build_lookup(&expansion);
    info!(
        "roster expanded to {} individuals with {} surface forms ({} collisions)",
        expansion.people.len(),
        lookup.len(),
        lookup.collision_count()
    );
    let outcome = find_author_papers(&papers, &expansion, &lookup, &progress);
    for miss in &outcome.near_misses {
        warn!(
            "near miss on paper {}: byline '{}' resembles known form '{}' ({:.3})",
            miss.paper_uid, miss.byline, miss.closest_form, miss.similarity
        );
    }
    phase_times.insert("identity_resolution".to_string(), phase_start.elapsed());

    // Phase 3: geography.
    let phase_start = Instant::now();
    let affiliations = most_recent_affiliations(&papers)?;
    let attendee_countries = attendee_country_counts(&roster)?;
    info!(
        "resolved affiliations for {} authors; attendees span {} countries",
        affiliations.len(),
        attendee_countries.len()
    );
    phase_times.insert("geography".to_string(), phase_start.elapsed());

    // Phase 4: author networks.
    let phase_start = Instant::now();
    let paper_authors = paper_author_index(&papers);
    let mut coauthor_net = co_author_network(&papers);
    let mut cocitation_net = co_citation_network(&citations, &paper_authors);
    if let Some(keep) = args.prod_threshold {
        let production = author_production(&papers);
        coauthor_net.prune_by_production(&production, keep);
        cocitation_net.prune_by_production(&production, keep);
    }
    let known_forms = lookup.all_forms();
    coauthor_net.mark_attendees(&known_forms);
    cocitation_net.mark_attendees(&known_forms);
    phase_times.insert("network_construction".to_string(), phase_start.elapsed());

    // Phase 5: clustering.
    let phase_start = Instant::now();
    let coauthor_analysis = analyze_author_network(&coauthor_net, args.resolution, args.seed)?;
    let cocitation_analysis =
        analyze_author_network(&cocitation_net, args.resolution, args.seed)?;
    let topics = topic_map
        .as_ref()
        .map(|map| topics_to_authors(map, &paper_authors));
    phase_times.insert("clustering".to_string(), phase_start.elapsed());

    // Phase 6: scoring and selection.
    let phase_start = Instant::now();
    let cutoff = match args.cutoff_count {
        Some(k) => Cutoff::Count(k),
        None => Cutoff::Proportion(args.cutoff),
    };
    let engine = RecommendationEngine {
        co_citation: cocitation_analysis,
        co_author: coauthor_analysis,
        topics,
        affiliations: Some(affiliations),
        attendee_countries: Some(attendee_countries),
        known_forms: known_forms.clone(),
        config: ScoringConfig {
            enrichment_percentile: args.enrich_threshold,
            cutoff,
            ..ScoringConfig::default()
        },
    };
    let ranked = engine.recommend()?;
    let selected = engine.select(&ranked);
    phase_times.insert("scoring".to_string(), phase_start.elapsed());

    // Phase 7: outputs.
    let phase_start = Instant::now();
    fs::create_dir_all(&args.outpath)
        .with_context(|| format!("failed to create output directory {}", args.outpath.display()))?;

    let cutoff_label = match cutoff {
        Cutoff::Count(k) => k.to_string(),
        Cutoff::Proportion(p) => p.to_string(),
    };
    let candidates_path = args.outpath.join(format!(
        "{}_top_{}_candidates.txt",
        args.outprefix, cutoff_label
    ));
    let names: Vec<&str> = selected.iter().map(|s| s.name.as_str()).collect();
    fs::write(&candidates_path, names.join("\n"))
        .with_context(|| format!("failed to write {}", candidates_path.display()))?;
    info!("saved {} candidates to {}", names.len(), candidates_path.display());

    let papers_path = args
        .outpath
        .join(format!("{}_attendee_papers.json", args.outprefix));
    fs::write(
        &papers_path,
        serde_json::to_string_pretty(&outcome.author_papers)?,
    )
    .with_context(|| format!("failed to write {}", papers_path.display()))?;

    if args.save_clusters {
        for (label, analysis) in [
            ("coauthor", &engine.co_author),
            ("cocitation", &engine.co_citation),
        ] {
            let path = args
                .outpath
                .join(format!("{}_{}_clusters.json", args.outprefix, label));
            fs::write(&path, serde_json::to_string_pretty(&analysis.membership)?)
                .with_context(|| format!("failed to write {}", path.display()))?;
        }
    }

    // Selected candidates join the roster tags in the annotated graphs.
    let selected_names: BTreeSet<String> = names.iter().map(|n| n.to_string()).collect();
    coauthor_net.mark_attendees(&selected_names);
    cocitation_net.mark_attendees(&selected_names);
    for (label, net) in [("coauthor", &coauthor_net), ("cocitation", &cocitation_net)] {
        let path = args
            .outpath
            .join(format!("{}_{}_network.json", args.outprefix, label));
        fs::write(&path, serde_json::to_string(&net.to_node_link_json())?)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }
    phase_times.insert("outputs".to_string(), phase_start.elapsed());

    Ok(names.len())
}
