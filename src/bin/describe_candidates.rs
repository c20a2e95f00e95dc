// src/bin/describe_candidates.rs
use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

use recommend_lib::ingest::corpus::read_jsonl;
use recommend_lib::models::core::Paper;

/// Collect publication titles, years and affiliations for candidate authors.
#[derive(Parser, Debug)]
#[command(name = "describe_candidates", version, about)]
struct Args {
    /// Text file with one candidate name per line
    candidates: PathBuf,

    /// JSONL dataset the candidates were drawn from
    dataset: PathBuf,

    /// Directory to save output
    outpath: PathBuf,

    /// String to prepend to output file names
    outprefix: String,
}

#[derive(Debug, serde::Serialize)]
struct CandidateRecord {
    candidate: String,
    publication_title: String,
    publication_abstract: String,
    publication_year: String,
    affiliation_at_pub: String,
}

fn candidate_records(candidates: &BTreeSet<String>, papers: &[Paper]) -> Vec<CandidateRecord> {
    let mut records = Vec::new();
    for paper in papers {
        for author in &paper.authors {
            let Some(identity) = author.identity() else {
                continue;
            };
            if !candidates.contains(&identity) {
                continue;
            }
            let country = author
                .primary_addr_no()
                .and_then(|addr_no| {
                    paper
                        .addresses
                        .iter()
                        .find(|a| a.addr_no.as_deref() == Some(addr_no))
                })
                .map(|a| a.country.clone())
                .unwrap_or_default();
            records.push(CandidateRecord {
                candidate: identity,
                publication_title: paper.title.clone(),
                publication_abstract: paper.abstract_text.clone().unwrap_or_default(),
                publication_year: paper.year.map(|y| y.to_string()).unwrap_or_default(),
                affiliation_at_pub: country,
            });
        }
    }
    records
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
    let args = Args::parse();

    let raw = fs::read_to_string(&args.candidates)
        .with_context(|| format!("failed to read candidate list {}", args.candidates.display()))?;
    let candidates: BTreeSet<String> = raw
        .lines()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .collect();
    info!("read {} candidates from {}", candidates.len(), args.candidates.display());

    let papers = read_jsonl(&args.dataset)?;
    let records = candidate_records(&candidates, &papers);
    info!("collected {} publication records", records.len());

    fs::create_dir_all(&args.outpath)
        .with_context(|| format!("failed to create output directory {}", args.outpath.display()))?;
    let savename = args
        .outpath
        .join(format!("{}_candidate_publication_info.csv", args.outprefix));
    let mut writer = csv::Writer::from_path(&savename)
        .with_context(|| format!("failed to open {} for writing", savename.display()))?;
    for record in &records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    info!("saved candidate publication information as {}", savename.display());
    Ok(())
}
