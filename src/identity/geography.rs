// src/identity/geography.rs - Most-recent affiliation country per author

use anyhow::{bail, Result};
use log::debug;
use once_cell::sync::Lazy;
use std::collections::{BTreeMap, HashMap};

use crate::models::core::Paper;

/// Country spellings as they appear in Web of Science address records,
/// mapped to ISO 3166-1 alpha-3. The UK home nations are listed separately
/// in WoS and all fold into GBR.
static COUNTRY_TO_ISO3: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("USA", "USA"),
        ("Peoples R China", "CHN"),
        ("England", "GBR"),
        ("Scotland", "GBR"),
        ("Wales", "GBR"),
        ("North Ireland", "GBR"),
        ("Germany", "DEU"),
        ("Fed Rep Ger", "DEU"),
        ("France", "FRA"),
        ("Spain", "ESP"),
        ("Italy", "ITA"),
        ("Australia", "AUS"),
        ("Canada", "CAN"),
        ("Japan", "JPN"),
        ("South Korea", "KOR"),
        ("Brazil", "BRA"),
        ("Mexico", "MEX"),
        ("Netherlands", "NLD"),
        ("Switzerland", "CHE"),
        ("Sweden", "SWE"),
        ("Norway", "NOR"),
        ("Denmark", "DNK"),
        ("Finland", "FIN"),
        ("Iceland", "ISL"),
        ("Austria", "AUT"),
        ("Belgium", "BEL"),
        ("Portugal", "PRT"),
        ("Greece", "GRC"),
        ("Poland", "POL"),
        ("Czech Republic", "CZE"),
        ("Russia", "RUS"),
        ("India", "IND"),
        ("Israel", "ISR"),
        ("Turkey", "TUR"),
        ("Argentina", "ARG"),
        ("Chile", "CHL"),
        ("Colombia", "COL"),
        ("Peru", "PER"),
        ("Ecuador", "ECU"),
        ("Bolivia", "BOL"),
        ("Venezuela", "VEN"),
        ("Uruguay", "URY"),
        ("Cuba", "CUB"),
        ("Costa Rica", "CRI"),
        ("Panama", "PAN"),
        ("South Africa", "ZAF"),
        ("Namibia", "NAM"),
        ("Botswana", "BWA"),
        ("Zimbabwe", "ZWE"),
        ("Kenya", "KEN"),
        ("Ethiopia", "ETH"),
        ("Nigeria", "NGA"),
        ("Ghana", "GHA"),
        ("Egypt", "EGY"),
        ("Morocco", "MAR"),
        ("Tunisia", "TUN"),
        ("Algeria", "DZA"),
        ("New Zealand", "NZL"),
        ("Ireland", "IRL"),
        ("Hungary", "HUN"),
        ("Romania", "ROU"),
        ("Bulgaria", "BGR"),
        ("Croatia", "HRV"),
        ("Serbia", "SRB"),
        ("Slovenia", "SVN"),
        ("Slovakia", "SVK"),
        ("Estonia", "EST"),
        ("Latvia", "LVA"),
        ("Lithuania", "LTU"),
        ("Ukraine", "UKR"),
        ("Iran", "IRN"),
        ("Saudi Arabia", "SAU"),
        ("U Arab Emirates", "ARE"),
        ("Qatar", "QAT"),
        ("Pakistan", "PAK"),
        ("Bangladesh", "BGD"),
        ("Sri Lanka", "LKA"),
        ("Nepal", "NPL"),
        ("Thailand", "THA"),
        ("Vietnam", "VNM"),
        ("Malaysia", "MYS"),
        ("Singapore", "SGP"),
        ("Indonesia", "IDN"),
        ("Philippines", "PHL"),
        ("Taiwan", "TWN"),
    ])
});

pub fn country_to_iso3(country: &str) -> Result<&'static str> {
    match COUNTRY_TO_ISO3.get(country.trim()) {
        Some(code) => Ok(code),
        None => bail!("no ISO 3166 alpha-3 code known for country '{country}'"),
    }
}

/// Resolve each author identity to the country of its most recent
/// affiliation.
///
/// Papers without a year are dropped, the rest are walked newest first and
/// the first country found per identity wins. Authors carrying no address
/// key are skipped even when the paper lists addresses; their affiliation
/// is unknowable from the record.
pub fn most_recent_affiliations(papers: &[Paper]) -> Result<BTreeMap<String, String>> {
    let mut dated: Vec<&Paper> = papers.iter().filter(|p| p.year.is_some()).collect();
    if dated.len() < papers.len() {
        debug!(
            "{} papers carry no year and are ignored for affiliation recency",
            papers.len() - dated.len()
        );
    }
    dated.sort_by_key(|p| std::cmp::Reverse(p.year));

    let mut affiliations: BTreeMap<String, String> = BTreeMap::new();
    for paper in dated {
        for author in &paper.authors {
            let Some(identity) = author.identity() else {
                continue;
            };
            if affiliations.contains_key(&identity) {
                continue;
            }
            let Some(addr_no) = author.primary_addr_no() else {
                continue;
            };
            let Some(address) = paper
                .addresses
                .iter()
                .find(|a| a.addr_no.as_deref() == Some(addr_no))
            else {
                debug!(
                    "author '{}' on {} references missing address key '{}'",
                    identity, paper.uid, addr_no
                );
                continue;
            };
            let code = country_to_iso3(&address.country)?;
            affiliations.insert(identity, code.to_string());
        }
    }
    Ok(affiliations)
}
