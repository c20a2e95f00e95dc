// src/models/core.rs - Bibliographic record types shared across the pipeline

use anyhow::{anyhow, Error};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kingdom-level study-system label assigned by the external classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StudySystem {
    Plant,
    Animal,
    Microbe,
    Fungi,
    #[serde(rename = "NOCLASS")]
    NoClass,
}

impl StudySystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            StudySystem::Plant => "Plant",
            StudySystem::Animal => "Animal",
            StudySystem::Microbe => "Microbe",
            StudySystem::Fungi => "Fungi",
            StudySystem::NoClass => "NOCLASS",
        }
    }
}

impl fmt::Display for StudySystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StudySystem {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Plant" => Ok(StudySystem::Plant),
            "Animal" => Ok(StudySystem::Animal),
            "Microbe" => Ok(StudySystem::Microbe),
            "Fungi" => Ok(StudySystem::Fungi),
            "NOCLASS" => Ok(StudySystem::NoClass),
            other => Err(anyhow!("unknown study system label: {other}")),
        }
    }
}

/// One paper record from the corpus. Field names follow the Web of Science
/// export; Semantic Scholar records alias `paperId` onto `uid`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Paper {
    #[serde(alias = "UID", alias = "paperId")]
    pub uid: String,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "abstract", default, skip_serializing_if = "Option::is_none")]
    pub abstract_text: Option<String>,
    #[serde(default, deserialize_with = "de_opt_year", skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default)]
    pub authors: Vec<PaperAuthor>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub addresses: Vec<Address>,
    #[serde(default)]
    pub references: Vec<Reference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub study_system: Option<StudySystem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<i64>,
}

/// Author entry scoped to a single paper.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaperAuthor {
    #[serde(default)]
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wos_standard: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// Space-separated list of address keys on this paper; the first entry
    /// is the primary affiliation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub addr_no: Option<String>,
}

impl PaperAuthor {
    /// Lowercased WoS-standard identity string, if the record carries one.
    pub fn identity(&self) -> Option<String> {
        self.wos_standard.as_ref().map(|w| w.to_lowercase())
    }

    /// First address key listed for this author.
    pub fn primary_addr_no(&self) -> Option<&str> {
        self.addr_no.as_deref().and_then(|a| a.split_whitespace().next())
    }
}

/// Affiliation address, keyed locally to one paper via `addr_no`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Address {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub addr_no: Option<String>,
    #[serde(default)]
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}

/// A cited record. References carry less metadata than main results; the
/// pruning step backfills abstracts for references that are also main
/// results.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Reference {
    #[serde(alias = "UID", alias = "paperId")]
    pub uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "abstract", default, skip_serializing_if = "Option::is_none")]
    pub abstract_text: Option<String>,
    #[serde(default, deserialize_with = "de_opt_year", skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
}

/// WoS exports carry years as strings, Semantic Scholar as integers; accept
/// both and treat anything unparseable as absent.
fn de_opt_year<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum YearRepr {
        Int(i32),
        Str(String),
        None,
    }

    Ok(match YearRepr::deserialize(deserializer)? {
        YearRepr::Int(y) => Some(y),
        YearRepr::Str(s) => s.trim().parse::<i32>().ok(),
        YearRepr::None => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paper_deserializes_wos_shape() {
        let raw = r#"{
            "UID": "WOS:000346894900059",
            "title": "Freezing effects on blade viability",
            "year": "2014",
            "authors": [
                {"full_name": "Green, Lindsay A.", "wos_standard": "Green, LA",
                 "first_name": "Lindsay A.", "last_name": "Green", "addr_no": "1"}
            ],
            "addresses": [{"addr_no": "1", "city": "Durham", "country": "USA"}],
            "references": [{"UID": "WOS:X", "title": "older work"}]
        }"#;
        let paper: Paper = serde_json::from_str(raw).unwrap();
        assert_eq!(paper.uid, "WOS:000346894900059");
        assert_eq!(paper.year, Some(2014));
        assert_eq!(paper.authors[0].identity().as_deref(), Some("green, la"));
        assert_eq!(paper.references[0].uid, "WOS:X");
    }

    #[test]
    fn test_paper_deserializes_semantic_scholar_shape() {
        let raw = r#"{"paperId": "abc123", "title": "t", "year": 2020, "authors": []}"#;
        let paper: Paper = serde_json::from_str(raw).unwrap();
        assert_eq!(paper.uid, "abc123");
        assert_eq!(paper.year, Some(2020));
    }

    #[test]
    fn test_primary_addr_no_takes_first() {
        let author = PaperAuthor {
            full_name: "Bu Chongfeng".into(),
            wos_standard: Some("Bu, CF".into()),
            first_name: None,
            last_name: Some("Bu Chongfeng".into()),
            addr_no: Some("1 2 3".into()),
        };
        assert_eq!(author.primary_addr_no(), Some("1"));
    }

    #[test]
    fn test_study_system_round_trip() {
        for s in ["Plant", "Animal", "Microbe", "Fungi", "NOCLASS"] {
            let parsed: StudySystem = s.parse().unwrap();
            assert_eq!(parsed.as_str(), s);
        }
        assert!("Mineral".parse::<StudySystem>().is_err());
    }
}
