// src/ingest/tables.rs - CSV roster and alternative-name tables

use anyhow::{bail, Context, Result};
use log::info;
use std::collections::BTreeMap;
use std::path::Path;

use crate::identity::geography::country_to_iso3;
use crate::models::identity::AltNameRow;

/// One registered conference attendee.
#[derive(Debug, Clone)]
pub struct RosterRow {
    pub surname: String,
    pub first_name: String,
    pub affiliation: String,
    pub country: String,
}

fn column_index(headers: &csv::StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h.trim() == name)
        .with_context(|| format!("missing required column '{name}'"))
}

/// Read the attendee roster. Columns: Surname, First_name, Affiliation,
/// Country.
pub fn read_roster(path: &Path) -> Result<Vec<RosterRow>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open roster file {}", path.display()))?;
    let headers = reader.headers()?.clone();
    let surname = column_index(&headers, "Surname")?;
    let first_name = column_index(&headers, "First_name")?;
    let affiliation = column_index(&headers, "Affiliation")?;
    let country = column_index(&headers, "Country")?;

    let mut rows = Vec::new();
    for (number, record) in reader.records().enumerate() {
        let record = record.with_context(|| {
            format!("malformed roster row {} in {}", number + 1, path.display())
        })?;
        let field = |idx: usize| record.get(idx).unwrap_or("").trim().to_string();
        let row = RosterRow {
            surname: field(surname),
            first_name: field(first_name),
            affiliation: field(affiliation),
            country: field(country),
        };
        if row.surname.is_empty() {
            bail!(
                "roster row {} in {} has no surname",
                number + 1,
                path.display()
            );
        }
        rows.push(row);
    }
    info!("read {} attendees from {}", rows.len(), path.display());
    Ok(rows)
}

/// Read the curated alternative-name table. `Alternative_name_*` columns are
/// discovered from the header; empty cells are skipped.
pub fn read_alt_names(path: &Path) -> Result<Vec<AltNameRow>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open alternative-name file {}", path.display()))?;
    let headers = reader.headers()?.clone();
    let surname = column_index(&headers, "Registration_surname")?;
    let first_name = column_index(&headers, "Registration_first_name")?;
    let maiden = headers.iter().position(|h| h.trim() == "Maiden_name");
    let alternative_columns: Vec<usize> = headers
        .iter()
        .enumerate()
        .filter(|(_, h)| h.trim().starts_with("Alternative_name_"))
        .map(|(idx, _)| idx)
        .collect();

    let mut rows = Vec::new();
    for (number, record) in reader.records().enumerate() {
        let record = record.with_context(|| {
            format!(
                "malformed alternative-name row {} in {}",
                number + 1,
                path.display()
            )
        })?;
        let field = |idx: usize| record.get(idx).unwrap_or("").trim().to_string();
        let alternative_names: Vec<String> = alternative_columns
            .iter()
            .map(|&idx| field(idx))
            .filter(|v| !v.is_empty())
            .collect();
        let maiden_name = maiden.map(|idx| field(idx)).filter(|v| !v.is_empty());
        rows.push(AltNameRow {
            registration_surname: field(surname),
            registration_first_name: field(first_name),
            alternative_names,
            maiden_name,
        });
    }
    info!(
        "read {} alternative-name rows from {}",
        rows.len(),
        path.display()
    );
    Ok(rows)
}

/// Attendee country counts keyed by ISO3 code. Roster values may already be
/// ISO3 or a Web of Science country spelling; anything else is a boundary
/// error. Rows with an empty country are skipped.
pub fn attendee_country_counts(roster: &[RosterRow]) -> Result<BTreeMap<String, usize>> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for row in roster {
        if row.country.is_empty() {
            continue;
        }
        let iso3 = if row.country.len() == 3 && row.country.chars().all(|c| c.is_ascii_uppercase())
        {
            row.country.clone()
        } else {
            country_to_iso3(&row.country)
                .with_context(|| {
                    format!(
                        "unrecognized roster country '{}' for attendee '{}, {}'",
                        row.country, row.surname, row.first_name
                    )
                })?
                .to_string()
        };
        *counts.entry(iso3).or_default() += 1;
    }
    Ok(counts)
}

/// Align the roster with the curated alternative-name table: every roster
/// person gets a row, with curated alternatives where the table has them.
/// Match is case-insensitive on surname and first name.
pub fn roster_alt_rows(roster: &[RosterRow], alt_rows: Vec<AltNameRow>) -> Vec<AltNameRow> {
    let mut merged = Vec::with_capacity(roster.len());
    for person in roster {
        let curated = alt_rows.iter().find(|row| {
            row.registration_surname.eq_ignore_ascii_case(&person.surname)
                && row
                    .registration_first_name
                    .eq_ignore_ascii_case(&person.first_name)
        });
        merged.push(match curated {
            Some(row) => row.clone(),
            None => AltNameRow {
                registration_surname: person.surname.clone(),
                registration_first_name: person.first_name.clone(),
                alternative_names: Vec::new(),
                maiden_name: None,
            },
        });
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_read_roster() {
        let path = write_temp(
            "roster_basic.csv",
            "Surname,First_name,Affiliation,Country\n\
             One,Person1,Uni A,USA\n\
             Two,Person2,Uni B,Peoples R China\n",
        );
        let rows = read_roster(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].surname, "One");
        assert_eq!(rows[1].country, "Peoples R China");
    }

    #[test]
    fn test_read_alt_names_discovers_columns() {
        let path = write_temp(
            "alt_names_basic.csv",
            "Registration_surname,Registration_first_name,Alternative_name_1,Alternative_name_2,Maiden_name\n\
             One,Person1,Person1 M. One,,\n\
             Two,Person2,,,Maiden\n",
        );
        let rows = read_alt_names(&path).unwrap();
        assert_eq!(rows[0].alternative_names, vec!["Person1 M. One"]);
        assert_eq!(rows[0].maiden_name, None);
        assert!(rows[1].alternative_names.is_empty());
        assert_eq!(rows[1].maiden_name.as_deref(), Some("Maiden"));
    }

    #[test]
    fn test_attendee_country_counts_accepts_iso3_and_spellings() {
        let roster = vec![
            RosterRow {
                surname: "One".into(),
                first_name: "Person1".into(),
                affiliation: String::new(),
                country: "USA".into(),
            },
            RosterRow {
                surname: "Two".into(),
                first_name: "Person2".into(),
                affiliation: String::new(),
                country: "Peoples R China".into(),
            },
            RosterRow {
                surname: "Three".into(),
                first_name: "Person3".into(),
                affiliation: String::new(),
                country: "USA".into(),
            },
        ];
        let counts = attendee_country_counts(&roster).unwrap();
        assert_eq!(counts["USA"], 2);
        assert_eq!(counts["CHN"], 1);
    }

    #[test]
    fn test_attendee_country_counts_rejects_unknown() {
        let roster = vec![RosterRow {
            surname: "One".into(),
            first_name: "Person1".into(),
            affiliation: String::new(),
            country: "Atlantis".into(),
        }];
        assert!(attendee_country_counts(&roster).is_err());
    }

    #[test]
    fn test_roster_alt_rows_backfills_missing_people() {
        let roster = vec![
            RosterRow {
                surname: "One".into(),
                first_name: "Person1".into(),
                affiliation: String::new(),
                country: String::new(),
            },
            RosterRow {
                surname: "Two".into(),
                first_name: "Person2".into(),
                affiliation: String::new(),
                country: String::new(),
            },
        ];
        let curated = vec![AltNameRow {
            registration_surname: "one".into(),
            registration_first_name: "person1".into(),
            alternative_names: vec!["Person1 M. One".into()],
            maiden_name: None,
        }];
        let merged = roster_alt_rows(&roster, curated);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].alternative_names.len(), 1);
        assert!(merged[1].alternative_names.is_empty());
        assert_eq!(merged[1].registration_surname, "Two");
    }
}
