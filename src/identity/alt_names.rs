// src/identity/alt_names.rs - Roster expansion: registration names plus
// curated alternative spellings into ordered name-variant lists

use anyhow::{bail, Result};
use log::{debug, warn};
use std::collections::HashSet;

use crate::models::identity::{
    AltNameRow, CanonicalKey, ExpandedPerson, NameVariant, RosterExpansion,
};
use crate::utils::text::{names_equal, normalize_whitespace, periods_to_spaces};

/// Expand each roster row into its ordered variant list. The registration
/// (surname, given) tuple always comes first; curated alternates follow in
/// table order; a maiden name, when present, is appended last paired with the
/// registration given name.
pub fn expand_roster(rows: &[AltNameRow]) -> Result<RosterExpansion> {
    let mut seen_keys: HashSet<CanonicalKey> = HashSet::new();
    let mut people = Vec::with_capacity(rows.len());

    for row in rows {
        let key = CanonicalKey::from_registration(
            &row.registration_surname,
            &row.registration_first_name,
        );
        if !seen_keys.insert(key.clone()) {
            bail!("duplicate canonical key '{}' in alternative-names table", key);
        }

        let mut variants = Vec::new();
        let registration = NameVariant::Full {
            surname: row.registration_surname.trim().to_lowercase(),
            given: RosterExpansion::registration_given(row),
        };
        variants.push(registration);

        for alt in &row.alternative_names {
            let alt = normalize_whitespace(alt);
            if alt.is_empty() {
                continue;
            }
            match parse_alternative(&alt, row) {
                Some(variant) => {
                    if !variants.contains(&variant) {
                        variants.push(variant);
                    }
                }
                None => warn!(
                    "could not extract a usable variant from alternative name '{}' for '{}'",
                    alt, key
                ),
            }
        }

        if let Some(maiden) = &row.maiden_name {
            let maiden = normalize_whitespace(maiden);
            if !maiden.is_empty() {
                variants.push(NameVariant::Full {
                    surname: maiden.to_lowercase(),
                    given: RosterExpansion::registration_given(row),
                });
            }
        }

        debug!("expanded '{}' into {} variants", key, variants.len());
        people.push(ExpandedPerson { key, variants });
    }

    Ok(RosterExpansion { people })
}

/// Parse one free-text alternative name against the registration name.
///
/// Order of the rules matters and mirrors the curation conventions:
/// 1. exactly `"{surname} {first_name}"` means the person published with
///    first and last names swapped;
/// 2. a single token is a bare name with no surname;
/// 3. otherwise, surname tokens are removed (accent-insensitively, matching
///    surname parts, hyphen segments, or the hyphen-joined whole surname)
///    and what remains is the given name;
/// 4. if nothing matched the surname, the final token is assumed to be the
///    surname actually used in print.
fn parse_alternative(alt: &str, row: &AltNameRow) -> Option<NameVariant> {
    let tokens: Vec<&str> = alt.split_whitespace().collect();
    let surname = row.registration_surname.trim();
    let first_name = row.registration_first_name.trim();

    if tokens.len() == 2 && names_equal(tokens[0], surname) && names_equal(tokens[1], first_name) {
        return Some(NameVariant::Full {
            surname: first_name.to_lowercase(),
            given: surname.to_lowercase(),
        });
    }

    if tokens.len() == 1 {
        return Some(NameVariant::Bare(tokens[0].to_lowercase()));
    }

    let mut matched: Vec<&str> = Vec::new();
    let mut remaining: Vec<&str> = Vec::new();
    for token in &tokens {
        if token_matches_surname(token, surname) {
            matched.push(token);
        } else {
            remaining.push(token);
        }
    }

    let (variant_surname, given_tokens) = if matched.is_empty() {
        // Nothing matched the registration surname; the final token is taken
        // as the published surname and the rest as the given name.
        let (last, rest) = tokens.split_last()?;
        (last.to_lowercase(), rest.to_vec())
    } else {
        (matched.join(" ").to_lowercase(), remaining)
    };

    if given_tokens.is_empty() {
        return None;
    }
    let given = periods_to_spaces(&given_tokens.join(" ")).to_lowercase();
    if given.is_empty() {
        return None;
    }

    Some(NameVariant::Full {
        surname: variant_surname,
        given,
    })
}

/// A token counts as part of the surname if it equals (case- and
/// accent-insensitively) any space-separated surname part, any hyphen
/// segment of a part, or the whole surname with hyphens standing in for
/// spaces ("Nine-IsNine" against the registration surname "Nine IsNine").
fn token_matches_surname(token: &str, surname: &str) -> bool {
    for part in surname.split_whitespace() {
        if names_equal(token, part) {
            return true;
        }
        for segment in part.split('-') {
            if names_equal(token, segment) {
                return true;
            }
        }
    }
    names_equal(&token.replace('-', " "), surname)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    fn row(
        surname: &str,
        first: &str,
        alts: &[&str],
        maiden: Option<&str>,
    ) -> AltNameRow {
        AltNameRow {
            registration_surname: surname.to_string(),
            registration_first_name: first.to_string(),
            alternative_names: alts.iter().map(|s| s.to_string()).collect(),
            maiden_name: maiden.map(|s| s.to_string()),
        }
    }

    /// The full curated-roster fixture, covering every naming convention the
    /// organizers have hit in practice: initials with and without spaces,
    /// maiden names, dropped surnames, accents, hyphens, and swapped order.
    pub(crate) fn fixture_rows() -> Vec<AltNameRow> {
        vec![
            row("One Two", "Person12", &["Person12 A. T. C. One"], None),
            row("Three", "Person3", &[], None),
            row("Four", "Person4", &["Person4 M.I. Four", "Person4 M. Four"], None),
            row("Five", "Person5", &[], Some("Alive")),
            row("Six", "Person6 M.", &["Person6 Middle Six"], None),
            row("Seven", "Person7", &["P.M. Seven", "Person7 M.I. Seven"], None),
            row("Eight", "Person8", &["Person8"], None),
            row(
                "Nine IsNine",
                "Person9 isperson9",
                &["Person9-isperson9 N. IsNine", "Person9 isperson9 Nine-IsNine"],
                None,
            ),
            row("Ten", "Person10", &["Person10 isPerson10 Tén"], None),
            row(
                "Eleven",
                "Person11 isPerson11",
                &["P. isPerson11", "Person11 isPérson11 Eleven"],
                None,
            ),
            row("Twelve", "Person12", &["Twelve Person12"], None),
            row(
                "Thirteen",
                "Person13",
                &["isPerson13 Person13 Thirteen", "i.P. Thirteen"],
                None,
            ),
            row(
                "Fourteen-IsFourteen",
                "Person14-isPerson14",
                &["Person14 isPerson14 Fourteen IsFourteen"],
                None,
            ),
        ]
    }

    fn full(surname: &str, given: &str) -> NameVariant {
        NameVariant::Full {
            surname: surname.to_string(),
            given: given.to_string(),
        }
    }

    #[test]
    fn test_expand_roster_full_fixture() {
        let expansion = expand_roster(&fixture_rows()).unwrap();
        let by_key: Vec<(&str, &[NameVariant])> = expansion
            .people
            .iter()
            .map(|p| (p.key.as_str(), p.variants.as_slice()))
            .collect();

        let expected: Vec<(&str, Vec<NameVariant>)> = vec![
            (
                "one two, p",
                vec![full("one two", "person12"), full("one", "person12 a t c")],
            ),
            ("three, p", vec![full("three", "person3")]),
            (
                "four, p",
                vec![
                    full("four", "person4"),
                    full("four", "person4 m i"),
                    full("four", "person4 m"),
                ],
            ),
            (
                "five, p",
                vec![full("five", "person5"), full("alive", "person5")],
            ),
            (
                "six, pm",
                vec![full("six", "person6 m"), full("six", "person6 middle")],
            ),
            (
                "seven, p",
                vec![
                    full("seven", "person7"),
                    full("seven", "p m"),
                    full("seven", "person7 m i"),
                ],
            ),
            (
                "eight, p",
                vec![
                    full("eight", "person8"),
                    NameVariant::Bare("person8".to_string()),
                ],
            ),
            (
                "nine isnine, pi",
                vec![
                    full("nine isnine", "person9 isperson9"),
                    full("isnine", "person9-isperson9 n"),
                    full("nine-isnine", "person9 isperson9"),
                ],
            ),
            (
                "ten, p",
                vec![full("ten", "person10"), full("tén", "person10 isperson10")],
            ),
            (
                "eleven, pi",
                vec![
                    full("eleven", "person11 isperson11"),
                    full("isperson11", "p"),
                    full("eleven", "person11 ispérson11"),
                ],
            ),
            (
                "twelve, p",
                vec![full("twelve", "person12"), full("person12", "twelve")],
            ),
            (
                "thirteen, p",
                vec![
                    full("thirteen", "person13"),
                    full("thirteen", "isperson13 person13"),
                    full("thirteen", "i p"),
                ],
            ),
            (
                "fourteen-isfourteen, pi",
                vec![
                    full("fourteen-isfourteen", "person14-isperson14"),
                    full("fourteen isfourteen", "person14 isperson14"),
                ],
            ),
        ];

        assert_eq!(by_key.len(), expected.len());
        for ((key, variants), (exp_key, exp_variants)) in by_key.iter().zip(expected.iter()) {
            assert_eq!(key, exp_key);
            assert_eq!(*variants, exp_variants.as_slice(), "variants for {key}");
        }
    }

    #[test]
    fn test_registration_variant_always_first() {
        let expansion = expand_roster(&fixture_rows()).unwrap();
        for person in &expansion.people {
            assert!(
                matches!(person.variants.first(), Some(NameVariant::Full { .. })),
                "registration variant missing for {}",
                person.key
            );
        }
    }

    #[test]
    fn test_duplicate_keys_rejected() {
        let rows = vec![
            row("Three", "Person3", &[], None),
            row("Three", "Paula", &[], None),
        ];
        assert!(expand_roster(&rows).is_err());
    }
}
