// src/models/identity.rs - Typed identity values for author-name resolution

use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

use crate::utils::text::periods_to_spaces;

/// Canonical identity key for one roster individual: `"surname, initials"`,
/// lowercased. Exactly one key per roster row; duplicate keys across rows are
/// a boundary error caught during roster expansion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalKey(String);

impl CanonicalKey {
    /// Build the key from registration surname and first name. Initials are
    /// the first letter of each first-name token, splitting on spaces and
    /// hyphens ("Person14-isPerson14" yields "pi").
    pub fn from_registration(surname: &str, first_name: &str) -> Self {
        let initials: String = first_name
            .split_whitespace()
            .flat_map(|t| t.split('-'))
            .filter_map(|t| t.chars().next())
            .collect();
        CanonicalKey(format!(
            "{}, {}",
            surname.trim().to_lowercase(),
            initials.to_lowercase()
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CanonicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One surface spelling of a person's name, as it could appear on a
/// publication. `Bare` covers single-token names with no recoverable surname
/// (mononyms, some organizational bylines).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NameVariant {
    Full { surname: String, given: String },
    Bare(String),
}

/// One row of the alternative-names table, as curated by the conference
/// organizers.
#[derive(Debug, Clone)]
pub struct AltNameRow {
    pub registration_surname: String,
    pub registration_first_name: String,
    pub alternative_names: Vec<String>,
    pub maiden_name: Option<String>,
}

/// A roster individual with all known name variants, registration variant
/// first. Variant order is part of the contract: downstream reporting keys
/// off the first entry.
#[derive(Debug, Clone)]
pub struct ExpandedPerson {
    pub key: CanonicalKey,
    pub variants: Vec<NameVariant>,
}

/// The expanded roster, in input row order.
#[derive(Debug, Clone, Default)]
pub struct RosterExpansion {
    pub people: Vec<ExpandedPerson>,
}

impl RosterExpansion {
    pub fn keys(&self) -> impl Iterator<Item = &CanonicalKey> {
        self.people.iter().map(|p| &p.key)
    }

    pub fn variants_for(&self, key: &CanonicalKey) -> Option<&[NameVariant]> {
        self.people
            .iter()
            .find(|p| &p.key == key)
            .map(|p| p.variants.as_slice())
    }

    /// Registration given name for a key, used for maiden-name pairing.
    pub fn registration_given(row: &AltNameRow) -> String {
        periods_to_spaces(&row.registration_first_name).to_lowercase()
    }
}

/// Bidirectional surface-form lookup. A form maps to exactly one canonical
/// key; a form claimed by a second key is recorded in the collision table and
/// left with its first owner, never silently overwritten. Matches that hit a
/// collided form are surfaced as ambiguous rather than attributed.
#[derive(Debug, Clone, Default)]
pub struct NameLookup {
    forms: HashMap<String, CanonicalKey>,
    by_key: HashMap<CanonicalKey, BTreeSet<String>>,
    collisions: HashMap<String, Vec<CanonicalKey>>,
}

impl NameLookup {
    pub fn insert(&mut self, form: String, key: CanonicalKey) {
        match self.forms.get(&form) {
            Some(existing) if existing != &key => {
                warn!(
                    "surface form '{}' collides: already owned by '{}', also generated for '{}'",
                    form, existing, key
                );
                let entry = self
                    .collisions
                    .entry(form)
                    .or_insert_with(|| vec![existing.clone()]);
                if !entry.contains(&key) {
                    entry.push(key);
                }
            }
            Some(_) => {}
            None => {
                self.by_key
                    .entry(key.clone())
                    .or_default()
                    .insert(form.clone());
                self.forms.insert(form, key);
            }
        }
    }

    /// Resolve a surface form to its canonical key. Collided forms resolve
    /// to `None`; use [`NameLookup::collision_candidates`] to inspect them.
    pub fn resolve(&self, form: &str) -> Option<&CanonicalKey> {
        if self.collisions.contains_key(form) {
            return None;
        }
        self.forms.get(form)
    }

    pub fn collision_candidates(&self, form: &str) -> Option<&[CanonicalKey]> {
        self.collisions.get(form).map(|v| v.as_slice())
    }

    pub fn forms_for(&self, key: &CanonicalKey) -> Option<&BTreeSet<String>> {
        self.by_key.get(key)
    }

    /// Every registered surface form with its owner, for attendee tagging
    /// and collision-free export.
    pub fn iter_forms(&self) -> impl Iterator<Item = (&String, &CanonicalKey)> {
        self.forms.iter()
    }

    pub fn all_forms(&self) -> BTreeSet<String> {
        self.forms.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.forms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forms.is_empty()
    }

    pub fn collision_count(&self) -> usize {
        self.collisions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_initials_split_spaces_and_hyphens() {
        assert_eq!(
            CanonicalKey::from_registration("One Two", "Person12").as_str(),
            "one two, p"
        );
        assert_eq!(
            CanonicalKey::from_registration("Six", "Person6 M.").as_str(),
            "six, pm"
        );
        assert_eq!(
            CanonicalKey::from_registration("Fourteen-IsFourteen", "Person14-isPerson14").as_str(),
            "fourteen-isfourteen, pi"
        );
    }

    #[test]
    fn test_lookup_collision_is_flagged_not_overwritten() {
        let mut lookup = NameLookup::default();
        let a = CanonicalKey::from_registration("Smith", "Jane Ann");
        let b = CanonicalKey::from_registration("Smith", "John");
        lookup.insert("smith, j".into(), a.clone());
        lookup.insert("smith, j".into(), b.clone());

        assert_eq!(lookup.resolve("smith, j"), None);
        assert_eq!(
            lookup.collision_candidates("smith, j"),
            Some(&[a.clone(), b][..])
        );
        // First owner keeps the form in its reverse index.
        assert!(lookup.forms_for(&a).unwrap().contains("smith, j"));
    }
}
