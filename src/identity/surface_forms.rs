// src/identity/surface_forms.rs - Historical bibliographic form generation
//
// Web of Science records carry three author-name conventions depending on
// publication era: the post-2006 full form ("surname, given initials"), the
// pre-2006 / WOS-standard initials form ("surname, initials"), and the
// pre-1976 11-character form ("surname[..8].iii" or "surname iii"). Every
// roster variant is expanded into all applicable forms.

use crate::models::identity::{NameLookup, NameVariant, RosterExpansion};

/// Generate every surface form for one variant, deduplicated in order.
/// `Bare` variants contribute only the bare token itself.
pub fn surface_forms(variant: &NameVariant) -> Vec<String> {
    let (surname, given) = match variant {
        NameVariant::Bare(token) => return vec![token.clone()],
        NameVariant::Full { surname, given } => (surname.as_str(), given.as_str()),
    };

    let tokens: Vec<&str> = given.split_whitespace().collect();
    let initials = initials_of(&tokens);

    let mut forms = Vec::with_capacity(3);
    push_unique(&mut forms, format!("{}, {}", surname, full_given(&tokens)));
    push_unique(&mut forms, format!("{}, {}", surname, initials));
    push_unique(&mut forms, legacy_form(surname, &initials));
    forms
}

/// Build the lookup mapping every generated surface form of every person to
/// that person's canonical key. Cross-person collisions are recorded inside
/// the lookup rather than overwritten.
pub fn build_lookup(expansion: &RosterExpansion) -> NameLookup {
    let mut lookup = NameLookup::default();
    for person in &expansion.people {
        for variant in &person.variants {
            for form in surface_forms(variant) {
                lookup.insert(form, person.key.clone());
            }
        }
    }
    lookup
}

/// All initials of the given-name tokens, splitting hyphenated tokens into
/// their segments ("person9-isperson9 n" yields "pin").
fn initials_of(tokens: &[&str]) -> String {
    tokens
        .iter()
        .flat_map(|t| t.split('-'))
        .filter_map(|t| t.chars().next())
        .collect()
}

/// Post-2006 rendering: full-length tokens stay as written, runs of
/// single-letter tokens concatenate into an initial block ("person12 a t c"
/// becomes "person12 atc").
fn full_given(tokens: &[&str]) -> String {
    let mut parts: Vec<String> = Vec::new();
    let mut run = String::new();
    for token in tokens {
        if token.chars().count() == 1 {
            run.push_str(token);
        } else {
            if !run.is_empty() {
                parts.push(std::mem::take(&mut run));
            }
            parts.push((*token).to_string());
        }
    }
    if !run.is_empty() {
        parts.push(run);
    }
    parts.join(" ")
}

/// Pre-1976 11-character rendering. Surnames longer than 8 characters are
/// truncated and joined with a period to at most 3 initials; shorter
/// surnames take a space plus as many initials as fit the 11-character
/// budget.
fn legacy_form(surname: &str, initials: &str) -> String {
    let surname_len = surname.chars().count();
    if surname_len > 8 {
        let head: String = surname.chars().take(8).collect();
        let init: String = initials.chars().take(3).collect();
        format!("{}.{}", head, init)
    } else {
        let budget = 11 - surname_len - 1;
        let init: String = initials.chars().take(budget).collect();
        format!("{} {}", surname, init)
    }
}

fn push_unique(forms: &mut Vec<String>, form: String) {
    if !forms.contains(&form) {
        forms.push(form);
    }
}
