//! Second-pass clustering of provisional profiles.
//!
//! Profiles are walked newest first. Each unabsorbed profile becomes a master
//! and absorbs every later profile whose normalized name contains, or is
//! contained in, its own (as a substring or as a subset of words, so
//! "MARCO LUGO" matches "MARCO ANTONIO LUGO") and whose phone does not
//! conflict. Absorption only moves vehicles; the master keeps its own
//! scalars.
//!
//! Two departures from plain substring containment are deliberate. Word
//! subsets also count, since "MARCO LUGO" is not a substring of "MARCO
//! ANTONIO LUGO". A blank name matches nothing, since an empty string is a
//! substring of every name and would pull all nameless profiles into the
//! first master.
//!
//! This is O(n^2) in the number of provisional profiles (distinct grouping
//! keys, not rows). Past a few thousand clients, bucket candidates by first
//! name token before comparing pairs.
use crate::grouping::{merge_vehicle, usable_phone_digits};
use crate::models::ClientProfile;
use crate::normalize::normalize_name;
use std::collections::HashSet;

fn words_subset(inner: &str, outer: &str) -> bool {
    let outer_words: HashSet<&str> = outer.split(' ').collect();
    inner.split(' ').all(|word| outer_words.contains(word))
}

/// Containment in either direction, by substring or by whole words.
/// Blank names match nothing.
pub fn names_overlap(a: &str, b: &str) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a.contains(b) || b.contains(a) || words_subset(a, b) || words_subset(b, a)
}

/// Both sides carry a usable phone and the digits differ.
pub fn phones_conflict(a: Option<&str>, b: Option<&str>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a != b,
        _ => false,
    }
}

fn absorb_profile(master: &mut ClientProfile, candidate: ClientProfile) {
    for vehicle in candidate.vehicles {
        merge_vehicle(&mut master.vehicles, vehicle);
    }
    master.visit_count += candidate.visit_count;
}

/// Merges profiles that appear to be the same client.
///
/// Output is ordered by `latest_visit_timestamp` descending, and every
/// emitted profile is the newest member of its cluster.
pub fn merge_similar_profiles(mut profiles: Vec<ClientProfile>) -> Vec<ClientProfile> {
    // stable: equal timestamps keep first-seen order
    profiles.sort_by(|a, b| b.latest_visit_timestamp.cmp(&a.latest_visit_timestamp));

    let keys: Vec<(String, Option<String>)> = profiles
        .iter()
        .map(|p| {
            (
                normalize_name(p.name.as_deref().unwrap_or("")),
                usable_phone_digits(p.phone.as_deref()),
            )
        })
        .collect();

    // a taken slot is a processed profile
    let mut slots: Vec<Option<ClientProfile>> = profiles.into_iter().map(Some).collect();
    let mut merged = Vec::with_capacity(slots.len());

    for i in 0..slots.len() {
        let Some(mut master) = slots[i].take() else {
            continue;
        };
        let (master_name, master_phone) = &keys[i];

        for j in (i + 1)..slots.len() {
            if slots[j].is_none() {
                continue;
            }
            let (candidate_name, candidate_phone) = &keys[j];

            let name_match = names_overlap(master_name, candidate_name);
            let phone_conflict =
                phones_conflict(master_phone.as_deref(), candidate_phone.as_deref());

            if name_match && !phone_conflict {
                if let Some(candidate) = slots[j].take() {
                    tracing::debug!(
                        "Merging profile '{}' into '{}'",
                        candidate_name,
                        master_name
                    );
                    absorb_profile(&mut master, candidate);
                }
            }
        }

        merged.push(master);
    }

    merged
}
