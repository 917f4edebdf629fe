use crate::models::{ClientProfile, SearchResponse};
use crate::normalize::{digits_only, fold_for_search};

/// Hard cap on returned profiles.
pub const MAX_RESULTS: usize = 50;

/// Shorter digit runs are too ambiguous to match phones on.
pub const MIN_PHONE_QUERY_DIGITS: usize = 4;

/// A query folded once, matched against many profiles.
#[derive(Debug, Clone)]
pub struct PreparedQuery {
    /// Accent-free lowercase query, whitespace squeezed.
    pub text: String,
    pub words: Vec<String>,
    pub digits: String,
}

impl PreparedQuery {
    pub fn new(query: &str) -> Self {
        let text = fold_for_search(query);
        let words = text.split(' ').filter(|w| !w.is_empty()).map(String::from).collect();
        Self {
            text,
            words,
            digits: digits_only(query),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Every query word inside the name, or every name word inside the query.
fn name_matches(profile: &ClientProfile, query: &PreparedQuery) -> bool {
    let name = fold_for_search(profile.name.as_deref().unwrap_or(""));
    if name.is_empty() || query.words.is_empty() {
        return false;
    }

    query.words.iter().all(|word| name.contains(word.as_str()))
        || name.split(' ').all(|word| query.text.contains(word))
}

fn phone_matches(profile: &ClientProfile, query: &PreparedQuery) -> bool {
    if query.digits.len() < MIN_PHONE_QUERY_DIGITS {
        return false;
    }
    digits_only(profile.phone.as_deref().unwrap_or("")).contains(&query.digits)
}

fn plates_match(profile: &ClientProfile, query: &PreparedQuery) -> bool {
    profile.vehicles.iter().any(|vehicle| {
        vehicle
            .plates
            .as_deref()
            .map(|plates| fold_for_search(plates).contains(&query.text))
            .unwrap_or(false)
    })
}

pub fn matches(profile: &ClientProfile, query: &PreparedQuery) -> bool {
    name_matches(profile, query) || phone_matches(profile, query) || plates_match(profile, query)
}

/// Filters profiles against a free-text query.
///
/// `profiles` must already be newest-first (the order the fuzzy merger
/// emits); filtering preserves it. An empty query matches nothing.
pub fn search_profiles(profiles: &[ClientProfile], query: &str) -> SearchResponse {
    let query = PreparedQuery::new(query);
    if query.is_empty() {
        return SearchResponse::default();
    }

    let mut total = 0;
    let mut results = Vec::new();
    for profile in profiles.iter().filter(|p| matches(p, &query)) {
        total += 1;
        if results.len() < MAX_RESULTS {
            results.push(profile.clone());
        }
    }

    SearchResponse { results, total }
}
