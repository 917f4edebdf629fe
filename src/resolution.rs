//! Full recompute of client profiles from the visit log.
//!
//! 1. Parse rows into visit records (rows with no name and no phone are skipped)
//! 2. Group records by phone or normalized name
//! 3. Merge provisional profiles whose names overlap and phones agree
use crate::fuzzy_merge::merge_similar_profiles;
use crate::grouping::group_records;
use crate::models::{ClientProfile, RawRow};
use crate::record_parser::parse_row;
use serde::Serialize;

/// Counts from one recompute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResolutionStats {
    pub rows_read: usize,
    pub rows_skipped: usize,
    pub visit_records: usize,
    pub provisional_profiles: usize,
    pub merged_profiles: usize,
}

#[derive(Debug, Clone)]
pub struct Resolution {
    /// Profiles ordered by most recent visit, newest first.
    pub profiles: Vec<ClientProfile>,
    pub stats: ResolutionStats,
}

/// Runs parse -> group -> fuzzy merge over a full row snapshot.
pub fn resolve_profiles(rows: &[RawRow]) -> Resolution {
    let records: Vec<_> = rows.iter().filter_map(parse_row).collect();
    let visit_records = records.len();
    let rows_skipped = rows.len() - visit_records;

    if rows_skipped > 0 {
        tracing::debug!("Skipped {} row(s) with neither name nor phone", rows_skipped);
    }

    let provisional = group_records(records);
    let provisional_profiles = provisional.len();
    tracing::debug!(
        "Grouped {} visit record(s) into {} provisional profile(s)",
        visit_records,
        provisional_profiles
    );

    let profiles = merge_similar_profiles(provisional);

    let stats = ResolutionStats {
        rows_read: rows.len(),
        rows_skipped,
        visit_records,
        provisional_profiles,
        merged_profiles: profiles.len(),
    };

    tracing::info!(
        "Resolved {} client profile(s) from {} row(s) ({} provisional, {} skipped)",
        stats.merged_profiles,
        stats.rows_read,
        stats.provisional_profiles,
        stats.rows_skipped
    );

    Resolution { profiles, stats }
}
