//! Shop Clients API Library
//!
//! Resolves the shop's append-only visit log (one spreadsheet row per vehicle
//! check-in) into deduplicated client profiles with merged vehicle histories,
//! and serves free-text search over them.
//!
//! # Modules
//!
//! - `normalize`: Total text normalizers (accents, case, digits, dates).
//! - `record_parser`: Raw row to visit record mapping.
//! - `grouping`: Exact-key grouping of visits into provisional profiles.
//! - `fuzzy_merge`: Name-subsumption merge of provisional profiles.
//! - `resolution`: The full rows -> profiles recompute.
//! - `cache`: TTL-bounded profile snapshot.
//! - `search`: Query matching and ranking.
//! - `record_store`: Visit log source (spreadsheet API client).
//! - `config`: Configuration management.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers.
//! - `models`: Core data models.

pub mod cache;
pub mod config;
pub mod errors;
pub mod fuzzy_merge;
pub mod grouping;
pub mod handlers;
pub mod models;
pub mod normalize;
pub mod record_parser;
pub mod record_store;
pub mod resolution;
pub mod search;
