//! # Inquiry Search
//!
//! A single-process service for free-text similarity search over an uploaded
//! tabular dataset of support-inquiry records. Search runs over a
//! configurable subset of columns, optionally restricted to one category
//! value.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌─────────────────────────────┐   ┌──────────────┐
//! │  Upload  │──▶│  DataCache (single slot)     │◀──│  TOML config  │
//! │ (ingest) │   │  identity + table + TF-IDF  │   │ (search cols) │
//! └────┬─────┘   └──────────────┬──────────────┘   └──────────────┘
//!      │ invalidate             │ snapshot
//!      ▼                        ▼
//! ┌──────────┐            ┌──────────┐
//! │   HTTP   │───────────▶│  Search  │
//! │  (axum)  │            │ (cosine) │
//! └──────────┘            └──────────┘
//! ```
//!
//! The cache is the heart of the system: a single-slot memoization of the
//! (source identity, table, index) triple keyed by the newest uploaded
//! file. Every read path goes through a staleness check; an upload only
//! invalidates. Fitting the TF-IDF space is the expensive operation, so it
//! happens at most once per staleness detection, synchronously in the
//! request that discovers it.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration (searchable columns, bind, upload dir) |
//! | [`models`] | Shared data types |
//! | [`dataset`] | CSV parsing and the derived `search_text` column |
//! | [`tfidf`] | Character n-gram TF-IDF vector space |
//! | [`cache`] | Staleness-aware single-slot cache |
//! | [`ingest`] | Upload storage and newest-file-wins selection |
//! | [`search`] | Filter-then-rank cosine search |
//! | [`server`] | HTTP API |
//! | [`error`] | Request-scoped error taxonomy |

pub mod cache;
pub mod config;
pub mod dataset;
pub mod error;
pub mod ingest;
pub mod models;
pub mod search;
pub mod server;
pub mod tfidf;
