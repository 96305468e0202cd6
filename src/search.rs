//! Filtered ranked search over the cached dataset.
//!
//! Filter-then-rank: the candidate set is narrowed by category first, the
//! query is projected into the cached vector space, and only the retained
//! rows are scored. An empty filtered subset is an empty result list, not an
//! error; a missing category column under a named filter is a schema error.
//! The two outcomes are deliberately distinct.

use std::sync::Arc;

use crate::cache::{CacheEntry, DataCache};
use crate::error::{Error, Result};
use crate::models::{SearchResult, CATEGORY_COLUMN};
use crate::tfidf;

/// Sentinel filter value meaning "do not filter by category".
pub const ALL_CATEGORIES: &str = "all";

/// Upper bound on returned results.
pub const MAX_RESULTS: usize = 100;

/// Run a free-text similarity search, optionally restricted to one category.
///
/// Triggers a cache freshness check first, so the caller always ranks
/// against the newest uploaded file. Results are sorted by similarity
/// descending; ties keep original row order (the sort is stable); at most
/// [`MAX_RESULTS`] rows are returned, each carrying its full original fields
/// plus the score.
pub fn run_search(
    cache: &DataCache,
    keywords: &str,
    category: Option<&str>,
) -> Result<Vec<SearchResult>> {
    if !cache.has_upload()? {
        return Err(Error::NoDataset);
    }

    cache.ensure_fresh()?;
    let entry = cache.snapshot().ok_or(Error::NoDataset)?;

    let retained = filter_rows(&entry, category)?;
    if retained.is_empty() {
        tracing::info!("no rows match category filter {:?}", category);
        return Ok(Vec::new());
    }

    let query = entry.index.transform(keywords);

    let mut scored: Vec<(usize, f64)> = retained
        .into_iter()
        .map(|row| (row, tfidf::cosine(&query, entry.index.vector(row))))
        .collect();

    // Stable sort: rows with equal scores stay in original row order.
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(MAX_RESULTS);

    let results: Vec<SearchResult> = scored
        .into_iter()
        .map(|(row, similarity)| SearchResult {
            fields: entry.table.row_object(row),
            similarity,
        })
        .collect();

    tracing::info!("search for {:?} returned {} result(s)", keywords, results.len());
    Ok(results)
}

/// Row indices surviving the category filter, in row order.
fn filter_rows(entry: &Arc<CacheEntry>, category: Option<&str>) -> Result<Vec<usize>> {
    let all_rows = || (0..entry.table.len()).collect();

    let Some(wanted) = category else {
        return Ok(all_rows());
    };
    if wanted == ALL_CATEGORIES {
        return Ok(all_rows());
    }

    let idx = entry
        .table
        .column_index(CATEGORY_COLUMN)
        .ok_or(Error::MissingCategoryColumn(CATEGORY_COLUMN))?;

    Ok((0..entry.table.len())
        .filter(|&row| {
            entry
                .table
                .cell(row, idx)
                .map(|v| v.as_text() == wanted)
                .unwrap_or(false)
        })
        .collect())
}

/// Distinct categories of the cached dataset, for populating the filter UI.
/// An empty sequence when no file has been uploaded yet.
pub fn list_categories(cache: &DataCache) -> Result<Vec<String>> {
    if !cache.has_upload()? {
        return Ok(Vec::new());
    }

    cache.ensure_fresh()?;
    let entry = cache.snapshot().ok_or(Error::NoDataset)?;
    entry.table.categories()
}
