use crate::{catalog::Catalog, models::MovieRecord, services::ranking::by_rating_desc};

/// Finds movies whose title contains `query`, ignoring case
///
/// Results are ranked like genre recommendations but without sampling, so the
/// same query always returns the same movies. A blank query matches nothing.
pub fn search(catalog: &Catalog, query: &str, limit: usize) -> Vec<MovieRecord> {
    let needle = normalize_query(query);
    if needle.is_empty() {
        return Vec::new();
    }

    let mut matches: Vec<&MovieRecord> = catalog
        .movies()
        .iter()
        .filter(|movie| movie.title.to_lowercase().contains(&needle))
        .collect();

    matches.sort_by(|a, b| by_rating_desc(a, b));
    matches.into_iter().take(limit).cloned().collect()
}

/// Trimmed, lowercased form of a search query
pub fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}
