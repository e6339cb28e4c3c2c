use std::cmp::Ordering;

use rand::Rng;

use crate::{catalog::Catalog, models::MovieRecord, services::sampling::sample_from_pool};

/// Candidate pool size as a multiple of the requested limit
const POOL_FACTOR: usize = 2;

/// Orders movies best-first by vote average, then popularity
///
/// Used with a stable sort, so equal movies keep dataset order.
pub fn by_rating_desc(a: &MovieRecord, b: &MovieRecord) -> Ordering {
    b.vote_average
        .total_cmp(&a.vote_average)
        .then_with(|| b.popularity.total_cmp(&a.popularity))
}

/// Filters the catalog by genre selection and sorts the survivors best-first
///
/// An empty selection keeps every movie. With `match_all` a movie must carry
/// every selected genre, otherwise one shared genre is enough.
pub fn ranked_candidates<'a>(
    catalog: &'a Catalog,
    selection: &[String],
    match_all: bool,
) -> Vec<&'a MovieRecord> {
    let mut candidates: Vec<&MovieRecord> = catalog
        .movies()
        .iter()
        .filter(|movie| {
            if selection.is_empty() {
                true
            } else if match_all {
                movie.has_all_genres(selection)
            } else {
                movie.has_any_genre(selection)
            }
        })
        .collect();

    candidates.sort_by(|a, b| by_rating_desc(a, b));
    candidates
}

/// Recommends up to `limit` movies for a genre selection
///
/// The result is a random sample from the top `2 * limit` ranked candidates,
/// so repeated calls vary while staying among the best matches. Order within
/// the result is not sorted.
pub fn rank<R>(
    catalog: &Catalog,
    selection: &[String],
    limit: usize,
    match_all: bool,
    rng: &mut R,
) -> Vec<MovieRecord>
where
    R: Rng + ?Sized,
{
    let candidates = ranked_candidates(catalog, selection, match_all);

    tracing::debug!(
        selected = selection.len(),
        match_all,
        candidates = candidates.len(),
        "Ranked genre candidates"
    );

    sample_from_pool(candidates, limit.saturating_mul(POOL_FACTOR), limit, rng)
        .into_iter()
        .cloned()
        .collect()
}

/// Best-rated movies across the whole catalog, with the same sampling as [`rank`]
pub fn popular<R>(catalog: &Catalog, limit: usize, rng: &mut R) -> Vec<MovieRecord>
where
    R: Rng + ?Sized,
{
    rank(catalog, &[], limit, false, rng)
}
