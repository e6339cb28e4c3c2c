use std::collections::{HashMap, HashSet};

use rand::Rng;

use crate::{
    catalog::Catalog,
    error::{AppError, AppResult},
    models::MovieRecord,
    services::sampling::sample_from_pool,
};

const GENRE_WEIGHT: f64 = 0.6;
const RATING_WEIGHT: f64 = 0.3;
const POPULARITY_WEIGHT: f64 = 0.1;

/// Popularity at or above this value scores the maximum
const POPULARITY_CEILING: f64 = 1000.0;

/// Candidate pool size as a multiple of the requested limit
const POOL_FACTOR: usize = 3;

/// A catalog movie with its affinity to the user's liked movies
#[derive(Debug, Clone, Copy)]
pub struct ScoredMovie<'a> {
    pub movie: &'a MovieRecord,
    pub score: f64,
}

/// Genre preferences derived from a set of liked movies
#[derive(Debug)]
pub struct GenreProfile<'a> {
    counts: HashMap<&'a str, usize>,
    liked_count: usize,
}

impl<'a> GenreProfile<'a> {
    /// Counts genre occurrences across the liked movies
    ///
    /// A genre listed twice on one movie counts twice.
    pub fn from_liked(liked: &'a [MovieRecord]) -> Self {
        let mut counts = HashMap::new();
        for genre in liked.iter().flat_map(|movie| movie.genres.iter()) {
            *counts.entry(genre.as_str()).or_insert(0) += 1;
        }

        Self {
            counts,
            liked_count: liked.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn count(&self, genre: &str) -> usize {
        self.counts.get(genre).copied().unwrap_or(0)
    }

    /// Genre overlap of `movie` with this profile, normalized by both the
    /// number of liked movies and the movie's own genre count
    pub fn genre_score(&self, movie: &MovieRecord) -> f64 {
        if self.liked_count == 0 || movie.genres.is_empty() {
            return 0.0;
        }

        let matches: usize = movie.genres.iter().map(|genre| self.count(genre)).sum();
        (matches as f64 / self.liked_count as f64) / movie.genres.len() as f64
    }

    /// Weighted blend of genre overlap, rating and popularity
    pub fn affinity(&self, movie: &MovieRecord) -> f64 {
        let rating_score = movie.vote_average / 10.0;
        let popularity_score = (movie.popularity / POPULARITY_CEILING).min(1.0);

        GENRE_WEIGHT * self.genre_score(movie)
            + RATING_WEIGHT * rating_score
            + POPULARITY_WEIGHT * popularity_score
    }
}

/// Scores every catalog movie the user has not liked yet, best-first
///
/// Movies with a non-positive score are left out. Equal scores keep dataset order.
pub fn score_candidates<'a>(
    catalog: &'a Catalog,
    profile: &GenreProfile<'_>,
    liked: &[MovieRecord],
) -> Vec<ScoredMovie<'a>> {
    let liked_titles: HashSet<&str> = liked.iter().map(|movie| movie.title.as_str()).collect();

    let mut scored: Vec<ScoredMovie<'a>> = catalog
        .movies()
        .iter()
        .filter(|movie| !liked_titles.contains(movie.title.as_str()))
        .map(|movie| ScoredMovie {
            movie,
            score: profile.affinity(movie),
        })
        .filter(|scored| scored.score > 0.0)
        .collect();

    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored
}

/// Recommends up to `limit` movies resembling the liked movies
///
/// The result is a random sample from the top `3 * limit` scored candidates.
/// Liked movies themselves are never returned.
pub fn personalize<R>(
    catalog: &Catalog,
    liked: &[MovieRecord],
    limit: usize,
    rng: &mut R,
) -> AppResult<Vec<MovieRecord>>
where
    R: Rng + ?Sized,
{
    if liked.is_empty() {
        return Err(AppError::InvalidInput(
            "liked_movies must contain at least one movie".to_string(),
        ));
    }

    let profile = GenreProfile::from_liked(liked);
    if profile.is_empty() {
        tracing::info!(liked = liked.len(), "Liked movies carry no genres");
        return Ok(Vec::new());
    }

    let scored = score_candidates(catalog, &profile, liked);

    tracing::debug!(
        liked = liked.len(),
        genres = profile.counts.len(),
        candidates = scored.len(),
        "Scored personalization candidates"
    );

    let ranked: Vec<&MovieRecord> = scored.into_iter().map(|scored| scored.movie).collect();
    Ok(
        sample_from_pool(ranked, limit.saturating_mul(POOL_FACTOR), limit, rng)
            .into_iter()
            .cloned()
            .collect(),
    )
}
