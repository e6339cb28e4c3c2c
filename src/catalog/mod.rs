use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use chrono::{DateTime, Utc};

use crate::{error::AppResult, models::MovieRecord};

pub mod loader;

pub use loader::ParseFailure;

/// Immutable in-memory collection of movies
///
/// Built once at startup and shared read-only between requests. Every record
/// holds at least one genre and titles are unique.
#[derive(Debug, Clone)]
pub struct Catalog {
    movies: Vec<MovieRecord>,
    loaded_at: DateTime<Utc>,
}

impl Catalog {
    /// Builds a catalog from already parsed records
    ///
    /// Records without genres and repeated titles are dropped, keeping the
    /// first occurrence of each title.
    pub fn new(movies: Vec<MovieRecord>) -> Self {
        let mut seen = HashSet::new();
        let movies = movies
            .into_iter()
            .filter(|movie| !movie.genres.is_empty())
            .filter(|movie| seen.insert(movie.title.clone()))
            .collect();

        Self {
            movies,
            loaded_at: Utc::now(),
        }
    }

    /// Loads a catalog from a CSV file on disk
    pub fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        loader::load_catalog(path)
    }

    /// Loads a catalog from any CSV source
    pub fn from_reader<R: std::io::Read>(reader: R) -> AppResult<Self> {
        loader::read_catalog(reader)
    }

    pub fn movies(&self) -> &[MovieRecord] {
        &self.movies
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// Every distinct genre across the catalog, sorted ascending
    pub fn genres(&self) -> Vec<String> {
        self.movies
            .iter()
            .flat_map(|movie| movie.genres.iter())
            .filter(|genre| !genre.is_empty())
            .map(String::as_str)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(title: &str, genres: &[&str]) -> MovieRecord {
        MovieRecord::new(title, genres.iter().map(|g| g.to_string()).collect())
    }

    #[test]
    fn test_genres_sorted_and_deduplicated() {
        let catalog = Catalog::new(vec![
            movie("A", &["Thriller", "Action"]),
            movie("B", &["Action", "Drama", ""]),
            movie("C", &["action"]),
        ]);

        assert_eq!(
            catalog.genres(),
            vec!["Action", "Drama", "Thriller", "action"]
        );
    }

    #[test]
    fn test_empty_catalog_has_no_genres() {
        let catalog = Catalog::new(vec![]);
        assert!(catalog.is_empty());
        assert!(catalog.genres().is_empty());
    }

    #[test]
    fn test_new_drops_records_without_genres() {
        let catalog = Catalog::new(vec![movie("A", &["Action"]), movie("B", &[])]);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.movies()[0].title, "A");
    }

    #[test]
    fn test_new_keeps_first_duplicate_title() {
        let catalog = Catalog::new(vec![
            movie("A", &["Action"]),
            movie("A", &["Comedy"]),
        ]);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.movies()[0].genres, vec!["Action".to_string()]);
    }
}
