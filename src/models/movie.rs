use serde::{Deserialize, Serialize};

/// A single movie in the catalog
///
/// Records are created once when the dataset is loaded and never mutated.
/// Liked movies sent back by clients deserialize into the same shape, so every
/// field except `title` falls back to its default.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct MovieRecord {
    /// Unique key of the record
    pub title: String,
    /// Genre names in dataset order
    #[serde(default)]
    pub genres: Vec<String>,
    /// Average vote, 0 to 10
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub popularity: f64,
    #[serde(default)]
    pub overview: String,
    /// Release date exactly as found in the dataset
    #[serde(default)]
    pub release_date: String,
    #[serde(default)]
    pub homepage: String,
}

impl MovieRecord {
    /// Creates a record with the given title and genres, all other fields defaulted
    pub fn new(title: impl Into<String>, genres: Vec<String>) -> Self {
        Self {
            title: title.into(),
            genres,
            ..Self::default()
        }
    }

    pub fn with_scores(mut self, vote_average: f64, popularity: f64) -> Self {
        self.vote_average = vote_average;
        self.popularity = popularity;
        self
    }

    /// True if at least one of `selection` is among this movie's genres
    pub fn has_any_genre(&self, selection: &[String]) -> bool {
        selection.iter().any(|genre| self.genres.contains(genre))
    }

    /// True if every genre of `selection` is among this movie's genres
    pub fn has_all_genres(&self, selection: &[String]) -> bool {
        selection.iter().all(|genre| self.genres.contains(genre))
    }
}
