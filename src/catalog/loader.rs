use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use super::Catalog;
use crate::{
    error::{AppError, AppResult},
    models::MovieRecord,
};

/// Columns that must be present in the dataset header
const REQUIRED_COLUMNS: [&str; 2] = ["title", "genres"];

/// Reasons a dataset row is left out of the catalog
///
/// These never leave the loader: failing rows are counted, logged and skipped.
#[derive(Debug, Error, PartialEq)]
pub enum ParseFailure {
    #[error("row has no title")]
    MissingTitle,
    #[error("genres field is not a list of named genres: {0}")]
    MalformedGenres(String),
    #[error("row has no genres")]
    NoGenres,
    #[error("duplicate title '{0}'")]
    DuplicateTitle(String),
    #[error("unreadable row: {0}")]
    MalformedRow(String),
}

impl ParseFailure {
    fn kind(&self) -> &'static str {
        match self {
            ParseFailure::MissingTitle => "missing_title",
            ParseFailure::MalformedGenres(_) => "malformed_genres",
            ParseFailure::NoGenres => "no_genres",
            ParseFailure::DuplicateTitle(_) => "duplicate_title",
            ParseFailure::MalformedRow(_) => "malformed_row",
        }
    }
}

/// Raw CSV row; columns not listed here are ignored
#[derive(Debug, Deserialize)]
struct RawMovieRow {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    genres: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    vote_average: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    popularity: Option<f64>,
    #[serde(default)]
    overview: Option<String>,
    #[serde(default)]
    release_date: Option<String>,
    #[serde(default)]
    homepage: Option<String>,
}

/// One element of the serialized `genres` column, e.g. `{"id": 28, "name": "Action"}`
#[derive(Debug, Deserialize)]
struct GenreEntry {
    name: String,
}

/// Loads the catalog from a CSV file
pub fn load_catalog(path: impl AsRef<Path>) -> AppResult<Catalog> {
    let path = path.as_ref();
    tracing::info!(path = %path.display(), "Loading movie dataset");
    let file = File::open(path)?;
    read_catalog(BufReader::new(file))
}

/// Reads the catalog from any CSV source
///
/// Fails only when the source cannot be read or lacks a required column.
/// Individual bad rows are dropped.
pub fn read_catalog<R: Read>(reader: R) -> AppResult<Catalog> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|header| header.trim() == column) {
            return Err(AppError::Internal(format!(
                "dataset is missing required column '{}'",
                column
            )));
        }
    }

    let mut movies = Vec::new();
    let mut seen_titles = HashSet::new();
    let mut dropped: BTreeMap<&'static str, usize> = BTreeMap::new();

    for (index, result) in csv_reader.deserialize::<RawMovieRow>().enumerate() {
        let parsed = result
            .map_err(|e| ParseFailure::MalformedRow(e.to_string()))
            .and_then(parse_row)
            .and_then(|movie| {
                if seen_titles.insert(movie.title.clone()) {
                    Ok(movie)
                } else {
                    Err(ParseFailure::DuplicateTitle(movie.title))
                }
            });

        match parsed {
            Ok(movie) => movies.push(movie),
            Err(failure) => {
                tracing::debug!(row = index + 1, reason = %failure, "Skipping dataset row");
                *dropped.entry(failure.kind()).or_default() += 1;
            }
        }
    }

    if !dropped.is_empty() {
        tracing::warn!(
            dropped_total = dropped.values().sum::<usize>(),
            dropped = ?dropped,
            "Some dataset rows were skipped"
        );
    }

    let catalog = Catalog::new(movies);
    tracing::info!(
        movies = catalog.len(),
        genres = catalog.genres().len(),
        "Movie dataset loaded"
    );

    Ok(catalog)
}

fn parse_row(row: RawMovieRow) -> Result<MovieRecord, ParseFailure> {
    let title = row
        .title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or(ParseFailure::MissingTitle)?;

    let genres = parse_genres(row.genres.as_deref().unwrap_or_default())?;
    if genres.is_empty() {
        return Err(ParseFailure::NoGenres);
    }

    Ok(MovieRecord {
        title,
        genres,
        vote_average: finite_or_zero(row.vote_average).clamp(0.0, 10.0),
        popularity: finite_or_zero(row.popularity).max(0.0),
        overview: row.overview.unwrap_or_default(),
        release_date: row.release_date.unwrap_or_default(),
        homepage: row.homepage.unwrap_or_default(),
    })
}

/// Missing, NaN and infinite values all count as 0
fn finite_or_zero(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(0.0)
}

/// Parses a serialized list of `{name}` objects into genre names
///
/// Blank names are dropped; duplicates are kept as found.
fn parse_genres(raw: &str) -> Result<Vec<String>, ParseFailure> {
    let entries: Vec<GenreEntry> = serde_json::from_str(raw.trim())
        .map_err(|e| ParseFailure::MalformedGenres(e.to_string()))?;

    Ok(entries
        .into_iter()
        .map(|entry| entry.name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "budget,genres,homepage,id,overview,popularity,release_date,title,vote_average\n";

    fn load(rows: &str) -> Catalog {
        read_catalog(format!("{HEADER}{rows}").as_bytes()).unwrap()
    }

    #[test]
    fn test_parse_genres() {
        let genres =
            parse_genres(r#"[{"id": 28, "name": "Action"}, {"id": 12, "name": "Adventure"}]"#)
                .unwrap();
        assert_eq!(genres, vec!["Action", "Adventure"]);
    }

    #[test]
    fn test_parse_genres_rejects_garbage() {
        assert!(matches!(
            parse_genres("Action|Adventure"),
            Err(ParseFailure::MalformedGenres(_))
        ));
        assert!(matches!(
            parse_genres(""),
            Err(ParseFailure::MalformedGenres(_))
        ));
    }

    #[test]
    fn test_reads_full_row() {
        let catalog = load(
            "237000000,\"[{\"\"id\"\": 28, \"\"name\"\": \"\"Action\"\"}, {\"\"id\"\": 878, \"\"name\"\": \"\"Science Fiction\"\"}]\",http://www.avatarmovie.com/,19995,In the 22nd century...,150.437577,2009-12-10,Avatar,7.2\n",
        );

        assert_eq!(catalog.len(), 1);
        let avatar = &catalog.movies()[0];
        assert_eq!(avatar.title, "Avatar");
        assert_eq!(avatar.genres, vec!["Action", "Science Fiction"]);
        assert_eq!(avatar.vote_average, 7.2);
        assert_eq!(avatar.popularity, 150.437577);
        assert_eq!(avatar.release_date, "2009-12-10");
        assert_eq!(avatar.homepage, "http://www.avatarmovie.com/");
        assert_eq!(avatar.overview, "In the 22nd century...");
    }

    #[test]
    fn test_defaults_for_missing_numbers_and_text() {
        let catalog = load("0,\"[{\"\"name\"\": \"\"Drama\"\"}]\",,1,,,,Quiet Film,\n");

        let movie = &catalog.movies()[0];
        assert_eq!(movie.vote_average, 0.0);
        assert_eq!(movie.popularity, 0.0);
        assert_eq!(movie.homepage, "");
        assert_eq!(movie.release_date, "");
    }

    #[test]
    fn test_unparsable_numbers_default_to_zero() {
        let catalog = load("0,\"[{\"\"name\"\": \"\"Drama\"\"}]\",,1,,n/a,,Odd Film,twelve\n");

        let movie = &catalog.movies()[0];
        assert_eq!(movie.vote_average, 0.0);
        assert_eq!(movie.popularity, 0.0);
    }

    #[test]
    fn test_drops_bad_rows() {
        let catalog = load(concat!(
            "0,\"[{\"\"name\"\": \"\"Drama\"\"}]\",,1,,1.0,,Kept,6.0\n",
            "0,not json,,2,,1.0,,Broken Genres,6.0\n",
            "0,[],,3,,1.0,,No Genres,6.0\n",
            "0,\"[{\"\"name\"\": \"\"Drama\"\"}]\",,4,,1.0,,,6.0\n",
            "0,\"[{\"\"name\"\": \"\"Comedy\"\"}]\",,5,,1.0,,Kept,6.0\n",
        ));

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.movies()[0].title, "Kept");
        assert_eq!(catalog.movies()[0].genres, vec!["Drama"]);
    }

    #[test]
    fn test_clamps_vote_average() {
        let catalog = load("0,\"[{\"\"name\"\": \"\"Drama\"\"}]\",,1,,-3,,Loud,11.5\n");

        let movie = &catalog.movies()[0];
        assert_eq!(movie.vote_average, 10.0);
        assert_eq!(movie.popularity, 0.0);
    }

    #[test]
    fn test_non_finite_numbers_default_to_zero() {
        let catalog = read_catalog(
            "title,genres,vote_average,popularity\nGood,\"[{\"\"name\"\": \"\"Drama\"\"}]\",9.5,100\nJunk,\"[{\"\"name\"\": \"\"Drama\"\"}]\",NaN,inf\nWorse,\"[{\"\"name\"\": \"\"Drama\"\"}]\",-inf,nan\n"
                .as_bytes(),
        )
        .unwrap();

        assert_eq!(catalog.len(), 3);
        for movie in catalog.movies() {
            assert!((0.0..=10.0).contains(&movie.vote_average));
            assert!(movie.popularity.is_finite() && movie.popularity >= 0.0);
        }

        let junk = &catalog.movies()[1];
        assert_eq!(junk.vote_average, 0.0);
        assert_eq!(junk.popularity, 0.0);

        let ranked = crate::services::ranking::ranked_candidates(&catalog, &[], false);
        assert_eq!(ranked[0].title, "Good");

        let json = serde_json::to_string(junk).unwrap();
        let parsed: MovieRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(&parsed, junk);
    }

    #[test]
    fn test_missing_required_column_fails() {
        let result = read_catalog("name,genres\nAvatar,[]\n".as_bytes());
        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[test]
    fn test_missing_file_fails() {
        let result = load_catalog("/nonexistent/movies.csv");
        assert!(matches!(result, Err(AppError::Io(_))));
    }
}
