use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod movie;

pub use movie::MovieRecord;

// ============================================================================
// Request Types
// ============================================================================

/// Body of `POST /movies/recommend`
#[derive(Debug, Default, Deserialize)]
pub struct RecommendRequest {
    #[serde(default)]
    pub genres: Option<Vec<String>>,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub match_all: bool,
}

/// Body of `POST /movies/personalized`
#[derive(Debug, Deserialize)]
pub struct PersonalizedRequest {
    #[serde(default)]
    pub liked_movies: Vec<MovieRecord>,
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Query string of `GET /movies/popular`
#[derive(Debug, Default, Deserialize)]
pub struct PopularQuery {
    pub limit: Option<usize>,
}

/// Query string of `GET /movies/search`
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    pub limit: Option<usize>,
}

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub movies_count: usize,
    pub loaded_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct GenresResponse {
    pub genres: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    pub movies: Vec<MovieRecord>,
    pub total: usize,
    pub selected_genres: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct PersonalizedResponse {
    pub movies: Vec<MovieRecord>,
    pub total: usize,
    /// Number of liked movies the scores were computed from
    pub based_on: usize,
}

#[derive(Debug, Serialize)]
pub struct MoviesResponse {
    pub movies: Vec<MovieRecord>,
    pub total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
}

impl MoviesResponse {
    pub fn new(movies: Vec<MovieRecord>) -> Self {
        Self {
            total: movies.len(),
            movies,
            query: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recommend_request_defaults() {
        let request: RecommendRequest = serde_json::from_str("{}").unwrap();
        assert!(request.genres.is_none());
        assert!(request.limit.is_none());
        assert!(!request.match_all);
    }

    #[test]
    fn test_personalized_request_parses_liked_movies() {
        let request: PersonalizedRequest = serde_json::from_str(
            r#"{"liked_movies": [{"title": "Heat", "genres": ["Crime"], "vote_average": 7.9}], "limit": 5}"#,
        )
        .unwrap();
        assert_eq!(request.liked_movies.len(), 1);
        assert_eq!(request.liked_movies[0].genres, vec!["Crime".to_string()]);
        assert_eq!(request.limit, Some(5));
    }

    #[test]
    fn test_movies_response_omits_missing_query() {
        let json = serde_json::to_value(MoviesResponse::new(vec![])).unwrap();
        assert_eq!(json["total"], 0);
        assert!(json.get("query").is_none());
    }
}
