use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    Extension, Json,
};

use crate::{
    error::AppResult,
    middleware::request_id::RequestId,
    models::{
        MoviesResponse, PersonalizedRequest, PersonalizedResponse, PopularQuery,
        RecommendRequest, RecommendResponse, SearchQuery,
    },
    routes::AppState,
    services::{self, search::normalize_query},
};

/// Genre based recommendations
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<RecommendRequest>, JsonRejection>,
) -> AppResult<Json<RecommendResponse>> {
    let Json(request) = payload?;
    let catalog = state.catalog()?;
    let limit = state.config.effective_limit(request.limit);
    let selected_genres = request.genres.unwrap_or_default();

    tracing::info!(
        request_id = %request_id,
        genres = ?selected_genres,
        limit,
        match_all = request.match_all,
        "Processing recommendation request"
    );

    let movies = state.with_rng(|rng| {
        services::rank(catalog, &selected_genres, limit, request.match_all, rng)
    })?;

    tracing::info!(request_id = %request_id, returned = movies.len(), "Recommendations ready");

    Ok(Json(RecommendResponse {
        total: movies.len(),
        movies,
        selected_genres,
    }))
}

/// Recommendations scored against the caller's liked movies
pub async fn personalized(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<PersonalizedRequest>, JsonRejection>,
) -> AppResult<Json<PersonalizedResponse>> {
    let Json(request) = payload?;
    let catalog = state.catalog()?;
    let limit = state.config.effective_limit(request.limit);

    tracing::info!(
        request_id = %request_id,
        liked = request.liked_movies.len(),
        limit,
        "Processing personalized request"
    );

    let movies = state
        .with_rng(|rng| services::personalize(catalog, &request.liked_movies, limit, rng))??;

    tracing::info!(request_id = %request_id, returned = movies.len(), "Personalized recommendations ready");

    Ok(Json(PersonalizedResponse {
        total: movies.len(),
        movies,
        based_on: request.liked_movies.len(),
    }))
}

/// Best rated movies regardless of genre
pub async fn popular(
    State(state): State<Arc<AppState>>,
    query: Result<Query<PopularQuery>, QueryRejection>,
) -> AppResult<Json<MoviesResponse>> {
    let Query(params) = query?;
    let catalog = state.catalog()?;
    let limit = state.config.effective_limit(params.limit);

    let movies = state.with_rng(|rng| services::popular(catalog, limit, rng))?;

    tracing::info!(limit, returned = movies.len(), "Served popular movies");

    Ok(Json(MoviesResponse::new(movies)))
}

/// Title search
pub async fn search(
    State(state): State<Arc<AppState>>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> AppResult<Json<MoviesResponse>> {
    let Query(params) = query?;
    let catalog = state.catalog()?;
    let limit = state.config.effective_limit(params.limit);

    let needle = normalize_query(&params.q);
    let movies = services::search(catalog, &needle, limit);

    tracing::info!(query = %needle, limit, returned = movies.len(), "Searched titles");

    Ok(Json(MoviesResponse {
        query: (!needle.is_empty()).then_some(needle),
        ..MoviesResponse::new(movies)
    }))
}
