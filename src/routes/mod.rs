use std::any::Any;
use std::sync::{Arc, Mutex};

use axum::{
    extract::State,
    http::{HeaderValue, Method},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use rand::{rngs::StdRng, SeedableRng};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{self, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    catalog::Catalog,
    config::Config,
    error::{AppError, AppResult},
    middleware::request_id::{make_span_with_request_id, request_id_middleware},
    models::{GenresResponse, HealthResponse},
};

pub mod movies;

/// Shared application state
///
/// The catalog is loaded once before the server starts and never replaced.
/// `None` means loading failed; data endpoints then answer with an error.
pub struct AppState {
    catalog: Option<Arc<Catalog>>,
    rng: Mutex<StdRng>,
    pub config: Config,
}

impl AppState {
    pub fn new(catalog: Option<Catalog>, config: Config) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            catalog: catalog.map(Arc::new),
            rng: Mutex::new(rng),
            config,
        }
    }

    /// The loaded catalog, or `DataUnavailable` if it is missing or empty
    pub fn catalog(&self) -> AppResult<&Catalog> {
        match self.catalog.as_deref() {
            Some(catalog) if !catalog.is_empty() => Ok(catalog),
            _ => Err(AppError::DataUnavailable),
        }
    }

    /// Runs `f` with exclusive access to the sampling RNG
    pub fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> AppResult<T> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| AppError::Internal("random number generator lock poisoned".to_string()))?;
        Ok(f(&mut *rng))
    }
}

/// Creates the application router with all routes
///
/// Routes are served at the root and again under `/api`.
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        .merge(api_routes())
        .nest("/api", api_routes())
        .with_state(state)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors)
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health_check))
        .route("/genres", get(list_genres))
        .route("/movies/recommend", post(movies::recommend))
        .route("/movies/personalized", post(movies::personalized))
        .route("/movies/popular", get(movies::popular))
        .route("/movies/search", get(movies::search))
}

fn cors_layer(config: &Config) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(cors::Any);

    match config.allowed_origins() {
        Some(origins) => {
            let origins: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|origin| match HeaderValue::from_str(origin) {
                    Ok(value) => Some(value),
                    Err(_) => {
                        tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                        None
                    }
                })
                .collect();
            layer.allow_origin(origins)
        }
        None => layer.allow_origin(cors::Any),
    }
}

/// Turns a panic inside a handler into a JSON 500 instead of dropping the connection
fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else {
        "unknown internal fault".to_string()
    };

    AppError::Internal(message).into_response()
}

/// Health check endpoint, 200 whenever the process is up
async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let (status, movies_count, loaded_at) = match state.catalog() {
        Ok(catalog) => ("healthy", catalog.len(), Some(catalog.loaded_at())),
        Err(_) => ("degraded", 0, None),
    };

    Json(HealthResponse {
        status,
        movies_count,
        loaded_at,
    })
}

/// Every genre present in the catalog
async fn list_genres(State(state): State<Arc<AppState>>) -> AppResult<Json<GenresResponse>> {
    let genres = state.catalog()?.genres();
    tracing::info!(count = genres.len(), "Listing genres");
    Ok(Json(GenresResponse { genres }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MovieRecord;

    #[test]
    fn test_missing_catalog_is_unavailable() {
        let state = AppState::new(None, Config::default());
        assert!(matches!(state.catalog(), Err(AppError::DataUnavailable)));
    }

    #[test]
    fn test_empty_catalog_is_unavailable() {
        let state = AppState::new(Some(Catalog::new(vec![])), Config::default());
        assert!(matches!(state.catalog(), Err(AppError::DataUnavailable)));
    }

    #[test]
    fn test_seeded_rng_is_deterministic() {
        use rand::Rng;

        let config = Config {
            rng_seed: Some(17),
            ..Config::default()
        };
        let first = AppState::new(None, config.clone());
        let second = AppState::new(None, config);

        let a: u64 = first.with_rng(|rng| rng.gen()).unwrap();
        let b: u64 = second.with_rng(|rng| rng.gen()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_loaded_catalog_is_available() {
        let catalog = Catalog::new(vec![MovieRecord::new("Heat", vec!["Crime".to_string()])]);
        let state = AppState::new(Some(catalog), Config::default());
        assert_eq!(state.catalog().unwrap().len(), 1);
    }

    #[test]
    fn test_handle_panic_reports_message() {
        let response = handle_panic(Box::new("scoring blew up"));
        assert_eq!(response.status(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    }
}
