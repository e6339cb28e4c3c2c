pub mod catalog;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

pub use catalog::Catalog;
pub use config::Config;
pub use error::{AppError, AppResult};
pub use routes::{create_router, AppState};
