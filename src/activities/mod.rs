mod dto;
pub mod handlers;
pub mod repo;
mod repo_types;
pub mod services;
pub mod validation;

use crate::state::AppState;
use axum::Router;

pub use repo_types::ActivityType;

pub fn router() -> Router<AppState> {
    handlers::activity_routes()
}
