use std::sync::Arc;

use axum::{middleware, routing::get, Router};

pub mod config;
pub mod domain;
pub mod errors;
pub mod http;
pub mod logging;
pub mod store;

use domain::handler::TransactionHandler;
use store::TransactionStore;

#[derive(Clone)]
pub struct AppState {
    pub transactions: TransactionHandler,
}

impl AppState {
    pub fn new(store: Arc<dyn TransactionStore>) -> Self {
        Self {
            transactions: TransactionHandler::new(store),
        }
    }
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(http::handlers::root))
        .route("/health", get(http::handlers::health))
        .route(
            "/transactions",
            get(http::handlers::list_transactions).post(http::handlers::create_transaction),
        )
        .route(
            "/transactions/{id}",
            get(http::handlers::get_transaction)
                .put(http::handlers::update_transaction)
                .delete(http::handlers::delete_transaction),
        )
        .fallback(http::handlers::endpoint_not_found)
        .method_not_allowed_fallback(http::handlers::method_not_allowed)
        .layer(middleware::from_fn(logging::request_logging_middleware))
        .with_state(state)
}
