use axum::{Json, extract::State};

use crate::middleware::auth::RequireBrokerAuth;
use crate::router::BrokerState;
use crate::types::osb::Catalog;

/// GET /v2/catalog
pub async fn catalog_handler(
    _auth: RequireBrokerAuth,
    State(state): State<BrokerState>,
) -> Json<Catalog> {
    Json(state.catalog.as_ref().clone())
}

/// GET /health
pub async fn health_handler() -> &'static str {
    "ok"
}
