use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;
use serde_json::{Value, json};

use crate::middleware::auth::RequireBrokerAuth;
use crate::router::BrokerState;
use crate::types::osb::{BindRequest, BindResponse, DeleteQuery};
use crate::BrokerError;

/// PUT /v2/service_instances/{instance_id}/service_bindings/{binding_id}
pub async fn bind_handler(
    _auth: RequireBrokerAuth,
    State(state): State<BrokerState>,
    Path((instance_id, binding_id)): Path<(String, String)>,
    WithRejection(Json(req), _): WithRejection<Json<BindRequest>, BrokerError>,
) -> Result<(StatusCode, Json<BindResponse>), BrokerError> {
    let binding = state.bindings.create(&instance_id, &binding_id, req).await?;
    Ok((
        StatusCode::CREATED,
        Json(BindResponse {
            credentials: binding.credentials,
        }),
    ))
}

/// DELETE /v2/service_instances/{instance_id}/service_bindings/{binding_id}
pub async fn unbind_handler(
    _auth: RequireBrokerAuth,
    State(state): State<BrokerState>,
    Path((instance_id, binding_id)): Path<(String, String)>,
    WithRejection(Query(_query), _): WithRejection<Query<DeleteQuery>, BrokerError>,
) -> Result<Json<Value>, BrokerError> {
    state.bindings.delete(&instance_id, &binding_id).await?;
    Ok(Json(json!({})))
}
