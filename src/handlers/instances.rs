use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;
use serde_json::{Value, json};

use crate::middleware::auth::RequireBrokerAuth;
use crate::router::BrokerState;
use crate::types::osb::{
    DeleteQuery, InstanceResponse, ProvisionRequest, ProvisionResponse, UpdateRequest,
};
use crate::BrokerError;

/// PUT /v2/service_instances/{instance_id}
pub async fn provision_handler(
    _auth: RequireBrokerAuth,
    State(state): State<BrokerState>,
    Path(instance_id): Path<String>,
    WithRejection(Json(req), _): WithRejection<Json<ProvisionRequest>, BrokerError>,
) -> Result<(StatusCode, Json<ProvisionResponse>), BrokerError> {
    state.instances.create(&instance_id, req).await?;
    Ok((StatusCode::CREATED, Json(ProvisionResponse::default())))
}

/// GET /v2/service_instances/{instance_id}
pub async fn fetch_instance_handler(
    _auth: RequireBrokerAuth,
    State(state): State<BrokerState>,
    Path(instance_id): Path<String>,
) -> Result<Json<InstanceResponse>, BrokerError> {
    let instance = state.instances.get(&instance_id).await?;
    Ok(Json(InstanceResponse {
        service_id: instance.service_id,
        plan_id: instance.plan_id,
    }))
}

/// PATCH /v2/service_instances/{instance_id}
pub async fn update_handler(
    _auth: RequireBrokerAuth,
    State(state): State<BrokerState>,
    Path(instance_id): Path<String>,
    WithRejection(Json(req), _): WithRejection<Json<UpdateRequest>, BrokerError>,
) -> Result<Json<Value>, BrokerError> {
    state.instances.update(&instance_id, req).await?;
    Ok(Json(json!({})))
}

/// DELETE /v2/service_instances/{instance_id}?service_id=..&plan_id=..
pub async fn deprovision_handler(
    _auth: RequireBrokerAuth,
    State(state): State<BrokerState>,
    Path(instance_id): Path<String>,
    WithRejection(Query(_query), _): WithRejection<Query<DeleteQuery>, BrokerError>,
) -> Result<Json<Value>, BrokerError> {
    state.instances.delete(&instance_id).await?;
    Ok(Json(json!({})))
}
