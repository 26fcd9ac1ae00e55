use axum::{
    Router,
    routing::{get, put},
};
use std::sync::Arc;

use crate::db::BrokerStorage;
use crate::handlers::bindings::{bind_handler, unbind_handler};
use crate::handlers::catalog::{catalog_handler, health_handler};
use crate::handlers::instances::{
    deprovision_handler, fetch_instance_handler, provision_handler, update_handler,
};
use crate::middleware::auth::BrokerCredentials;
use crate::service::{BindingService, InstanceService, MongoAdminService};
use crate::types::osb::Catalog;

#[derive(Clone)]
pub struct BrokerState {
    pub instances: InstanceService,
    pub bindings: BindingService,
    pub catalog: Arc<Catalog>,
    pub credentials: Arc<BrokerCredentials>,
}

impl BrokerState {
    pub fn new(
        admin: MongoAdminService,
        storage: BrokerStorage,
        catalog: Catalog,
        credentials: BrokerCredentials,
    ) -> Self {
        let catalog = Arc::new(catalog);
        Self {
            instances: InstanceService::new(admin.clone(), storage.clone(), catalog.clone()),
            bindings: BindingService::new(admin, storage),
            catalog,
            credentials: Arc::new(credentials),
        }
    }
}

pub fn broker_router(state: BrokerState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/v2/catalog", get(catalog_handler))
        .route(
            "/v2/service_instances/{instance_id}",
            put(provision_handler)
                .get(fetch_instance_handler)
                .patch(update_handler)
                .delete(deprovision_handler),
        )
        .route(
            "/v2/service_instances/{instance_id}/service_bindings/{binding_id}",
            put(bind_handler).delete(unbind_handler),
        )
        .with_state(state)
}
