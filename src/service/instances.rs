use crate::db::{BrokerStorage, DbServiceInstance};
use crate::error::BrokerError;
use crate::service::mongo_admin::MongoAdminService;
use crate::types::osb::{Catalog, ProvisionRequest, UpdateRequest};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

/// Provisions one MongoDB database per service instance, named after the instance id.
#[derive(Clone)]
pub struct InstanceService {
    admin: MongoAdminService,
    storage: BrokerStorage,
    catalog: Arc<Catalog>,
}

impl InstanceService {
    pub fn new(admin: MongoAdminService, storage: BrokerStorage, catalog: Arc<Catalog>) -> Self {
        Self {
            admin,
            storage,
            catalog,
        }
    }

    pub async fn create(
        &self,
        id: &str,
        req: ProvisionRequest,
    ) -> Result<DbServiceInstance, BrokerError> {
        if !self.catalog.offers(&req.service_id, &req.plan_id) {
            return Err(BrokerError::InvalidRequest(format!(
                "unknown service_id/plan_id: {}/{}",
                req.service_id, req.plan_id
            )));
        }
        if self.storage.find_instance(id).await?.is_some() {
            return Err(BrokerError::InstanceExists(id.to_string()));
        }

        // leftover from an earlier provision that never got recorded
        if self.admin.database_exists(id).await? {
            warn!(instance_id = %id, "dropping unrecorded database before provisioning");
            self.admin.delete_database(id).await?;
        }
        self.admin.create_database(id).await?;

        let instance = DbServiceInstance {
            id: id.to_string(),
            service_id: req.service_id,
            plan_id: req.plan_id,
            organization_guid: req.organization_guid,
            space_guid: req.space_guid,
            created_at: Utc::now(),
        };
        self.storage.insert_instance(&instance).await?;
        info!(instance_id = %id, plan_id = %instance.plan_id, "service instance provisioned");
        Ok(instance)
    }

    pub async fn get(&self, id: &str) -> Result<DbServiceInstance, BrokerError> {
        self.storage
            .find_instance(id)
            .await?
            .ok_or_else(|| BrokerError::InstanceMissing(id.to_string()))
    }

    /// Plans are fixed once provisioned.
    pub async fn update(&self, id: &str, _req: UpdateRequest) -> Result<(), BrokerError> {
        self.get(id).await?;
        Err(BrokerError::UpdateNotSupported)
    }

    pub async fn delete(&self, id: &str) -> Result<(), BrokerError> {
        let Some(instance) = self.storage.find_instance(id).await? else {
            return Err(BrokerError::InstanceGone(id.to_string()));
        };

        let database = instance.database_name();
        self.admin.drop_all_users(database).await?;
        self.admin.delete_database(database).await?;
        self.storage.delete_instance(id).await?;
        info!(instance_id = %id, "service instance deprovisioned");
        Ok(())
    }
}
