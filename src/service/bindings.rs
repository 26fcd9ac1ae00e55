use crate::db::{BrokerStorage, DbServiceBinding};
use crate::error::BrokerError;
use crate::service::mongo_admin::MongoAdminService;
use crate::types::osb::BindRequest;
use chrono::Utc;
use serde_json::json;
use tracing::{error, info, warn};
use uuid::Uuid;

/// One MongoDB user per binding, created in the instance's database.
#[derive(Clone)]
pub struct BindingService {
    admin: MongoAdminService,
    storage: BrokerStorage,
}

impl BindingService {
    pub fn new(admin: MongoAdminService, storage: BrokerStorage) -> Self {
        Self { admin, storage }
    }

    pub async fn create(
        &self,
        instance_id: &str,
        binding_id: &str,
        req: BindRequest,
    ) -> Result<DbServiceBinding, BrokerError> {
        let instance = self
            .storage
            .find_instance(instance_id)
            .await?
            .ok_or_else(|| BrokerError::InstanceMissing(instance_id.to_string()))?;
        if instance.service_id != req.service_id || instance.plan_id != req.plan_id {
            return Err(BrokerError::InvalidRequest(format!(
                "service_id/plan_id do not match instance {instance_id}"
            )));
        }
        if self.storage.find_binding(binding_id).await?.is_some() {
            return Err(BrokerError::BindingExists(binding_id.to_string()));
        }

        let database = instance.database_name();
        let username = binding_id.to_string();
        let password = Uuid::new_v4().simple().to_string();

        // a user left behind by an earlier bind that never got recorded
        if self.admin.user_exists(database, &username).await? {
            warn!(instance_id = %instance_id, binding_id = %binding_id, "dropping unrecorded user before binding");
            self.admin.delete_user(database, &username).await?;
        }
        self.admin.create_user(database, &username, &password).await?;

        match self
            .record(instance_id, binding_id, database, &username, &password, &req)
            .await
        {
            Ok(binding) => {
                info!(instance_id = %instance_id, binding_id = %binding_id, "service binding created");
                Ok(binding)
            }
            Err(e) => {
                warn!(instance_id = %instance_id, binding_id = %binding_id, error = %e, "binding not recorded; dropping user");
                if let Err(cleanup) = self.admin.delete_user(database, &username).await {
                    error!(binding_id = %binding_id, error = %cleanup, "failed to drop unrecorded user");
                }
                Err(e)
            }
        }
    }

    async fn record(
        &self,
        instance_id: &str,
        binding_id: &str,
        database: &str,
        username: &str,
        password: &str,
        req: &BindRequest,
    ) -> Result<DbServiceBinding, BrokerError> {
        let uri = self.admin.connection_uri(database, username, password)?;
        let binding = DbServiceBinding {
            id: binding_id.to_string(),
            instance_id: instance_id.to_string(),
            app_guid: req.app_guid(),
            credentials: json!({
                "uri": uri.as_str(),
                "username": username,
                "password": password,
                "database": database,
                "host": uri.host_str(),
                "port": uri.port(),
            }),
            username: username.to_string(),
            created_at: Utc::now(),
        };
        self.storage.insert_binding(&binding).await?;
        Ok(binding)
    }

    pub async fn delete(&self, instance_id: &str, binding_id: &str) -> Result<(), BrokerError> {
        let binding = match self.storage.find_binding(binding_id).await? {
            Some(b) if b.instance_id == instance_id => b,
            _ => return Err(BrokerError::BindingGone(binding_id.to_string())),
        };
        let Some(instance) = self.storage.find_instance(instance_id).await? else {
            return Err(BrokerError::BindingGone(binding_id.to_string()));
        };

        self.admin
            .delete_user(instance.database_name(), &binding.username)
            .await?;
        self.storage.delete_binding(binding_id).await?;
        info!(instance_id = %instance_id, binding_id = %binding_id, "service binding deleted");
        Ok(())
    }
}
