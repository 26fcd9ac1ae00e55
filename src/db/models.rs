use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DbServiceInstance {
    pub id: String,
    pub service_id: String,
    pub plan_id: String,
    pub organization_guid: String,
    pub space_guid: String,
    pub created_at: DateTime<Utc>,
}

impl DbServiceInstance {
    /// The MongoDB database owned by this instance.
    pub fn database_name(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DbServiceBinding {
    pub id: String,
    pub instance_id: String,
    pub app_guid: Option<String>,
    pub username: String,
    pub credentials: Value,
    pub created_at: DateTime<Utc>,
}
