//! Open Service Broker v2 request and response bodies.

use crate::config::CatalogConfig;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Catalog {
    pub services: Vec<ServiceDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceDefinition {
    pub id: String,
    pub name: String,
    pub description: String,
    pub bindable: bool,
    pub plan_updateable: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    pub plans: Vec<Plan>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Plan {
    pub id: String,
    pub name: String,
    pub description: String,
    pub free: bool,
}

impl From<&CatalogConfig> for Catalog {
    fn from(cfg: &CatalogConfig) -> Self {
        Catalog {
            services: vec![ServiceDefinition {
                id: cfg.service_id.clone(),
                name: cfg.service_name.clone(),
                description: cfg.description.clone(),
                bindable: cfg.bindable,
                plan_updateable: false,
                tags: vec!["mongodb".to_string(), "document".to_string()],
                plans: vec![Plan {
                    id: cfg.plan_id.clone(),
                    name: cfg.plan_name.clone(),
                    description: cfg.plan_description.clone(),
                    free: true,
                }],
            }],
        }
    }
}

impl Catalog {
    pub fn find_service(&self, service_id: &str) -> Option<&ServiceDefinition> {
        self.services.iter().find(|s| s.id == service_id)
    }

    /// True when `plan_id` is a plan of `service_id`.
    pub fn offers(&self, service_id: &str, plan_id: &str) -> bool {
        self.find_service(service_id)
            .is_some_and(|s| s.plans.iter().any(|p| p.id == plan_id))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvisionRequest {
    pub service_id: String,
    pub plan_id: String,
    pub organization_guid: String,
    pub space_guid: String,
    #[serde(default)]
    pub parameters: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProvisionResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dashboard_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateRequest {
    pub service_id: String,
    #[serde(default)]
    pub plan_id: Option<String>,
    #[serde(default)]
    pub parameters: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceResponse {
    pub service_id: String,
    pub plan_id: String,
}

/// Query string of DELETE requests for instances and bindings.
#[derive(Debug, Clone, Deserialize)]
pub struct DeleteQuery {
    pub service_id: String,
    pub plan_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BindRequest {
    pub service_id: String,
    pub plan_id: String,
    #[serde(default)]
    pub app_guid: Option<String>,
    #[serde(default)]
    pub bind_resource: Option<Map<String, Value>>,
    #[serde(default)]
    pub parameters: Option<Map<String, Value>>,
}

impl BindRequest {
    /// `app_guid` moved into `bind_resource` in later API versions; accept both.
    pub fn app_guid(&self) -> Option<String> {
        self.app_guid.clone().or_else(|| {
            self.bind_resource
                .as_ref()?
                .get("app_guid")?
                .as_str()
                .map(str::to_string)
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BindResponse {
    pub credentials: Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn catalog_offers_only_configured_plan() {
        let catalog = Catalog::from(&CatalogConfig::default());
        assert!(catalog.offers("mongodb-service-broker", "mongo-plan"));
        assert!(!catalog.offers("mongodb-service-broker", "other-plan"));
        assert!(!catalog.offers("unknown", "mongo-plan"));
    }

    #[test]
    fn catalog_serializes_osb_field_names() {
        let value = serde_json::to_value(Catalog::from(&CatalogConfig::default())).unwrap();
        let service = &value["services"][0];
        assert_eq!(service["name"], "mongodb");
        assert_eq!(service["plan_updateable"], false);
        assert_eq!(service["plans"][0]["id"], "mongo-plan");
    }

    #[test]
    fn bind_request_reads_app_guid_from_bind_resource() {
        let req: BindRequest = serde_json::from_value(json!({
            "service_id": "s",
            "plan_id": "p",
            "bind_resource": { "app_guid": "app-123" }
        }))
        .unwrap();
        assert_eq!(req.app_guid().as_deref(), Some("app-123"));

        let req: BindRequest = serde_json::from_value(json!({
            "service_id": "s",
            "plan_id": "p",
            "app_guid": "legacy"
        }))
        .unwrap();
        assert_eq!(req.app_guid().as_deref(), Some("legacy"));
    }
}
