//! SQL DDL for initializing the broker registry.

/// SQLite schema with:
/// - `service_instances`, keyed by the platform-assigned instance id
/// - `service_bindings`, keyed by binding id, indexed by `instance_id`
/// - timestamps and credentials stored as TEXT (RFC3339 / JSON)
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS service_instances (
    id TEXT PRIMARY KEY NOT NULL,
    service_id TEXT NOT NULL,
    plan_id TEXT NOT NULL,
    organization_guid TEXT NOT NULL,
    space_guid TEXT NOT NULL,
    created_at TEXT NOT NULL -- RFC3339
);

CREATE TABLE IF NOT EXISTS service_bindings (
    id TEXT PRIMARY KEY NOT NULL,
    instance_id TEXT NOT NULL,
    app_guid TEXT NULL,
    username TEXT NOT NULL,
    credentials TEXT NOT NULL, -- JSON object
    created_at TEXT NOT NULL -- RFC3339
);

CREATE INDEX IF NOT EXISTS idx_service_bindings_instance_id ON service_bindings(instance_id);
"#;
