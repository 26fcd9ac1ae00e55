use crate::db::models::{DbServiceBinding, DbServiceInstance};
use crate::db::schema::SQLITE_INIT;
use crate::error::BrokerError;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};

pub type SqlitePool = Pool<Sqlite>;

#[derive(Clone)]
pub struct BrokerStorage {
    pool: SqlitePool,
}

impl BrokerStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Initialize the schema by executing the bundled DDL.
    pub async fn init_schema(&self) -> Result<(), BrokerError> {
        // sqlx::query runs one statement at a time
        for stmt in SQLITE_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&self.pool).await?;
        }
        Ok(())
    }

    pub async fn insert_instance(&self, instance: &DbServiceInstance) -> Result<(), BrokerError> {
        sqlx::query(
            r#"
            INSERT INTO service_instances (
                id, service_id, plan_id, organization_guid, space_guid, created_at
            ) VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&instance.id)
        .bind(&instance.service_id)
        .bind(&instance.plan_id)
        .bind(&instance.organization_guid)
        .bind(&instance.space_guid)
        .bind(instance.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn find_instance(&self, id: &str) -> Result<Option<DbServiceInstance>, BrokerError> {
        let row = sqlx::query(
            r#"SELECT id, service_id, plan_id, organization_guid, space_guid, created_at
               FROM service_instances WHERE id = ?"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Self::row_to_instance).transpose()
    }

    /// Remove an instance together with any bindings still recorded for it.
    /// Returns whether the instance row existed.
    pub async fn delete_instance(&self, id: &str) -> Result<bool, BrokerError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM service_bindings WHERE instance_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM service_instances WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn insert_binding(&self, binding: &DbServiceBinding) -> Result<(), BrokerError> {
        let credentials = serde_json::to_string(&binding.credentials)?;
        sqlx::query(
            r#"
            INSERT INTO service_bindings (
                id, instance_id, app_guid, username, credentials, created_at
            ) VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&binding.id)
        .bind(&binding.instance_id)
        .bind(&binding.app_guid)
        .bind(&binding.username)
        .bind(credentials)
        .bind(binding.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn find_binding(&self, id: &str) -> Result<Option<DbServiceBinding>, BrokerError> {
        let row = sqlx::query(
            r#"SELECT id, instance_id, app_guid, username, credentials, created_at
               FROM service_bindings WHERE id = ?"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Self::row_to_binding).transpose()
    }

    /// Returns whether the binding row existed.
    pub async fn delete_binding(&self, id: &str) -> Result<bool, BrokerError> {
        let result = sqlx::query("DELETE FROM service_bindings WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    fn row_to_instance(row: SqliteRow) -> Result<DbServiceInstance, BrokerError> {
        let created_at: String = row.try_get("created_at")?;
        Ok(DbServiceInstance {
            id: row.try_get("id")?,
            service_id: row.try_get("service_id")?,
            plan_id: row.try_get("plan_id")?,
            organization_guid: row.try_get("organization_guid")?,
            space_guid: row.try_get("space_guid")?,
            created_at: parse_timestamp(&created_at)?,
        })
    }

    fn row_to_binding(row: SqliteRow) -> Result<DbServiceBinding, BrokerError> {
        let credentials_json: String = row.try_get("credentials")?;
        let created_at: String = row.try_get("created_at")?;
        let credentials: Value = serde_json::from_str(&credentials_json)
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
        Ok(DbServiceBinding {
            id: row.try_get("id")?,
            instance_id: row.try_get("instance_id")?,
            app_guid: row.try_get("app_guid")?,
            username: row.try_get("username")?,
            credentials,
            created_at: parse_timestamp(&created_at)?,
        })
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, BrokerError> {
    let parsed = DateTime::parse_from_rfc3339(raw).map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
    Ok(parsed.with_timezone(&Utc))
}
