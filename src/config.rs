use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use mongodb::options::{ClientOptions, Credential, ServerAddress};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Top-level broker configuration.
///
/// Layering order (later wins):
/// - built-in defaults
/// - `config.toml` in the working directory, if present
/// - `BROKER_*` environment variables, `__` separating sections
///   (e.g. `BROKER_MONGODB__PORT=27018`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub basic: BasicConfig,
    pub mongodb: MongoConfig,
    pub catalog: CatalogConfig,
}

impl Config {
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file("config.toml"))
            .merge(Env::prefixed("BROKER_").split("__"))
    }

    pub fn load() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BasicConfig {
    pub listen_addr: String,
    pub loglevel: String,
    /// SQLite URL of the instance/binding registry.
    pub database_url: String,
    pub broker_username: String,
    pub broker_password: String,
}

impl Default for BasicConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            loglevel: "info".to_string(),
            database_url: "sqlite:broker.sqlite".to_string(),
            broker_username: "broker".to_string(),
            broker_password: "broker".to_string(),
        }
    }
}

/// Connection settings of the backing MongoDB server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MongoConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Database the credential is defined in. Defaults to `admin` when a username is set.
    pub auth_source: Option<String>,
    pub server_selection_timeout_ms: u64,
    pub app_name: String,
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 27017,
            username: None,
            password: None,
            auth_source: None,
            server_selection_timeout_ms: 5000,
            app_name: "mongo-broker".to_string(),
        }
    }
}

impl MongoConfig {
    pub fn server_selection_timeout(&self) -> Duration {
        Duration::from_millis(self.server_selection_timeout_ms)
    }

    /// Build driver options. No I/O happens here; the driver connects lazily.
    pub fn client_options(&self) -> Result<ClientOptions, mongodb::error::Error> {
        let address = ServerAddress::parse(format!("{}:{}", self.host, self.port))?;
        let mut options = ClientOptions::builder().hosts(vec![address]).build();
        options.app_name = Some(self.app_name.clone());
        options.server_selection_timeout = Some(self.server_selection_timeout());

        if let Some(username) = self.username.clone() {
            let source = self
                .auth_source
                .clone()
                .unwrap_or_else(|| "admin".to_string());
            let mut credential = Credential::builder()
                .username(username)
                .source(source)
                .build();
            credential.password = self.password.clone();
            options.credential = Some(credential);
        }
        Ok(options)
    }
}

/// The single service offering advertised by `GET /v2/catalog`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub service_id: String,
    pub service_name: String,
    pub description: String,
    pub bindable: bool,
    pub plan_id: String,
    pub plan_name: String,
    pub plan_description: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            service_id: "mongodb-service-broker".to_string(),
            service_name: "mongodb".to_string(),
            description: "A simple MongoDB service broker implementation".to_string(),
            bindable: true,
            plan_id: "mongo-plan".to_string(),
            plan_name: "standard".to_string(),
            plan_description: "A dedicated database on a shared MongoDB server".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_point_at_local_mongodb() {
        let cfg = Config::default();
        assert_eq!(cfg.mongodb.host, "localhost");
        assert_eq!(cfg.mongodb.port, 27017);
        assert!(cfg.mongodb.username.is_none());
        assert_eq!(cfg.basic.listen_addr, "0.0.0.0:8080");
    }

    #[test]
    fn env_overrides_toml_and_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                [mongodb]
                host = "mongo.internal"
                port = 27018

                [basic]
                broker_username = "admin"
                "#,
            )?;
            jail.set_env("BROKER_MONGODB__PORT", "27019");
            jail.set_env("BROKER_BASIC__BROKER_PASSWORD", "s3cret");

            let cfg = Config::load()?;
            assert_eq!(cfg.mongodb.host, "mongo.internal");
            assert_eq!(cfg.mongodb.port, 27019);
            assert_eq!(cfg.basic.broker_username, "admin");
            assert_eq!(cfg.basic.broker_password, "s3cret");
            assert_eq!(cfg.catalog.service_name, "mongodb");
            Ok(())
        });
    }

    #[test]
    fn client_options_carry_credential_and_timeout() {
        let cfg = MongoConfig {
            username: Some("root".to_string()),
            password: Some("pw".to_string()),
            server_selection_timeout_ms: 500,
            ..MongoConfig::default()
        };
        let options = cfg.client_options().expect("options should build");
        assert_eq!(
            options.server_selection_timeout,
            Some(Duration::from_millis(500))
        );
        let credential = options.credential.expect("credential should be set");
        assert_eq!(credential.username.as_deref(), Some("root"));
        assert_eq!(credential.password.as_deref(), Some("pw"));
        assert_eq!(credential.source.as_deref(), Some("admin"));
    }

    #[test]
    fn anonymous_client_options_have_no_credential() {
        let options = MongoConfig::default()
            .client_options()
            .expect("options should build");
        assert!(options.credential.is_none());
        assert_eq!(options.hosts.len(), 1);
    }
}
