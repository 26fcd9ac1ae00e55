//! Admin service against a live MongoDB on localhost:27017 (no auth).
//! Run with `cargo test -- --ignored`.

use mongodb::bson::doc;
use mongodb::{Client, Database};
use std::time::{Duration, Instant};
use uuid::Uuid;

use mongo_broker::MongoAdminService;
use mongo_broker::config::MongoConfig;

struct Fixture {
    service: MongoAdminService,
    db_name: String,
}

impl Fixture {
    fn new() -> Self {
        let service =
            MongoAdminService::connect(&MongoConfig::default()).expect("client should build");
        Self {
            service,
            db_name: format!("broker_test_{}", Uuid::new_v4().simple()),
        }
    }

    fn client(&self) -> &Client {
        self.service.client()
    }

    async fn database_names(&self) -> Vec<String> {
        self.client()
            .list_database_names()
            .await
            .expect("listing databases should succeed")
    }

    async fn cleanup(self) {
        let db = self.client().database(&self.db_name);
        let _ = db
            .run_command(doc! { "dropAllUsersFromDatabase": 1 })
            .await;
        let _ = db.drop().await;
    }
}

/// Client authenticating as `username` against `db_name`.
fn user_database(db_name: &str, username: &str, password: &str, timeout_ms: u64) -> Database {
    let cfg = MongoConfig {
        username: Some(username.to_string()),
        password: Some(password.to_string()),
        auth_source: Some(db_name.to_string()),
        server_selection_timeout_ms: timeout_ms,
        ..MongoConfig::default()
    };
    let options = cfg.client_options().expect("options should build");
    Client::with_options(options)
        .expect("client should build")
        .database(db_name)
}

#[tokio::test]
#[ignore = "requires a MongoDB server on localhost:27017"]
async fn instance_creation_is_successful() {
    let fx = Fixture::new();
    let db = fx
        .service
        .create_database(&fx.db_name)
        .await
        .expect("create should succeed");
    assert_eq!(db.name(), fx.db_name);
    assert!(fx.database_names().await.contains(&fx.db_name));
    fx.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a MongoDB server on localhost:27017"]
async fn failed_create_keeps_an_existing_database() {
    let fx = Fixture::new();
    let db = fx.client().database(&fx.db_name);
    db.collection::<mongodb::bson::Document>("orders")
        .insert_one(doc! { "order": 1 })
        .await
        .expect("seed write should succeed");
    // a view cannot be written to, so the bootstrap insert fails
    db.run_command(doc! { "create": "foo", "viewOn": "orders", "pipeline": [] })
        .await
        .expect("view creation should succeed");

    assert!(fx.service.create_database(&fx.db_name).await.is_err());

    assert!(fx.database_names().await.contains(&fx.db_name));
    let kept = db
        .collection::<mongodb::bson::Document>("orders")
        .count_documents(doc! {})
        .await
        .expect("count should succeed");
    assert_eq!(kept, 1);
    fx.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a MongoDB server on localhost:27017"]
async fn database_name_does_not_exist() {
    let fx = Fixture::new();
    assert!(!fx.service.database_exists("NOT_HERE").await.unwrap());
}

#[tokio::test]
#[ignore = "requires a MongoDB server on localhost:27017"]
async fn database_name_exists() {
    let fx = Fixture::new();
    fx.service.create_database(&fx.db_name).await.unwrap();
    assert!(fx.service.database_exists(&fx.db_name).await.unwrap());
    fx.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a MongoDB server on localhost:27017"]
async fn delete_database_succeeds() {
    let fx = Fixture::new();
    fx.service.create_database(&fx.db_name).await.unwrap();
    assert!(fx.database_names().await.contains(&fx.db_name));

    fx.service.delete_database(&fx.db_name).await.unwrap();
    assert!(!fx.database_names().await.contains(&fx.db_name));
    fx.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a MongoDB server on localhost:27017"]
async fn deleting_an_absent_database_is_not_an_error() {
    let fx = Fixture::new();
    fx.service
        .delete_database(&fx.db_name)
        .await
        .expect("dropping a missing database should succeed");
}

#[tokio::test]
#[ignore = "requires a MongoDB server on localhost:27017"]
async fn new_user_created_successfully() {
    let fx = Fixture::new();
    fx.service.create_database(&fx.db_name).await.unwrap();
    fx.service
        .create_user(&fx.db_name, "user", "password")
        .await
        .expect("create user should succeed");
    assert!(fx.service.user_exists(&fx.db_name, "user").await.unwrap());

    // the new credentials work
    user_database(&fx.db_name, "user", "password", 5000)
        .list_collection_names()
        .await
        .expect("authenticated listing should succeed");
    fx.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a MongoDB server on localhost:27017"]
async fn creating_a_duplicate_user_fails() {
    let fx = Fixture::new();
    fx.service.create_database(&fx.db_name).await.unwrap();
    fx.service
        .create_user(&fx.db_name, "user", "password")
        .await
        .unwrap();
    assert!(
        fx.service
            .create_user(&fx.db_name, "user", "password")
            .await
            .is_err()
    );
    fx.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a MongoDB server on localhost:27017"]
async fn delete_user_succeeds() {
    let fx = Fixture::new();
    fx.service.create_database(&fx.db_name).await.unwrap();
    fx.client()
        .database(&fx.db_name)
        .run_command(doc! { "createUser": "user", "pwd": "password", "roles": [] })
        .await
        .expect("create should succeed");

    fx.service.delete_user(&fx.db_name, "user").await.unwrap();
    assert!(!fx.service.user_exists(&fx.db_name, "user").await.unwrap());

    let started = Instant::now();
    let result = user_database(&fx.db_name, "user", "password", 500)
        .list_collection_names()
        .await;
    assert!(result.is_err(), "deleted user must not authenticate");
    assert!(started.elapsed() < Duration::from_secs(5));
    fx.cleanup().await;
}

#[tokio::test]
async fn unreachable_server_fails_within_selection_timeout() {
    let cfg = MongoConfig {
        host: "127.0.0.1".to_string(),
        port: 1,
        server_selection_timeout_ms: 500,
        ..MongoConfig::default()
    };
    let service = MongoAdminService::connect(&cfg).expect("client should build");

    let started = Instant::now();
    let err = service
        .create_database("never_created")
        .await
        .expect_err("no server is listening");
    assert!(err.is_server_selection_timeout());
    // fails at the existence check, before any write or cleanup
    assert!(started.elapsed() < Duration::from_secs(5));
}
