use mimalloc::MiMalloc;
use mongo_broker::config::Config;
use mongo_broker::middleware::auth::BrokerCredentials;
use mongo_broker::router::{BrokerState, broker_router};
use mongo_broker::types::osb::Catalog;
use mongo_broker::MongoAdminService;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = Config::load()?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cfg.basic.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        listen_addr = %cfg.basic.listen_addr,
        database_url = %cfg.basic.database_url,
        mongodb = %format!("{}:{}", cfg.mongodb.host, cfg.mongodb.port),
        mongodb_user = %cfg.mongodb.username.as_deref().unwrap_or("<none>"),
        loglevel = %cfg.basic.loglevel
    );

    let storage = mongo_broker::db::connect(&cfg.basic.database_url).await?;
    let admin = MongoAdminService::connect(&cfg.mongodb)?;

    // Surface a misconfigured server early; the broker still starts.
    match admin.database_exists("admin").await {
        Ok(_) => info!("MongoDB reachable"),
        Err(e) => warn!(error = %e, "MongoDB not reachable at startup"),
    }

    let state = BrokerState::new(
        admin,
        storage,
        Catalog::from(&cfg.catalog),
        BrokerCredentials::new(
            cfg.basic.broker_username.clone(),
            cfg.basic.broker_password.clone(),
        ),
    );
    let app = broker_router(state);

    let listener = TcpListener::bind(cfg.basic.listen_addr.as_str()).await?;
    info!("HTTP server listening on {}", cfg.basic.listen_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("broker stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
