//! Panchayath survey service

use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use panchayath_survey::{
    auth::{JwtSessionProvider, SessionProvider},
    config::Args,
    db::MongoClient,
    server::{self, AppState},
    store::{AppRole, LocationStore, MemoryStore, MongoSurveyStore, ResponseStore, RoleStore},
};

const DEV_ADMIN_ID: &str = "dev-admin";
const DEV_ADMIN_EMAIL: &str = "admin@localhost";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    let log_level = args.log_level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("panchayath_survey={},info", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    info!("======================================");
    info!("  Panchayath Survey");
    info!("======================================");
    info!("Listen: {}", args.listen);
    info!("Mode: {}", if args.dev_mode { "DEVELOPMENT" } else { "PRODUCTION" });
    info!("MongoDB: {} / {}", args.mongodb_uri, args.mongodb_db);
    info!("Auth URL: {}", args.auth_url);
    info!("Default language: {}", args.default_lang);
    info!("======================================");

    let provider = Arc::new(JwtSessionProvider::from_args(&args)?);
    let sessions: Arc<dyn SessionProvider> = provider.clone();

    // MongoDB is optional in dev mode
    let state = match MongoClient::new(&args.mongodb_uri, &args.mongodb_db).await {
        Ok(client) => {
            info!("MongoDB connected successfully");
            let store = Arc::new(MongoSurveyStore::new(&client).await?);
            let locations: Arc<dyn LocationStore> = store.clone();
            let responses: Arc<dyn ResponseStore> = store.clone();
            let roles: Arc<dyn RoleStore> = store;
            AppState::new(args, locations, responses, roles, sessions)
        }
        Err(e) => {
            if args.dev_mode {
                warn!("MongoDB connection failed (dev mode, using in-memory store): {}", e);
                let store = Arc::new(MemoryStore::new());
                store.grant_role(DEV_ADMIN_ID, AppRole::Admin).await;
                let token = provider.issue(DEV_ADMIN_ID, DEV_ADMIN_EMAIL)?;
                info!("Dev admin token for {}: {}", DEV_ADMIN_EMAIL, token);
                AppState::with_memory_store(args, store, sessions)
            } else {
                error!("MongoDB connection failed: {}", e);
                std::process::exit(1);
            }
        }
    };

    server::run(Arc::new(state)).await?;

    Ok(())
}
