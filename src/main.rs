use std::sync::Arc;

use axum::Router;
use sqlx::sqlite::SqlitePoolOptions;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use atrium::api::{api_routes, AppState};
use atrium::assist::HttpCompletionClient;
use atrium::authz::Role;
use atrium::config::AppConfig;
use atrium::crypto::PasswordHasher;
use atrium::report::ReportCache;
use atrium::repository::NewUser;
use atrium::session::SessionConfig;
use atrium::sqlite::{create_repositories, migrations, SqliteCompanyStore, SqliteRepositories};
use atrium::SecretString;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "atrium=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env();

    let session_config = SessionConfig {
        cookie_secure: config.cookie_secure,
        session_lifetime: config.session_lifetime,
        secret_key: config.session_secret.clone(),
        ..Default::default()
    };
    session_config
        .validate()
        .map_err(|msg| format!("SESSION_SECRET: {msg}"))?;

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;

    migrations::run(&pool).await?;
    tracing::info!("migrations applied, database ready");

    let repos = create_repositories(pool.clone());
    seed_admin(&pool, &repos).await?;
    let state = AppState {
        users: repos.users,
        sessions: repos.sessions,
        rate_limiter: repos.rate_limiter,
        customers: repos.customers,
        deals: repos.deals,
        quotes: repos.quotes,
        invoices: repos.invoices,
        shipments: repos.shipments,
        tasks: repos.tasks,
        tickets: repos.tickets,
        vendors: repos.vendors,
        approvals: repos.approvals,
        notifications: repos.notifications,
        activity: repos.activity,
        report_cache: ReportCache::new(repos.report_cache),
        assist: Arc::new(HttpCompletionClient::new(&config.assist)),
        session_config: Arc::new(session_config),
        rate_limit: config.rate_limit.clone(),
        report_ttls: config.report_cache.clone(),
    };

    let app = Router::new()
        .nest("/api", api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = config.bind_address();
    tracing::info!("listening on {addr}");

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// First-run provisioning: if `ADMIN_EMAIL` and `ADMIN_PASSWORD` are set and
/// no such user exists, create the company (`ADMIN_COMPANY`, default
/// "Default") and an admin account in it.
async fn seed_admin(
    pool: &sqlx::SqlitePool,
    repos: &SqliteRepositories,
) -> Result<(), Box<dyn std::error::Error>> {
    let (Ok(email), Ok(password)) = (
        std::env::var("ADMIN_EMAIL"),
        std::env::var("ADMIN_PASSWORD"),
    ) else {
        return Ok(());
    };

    if repos.users.find_user_by_email(&email).await?.is_some() {
        return Ok(());
    }

    let companies = SqliteCompanyStore::new(pool.clone());
    let company_name = std::env::var("ADMIN_COMPANY").unwrap_or_else(|_| "Default".to_owned());
    let company_id = match companies.find_id_by_name(&company_name).await? {
        Some(id) => id,
        None => companies.create(&company_name).await?,
    };

    let hashed = PasswordHasher::production().hash(&SecretString::new(password))?;
    repos
        .users
        .create_user(NewUser {
            email: email.clone(),
            name: "Administrator".to_owned(),
            hashed_password: hashed,
            role: Role::Admin,
            company_id: Some(company_id),
        })
        .await?;

    tracing::info!("seeded admin account {email} in company {company_name}");
    Ok(())
}
