//! API server entry point.

use std::sync::Arc;

use api::config::Config;
use domain::TokenService;
use metrics_exporter_prometheus::PrometheusHandle;
use secrecy::ExposeSecret;
use sqlx::postgres::PgPoolOptions;
use store::{InMemoryRepository, PostgresRepository, Repository};
use tokio::signal;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }
}

/// Bootstraps the admin account, builds the router and serves until shutdown.
async fn serve<R: Repository + 'static>(
    config: &Config,
    repo: R,
    tokens: Arc<TokenService>,
    metrics_handle: PrometheusHandle,
) {
    let state = api::create_default_state(repo, tokens);

    if let Some(admin) = &config.admin {
        state
            .accounts
            .ensure_admin(&admin.email, admin.password.expose_secret())
            .await
            .expect("failed to bootstrap admin account");
        tracing::info!(email = %admin.email, "admin account ready");
    }

    let app = api::create_app(state, metrics_handle);

    let addr = config.addr();
    tracing::info!(%addr, "starting API server");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind address");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    tracing::info!("server shut down gracefully");
}

#[tokio::main]
async fn main() {
    // 1. Load configuration
    let config = Config::from_env().expect("invalid configuration");

    // 2. Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 3. Install Prometheus metrics recorder
    let metrics_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    // 4. Token service with the process-wide signing secret
    let tokens = Arc::new(
        TokenService::new(&config.signing_secret()).expect("failed to initialize token service"),
    );

    // 5. Pick the repository and serve
    match &config.database_url {
        Some(url) => {
            let pool = PgPoolOptions::new()
                .max_connections(config.database_max_connections)
                .connect(url)
                .await
                .expect("failed to connect to database");
            let repo = PostgresRepository::new(pool);
            repo.run_migrations()
                .await
                .expect("failed to run database migrations");
            tracing::info!("using PostgreSQL repository");

            serve(&config, repo, tokens, metrics_handle).await;
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory repository");
            serve(&config, InMemoryRepository::new(), tokens, metrics_handle).await;
        }
    }
}
