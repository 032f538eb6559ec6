use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;
use dotenvy::dotenv;
use schoolhub::router::init_router;
use schoolhub::state::init_app_state;
use schoolhub_config::{DatabaseConfig, ServerConfig};
use schoolhub_observability::{init_metrics, init_tracing, metrics_app};
use tokio::signal;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "schoolhub", about = "SchoolHub API server", version)]
struct Args {
    /// Drop every table and re-run migrations before serving
    #[arg(long)]
    reset_db: bool,
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    let args = Args::parse();

    init_tracing();
    let metrics_handle = init_metrics();

    let db_config = DatabaseConfig::from_env();
    let server_config = ServerConfig::from_env();

    let db = schoolhub_db::init_db_pool(&db_config)
        .await
        .expect("Failed to connect to database");

    let migrated = if args.reset_db {
        schoolhub_db::reset_database(&db).await
    } else {
        schoolhub_db::run_migrations(&db).await
    };
    if let Err(e) = migrated {
        error!(error = %e, "Database migration failed");
        std::process::exit(1);
    }

    let state = init_app_state(db);

    let limiter = state.auth_limiter.clone();
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(Duration::from_secs(60)).await;
            limiter.retain_recent();
        }
    });

    let mut app = init_router(state);
    if let Some(handle) = metrics_handle {
        app = app.merge(metrics_app(handle));
    }

    let address = server_config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .unwrap_or_else(|e| panic!("Failed to bind {}: {}", address, e));

    info!(%address, "Server listening");
    info!("Swagger UI available at http://{}/swagger-ui", address);
    info!("Scalar UI available at http://{}/scalar", address);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("Server error");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining connections");
}
