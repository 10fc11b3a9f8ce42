use std::{process, sync::Arc, time::Duration};

use songbook::{
    application::{
        error::AppError,
        repos::SongsRepo,
        songs::SongService,
    },
    cache::{CacheConfig, build_song_cache},
    config,
    infra::{
        db::PostgresRepositories,
        error::InfraError,
        http::{self, ApiState},
        telemetry,
    },
};
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    telemetry::init(&settings.logging)?;

    match cli_args.command {
        Some(config::Command::Migrate(_)) => run_migrate(settings).await,
        Some(config::Command::Serve(_)) | None => run_serve(settings).await,
    }
}

async fn run_migrate(settings: config::Settings) -> Result<(), AppError> {
    let pool = connect_pool(&settings).await?;
    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(InfraError::from)?;
    info!(target = "songbook::migrate", "Migrations applied");
    Ok(())
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let pool = connect_pool(&settings).await?;
    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(InfraError::from)?;
    let store: Arc<dyn SongsRepo> = Arc::new(PostgresRepositories::new(pool));

    let cache = build_song_cache(&CacheConfig::from(&settings.cache))
        .await
        .map_err(|err| InfraError::cache(err.to_string()))?;

    let songs = Arc::new(SongService::new(store, cache));
    let shutdown = CancellationToken::new();
    let state = ApiState::new(songs, settings.server.request_timeout).with_shutdown(shutdown.clone());

    serve_http(&settings, state, shutdown).await
}

async fn connect_pool(settings: &config::Settings) -> Result<PgPool, AppError> {
    let database_url = settings
        .database
        .url
        .as_ref()
        .ok_or_else(|| InfraError::configuration("database url is not configured"))?;

    let pool = PostgresRepositories::connect(database_url, settings.database.max_connections.get())
        .await
        .map_err(|err| InfraError::database(err.to_string()))?;
    Ok(pool)
}

async fn serve_http(
    settings: &config::Settings,
    state: ApiState,
    shutdown: CancellationToken,
) -> Result<(), AppError> {
    let router = http::build_router(state);
    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(InfraError::from)?;

    info!(
        target = "songbook::http",
        addr = %settings.server.addr,
        "Listening"
    );

    let grace = settings.server.graceful_shutdown;
    let drain = shutdown.clone();
    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            info!(
                target = "songbook::http",
                grace_seconds = grace.as_secs(),
                "Shutdown requested, draining connections"
            );
            cancel_after(drain, grace);
        })
        .await
        .map_err(InfraError::from)?;

    shutdown.cancel();
    info!(target = "songbook::http", "Server stopped");
    Ok(())
}

/// In-flight calls still running after the grace period are cancelled.
fn cancel_after(token: CancellationToken, grace: Duration) {
    tokio::spawn(async move {
        tokio::time::sleep(grace).await;
        token.cancel();
    });
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
