use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use streamflix::{
    config::{Config, StoreBackend},
    db::{self, Cache, CacheWriterHandle, DataStore, MemoryStore, PostgresStore},
    routes::create_router,
    services::{
        auth::SupabaseAuth,
        catalog::{expand_catalog, Catalog},
        feedback::HostedAuthViews,
        images::{DemoImageSource, ImageSource, UnsplashImageSource},
    },
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("streamflix=debug,tower_http=debug,info")
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let store: Arc<dyn DataStore> = match config.store_backend {
        StoreBackend::Postgres => {
            let pool = db::create_pool(&config.database_url).await?;
            db::run_migrations(&pool).await?;
            Arc::new(PostgresStore::new(pool))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory store; data is lost on restart");
            Arc::new(MemoryStore::new())
        }
    };
    tracing::info!(store = store.name(), "Data store ready");

    let (images, cache_writer) = image_source(&config)?;

    let auth = Arc::new(SupabaseAuth::new(
        config.supabase_url.clone(),
        config.supabase_anon_key.clone(),
    ));
    let views = Arc::new(HostedAuthViews::new(
        config.login_path.clone(),
        config.registration_path.clone(),
        config.profile_path.clone(),
    ));

    let state = AppState::new(auth, store, Catalog::demo(), views)
        .with_session_idle_ttl(Duration::from_secs(config.session_idle_ttl_secs));
    expand_catalog(&state.catalog, images.as_ref()).await;

    let app = create_router(state);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    tracing::info!(address = %address, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(writer) = cache_writer {
        writer.shutdown().await;
    }

    Ok(())
}

/// Unsplash behind the Redis cache when a key is configured, demo posters otherwise
fn image_source(
    config: &Config,
) -> anyhow::Result<(Arc<dyn ImageSource>, Option<CacheWriterHandle>)> {
    let Some(access_key) = config.unsplash_access_key.clone() else {
        tracing::info!("No Unsplash key configured; using demo posters");
        return Ok((Arc::new(DemoImageSource), None));
    };

    let redis_client = db::create_redis_client(&config.redis_url)?;
    let (cache, writer) = Cache::new(redis_client);
    let source = UnsplashImageSource::new(cache, access_key, config.unsplash_api_url.clone());

    Ok((Arc::new(source), Some(writer)))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => tracing::error!(error = %e, "Failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
