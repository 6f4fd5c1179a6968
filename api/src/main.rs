use actix_web::{web, HttpServer};
use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;

use vt_api::{create_app, telemetry::init_tracing, AppState};
use vt_core::{
    ExpirySweepConfig, ExpirySweeper, InMemoryVerificationStore, TokenCodec, VerificationEngine,
    VerificationNotifier, VerificationServiceConfig, VerificationStore,
};
use vt_infra::{create_notifier, DatabasePool, MySqlVerificationStore, RedisClient, RedisIssueRateLimiter};
use vt_shared::{AppConfig, StoreBackend};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env();
    init_tracing(&config.logging)?;
    config.validate().context("invalid configuration")?;

    tracing::info!(
        environment = %config.environment,
        backend = ?config.database.backend,
        bind = %config.server.bind_address(),
        "Starting verification token service"
    );

    let notifier = create_notifier(&config.notifier).context("failed to configure notifiers")?;

    match config.database.backend {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store, verification requests are lost on restart");
            run_server(Arc::new(InMemoryVerificationStore::new()), notifier, config).await
        }
        StoreBackend::Mysql => {
            let pool = DatabasePool::new(config.database.clone())
                .await
                .context("failed to connect to MySQL")?;
            let store = MySqlVerificationStore::from_pool(&pool, config.database.slow_query_threshold);
            if config.database.ensure_schema {
                store.ensure_schema().await.context("failed to create verification table")?;
            }
            let result = run_server(Arc::new(store), notifier, config).await;
            pool.close().await;
            result
        }
    }
}

/// Wire the engine around a store, start the sweeper and serve until shutdown
async fn run_server<S: VerificationStore + 'static>(
    store: Arc<S>,
    notifier: Arc<dyn VerificationNotifier>,
    config: AppConfig,
) -> anyhow::Result<()> {
    let codec = TokenCodec::from_config(&config.signing).context("invalid signing configuration")?;
    let mut engine = VerificationEngine::new(
        Arc::clone(&store),
        codec,
        VerificationServiceConfig::from(&config.verification),
    );

    if config.cache.enabled {
        let redis = RedisClient::new(config.cache.clone())
            .await
            .context("failed to connect to Redis")?;
        let window = chrono::Duration::seconds(
            i64::try_from(config.verification.issue_window_seconds).context("issue window out of range")?,
        );
        engine = engine.with_rate_limiter(Arc::new(RedisIssueRateLimiter::new(
            redis,
            config.verification.issue_limit,
            window,
        )));
        tracing::info!("Issuance rate limits shared through Redis");
    }

    let sweeper = Arc::new(ExpirySweeper::new(Arc::clone(&store), ExpirySweepConfig::from(&config.sweep)));
    let sweep_handle = sweeper.start_background_task();

    let app_state = web::Data::new(AppState::new(Arc::new(engine), notifier));
    let environment = config.environment;
    let server_config = config.server.clone();

    let mut server = HttpServer::new(move || create_app(app_state.clone(), environment, &server_config))
        .keep_alive(Duration::from_secs(config.server.keep_alive));
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    tracing::info!(bind = %config.server.bind_address(), "HTTP server listening");
    server
        .bind(config.server.bind_address())
        .with_context(|| format!("failed to bind {}", config.server.bind_address()))?
        .run()
        .await?;

    if let Some(handle) = sweep_handle {
        handle.abort();
    }
    tracing::info!("Verification token service stopped");
    Ok(())
}
