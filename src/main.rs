use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use products_api::{
    AppState,
    cache::{CacheAside, RedisStore, SlidingWindowRateLimiter},
    config::Config,
    database::{self, PgProductRepository, RetryPolicy},
    router::create_router,
    services::ProductService,
};
use sqlx::Executor;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 加载配置
    let config = Config::from_env().expect("Failed to load configuration");

    // 设置数据库连接池
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(config.request_timeout())
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                conn.execute("SET application_name = 'products_api';")
                    .await?;
                Ok(())
            })
        })
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to Postgres");

    database::migrate(&pool)
        .await
        .expect("Failed to run database migrations");

    // 设置 Redis 客户端，限流和缓存共用，键前缀互不相交
    let redis_client =
        redis::Client::open(config.redis_url.clone()).expect("Failed to create Redis client");
    let store = RedisStore::new(Arc::new(redis_client));

    let repository = PgProductRepository::new(
        pool.clone(),
        RetryPolicy::new(config.db_retry_attempts),
    );
    let products = ProductService::new(
        Arc::new(repository),
        CacheAside::new(Arc::new(store.clone()), config.cache_ttl()),
        config.cache_write_policy,
    );

    // 设置限流器
    let rate_limiter = SlidingWindowRateLimiter::new(
        Arc::new(store.clone()),
        config.rate_limit_requests as u64,
        config.rate_limit_window(),
    );
    tracing::info!(
        "Rate limit: {} requests per {}s, cache TTL {}s, write policy {:?}",
        config.rate_limit_requests,
        config.rate_limit_window_secs,
        config.cache_ttl_secs,
        config.cache_write_policy
    );

    let state = AppState {
        pool,
        config: Arc::new(config),
        redis: store,
        products,
        rate_limiter,
    };

    let router = create_router(state.clone());

    // 根据编译模式决定是否添加CORS
    #[cfg(debug_assertions)]
    let router = {
        tracing::debug!("Adding CORS layer for development mode");
        router.layer(tower_http::cors::CorsLayer::permissive())
    };

    // 启动服务器
    let addr = SocketAddr::new(
        state.config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        state.config.server_port,
    );
    tracing::info!("Server listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Failed to start server");
}
