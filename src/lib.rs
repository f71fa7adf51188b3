use std::sync::Arc;

use config::Config;
use sqlx::PgPool;

use cache::{RedisStore, SlidingWindowRateLimiter};
use services::ProductService;

pub mod cache;
pub mod config;
pub mod database;
pub mod error;
pub mod middleware;
pub mod router;
pub mod routes;
pub mod services;
pub mod utils;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub redis: RedisStore,
    pub products: ProductService,
    pub rate_limiter: SlidingWindowRateLimiter,
}
