use std::env;
use std::str::FromStr;
use std::time::Duration;

/// 写操作之后如何处理产品列表缓存
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheWritePolicy {
    /// 新增产品后删除受影响的列表缓存
    Invalidate,
    /// 保留旧缓存，读者最多看到 TTL 时长的旧数据
    Retain,
}

impl FromStr for CacheWritePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "invalidate" => Ok(Self::Invalidate),
            "retain" => Ok(Self::Retain),
            other => Err(format!("unknown cache write policy: {}", other)),
        }
    }
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub jwt_audience: String,
    pub jwt_expiration_secs: u64,
    pub auth_username: String,
    pub auth_password: String,
    pub rate_limit_window_secs: u64,
    pub rate_limit_requests: u32,
    pub rate_limit_fail_open: bool,
    pub cache_ttl_secs: u64,
    pub cache_write_policy: CacheWritePolicy,
    pub db_retry_attempts: u32,
    pub request_timeout_secs: u64,
    pub server_host: String,
    pub server_port: u16,
    pub api_base_uri: String,
}

/// 读取可选环境变量，缺失或格式错误时使用默认值
fn var_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        dotenv::dotenv().ok();

        let jwt_expiration = env::var("JWT_EXPIRATION")
            .ok()
            .and_then(|v| v.trim().trim_end_matches('m').parse::<u64>().ok())
            .unwrap_or(60);

        Ok(Config {
            database_url: env::var("DATABASE_URL")?,
            redis_url: env::var("REDIS_URL")?,
            jwt_secret: env::var("JWT_SECRET")?,
            jwt_issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "products-api".into()),
            jwt_audience: env::var("JWT_AUDIENCE").unwrap_or_else(|_| "products-api".into()),
            jwt_expiration_secs: jwt_expiration * 60,
            auth_username: env::var("AUTH_USERNAME")?,
            auth_password: env::var("AUTH_PASSWORD")?,
            rate_limit_window_secs: var_or("RATE_LIMIT_WINDOW", 60),
            rate_limit_requests: var_or("RATE_LIMIT_REQUESTS", 100),
            rate_limit_fail_open: var_or("RATE_LIMIT_FAIL_OPEN", false),
            cache_ttl_secs: var_or("CACHE_TTL", 300),
            cache_write_policy: var_or("CACHE_WRITE_POLICY", CacheWritePolicy::Invalidate),
            db_retry_attempts: var_or("DB_RETRY_ATTEMPTS", 3),
            request_timeout_secs: var_or("REQUEST_TIMEOUT", 30),
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            server_port: var_or("SERVER_PORT", 3000),
            api_base_uri: env::var("API_BASE_URI").unwrap_or_else(|_| "/api".into()),
        })
    }

    pub fn jwt_expiration(&self) -> Duration {
        Duration::from_secs(self.jwt_expiration_secs)
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
impl Config {
    /// 测试用配置，不会连接任何外部服务
    pub(crate) fn for_tests() -> Self {
        Config {
            database_url: "postgres://localhost/products_test".into(),
            redis_url: "redis://127.0.0.1/".into(),
            jwt_secret: "test-secret".into(),
            jwt_issuer: "products-api".into(),
            jwt_audience: "products-api".into(),
            jwt_expiration_secs: 3600,
            auth_username: "admin".into(),
            auth_password: "password".into(),
            rate_limit_window_secs: 60,
            rate_limit_requests: 100,
            rate_limit_fail_open: false,
            cache_ttl_secs: 300,
            cache_write_policy: CacheWritePolicy::Invalidate,
            db_retry_attempts: 0,
            request_timeout_secs: 30,
            server_host: "127.0.0.1".into(),
            server_port: 0,
            api_base_uri: "/api".into(),
        }
    }
}
