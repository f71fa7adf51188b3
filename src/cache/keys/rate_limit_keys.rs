/// 限流窗口键前缀
const RATE_LIMIT_PREFIX: &str = "rate_limit_";

/// 生成限流窗口键，身份标识原样拼接
pub fn rate_limit_key(identity: &str) -> String {
    format!("{}{}", RATE_LIMIT_PREFIX, identity)
}
