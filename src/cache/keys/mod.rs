/// 缓存键模块
/// 产品缓存和限流窗口使用互不相交的前缀

// 产品缓存键
pub mod product_keys;

// 限流键
pub mod rate_limit_keys;

pub use product_keys::{all_products_key, normalize_colour, products_by_colour_key, CACHE_PREFIX};
pub use rate_limit_keys::rate_limit_key;
