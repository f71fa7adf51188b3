/// 产品缓存实例前缀
pub const CACHE_PREFIX: &str = "Products_";

/// 全部产品查询的固定键
const ALL_PRODUCTS: &str = "all_products";

/// 按颜色查询的键前缀
const PRODUCTS_BY_COLOUR: &str = "products_by_colour_";

/// 颜色规范化：首字母大写，其余小写
pub fn normalize_colour(colour: &str) -> String {
    let mut chars = colour.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// 生成全部产品缓存键
pub fn all_products_key() -> String {
    format!("{}{}", CACHE_PREFIX, ALL_PRODUCTS)
}

/// 生成按颜色查询的缓存键，颜色先规范化
pub fn products_by_colour_key(colour: &str) -> String {
    format!(
        "{}{}{}",
        CACHE_PREFIX,
        PRODUCTS_BY_COLOUR,
        normalize_colour(colour)
    )
}
