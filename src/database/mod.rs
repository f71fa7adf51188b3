// 数据库模块
// 包含产品实体定义、SQL 语句、重试策略和存储库

pub mod models; // 数据库实体定义
pub mod queries; // SQL 语句
pub mod repositories; // 存储库实现
pub mod retry; // 瞬时错误重试

// 重新导出常用类型，方便其他模块使用
pub use models::product::{CreateProductDto, Product};
pub use repositories::product::{PgProductRepository, ProductRepository};
pub use retry::RetryPolicy;

use sqlx::PgPool;

/// 执行内嵌迁移
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
