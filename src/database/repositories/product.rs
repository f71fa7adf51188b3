// 产品存储库
// 包含产品相关的数据库操作

use async_trait::async_trait;
use sqlx::{Error as SqlxError, PgPool};

use crate::database::models::product::Product;
use crate::database::queries;
use crate::database::retry::RetryPolicy;

/// 产品数据源
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn get_all_products(&self) -> Result<Vec<Product>, SqlxError>;

    async fn get_products_by_colour(&self, colour: &str) -> Result<Vec<Product>, SqlxError>;

    /// 插入产品，返回新生成的ID
    async fn add_product(&self, product: &Product) -> Result<i32, SqlxError>;
}

/// 基于 Postgres 的产品存储库，所有语句都带瞬时错误重试
pub struct PgProductRepository {
    pool: PgPool,
    retry: RetryPolicy,
}

impl PgProductRepository {
    /// 创建新的产品存储库实例
    pub fn new(pool: PgPool, retry: RetryPolicy) -> Self {
        Self { pool, retry }
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn get_all_products(&self) -> Result<Vec<Product>, SqlxError> {
        self.retry
            .run(|| {
                sqlx::query_as::<_, Product>(queries::GET_ALL_PRODUCTS).fetch_all(&self.pool)
            })
            .await
    }

    async fn get_products_by_colour(&self, colour: &str) -> Result<Vec<Product>, SqlxError> {
        self.retry
            .run(|| {
                sqlx::query_as::<_, Product>(queries::GET_PRODUCTS_BY_COLOUR)
                    .bind(colour)
                    .fetch_all(&self.pool)
            })
            .await
    }

    async fn add_product(&self, product: &Product) -> Result<i32, SqlxError> {
        let id = self
            .retry
            .run(|| {
                sqlx::query_scalar::<_, i32>(queries::INSERT_PRODUCT)
                    .bind(&product.name)
                    .bind(&product.description)
                    .bind(&product.colour)
                    .bind(product.price)
                    .fetch_one(&self.pool)
            })
            .await?;

        tracing::info!("Inserted product {} ({})", id, product.name);
        Ok(id)
    }
}
