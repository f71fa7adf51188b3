use std::sync::Arc;

use validator::Validate;

use crate::cache::keys::{all_products_key, normalize_colour, products_by_colour_key};
use crate::cache::{CacheAside, Fetched};
use crate::config::CacheWritePolicy;
use crate::database::models::product::{field_errors, validate_colour};
use crate::database::{CreateProductDto, Product, ProductRepository};
use crate::error::{AppError, AppResult, FieldError};

/// 产品服务：读走旁路缓存，写直达数据库
#[derive(Clone)]
pub struct ProductService {
    repository: Arc<dyn ProductRepository>,
    cache: CacheAside,
    write_policy: CacheWritePolicy,
}

impl ProductService {
    pub fn new(
        repository: Arc<dyn ProductRepository>,
        cache: CacheAside,
        write_policy: CacheWritePolicy,
    ) -> Self {
        Self {
            repository,
            cache,
            write_policy,
        }
    }

    pub async fn get_all_products(&self) -> AppResult<Fetched<Vec<Product>>> {
        let repository = &self.repository;
        let fetched = self
            .cache
            .get_or_load(&all_products_key(), move || repository.get_all_products())
            .await?;
        Ok(fetched)
    }

    pub async fn get_products_by_colour(&self, colour: &str) -> AppResult<Fetched<Vec<Product>>> {
        let colour = normalize_colour(colour);

        if let Err(e) = validate_colour(&colour) {
            return Err(AppError::Validation(vec![FieldError {
                property: "colour".into(),
                error: e
                    .message
                    .map(|m| m.into_owned())
                    .unwrap_or_else(|| e.code.into_owned()),
            }]));
        }

        let repository = &self.repository;
        let key = products_by_colour_key(&colour);
        let colour = colour.as_str();
        let fetched = self
            .cache
            .get_or_load(&key, move || repository.get_products_by_colour(colour))
            .await?;
        Ok(fetched)
    }

    pub async fn add_product(&self, dto: CreateProductDto) -> AppResult<Product> {
        let mut product = Product::from(dto);
        product.colour = normalize_colour(&product.colour);

        if let Err(errors) = product.validate() {
            return Err(AppError::Validation(field_errors(&errors)));
        }

        product.id = self.repository.add_product(&product).await?;

        match self.write_policy {
            CacheWritePolicy::Invalidate => {
                self.cache
                    .invalidate(&[all_products_key(), products_by_colour_key(&product.colour)])
                    .await;
            }
            CacheWritePolicy::Retain => {}
        }

        Ok(product)
    }
}
