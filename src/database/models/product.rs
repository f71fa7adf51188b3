// 产品实体
// 定义产品相关的数据库实体和校验规则

use std::borrow::Cow;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::FieldError;

/// 允许的产品颜色（已规范化）
pub const VALID_COLOURS: &[&str] = &[
    "Red", "Blue", "Green", "Yellow", "Black", "White", "Orange", "Purple", "Pink", "Brown",
    "Grey", "Silver", "Gold",
];

/// 产品实体，对应数据库中的 products 表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, Validate)]
pub struct Product {
    pub id: i32,
    #[validate(
        custom(function = "validate_name"),
        length(min = 3, message = "Product name must be at least 3 characters long.")
    )]
    pub name: String,
    pub description: Option<String>,
    #[validate(custom(function = "validate_colour"))]
    pub colour: String,
    #[validate(custom(function = "validate_price"))]
    pub price: Decimal,
}

/// 创建产品请求，缺失字段按空值处理，交给校验规则报告
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateProductDto {
    pub name: String,
    pub description: Option<String>,
    pub colour: String,
    pub price: Decimal,
}

impl From<CreateProductDto> for Product {
    fn from(dto: CreateProductDto) -> Self {
        Self {
            id: 0,
            name: dto.name,
            description: dto.description,
            colour: dto.colour,
            price: dto.price,
        }
    }
}

fn error_with(code: &'static str, message: String) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Owned(message))
}

fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(error_with("required", "Product name is required.".into()));
    }
    Ok(())
}

fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    if *price <= Decimal::ZERO {
        return Err(error_with("range", "Price must be greater than 0.".into()));
    }
    Ok(())
}

/// 颜色必须非空且在允许列表中，调用前应先规范化
pub fn validate_colour(colour: &str) -> Result<(), ValidationError> {
    if colour.is_empty() {
        return Err(error_with("required", "Product colour is required.".into()));
    }
    if !VALID_COLOURS.contains(&colour) {
        return Err(error_with(
            "colour",
            format!("'{}' is not a valid colour.", colour),
        ));
    }
    Ok(())
}

/// 把 validator 的错误展开成按字段排序的列表
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut fields: Vec<FieldError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| FieldError {
                property: field.to_string(),
                error: e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string()),
            })
        })
        .collect();
    fields.sort_by(|a, b| a.property.cmp(&b.property));
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(name: &str, colour: &str, price: Decimal) -> Product {
        Product {
            id: 0,
            name: name.into(),
            description: None,
            colour: colour.into(),
            price,
        }
    }

    fn errors_of(p: &Product) -> Vec<FieldError> {
        p.validate().map(|_| Vec::new()).unwrap_or_else(|e| field_errors(&e))
    }

    #[test]
    fn valid_product_passes() {
        assert!(errors_of(&product("Valid Product", "Red", Decimal::new(1099, 2))).is_empty());
    }

    #[test]
    fn empty_name_reports_required_and_length() {
        let errors = errors_of(&product("", "Red", Decimal::new(1099, 2)));
        let mut messages: Vec<_> = errors
            .iter()
            .filter(|e| e.property == "name")
            .map(|e| e.error.as_str())
            .collect();
        messages.sort();
        assert_eq!(errors.len(), 2);
        assert_eq!(
            messages,
            vec![
                "Product name is required.",
                "Product name must be at least 3 characters long."
            ]
        );
    }

    #[test]
    fn missing_fields_deserialize_as_empty() {
        let dto: CreateProductDto =
            serde_json::from_str(r#"{"name":"Test Product","price":"5"}"#).unwrap();
        let errors = errors_of(&Product::from(dto));
        assert_eq!(
            errors,
            vec![FieldError {
                property: "colour".into(),
                error: "Product colour is required.".into(),
            }]
        );
    }

    #[test]
    fn short_name_is_rejected() {
        let errors = errors_of(&product("AB", "Red", Decimal::new(1099, 2)));
        assert_eq!(errors[0].error, "Product name must be at least 3 characters long.");
    }

    #[test]
    fn non_positive_price_is_rejected() {
        for price in [Decimal::ZERO, Decimal::new(-1, 0)] {
            let errors = errors_of(&product("Valid Product", "Red", price));
            assert_eq!(errors[0].property, "price");
            assert_eq!(errors[0].error, "Price must be greater than 0.");
        }
    }

    #[test]
    fn unknown_colour_is_rejected() {
        let errors = errors_of(&product("Valid Product", "InvalidColour", Decimal::ONE));
        assert_eq!(errors[0].property, "colour");
        assert_eq!(errors[0].error, "'InvalidColour' is not a valid colour.");
    }

    #[test]
    fn all_failures_are_reported_in_field_order() {
        let errors = errors_of(&product("", "", Decimal::ZERO));
        let properties: Vec<_> = errors.iter().map(|e| e.property.as_str()).collect();
        assert_eq!(properties, vec!["colour", "name", "name", "price"]);
    }
}
