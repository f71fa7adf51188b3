// 产品实体
pub mod product;
