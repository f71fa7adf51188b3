// 产品存储库
pub mod product;
