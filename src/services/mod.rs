// 业务服务
pub mod product;

pub use product::ProductService;
