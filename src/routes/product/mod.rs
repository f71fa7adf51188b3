mod handler;

pub use handler::{create_product, get_all_products, get_products_by_colour};
