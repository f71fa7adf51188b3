pub const GET_ALL_PRODUCTS: &str =
    "SELECT id, name, description, colour, price FROM products ORDER BY id";

pub const GET_PRODUCTS_BY_COLOUR: &str =
    "SELECT id, name, description, colour, price FROM products WHERE colour = $1 ORDER BY id";

pub const INSERT_PRODUCT: &str = r#"
    INSERT INTO products (name, description, colour, price)
    VALUES ($1, $2, $3, $4)
    RETURNING id
"#;

pub const PING: &str = "SELECT 1";
