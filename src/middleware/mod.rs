mod auth;
mod error_handler;
mod rate_limit;

pub use auth::auth_middleware;
pub use error_handler::log_requests;
pub use rate_limit::{client_ip, rate_limit};
