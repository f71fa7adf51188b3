use axum::{
    Router,
    http::StatusCode,
    routing::{get, post},
};
use tower_http::timeout::TimeoutLayer;

use crate::{
    AppState,
    middleware::{auth_middleware, log_requests, rate_limit},
    routes,
};

// 公开路由：登录
fn public_routes() -> Router<AppState> {
    Router::new().route("/auth/login", post(routes::auth::login))
}

// 产品路由：先认证，再按身份限流
fn product_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/products",
            get(routes::product::get_all_products).post(routes::product::create_product),
        )
        .route("/products/{colour}", get(routes::product::get_products_by_colour))
        .layer(axum::middleware::from_fn_with_state(state.clone(), rate_limit))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
}

// 创建主路由
pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .merge(public_routes())
        .merge(product_routes(&state));

    Router::new()
        .nest(&state.config.api_base_uri, api)
        .route("/health", get(routes::health::health))
        .layer(axum::middleware::from_fn(log_requests))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            state.config.request_timeout(),
        ))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{Body, to_bytes},
        http::{Request, header},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::cache::MemoryStore;
    use crate::config::Config;
    use crate::test_support::state_with;
    use crate::utils::generate_token;

    fn build_app(config: Config) -> (Router, MemoryStore, String) {
        let (token, _) = generate_token(&config.auth_username, &config).unwrap();
        let store = MemoryStore::default();
        (create_router(state_with(config, store.clone())), store, token)
    }

    fn authed_get(uri: &str, token: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap()
    }

    fn post_json(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn login_issues_token_for_configured_user() {
        let (app, _, _) = build_app(Config::for_tests());
        let response = app
            .clone()
            .oneshot(post_json(
                "/api/auth/login",
                None,
                json!({"username": "admin", "password": "password"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert!(body["resp_data"]["token"].as_str().is_some());

        let response = app
            .oneshot(post_json(
                "/api/auth/login",
                None,
                json!({"username": "admin", "password": "wrong"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn products_require_a_valid_token() {
        let (app, _, _) = build_app(Config::for_tests());
        let response = app
            .clone()
            .oneshot(Request::builder().uri("/api/products").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app
            .oneshot(authed_get("/api/products", "not-a-token"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn lists_products_with_rate_limit_headers() {
        let (app, _, token) = build_app(Config::for_tests());
        let response = app.oneshot(authed_get("/api/products", &token)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-ratelimit-limit"], "100");
        assert_eq!(response.headers()["x-ratelimit-remaining"], "99");

        let body = body_json(response).await;
        assert_eq!(body["code"], 0);
        assert_eq!(body["resp_data"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn filters_by_colour_and_rejects_unknown_colours() {
        let (app, _, token) = build_app(Config::for_tests());
        let response = app
            .clone()
            .oneshot(authed_get("/api/products/bLuE", &token))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["resp_data"][0]["colour"], "Blue");

        let response = app
            .oneshot(authed_get("/api/products/plaid", &token))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn creates_product_and_reports_validation_errors() {
        let (app, _, token) = build_app(Config::for_tests());
        let response = app
            .clone()
            .oneshot(post_json(
                "/api/products",
                Some(&token),
                json!({"name": "Test Product", "colour": "red", "price": "20.00"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["resp_data"]["id"], 3);
        assert_eq!(body["resp_data"]["colour"], "Red");

        let response = app
            .oneshot(post_json(
                "/api/products",
                Some(&token),
                json!({"name": "AB", "colour": "Red", "price": "5"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["resp_data"][0]["property"], "name");
        assert_eq!(
            body["resp_data"][0]["error"],
            "Product name must be at least 3 characters long."
        );
    }

    #[tokio::test]
    async fn malformed_bodies_get_the_error_envelope() {
        let (app, _, token) = build_app(Config::for_tests());
        let response = app
            .clone()
            .oneshot(post_json(
                "/api/products",
                Some(&token),
                json!({"name": "Test Product", "price": "5"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["code"], 1000);
        assert_eq!(body["resp_data"][0]["property"], "colour");
        assert_eq!(body["resp_data"][0]["error"], "Product colour is required.");

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/auth/login")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["code"], 1000);
        assert_eq!(body["resp_data"][0]["property"], "body");
    }

    #[tokio::test]
    async fn rejects_requests_over_the_limit() {
        let config = Config {
            rate_limit_requests: 2,
            ..Config::for_tests()
        };
        let (app, _, token) = build_app(config);
        for _ in 0..2 {
            let response = app
                .clone()
                .oneshot(authed_get("/api/products", &token))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = app.oneshot(authed_get("/api/products", &token)).await.unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "60");
    }

    #[tokio::test]
    async fn limiter_outage_follows_configured_policy() {
        let (app, store, token) = build_app(Config::for_tests());
        store.set_unavailable(true);
        let response = app.oneshot(authed_get("/api/products", &token)).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let config = Config {
            rate_limit_fail_open: true,
            ..Config::for_tests()
        };
        let (app, store, token) = build_app(config);
        store.set_unavailable(true);
        let response = app.oneshot(authed_get("/api/products", &token)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
