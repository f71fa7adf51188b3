use std::net::SocketAddr;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{HeaderName, HeaderValue, Request},
    middleware::Next,
    response::Response,
};

use crate::{AppState, error::AppError, utils::Claims};

static X_RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
static X_RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");

/// 客户端地址：优先 x-real-ip，其次 x-forwarded-for 的第一个地址，最后是连接地址
pub fn client_ip<B>(req: &Request<B>) -> String {
    let remote_ip = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0.ip().to_string());

    req.headers()
        .get("x-real-ip")
        .and_then(|h| h.to_str().ok())
        .filter(|ip| !ip.trim().is_empty())
        .or_else(|| {
            req.headers()
                .get("x-forwarded-for")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.split(',').find(|ip| !ip.trim().is_empty()))
        })
        .or(remote_ip.as_deref())
        .unwrap_or("unknown")
        .trim()
        .to_string()
}

/// 限流身份：已认证用户用用户名，匿名请求按客户端地址分桶
fn identity<B>(req: &Request<B>) -> String {
    match req.extensions().get::<Claims>() {
        Some(claims) if !claims.sub.trim().is_empty() => claims.sub.clone(),
        _ => format!("ip:{}", client_ip(req)),
    }
}

pub async fn rate_limit(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let identity = identity(&req);

    let decision = match state.rate_limiter.check(&identity).await {
        Ok(decision) => decision,
        Err(e) if state.config.rate_limit_fail_open => {
            tracing::warn!("Rate limiter unavailable, letting request through: {}", e);
            return Ok(next.run(req).await);
        }
        Err(e) => {
            tracing::error!("Rate limiter unavailable: {}", e);
            return Err(e.into());
        }
    };

    if decision.limited {
        tracing::info!("Rate limited: {}", identity);
        return Err(AppError::RateLimited {
            retry_after: state.rate_limiter.window().as_secs(),
        });
    }

    let mut response = next.run(req).await;
    let headers = response.headers_mut();
    headers.insert(X_RATELIMIT_LIMIT.clone(), HeaderValue::from(decision.limit));
    headers.insert(
        X_RATELIMIT_REMAINING.clone(),
        HeaderValue::from(decision.remaining),
    );
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_real_ip_header() {
        let req = Request::builder()
            .header("x-real-ip", "10.0.0.1")
            .header("x-forwarded-for", "10.0.0.2, 10.0.0.3")
            .body(())
            .unwrap();
        assert_eq!(client_ip(&req), "10.0.0.1");
    }

    #[test]
    fn falls_back_to_first_forwarded_address() {
        let req = Request::builder()
            .header("x-forwarded-for", " 10.0.0.2 , 10.0.0.3")
            .body(())
            .unwrap();
        assert_eq!(client_ip(&req), "10.0.0.2");
    }

    #[test]
    fn falls_back_to_connection_address() {
        let mut req = Request::builder().body(()).unwrap();
        req.extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([192, 168, 1, 7], 4000))));
        assert_eq!(client_ip(&req), "192.168.1.7");
    }

    #[test]
    fn anonymous_callers_are_keyed_by_address() {
        let mut req = Request::builder()
            .header("x-real-ip", "10.0.0.9")
            .body(())
            .unwrap();
        assert_eq!(identity(&req), "ip:10.0.0.9");

        req.extensions_mut().insert(Claims {
            sub: "  ".into(),
            iss: String::new(),
            aud: String::new(),
            exp: 0,
            iat: 0,
        });
        assert_eq!(identity(&req), "ip:10.0.0.9");

        req.extensions_mut().insert(Claims {
            sub: "admin".into(),
            iss: String::new(),
            aud: String::new(),
            exp: 0,
            iat: 0,
        });
        assert_eq!(identity(&req), "admin");
    }
}
