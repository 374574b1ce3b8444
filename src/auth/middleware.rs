//! Authentication middleware
//!
//! `require_auth` validates the bearer token on every request except the
//! public surface (catalog reads, health, static files, the socket.io
//! handshake) and injects [`CurrentUser`] into request extensions.
//! `require_admin` is layered on top of admin-only routers.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::auth::{CurrentUser, JwtError, JwtService};
use crate::core::ServerState;
use crate::utils::AppError;

/// Routes reachable without credentials
fn is_public(method: &http::Method, path: &str) -> bool {
    if path == "/health" || path.starts_with("/files/") || path.starts_with("/socket.io") {
        return true;
    }
    method == http::Method::GET && (path == "/products" || path == "/categories")
}

pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    // CORS preflight never carries credentials
    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }
    if is_public(req.method(), req.uri().path()) {
        return Ok(next.run(req).await);
    }

    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) => JwtService::extract_from_header(header)
            .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?,
        None => {
            tracing::warn!(uri = %req.uri(), "Request without credentials");
            return Err(AppError::Unauthorized);
        }
    };

    match state.jwt_service().validate_token(token) {
        Ok(claims) => {
            req.extensions_mut().insert(CurrentUser::from(claims));
            Ok(next.run(req).await)
        }
        Err(e) => {
            tracing::warn!(uri = %req.uri(), error = %e, "Token validation failed");
            match e {
                JwtError::ExpiredToken => Err(AppError::TokenExpired),
                _ => Err(AppError::invalid_token("Invalid token")),
            }
        }
    }
}

/// Requires `CurrentUser.role == "admin"`; 403 otherwise
pub async fn require_admin(req: Request, next: Next) -> Result<Response, AppError> {
    let user = req
        .extensions()
        .get::<CurrentUser>()
        .ok_or(AppError::Unauthorized)?;
    if !user.is_admin() {
        tracing::warn!(
            user_id = %user.id,
            uri = %req.uri(),
            "Admin route denied"
        );
        return Err(AppError::forbidden("admin role required"));
    }

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_reads_are_public() {
        assert!(is_public(&http::Method::GET, "/products"));
        assert!(is_public(&http::Method::GET, "/categories"));
        assert!(!is_public(&http::Method::POST, "/products"));
        assert!(!is_public(&http::Method::POST, "/categories"));
    }

    #[test]
    fn test_health_files_and_socket_are_public() {
        assert!(is_public(&http::Method::GET, "/health"));
        assert!(is_public(&http::Method::GET, "/files/burger.jpg"));
        assert!(is_public(&http::Method::GET, "/socket.io/?EIO=4"));
    }

    #[test]
    fn test_orders_are_protected() {
        assert!(!is_public(&http::Method::GET, "/orders"));
        assert!(!is_public(&http::Method::POST, "/orders"));
    }
}
