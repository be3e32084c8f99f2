use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::Method,
    Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::auth::token::{verify_token, TokenError, TokenPurpose};
use crate::error::AppError;

pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService { service }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
}

/// Routes that do not require a bearer token: liveness, registration, the
/// login/forgot/reset flow, and the admin lock endpoints (those are gated by
/// the privileged key header inside their handlers instead).
fn is_public(path: &str, method: &Method) -> bool {
    path == "/health"
        || (path == "/users" && *method == Method::POST)
        || path.starts_with("/users/auth/")
        || (*method == Method::PUT && is_lock_endpoint(path))
}

/// Matches exactly `/users/{id}/lock` and `/users/{id}/unlock`, nothing else.
fn is_lock_endpoint(path: &str) -> bool {
    let mut segments = path.trim_start_matches('/').split('/');
    matches!(
        (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ),
        (Some("users"), Some(id), Some("lock") | Some("unlock"), None)
            if id.parse::<i32>().is_ok()
    )
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if is_public(req.path(), req.method()) {
            let fut = self.service.call(req);
            return Box::pin(fut);
        }

        let header = req
            .headers()
            .get("Authorization")
            .map(|value| value.to_str().ok().map(str::to_owned));

        // Missing header, malformed header, expired token, and invalid token
        // each produce their own 401 message.
        let token = match header {
            None => {
                let err = AppError::Unauthorized("Missing authorization header".into());
                return Box::pin(async move { Err(err.into()) });
            }
            Some(value) => match value.as_deref().and_then(|v| v.strip_prefix("Bearer ")) {
                Some(token) => token.to_owned(),
                None => {
                    let err = AppError::Unauthorized("Malformed authorization header".into());
                    return Box::pin(async move { Err(err.into()) });
                }
            },
        };

        match verify_token(&token, TokenPurpose::Session) {
            Ok(claims) => {
                req.extensions_mut().insert(claims);
                let fut = self.service.call(req);
                Box::pin(fut)
            }
            Err(TokenError::Expired) => {
                let err = AppError::Unauthorized("Token expired".into());
                Box::pin(async move { Err(err.into()) })
            }
            Err(TokenError::Invalid) => {
                let err = AppError::Unauthorized("Invalid token".into());
                Box::pin(async move { Err(err.into()) })
            }
            Err(TokenError::Internal(msg)) => {
                let err = AppError::Internal(msg);
                Box::pin(async move { Err(err.into()) })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_paths() {
        assert!(is_public("/health", &Method::GET));
        assert!(is_public("/users", &Method::POST));
        assert!(!is_public("/users", &Method::GET));
        assert!(is_public("/users/auth/login", &Method::POST));
        assert!(is_public("/users/auth/forgot-password", &Method::POST));
        assert!(is_public("/users/auth/reset-password/some-token", &Method::POST));
        assert!(is_public("/users/42/lock", &Method::PUT));
        assert!(is_public("/users/42/unlock", &Method::PUT));

        assert!(!is_public("/users/me", &Method::GET));
        assert!(!is_public("/tasks", &Method::GET));
    }

    #[test]
    fn test_lock_exemption_shape_is_exact() {
        // Only the admin lock endpoints bypass the bearer check, not arbitrary
        // paths sharing the trailing segment.
        assert!(!is_public("/tasks/lock", &Method::PUT));
        assert!(!is_public("/users/lock", &Method::PUT));
        assert!(!is_public("/users/not-a-number/lock", &Method::PUT));
        assert!(!is_public("/users/42/lock/extra", &Method::PUT));
        assert!(!is_public("/users/42/lock", &Method::GET));
    }
}
