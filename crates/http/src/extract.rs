//! Request extractors.
//!
//! The service sits behind an authenticating gateway that forwards the
//! caller's identity in a trusted header; [`Principal`] is that identity.
//! Handlers taking a `Principal` reject unauthenticated requests with 401.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;

/// Header consulted when no [`PrincipalHeader`] extension is configured.
pub const DEFAULT_PRINCIPAL_HEADER: &str = "x-principal-id";

/// Router extension naming the header the gateway writes the principal to.
#[derive(Debug, Clone)]
pub struct PrincipalHeader(pub Arc<str>);

/// The authenticated caller.
#[derive(Debug, Clone)]
pub struct Principal {
    pub id: String,
}

impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header_name = parts
            .extensions
            .get::<PrincipalHeader>()
            .map(|h| h.0.as_ref().to_string())
            .unwrap_or_else(|| DEFAULT_PRINCIPAL_HEADER.to_string());

        let id = parts
            .headers
            .get(header_name.as_str())
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty());

        match id {
            Some(id) => Ok(Principal { id: id.to_string() }),
            None => Err(AppError::unauthorized("authentication required")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(request: Request<()>) -> Result<Principal, AppError> {
        let (mut parts, _) = request.into_parts();
        Principal::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn reads_default_header() {
        let request = Request::builder()
            .header(DEFAULT_PRINCIPAL_HEADER, "user-1")
            .body(())
            .unwrap();

        let principal = extract(request).await.unwrap();
        assert_eq!(principal.id, "user-1");
    }

    #[tokio::test]
    async fn missing_header_is_unauthorized() {
        let request = Request::builder().body(()).unwrap();

        let err = extract(request).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn blank_header_is_unauthorized() {
        let request = Request::builder()
            .header(DEFAULT_PRINCIPAL_HEADER, "   ")
            .body(())
            .unwrap();

        let err = extract(request).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn configured_header_takes_precedence() {
        let mut request = Request::builder()
            .header("x-auth-user", "user-2")
            .body(())
            .unwrap();
        request
            .extensions_mut()
            .insert(PrincipalHeader(Arc::from("x-auth-user")));

        let principal = extract(request).await.unwrap();
        assert_eq!(principal.id, "user-2");
    }
}
