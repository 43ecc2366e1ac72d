use crate::error::AppError;
use axum::http::HeaderMap;
use uuid::Uuid;

/// Header carrying the authenticated principal. The platform gateway
/// verifies the session and forwards the caller's id here; this service
/// never authenticates, it only authorizes by room membership.
pub const PRINCIPAL_HEADER: &str = "x-user-id";

/// Extract the authenticated principal from the forwarded header.
pub fn principal_from_headers(headers: &HeaderMap) -> Result<Uuid, AppError> {
    let raw = headers
        .get(PRINCIPAL_HEADER)
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    Uuid::parse_str(raw.trim()).map_err(|_| AppError::Unauthorized)
}

/// Middleware adding the caller's user_id to request extensions
pub async fn auth_middleware(
    mut req: axum::extract::Request,
    next: axum::middleware::Next,
) -> Result<axum::response::Response, AppError> {
    let user_id = principal_from_headers(req.headers())?;
    req.extensions_mut().insert(user_id);

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn rejects_missing_header() {
        let headers = HeaderMap::new();
        assert!(matches!(
            principal_from_headers(&headers),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn rejects_malformed_principal() {
        let mut headers = HeaderMap::new();
        headers.insert(PRINCIPAL_HEADER, HeaderValue::from_static("not-a-uuid"));
        assert!(matches!(
            principal_from_headers(&headers),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn accepts_valid_principal() {
        let id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(
            PRINCIPAL_HEADER,
            HeaderValue::from_str(&id.to_string()).unwrap(),
        );
        assert_eq!(principal_from_headers(&headers).unwrap(), id);
    }
}
