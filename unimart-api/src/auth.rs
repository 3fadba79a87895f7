use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use unimart_shared::{Masked, Principal};

use crate::error::AppError;

/// Identity headers set by the trusted gateway in front of this service.
/// The engine never sees credentials, only the resolved principal.
pub const USER_ID_HEADER: &str = "x-user-id";
pub const USERNAME_HEADER: &str = "x-username";
pub const USER_PHONE_HEADER: &str = "x-user-phone";
pub const USER_STAFF_HEADER: &str = "x-user-staff";

/// Required authentication: rejects with 401 when the gateway headers are
/// absent or malformed.
pub struct Auth(pub Principal);

impl<S: Send + Sync> FromRequestParts<S> for Auth {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned)
        };

        let id = header(USER_ID_HEADER)
            .ok_or_else(|| AppError::AuthenticationError("missing identity headers".into()))?;
        let id = Uuid::parse_str(&id)
            .map_err(|_| AppError::AuthenticationError("malformed user id header".into()))?;
        let username = header(USERNAME_HEADER)
            .ok_or_else(|| AppError::AuthenticationError("missing identity headers".into()))?;

        let is_staff = header(USER_STAFF_HEADER)
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        Ok(Auth(Principal {
            id,
            username,
            phone_number: header(USER_PHONE_HEADER).map(Masked::from),
            is_staff,
            is_authenticated: true,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(req: Request<()>) -> Result<Auth, AppError> {
        let (mut parts, _) = req.into_parts();
        Auth::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn headers_resolve_to_a_principal() {
        let id = Uuid::new_v4();
        let req = Request::builder()
            .header(USER_ID_HEADER, id.to_string())
            .header(USERNAME_HEADER, "chidi")
            .header(USER_STAFF_HEADER, "true")
            .body(())
            .unwrap();

        let Auth(principal) = extract(req).await.unwrap();
        assert_eq!(principal.id, id);
        assert!(principal.is_staff);
        assert!(principal.is_authenticated);
    }

    #[tokio::test]
    async fn missing_headers_are_rejected() {
        let req = Request::builder().body(()).unwrap();
        assert!(matches!(
            extract(req).await,
            Err(AppError::AuthenticationError(_))
        ));
    }
}
