use std::marker::PhantomData;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;

use super::jwt::{Claims, JwtKeys};
use crate::response::ApiError;

/// Required-role set for a gated route; empty means any valid token passes.
pub trait RolePolicy: Send + Sync + 'static {
    const REQUIRED: &'static [&'static str];
}

#[derive(Debug)]
pub struct AdminOnly;

impl RolePolicy for AdminOnly {
    const REQUIRED: &'static [&'static str] = &["admin"];
}

/// Verifies the bearer credential before the handler runs and hands the
/// decoded claims through. Stateless; nothing is cached or revoked.
#[derive(Debug)]
pub struct Gate<P: RolePolicy> {
    pub claims: Claims,
    _policy: PhantomData<P>,
}

#[async_trait]
impl<S, P> FromRequestParts<S> for Gate<P>
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
    P: RolePolicy,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(ApiError::Unauthorized)?;

        // Clients may send the raw token or use the Bearer scheme
        let token = header
            .strip_prefix("Bearer ")
            .or_else(|| header.strip_prefix("bearer "))
            .unwrap_or(header);

        let claims = keys.verify(token).map_err(|e| {
            warn!(error = %e, "invalid or expired token");
            ApiError::Unauthorized
        })?;

        if !P::REQUIRED.is_empty() && !P::REQUIRED.contains(&claims.role.as_str()) {
            warn!(user_id = claims.sub, role = %claims.role, "role not permitted");
            return Err(ApiError::Forbidden);
        }

        Ok(Gate {
            claims,
            _policy: PhantomData,
        })
    }
}

#[cfg(test)]
mod tests {
    use axum::extract::FromRef;
    use axum::http::{header::AUTHORIZATION, Request};

    use super::*;
    use crate::state::AppState;

    struct Anyone;

    impl RolePolicy for Anyone {
        const REQUIRED: &'static [&'static str] = &[];
    }

    fn parts_with_auth(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/users");
        if let Some(v) = value {
            builder = builder.header(AUTHORIZATION, v);
        }
        let (parts, ()) = builder.body(()).expect("request").into_parts();
        parts
    }

    #[tokio::test]
    async fn missing_header_is_rejected() {
        let state = AppState::fake();
        let mut parts = parts_with_auth(None);
        let err = Gate::<AdminOnly>::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized));
    }

    #[tokio::test]
    async fn garbage_token_is_rejected() {
        let state = AppState::fake();
        let mut parts = parts_with_auth(Some("Bearer not-a-token"));
        let err = Gate::<AdminOnly>::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized));
    }

    #[tokio::test]
    async fn wrong_role_is_rejected() {
        let state = AppState::fake();
        let token = JwtKeys::from_ref(&state).sign(5, "user").expect("sign");
        let mut parts = parts_with_auth(Some(&format!("Bearer {token}")));
        let err = Gate::<AdminOnly>::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden));
    }

    #[tokio::test]
    async fn admin_token_passes_and_exposes_claims() {
        let state = AppState::fake();
        let token = JwtKeys::from_ref(&state).sign(5, "admin").expect("sign");
        let mut parts = parts_with_auth(Some(&format!("Bearer {token}")));
        let gate = Gate::<AdminOnly>::from_request_parts(&mut parts, &state)
            .await
            .expect("gate should pass");
        assert_eq!(gate.claims.sub, 5);
        assert_eq!(gate.claims.role, "admin");
    }

    #[tokio::test]
    async fn raw_token_without_bearer_prefix_is_accepted() {
        let state = AppState::fake();
        let token = JwtKeys::from_ref(&state).sign(9, "admin").expect("sign");
        let mut parts = parts_with_auth(Some(&token));
        assert!(Gate::<AdminOnly>::from_request_parts(&mut parts, &state)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn empty_role_set_admits_any_valid_token() {
        let state = AppState::fake();
        let token = JwtKeys::from_ref(&state).sign(3, "").expect("sign");
        let mut parts = parts_with_auth(Some(&format!("Bearer {token}")));
        assert!(Gate::<Anyone>::from_request_parts(&mut parts, &state)
            .await
            .is_ok());
    }
}
