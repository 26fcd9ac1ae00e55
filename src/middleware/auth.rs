use axum::Json;
use axum::extract::FromRequestParts;
use axum::http::{StatusCode, request::Parts};
use axum::response::{IntoResponse, Response};
use axum_extra::TypedHeader;
use headers::{Authorization, authorization::Basic};
use serde_json::json;
use subtle::ConstantTimeEq;

use crate::router::BrokerState;

/// Credentials the platform must present with every broker request.
#[derive(Debug, Clone)]
pub struct BrokerCredentials {
    pub username: String,
    pub password: String,
}

impl BrokerCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Compares both fields in constant time.
    pub fn matches(&self, username: &str, password: &str) -> bool {
        let user_ok = username.as_bytes().ct_eq(self.username.as_bytes());
        let pass_ok = password.as_bytes().ct_eq(self.password.as_bytes());
        bool::from(user_ok & pass_ok)
    }
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [("www-authenticate", "Basic realm=\"mongo-broker\"")],
        Json(json!({"error": "Unauthorized", "description": "invalid or missing broker credentials"})),
    )
        .into_response()
}

/// Extractor guarding broker routes with HTTP basic auth.
#[derive(Debug, Clone, Copy)]
pub struct RequireBrokerAuth;

impl FromRequestParts<BrokerState> for RequireBrokerAuth {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &BrokerState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(basic)) =
            TypedHeader::<Authorization<Basic>>::from_request_parts(parts, state)
                .await
                .map_err(|_| unauthorized())?;

        if state.credentials.matches(basic.username(), basic.password()) {
            Ok(Self)
        } else {
            Err(unauthorized())
        }
    }
}
