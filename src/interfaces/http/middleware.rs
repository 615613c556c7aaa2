//! Bearer-token authentication for Axum

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::domain::{AccountRole, Actor};
use crate::infrastructure::crypto::jwt::{verify_token, JwtConfig, TokenClaims, TokenKind};
use crate::interfaces::http::common::ApiResponse;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    MissingToken,
    MalformedHeader,
    InvalidToken,
    ExpiredToken,
}

impl AuthError {
    fn message(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "Missing authentication token",
            AuthError::MalformedHeader => "Authorization header must use the Bearer scheme",
            AuthError::InvalidToken => "Invalid authentication token",
            AuthError::ExpiredToken => "Token has expired",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(ApiResponse::<()>::error(self.message())),
        )
            .into_response()
    }
}

#[derive(Clone)]
pub struct AuthState {
    pub jwt_config: JwtConfig,
}

/// Caller identity taken from a verified access token
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub account_id: String,
    pub username: String,
    pub role: AccountRole,
}

impl AuthenticatedUser {
    pub fn from_claims(claims: TokenClaims) -> Self {
        Self {
            account_id: claims.sub,
            username: claims.username,
            role: AccountRole::from_str(&claims.role),
        }
    }

    pub fn actor(&self) -> Actor {
        Actor {
            account_id: self.account_id.clone(),
            username: self.username.clone(),
            role: self.role,
        }
    }
}

fn extract_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Rejects the request unless it carries a valid access token.
pub async fn auth_middleware(
    State(auth_state): State<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let Some(auth_header) = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
    else {
        return AuthError::MissingToken.into_response();
    };

    let Some(token) = extract_token(auth_header) else {
        return AuthError::MalformedHeader.into_response();
    };

    match verify_token(token, TokenKind::Access, &auth_state.jwt_config) {
        Ok(claims) => {
            let user = AuthenticatedUser::from_claims(claims);
            tracing::debug!(username = %user.username, role = %user.role, "Request authenticated");
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                AuthError::ExpiredToken.into_response()
            }
            _ => AuthError::InvalidToken.into_response(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_prefix_is_required() {
        assert_eq!(extract_token("Bearer abc"), Some("abc"));
        assert_eq!(extract_token("Basic abc"), None);
        assert_eq!(extract_token("Bearer "), None);
    }

    #[test]
    fn claims_map_to_actor() {
        let claims = TokenClaims {
            sub: "acc-1".into(),
            username: "maya".into(),
            role: "staff".into(),
            kind: TokenKind::Access,
            exp: 0,
            iat: 0,
            iss: "rentcar".into(),
        };
        let actor = AuthenticatedUser::from_claims(claims).actor();
        assert_eq!(actor.account_id, "acc-1");
        assert!(actor.is_staff());
    }
}
