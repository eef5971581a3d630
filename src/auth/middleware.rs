// Request extractors for protected routes

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use tracing::debug;

use crate::auth::{error::AuthError, models::Role, token::Claims};
use crate::AppState;

/// Authenticated caller of a user route
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: i32,
    pub email: String,
    pub role: Role,
}

/// Authenticated caller holding the admin role
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub user_id: i32,
}

/// Pull the bearer token out of the Authorization header and verify it
fn bearer_claims(parts: &Parts, state: &AppState) -> Result<Claims, AuthError> {
    let auth_header = parts
        .headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::InvalidToken)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidToken)?;

    state.tokens.validate_access_token(token)
}

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let claims = bearer_claims(parts, state)?;

        Ok(AuthenticatedUser {
            user_id: claims.sub,
            email: claims.email,
            role: claims.role,
        })
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let claims = bearer_claims(parts, state)?;

        if !claims.role.is_admin() {
            return Err(AuthError::InsufficientPermissions {
                required: Role::Admin,
                actual: claims.role,
            });
        }

        debug!(
            "Admin access granted: user_id={}, endpoint={}",
            claims.sub,
            parts.uri.path()
        );
        Ok(AdminUser {
            user_id: claims.sub,
        })
    }
}
