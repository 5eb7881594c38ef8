// src/middleware/access.rs

use axum::{extract::Request, middleware::Next, response::Response};

use crate::{
    common::{access::{is_allowed, API_RULES}, error::AppError},
    models::auth::User,
};

/// Roda depois do `auth_guard`: confere o papel do usuário contra a lista de prefixos.
pub async fn role_guard(request: Request, next: Next) -> Result<Response, AppError> {
    let user = request
        .extensions()
        .get::<User>()
        .ok_or(AppError::Unauthenticated)?;

    let path = request.uri().path();
    if !is_allowed(API_RULES, request.method(), path, user.role) {
        tracing::warn!(
            "⛔ {} ({}) bloqueado em {} {}",
            user.username,
            user.role.as_str(),
            request.method(),
            path
        );
        return Err(AppError::Forbidden(user.role.as_str().to_string()));
    }

    Ok(next.run(request).await)
}
