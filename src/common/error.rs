use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Rota para onde o cliente manda quem não tem acesso.
pub const ACCESS_DENIED_FALLBACK: &str = "/parts-inventory";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation failed")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Access denied for role '{0}'")]
    Forbidden(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Insufficient stock for part {part}: {available} available, {requested} requested")]
    InsufficientStock {
        part: String,
        available: i32,
        requested: i32,
    },

    #[error("{0}")]
    BadRequest(String),

    #[error("Could not read the uploaded file: {0}")]
    InvalidUpload(String),

    #[error("PDF fonts not found: {0}")]
    FontNotFound(String),

    #[error("Database error")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Internal server error")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Bcrypt error: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("Spreadsheet error: {0}")]
    XlsxError(#[from] rust_xlsxwriter::XlsxError),
}

impl AppError {
    /// Traduz violações de chave única / estrangeira em erros de negócio.
    pub fn from_db(e: sqlx::Error, what: &str) -> Self {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_unique_violation() {
                return AppError::Conflict(format!("{} already exists", what));
            }
            if db_err.is_foreign_key_violation() {
                return AppError::Conflict(format!("{} is still referenced by other records", what));
            }
        }
        e.into()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let (status, error_message) = match &self {
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "One or more fields are invalid.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::Forbidden(role) => {
                let body = Json(json!({
                    "error": format!("Access denied for role '{}'.", role),
                    "redirect": ACCESS_DENIED_FALLBACK,
                }));
                return (StatusCode::FORBIDDEN, body).into_response();
            }
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, message),
            AppError::Unauthenticated => (StatusCode::UNAUTHORIZED, message),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, message),
            AppError::Conflict(_) | AppError::InsufficientStock { .. } => (StatusCode::CONFLICT, message),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, message),
            AppError::InvalidUpload(_) => (StatusCode::UNPROCESSABLE_ENTITY, message),

            // O resto vira 500; o detalhe fica só no log.
            e => {
                tracing::error!("Internal server error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred.".to_string(),
                )
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_stock_is_a_conflict() {
        let res = AppError::InsufficientStock {
            part: "FLT-001".into(),
            available: 2,
            requested: 5,
        }
        .into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn forbidden_maps_to_403() {
        let res = AppError::Forbidden("student".into()).into_response();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn internal_errors_are_redacted() {
        let res = AppError::InternalServerError(anyhow::anyhow!("secret detail")).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn unauthenticated_is_401() {
        assert_eq!(
            AppError::Unauthenticated.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
    }
}
