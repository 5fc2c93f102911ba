use opentelemetry_semantic_conventions::{attribute::OTEL_STATUS_CODE, trace::ERROR_TYPE};
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::{Span, error, warn};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    Authentication(String),

    #[error("{0}")]
    Authorization(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Single response shape for every failure the API reports.
#[derive(Serialize)]
pub struct ErrorBody {
    pub kind: &'static str,
    pub message: String,
}

impl AppError {
    /// Wraps a storage error, promoting uniqueness violations to `Conflict`
    /// so duplicate dni/correo/usuario rows answer 409 instead of 500.
    pub fn from_db(err: sqlx::Error, conflict_message: &str) -> AppError {
        if let sqlx::Error::Database(db_err) = &err {
            // 2067 = SQLite unique constraint, 23505 = PostgreSQL unique violation
            let code = db_err.code().unwrap_or_default();
            if matches!(db_err.kind(), sqlx::error::ErrorKind::UniqueViolation)
                || code == "2067"
                || code == "23505"
            {
                return AppError::Conflict(conflict_message.to_string());
            }
        }
        AppError::Database(err)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Database(_) => "database",
            AppError::Authentication(_) => "authentication",
            AppError::Authorization(_) => "authorization",
            AppError::NotFound(_) => "not_found",
            AppError::Conflict(_) => "conflict",
            AppError::Validation(_) => "validation",
            AppError::Internal(_) => "internal",
        }
    }

    /// Message safe to hand to the client. Storage and internal failures are
    /// collapsed to a generic message; their detail only goes to the logs.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Database(_) | AppError::Internal(_) => {
                "Error interno del servidor".to_string()
            }
            other => other.to_string(),
        }
    }

    pub fn log_and_record(&self, ctx: &str) {
        let current_span = Span::current();
        let is_valid_span = !current_span.is_none();

        let message = self.to_string();
        match self {
            AppError::Database(err) => {
                error!(error = %message, context = %ctx, db_error = %err, "Database error")
            }
            AppError::Authentication(msg) => {
                warn!(message = %msg, context = %ctx, "Authentication error")
            }
            AppError::Authorization(msg) => {
                warn!(message = %msg, context = %ctx, "Authorization error")
            }
            AppError::NotFound(msg) => {
                warn!(message = %msg, context = %ctx, "Not found error")
            }
            AppError::Conflict(msg) => {
                warn!(message = %msg, context = %ctx, "Conflict error")
            }
            AppError::Validation(msg) => {
                warn!(message = %msg, context = %ctx, "Validation error")
            }
            AppError::Internal(msg) => {
                error!(message = %msg, context = %ctx, "Internal server error")
            }
        }

        if is_valid_span {
            current_span.record("error", tracing::field::display(true));
            current_span.record(ERROR_TYPE, tracing::field::display(self.kind()));
            current_span.record("error.message", tracing::field::display(&message));

            if matches!(self, AppError::Database(_) | AppError::Internal(_)) {
                current_span.record(OTEL_STATUS_CODE, tracing::field::display("ERROR"));
            }
        }
    }

    pub fn status_code(&self) -> Status {
        match self {
            AppError::Database(_) => Status::InternalServerError,
            AppError::Authentication(_) => Status::Unauthorized,
            AppError::Authorization(_) => Status::Forbidden,
            AppError::NotFound(_) => Status::NotFound,
            AppError::Conflict(_) => Status::Conflict,
            AppError::Validation(_) => Status::BadRequest,
            AppError::Internal(_) => Status::InternalServerError,
        }
    }
}

impl<'r> rocket::response::Responder<'r, 'static> for AppError {
    fn respond_to(self, req: &'r rocket::Request<'_>) -> rocket::response::Result<'static> {
        self.log_and_record(&format!("Request to {} {}", req.method(), req.uri()));

        let body = ErrorBody {
            kind: self.kind(),
            message: self.public_message(),
        };

        Custom(self.status_code(), Json(body)).respond_to(req)
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> Self {
        AppError::Internal(format!("Cryptography error: {}", error))
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(error: sqlx::migrate::MigrateError) -> Self {
        AppError::Internal(format!("Migration error: {}", error))
    }
}
