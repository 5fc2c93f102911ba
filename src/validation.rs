use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use validator::Validate;

use crate::error::AppError;

pub static DNI_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{1,15}$").unwrap());

/// Collapses `validator` failures into the app error taxonomy so every
/// malformed payload answers with the standard `{kind, message}` envelope.
pub trait ValidateExt {
    fn check(&self) -> Result<(), AppError>;
}

impl<T: Validate> ValidateExt for T {
    fn check(&self) -> Result<(), AppError> {
        match self.validate() {
            Ok(()) => Ok(()),
            Err(errors) => {
                let mut messages = Vec::new();
                for (field, field_errors) in errors.field_errors() {
                    for error in field_errors {
                        let detail = error
                            .message
                            .clone()
                            .unwrap_or_else(|| "valor inválido".into());
                        messages.push(format!("{}: {}", field, detail));
                    }
                }
                messages.sort();
                Err(AppError::Validation(messages.join("; ")))
            }
        }
    }
}

/// The attendance routes carry the date as a path segment.
pub fn parse_fecha(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("Fecha inválida: {}", raw)))
}
