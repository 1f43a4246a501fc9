use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

/// Failure taxonomy for the predictor. Every failure path surfaces exactly
/// one user-visible message; nothing is swallowed.
#[derive(Debug, Error)]
pub enum PredictorError {
    /// User input missing or out of range. Reported as an aggregate message
    /// for the whole field group; nothing is partially submitted.
    #[error("{0}")]
    Validation(String),

    /// An aggregation needed all of its inputs but some were absent.
    #[error("incomplete data: {0}")]
    IncompleteData(String),

    /// What-If analysis requested before any prediction has been run.
    #[error("Please generate a prediction first before using What-If Analysis")]
    MissingBaseline,

    /// The remote service could not be reached or returned garbage.
    #[error("prediction service unavailable: {0}")]
    Transport(#[from] reqwest::Error),

    /// The remote service answered but reported a failure of its own.
    #[error("{0}")]
    Model(String),

    #[error("catalog load failed: {0}")]
    Catalog(#[from] csv::Error),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ResponseError for PredictorError {
    fn status_code(&self) -> StatusCode {
        match self {
            PredictorError::Validation(_) => StatusCode::BAD_REQUEST,
            PredictorError::IncompleteData(_) => StatusCode::UNPROCESSABLE_ENTITY,
            PredictorError::MissingBaseline => StatusCode::CONFLICT,
            PredictorError::Transport(_) | PredictorError::Model(_) => StatusCode::BAD_GATEWAY,
            PredictorError::Catalog(_) | PredictorError::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}
