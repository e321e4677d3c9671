//! API errors and the rejection handler that turns them into JSON.

use std::convert::Infallible;

use thiserror::Error;
use tracing::{error, warn};
use warp::http::StatusCode;
use warp::{Rejection, Reply};

use super::extract::ExtractError;
use super::generator::GeneratorError;
use crate::protocol::ErrorResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("No file uploaded.")]
    NoFile,
    #[error("Unsupported file type.")]
    UnsupportedType,
    #[error("{0}")]
    InvalidParam(String),
    #[error("File is too large.")]
    PayloadTooLarge,
    #[error("The generator returned no usable questions.")]
    NoQuestions,
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error(transparent)]
    Generator(#[from] GeneratorError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NoFile | ApiError::UnsupportedType | ApiError::InvalidParam(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::NoQuestions | ApiError::Extract(_) | ApiError::Generator(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl warp::reject::Reject for ApiError {}

fn json_error(status: StatusCode, message: impl Into<String>) -> warp::reply::Response {
    let body = ErrorResponse {
        error: message.into(),
    };
    warp::reply::with_status(warp::reply::json(&body), status).into_response()
}

/// Render every rejection as `{ "error": ... }` with a matching status.
pub async fn handle_rejection(rejection: Rejection) -> Result<impl Reply, Infallible> {
    if let Some(err) = rejection.find::<ApiError>() {
        let status = err.status();
        if status.is_server_error() {
            error!(error = %err, "request failed");
        } else {
            warn!(error = %err, "request rejected");
        }
        return Ok(json_error(status, err.to_string()));
    }

    if rejection.is_not_found() {
        return Ok(json_error(StatusCode::NOT_FOUND, "Not found."));
    }
    if rejection.find::<warp::reject::PayloadTooLarge>().is_some() {
        return Ok(json_error(
            StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::PayloadTooLarge.to_string(),
        ));
    }
    if rejection.find::<warp::reject::LengthRequired>().is_some() {
        return Ok(json_error(StatusCode::LENGTH_REQUIRED, "Content-Length is required."));
    }
    if let Some(err) = rejection.find::<warp::filters::body::BodyDeserializeError>() {
        return Ok(json_error(StatusCode::BAD_REQUEST, err.to_string()));
    }
    if rejection.find::<warp::reject::MethodNotAllowed>().is_some() {
        return Ok(json_error(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed."));
    }
    if rejection.find::<warp::reject::UnsupportedMediaType>().is_some() {
        return Ok(json_error(
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "Unsupported content type.",
        ));
    }

    error!(?rejection, "unhandled rejection");
    Ok(json_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "An unexpected error occurred.",
    ))
}
