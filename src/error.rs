use actix_web::error::BlockingError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use image::ImageError;
use serde::Serialize;
use std::io::{Error as IoError, ErrorKind};
use thiserror::Error;

/// Failures raised by a model provider or the label adapter.
#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("Failed to load model {0}: {1}")]
    ModelLoad(String, String),
    #[error("Model inference failed: {0}")]
    Inference(String),
    #[error("Model produced malformed output: {0}")]
    MalformedOutput(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration {0}: {1}")]
    Read(String, IoError),
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Errors surfaced by the HTTP binding layer.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Failed to read upload: {0}")]
    Upload(String),
    #[error("No image found in upload")]
    MissingImage,
    #[error("Upload exceeds the {0} byte limit")]
    UploadTooLarge(usize),
    #[error("Invalid image file: {0}")]
    DecodeImage(#[from] ImageError),
    #[error("Example {0} does not exist")]
    ExampleNotFound(usize),
    #[error("Failed to read example {0}: {1}")]
    ExampleRead(String, IoError),
    #[error(transparent)]
    Classifier(#[from] ClassifierError),
    #[error("Background task was cancelled")]
    Blocking(#[from] BlockingError),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Upload(_)
            | ApiError::MissingImage
            | ApiError::UploadTooLarge(_)
            | ApiError::DecodeImage(_) => StatusCode::BAD_REQUEST,
            ApiError::ExampleNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::ExampleRead(_, e) if e.kind() == ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ApiError::ExampleRead(_, _) | ApiError::Classifier(_) | ApiError::Blocking(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_map_to_bad_request() {
        assert_eq!(ApiError::MissingImage.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::UploadTooLarge(10).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::ExampleNotFound(3).status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn missing_example_file_is_not_found() {
        let err = ApiError::ExampleRead("dog.jpg".into(), IoError::from(ErrorKind::NotFound));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

        let err = ApiError::ExampleRead("dog.jpg".into(), IoError::from(ErrorKind::PermissionDenied));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn classifier_errors_are_transparent() {
        let err = ApiError::from(ClassifierError::Inference("shape mismatch".into()));
        assert_eq!(err.to_string(), "Model inference failed: shape mismatch");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
