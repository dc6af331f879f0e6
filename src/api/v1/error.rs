use crate::api::v1::handler::ApiResponse;
use crate::application_port::*;
use serde::Serialize;
use std::convert::Infallible;
use thiserror::Error;
use tracing::warn;
use warp::filters::body::BodyDeserializeError;
use warp::http::StatusCode;
use warp::{Rejection, reject};

pub async fn recover_error(err: Rejection) -> Result<impl warp::Reply, Infallible> {
    let (code, message) = if let Some(failure) = err.find::<ApiFailure>() {
        (failure.code.clone(), failure.message.clone())
    } else if let Some(e) = err.find::<BodyDeserializeError>() {
        (ApiErrorCode::BadRequest, e.to_string())
    } else if let Some(e) = err.find::<reject::InvalidQuery>() {
        (ApiErrorCode::BadRequest, e.to_string())
    } else if err.is_not_found() {
        (ApiErrorCode::NotFound, ApiErrorCode::NotFound.to_string())
    } else if err.find::<reject::MethodNotAllowed>().is_some() {
        (
            ApiErrorCode::MethodNotAllowed,
            ApiErrorCode::MethodNotAllowed.to_string(),
        )
    } else {
        (
            ApiErrorCode::InternalError,
            format!("Unhandled error: {:?}", err),
        )
    };

    let status = code.status();
    let json = warp::reply::json(&ApiResponse::<()>::err(code, message));
    Ok(warp::reply::with_status(json, status))
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum ApiErrorCode {
    #[error("User not found")]
    UserNotFound,
    #[error("Friend request not found")]
    RequestNotFound,
    #[error("Users are not friends")]
    NotFriends,
    #[error("User already exists")]
    AlreadyExists,
    #[error("Users are already friends")]
    AlreadyFriends,
    #[error("Friend request already sent")]
    DuplicateRequest,
    #[error("Access denied")]
    AccessDenied,
    #[error("Invalid input")]
    ValidationFailed,
    #[error("Concurrent update, try again")]
    Conflict,
    #[error("Missing bearer token")]
    MissingToken,
    #[error("Token is not valid")]
    InvalidToken,
    #[error("Token has expired")]
    TokenExpired,
    #[error("Malformed request")]
    BadRequest,
    #[error("Resource not found")]
    NotFound,
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("Internal error")]
    InternalError,
}

impl ApiErrorCode {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiErrorCode::UserNotFound
            | ApiErrorCode::RequestNotFound
            | ApiErrorCode::NotFriends
            | ApiErrorCode::NotFound => StatusCode::NOT_FOUND,
            ApiErrorCode::AlreadyExists
            | ApiErrorCode::AlreadyFriends
            | ApiErrorCode::DuplicateRequest
            | ApiErrorCode::Conflict => StatusCode::CONFLICT,
            ApiErrorCode::AccessDenied => StatusCode::FORBIDDEN,
            ApiErrorCode::ValidationFailed | ApiErrorCode::BadRequest => StatusCode::BAD_REQUEST,
            ApiErrorCode::MissingToken | ApiErrorCode::InvalidToken | ApiErrorCode::TokenExpired => {
                StatusCode::UNAUTHORIZED
            }
            ApiErrorCode::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Rejection carried through warp until `recover_error` renders it.
#[derive(Debug)]
pub struct ApiFailure {
    pub code: ApiErrorCode,
    pub message: String,
}

impl ApiFailure {
    pub fn new(code: ApiErrorCode) -> Self {
        let message = code.to_string();
        ApiFailure { code, message }
    }

    pub fn with_message(code: ApiErrorCode, message: impl Into<String>) -> Self {
        ApiFailure {
            code,
            message: message.into(),
        }
    }

    pub fn internal<E: std::fmt::Display>(error: E) -> Self {
        warn!("Internal error: {}", error);
        ApiFailure::new(ApiErrorCode::InternalError)
    }
}

impl reject::Reject for ApiFailure {}

impl From<RelationError> for ApiFailure {
    fn from(error: RelationError) -> Self {
        match error {
            RelationError::UserNotFound => ApiFailure::new(ApiErrorCode::UserNotFound),
            RelationError::RequestNotFound => ApiFailure::new(ApiErrorCode::RequestNotFound),
            RelationError::NotFriends => ApiFailure::new(ApiErrorCode::NotFriends),
            RelationError::AlreadyExists => ApiFailure::new(ApiErrorCode::AlreadyExists),
            RelationError::AlreadyFriends => ApiFailure::new(ApiErrorCode::AlreadyFriends),
            RelationError::DuplicateRequest => ApiFailure::new(ApiErrorCode::DuplicateRequest),
            RelationError::AccessDenied(reason) => {
                ApiFailure::with_message(ApiErrorCode::AccessDenied, reason)
            }
            RelationError::Validation(reason) => {
                ApiFailure::with_message(ApiErrorCode::ValidationFailed, reason)
            }
            RelationError::Conflict => ApiFailure::new(ApiErrorCode::Conflict),
            RelationError::Store(e) => ApiFailure::internal(e),
        }
    }
}

impl From<AuthError> for ApiFailure {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::TokenInvalid => ApiFailure::new(ApiErrorCode::InvalidToken),
            AuthError::TokenExpired => ApiFailure::new(ApiErrorCode::TokenExpired),
        }
    }
}
