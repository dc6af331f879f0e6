use super::error::*;
use crate::application_port::*;
use crate::domain_model::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use warp::http::StatusCode;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(code: ApiErrorCode, message: impl Into<String>) -> Self {
        ApiResponse {
            success: false,
            data: None,
            error: Some(ApiError {
                code,
                message: message.into(),
            }),
        }
    }
}

pub async fn register(
    body: NewUser,
    user_service: Arc<dyn UserService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let identity = user_service
        .register(body)
        .await
        .map_err(ApiFailure::from)?;

    Ok(warp::reply::with_status(
        warp::reply::json(&ApiResponse::ok(identity)),
        StatusCode::CREATED,
    ))
}

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub email: Option<String>,
}

pub async fn find_users(
    query: UserQuery,
    user_service: Arc<dyn UserService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let users = match query.email {
        Some(email) => vec![
            user_service
                .find_by_email(&email)
                .await
                .map_err(ApiFailure::from)?,
        ],
        None => user_service.list_users().await.map_err(ApiFailure::from)?,
    };

    Ok(warp::reply::json(&ApiResponse::ok(users)))
}

pub async fn get_user(
    user_id: UserId,
    user_service: Arc<dyn UserService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let identity = user_service
        .get_user(user_id)
        .await
        .map_err(ApiFailure::from)?;

    Ok(warp::reply::json(&ApiResponse::ok(identity)))
}

#[derive(Debug, Deserialize)]
pub struct SendRequestBody {
    pub receiver: UserId,
    pub message: Option<String>,
}

/// Both outcomes of a send: a new pending request, or the acceptance of
/// the receiver's earlier request.
#[derive(Debug, Serialize)]
pub struct SendRequestResponse {
    pub accepted: bool,
    pub request: FriendRequest,
}

pub async fn send_request(
    me: UserId,
    body: SendRequestBody,
    relationship_service: Arc<dyn RelationshipService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let request = relationship_service
        .send_request(me, body.receiver, body.message)
        .await
        .map_err(ApiFailure::from)?;

    let accepted = request.sender_id == body.receiver;
    let status = if accepted {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };

    Ok(warp::reply::with_status(
        warp::reply::json(&ApiResponse::ok(SendRequestResponse { accepted, request })),
        status,
    ))
}

pub async fn list_requests(
    me: UserId,
    relationship_service: Arc<dyn RelationshipService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let pending = relationship_service
        .list_requests(me)
        .await
        .map_err(ApiFailure::from)?;

    Ok(warp::reply::json(&ApiResponse::ok(pending)))
}

pub async fn get_request(
    other: UserId,
    me: UserId,
    relationship_service: Arc<dyn RelationshipService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let request = relationship_service
        .get_request(me, other)
        .await
        .map_err(ApiFailure::from)?;

    Ok(warp::reply::json(&ApiResponse::ok(request)))
}

pub async fn reject_request(
    other: UserId,
    me: UserId,
    relationship_service: Arc<dyn RelationshipService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let request = relationship_service
        .reject_request(me, other)
        .await
        .map_err(ApiFailure::from)?;

    Ok(warp::reply::json(&ApiResponse::ok(request)))
}

pub async fn list_friends(
    me: UserId,
    relationship_service: Arc<dyn RelationshipService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let friends = relationship_service
        .list_friends(me)
        .await
        .map_err(ApiFailure::from)?;

    Ok(warp::reply::json(&ApiResponse::ok(friends)))
}

pub async fn remove_friend(
    other: UserId,
    me: UserId,
    relationship_service: Arc<dyn RelationshipService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let removed = relationship_service
        .remove_friend(me, other)
        .await
        .map_err(ApiFailure::from)?;

    Ok(warp::reply::json(&ApiResponse::ok(removed)))
}
