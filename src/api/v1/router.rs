use super::error::*;
use super::handler;
use crate::application_port::TokenVerifier;
use crate::domain_model::UserId;
use crate::server::Server;
use std::convert::Infallible;
use std::sync::Arc;
use warp::{Filter, http};

pub fn routes(
    server: Arc<Server>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let register = warp::path("users")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json())
        .and(with(server.user_service.clone()))
        .and_then(handler::register);

    let find_users = warp::path("users")
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::query::<handler::UserQuery>())
        .and(with(server.user_service.clone()))
        .and_then(handler::find_users);

    let get_user = warp::path!("users" / UserId)
        .and(warp::get())
        .and(with(server.user_service.clone()))
        .and_then(handler::get_user);

    let send_request = warp::path("friend_requests")
        .and(warp::path::end())
        .and(warp::post())
        .and(with_verification(server.token_verifier.clone()))
        .and(warp::body::json())
        .and(with(server.relationship_service.clone()))
        .and_then(handler::send_request);

    let list_requests = warp::path("friend_requests")
        .and(warp::path::end())
        .and(warp::get())
        .and(with_verification(server.token_verifier.clone()))
        .and(with(server.relationship_service.clone()))
        .and_then(handler::list_requests);

    let get_request = warp::path!("friend_requests" / UserId)
        .and(warp::get())
        .and(with_verification(server.token_verifier.clone()))
        .and(with(server.relationship_service.clone()))
        .and_then(handler::get_request);

    let reject_request = warp::path!("friend_requests" / UserId / "reject")
        .and(warp::post())
        .and(with_verification(server.token_verifier.clone()))
        .and(with(server.relationship_service.clone()))
        .and_then(handler::reject_request);

    let list_friends = warp::path("friends")
        .and(warp::path::end())
        .and(warp::get())
        .and(with_verification(server.token_verifier.clone()))
        .and(with(server.relationship_service.clone()))
        .and_then(handler::list_friends);

    let remove_friend = warp::path!("friends" / UserId)
        .and(warp::delete())
        .and(with_verification(server.token_verifier.clone()))
        .and(with(server.relationship_service.clone()))
        .and_then(handler::remove_friend);

    register
        .or(find_users)
        .or(get_user)
        .or(send_request)
        .or(list_requests)
        .or(get_request)
        .or(reject_request)
        .or(list_friends)
        .or(remove_friend)
}

fn with<ServiceType>(
    service: Arc<ServiceType>,
) -> impl Filter<Extract = (Arc<ServiceType>,), Error = Infallible> + Clone
where
    ServiceType: Send + Sync + ?Sized,
{
    warp::any().map(move || service.clone())
}

fn with_verification(
    token_verifier: Arc<dyn TokenVerifier>,
) -> impl Filter<Extract = (UserId,), Error = warp::Rejection> + Clone {
    warp::header::optional::<String>(http::header::AUTHORIZATION.as_str()).and_then(
        move |header: Option<String>| {
            let token_verifier = token_verifier.clone();
            async move {
                let header = header.ok_or_else(|| ApiFailure::new(ApiErrorCode::MissingToken))?;
                let token = header
                    .strip_prefix("Bearer ")
                    .ok_or_else(|| ApiFailure::new(ApiErrorCode::InvalidToken))?;
                let user_id = token_verifier
                    .verify_token(token)
                    .await
                    .map_err(ApiFailure::from)?;
                Ok::<UserId, warp::Rejection>(user_id)
            }
        },
    )
}
