use super::error::*;
use super::handler;
use super::handler::{CookiePolicy, REFRESH_COOKIE};
use crate::application_port::AuthService;
use crate::domain_model::UserId;
use crate::server::Server;
use std::convert::Infallible;
use std::sync::Arc;
use warp::{Filter, http, reject};

pub fn routes(
    server: Arc<Server>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let policy = CookiePolicy {
        secure: server.cookie_secure,
        max_age_secs: server.refresh_ttl_secs,
    };

    let login = warp::post()
        .and(warp::path("login"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(warp::cookie::optional(REFRESH_COOKIE))
        .and(with(server.auth_service.clone()))
        .and(with_policy(policy.clone()))
        .and_then(handler::login);

    let refresh = warp::post()
        .and(warp::path("refresh"))
        .and(warp::path::end())
        .and(warp::cookie::optional(REFRESH_COOKIE))
        .and(with(server.auth_service.clone()))
        .and(with_policy(policy.clone()))
        .and_then(handler::refresh);

    let logout = warp::post()
        .and(warp::path("logout"))
        .and(warp::path::end())
        .and(warp::cookie::optional(REFRESH_COOKIE))
        .and(with(server.auth_service.clone()))
        .and(with_policy(policy))
        .and_then(handler::logout);

    let session = warp::get()
        .and(warp::path("session"))
        .and(warp::path::end())
        .and(with_authentication(server.auth_service.clone()))
        .and_then(handler::session);

    login.or(refresh).or(logout).or(session)
}

fn with<ServiceType>(
    service: Arc<ServiceType>,
) -> impl Filter<Extract = (Arc<ServiceType>,), Error = Infallible> + Clone
where
    ServiceType: Send + Sync + ?Sized,
{
    warp::any().map(move || service.clone())
}

fn with_policy(
    policy: CookiePolicy,
) -> impl Filter<Extract = (CookiePolicy,), Error = Infallible> + Clone {
    warp::any().map(move || policy.clone())
}

/// Access-token gate for routes that need a caller identity. Pulls the
/// bearer token out of `Authorization` and resolves it to a [`UserId`].
fn with_authentication(
    auth_service: Arc<dyn AuthService>,
) -> impl Filter<Extract = (UserId,), Error = warp::Rejection> + Clone {
    warp::header::<String>(http::header::AUTHORIZATION.as_ref()).and_then(move |header: String| {
        let auth_service = auth_service.clone();
        async move {
            if let Some(token) = header.strip_prefix("Bearer ") {
                let user_id = auth_service
                    .authenticate(token)
                    .await
                    .map_err(ApiErrorCode::from)
                    .map_err(reject::custom)?;
                Ok(user_id)
            } else {
                Err(reject::custom(ApiErrorCode::Unauthenticated))
            }
        }
    })
}
