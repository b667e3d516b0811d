use super::error::*;
use crate::application_port::{AuthService, LoginInput};
use crate::domain_model::UserId;
use crate::logger::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use warp::Reply;
use warp::http::StatusCode;
use warp::http::header::{HeaderValue, InvalidHeaderValue, SET_COOKIE};
use warp::reply::Response;

pub const REFRESH_COOKIE: &str = "refresh_token";

/// How the refresh cookie is stamped onto responses. Built by the router
/// from settings; handlers never see raw config.
#[derive(Debug, Clone)]
pub struct CookiePolicy {
    pub secure: bool,
    pub max_age_secs: i64,
}

impl CookiePolicy {
    fn set(&self, token: &str) -> Result<HeaderValue, InvalidHeaderValue> {
        let mut cookie = format!(
            "{REFRESH_COOKIE}={token}; Path=/; HttpOnly; SameSite=Strict; Max-Age={}",
            self.max_age_secs
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        HeaderValue::from_str(&cookie)
    }

    fn clear(&self) -> Result<HeaderValue, InvalidHeaderValue> {
        let mut cookie =
            format!("{REFRESH_COOKIE}=; Path=/; HttpOnly; SameSite=Strict; Max-Age=0");
        if self.secure {
            cookie.push_str("; Secure");
        }
        HeaderValue::from_str(&cookie)
    }
}

fn append_cookie(response: &mut Response, cookie: Result<HeaderValue, InvalidHeaderValue>) {
    match cookie {
        Ok(value) => {
            response.headers_mut().append(SET_COOKIE, value);
        }
        Err(e) => error!("refresh cookie not emitted: {e}"),
    }
}

fn error_response(code: &ApiErrorCode) -> Response {
    warp::reply::with_status(
        warp::reply::json(&ErrorBody {
            message: code.to_string(),
        }),
        code.status(),
    )
    .into_response()
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
}

pub async fn login(
    body: LoginRequest,
    cookie: Option<String>,
    auth_service: Arc<dyn AuthService>,
    policy: CookiePolicy,
) -> Result<Response, warp::Rejection> {
    let input = LoginInput {
        email: body.email,
        password: body.password,
        presented_refresh_token: cookie,
    };

    let outcome = match auth_service.login(input).await {
        Ok(outcome) => outcome,
        // Failed logins leave whatever cookie the client holds alone.
        Err(e) => return Ok(error_response(&ApiErrorCode::from(e))),
    };

    let mut response = warp::reply::json(&TokenResponse {
        access_token: outcome.tokens.access_token.0.clone(),
    })
    .into_response();

    if outcome.clear_presented_cookie {
        append_cookie(&mut response, policy.clear());
    }
    append_cookie(&mut response, policy.set(&outcome.tokens.refresh_token.0));
    Ok(response)
}

pub async fn refresh(
    cookie: Option<String>,
    auth_service: Arc<dyn AuthService>,
    policy: CookiePolicy,
) -> Result<Response, warp::Rejection> {
    match auth_service.refresh(cookie.as_deref()).await {
        Ok(tokens) => {
            let mut response = warp::reply::json(&TokenResponse {
                access_token: tokens.access_token.0.clone(),
            })
            .into_response();
            append_cookie(&mut response, policy.set(&tokens.refresh_token.0));
            Ok(response)
        }
        Err(e) => {
            // The presented cookie is spent either way; make the client
            // drop it.
            let mut response = error_response(&ApiErrorCode::from(e));
            if cookie.is_some() {
                append_cookie(&mut response, policy.clear());
            }
            Ok(response)
        }
    }
}

pub async fn logout(
    cookie: Option<String>,
    auth_service: Arc<dyn AuthService>,
    policy: CookiePolicy,
) -> Result<Response, warp::Rejection> {
    let had_cookie = cookie.is_some();

    if let Err(e) = auth_service.logout(cookie.as_deref()).await {
        // Keep the cookie; the client can retry once the store is back.
        return Ok(error_response(&ApiErrorCode::from(e)));
    }

    let mut response = StatusCode::NO_CONTENT.into_response();
    if had_cookie {
        append_cookie(&mut response, policy.clear());
    }
    Ok(response)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub user_id: UserId,
}

pub async fn session(user_id: UserId) -> Result<impl warp::Reply, warp::Rejection> {
    Ok(warp::reply::json(&SessionResponse { user_id }))
}
