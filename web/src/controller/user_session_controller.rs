use crate::controller::ApiResponse;
use crate::error::{Error as WebError, Result as WebResult};
use axum::{http::StatusCode, response::IntoResponse, Form, Json};
use domain::error::Error as DomainError;
use domain::user::{AuthSession, Credentials};
use log::*;
use serde_json::json;

/// Logs the user into the platform and returns a new session cookie.
///
/// Successful login will return a session cookie with id, e.g.:
/// set-cookie: id=07bbbe54-bd35-425f-8e63-618a8d8612df; HttpOnly; SameSite=Lax; Path=/; Max-Age=86399
///
/// The cookie must accompany every later API call and stream request, e.g.:
/// curl -N --header "Cookie: id=07bbbe54-bd35-425f-8e63-618a8d8612df" http://localhost:4000/api/notifications/sse
#[utoipa::path(
    post,
    path = "/login",
    request_body(content = domain::user::Credentials, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Logs in and returns session authentication cookie"),
        (status = 401, description = "Unauthorized"),
        (status = 405, description = "Method not allowed"),
        (status = 503, description = "Service temporarily unavailable")
    )
)]
pub async fn login(
    mut auth_session: AuthSession,
    Form(creds): Form<Credentials>,
) -> WebResult<impl IntoResponse> {
    let user = match auth_session.authenticate(creds.clone()).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            warn!("Authentication failed, invalid user: {:?}", creds.email);
            return Err(WebError::from(DomainError::unauthenticated()));
        }
        Err(auth_error) => {
            warn!("Authentication failed with error: {auth_error:?}");
            return Err(WebError::from(DomainError::unauthenticated()));
        }
    };

    if let Err(login_error) = auth_session.login(&user).await {
        warn!("Session login failed: {login_error:?}");
        return Err(WebError::from(DomainError::other(
            login_error,
            "Session login failed",
        )));
    }

    let user_session_json = json!({
        "id": user.id,
        "email": user.email,
        "first_name": user.first_name,
        "last_name": user.last_name,
        "display_name": user.display_name,
    });

    debug!("user_session_json: {user_session_json}");

    Ok(Json(ApiResponse::new(
        StatusCode::OK.into(),
        user_session_json,
    )))
}

/// Logs the user out of the platform by destroying their session.
/// Streams opened with the old cookie stay open until the client closes them.
#[utoipa::path(
    get,
    path = "/delete",
    responses(
        (status = 200, description = "Successfully logged out"),
        (status = 401, description = "Unauthorized"),
        (status = 405, description = "Method not allowed"),
        (status = 503, description = "Service temporarily unavailable")
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn delete(mut auth_session: AuthSession) -> impl IntoResponse {
    trace!("UserSessionController::delete()");
    match auth_session.logout().await {
        Ok(_) => StatusCode::OK.into_response(),
        Err(err) => {
            error!("Logout failed: {err:?}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
