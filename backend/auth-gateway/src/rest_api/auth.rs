/// Login endpoint
///
/// POST /login - form fields `username`, `pw` (urlencoded or multipart)
///
/// Every failure answers 400 with `{ "ErrorCode", "ErrorMsg" }`; the reason a
/// verification failed is logged and never returned.
use actix_web::http::Method;
use actix_web::{web, HttpRequest, HttpResponse};
use crypto_core::correlation::{new_correlation_id, sanitize, HTTP_CORRELATION_ID_HEADER};
use tracing::{error, info, warn};

use super::models::{
    ErrorResponse, LoggedInResponse, LoginForm, ERROR_CODE_BAD_REQUEST,
    ERROR_CODE_INVALID_CREDENTIALS,
};
use crate::clients::VerifyError;
use crate::GatewayState;

const JSON_UTF8: &str = "application/json; charset=utf-8";

/// Handles `/login` for every method so non-POST requests get the structured
/// 400 instead of a bare 405
pub async fn login(
    req: HttpRequest,
    form: LoginForm,
    state: web::Data<GatewayState>,
) -> HttpResponse {
    let correlation_id = req
        .headers()
        .get(HTTP_CORRELATION_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(sanitize)
        .unwrap_or_else(new_correlation_id);

    if req.method() != Method::POST {
        info!(method = %req.method(), correlation_id = %correlation_id, "Rejected login method");
        return bad_request(
            &correlation_id,
            ERROR_CODE_BAD_REQUEST,
            format!("{} not allowed", req.method()),
        );
    }

    let Some(username) = form.username.filter(|u| !u.is_empty()) else {
        return bad_request(&correlation_id, ERROR_CODE_BAD_REQUEST, "Username not provided");
    };
    let Some(password) = form.pw.filter(|p| !p.is_empty()) else {
        return bad_request(&correlation_id, ERROR_CODE_BAD_REQUEST, "Password not provided");
    };

    info!(username = %username, correlation_id = %correlation_id, "POST /login");

    let subject = match state
        .verifier
        .verify(&username, &password, &correlation_id)
        .await
    {
        Ok(subject) => subject,
        Err(e) => {
            match &e {
                VerifyError::Rejected => {
                    info!(username = %username, correlation_id = %correlation_id, "Login rejected")
                }
                other => warn!(
                    username = %username,
                    correlation_id = %correlation_id,
                    error = %other,
                    "Credential verification failed"
                ),
            }
            return bad_request(
                &correlation_id,
                ERROR_CODE_INVALID_CREDENTIALS,
                "Credentials are not right.",
            );
        }
    };

    match state.tokens.issue(&subject) {
        Ok(jwt) => {
            info!(username = %username, correlation_id = %correlation_id, "Login successful");
            HttpResponse::Ok()
                .content_type(JSON_UTF8)
                .insert_header((HTTP_CORRELATION_ID_HEADER, correlation_id))
                .json(LoggedInResponse { jwt })
        }
        Err(e) => {
            error!(
                username = %username,
                correlation_id = %correlation_id,
                error = %e,
                "Token issuance failed"
            );
            HttpResponse::InternalServerError()
                .content_type(JSON_UTF8)
                .insert_header((HTTP_CORRELATION_ID_HEADER, correlation_id))
                .json(ErrorResponse::new(0, "Internal server error"))
        }
    }
}

fn bad_request(correlation_id: &str, code: i32, message: impl Into<String>) -> HttpResponse {
    HttpResponse::BadRequest()
        .content_type(JSON_UTF8)
        .insert_header((HTTP_CORRELATION_ID_HEADER, correlation_id.to_string()))
        .json(ErrorResponse::new(code, message))
}
