//! REST API request/response models
//!
//! Field names follow the wire contract clients already depend on.

use actix_multipart::form::{text::Text, MultipartForm};
use actix_web::dev::Payload;
use actix_web::http::header::CONTENT_TYPE;
use actix_web::{web, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Error code: missing required field or wrong HTTP method
pub const ERROR_CODE_BAD_REQUEST: i32 = 1;
/// Error code: credentials could not be verified
pub const ERROR_CODE_INVALID_CREDENTIALS: i32 = 2;

/// Form body of `POST /login`, read from either a urlencoded or a multipart
/// body. Absent fields are reported by the handler, not rejected here.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub username: Option<String>,
    pub pw: Option<String>,
}

impl LoginForm {
    /// For a repeated key the first value wins
    fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut form = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "username" => &mut form.username,
                "pw" => &mut form.pw,
                _ => continue,
            };
            slot.get_or_insert(value);
        }
        form
    }
}

#[derive(MultipartForm)]
struct MultipartLogin {
    username: Option<Text<String>>,
    pw: Option<Text<String>>,
}

impl From<MultipartLogin> for LoginForm {
    fn from(form: MultipartLogin) -> Self {
        Self {
            username: form.username.map(|text| text.0),
            pw: form.pw.map(|text| text.0),
        }
    }
}

fn is_multipart(req: &HttpRequest) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| {
            value
                .trim_start()
                .to_ascii_lowercase()
                .starts_with("multipart/form-data")
        })
        .unwrap_or(false)
}

/// Never fails: an unreadable body yields an empty form
impl FromRequest for LoginForm {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        if is_multipart(req) {
            let fields = MultipartForm::<MultipartLogin>::from_request(req, payload);
            Box::pin(async move {
                Ok(match fields.await {
                    Ok(form) => form.into_inner().into(),
                    Err(e) => {
                        debug!(error = %e, "Unreadable multipart login body");
                        LoginForm::default()
                    }
                })
            })
        } else {
            let pairs = web::Form::<Vec<(String, String)>>::from_request(req, payload);
            Box::pin(async move {
                Ok(match pairs.await {
                    Ok(pairs) => LoginForm::from_pairs(pairs.into_inner()),
                    Err(e) => {
                        debug!(error = %e, "Unreadable login form body");
                        LoginForm::default()
                    }
                })
            })
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoggedInResponse {
    #[serde(rename = "Jwt")]
    pub jwt: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    #[serde(rename = "ErrorCode")]
    pub error_code: i32,
    #[serde(rename = "ErrorMsg")]
    pub error_msg: String,
}

impl ErrorResponse {
    pub fn new(error_code: i32, error_msg: impl Into<String>) -> Self {
        Self {
            error_code,
            error_msg: error_msg.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_repeated_key_keeps_first_value() {
        let form = LoginForm::from_pairs(pairs(&[
            ("username", "alice"),
            ("username", "bob"),
            ("remember", "on"),
            ("pw", "secret123"),
        ]));
        assert_eq!(form.username.as_deref(), Some("alice"));
        assert_eq!(form.pw.as_deref(), Some("secret123"));
    }

    #[test]
    fn test_multipart_content_type_detection() {
        let req = actix_web::test::TestRequest::post()
            .insert_header((CONTENT_TYPE, "multipart/form-data; boundary=xyz"))
            .to_http_request();
        assert!(is_multipart(&req));

        let req = actix_web::test::TestRequest::post()
            .insert_header((CONTENT_TYPE, "application/x-www-form-urlencoded"))
            .to_http_request();
        assert!(!is_multipart(&req));
    }

    #[test]
    fn test_wire_field_names() {
        let body = serde_json::to_value(ErrorResponse::new(2, "Credentials are not right."))
            .unwrap();
        assert_eq!(body["ErrorCode"], 2);
        assert_eq!(body["ErrorMsg"], "Credentials are not right.");

        let body = serde_json::to_value(LoggedInResponse {
            jwt: "a.b.c".to_string(),
        })
        .unwrap();
        assert_eq!(body["Jwt"], "a.b.c");
    }
}
