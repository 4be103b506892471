use std::str::FromStr;

use actix_web::{web::Json, HttpRequest};
use domain_approval::exception::{ApprovalException, ApprovalResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod approval;

/// Header carrying the acting user, set by the gateway in front of the engine.
pub const USER_HEADER: &str = "X-User-Id";

#[derive(Serialize, Deserialize, Debug)]
pub struct ResponseBase<T> {
    pub code: i32,
    pub message: String,
    pub content: Option<T>,
}

impl<T> ResponseBase<T> {
    pub fn new(code: i32, message: &str, content: Option<T>) -> Self {
        Self {
            code,
            message: message.to_string(),
            content,
        }
    }

    pub fn ok(content: Option<T>) -> Self {
        Self::new(200, "Ok", content)
    }

    pub fn err(code: i32, message: &str) -> Self {
        Self::new(code, message, None)
    }
}

impl<T> From<ApprovalException> for ResponseBase<T> {
    fn from(e: ApprovalException) -> Self {
        match e {
            ApprovalException::InternalError { .. } => {
                tracing::error!("{e:?}");
                Self::err(e.code() as i32, "Internal error.")
            }
            e => {
                tracing::warn!("{e}");
                Self::err(e.code() as i32, &e.to_string())
            }
        }
    }
}

pub fn respond<T>(result: ApprovalResult<T>) -> Json<ResponseBase<T>> {
    Json(match result {
        Ok(content) => ResponseBase::ok(Some(content)),
        Err(e) => e.into(),
    })
}

fn acting_user<T>(req: &HttpRequest) -> Result<Uuid, Json<ResponseBase<T>>> {
    let header = req
        .headers()
        .get(USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| Json(ResponseBase::err(401, "Missing acting user.")))?;
    Uuid::from_str(header).map_err(|e| {
        Json(ResponseBase::err(
            400,
            &format!(r#"error when parse uuid from "{header}": {e}"#),
        ))
    })
}
