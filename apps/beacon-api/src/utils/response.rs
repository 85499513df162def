//! 统一错误响应
//!
//! 错误体统一为 `ApiResponse` 格式，错误码与 HTTP 状态码一一对应。
//! 500 响应只返回通用讯息，细节写入日志与错误留档。

use api_contract::ApiResponse;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

pub fn bad_request_error(message: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse::<()>::error("INVALID.REQUEST", message.into())),
    )
        .into_response()
}

pub fn method_not_allowed_error() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ApiResponse::<()>::error(
            "METHOD.NOT_ALLOWED",
            "method not allowed",
        )),
    )
        .into_response()
}

pub fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::<()>::error("INTERNAL.ERROR", "internal error")),
    )
        .into_response()
}
