//! Success envelope.

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;

#[derive(Serialize)]
struct Body<T> {
    response: T,
}

/// `{"response": ...}` with a permissive CORS origin.
#[derive(Debug)]
pub struct Envelope<T>(pub T);

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        envelope(StatusCode::OK, self.0)
    }
}

pub(crate) fn envelope<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(Body { response: body })).into_response();
    response.headers_mut().insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    response
}
