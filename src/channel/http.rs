//! HTTP call surface.
//!
//! # Responsibilities
//! - Serialize a request, POST it to the backend, decode the response
//! - Map transport and HTTP-level failures onto remote status codes
//!
//! # Design Decisions
//! - One HTTP request per call; the dispatcher owns the deadline
//! - Connection-level errors read as UNAVAILABLE (the backend is gone,
//!   not misbehaving)

use async_trait::async_trait;
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::{header, Method, Request, StatusCode, Uri};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::channel::surface::{CallFailure, CallSurface, Status, SurfaceFactory};
use crate::channel::ChannelError;

/// Map an HTTP response code onto the remote status vocabulary.
pub fn status_from_http(code: StatusCode) -> Status {
    match code {
        StatusCode::BAD_REQUEST => Status::InvalidArgument,
        StatusCode::UNAUTHORIZED => Status::Unauthenticated,
        StatusCode::FORBIDDEN => Status::PermissionDenied,
        StatusCode::NOT_FOUND => Status::NotFound,
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => Status::DeadlineExceeded,
        StatusCode::PRECONDITION_FAILED => Status::FailedPrecondition,
        StatusCode::TOO_MANY_REQUESTS => Status::ResourceExhausted,
        StatusCode::NOT_IMPLEMENTED => Status::Unimplemented,
        StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE => Status::Unavailable,
        StatusCode::INTERNAL_SERVER_ERROR => Status::Internal,
        _ => Status::Unknown,
    }
}

/// Call surface that POSTs JSON to a fixed path on the backend.
pub struct HttpCallSurface<Req, Resp> {
    client: Client<HttpConnector, Full<Bytes>>,
    uri: Uri,
    _marker: PhantomData<fn(Req) -> Resp>,
}

impl<Req, Resp> HttpCallSurface<Req, Resp> {
    /// Bind a surface to `http://{target}{path}`.
    pub fn new(target: &str, path: &str) -> Result<Self, ChannelError> {
        let uri: Uri = format!("http://{}{}", target, path).parse().map_err(
            |e: hyper::http::uri::InvalidUri| ChannelError::InvalidTarget {
                target: target.to_string(),
                reason: e.to_string(),
            },
        )?;
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Ok(Self {
            client,
            uri,
            _marker: PhantomData,
        })
    }
}

impl<Req, Resp> std::fmt::Debug for HttpCallSurface<Req, Resp> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpCallSurface")
            .field("uri", &self.uri)
            .finish()
    }
}

#[async_trait]
impl<Req, Resp> CallSurface<Req, Resp> for HttpCallSurface<Req, Resp>
where
    Req: Serialize + Send + Sync + 'static,
    Resp: DeserializeOwned + Send + Sync + 'static,
{
    async fn call(&self, request: Req) -> Result<Resp, CallFailure> {
        let body = serde_json::to_vec(&request)
            .map_err(|e| CallFailure::new(Status::Internal, format!("request encoding: {}", e)))?;

        let req = Request::builder()
            .method(Method::POST)
            .uri(self.uri.clone())
            .header(header::CONTENT_TYPE, "application/json")
            .body(Full::new(Bytes::from(body)))
            .map_err(|e| CallFailure::new(Status::Internal, format!("request build: {}", e)))?;

        let response = self
            .client
            .request(req)
            .await
            .map_err(|e| CallFailure::new(Status::Unavailable, e.to_string()))?;

        let code = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .map_err(|e| CallFailure::new(Status::Unavailable, format!("body read: {}", e)))?
            .to_bytes();

        if !code.is_success() {
            let detail = String::from_utf8_lossy(&bytes).into_owned();
            return Err(CallFailure::new(status_from_http(code), detail));
        }

        serde_json::from_slice(&bytes)
            .map_err(|e| CallFailure::new(Status::Internal, format!("response decoding: {}", e)))
    }
}

/// Factory producing an `HttpCallSurface` on the channel's target.
pub fn http_surface<Req, Resp>(path: impl Into<String>) -> SurfaceFactory<Req, Resp>
where
    Req: Serialize + Send + Sync + 'static,
    Resp: DeserializeOwned + Send + Sync + 'static,
{
    let path = path.into();
    Arc::new(move |channel| {
        let surface = HttpCallSurface::new(channel.target(), &path)?;
        Ok(Arc::new(surface) as Arc<dyn CallSurface<Req, Resp>>)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_codes_map_onto_status_vocabulary() {
        assert_eq!(
            status_from_http(StatusCode::SERVICE_UNAVAILABLE),
            Status::Unavailable
        );
        assert_eq!(
            status_from_http(StatusCode::GATEWAY_TIMEOUT),
            Status::DeadlineExceeded
        );
        assert_eq!(
            status_from_http(StatusCode::INTERNAL_SERVER_ERROR),
            Status::Internal
        );
        assert_eq!(status_from_http(StatusCode::NOT_FOUND), Status::NotFound);
        assert_eq!(status_from_http(StatusCode::IM_A_TEAPOT), Status::Unknown);
    }

    #[test]
    fn surface_rejects_unparseable_target() {
        let result = HttpCallSurface::<(), ()>::new("bad target", "/rpc");
        assert!(matches!(result, Err(ChannelError::InvalidTarget { .. })));
    }
}
