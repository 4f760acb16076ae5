//! The per-request response state shared along the handler chain.
//!
//! A [`Context`] is created once per inbound request, passed as `&mut` through every
//! [`Handler`](crate::Handler), and finally turned into an [`http::Response`] by
//! [`Context::into_response`].

use crate::body::{Body, ResponseBody};
use bytes::Bytes;
use http::header::{AsHeaderName, IntoHeaderName};
use http::{HeaderMap, HeaderValue, Response, StatusCode};
use http_body_util::{BodyExt, Empty, Full};

/// The in-progress response of a single request.
#[derive(Debug, Default)]
pub struct Context {
    body: Body,
    body_buffer: Option<Bytes>,
    status: Option<StatusCode>,
    headers: HeaderMap,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn set_body(&mut self, body: impl Into<Body>) {
        self.body = body.into();
    }

    /// Returns true if the body will be streamed by the transport rather than buffered.
    #[inline]
    pub fn is_stream_body(&self) -> bool {
        self.body.is_stream()
    }

    /// The finalized bytes, `None` until some stage has produced them.
    #[inline]
    pub fn body_buffer(&self) -> Option<&Bytes> {
        self.body_buffer.as_ref()
    }

    pub fn set_body_buffer(&mut self, bytes: Bytes) {
        self.body_buffer = Some(bytes);
    }

    /// The response status, `None` while unset.
    #[inline]
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = Some(status);
    }

    #[inline]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    #[inline]
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    pub fn get_header<K: AsHeaderName>(&self, name: K) -> Option<&HeaderValue> {
        self.headers.get(name)
    }

    /// Sets a header, replacing any previous values with the same name.
    pub fn set_header<K: IntoHeaderName>(&mut self, name: K, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    /// Responds `200 OK` with the given body.
    pub fn ok(&mut self, body: impl Into<Body>) {
        self.set_status(StatusCode::OK);
        self.set_body(body);
    }

    /// Responds `201 Created` with the given body.
    pub fn created(&mut self, body: impl Into<Body>) {
        self.set_status(StatusCode::CREATED);
        self.set_body(body);
    }

    /// Responds `204 No Content` and drops any body set so far.
    pub fn no_content(&mut self) {
        self.set_status(StatusCode::NO_CONTENT);
        self.body = Body::Absent;
    }

    /// Converts the context into a response for the transport.
    ///
    /// A finalized buffer wins over the body; a stream body is passed through untouched and
    /// any other unfinalized body is dropped. An unset status becomes `200 OK`.
    pub fn into_response(self) -> Response<ResponseBody> {
        let body: ResponseBody = match (self.body_buffer, self.body) {
            (Some(bytes), _) => Full::new(bytes).map_err(Into::into).boxed_unsync(),
            (None, Body::Stream(stream)) => stream,
            (None, _) => Empty::new().map_err(Into::into).boxed_unsync(),
        };

        let mut response = Response::new(body);
        *response.status_mut() = self.status.unwrap_or(StatusCode::OK);
        *response.headers_mut() = self.headers;
        response
    }
}
