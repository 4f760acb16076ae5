//! The response finalization stage.
//!
//! [`Responder`] runs after the rest of the chain has returned and turns the body left in the
//! [`Context`] into bytes: text and raw bytes are used as they are, structured values go through
//! the configured [`Marshal`]. It fills in a content type when none was set, and defaults the
//! status to `200 OK`. Contexts that already carry a body buffer, and stream bodies, are left
//! alone.

use crate::body::{Body, StructuredValue};
use crate::context::Context;
use crate::error::{BoxError, ErrorFormat, HttpError, ResponderError};
use crate::handler::Handler;
use crate::marshal::{FastestJson, Marshal, StandardJson, marshal_fn};
use crate::middleware::Middleware;
use async_trait::async_trait;
use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{HeaderValue, StatusCode};
use mime::Mime;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, trace};

/// Decides per request whether the responder is bypassed.
pub type Skipper = Arc<dyn Fn(&Context) -> bool + Send + Sync>;

#[derive(Clone)]
pub struct Responder {
    skipper: Option<Skipper>,
    marshal: Arc<dyn Marshal>,
    content_type: HeaderValue,
    text_content_type: HeaderValue,
    binary_content_type: HeaderValue,
    error_format: ErrorFormat,
}

impl fmt::Debug for Responder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Responder")
            .field("skipper", &self.skipper.is_some())
            .field("content_type", &self.content_type)
            .field("error_format", &self.error_format)
            .finish_non_exhaustive()
    }
}

impl Default for Responder {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// What the body turned into.
enum Encoded {
    Empty,
    Ready { bytes: Bytes, content_type: HeaderValue },
    Failed { error: HttpError },
}

impl Responder {
    pub fn builder() -> ResponderBuilder {
        ResponderBuilder::new()
    }

    /// Runs `next`, then finalizes whatever it left in `ctx`.
    ///
    /// Errors from `next` are returned untouched. A context with neither a status nor a body
    /// fails with an [`HttpError`] built from [`ResponderError::InvalidResponse`]. A failing
    /// marshal does not fail the call: the error is rendered into a `500` response instead.
    pub async fn finalize(&self, ctx: &mut Context, next: &dyn Handler) -> Result<(), BoxError> {
        if self.skipper.as_ref().is_some_and(|skip| skip(ctx)) {
            trace!("responder skipped");
            return next.call(ctx).await;
        }

        next.call(ctx).await?;

        if ctx.body_buffer().is_some() {
            trace!("body buffer already set, skip finalizing");
            return Ok(());
        }

        if ctx.status().is_none() && ctx.body().is_absent() {
            return Err(Box::new(HttpError::from(ResponderError::InvalidResponse)));
        }

        if ctx.is_stream_body() {
            trace!("stream body will be written by the transport");
            return Ok(());
        }

        let had_content_type = ctx.get_header(CONTENT_TYPE).is_some_and(|value| !value.is_empty());

        let (buffer, status) = match self.encode(ctx.body()) {
            Encoded::Empty => (None, ctx.status().unwrap_or(StatusCode::OK)),
            Encoded::Ready { bytes, content_type } => {
                if !had_content_type {
                    ctx.set_header(CONTENT_TYPE, content_type);
                }
                (Some(bytes), ctx.status().unwrap_or(StatusCode::OK))
            }
            Encoded::Failed { error } => {
                error!(cause = %error.message(), "marshal structured body failed");
                let (content_type, bytes) = error.render(self.error_format);
                if !had_content_type {
                    ctx.set_header(CONTENT_TYPE, content_type);
                }
                (Some(bytes), error.status())
            }
        };

        let body_len = buffer.as_ref().map_or(0, Bytes::len);
        debug!(status = status.as_u16(), body_len, "response finalized");

        if let Some(bytes) = buffer {
            ctx.set_body_buffer(bytes);
        }
        ctx.set_status(status);
        Ok(())
    }

    fn encode(&self, body: &Body) -> Encoded {
        match body {
            Body::Absent => Encoded::Empty,
            Body::Text(text) => Encoded::Ready {
                bytes: Bytes::copy_from_slice(text.as_bytes()),
                content_type: self.text_content_type.clone(),
            },
            Body::Bytes(bytes) => {
                Encoded::Ready { bytes: bytes.clone(), content_type: self.binary_content_type.clone() }
            }
            Body::Structured(value) => match self.marshal.marshal(&**value) {
                Ok(bytes) => Encoded::Ready { bytes, content_type: self.content_type.clone() },
                Err(e) => Encoded::Failed { error: ResponderError::encoding(e).into() },
            },
            // streams return before encoding
            Body::Stream(_) => Encoded::Empty,
        }
    }
}

/// Builder of [`Responder`], every option has a default.
pub struct ResponderBuilder {
    skipper: Option<Skipper>,
    marshal: Arc<dyn Marshal>,
    content_type: Mime,
    error_format: ErrorFormat,
}

impl fmt::Debug for ResponderBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponderBuilder")
            .field("content_type", &self.content_type)
            .field("error_format", &self.error_format)
            .finish_non_exhaustive()
    }
}

impl ResponderBuilder {
    fn new() -> Self {
        Self {
            skipper: None,
            marshal: Arc::new(StandardJson),
            content_type: mime::APPLICATION_JSON,
            error_format: ErrorFormat::Text,
        }
    }

    #[must_use]
    pub fn skipper<F>(mut self, skipper: F) -> Self
    where
        F: Fn(&Context) -> bool + Send + Sync + 'static,
    {
        self.skipper = Some(Arc::new(skipper));
        self
    }

    /// Marshal structured bodies with [`FastestJson`].
    #[must_use]
    pub fn fastest(self) -> Self {
        self.marshal(FastestJson::new())
    }

    #[must_use]
    pub fn marshal<M: Marshal + 'static>(mut self, marshal: M) -> Self {
        self.marshal = Arc::new(marshal);
        self
    }

    #[must_use]
    pub fn marshal_fn<F>(self, f: F) -> Self
    where
        F: Fn(&StructuredValue) -> Result<Bytes, BoxError> + Send + Sync + 'static,
    {
        self.marshal(marshal_fn(f))
    }

    /// Content type of marshaled bodies, `application/json` by default.
    #[must_use]
    pub fn content_type(mut self, content_type: Mime) -> Self {
        self.content_type = content_type;
        self
    }

    #[must_use]
    pub fn error_format(mut self, error_format: ErrorFormat) -> Self {
        self.error_format = error_format;
        self
    }

    pub fn build(self) -> Responder {
        Responder {
            skipper: self.skipper,
            marshal: self.marshal,
            content_type: crate::mime_header(&self.content_type),
            text_content_type: crate::mime_header(&mime::TEXT_PLAIN_UTF_8),
            binary_content_type: crate::mime_header(&mime::APPLICATION_OCTET_STREAM),
            error_format: self.error_format,
        }
    }
}

/// A handler finalized by a [`Responder`].
#[derive(Debug)]
pub struct ResponderHandler<H> {
    handler: H,
    responder: Responder,
}

impl Middleware for Responder {
    type Output<H>
        = ResponderHandler<H>
    where
        H: Handler;

    fn wrap<H>(&self, handler: H) -> Self::Output<H>
    where
        H: Handler,
    {
        ResponderHandler { handler, responder: self.clone() }
    }
}

#[async_trait]
impl<H: Handler> Handler for ResponderHandler<H> {
    async fn call(&self, ctx: &mut Context) -> Result<(), BoxError> {
        self.responder.finalize(ctx, &self.handler).await
    }
}
