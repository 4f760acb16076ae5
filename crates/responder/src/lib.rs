//! The response finalization stage of a micro web pipeline.
//!
//! Upstream handlers leave a [`Body`] in the per-request [`Context`]: text, raw bytes, a
//! serializable value or a stream. The [`Responder`] runs after them and turns that body into
//! the bytes, content type and status code the transport writes out.
//!
//! # Example
//!
//! ```no_run
//! use micro_responder::{Body, Context, ErrorRenderer, Handler, Middleware, MiddlewareExt, Responder, handler_fn};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct User {
//!     name: &'static str,
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let handler = Responder::builder()
//!         .fastest()
//!         .build()
//!         .and_then(ErrorRenderer::default())
//!         .wrap(handler_fn(|ctx| {
//!             ctx.created(Body::json(User { name: "tree.xie" }));
//!             Ok(())
//!         }));
//!
//!     let mut ctx = Context::new();
//!     handler.call(&mut ctx).await.expect("errors are rendered into the context");
//!
//!     let response = ctx.into_response();
//!     assert_eq!(response.status(), http::StatusCode::CREATED);
//! }
//! ```
//!
//! # Finalization rules
//!
//! - errors returned by the downstream chain are passed through untouched
//! - a context whose body buffer is already set is left alone
//! - a context with neither a status nor a body is an invalid response, reported as an
//!   [`HttpError`] tagged with [`ERROR_CATEGORY`]
//! - stream bodies are handed to the transport as they are
//! - text is served as `text/plain`, bytes as `application/octet-stream`, structured values
//!   through the configured [`Marshal`] (JSON by default) as `application/json`
//! - a content type set upstream is never overwritten
//! - a value the marshal rejects becomes a `500` response describing the failure
//! - an unset status becomes `200 OK`

mod body;
mod context;
mod error;
mod handler;
mod marshal;
mod render;
mod responder;

pub mod middleware;

pub use body::{Body, ResponseBody, StructuredValue};
pub use context::Context;
pub use error::{BoxError, ERROR_CATEGORY, ErrorFormat, HttpError, ResponderError};
pub use handler::{FnHandler, Handler, handler_fn};
pub use marshal::{FastestJson, Marshal, MarshalFn, StandardJson, marshal_fn};
pub use middleware::{Middleware, MiddlewareExt};
pub use render::{ErrorRenderer, ErrorRendererHandler};
pub use responder::{Responder, ResponderBuilder, ResponderHandler, Skipper};

use http::HeaderValue;
use mime::Mime;

/// Converts a parsed mime into a header value.
pub(crate) fn mime_header(mime: &Mime) -> HeaderValue {
    // a parsed mime only holds visible ASCII, which is always a valid header value
    HeaderValue::from_str(mime.as_ref()).unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"))
}
