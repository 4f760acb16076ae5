//! Turns errors propagated along the chain into responses.

use crate::context::Context;
use crate::error::{BoxError, ErrorFormat, HttpError};
use crate::handler::Handler;
use crate::middleware::Middleware;
use async_trait::async_trait;
use http::header::CONTENT_TYPE;
use tracing::{error, warn};

/// Renders any error returned by the wrapped handler into the context.
///
/// Errors that already are [`HttpError`]s keep their status and category; anything else
/// becomes an unexpected `500` error. The rendered response replaces whatever content type the
/// failed handler may have set.
#[derive(Debug, Default, Copy, Clone)]
pub struct ErrorRenderer {
    format: ErrorFormat,
}

impl ErrorRenderer {
    pub fn new(format: ErrorFormat) -> Self {
        Self { format }
    }

    pub fn render(&self, ctx: &mut Context, e: BoxError) {
        let http_error = HttpError::from_boxed(e);
        if http_error.is_exception() {
            error!(status = http_error.status().as_u16(), cause = %http_error, "request failed");
        } else {
            warn!(status = http_error.status().as_u16(), cause = %http_error, "request rejected");
        }

        let (content_type, bytes) = http_error.render(self.format);
        ctx.set_header(CONTENT_TYPE, content_type);
        ctx.set_status(http_error.status());
        ctx.set_body_buffer(bytes);
    }
}

#[derive(Debug)]
pub struct ErrorRendererHandler<H> {
    handler: H,
    renderer: ErrorRenderer,
}

impl Middleware for ErrorRenderer {
    type Output<H>
        = ErrorRendererHandler<H>
    where
        H: Handler;

    fn wrap<H>(&self, handler: H) -> Self::Output<H>
    where
        H: Handler,
    {
        ErrorRendererHandler { handler, renderer: *self }
    }
}

#[async_trait]
impl<H: Handler> Handler for ErrorRendererHandler<H> {
    async fn call(&self, ctx: &mut Context) -> Result<(), BoxError> {
        if let Err(e) = self.handler.call(ctx).await {
            self.renderer.render(ctx, e);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::ErrorRenderer;
    use crate::context::Context;
    use crate::error::{ErrorFormat, HttpError};
    use crate::handler::{Handler, handler_fn};
    use crate::middleware::{Middleware, MiddlewareExt};
    use crate::responder::Responder;
    use http::header::CONTENT_TYPE;
    use http::{HeaderValue, StatusCode};

    #[tokio::test]
    async fn test_invalid_response_is_rendered() {
        let handler = Responder::default().and_then(ErrorRenderer::default()).wrap(handler_fn(|_| Ok(())));

        let mut ctx = Context::new();
        handler.call(&mut ctx).await.unwrap();

        assert_eq!(ctx.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
        assert_eq!(ctx.body_buffer().unwrap(), "category=micro-responder, message=invalid response");
        assert_eq!(ctx.get_header(CONTENT_TYPE).unwrap(), "text/plain; charset=utf-8");
    }

    #[tokio::test]
    async fn test_http_error_as_json() {
        let handler = ErrorRenderer::new(ErrorFormat::Json).wrap(handler_fn(|ctx| {
            ctx.set_header(CONTENT_TYPE, HeaderValue::from_static("text/html"));
            Err(HttpError::new(StatusCode::BAD_REQUEST, "name is required").category("user").into())
        }));

        let mut ctx = Context::new();
        handler.call(&mut ctx).await.unwrap();

        assert_eq!(ctx.status(), Some(StatusCode::BAD_REQUEST));
        assert_eq!(ctx.body_buffer().unwrap(), r#"{"statusCode":400,"category":"user","message":"name is required"}"#);
        assert_eq!(ctx.get_header(CONTENT_TYPE).unwrap(), "application/json");
    }

    #[tokio::test]
    async fn test_plain_error_becomes_exception() {
        let handler = ErrorRenderer::default().wrap(handler_fn(|_| Err("connection refused".into())));

        let mut ctx = Context::new();
        handler.call(&mut ctx).await.unwrap();

        assert_eq!(ctx.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
        assert_eq!(ctx.body_buffer().unwrap(), "message=connection refused");
    }

    #[tokio::test]
    async fn test_success_is_untouched() {
        let handler = Responder::default().and_then(ErrorRenderer::default()).wrap(handler_fn(|ctx| {
            ctx.set_body("abc");
            Ok(())
        }));

        let mut ctx = Context::new();
        handler.call(&mut ctx).await.unwrap();

        assert_eq!(ctx.status(), Some(StatusCode::OK));
        assert_eq!(ctx.body_buffer().unwrap(), "abc");
    }
}
