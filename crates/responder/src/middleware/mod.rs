//! Composition of handler-wrapping stages.
//!
//! A [`Middleware`] wraps a [`Handler`] into another handler, the wrapped one being the
//! continuation it awaits. Stages are chained with [`MiddlewareExt::and_then`]:
//! `a.and_then(b).wrap(h)` is `b.wrap(a.wrap(h))`, so `a` runs closest to the handler.

mod composer;
mod identity;

pub use composer::MiddlewareComposer;
pub use identity::IdentityMiddleware;

use crate::handler::Handler;

pub trait Middleware {
    type Output<H>: Handler
    where
        H: Handler;

    fn wrap<H>(&self, handler: H) -> Self::Output<H>
    where
        H: Handler;
}

pub trait MiddlewareExt: Middleware {
    /// `middleware` wraps the output of `self`
    fn and_then<M: Middleware>(self, middleware: M) -> MiddlewareComposer<Self, M>
    where
        Self: Sized,
    {
        MiddlewareComposer::new(self, middleware)
    }

    /// `self` wraps the output of `middleware`
    fn compose<M: Middleware>(self, middleware: M) -> MiddlewareComposer<M, Self>
    where
        Self: Sized,
    {
        MiddlewareComposer::new(middleware, self)
    }
}

impl<T: Middleware> MiddlewareExt for T {}

#[cfg(test)]
mod tests {
    use super::{IdentityMiddleware, Middleware, MiddlewareComposer, MiddlewareExt};
    use crate::context::Context;
    use crate::error::BoxError;
    use crate::handler::{Handler, handler_fn};
    use async_trait::async_trait;
    use http::HeaderValue;

    /// Appends its tag to the `x-trace` header once the inner handler returns.
    struct Tag(&'static str);

    struct Tagged<H> {
        handler: H,
        tag: &'static str,
    }

    impl Middleware for Tag {
        type Output<H>
            = Tagged<H>
        where
            H: Handler;

        fn wrap<H>(&self, handler: H) -> Self::Output<H>
        where
            H: Handler,
        {
            Tagged { handler, tag: self.0 }
        }
    }

    #[async_trait]
    impl<H: Handler> Handler for Tagged<H> {
        async fn call(&self, ctx: &mut Context) -> Result<(), BoxError> {
            self.handler.call(ctx).await?;
            ctx.headers_mut().append("x-trace", HeaderValue::from_static(self.tag));
            Ok(())
        }
    }

    fn trace_of(ctx: &Context) -> Vec<&str> {
        ctx.headers().get_all("x-trace").iter().map(|v| v.to_str().unwrap()).collect()
    }

    #[tokio::test]
    async fn test_and_then_wraps_outside() {
        let handler = Tag("inner").and_then(Tag("outer")).wrap(handler_fn(|_| Ok(())));

        let mut ctx = Context::new();
        handler.call(&mut ctx).await.unwrap();
        assert_eq!(trace_of(&ctx), ["inner", "outer"]);
    }

    #[tokio::test]
    async fn test_compose_wraps_inside() {
        let handler = Tag("outer").compose(Tag("inner")).wrap(handler_fn(|_| Ok(())));

        let mut ctx = Context::new();
        handler.call(&mut ctx).await.unwrap();
        assert_eq!(trace_of(&ctx), ["inner", "outer"]);
    }

    #[tokio::test]
    async fn test_identity() {
        let handler = MiddlewareComposer::default().and_then(IdentityMiddleware).wrap(handler_fn(|_| Ok(())));

        let mut ctx = Context::new();
        handler.call(&mut ctx).await.unwrap();
        assert!(trace_of(&ctx).is_empty());
    }
}
