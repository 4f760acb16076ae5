use crate::context::Context;
use crate::error::BoxError;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// A stage of the handler chain; for a middleware, the wrapped handler is its continuation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Handler: Send + Sync {
    async fn call(&self, ctx: &mut Context) -> Result<(), BoxError>;
}

#[async_trait]
impl Handler for Box<dyn Handler> {
    async fn call(&self, ctx: &mut Context) -> Result<(), BoxError> {
        (**self).call(ctx).await
    }
}

#[async_trait]
impl<H: Handler + ?Sized> Handler for Arc<H> {
    async fn call(&self, ctx: &mut Context) -> Result<(), BoxError> {
        (**self).call(ctx).await
    }
}

/// a synchronous `Fn` holder which acts as a [`Handler`]
pub struct FnHandler<F> {
    f: F,
}

impl<F> fmt::Debug for FnHandler<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnHandler").finish_non_exhaustive()
    }
}

pub fn handler_fn<F>(f: F) -> FnHandler<F>
where
    F: Fn(&mut Context) -> Result<(), BoxError> + Send + Sync,
{
    FnHandler { f }
}

#[async_trait]
impl<F> Handler for FnHandler<F>
where
    F: Fn(&mut Context) -> Result<(), BoxError> + Send + Sync,
{
    async fn call(&self, ctx: &mut Context) -> Result<(), BoxError> {
        (self.f)(ctx)
    }
}
