use crate::handler::Handler;
use crate::middleware::{IdentityMiddleware, Middleware};

#[derive(Debug, Clone)]
pub struct MiddlewareComposer<M1, M2> {
    inner: M1,
    outer: M2,
}

impl<M1, M2> MiddlewareComposer<M1, M2> {
    pub fn new(inner: M1, outer: M2) -> Self {
        Self { inner, outer }
    }
}

impl Default for MiddlewareComposer<IdentityMiddleware, IdentityMiddleware> {
    fn default() -> Self {
        Self::new(IdentityMiddleware, IdentityMiddleware)
    }
}

impl<M1, M2> Middleware for MiddlewareComposer<M1, M2>
where
    M1: Middleware,
    M2: Middleware,
{
    // the outer middleware wraps whatever the inner one produced
    type Output<H>
        = M2::Output<M1::Output<H>>
    where
        H: Handler;

    fn wrap<H>(&self, handler: H) -> Self::Output<H>
    where
        H: Handler,
    {
        let wrapped = self.inner.wrap(handler);
        self.outer.wrap(wrapped)
    }
}
