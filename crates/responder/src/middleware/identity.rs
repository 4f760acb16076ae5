use crate::handler::Handler;
use crate::middleware::Middleware;

#[derive(Default, Clone, Copy, Debug)]
pub struct IdentityMiddleware;

impl Middleware for IdentityMiddleware {
    type Output<H>
        = H
    where
        H: Handler;

    #[inline(always)]
    fn wrap<H>(&self, handler: H) -> Self::Output<H>
    where
        H: Handler,
    {
        handler
    }
}
