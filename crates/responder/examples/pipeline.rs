use http::StatusCode;
use http_body_util::BodyExt;
use micro_responder::{
    Body, BoxError, Context, ErrorFormat, ErrorRenderer, Handler, HttpError, Middleware, MiddlewareExt, Responder,
    handler_fn,
};
use serde::Serialize;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

#[derive(Serialize)]
struct Book {
    title: &'static str,
    pages: u32,
}

fn route(ctx: &mut Context, path: &str) -> Result<(), BoxError> {
    match path {
        "/text" => ctx.set_body("hello world"),
        "/book" => ctx.created(Body::json(Book { title: "the rust book", pages: 560 })),
        "/empty" => ctx.no_content(),
        "/missing" => return Err(HttpError::new(StatusCode::NOT_FOUND, "no such book").category("library").into()),
        // neither status nor body: an invalid response
        _ => {}
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::TRACE).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let middleware = Responder::builder().fastest().build().and_then(ErrorRenderer::new(ErrorFormat::Json));

    for path in ["/text", "/book", "/empty", "/missing", "/broken"] {
        let handler = middleware.wrap(handler_fn(move |ctx| route(ctx, path)));

        let mut ctx = Context::new();
        if let Err(e) = handler.call(&mut ctx).await {
            info!(path, cause = %e, "unhandled error");
            continue;
        }

        let response = ctx.into_response();
        let status = response.status();
        let content_type = response.headers().get(http::header::CONTENT_TYPE).cloned();
        let body = match response.into_body().collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) => {
                info!(path, cause = %e, "read body error");
                continue;
            }
        };
        info!(path, %status, ?content_type, body = %String::from_utf8_lossy(&body), "responded");
    }
}
