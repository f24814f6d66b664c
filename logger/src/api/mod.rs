use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    body::{Body, BoxBody},
    http::{header, Method, Request, Response},
    routing::get,
    Router, Server,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{debug, debug_span, field, info, Span};

use crate::dal::Dal;

mod handlers;

pub type DalState = Arc<dyn Dal>;

pub fn make_router<D>(dal: D) -> Router
where
    D: Dal + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .route(
            "/api/logs",
            get(handlers::get_logs).post(handlers::create_log),
        )
        .route(
            "/api/logs/:id",
            get(handlers::get_log).delete(handlers::delete_log),
        )
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    debug_span!(
                        "request",
                        http.uri = %request.uri(),
                        http.method = %request.method(),
                        http.status_code = field::Empty,
                    )
                })
                .on_response(
                    |response: &Response<BoxBody>, latency: Duration, span: &Span| {
                        span.record("http.status_code", response.status().as_u16());
                        debug!(
                            latency = format_args!("{} ns", latency.as_nanos()),
                            "finished processing request"
                        );
                    },
                ),
        )
        .with_state(Arc::new(dal) as DalState)
}

/// Serve the HTTP API until the server fails
pub async fn serve(router: Router, address: SocketAddr) -> Result<(), hyper::Error> {
    info!(%address, "binding HTTP API");

    Server::try_bind(&address)?
        .serve(router.into_make_service())
        .await
}
