use std::{convert::Infallible, path::PathBuf};

use context::ServerContextRef;
use warp::{reject::Rejection, Filter, Reply};

pub mod config;
pub mod context;
pub mod handler;
pub mod proxy;
pub mod ws;

pub type Result<T> = std::result::Result<T, Rejection>;

/// WebSocket upgrade on `/`, a health check on `/health`, and the browser
/// client from `public_dir` for everything else.
pub fn routes(context_ref: ServerContextRef, public_dir: PathBuf) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let ws_route = warp::path::end()
        .and(warp::ws())
        .and(with_context(context_ref))
        .and_then(handler::ws_handler);

    let health_route = warp::path("health")
        .and(warp::path::end())
        .and_then(handler::health_handler);

    ws_route.or(health_route).or(warp::fs::dir(public_dir))
}

fn with_context(context_ref: ServerContextRef) -> impl Filter<Extract = (ServerContextRef,), Error = Infallible> + Clone {
    warp::any().map(move || context_ref.clone())
}
