//! HTTP server: route table and startup.

use std::convert::Infallible;
use std::sync::Arc;

use thiserror::Error;
use tracing::info;
use warp::http::Method;
use warp::{Filter, Rejection, Reply};

use super::error::handle_rejection;
use super::handlers::{self, ApiState, SharedState};
use crate::config::Config;
use crate::protocol::AskRequest;

/// Largest JSON body accepted by `/api/ask`.
const MAX_JSON_BYTES: u64 = 256 * 1024;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        source: warp::Error,
    },
}

fn with_state(state: SharedState) -> impl Filter<Extract = (SharedState,), Error = Infallible> + Clone {
    warp::any().map(move || Arc::clone(&state))
}

/// All API routes, without rejection handling or CORS.
///
/// Paths are matched before methods so an unknown path is a 404 rather than
/// a 405 from a sibling route.
pub fn routes(
    state: SharedState,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let max_upload = state.config.server.max_upload_bytes;

    let upload = move || {
        warp::body::content_length_limit(max_upload)
            .and(warp::multipart::form().max_length(max_upload))
    };

    let health = warp::path!("api" / "health")
        .and(warp::get())
        .and_then(handlers::health);

    let generate_quiz = warp::path!("api" / "generate-quiz")
        .and(warp::post())
        .and(with_state(state.clone()))
        .and(upload())
        .and_then(handlers::generate_quiz);

    let summarize = warp::path!("api" / "summarize")
        .and(warp::post())
        .and(with_state(state.clone()))
        .and(upload())
        .and_then(handlers::summarize);

    let process = warp::path!("api" / "process")
        .and(warp::post())
        .and(with_state(state.clone()))
        .and(upload())
        .and_then(handlers::process);

    let ask = warp::path!("api" / "ask")
        .and(warp::post())
        .and(with_state(state))
        .and(warp::body::content_length_limit(MAX_JSON_BYTES))
        .and(warp::body::json::<AskRequest>())
        .and_then(handlers::ask);

    health.or(generate_quiz).or(summarize).or(process).or(ask)
}

/// Serve the API until the process is stopped.
pub async fn run(config: Config) -> Result<(), ServerError> {
    let addr = config.server.bind;
    let cors = warp::cors()
        .allow_origin(config.server.cors_origin.as_str())
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(["content-type"]);

    info!(
        %addr,
        generator = %config.generator.program,
        ocr = %config.ocr.program,
        "starting API server"
    );

    let state = Arc::new(ApiState::new(config));
    let api = routes(state)
        .recover(handle_rejection)
        .with(cors)
        .with(warp::trace::request());

    let (bound, server) = warp::serve(api)
        .try_bind_ephemeral(addr)
        .map_err(|source| ServerError::Bind { addr, source })?;
    info!(addr = %bound, "API server listening");
    server.await;
    Ok(())
}
