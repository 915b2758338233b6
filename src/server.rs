//! Housing Chart API
//! HTTP/1 service that serves chart descriptions for the housing dataset.
//!
//! Chart endpoints answer with the figure object itself. A client that expects
//! the figure wrapped in a JSON string (and calls `JSON.parse` on an already
//! decoded body) has to use the decoded body directly.

use crate::charts::{ChartBuilder, Figure, PRICE_HISTOGRAM_BINS};
use crate::data::{HousingError, HousingTable};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use serde_json::json;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

pub const HOME_TEXT: &str = "Housing Dashboard API";

/// Pause after a failed `accept` (e.g. out of file descriptors) before retrying.
const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Shared read-only state of the API.
#[derive(Debug, Clone)]
pub struct ApiState {
    housing: HousingTable,
}

impl ApiState {
    pub fn new(housing: HousingTable) -> Self {
        Self { housing }
    }

    fn price_distribution(&self) -> Result<Figure, HousingError> {
        let values = self.housing.house_values()?;
        Ok(ChartBuilder::price_histogram(&values, PRICE_HISTOGRAM_BINS))
    }

    fn scatter_plot(&self) -> Result<Figure, HousingError> {
        let groups = self.housing.proximity_groups()?;
        Ok(ChartBuilder::income_value_scatter(&groups))
    }
}

/// Response before it is turned into a hyper response.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub content_type: &'static str,
    pub body: String,
}

impl ApiResponse {
    fn text(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: "text/plain; charset=utf-8",
            body: body.into(),
        }
    }

    fn json(status: StatusCode, body: String) -> Self {
        Self {
            status,
            content_type: "application/json",
            body,
        }
    }

    fn error(status: StatusCode, message: impl std::fmt::Display) -> Self {
        Self::json(status, json!({ "error": message.to_string() }).to_string())
    }

    fn figure(result: Result<Figure, HousingError>) -> Self {
        match result.map(|fig| fig.to_json()) {
            Ok(Ok(body)) => Self::json(StatusCode::OK, body),
            Ok(Err(e)) => {
                error!("Failed to serialize chart: {e}");
                Self::error(StatusCode::INTERNAL_SERVER_ERROR, e)
            }
            Err(e) => {
                error!("Failed to compute chart: {e}");
                Self::error(StatusCode::INTERNAL_SERVER_ERROR, e)
            }
        }
    }

    pub fn into_response(self) -> Response<Full<Bytes>> {
        let mut response = Response::new(Full::new(Bytes::from(self.body)));
        *response.status_mut() = self.status;
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static(self.content_type));
        response
    }
}

/// Dispatch a request line to its handler. Every chart is recomputed from
/// the full dataset on each call.
pub fn route(state: &ApiState, method: &Method, path: &str) -> ApiResponse {
    let known = matches!(path, "/" | "/api/price_distribution" | "/api/scatter_plot");
    if !known {
        return ApiResponse::error(StatusCode::NOT_FOUND, format!("no route for {path}"));
    }
    if method != Method::GET {
        return ApiResponse::error(
            StatusCode::METHOD_NOT_ALLOWED,
            format!("{method} not allowed on {path}"),
        );
    }

    match path {
        "/api/price_distribution" => ApiResponse::figure(state.price_distribution()),
        "/api/scatter_plot" => ApiResponse::figure(state.scatter_plot()),
        _ => ApiResponse::text(StatusCode::OK, HOME_TEXT),
    }
}

async fn handle<B>(
    state: Arc<ApiState>,
    req: Request<B>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let response = route(&state, req.method(), req.uri().path());
    debug!(
        "{} {} -> {}",
        req.method(),
        req.uri().path(),
        response.status
    );
    Ok(response.into_response())
}

/// Accept connections until the listener fails.
pub async fn serve(listener: TcpListener, state: Arc<ApiState>) -> std::io::Result<()> {
    info!("Housing API listening on {}", listener.local_addr()?);

    loop {
        let (stream, peer_addr) = match listener.accept().await {
            Ok(conn) => conn,
            Err(e) => {
                error!("Failed to accept connection: {e}");
                tokio::time::sleep(ACCEPT_RETRY_DELAY).await;
                continue;
            }
        };
        debug!("New connection from {peer_addr}");

        let state = Arc::clone(&state);
        tokio::spawn(async move {
            let service = service_fn(move |req| handle(Arc::clone(&state), req));
            if let Err(e) = http1::Builder::new()
                .serve_connection(TokioIo::new(stream), service)
                .await
            {
                error!("Connection error from {peer_addr}: {e}");
            }
        });
    }
}

/// Bind `addr` and serve the API.
pub async fn run(addr: SocketAddr, state: ApiState) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    serve(listener, Arc::new(state)).await
}
