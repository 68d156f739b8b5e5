// src/server/mod.rs

//! Static HTTP server for the output directory.
//!
//! The router serves whatever is currently in the output directory; it holds
//! no state of its own. Middleware, outermost first: access log, security
//! headers, CORS, compression.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use axum::Router;
use axum::extract::Request;
use axum::http::header;
use axum::middleware::{self, Next};
use axum::response::Response;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::{info, warn};

use crate::errors::Result;

pub mod headers;

/// Where and what to serve.
#[derive(Debug, Clone)]
pub struct ServerOptions {
    pub host: String,
    pub port: u16,
    /// Directory exposed at `/`.
    pub root: PathBuf,
    /// File answered for `/favicon.ico`.
    pub favicon: PathBuf,
}

/// Build the complete router with static files and middleware.
pub fn build_router(options: &ServerOptions) -> Router {
    let mut app = Router::new()
        .route_service("/favicon.ico", ServeFile::new(&options.favicon))
        .fallback_service(ServeDir::new(&options.root).append_index_html_on_directories(true))
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive());

    for (name, value) in headers::security_headers() {
        app = app.layer(SetResponseHeaderLayer::if_not_present(name, value));
    }

    app.layer(middleware::from_fn(access_log))
}

/// A bound, not yet running HTTP server.
///
/// Binding is separate from serving so that an unusable address is reported
/// at start-up, before the first rebuild.
#[derive(Debug)]
pub struct Server {
    listener: TcpListener,
    app: Router,
    root: PathBuf,
}

impl Server {
    /// Bind `host:port` and prepare the router. Port 0 picks a free port.
    pub async fn bind(options: &ServerOptions) -> Result<Self> {
        if !options.favicon.is_file() {
            warn!(favicon = ?options.favicon, "favicon not found; /favicon.ico will 404");
        }

        let addr = format!("{}:{}", options.host, options.port);
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("binding HTTP server to {addr}"))?;

        Ok(Self {
            listener,
            app: build_router(options),
            root: options.root.clone(),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve until `shutdown` turns `true`.
    pub async fn run(self, shutdown: watch::Receiver<bool>) -> Result<()> {
        let local = self.local_addr()?;
        info!(root = ?self.root, "listening on http://{local}");

        axum::serve(self.listener, self.app)
            .with_graceful_shutdown(async move {
                let mut rx = shutdown;
                while !*rx.borrow() {
                    if rx.changed().await.is_err() {
                        break;
                    }
                }
            })
            .await?;

        info!("HTTP server stopped");
        Ok(())
    }
}

/// One line per request: `METHOD URI STATUS ELAPSED ms - LENGTH`.
async fn access_log(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let started = Instant::now();

    let response = next.run(req).await;

    let elapsed = started.elapsed().as_secs_f64() * 1000.0;
    let length = response
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();
    info!(
        target: "specwatch::access",
        "{} {} {} {:.3} ms - {}",
        method,
        uri,
        response.status().as_u16(),
        elapsed,
        length
    );

    response
}
