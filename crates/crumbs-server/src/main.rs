//! crumbs-server binary
//!
//! Usage: `crumbs-server [config.ron]` (default `config/server.ron`).

use crumbs_server::{handle, init_tracing, open_service, AppState, ServerConfig};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config/server.ron".to_string());

    let loaded = ServerConfig::load_optional(&config_path)?;
    let found = loaded.is_some();
    let config = loaded.unwrap_or_default();

    init_tracing(&config.log_filter);
    if found {
        info!(path = %config_path, "loaded configuration");
    } else {
        warn!(path = %config_path, "configuration file not found, using defaults");
    }

    let addr = config.listen_addr()?;
    let service = open_service(&config)?;
    let state = Arc::new(AppState::new(service, &config.cors_origin)?);

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, policy = ?config.write_policy, "listening");

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        let (stream, remote_addr) = tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok(conn) => conn,
                Err(e) => {
                    warn!(error = %e, "accept error");
                    continue;
                }
            },
            _ = &mut shutdown => {
                info!("shutting down");
                break;
            }
        };

        let state = state.clone();
        tokio::spawn(async move {
            let io = TokioIo::new(stream);
            let service = service_fn(move |req| handle(state.clone(), req));

            if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                debug!(%remote_addr, error = %e, "connection error");
            }
        });
    }

    Ok(())
}
