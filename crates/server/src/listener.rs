//! TCP and unix-domain listeners with graceful shutdown

use authgate_config::{ServiceConfig, SocketType};
use authgate_core::{Error, Result};
use axum::Router;
use std::future::Future;
use std::net::SocketAddr;
use std::os::unix::fs::FileTypeExt;
use std::path::{Path, PathBuf};
use tokio::net::{TcpListener, UnixListener};

/// Where to accept connections
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Tcp(String),
    Unix(PathBuf),
}

impl Endpoint {
    pub fn from_config(config: &ServiceConfig) -> Self {
        match config.socket_type {
            SocketType::Tcp => Endpoint::Tcp(config.socket_path.clone()),
            SocketType::Unix => Endpoint::Unix(PathBuf::from(&config.socket_path)),
        }
    }

    fn socket_type(&self) -> &'static str {
        match self {
            Endpoint::Tcp(_) => "tcp",
            Endpoint::Unix(_) => "unix",
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Endpoint::Tcp(addr) => f.write_str(addr),
            Endpoint::Unix(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Serve `app` until `shutdown` resolves
pub async fn serve<F>(endpoint: &Endpoint, app: Router, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    match endpoint {
        Endpoint::Tcp(addr) => {
            let listener = TcpListener::bind(addr.as_str())
                .await
                .map_err(|e| Error::network(addr.as_str(), format!("bind failed: {e}")))?;
            log_started(endpoint);

            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| Error::network(addr.as_str(), e.to_string()))
        }
        Endpoint::Unix(path) => {
            let listener = bind_unix(path)?;
            log_started(endpoint);

            let served = axum::serve(listener, app.into_make_service())
                .with_graceful_shutdown(shutdown)
                .await
                .map_err(|e| Error::network(path.display().to_string(), e.to_string()));

            if let Err(e) = std::fs::remove_file(path) {
                tracing::warn!(socket_path = %path.display(), error = %e, "could not remove socket");
            }
            served
        }
    }
}

fn bind_unix(path: &Path) -> Result<UnixListener> {
    // Only a leftover socket is replaced; any other file is kept
    match std::fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_socket() => {
            std::fs::remove_file(path)
                .map_err(|e| Error::file_system(path, "remove stale socket", e))?;
        }
        Ok(_) => {
            return Err(Error::configuration(format!(
                "socket_path '{}' exists and is not a socket",
                path.display()
            )));
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(Error::file_system(path, "inspect socket path", e)),
    }

    let listener = UnixListener::bind(path)
        .map_err(|e| Error::file_system(path, "bind socket", e))?;

    // The proxy's worker user must be able to connect
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o777))
        .map_err(|e| Error::file_system(path, "chmod socket", e))?;

    Ok(listener)
}

/// Logged at warn so the line shows up at every verbosity
fn log_started(endpoint: &Endpoint) {
    tracing::warn!(
        socket_type = endpoint.socket_type(),
        socket_path = %endpoint,
        "Server started"
    );
}

/// Resolves on SIGINT or SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "could not listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "could not listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown requested");
}
