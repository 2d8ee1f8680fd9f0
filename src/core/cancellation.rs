use std::future::Future;

use tokio::signal;
use tokio_util::sync::CancellationToken;

use crate::core::error::{AppError, Result};

/// Root token for the whole server; cancelled when shutdown begins.
///
/// Installed as a request extension so [`RequestCancellation`] can derive a
/// child token for every request.
///
/// [`RequestCancellation`]: crate::core::extractor::RequestCancellation
#[derive(Debug, Clone, Default)]
pub struct ShutdownToken(CancellationToken);

impl ShutdownToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn child_token(&self) -> CancellationToken {
        self.0.child_token()
    }

    pub fn cancel(&self) {
        self.0.cancel();
    }
}

/// Fail fast when the caller has already given up.
pub fn ensure_active(ct: &CancellationToken) -> Result<()> {
    if ct.is_cancelled() {
        return Err(AppError::Cancelled);
    }
    Ok(())
}

/// Drive a store future to completion unless `ct` fires first.
///
/// The token is checked before the future is polled, so a request that was
/// cancelled while queued never reaches the database.
pub async fn run_cancellable<T, E, F>(ct: &CancellationToken, fut: F) -> Result<T>
where
    F: Future<Output = std::result::Result<T, E>>,
    AppError: From<E>,
{
    ensure_active(ct)?;

    tokio::select! {
        biased;
        _ = ct.cancelled() => Err(AppError::Cancelled),
        res = fut => res.map_err(AppError::from),
    }
}

/// Resolves on Ctrl+C or SIGTERM and cancels `shutdown` so in-flight store
/// work stops promptly.
pub async fn shutdown_signal(shutdown: ShutdownToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, shutting down gracefully");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, shutting down gracefully");
        },
    }

    shutdown.cancel();
}
