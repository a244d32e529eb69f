//! Listening loop with cancellation-driven graceful shutdown.

use axum::Router;
use std::io;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

/// Serve `router` on `listener` until `shutdown` is cancelled.
///
/// After cancellation no new connections are accepted and in-flight requests
/// get `grace` to finish. After that the server task is aborted and this returns;
/// leftover connection tasks end when the runtime is dropped.
pub async fn serve(
    listener: TcpListener,
    router: Router,
    shutdown: CancellationToken,
    grace: Duration,
) -> io::Result<()> {
    let token = shutdown.clone();
    let server = axum::serve(listener, router).with_graceful_shutdown(async move { token.cancelled().await });
    let mut task = tokio::spawn(async move { server.await });

    tokio::select! {
        joined = &mut task => return flatten(joined),
        _ = shutdown.cancelled() => {}
    }

    tracing::info!(grace_secs = grace.as_secs(), "shutting down the server");
    match tokio::time::timeout(grace, &mut task).await {
        Ok(joined) => {
            tracing::info!("server shut down");
            flatten(joined)
        }
        Err(_) => {
            tracing::warn!("shutdown grace period elapsed, aborting in-flight requests");
            task.abort();
            Ok(())
        }
    }
}

fn flatten(joined: Result<io::Result<()>, tokio::task::JoinError>) -> io::Result<()> {
    joined.map_err(io::Error::other)?
}

/// Resolves on Ctrl+C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::get;

    #[tokio::test]
    async fn returns_after_cancellation() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let router = Router::new().route("/", get(|| async { "ok" }));
        let token = CancellationToken::new();
        let handle = tokio::spawn(serve(listener, router, token.clone(), Duration::from_secs(1)));
        token.cancel();
        let res = tokio::time::timeout(Duration::from_secs(5), handle).await.unwrap().unwrap();
        assert!(res.is_ok());
    }

    #[tokio::test]
    async fn aborts_requests_that_outlive_the_grace_period() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let router = Router::new().route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                "late"
            }),
        );
        let token = CancellationToken::new();
        let handle = tokio::spawn(serve(listener, router, token.clone(), Duration::from_millis(200)));

        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        tokio::io::AsyncWriteExt::write_all(
            &mut stream,
            b"GET /slow HTTP/1.1\r\nHost: localhost\r\n\r\n",
        )
        .await
        .unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;

        token.cancel();
        let res = tokio::time::timeout(Duration::from_secs(5), handle).await.unwrap().unwrap();
        assert!(res.is_ok());
    }
}
