//! Axum web server: the plain-text endpoints polled by the game process.

pub mod check;
pub mod delivery;
pub mod hint;
pub mod routes;

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::routing::get;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;

use crate::actors::Actor;
use crate::bus::BusSender;
use crate::state::BridgeState;

const BIND_RETRY: Duration = Duration::from_secs(3);

/// Shared state for the web layer.
pub struct WebState {
    pub root: Arc<BridgeState>,
    pub sender: BusSender,
    pub addr: SocketAddr,
    pub request_count: AtomicU64,
}

impl WebState {
    pub fn new(root: Arc<BridgeState>, sender: BusSender, addr: SocketAddr) -> Self {
        Self {
            root,
            sender,
            addr,
            request_count: AtomicU64::new(0),
        }
    }
}

pub fn router(state: Arc<WebState>) -> Router {
    let counter_state = Arc::clone(&state);
    let count_middleware = axum::middleware::from_fn(move |req, next: axum::middleware::Next| {
        let st = Arc::clone(&counter_state);
        async move {
            st.request_count.fetch_add(1, Ordering::Relaxed);
            next.run(req).await
        }
    });

    Router::new()
        .route("/Tick/Strategy/{count}", get(routes::get_tick_strategy))
        .route("/Tick/Tactical/{count}", get(routes::get_tick_tactical))
        .route("/Check/{*names}", get(routes::get_check))
        .route("/Hint/{*names}", get(routes::get_hint))
        .layer(count_middleware)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// WebActor: wraps the axum web server as a normal actor
// ---------------------------------------------------------------------------

/// Web server actor. Stopping it asks axum to shut down gracefully, so
/// in-flight requests complete before the task ends.
pub struct WebActor {
    addr: SocketAddr,
    shutdown_tx: Mutex<Option<oneshot::Sender<()>>>,
}

impl WebActor {
    pub fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            shutdown_tx: Mutex::new(None),
        }
    }
}

impl Actor for WebActor {
    fn start(&self, state: Arc<BridgeState>, sender: BusSender) -> JoinHandle<()> {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        *self.shutdown_tx.lock().unwrap_or_else(|e| e.into_inner()) = Some(shutdown_tx);
        let web = Arc::new(WebState::new(state, sender, self.addr));
        tokio::spawn(run(web, shutdown_rx))
    }

    fn stop(&self, _handle: &JoinHandle<()>) {
        if let Some(tx) = self
            .shutdown_tx
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
        {
            let _ = tx.send(());
        }
    }
}

/// Run the web server until the shutdown signal.
async fn run(state: Arc<WebState>, mut shutdown_rx: oneshot::Receiver<()>) {
    let addr = state.addr;

    // Retry bind until success or shutdown
    let listener = loop {
        match tokio::net::TcpListener::bind(addr).await {
            Ok(l) => break l,
            Err(e) => {
                tracing::warn!("web server: failed to bind {addr}: {e}, retrying in 3s");
                tokio::select! {
                    _ = tokio::time::sleep(BIND_RETRY) => continue,
                    _ = &mut shutdown_rx => return,
                }
            }
        }
    };

    tracing::info!("web server listening on {addr}");
    let app = router(Arc::clone(&state));
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(async { drop(shutdown_rx.await) })
        .await
    {
        tracing::warn!("web server: {e}");
    }
    tracing::info!(
        "web server stopped after {} requests",
        state.request_count.load(Ordering::Relaxed)
    );
}
