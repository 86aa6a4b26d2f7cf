use std::net::SocketAddr;

use tokio::signal;
use tokio::sync::watch;
use tracing::{info, Level};

use alarm_clock_backend::{create_router, initialize_backend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    let (app_state, scheduler) = initialize_backend().await?;

    // Background scheduler with cooperative shutdown.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler_handle = tokio::spawn(scheduler.run(shutdown_rx));

    let app = create_router(app_state);

    // Start the server
    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = signal::ctrl_c().await;
        })
        .await?;

    info!("Shutting down scheduler");
    let _ = shutdown_tx.send(true);
    let _ = scheduler_handle.await;

    Ok(())
}
