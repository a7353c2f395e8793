use louisa::{
    known_devices, router, AppState, Controller, MatterProvider, NodeRedClient, PushoverClient,
    Registry, Result,
};

use std::net::SocketAddr;
use std::sync::Arc;

use log::info;
use tokio::net::TcpListener;
use tokio::signal;

#[tokio::main]
async fn main() -> Result<()> {
    pretty_env_logger::init_timed();
    info!("louisa starting...");

    let devices = known_devices()?;
    let registry = Arc::new(Registry::new(devices.clone()));
    let controller = Arc::new(Controller::new(MatterProvider, devices));

    let pushover_user = std::env::var("PUSHOVER_USER").expect("set ENV variable PUSHOVER_USER");
    let pushover_token = std::env::var("PUSHOVER_LOXONE_APP_TOKEN")
        .expect("set ENV variable PUSHOVER_LOXONE_APP_TOKEN");
    let pushover = PushoverClient::new(pushover_user, pushover_token)?;

    let node_red_url =
        std::env::var("NODE_RED_URL").unwrap_or_else(|_| "http://192.168.1.62:1880".to_string());
    let node_red = NodeRedClient::new(&node_red_url)?;

    let state = AppState {
        registry,
        controller: controller.clone(),
        pushover: pushover.clone(),
        node_red,
    };

    let port = std::env::var("PORT")
        .unwrap_or_else(|_| "6160".to_string())
        .parse::<u16>()
        .expect("PORT must be a port number");

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!("listening http://{addr}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    controller.close().await;
    pushover.close();

    info!("louisa terminated...");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("unable to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("unable to listen for SIGTERM")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => (),
        _ = terminate => (),
    }

    info!("shutdown signal received");
}
