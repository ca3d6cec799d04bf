//! Entry point for the hostlens agent: parses args, sets up tracing, and
//! serves the tool-invocation WebSocket endpoint.

mod envelope;
mod state;
mod tools;
mod ws;

use axum::{routing::get, Json, Router};
use clap::Parser;
use state::AppState;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "hostlens_agent")]
#[command(version, about = "Read-only system introspection tools over WebSocket")]
struct Cli {
    /// Address to bind
    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    bind: IpAddr,
    /// Port to listen on (0 picks an ephemeral port)
    #[arg(short, long, default_value_t = 3000)]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let state = AppState::new();

    let app = Router::new()
        .route("/ws", get(ws::ws_handler))
        .route("/tools", get(list_tools))
        .with_state(state);

    let addr = SocketAddr::from((cli.bind, cli.port));
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "hostlens agent listening");
    axum::serve(listener, app).await?;
    Ok(())
}

/// Registry listing so callers can discover tool names and descriptions.
async fn list_tools() -> Json<&'static [tools::ToolDescriptor]> {
    Json(tools::registry())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
