use std::{net::SocketAddr, sync::Arc, time::Duration};

use clap::Parser;
use server::{config::Config, context::{ServerContext, ServerContextRef}, routes};
use tracing::{debug, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = Config::parse();
    let context_ref = Arc::new(ServerContext::new());

    prune_games_periodically(context_ref.clone(), config.prune_interval());

    let routes = routes(context_ref, config.public_dir.clone());
    let (addr, server) = warp::serve(routes).try_bind_ephemeral(SocketAddr::new(config.bind, config.port))?;

    info!(public_dir = %config.public_dir.display(), "starting hexbots server");
    info!("local:   http://127.0.0.1:{}", addr.port());
    if let Ok(local_ip) = local_ip_address::local_ip() {
        info!("network: http://{}:{}", local_ip, addr.port());
    }

    server.await;
    Ok(())
}

fn prune_games_periodically(context_ref: ServerContextRef, period: Duration) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            let pruned = context_ref.game_db.prune();
            if pruned > 0 {
                info!(pruned, live = context_ref.game_db.len(), "pruned abandoned games");
            } else {
                debug!(live = context_ref.game_db.len(), "nothing to prune");
            }
        }
    });
}
