use std::{net::IpAddr, path::PathBuf, time::Duration};

use clap::Parser;

/// Server for the hexbots board game.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Address to bind
    #[arg(long, env = "HEXBOTS_BIND", default_value = "0.0.0.0")]
    pub bind: IpAddr,

    /// Directory with the browser client
    #[arg(long, env = "HEXBOTS_PUBLIC_DIR", default_value = "public")]
    pub public_dir: PathBuf,

    /// Seconds between sweeps of abandoned games
    #[arg(long = "prune-interval-secs", env = "HEXBOTS_PRUNE_INTERVAL", default_value_t = 60)]
    pub prune_interval_secs: u64,
}

impl Config {
    pub fn prune_interval(&self) -> Duration {
        Duration::from_secs(self.prune_interval_secs.max(1))
    }
}

impl Default for Config {
    fn default() -> Config {
        Config {
            port: 3000,
            bind: IpAddr::from([0, 0, 0, 0]),
            public_dir: PathBuf::from("public"),
            prune_interval_secs: 60,
        }
    }
}
