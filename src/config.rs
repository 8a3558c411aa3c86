use clap::{Parser, Subcommand};
use std::{net::SocketAddr, path::PathBuf};

#[derive(Parser, Debug)]
#[command(name = "eta_predictor")]
#[command(version)]
#[command(about = "Food delivery ETA prediction from trip attributes", long_about = None)]
pub struct Cli {
    /// Model artifact: linear JSON export, or a TorchScript `.pt` module
    #[arg(long = "model", env = "MODEL_PATH", default_value = "assets/model.json")]
    pub model_path: PathBuf,

    /// Range/category tables for the input form
    #[arg(long = "meta", env = "META_PATH", default_value = "assets/metadata.json")]
    pub meta_path: PathBuf,

    /// Feature list for a TorchScript model (`{"feat_list": [...], "in_dim": N}`)
    #[arg(long = "torch-meta", env = "TORCH_META_PATH")]
    pub torch_meta_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Interactive terminal form
    Shell,

    /// HTTP prediction service
    Serve {
        #[arg(long = "bind", env = "BIND_ADDR", default_value = "0.0.0.0")]
        bind: std::net::IpAddr,

        #[arg(long, env = "PORT", default_value_t = 8080)]
        port: u16,
    },

    /// Print the part of day for an hour (0-23)
    Classify {
        #[arg(allow_negative_numbers = true)]
        hour: i64,
    },
}

pub fn socket_addr(bind: std::net::IpAddr, port: u16) -> SocketAddr {
    SocketAddr::new(bind, port)
}
