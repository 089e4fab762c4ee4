use clap::Parser;
use std::net::IpAddr;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ytxd", about = "HTTP service for YouTube transcripts and metadata", version)]
pub struct Cli {
    /// Address to bind (default 0.0.0.0)
    #[arg(long)]
    pub host: Option<IpAddr>,

    /// Port to listen on (default 5001)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Config file (default ~/.config/ytxd/config.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Append logs to this file instead of stderr
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long)]
    pub verbose: bool,
}
