use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "memedb",
    about = "Media-sharing gallery server: list, serve, upload and vote on memes",
    long_about = None,
    version = env!("MEMEDB_VERSION"),
)]
pub struct Args {
    /// HTTP port to listen on [default: 3000]
    #[arg(short, long, env = "PORT")]
    pub port: Option<u16>,

    /// Storage root holding the `memes/` directory and `votes.json` [default: .]
    #[arg(short, long, value_name = "DIR", env = "MEMEDB_STORAGE")]
    pub storage: Option<PathBuf>,

    /// Directory with the browser client, served for any non-API path
    #[arg(long, value_name = "DIR")]
    pub static_dir: Option<PathBuf>,

    /// Maximum accepted upload size in MiB [default: 50]
    #[arg(long, value_name = "MIB")]
    pub max_upload_mb: Option<usize>,

    /// Path to TOML config file (overrides default search: ./memedb.toml, ~/.config/memedb/config.toml)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Bind to localhost only (127.0.0.1) instead of all interfaces (0.0.0.0)
    #[arg(long)]
    pub localhost: bool,
}
