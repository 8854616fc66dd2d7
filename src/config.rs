use serde::Deserialize;
use std::path::{Path, PathBuf};

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_MAX_UPLOAD_MB: usize = 50;

pub const MEDIA_DIR_NAME: &str = "memes";
pub const VOTES_FILE_NAME: &str = "votes.json";

#[derive(Deserialize, Default, Debug)]
pub struct FileConfig {
    pub port: Option<u16>,
    pub storage: Option<PathBuf>,
    pub static_dir: Option<PathBuf>,
    pub max_upload_mb: Option<usize>,
    pub localhost: Option<bool>,
}

#[derive(Debug)]
pub struct Config {
    pub port: u16,
    /// Directory of raw media files; filenames are the primary key.
    pub media_dir: PathBuf,
    /// Pretty-printed JSON object mapping filename to vote count.
    pub votes_file: PathBuf,
    pub static_dir: Option<PathBuf>,
    pub max_upload_bytes: usize,
    pub localhost: bool,
}

impl Config {
    pub fn resolve(file: Option<FileConfig>, args: &crate::cli::Args) -> Self {
        let file = file.unwrap_or_default();
        let storage = args
            .storage
            .clone()
            .or(file.storage)
            .unwrap_or_else(|| PathBuf::from("."));
        let max_upload_mb = args
            .max_upload_mb
            .or(file.max_upload_mb)
            .unwrap_or(DEFAULT_MAX_UPLOAD_MB);
        Config {
            port: args.port.or(file.port).unwrap_or(DEFAULT_PORT),
            media_dir: storage.join(MEDIA_DIR_NAME),
            votes_file: storage.join(VOTES_FILE_NAME),
            static_dir: args.static_dir.clone().or(file.static_dir),
            max_upload_bytes: max_upload_mb.saturating_mul(1024 * 1024),
            localhost: args.localhost || file.localhost.unwrap_or(false),
        }
    }
}

pub fn find_config_file(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_owned());
    }
    let cwd_config = PathBuf::from("memedb.toml");
    if cwd_config.exists() {
        return Some(cwd_config);
    }
    if let Some(config_dir) = dirs::config_dir() {
        let xdg_config = config_dir.join("memedb").join("config.toml");
        if xdg_config.exists() {
            return Some(xdg_config);
        }
    }
    None
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

pub fn load_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: FileConfig = toml::from_str(&content)?;
    Ok(config)
}
