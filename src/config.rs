use std::{fs, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

pub const DEFAULT_API_BASE_URL: &str = "http://www.omdbapi.com/";
pub const DEFAULT_DATA_DIR: &str = ".popcorn";
pub const LOCAL_DB_FILE: &str = "popcorn.db";
pub const API_KEY_ENV: &str = "POPCORN_OMDB_API_KEY";

const DEFAULT_POSTER_WORKERS: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RendererKind {
    Glow,
    Wgpu,
}

impl RendererKind {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "glow" | "gl" | "opengl" => Some(Self::Glow),
            "wgpu" => Some(Self::Wgpu),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub omdb_api_key: Option<String>,
    pub api_base_url: String,
    pub data_dir: PathBuf,
    pub renderer: Option<RendererKind>,
    pub poster_workers: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            omdb_api_key: None,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            data_dir: resolve_relative_path(DEFAULT_DATA_DIR),
            renderer: None,
            poster_workers: DEFAULT_POSTER_WORKERS,
        }
    }
}

impl AppConfig {
    pub fn local_db_path(&self) -> PathBuf {
        self.data_dir.join(LOCAL_DB_FILE)
    }
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(alias = "apikey", alias = "KEY")]
    omdb_api_key: Option<String>,
    api_base_url: Option<String>,
    data_dir: Option<String>,
    renderer: Option<String>,
    poster_workers: Option<usize>,
}

pub fn load_config() -> AppConfig {
    let cfg_path = PathBuf::from("config.json");
    let mut cfg = match fs::read_to_string(&cfg_path) {
        Ok(raw) => match parse_config(&raw) {
            Ok(parsed) => {
                info!("Loaded config from {}", cfg_path.display());
                parsed
            }
            Err(err) => {
                warn!("Failed to parse config.json ({}). Using defaults.", err);
                AppConfig::default()
            }
        },
        Err(_) => {
            info!("No config.json found; using defaults");
            AppConfig::default()
        }
    };

    if let Ok(key) = std::env::var(API_KEY_ENV) {
        if !key.trim().is_empty() {
            cfg.omdb_api_key = Some(key.trim().to_string());
        }
    }
    if cfg.omdb_api_key.is_none() {
        warn!("No OMDb API key configured; set `omdb_api_key` in config.json or {API_KEY_ENV}.");
    }

    cfg
}

/// Merge a `config.json` document over the defaults.
pub fn parse_config(raw: &str) -> Result<AppConfig, serde_json::Error> {
    let parsed = serde_json::from_str::<RawConfig>(raw)?;
    let mut cfg = AppConfig::default();

    if let Some(key) = parsed.omdb_api_key {
        let key = key.trim();
        if !key.is_empty() {
            cfg.omdb_api_key = Some(key.to_string());
        }
    }
    if let Some(url) = parsed.api_base_url {
        if !url.trim().is_empty() {
            cfg.api_base_url = url.trim().to_string();
        }
    }
    if let Some(dir) = parsed.data_dir {
        cfg.data_dir = resolve_relative_path(&dir);
    }
    if let Some(mode) = parsed.renderer {
        match RendererKind::from_str(&mode) {
            Some(kind) => cfg.renderer = Some(kind),
            None => warn!("Unknown renderer `{mode}` in config.json; using platform default."),
        }
    }
    if let Some(n) = parsed.poster_workers {
        cfg.poster_workers = n.clamp(1, 16);
    }

    Ok(cfg)
}

/// Relative paths are anchored at the working directory.
pub fn resolve_relative_path(p: &str) -> PathBuf {
    let path = PathBuf::from(p);
    if path.is_absolute() {
        return path;
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(&path))
        .unwrap_or(path)
}
