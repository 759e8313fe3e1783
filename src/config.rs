use std::{env, path::PathBuf, str::FromStr, time::Duration};
use tracing::warn;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub data_path: PathBuf,
    pub backend_url: String,
    pub fetch_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: parsed("PORT", 8080),
            data_path: env::var("APP_DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data/data.json")),
            backend_url: env::var("MOOD_BACKEND_URL")
                .unwrap_or_else(|_| "http://localhost:8000".into()),
            fetch_timeout: Duration::from_secs(parsed("FETCH_TIMEOUT_SECS", 30)),
        }
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parsed<T: FromStr + Copy + std::fmt::Display>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{name}={raw:?} is not valid, using {default}");
            default
        }),
        Err(_) => default,
    }
}
