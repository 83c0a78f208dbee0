//! Error types for the player.

use thiserror::Error;

/// Everything that can go wrong between locating the source and producing sound.
#[derive(Error, Debug)]
pub enum PlayerError {
    #[error("{}", friendly_fetch_error(.0))]
    Fetch(#[from] reqwest::Error),

    #[error("Server answered {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to probe format: {0}")]
    Probe(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("No playable audio track found")]
    NoTrack,

    #[error("Audio engine error: {0}")]
    Engine(String),

    #[error("Invalid config: {0}")]
    Config(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, PlayerError>;

fn friendly_fetch_error(e: &reqwest::Error) -> String {
    if e.is_builder() {
        return match e.url() {
            Some(url) => format!("Invalid URL: {url}"),
            None => "Invalid URL".to_string(),
        };
    }
    if e.is_connect() {
        return match e.url() {
            Some(url) => format!("Could not connect to {}", url.host_str().unwrap_or("server")),
            None => "Could not connect to server".to_string(),
        };
    }
    if e.is_timeout() {
        return "Connection timed out".to_string();
    }
    format!("Fetch failed: {e}")
}
