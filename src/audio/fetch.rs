use std::path::Path;
use std::time::Duration;

use crate::error::{PlayerError, Result};

const CONNECT_TIMEOUT_SECS: u64 = 10;
const READ_TIMEOUT_SECS: u64 = 60;
const USER_AGENT: &str = concat!("waveplayer/", env!("CARGO_PKG_VERSION"));

/// Undecoded bytes plus the file extension, if the location carried one.
#[derive(Debug)]
pub struct RawAudio {
    pub bytes: Vec<u8>,
    pub extension: Option<String>,
}

pub fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Retrieve the audio resource named by `location`, over HTTP or from disk.
pub fn fetch(location: &str) -> Result<RawAudio> {
    let bytes = if is_remote(location) {
        fetch_http(location)?
    } else {
        std::fs::read(location)?
    };
    log::info!("Fetched {} bytes from {location}", bytes.len());

    Ok(RawAudio {
        bytes,
        extension: extension_of(location),
    })
}

fn fetch_http(url: &str) -> Result<Vec<u8>> {
    let client = reqwest::blocking::Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .timeout(Duration::from_secs(READ_TIMEOUT_SECS))
        .build()?;

    let resp = client.get(url).send()?;
    let status = resp.status();
    if !status.is_success() {
        return Err(PlayerError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    Ok(resp.bytes()?.to_vec())
}

/// Extension of the last path component, ignoring any query or fragment.
fn extension_of(location: &str) -> Option<String> {
    let path = location.split(['?', '#']).next().unwrap_or(location);
    Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}
